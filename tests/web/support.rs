use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use axum_extra::extract::cookie::Cookie;
use dealership::{
    auth::AccountRole,
    config::{AppConfig, Environment},
    storage::{
        memory::{MemoryAccountRepository, MemoryInventoryRepository, MemorySessionRepository},
        AccountRepository, Repositories,
    },
    web::{build_router, AppState},
};
use tower::ServiceExt;

pub const PASSWORD: &str = "I@mABas1cCl!3nt";
pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// A router over in-memory repositories plus a cookie jar that behaves like a
/// browser across requests.
pub struct TestApp {
    pub state: AppState,
    pub accounts: Arc<MemoryAccountRepository>,
    pub sessions: Arc<MemorySessionRepository>,
    cookies: Mutex<HashMap<String, String>>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers.get(header::LOCATION).and_then(|v| v.to_str().ok())
    }

    /// Raw `Set-Cookie` header for `name`, if the response sets it.
    pub fn set_cookie(&self, name: &str) -> Option<Cookie<'static>> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| Cookie::parse(v.to_string()).ok())
            .find(|c| c.name() == name)
    }
}

pub fn test_config(environment: Environment) -> AppConfig {
    let mut config = AppConfig::default();
    config.environment = environment;
    config.database.url = "memory://".to_string();
    config.auth.token_secret = TEST_SECRET.to_string();
    config
}

pub fn setup_test_app() -> TestApp {
    setup_test_app_with(Environment::Development, MemoryInventoryRepository::with_sample_data())
}

pub fn setup_test_app_with(environment: Environment, inventory: MemoryInventoryRepository) -> TestApp {
    let accounts = Arc::new(MemoryAccountRepository::new());
    let sessions = Arc::new(MemorySessionRepository::new());
    let repositories = Repositories {
        accounts: accounts.clone(),
        sessions: sessions.clone(),
        inventory: Arc::new(inventory),
        pool: None,
    };
    let state =
        AppState::new(test_config(environment), repositories, None).expect("build app state");

    TestApp { state, accounts, sessions, cookies: Mutex::new(HashMap::new()) }
}

impl TestApp {
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub fn cookie(&self, name: &str) -> Option<String> {
        self.cookies.lock().unwrap().get(name).cloned()
    }

    pub fn set_cookie(&self, name: &str, value: &str) {
        self.cookies.lock().unwrap().insert(name.to_string(), value.to_string());
    }

    pub fn clear_cookies(&self) {
        self.cookies.lock().unwrap().clear();
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(Method::GET, path, None).await
    }

    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields.iter().copied())
            .finish();
        self.send(Method::POST, path, Some(body)).await
    }

    async fn send(&self, method: Method, path: &str, form: Option<String>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);

        let cookie_header = {
            let cookies = self.cookies.lock().unwrap();
            cookies.iter().map(|(k, v)| format!("{}={}", k, v)).collect::<Vec<_>>().join("; ")
        };
        if !cookie_header.is_empty() {
            builder = builder.header(header::COOKIE, cookie_header);
        }

        let request = match form {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .expect("build request"),
            None => builder.body(Body::empty()).expect("build request"),
        };

        let response = self.router().oneshot(request).await.expect("request");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("read body");
        let body = String::from_utf8_lossy(&bytes).into_owned();

        let result = TestResponse { status, headers, body };
        self.store_cookies(&result);
        result
    }

    fn store_cookies(&self, response: &TestResponse) {
        let mut cookies = self.cookies.lock().unwrap();
        for value in response.headers.get_all(header::SET_COOKIE) {
            let Ok(cookie) = Cookie::parse(value.to_str().unwrap().to_string()) else {
                continue;
            };
            let removed = cookie.value().is_empty()
                || cookie.max_age().is_some_and(|age| age.is_zero() || age.is_negative());
            if removed {
                cookies.remove(cookie.name());
            } else {
                cookies.insert(cookie.name().to_string(), cookie.value().to_string());
            }
        }
    }

    pub async fn register(&self, first: &str, last: &str, email: &str) -> TestResponse {
        self.post_form(
            "/account/register",
            &[
                ("account_firstname", first),
                ("account_lastname", last),
                ("account_email", email),
                ("account_password", PASSWORD),
            ],
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.post_form("/account/login", &[("account_email", email), ("account_password", password)])
            .await
    }

    /// Register and log in, returning the new account's id.
    pub async fn register_and_login(&self, first: &str, email: &str) -> i32 {
        let response = self.register(first, "Client", email).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        let response = self.login(email, PASSWORD).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{}", response.body);
        self.account_id(email).await
    }

    pub async fn account_id(&self, email: &str) -> i32 {
        self.accounts
            .get_account_by_email(email)
            .await
            .unwrap()
            .expect("account exists")
            .id
            .get()
    }

    pub async fn set_role(&self, email: &str, role: AccountRole) {
        let id = self.accounts.get_account_by_email(email).await.unwrap().unwrap().id;
        self.accounts.set_role(id, role).await.unwrap();
    }
}
