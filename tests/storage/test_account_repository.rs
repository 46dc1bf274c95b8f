use dealership::{
    auth::{account::NewAccount, account::ProfileUpdate, AccountRole, CredentialStore},
    errors::DealershipError,
    storage::{AccountRepository, SqlxAccountRepository},
};

use crate::support::TestDatabase;

fn new_account(email: &str) -> NewAccount {
    NewAccount {
        first_name: "Basic".into(),
        last_name: "Client".into(),
        email: email.into(),
        password_hash: "not-a-real-hash".into(),
    }
}

#[tokio::test]
async fn create_and_fetch_account() {
    let db = TestDatabase::new("account_create").await;
    let repo = SqlxAccountRepository::new(db.pool.clone());

    let created = repo.create_account(new_account("basic@example.com")).await.unwrap();
    assert_eq!(created.role, AccountRole::Client);

    let by_id = repo.get_account(created.id).await.unwrap().unwrap();
    assert_eq!(by_id.email, "basic@example.com");

    let by_email = repo.get_account_by_email("BASIC@example.com").await.unwrap().unwrap();
    assert_eq!(by_email.id, created.id);
}

#[tokio::test]
async fn unique_violation_maps_to_duplicate_email() {
    let db = TestDatabase::new("account_duplicate").await;
    let repo = SqlxAccountRepository::new(db.pool.clone());

    repo.create_account(new_account("basic@example.com")).await.unwrap();
    let err = repo.create_account(new_account("basic@example.com")).await.unwrap_err();
    assert!(matches!(err, DealershipError::DuplicateEmail));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM account")
        .fetch_one(&db.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn emails_differing_only_in_case_are_duplicates() {
    let db = TestDatabase::new("account_email_case").await;
    let repo = SqlxAccountRepository::new(db.pool.clone());

    // Rows written before emails were normalised may keep their casing.
    sqlx::query(
        "INSERT INTO account (account_firstname, account_lastname, account_email, account_password) \
         VALUES ('Legacy', 'Client', 'Legacy@Example.com', 'x')",
    )
    .execute(&db.pool)
    .await
    .unwrap();

    let err = repo.create_account(new_account("legacy@example.com")).await.unwrap_err();
    assert!(matches!(err, DealershipError::DuplicateEmail));

    let found = repo.get_account_by_email("legacy@example.com").await.unwrap().unwrap();
    assert_eq!(found.email, "Legacy@Example.com");
}

#[tokio::test]
async fn updates_report_missing_accounts() {
    let db = TestDatabase::new("account_missing").await;
    let repo = SqlxAccountRepository::new(db.pool.clone());

    let err = repo
        .update_profile(
            42.into(),
            ProfileUpdate {
                first_name: "Nobody".into(),
                last_name: "Here".into(),
                email: "nobody@example.com".into(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DealershipError::NotFound { .. }));

    let err = repo.update_password(42.into(), "hash".into()).await.unwrap_err();
    assert!(matches!(err, DealershipError::NotFound { .. }));
}

#[tokio::test]
async fn credential_store_round_trip_on_postgres() {
    let db = TestDatabase::new("credential_store").await;
    let store = CredentialStore::with_sqlx(db.pool.clone());

    let account = store
        .register("Basic", "Client", "basic@example.com", "I@mABas1cCl!3nt")
        .await
        .unwrap();
    let verified = store.verify("basic@example.com", "I@mABas1cCl!3nt").await.unwrap();
    assert_eq!(verified.id, account.id);

    let stored: String = sqlx::query_scalar("SELECT account_password FROM account WHERE account_id = $1")
        .bind(account.id)
        .fetch_one(&db.pool)
        .await
        .unwrap();
    assert!(stored.starts_with("$argon2id$"));
}
