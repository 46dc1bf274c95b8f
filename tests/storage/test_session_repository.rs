use chrono::{Duration, Utc};
use dealership::{
    auth::session::{FlashKind, FlashMessage, SessionData, SessionRecord},
    storage::{SessionRepository, SqlxSessionRepository},
};

use crate::support::TestDatabase;

fn record(id: &str, expires_in: Duration) -> SessionRecord {
    SessionRecord {
        id: id.into(),
        data: SessionData {
            flash: vec![FlashMessage { kind: FlashKind::Info, text: "Please log in.".into() }],
        },
        expires_at: Utc::now() + expires_in,
    }
}

#[tokio::test]
async fn save_load_and_destroy() {
    let db = TestDatabase::new("session_crud").await;
    let repo = SqlxSessionRepository::new(db.pool.clone());

    repo.save(&record("abc", Duration::hours(1))).await.unwrap();
    let loaded = repo.load("abc").await.unwrap().unwrap();
    assert_eq!(loaded.data.flash.len(), 1);
    assert_eq!(loaded.data.flash[0].text, "Please log in.");

    // Saving again replaces the payload.
    let mut updated = record("abc", Duration::hours(1));
    updated.data.flash.clear();
    repo.save(&updated).await.unwrap();
    assert!(repo.load("abc").await.unwrap().unwrap().data.flash.is_empty());

    repo.destroy("abc").await.unwrap();
    assert!(repo.load("abc").await.unwrap().is_none());
}

#[tokio::test]
async fn delete_expired_only_removes_stale_rows() {
    let db = TestDatabase::new("session_expiry").await;
    let repo = SqlxSessionRepository::new(db.pool.clone());

    repo.save(&record("stale", Duration::minutes(-5))).await.unwrap();
    repo.save(&record("fresh", Duration::minutes(5))).await.unwrap();

    assert_eq!(repo.delete_expired(Utc::now()).await.unwrap(), 1);
    assert!(repo.load("stale").await.unwrap().is_none());
    assert!(repo.load("fresh").await.unwrap().is_some());
}
