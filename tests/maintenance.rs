mod common;

use std::collections::HashMap;
use std::sync::Arc;

use distrogate::cancel::CancelToken;
use distrogate::client::Client;
use distrogate::maintenance::gate::{MaintenanceGate, MaintenanceOutcome, NoticeVariant};
use distrogate::maintenance::MaintenanceStore;
use distrogate::session::{CachedUser, SessionStore};
use distrogate::storage::{FileStorage, MemoryStorage, Storage, MAINTENANCE_PAGES_KEY};

use common::{make_token, spawn, BackendState, MockBackend};

fn client_for(backend: &MockBackend) -> Client {
    Client::new(&backend.base, 5).unwrap()
}

fn seeded_storage(json: &[u8]) -> Arc<MemoryStorage> {
    let storage = Arc::new(MemoryStorage::new());
    storage.write(MAINTENANCE_PAGES_KEY, json).unwrap();
    storage
}

fn session_with_role(storage: Arc<MemoryStorage>, role: &str) -> SessionStore {
    let session = SessionStore::new(storage);
    let user = CachedUser {
        id: String::from("user-1"),
        name: String::from("Test User"),
        role: String::from(role),
    };
    session.set_session(&make_token(role), &user).unwrap();
    session
}

#[actix_web::test]
async fn test_refresh_last_write_wins() {
    let state = BackendState::default();
    *state.maintenance.lock().unwrap() =
        Some(HashMap::from([(String::from("a"), true)]));
    let backend = spawn(state).await;

    let store = MaintenanceStore::new(Arc::new(MemoryStorage::new()));
    let client = client_for(&backend);
    let cancel = CancelToken::new();

    store.refresh(&client, &cancel).await.unwrap();
    assert!(store.is_on("a"));

    // The server drops "a" and adds "b"; the stale entry must not survive
    *backend.state.maintenance.lock().unwrap() = Some(HashMap::from([
        (String::from("a"), false),
        (String::from("b"), true),
    ]));
    store.refresh(&client, &cancel).await.unwrap();

    let cached = store.cached();
    assert_eq!(cached.len(), 2);
    assert_eq!(cached.get("a"), Some(&false));
    assert_eq!(cached.get("b"), Some(&true));
}

#[actix_web::test]
async fn test_seed_converges_without_remount() {
    let state = BackendState::default();
    *state.maintenance.lock().unwrap() =
        Some(HashMap::from([(String::from("splits"), false)]));
    *state.profile_role.lock().unwrap() = Some(String::from("Royalty Share"));
    let backend = spawn(state).await;

    // Stale mirror still says "on"
    let storage = seeded_storage(br#"{"splits": true}"#);
    let session = session_with_role(storage.clone(), "Royalty Share");
    let store = MaintenanceStore::new(storage);
    let client = client_for(&backend);

    let gate = MaintenanceGate::new(&store, NoticeVariant::FullPage);
    assert_eq!(
        gate.seed("splits", &session),
        MaintenanceOutcome::ShowNotice {
            page: String::from("splits"),
            variant: NoticeVariant::FullPage,
        }
    );

    let outcome = gate
        .evaluate("splits", &client, &session, &CancelToken::new())
        .await
        .unwrap();
    assert_eq!(outcome, MaintenanceOutcome::ShowContent);

    // The same store instance now reads the live value
    assert!(!store.is_on("splits"));
}

#[actix_web::test]
async fn test_refresh_mirrors_to_sibling_stores() {
    let state = BackendState::default();
    *state.maintenance.lock().unwrap() =
        Some(HashMap::from([(String::from("releases"), true)]));
    let backend = spawn(state).await;

    let dir = tempfile::tempdir().unwrap();
    let store_a = MaintenanceStore::new(Arc::new(FileStorage::new(dir.path()).unwrap()));
    let store_b = MaintenanceStore::new(Arc::new(FileStorage::new(dir.path()).unwrap()));

    assert!(!store_b.is_on("releases"));
    store_a
        .refresh(&client_for(&backend), &CancelToken::new())
        .await
        .unwrap();

    // The sibling sees the new value without a fetch of its own
    assert!(store_b.is_on("releases"));
    assert_eq!(backend.state.request_count(), 1);
}

#[actix_web::test]
async fn test_subscribe_receives_published_map() {
    let state = BackendState::default();
    *state.maintenance.lock().unwrap() =
        Some(HashMap::from([(String::from("banking"), true)]));
    let backend = spawn(state).await;

    let store = MaintenanceStore::new(Arc::new(MemoryStorage::new()));
    let mut rx = store.subscribe();

    store
        .refresh(&client_for(&backend), &CancelToken::new())
        .await
        .unwrap();

    let published = rx.recv().await.unwrap();
    assert_eq!(published.get("banking"), Some(&true));
}

#[actix_web::test]
async fn test_admin_never_sees_seeded_notice() {
    // Seeding is synchronous, no backend involved
    let storage = seeded_storage(br#"{"splits": true}"#);
    let session = session_with_role(storage.clone(), "Admin");
    let store = MaintenanceStore::new(storage);

    let gate = MaintenanceGate::new(&store, NoticeVariant::InlineCard);
    assert_eq!(gate.seed("splits", &session), MaintenanceOutcome::ShowContent);

    // A non-admin with the same mirror sees the notice
    let storage = seeded_storage(br#"{"splits": true}"#);
    let session = session_with_role(storage.clone(), "Royalty Share");
    let store = MaintenanceStore::new(storage);
    let gate = MaintenanceGate::new(&store, NoticeVariant::InlineCard);
    assert_eq!(
        gate.seed("splits", &session),
        MaintenanceOutcome::ShowNotice {
            page: String::from("splits"),
            variant: NoticeVariant::InlineCard,
        }
    );
}

#[actix_web::test]
async fn test_live_admin_bypass_and_override() {
    let state = BackendState::default();
    *state.maintenance.lock().unwrap() =
        Some(HashMap::from([(String::from("splits"), true)]));
    *state.profile_role.lock().unwrap() = Some(String::from("Admin"));
    let backend = spawn(state).await;

    let storage = Arc::new(MemoryStorage::new());
    let session = session_with_role(storage.clone(), "Admin");
    let store = MaintenanceStore::new(storage);
    let client = client_for(&backend);

    // Admins bypass the live notice by default
    let gate = MaintenanceGate::new(&store, NoticeVariant::FullPage);
    let outcome = gate
        .evaluate("splits", &client, &session, &CancelToken::new())
        .await
        .unwrap();
    assert_eq!(outcome, MaintenanceOutcome::ShowContent);

    // Unless the caller explicitly disables the bypass
    let gate = MaintenanceGate::new(&store, NoticeVariant::FullPage).with_bypass_admin(true);
    let outcome = gate
        .evaluate("splits", &client, &session, &CancelToken::new())
        .await
        .unwrap();
    assert_eq!(
        outcome,
        MaintenanceOutcome::ShowNotice {
            page: String::from("splits"),
            variant: NoticeVariant::FullPage,
        }
    );
}

#[actix_web::test]
async fn test_refresh_failure_keeps_previous_map() {
    let state = BackendState::default();
    *state.maintenance.lock().unwrap() = None;
    let backend = spawn(state).await;

    let storage = seeded_storage(br#"{"splits": true}"#);
    let store = MaintenanceStore::new(storage);

    let map = store
        .refresh(&client_for(&backend), &CancelToken::new())
        .await
        .unwrap();
    assert_eq!(map.get("splits"), Some(&true));
    assert!(store.is_on("splits"));
}

#[actix_web::test]
async fn test_cancelled_refresh_keeps_mirror() {
    let state = BackendState::default();
    *state.maintenance.lock().unwrap() =
        Some(HashMap::from([(String::from("splits"), false)]));
    let backend = spawn(state).await;

    let storage = seeded_storage(br#"{"splits": true}"#);
    let store = MaintenanceStore::new(storage);

    let cancel = CancelToken::new();
    cancel.cancel();
    store
        .refresh(&client_for(&backend), &cancel)
        .await
        .unwrap();

    // The cancelled refresh must not have replaced the mirror
    assert!(store.is_on("splits"));
}
