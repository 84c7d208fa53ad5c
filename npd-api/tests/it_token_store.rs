//! Client behaviour against custom and file-backed token stores.

mod common;

use chrono::{Duration, Utc};
use common::{INN, expire_in};
use mockito::Server;
use npd_api::{
    Client, ClientConfig, Dispatch, FileTokenStore, InMemoryTokenStore, SharedTokenSet,
    TokenField, TokenSet, TokenStore, store_hook,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory store that records which accounts changed.
struct RecordingStore {
    inner: InMemoryTokenStore,
    updates: AtomicUsize,
    last_access: Mutex<Option<String>>,
}

impl RecordingStore {
    fn new() -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            inner: InMemoryTokenStore::with_update_hook(store_hook(weak.clone())),
            updates: AtomicUsize::new(0),
            last_access: Mutex::new(None),
        })
    }

    fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

impl TokenStore for RecordingStore {
    fn get_tokens(&self, account_id: &str) -> SharedTokenSet {
        self.inner.get_tokens(account_id)
    }

    fn on_update(&self, _account_id: &str, tokens: &TokenSet) {
        self.updates.fetch_add(1, Ordering::SeqCst);
        *self.last_access.lock().unwrap() = tokens.access().map(|a| a.value().to_string());
    }
}

fn config_for(server: &Server) -> ClientConfig {
    ClientConfig::default()
        .with_base_url(server.url())
        .with_portal_url(server.url())
        .with_default_inn(INN)
}

#[tokio::test]
async fn custom_store_is_notified_of_mutations() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/auth/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"token": "A2", "tokenExpireIn": expire_in(Duration::hours(1))}).to_string())
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", "/user")
        .with_status(200)
        .create_async()
        .await;

    let store = RecordingStore::new();
    let client = Client::with_token_store(config_for(&server), store.clone()).unwrap();

    client
        .tokens(None)
        .unwrap()
        .lock()
        .await
        .set(TokenField::Access, "A1");
    assert_eq!(store.updates(), 1);

    {
        let tokens = client.tokens(None).unwrap();
        let mut tokens = tokens.lock().await;
        tokens.set(TokenField::Access, ("A1", Utc::now() - Duration::hours(1)));
        tokens.set(TokenField::Refresh, "R1");
        tokens.set(TokenField::Device, "abcdefghij0123456789z");
    }
    assert_eq!(store.updates(), 4);

    client.dispatch(Dispatch::get("/user")).await.unwrap();

    // The refresh replaced the access token once; the refresh token was not rotated.
    assert_eq!(store.updates(), 5);
    assert_eq!(store.last_access.lock().unwrap().as_deref(), Some("A2"));
}

#[tokio::test]
async fn malformed_token_file_does_not_block_login() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/auth/lkfl")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"token": "A1", "tokenExpireIn": expire_in(Duration::hours(1)), "refreshToken": "R1"})
                .to_string(),
        )
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tokens.json");
    let other = json!({
        "device": {"value": "D", "expires_at": null},
        "access": {"value": null, "expires_at": null},
        "refresh": {"value": "R-OTHER", "expires_at": null}
    });
    std::fs::write(
        &path,
        json!({"222222222222": other, "333333333333": {"device": {"value": "D", "expires_at": null}}})
            .to_string(),
    )
    .unwrap();

    let client =
        Client::with_token_store(config_for(&server), Arc::new(FileTokenStore::with_path(&path)))
            .unwrap();
    client
        .login(INN, &secrecy::SecretString::from("secret".to_string()))
        .await
        .unwrap();

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(stored[INN]["refresh"]["value"], "R1");
    assert_eq!(stored["222222222222"], other);
    assert!(stored.get("333333333333").is_some());
}
