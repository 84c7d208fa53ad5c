#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use mockito::ServerGuard;
use npd_api::{Client, ClientConfig, TokenField};

pub const INN: &str = "111111111111";

pub fn client_for(server: &ServerGuard) -> Client {
    let config = ClientConfig::default()
        .with_base_url(server.url())
        .with_portal_url(server.url())
        .with_default_inn(INN);
    Client::new(config).expect("client")
}

/// Server-style expiry timestamp, UTC with `Z`.
pub fn expire_in(offset: Duration) -> String {
    (Utc::now() + offset)
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

pub async fn seed(client: &Client, access: Option<(&str, DateTime<Utc>)>, refresh: Option<&str>) {
    let tokens = client.tokens(Some(INN)).expect("tokens");
    let mut tokens = tokens.lock().await;
    tokens.set(TokenField::Device, "abcdefghij0123456789z");
    if let Some(access) = access {
        tokens.set(TokenField::Access, access);
    }
    if let Some(refresh) = refresh {
        tokens.set(TokenField::Refresh, refresh);
    }
}
