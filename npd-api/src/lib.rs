mod auth;
mod config;
mod dispatch;
pub mod endpoints;
mod error;
mod macros;
pub mod repositories;
mod request;

pub use crate::auth::Profile;
pub use crate::config::{APP_VERSION, BASE_URL, ClientConfig, PORTAL_URL, USER_AGENT};
pub use crate::dispatch::{AuthState, Dispatch};
pub use crate::error::{ErrorDetail, NpdApiError, ServerError};
pub use crate::request::{Request as ApiRequest, RequestData};
pub use npd_auth::{
    FileTokenStore, InMemoryTokenStore, SharedTokenSet, TokenField, TokenRecord, TokenSet,
    TokenStore, store_hook,
};
pub use reqwest::Method;
use repositories::*;

use std::sync::Arc;
use std::time::Duration;

/// Client for the self-employed tax service API.
///
/// Every call goes through [`Client::dispatch`], which makes sure a live
/// bearer token is attached before the request leaves.
pub struct Client {
    http: reqwest::Client,
    config: ClientConfig,
    token_store: Arc<dyn TokenStore>,
}

impl Client {
    /// Client with transient in-memory token storage.
    pub fn new(config: ClientConfig) -> Result<Self, NpdApiError> {
        Self::with_token_store(config, Arc::new(InMemoryTokenStore::new()))
    }

    /// Client backed by `token_store`, hydrated before first use. A failed
    /// hydration is logged and leaves the store as the store left it.
    pub fn with_token_store(
        config: ClientConfig,
        token_store: Arc<dyn TokenStore>,
    ) -> Result<Self, NpdApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;

        // A store that cannot hydrate still works; accounts simply log in again.
        if let Err(e) = token_store.load_tokens() {
            tracing::warn!("Failed to load stored tokens: {}", e);
        }

        Ok(Self {
            http,
            config,
            token_store,
        })
    }

    /// Replace the HTTP transport, e.g. to share a connection pool.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.token_store
    }

    /// Token set for `account_id`, falling back to the configured default INN.
    pub fn tokens(&self, account_id: Option<&str>) -> Result<SharedTokenSet, NpdApiError> {
        let account_id = self.resolve_account(account_id)?;
        Ok(self.token_store.get_tokens(account_id))
    }

    fn resolve_account<'a>(&'a self, account_id: Option<&'a str>) -> Result<&'a str, NpdApiError> {
        account_id
            .or(self.config.default_inn.as_deref())
            .ok_or_else(|| {
                NpdApiError::Configuration(
                    "account id (INN) is required: pass one or set default_inn".to_string(),
                )
            })
    }
}

pub struct Request;

impl Request {
    pub fn incomes() -> IncomeRepository {
        IncomeRepository::new()
    }

    pub fn invoices() -> InvoiceRepository {
        InvoiceRepository::new()
    }

    pub fn payment_options() -> PaymentOptionRepository {
        PaymentOptionRepository::new()
    }
}
