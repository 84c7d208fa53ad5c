use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::TokenStore;
use crate::tokens::{noop_hook, SharedTokenSet, TokenSet, UpdateHook};

/// Transient in-process storage. Tokens are lost when the process exits.
#[derive(Clone)]
pub struct InMemoryTokenStore {
    tokens: Arc<DashMap<String, SharedTokenSet>>,
    on_update: UpdateHook,
}

impl Default for InMemoryTokenStore {
    fn default() -> Self {
        Self::with_update_hook(noop_hook())
    }
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose token sets report mutations to `on_update` instead of
    /// this store's own no-op [`TokenStore::on_update`].
    pub fn with_update_hook(on_update: UpdateHook) -> Self {
        Self {
            tokens: Arc::new(DashMap::new()),
            on_update,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl TokenStore for InMemoryTokenStore {
    fn get_tokens(&self, account_id: &str) -> SharedTokenSet {
        self.tokens
            .entry(account_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(account_id = %account_id, "Created token set");
                Arc::new(Mutex::new(TokenSet::new(
                    account_id,
                    Arc::clone(&self.on_update),
                )))
            })
            .value()
            .clone()
    }

    fn on_update(&self, _account_id: &str, _tokens: &TokenSet) {}
}
