mod file;
mod memory;

pub use file::FileTokenStore;
pub use memory::InMemoryTokenStore;

use std::sync::{Arc, Weak};

use crate::error::AuthError;
use crate::tokens::{SharedTokenSet, TokenSet, UpdateHook};

/// Maps an account identifier (INN) to its token set.
///
/// Token sets handed out by a store call back into it through their update
/// hook, so a durable store sees every mutation without the token set knowing
/// how it is persisted.
pub trait TokenStore: Send + Sync {
    /// Existing set for `account_id`, or a fresh empty one.
    fn get_tokens(&self, account_id: &str) -> SharedTokenSet;

    /// Hydrate the store from durable storage.
    fn load_tokens(&self) -> Result<(), AuthError> {
        Ok(())
    }

    /// Called synchronously after any field of `tokens` changes. Must not
    /// fail outward: a store that cannot persist records the failure itself.
    fn on_update(&self, account_id: &str, tokens: &TokenSet);
}

/// Update hook that forwards every mutation to `store.on_update`.
///
/// Holds a `Weak` so token sets kept inside the store do not keep it alive;
/// mutations after the store is dropped go nowhere. Stores that wrap another
/// store build themselves with [`Arc::new_cyclic`] and hand this hook to the
/// inner one:
///
/// ```
/// use std::sync::Arc;
/// use npd_auth::{store_hook, InMemoryTokenStore, SharedTokenSet, TokenSet, TokenStore};
///
/// struct Audited {
///     inner: InMemoryTokenStore,
/// }
///
/// impl TokenStore for Audited {
///     fn get_tokens(&self, account_id: &str) -> SharedTokenSet {
///         self.inner.get_tokens(account_id)
///     }
///
///     fn on_update(&self, account_id: &str, _tokens: &TokenSet) {
///         println!("tokens of {account_id} changed");
///     }
/// }
///
/// let store = Arc::new_cyclic(|weak| Audited {
///     inner: InMemoryTokenStore::with_update_hook(store_hook(weak.clone())),
/// });
/// # let _ = store;
/// ```
pub fn store_hook<S>(store: Weak<S>) -> UpdateHook
where
    S: TokenStore + 'static,
{
    Arc::new(move |account_id, tokens| {
        if let Some(store) = store.upgrade() {
            store.on_update(account_id, tokens);
        }
    })
}
