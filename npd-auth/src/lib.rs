// Token records and the per-account token set
pub mod common;
mod tokens;

// Pluggable persistence
pub mod token_storage;

mod device_id;
mod error;

pub use common::{StoredRecord, TokenDump, TokenRecord, EXPIRY_SAFETY_MARGIN};
pub use device_id::generate_device_id;
pub use error::AuthError;
pub use token_storage::{store_hook, FileTokenStore, InMemoryTokenStore, TokenStore};
pub use tokens::{noop_hook, SharedTokenSet, TokenField, TokenSet, UpdateHook};
