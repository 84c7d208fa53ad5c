mod models;

pub use models::{StoredRecord, TokenDump, TokenRecord, EXPIRY_SAFETY_MARGIN};
