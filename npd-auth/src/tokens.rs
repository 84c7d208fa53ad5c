use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::common::{StoredRecord, TokenDump, TokenRecord};
use crate::error::AuthError;

/// Callback fired with `(account_id, token_set)` after every token mutation.
pub type UpdateHook = Arc<dyn Fn(&str, &TokenSet) + Send + Sync>;

/// A token set shared between the store and in-flight requests. Holding the
/// lock serializes liveness checks and refreshes for one account.
pub type SharedTokenSet = Arc<Mutex<TokenSet>>;

pub fn noop_hook() -> UpdateHook {
    Arc::new(|_, _| {})
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenField {
    Device,
    Access,
    Refresh,
}

impl TokenField {
    pub const ALL: [TokenField; 3] = [TokenField::Device, TokenField::Access, TokenField::Refresh];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Device => "device",
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device identifier, access token and refresh token for one account (INN).
pub struct TokenSet {
    account_id: String,
    device: Option<TokenRecord>,
    access: Option<TokenRecord>,
    refresh: Option<TokenRecord>,
    on_update: UpdateHook,
}

impl TokenSet {
    pub fn new(account_id: impl Into<String>, on_update: UpdateHook) -> Self {
        Self {
            account_id: account_id.into(),
            device: None,
            access: None,
            refresh: None,
            on_update,
        }
    }

    /// A token set whose mutations are not observed by any store.
    pub fn detached(account_id: impl Into<String>) -> Self {
        Self::new(account_id, noop_hook())
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn get(&self, field: TokenField) -> Option<&TokenRecord> {
        match field {
            TokenField::Device => self.device.as_ref(),
            TokenField::Access => self.access.as_ref(),
            TokenField::Refresh => self.refresh.as_ref(),
        }
    }

    pub fn device(&self) -> Option<&TokenRecord> {
        self.device.as_ref()
    }

    pub fn access(&self) -> Option<&TokenRecord> {
        self.access.as_ref()
    }

    pub fn refresh(&self) -> Option<&TokenRecord> {
        self.refresh.as_ref()
    }

    /// Assign a field and notify the owning store.
    ///
    /// Accepts a bare value (never expires), `(value, seconds_from_now)` or
    /// `(value, DateTime<Utc>)`.
    pub fn set(&mut self, field: TokenField, record: impl Into<TokenRecord>) {
        self.replace(field, Some(record.into()));
    }

    pub fn set_update_hook(&mut self, on_update: UpdateHook) {
        self.on_update = on_update;
    }

    fn replace(&mut self, field: TokenField, record: Option<TokenRecord>) {
        let slot = match field {
            TokenField::Device => &mut self.device,
            TokenField::Access => &mut self.access,
            TokenField::Refresh => &mut self.refresh,
        };
        *slot = record;

        let on_update = Arc::clone(&self.on_update);
        on_update(&self.account_id, self);
    }

    pub fn dump(&self) -> TokenDump {
        TokenField::ALL
            .iter()
            .map(|field| (field.as_str().to_string(), StoredRecord::from(self.get(*field))))
            .collect()
    }

    /// Inverse of [`TokenSet::dump`]. Every field must be present in `data`,
    /// though its value may be null.
    pub fn load(&mut self, account_id: impl Into<String>, data: &TokenDump) -> Result<(), AuthError> {
        let missing: Vec<&str> = TokenField::ALL
            .iter()
            .map(TokenField::as_str)
            .filter(|name| !data.contains_key(*name))
            .collect();
        if !missing.is_empty() {
            return Err(AuthError::MalformedTokenData(format!(
                "missing fields: {}",
                missing.join(", ")
            )));
        }

        self.account_id = account_id.into();
        for field in TokenField::ALL {
            let record = data.get(field.as_str()).and_then(StoredRecord::to_record);
            self.replace(field, record);
        }
        Ok(())
    }
}

impl fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSet")
            .field("account_id", &self.account_id)
            .field("device", &self.device)
            .field("access", &self.access.as_ref().map(TokenRecord::expires_at))
            .field("refresh", &self.refresh.is_some())
            .finish()
    }
}
