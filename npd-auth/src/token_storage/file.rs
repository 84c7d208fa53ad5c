use dashmap::DashMap;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, Weak};
use tokio::sync::Mutex;

use super::TokenStore;
use crate::common::TokenDump;
use crate::error::AuthError;
use crate::tokens::{SharedTokenSet, TokenSet, UpdateHook};

/// Token store persisted as one JSON document keyed by account id.
///
/// Every token mutation rewrites the file, so a freshly issued token
/// survives a restart. The write is a small synchronous file replace done
/// inside [`TokenStore::on_update`], i.e. on whatever thread mutates the
/// token set (for the API client, an async task holding the account lock).
#[derive(Clone)]
pub struct FileTokenStore {
    inner: Arc<Inner>,
}

struct Inner {
    token_path: PathBuf,
    tokens: DashMap<String, SharedTokenSet>,
    snapshot: std::sync::Mutex<BTreeMap<String, TokenDump>>,
}

impl FileTokenStore {
    /// Store backed by `<cache dir>/npd/tokens.json`.
    pub fn new() -> Result<Self, AuthError> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| AuthError::Configuration("Could not find cache directory".to_string()))?
            .join("npd");

        Ok(Self::with_path(cache_dir.join("tokens.json")))
    }

    pub fn with_path(token_path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(Inner {
                token_path: token_path.into(),
                tokens: DashMap::new(),
                snapshot: std::sync::Mutex::new(BTreeMap::new()),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.inner.token_path
    }

    fn hook(&self) -> UpdateHook {
        // Weak so token sets held by the map do not keep the store alive.
        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        Arc::new(move |account_id, tokens| {
            if let Some(inner) = inner.upgrade() {
                FileTokenStore { inner }.on_update(account_id, tokens);
            }
        })
    }

    fn read_stored(&self) -> Result<BTreeMap<String, TokenDump>, AuthError> {
        let json = fs::read_to_string(&self.inner.token_path)
            .map_err(|e| AuthError::TokenStorage(format!("Failed to read tokens: {}", e)))?;
        Ok(serde_json::from_str(&json)?)
    }
}

impl Inner {
    fn persist(&self, account_id: &str, tokens: &TokenSet) {
        let mut snapshot = self.snapshot.lock().unwrap_or_else(PoisonError::into_inner);
        snapshot.insert(account_id.to_string(), tokens.dump());

        if let Err(e) = self.save_snapshot(&snapshot) {
            tracing::warn!(
                account_id = %account_id,
                path = %self.token_path.display(),
                "Failed to persist tokens: {}",
                e
            );
        }
    }

    /// Write to a sibling temp file created owner-only, then rename it over
    /// the token file so readers never see a partial document.
    fn save_snapshot(&self, snapshot: &BTreeMap<String, TokenDump>) -> Result<(), AuthError> {
        let json = serde_json::to_string_pretty(snapshot)?;

        if let Some(parent) = self.token_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    AuthError::TokenStorage(format!("Failed to create cache directory: {}", e))
                })?;
            }
        }

        let tmp_path = self.token_path.with_extension("json.tmp");
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let written = options.open(&tmp_path).and_then(|mut file| {
            file.write_all(json.as_bytes())?;
            file.sync_all()
        });
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(AuthError::TokenStorage(format!("Failed to save tokens: {}", e)));
        }

        fs::rename(&tmp_path, &self.token_path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            AuthError::TokenStorage(format!("Failed to move token file into place: {}", e))
        })
    }
}

impl TokenStore for FileTokenStore {
    fn get_tokens(&self, account_id: &str) -> SharedTokenSet {
        self.inner
            .tokens
            .entry(account_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(TokenSet::new(account_id, self.hook()))))
            .value()
            .clone()
    }

    /// Hydrate every account from the file, or none of them.
    ///
    /// A malformed entry fails the whole load and leaves the map untouched.
    /// The file contents are still kept in the snapshot, so later writes for
    /// other accounts do not drop the entries that were on disk.
    fn load_tokens(&self) -> Result<(), AuthError> {
        if !self.inner.token_path.exists() {
            return Ok(());
        }

        let stored = self.read_stored()?;

        let mut loaded = Vec::with_capacity(stored.len());
        let mut malformed = Vec::new();
        for (account_id, dump) in &stored {
            // Hydration is not a mutation worth persisting; attach the hook afterwards.
            let mut tokens = TokenSet::detached(account_id.as_str());
            match tokens.load(account_id.as_str(), dump) {
                Ok(()) => {
                    tokens.set_update_hook(self.hook());
                    loaded.push((account_id.clone(), tokens));
                }
                Err(e) => malformed.push(format!("{}: {}", account_id, e)),
            }
        }

        {
            let mut snapshot = self
                .inner
                .snapshot
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            for (account_id, dump) in stored {
                snapshot.entry(account_id).or_insert(dump);
            }
        }

        if !malformed.is_empty() {
            tracing::warn!(
                path = %self.inner.token_path.display(),
                accounts = malformed.len(),
                "Token file has malformed entries, nothing loaded"
            );
            return Err(AuthError::MalformedTokenData(malformed.join("; ")));
        }

        let count = loaded.len();
        for (account_id, tokens) in loaded {
            self.inner
                .tokens
                .insert(account_id, Arc::new(Mutex::new(tokens)));
        }
        tracing::info!(count, "Loaded stored tokens");

        Ok(())
    }

    fn on_update(&self, account_id: &str, tokens: &TokenSet) {
        self.inner.persist(account_id, tokens);
    }
}
