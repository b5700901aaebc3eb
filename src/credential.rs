use std::fmt;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Holder for the single credential of the active session.
///
/// The store performs no validation; a present credential is only known to
/// be good once a request carrying it succeeds. It lives in memory, so it
/// ends with the process. Share it with the client through an `Arc`.
#[derive(Default)]
pub struct CredentialStore {
    inner: RwLock<Option<String>>,
}

impl CredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `credential`.
    pub fn with_credential(credential: impl Into<String>) -> Self {
        Self {
            inner: RwLock::new(Some(credential.into())),
        }
    }

    pub fn get(&self) -> Option<String> {
        self.read().clone()
    }

    pub fn set(&self, credential: impl Into<String>) {
        *self.write() = Some(credential.into());
    }

    /// Forgets the credential. Clearing an empty store is a no-op.
    pub fn clear(&self) {
        self.write().take();
    }

    pub fn is_present(&self) -> bool {
        self.read().is_some()
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<String>> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<String>> {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_present() {
            "<redacted>"
        } else {
            "<none>"
        };
        f.debug_struct("CredentialStore")
            .field("credential", &state)
            .finish()
    }
}
