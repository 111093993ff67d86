//! Persisted key/value storage shared by every component.
//!
//! Components never touch a global store. Each one is handed a clone of a
//! [`PersistedStore`], which wraps a concrete [`KeyValueStore`] backend and
//! keeps the table of which live instance owns which key.

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use std::cell::{RefCell, RefMut};
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::StorageError;

// ============================================================================
// Backend Trait
// ============================================================================

/// A string key/value store that survives across sessions.
///
/// Absence of a key means "no override"; it is not an error.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

// ============================================================================
// Claims
// ============================================================================

/// Opaque token identifying one component instance to the claim table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClaimToken(u64);

/// Outcome of [`PersistedStore::claim`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// The caller owns writes to the key.
    Owner,
    /// Another live instance already owns the key; the caller may read only.
    Shared,
}

#[derive(Default)]
struct ClaimTable {
    next_token: u64,
    owners: HashMap<String, ClaimToken>,
}

// ============================================================================
// PersistedStore
// ============================================================================

/// Cheap-to-clone handle to the process-wide persisted store.
///
/// Two instances configured with the same key do not silently race: the
/// first one to claim the key owns writes, later claimants can still load
/// the persisted value but their writes are dropped.
#[derive(Clone)]
pub struct PersistedStore {
    backend: Rc<RefCell<Box<dyn KeyValueStore>>>,
    claims: Rc<RefCell<ClaimTable>>,
}

impl PersistedStore {
    /// Wraps a backend.
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Rc::new(RefCell::new(Box::new(backend))),
            claims: Rc::new(RefCell::new(ClaimTable::default())),
        }
    }

    /// An in-memory store with no quota.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Reads `key`. Fails with [`StorageError::Unavailable`] if the backend
    /// is already in use further up the call stack.
    pub fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let backend = self.backend.try_borrow().map_err(|_| StorageError::Unavailable)?;
        backend.get(key)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.backend_mut()?.set(key, value)
    }

    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.backend_mut()?.remove(key)
    }

    fn backend_mut(&self) -> Result<RefMut<'_, Box<dyn KeyValueStore>>, StorageError> {
        self.backend.try_borrow_mut().map_err(|_| StorageError::Unavailable)
    }

    /// Allocates a token for a new component instance.
    pub(crate) fn token(&self) -> ClaimToken {
        let mut claims = self.claims.borrow_mut();
        claims.next_token += 1;
        ClaimToken(claims.next_token)
    }

    /// Claims write ownership of `key` for `token`.
    pub(crate) fn claim(&self, key: &str, token: ClaimToken) -> Claim {
        let mut claims = self.claims.borrow_mut();
        match claims.owners.get(key) {
            Some(owner) if *owner != token => Claim::Shared,
            _ => {
                claims.owners.insert(key.to_string(), token);
                Claim::Owner
            }
        }
    }

    /// Releases `key` if `token` owns it.
    pub(crate) fn release(&self, key: &str, token: ClaimToken) {
        let mut claims = self.claims.borrow_mut();
        if claims.owners.get(key) == Some(&token) {
            claims.owners.remove(key);
        }
    }

    /// Returns true if some live instance owns `key`.
    pub fn is_claimed(&self, key: &str) -> bool {
        self.claims.borrow().owners.contains_key(key)
    }
}

impl Default for PersistedStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl std::fmt::Debug for PersistedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistedStore")
            .field("claimed_keys", &self.claims.borrow().owners.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_claimant_owns_the_key() {
        let store = PersistedStore::in_memory();
        let a = store.token();
        let b = store.token();

        assert_eq!(store.claim("k", a), Claim::Owner);
        assert_eq!(store.claim("k", a), Claim::Owner);
        assert_eq!(store.claim("k", b), Claim::Shared);

        store.release("k", b);
        assert!(store.is_claimed("k"));

        store.release("k", a);
        assert!(!store.is_claimed("k"));
        assert_eq!(store.claim("k", b), Claim::Owner);
    }

    #[test]
    fn clones_share_backend() {
        let store = PersistedStore::in_memory();
        let other = store.clone();
        store.set("k", "v").unwrap();
        assert_eq!(other.get("k").unwrap().as_deref(), Some("v"));
        other.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn busy_backend_reports_unavailable() {
        let store = PersistedStore::in_memory();
        let _held = store.backend.borrow_mut();
        assert!(matches!(store.get("k"), Err(StorageError::Unavailable)));
        assert!(matches!(store.set("k", "v"), Err(StorageError::Unavailable)));
    }
}
