//! Per-instance view of the persisted store.
//!
//! Keys are `<namespace>-<version>-<id>` unless the instance declares a
//! `storageKey`; auxiliary text lives under `<key>-alt`. Every failure is
//! logged and swallowed: the in-memory value stays authoritative.

use crate::store::{Claim, ClaimToken, PersistedStore};

#[derive(Debug)]
pub(crate) struct Persistence {
    store: PersistedStore,
    token: ClaimToken,
    namespace: String,
    version: String,
    key: Option<String>,
    claim: Option<Claim>,
    warned_missing_id: bool,
    warned_shared: bool,
}

impl Persistence {
    pub(crate) fn new(store: PersistedStore, namespace: &str, version: &str) -> Self {
        let token = store.token();
        Self {
            store,
            token,
            namespace: namespace.to_string(),
            version: version.to_string(),
            key: None,
            claim: None,
            warned_missing_id: false,
            warned_shared: false,
        }
    }

    /// Recomputes the key, releasing any claim on the old one.
    pub(crate) fn rekey(&mut self, id: Option<&str>, storage_key: Option<&str>) {
        let key = match (storage_key, id) {
            (Some(k), _) => Some(k.to_string()),
            (None, Some(id)) => Some(format!("{}-{}-{}", self.namespace, self.version, id)),
            (None, None) => None,
        };
        if key != self.key {
            self.release();
            self.key = key;
        }
    }

    pub(crate) fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub(crate) fn alt_key(&self) -> Option<String> {
        self.key.as_ref().map(|k| format!("{k}-alt"))
    }

    /// The key to use when `persist` is requested, warning once if there is none.
    fn active_key(&mut self, persist: bool) -> Option<String> {
        if !persist {
            return None;
        }
        if self.key.is_none() {
            if !self.warned_missing_id {
                self.warned_missing_id = true;
                tracing::warn!(
                    "persist requested without an id; persistence disabled for this instance"
                );
            }
            return None;
        }
        self.key.clone()
    }

    /// Whether this instance may write its key.
    fn owns(&mut self, key: &str) -> bool {
        let claim = match self.claim {
            Some(claim) => claim,
            None => {
                let claim = self.store.claim(key, self.token);
                self.claim = Some(claim);
                claim
            }
        };
        if claim == Claim::Shared && !self.warned_shared {
            self.warned_shared = true;
            tracing::warn!(
                key,
                "persistence key already owned by another instance; writes disabled"
            );
        }
        claim == Claim::Owner
    }

    pub(crate) fn load(&mut self, persist: bool) -> Option<String> {
        let key = self.active_key(persist)?;
        self.owns(&key);
        self.read(&key)
    }

    pub(crate) fn load_alt(&mut self, persist: bool) -> Option<String> {
        self.active_key(persist)?;
        let key = self.alt_key()?;
        self.read(&key)
    }

    /// Writes `value`, or removes the key when `value` is empty.
    pub(crate) fn save(&mut self, persist: bool, value: &str) {
        let Some(key) = self.active_key(persist) else {
            return;
        };
        if self.owns(&key) {
            self.write(&key, value);
        }
    }

    pub(crate) fn save_alt(&mut self, persist: bool, value: &str) {
        let Some(key) = self.active_key(persist) else {
            return;
        };
        if self.owns(&key) {
            let alt = format!("{key}-alt");
            self.write(&alt, value);
        }
    }

    /// Removes both records. Used when `persist` is turned off.
    pub(crate) fn clear(&mut self) {
        let Some(key) = self.key.clone() else {
            return;
        };
        if !self.owns(&key) {
            return;
        }
        for k in [key.clone(), format!("{key}-alt")] {
            if let Err(error) = self.store.remove(&k) {
                tracing::warn!(key = %k, %error, "failed to remove persisted record");
            }
        }
    }

    /// Gives up ownership of the current key.
    pub(crate) fn release(&mut self) {
        if let (Some(key), Some(Claim::Owner)) = (&self.key, self.claim) {
            self.store.release(key, self.token);
        }
        self.claim = None;
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(key, %error, "failed to read persisted record");
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) {
        let result = if value.is_empty() {
            self.store.remove(key)
        } else {
            self.store.set(key, value)
        };
        if let Err(error) = result {
            tracing::warn!(key, %error, "failed to write persisted record");
        }
    }
}

impl Drop for Persistence {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn persistence(store: &PersistedStore, id: Option<&str>) -> Persistence {
        let mut p = Persistence::new(store.clone(), "vellum", "v1");
        p.rekey(id, None);
        p
    }

    #[test]
    fn derives_namespaced_keys() {
        let store = PersistedStore::in_memory();
        let mut p = persistence(&store, Some("t1"));
        assert_eq!(p.key(), Some("vellum-v1-t1"));
        assert_eq!(p.alt_key().as_deref(), Some("vellum-v1-t1-alt"));

        p.rekey(Some("t1"), Some("custom"));
        assert_eq!(p.key(), Some("custom"));
    }

    #[test]
    fn no_id_means_no_writes() {
        let store = PersistedStore::in_memory();
        let mut p = persistence(&store, None);
        p.save(true, "x");
        p.save(true, "y");
        assert_eq!(p.load(true), None);
        assert!(p.warned_missing_id);
    }

    #[test]
    fn empty_value_removes_key() {
        let store = PersistedStore::in_memory();
        let mut p = persistence(&store, Some("t1"));
        p.save(true, "Hello");
        assert_eq!(store.get("vellum-v1-t1").unwrap().as_deref(), Some("Hello"));
        p.save(true, "");
        assert_eq!(store.get("vellum-v1-t1").unwrap(), None);
    }

    #[test]
    fn persist_off_writes_nothing() {
        let store = PersistedStore::in_memory();
        let mut p = persistence(&store, Some("t1"));
        p.save(false, "Hello");
        assert_eq!(store.get("vellum-v1-t1").unwrap(), None);
    }

    #[test]
    fn second_instance_reads_but_does_not_write() {
        let store = PersistedStore::in_memory();
        let mut first = persistence(&store, Some("dup"));
        let mut second = persistence(&store, Some("dup"));

        first.save(true, "one");
        assert_eq!(second.load(true).as_deref(), Some("one"));
        second.save(true, "two");
        assert_eq!(store.get("vellum-v1-dup").unwrap().as_deref(), Some("one"));

        drop(first);
        let mut third = persistence(&store, Some("dup"));
        third.save(true, "three");
        assert_eq!(store.get("vellum-v1-dup").unwrap().as_deref(), Some("three"));
    }

    #[test]
    fn storage_failure_is_swallowed() {
        let store = PersistedStore::new(MemoryStore::with_quota(4));
        let mut p = persistence(&store, Some("t1"));
        p.save(true, "far too long for the quota");
        assert_eq!(store.get("vellum-v1-t1").unwrap(), None);
    }
}
