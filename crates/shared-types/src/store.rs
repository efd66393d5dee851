//! # Ordered Key-Value Store
//!
//! Every module persists its records through [`KvStore`]. Keys are compared
//! bytewise and scans always return entries in key order, so two replicas
//! iterating the same state observe the same sequence.
//!
//! ```text
//!   Context ──▶ CacheStore (per tx / per block branch)
//!                   │ write() on success, drop on failure
//!                   ▼
//!               MemStore (committed state)
//! ```

use std::collections::BTreeMap;
use std::ops::Bound;

/// Key/value pairs returned by a scan, in scan order.
pub type ScanResult = Vec<(Vec<u8>, Vec<u8>)>;

/// A single write in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

/// Synchronous ordered key-value store.
pub trait KvStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    fn has(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>);

    fn delete(&mut self, key: &[u8]);

    /// All entries whose key starts with `prefix`, ascending.
    fn scan(&self, prefix: &[u8]) -> ScanResult;

    /// All entries whose key starts with `prefix`, descending.
    fn scan_rev(&self, prefix: &[u8]) -> ScanResult {
        let mut entries = self.scan(prefix);
        entries.reverse();
        entries
    }

    /// First entry under `prefix` whose key sorts strictly after `start`.
    /// `start` must itself begin with `prefix`.
    fn first_after(&self, prefix: &[u8], start: &[u8]) -> Option<(Vec<u8>, Vec<u8>)> {
        self.scan(prefix).into_iter().find(|(k, _)| k.as_slice() > start)
    }

    /// Apply a batch in order.
    fn apply_batch(&mut self, operations: Vec<BatchOperation>) {
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => self.set(&key, value),
                BatchOperation::Delete { key } => self.delete(&key),
            }
        }
    }
}

// =============================================================================
// MEMSTORE
// =============================================================================

/// B-tree backed committed store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl KvStore for MemStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.data.get(key).cloned()
    }

    fn has(&self, key: &[u8]) -> bool {
        self.data.contains_key(key)
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) {
        self.data.insert(key.to_vec(), value);
    }

    fn delete(&mut self, key: &[u8]) {
        self.data.remove(key);
    }

    fn scan(&self, prefix: &[u8]) -> ScanResult {
        self.data
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn first_after(&self, prefix: &[u8], start: &[u8]) -> Option<(Vec<u8>, Vec<u8>)> {
        self.data
            .range::<[u8], _>((Bound::Excluded(start), Bound::Unbounded))
            .next()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
    }
}

// =============================================================================
// CACHESTORE
// =============================================================================

/// Write overlay over a parent store.
///
/// Reads fall through to the parent unless the key was written in the
/// overlay. Nothing reaches the parent until [`CacheStore::write`].
pub struct CacheStore<'p> {
    parent: &'p mut dyn KvStore,
    // None marks a pending delete
    writes: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl<'p> CacheStore<'p> {
    pub fn new(parent: &'p mut dyn KvStore) -> Self {
        Self {
            parent,
            writes: BTreeMap::new(),
        }
    }

    /// Number of keys touched in the overlay.
    pub fn pending(&self) -> usize {
        self.writes.len()
    }

    /// Flush the overlay into the parent.
    pub fn write(self) {
        let CacheStore { parent, writes } = self;
        let batch = writes
            .into_iter()
            .map(|(key, value)| match value {
                Some(value) => BatchOperation::Put { key, value },
                None => BatchOperation::Delete { key },
            })
            .collect();
        parent.apply_batch(batch);
    }
}

impl KvStore for CacheStore<'_> {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.writes.get(key) {
            Some(pending) => pending.clone(),
            None => self.parent.get(key),
        }
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) {
        self.writes.insert(key.to_vec(), Some(value));
    }

    fn delete(&mut self, key: &[u8]) {
        self.writes.insert(key.to_vec(), None);
    }

    fn scan(&self, prefix: &[u8]) -> ScanResult {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> = self.parent.scan(prefix).into_iter().collect();
        for (key, pending) in self
            .writes
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
        {
            match pending {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        merged.into_iter().collect()
    }

    fn first_after(&self, prefix: &[u8], start: &[u8]) -> Option<(Vec<u8>, Vec<u8>)> {
        let mut cursor = start.to_vec();
        loop {
            let committed = self.parent.first_after(prefix, &cursor);
            let pending = self
                .writes
                .range::<[u8], _>((Bound::Excluded(cursor.as_slice()), Bound::Unbounded))
                .next()
                .filter(|(k, _)| k.starts_with(prefix));

            let (key, value) = match pending {
                None => return committed,
                Some(entry) => entry,
            };
            if let Some((parent_key, _)) = &committed {
                if parent_key < key {
                    return committed;
                }
            }
            match value {
                Some(value) => return Some((key.clone(), value.clone())),
                // deleted in the overlay, keep walking
                None => cursor = key.clone(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memstore_scan_is_ordered_and_prefix_bounded() {
        let mut store = MemStore::new();
        store.set(b"po/3", b"c".to_vec());
        store.set(b"po/1", b"a".to_vec());
        store.set(b"po/2", b"b".to_vec());
        store.set(b"pp/1", b"x".to_vec());

        let keys: Vec<_> = store.scan(b"po/").into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![b"po/1".to_vec(), b"po/2".to_vec(), b"po/3".to_vec()]);

        let rev: Vec<_> = store.scan_rev(b"po/").into_iter().map(|(_, v)| v).collect();
        assert_eq!(rev, vec![b"c".to_vec(), b"b".to_vec(), b"a".to_vec()]);
    }

    #[test]
    fn test_cache_store_discard_leaves_parent_untouched() {
        let mut parent = MemStore::new();
        parent.set(b"k", b"v".to_vec());
        {
            let mut cache = CacheStore::new(&mut parent);
            cache.set(b"k", b"changed".to_vec());
            cache.set(b"n", b"new".to_vec());
            assert_eq!(cache.get(b"k"), Some(b"changed".to_vec()));
        }
        assert_eq!(parent.get(b"k"), Some(b"v".to_vec()));
        assert!(!parent.has(b"n"));
    }

    #[test]
    fn test_cache_store_write_flushes_puts_and_deletes() {
        let mut parent = MemStore::new();
        parent.set(b"a", b"1".to_vec());
        parent.set(b"b", b"2".to_vec());

        let mut cache = CacheStore::new(&mut parent);
        cache.delete(b"a");
        cache.set(b"c", b"3".to_vec());
        assert!(!cache.has(b"a"));
        assert_eq!(cache.pending(), 2);
        cache.write();

        assert!(!parent.has(b"a"));
        assert_eq!(parent.get(b"c"), Some(b"3".to_vec()));
        assert_eq!(parent.len(), 2);
    }

    #[test]
    fn test_cache_store_scan_merges_overlay() {
        let mut parent = MemStore::new();
        parent.set(b"x/1", b"p1".to_vec());
        parent.set(b"x/2", b"p2".to_vec());

        let mut cache = CacheStore::new(&mut parent);
        cache.delete(b"x/1");
        cache.set(b"x/3", b"c3".to_vec());
        cache.set(b"x/2", b"c2".to_vec());

        let entries = cache.scan(b"x/");
        assert_eq!(
            entries,
            vec![
                (b"x/2".to_vec(), b"c2".to_vec()),
                (b"x/3".to_vec(), b"c3".to_vec()),
            ]
        );
    }

    #[test]
    fn test_memstore_first_after_stays_in_prefix() {
        let mut store = MemStore::new();
        store.set(b"x/1", b"a".to_vec());
        store.set(b"x/3", b"c".to_vec());
        store.set(b"y/0", b"z".to_vec());

        assert_eq!(store.first_after(b"x/", b"x/"), Some((b"x/1".to_vec(), b"a".to_vec())));
        assert_eq!(store.first_after(b"x/", b"x/1"), Some((b"x/3".to_vec(), b"c".to_vec())));
        assert_eq!(store.first_after(b"x/", b"x/3"), None);
    }

    #[test]
    fn test_cache_store_first_after_merges_overlay() {
        let mut parent = MemStore::new();
        parent.set(b"x/1", b"p1".to_vec());
        parent.set(b"x/2", b"p2".to_vec());
        parent.set(b"x/4", b"p4".to_vec());

        let mut cache = CacheStore::new(&mut parent);
        cache.delete(b"x/1");
        cache.delete(b"x/2");
        cache.set(b"x/3", b"c3".to_vec());

        assert_eq!(cache.first_after(b"x/", b"x/"), Some((b"x/3".to_vec(), b"c3".to_vec())));
        assert_eq!(cache.first_after(b"x/", b"x/3"), Some((b"x/4".to_vec(), b"p4".to_vec())));
        cache.delete(b"x/4");
        assert_eq!(cache.first_after(b"x/", b"x/3"), None);
    }

    #[test]
    fn test_nested_cache_stores() {
        let mut parent = MemStore::new();
        let mut outer = CacheStore::new(&mut parent);
        {
            let mut inner = CacheStore::new(&mut outer);
            inner.set(b"k", b"inner".to_vec());
            inner.write();
        }
        assert_eq!(outer.get(b"k"), Some(b"inner".to_vec()));
        outer.write();
        assert_eq!(parent.get(b"k"), Some(b"inner".to_vec()));
    }
}
