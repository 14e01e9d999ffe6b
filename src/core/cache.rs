//! core::cache
//!
//! Read-through memoization used by the origin resolver.
//!
//! # Design
//!
//! A [`LazyMap`] is a plain key/value store with an explicit
//! get-or-compute contract: the first lookup of a key runs the supplied
//! computation and stores its value, later lookups are served from the
//! store. There is no eviction and no invalidation; the lifetime of the
//! cached data is the lifetime of the owner.
//!
//! Failed computations are not stored, so a transient error on a miss is
//! retried on the next lookup of the same key.
//!
//! The map is unsynchronized. Owners that want concurrent lookups must put
//! their own lock around it.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;

/// Lazily populated lookup table.
///
/// # Example
///
/// ```
/// use obs_origin::core::cache::LazyMap;
///
/// # tokio_test::block_on(async {
/// let mut cache: LazyMap<String, usize> = LazyMap::new();
///
/// let len = cache
///     .get_or_try_compute("zypper".to_string(), || async { Ok::<_, ()>(6) })
///     .await
///     .unwrap();
/// assert_eq!(*len, 6);
///
/// // A second lookup does not run the computation.
/// let len = cache
///     .get_or_try_compute("zypper".to_string(), || async { Err(()) })
///     .await
///     .unwrap();
/// assert_eq!(*len, 6);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct LazyMap<K, V> {
    entries: HashMap<K, V>,
}

impl<K, V> LazyMap<K, V>
where
    K: Eq + Hash,
{
    /// Create an empty map.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    ///
    /// # Errors
    ///
    /// Returns the error of `compute`. Nothing is stored in that case.
    pub async fn get_or_try_compute<F, Fut, E>(&mut self, key: K, compute: F) -> Result<&V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        match self.entries.entry(key) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let value = compute().await?;
                Ok(entry.insert(value))
            }
        }
    }

    /// Synchronous variant of [`get_or_try_compute`](Self::get_or_try_compute).
    pub fn get_or_insert_with<F>(&mut self, key: K, compute: F) -> &V
    where
        F: FnOnce() -> V,
    {
        self.entries.entry(key).or_insert_with(compute)
    }

    /// Look up a cached value without computing anything.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Whether `key` has already been computed.
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Store a value directly, replacing any previous one.
    pub fn insert(&mut self, key: K, value: V) {
        self.entries.insert(key, value);
    }

    /// Number of cached keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every cached value.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<K, V> Default for LazyMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}
