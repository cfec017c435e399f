//! Per-route attribute bag.
//!
//! Every [`Exchange`](crate::Exchange) dispatched to a route holds a clone of
//! that route's [`Attributes`]. Clones share one map, so the bag is the main
//! piece of cross-request mutable state in a server.
//!
//! # Consistency
//!
//! The map is a [`DashMap`]: each key lives in a lock-protected shard, so
//! readers and writers on different tasks never race. Every exchange observes
//! a consistent, if possibly stale, view. A write that has returned is visible
//! to any read that starts afterwards; writes from one exchange are not
//! ordered relative to reads from a concurrent one unless the caller orders
//! them. Use [`Attributes::update`] for read-modify-write.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// A type-erased attribute value.
pub type AttributeValue = Arc<dyn Any + Send + Sync>;

/// Shared string-keyed attribute map. Cloning is cheap and aliases the map.
#[derive(Clone, Default)]
pub struct Attributes {
    inner: Arc<DashMap<String, AttributeValue>>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, returning whatever was there before.
    pub fn insert<T>(&self, key: impl Into<String>, value: T) -> Option<AttributeValue>
    where
        T: Any + Send + Sync,
    {
        self.insert_arc(key, Arc::new(value))
    }

    /// Stores an already shared value without re-wrapping it.
    pub fn insert_arc(&self, key: impl Into<String>, value: AttributeValue) -> Option<AttributeValue> {
        self.inner.insert(key.into(), value)
    }

    /// Typed lookup. `None` if the key is absent or holds another type.
    pub fn get<T>(&self, key: &str) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.get_raw(key)?.downcast::<T>().ok()
    }

    /// Untyped lookup.
    pub fn get_raw(&self, key: &str) -> Option<AttributeValue> {
        // Clone out of the shard guard so no lock outlives this call.
        self.inner.get(key).map(|entry| Arc::clone(entry.value()))
    }

    pub fn remove(&self, key: &str) -> Option<AttributeValue> {
        self.inner.remove(key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Snapshot of the current keys, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.inner.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Atomically replaces the `T` stored under `key` with `f(current)`.
    ///
    /// A missing key, or one holding a value of another type, starts from
    /// `default`. The shard lock is held while `f` runs, so keep it short and
    /// never touch this bag from inside it. Returns the stored value.
    pub fn update<T, F>(&self, key: &str, default: T, f: F) -> Arc<T>
    where
        T: Any + Send + Sync,
        F: FnOnce(&T) -> T,
    {
        match self.inner.entry(key.to_owned()) {
            Entry::Occupied(mut occupied) => {
                let next = match (**occupied.get()).downcast_ref::<T>() {
                    Some(current) => Arc::new(f(current)),
                    None          => Arc::new(f(&default)),
                };
                occupied.insert(next.clone());
                next
            }
            Entry::Vacant(vacant) => {
                let next = Arc::new(f(&default));
                vacant.insert(next.clone());
                next
            }
        }
    }

    /// `true` when both handles point at the same map.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attributes").field("keys", &self.keys()).finish()
    }
}
