//! Data models for bucketmap

/// Keys are plain integers; a key's slot is `key % table_size`.
pub type Key = u64;

/// Bound for values stored in the map.
///
/// Values are copied across actor boundaries (a `get` returns a clone, a
/// `move` forwards the owned value to the new shard), never shared.
pub trait Value: Clone + Send + 'static {}

impl<T: Clone + Send + 'static> Value for T {}

/// A single key/value pair owned by a shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<V> {
    pub key: Key,
    pub value: V,
}

impl<V> Entry<V> {
    pub fn new(key: Key, value: V) -> Self {
        Self { key, value }
    }
}

/// Where a `set` delivered to a shard came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOrigin {
    /// Issued by a client through the coordinator. Overwrites in place.
    Client,
    /// Forwarded by a draining shard during a resize. Never replaces a value
    /// the destination already holds, since that value was written after the
    /// resize started.
    Migration,
}
