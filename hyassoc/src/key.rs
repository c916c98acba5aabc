//! Key resolution
//!
//! Association keys are human-readable strings. A [`KeyResolver`] turns them into a [`SlotKey`]:
//! a 64-bit hash used to pick a bucket in the side table, together with the original string
//! used to disambiguate keys whose hashes collide.
use std::{
    fmt,
    hash::{DefaultHasher, Hash, Hasher},
    sync::Arc,
};

/// Resolved form of an association key.
///
/// Two equal strings always resolve to equal slot keys. Two distinct strings may share a
/// [`SlotKey::hash`], in which case [`SlotKey::matches`] tells them apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotKey {
    hash: u64,
    name: Arc<str>,
}

impl SlotKey {
    pub fn new(hash: u64, name: &str) -> Self {
        Self {
            hash,
            name: Arc::from(name),
        }
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exact comparison against the original key string.
    pub fn matches(&self, key: &str) -> bool {
        &*self.name == key
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' (0x{:016x})", self.name, self.hash)
    }
}

/// Turns a string key into a [`SlotKey`].
///
/// Implementations must be pure: the same input yields the same output for the whole
/// lifetime of the process. They are not required to be collision free.
pub trait KeyResolver: Send + Sync {
    fn resolve(&self, key: &str) -> SlotKey;
}

/// Resolver backed by the standard library's SipHash with fixed keys.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultKeyResolver;

impl KeyResolver for DefaultKeyResolver {
    fn resolve(&self, key: &str) -> SlotKey {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        SlotKey::new(hasher.finish(), key)
    }
}
