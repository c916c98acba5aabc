use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use crate::registry::Registry;

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an instance inside a [`Registry`].
///
/// Identities are drawn from a process-wide counter and never reused, so a freshly created
/// instance can never observe associations left behind by a dead one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(u64);

impl InstanceId {
    fn next() -> Self {
        InstanceId(NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifetime anchor of an instance's associations.
///
/// The owning instance stores the token as one of its fields. Dropping the token (which happens
/// exactly once, when the owner itself is dropped) erases the instance's side table from the
/// registry. The registry holds no reference back to the instance.
///
/// Cloning a token yields a **new** identity without associations: associations belong to an
/// instance, not to the data it holds.
pub struct AssocToken {
    id: InstanceId,
    registry: Arc<Registry>,
}

impl AssocToken {
    /// Create a token bound to the process-wide registry.
    pub fn new() -> Self {
        Self::new_in(Registry::global())
    }

    /// Create a token bound to `registry`.
    pub fn new_in(registry: &Arc<Registry>) -> Self {
        Self {
            id: InstanceId::next(),
            registry: Arc::clone(registry),
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl Default for AssocToken {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for AssocToken {
    fn clone(&self) -> Self {
        Self::new_in(&self.registry)
    }
}

impl fmt::Debug for AssocToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AssocToken").field(&self.id).finish()
    }
}

impl Drop for AssocToken {
    fn drop(&mut self) {
        self.registry.purge(self.id);
    }
}
