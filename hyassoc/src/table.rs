//! Per-instance side tables.
//!
//! A [`SideTable`] maps [`SlotKey`]s to type-erased [`Entry`] values. Entries are grouped in
//! buckets by key hash; within a bucket the original key string decides which entry is meant,
//! so two keys sharing a hash never alias each other.
use std::{
    any::{TypeId, type_name},
    collections::HashMap,
    fmt,
    sync::Arc,
};

use downcast_rs::{DowncastSync, impl_downcast};
use smallvec::SmallVec;

use crate::key::SlotKey;

/// Any value that can be attached to an instance.
///
/// Implemented for every `Send + Sync + 'static` type; values are recovered through the
/// downcasting methods generated by `downcast-rs`.
pub trait AssocValue: DowncastSync {}
impl<T: DowncastSync> AssocValue for T {}
impl_downcast!(sync AssocValue);

/// A single association: key, type tag and value.
#[derive(Clone)]
pub struct Entry {
    slot: SlotKey,
    type_id: TypeId,
    type_name: &'static str,
    value: Arc<dyn AssocValue>,
}

impl Entry {
    pub fn new<T: AssocValue>(slot: SlotKey, value: T) -> Self {
        Self {
            slot,
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            value: Arc::new(value),
        }
    }

    pub fn slot(&self) -> &SlotKey {
        &self.slot
    }

    /// Name of the stored type, as reported by [`std::any::type_name`].
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether the stored value is exactly a `T`.
    pub fn holds<T: AssocValue>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Recover the stored value as a `T`. Returns [`None`] if the value has another type.
    pub fn downcast<T: AssocValue>(&self) -> Option<Arc<T>> {
        if !self.holds::<T>() {
            return None;
        }

        Arc::clone(&self.value).downcast_arc::<T>().ok()
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("slot", &self.slot)
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Outcome of [`SideTable::set`].
#[derive(Debug)]
pub enum Insertion {
    /// The key was not present.
    Inserted,

    /// The key was not present, but its hash bucket already held the listed keys.
    Collided(Vec<Arc<str>>),

    /// The key was present; the previous entry is handed back so it can be dropped by the
    /// caller at a convenient point.
    Replaced(Entry),
}

/// Mapping from key to association entry for a single instance.
#[derive(Debug, Default)]
pub struct SideTable {
    buckets: HashMap<u64, SmallVec<[Entry; 1]>>,
    len: usize,
}

impl SideTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert `entry`, replacing any entry stored under the same key regardless of its type.
    pub fn set(&mut self, entry: Entry) -> Insertion {
        let bucket = self.buckets.entry(entry.slot.hash()).or_default();

        if let Some(existing) = bucket
            .iter_mut()
            .find(|existing| existing.slot.matches(entry.slot.name()))
        {
            return Insertion::Replaced(std::mem::replace(existing, entry));
        }

        let collided: Vec<Arc<str>> = bucket
            .iter()
            .map(|existing| Arc::from(existing.slot.name()))
            .collect();
        bucket.push(entry);
        self.len += 1;

        if collided.is_empty() {
            Insertion::Inserted
        } else {
            Insertion::Collided(collided)
        }
    }

    pub fn get(&self, slot: &SlotKey) -> Option<&Entry> {
        self.buckets
            .get(&slot.hash())?
            .iter()
            .find(|entry| entry.slot.matches(slot.name()))
    }

    /// Whether an entry exists for `slot`, whatever its type.
    pub fn contains(&self, slot: &SlotKey) -> bool {
        self.get(slot).is_some()
    }

    /// Remove the entry stored under `slot`, if any.
    pub fn remove(&mut self, slot: &SlotKey) -> Option<Entry> {
        let bucket = self.buckets.get_mut(&slot.hash())?;
        let index = bucket
            .iter()
            .position(|entry| entry.slot.matches(slot.name()))?;

        let removed = bucket.swap_remove(index);
        if bucket.is_empty() {
            self.buckets.remove(&slot.hash());
        }
        self.len -= 1;
        Some(removed)
    }

    /// Remove every entry, handing them back to the caller.
    pub fn clear(&mut self) -> Vec<Entry> {
        self.len = 0;
        self.buckets
            .drain()
            .flat_map(|(_, bucket)| bucket.into_iter())
            .collect()
    }

    /// Iterate over the key names stored in this table, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.buckets
            .values()
            .flat_map(|bucket| bucket.iter().map(|entry| entry.slot.name()))
    }
}
