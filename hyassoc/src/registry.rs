//! Registry of side tables, indexed by instance identity.
//!
//! The registry is the only structure shared between instances. It is backed by a
//! [`DashMap`], so lookups, insertions and removals of side tables are safe to run from any
//! number of threads.
//!
//! # A note on atomicity
//! Every single operation is applied under the shard lock of the instance's side table, but
//! *sequences* of operations on the same instance are not atomic: another thread may associate
//! or disassociate a key between an [`Associable::is_associated`] check and a subsequent
//! [`Associable::associated_value`]. Concurrent writes to the same key resolve to whichever
//! write lands last.
//!
//! # A note on locking
//! Values that are replaced or removed are always dropped after the shard lock has been
//! released. A value may therefore itself own an [`AssocToken`] (e.g. a [`Tracked`] value
//! stored inside another instance's table) without deadlocking the registry when it is dropped.
//!
//! [`Associable::is_associated`]: crate::facade::Associable::is_associated
//! [`Associable::associated_value`]: crate::facade::Associable::associated_value
//! [`AssocToken`]: crate::token::AssocToken
//! [`Tracked`]: crate::facade::Tracked
use std::{any::type_name, fmt, sync::Arc};

use dashmap::DashMap;
use log::{debug, info, trace, warn};
use once_cell::sync::Lazy;

use crate::{
    key::{DefaultKeyResolver, KeyResolver},
    table::{AssocValue, Entry, Insertion, SideTable},
    token::InstanceId,
    utils::{
        conf::RegistryConfig,
        error::{AssocError, AssocResult},
    },
};

static GLOBAL_REGISTRY: Lazy<Arc<Registry>> = Lazy::new(|| {
    let path = RegistryConfig::default_path();
    let config = if path.is_file() {
        match RegistryConfig::load_from_toml(&path) {
            Ok(config) => config,
            Err(err) => {
                warn!(
                    "Ignoring association registry configuration `{}`: {}",
                    path.display(),
                    err
                );
                RegistryConfig::default()
            }
        }
    } else {
        RegistryConfig::default()
    };

    Arc::new(Registry::build(config, Box::new(DefaultKeyResolver)))
});

/// Process-wide mapping from [`InstanceId`] to that instance's [`SideTable`].
pub struct Registry {
    tables: DashMap<InstanceId, SideTable>,
    resolver: Box<dyn KeyResolver>,
    config: RegistryConfig,
}

impl Registry {
    fn build(config: RegistryConfig, resolver: Box<dyn KeyResolver>) -> Self {
        let tables = match config.shard_amount {
            Some(shards) => DashMap::with_capacity_and_shard_amount(config.initial_capacity, shards),
            None => DashMap::with_capacity(config.initial_capacity),
        };

        Self {
            tables,
            resolver,
            config,
        }
    }

    /// Create a registry with the default configuration and key resolver.
    pub fn new() -> Self {
        Self::build(RegistryConfig::default(), Box::new(DefaultKeyResolver))
    }

    /// Create a registry from `config`, after validating it.
    pub fn with_config(config: RegistryConfig) -> AssocResult<Self> {
        Self::with_resolver(config, DefaultKeyResolver)
    }

    /// Create a registry from `config` that resolves keys with `resolver`.
    pub fn with_resolver(
        config: RegistryConfig,
        resolver: impl KeyResolver + 'static,
    ) -> AssocResult<Self> {
        config.validate()?;
        Ok(Self::build(config, Box::new(resolver)))
    }

    /// The registry shared by every token created with [`crate::token::AssocToken::new`].
    ///
    /// On first use, it is configured from [`RegistryConfig::default_path`] if that file
    /// exists, falling back to the defaults otherwise.
    pub fn global() -> &'static Arc<Registry> {
        &GLOBAL_REGISTRY
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Number of instances that currently own a side table.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Whether the instance currently owns a side table. Instances whose every association was
    /// removed own none.
    pub fn contains_instance(&self, id: InstanceId) -> bool {
        self.tables.contains_key(&id)
    }

    /// Number of associations held by the instance.
    pub fn association_count(&self, id: InstanceId) -> usize {
        self.tables.get(&id).map_or(0, |table| table.len())
    }

    pub(crate) fn associate<T: AssocValue>(&self, id: InstanceId, value: T, key: &str) {
        let entry = Entry::new(self.resolver.resolve(key), value);

        let mut created = false;
        let insertion = self
            .tables
            .entry(id)
            .or_insert_with(|| {
                created = true;
                SideTable::new()
            })
            .set(entry);

        if created {
            debug!("Created side table for instance {}", id);
        }

        match insertion {
            Insertion::Inserted => {
                trace!("Associated `{}` with instance {} under '{}'", type_name::<T>(), id, key);
            }
            Insertion::Collided(names) => {
                if self.config.log_collisions {
                    info!(
                        "Detected an hash collision on key '{}' of instance {}. Keys sharing its hash: {}",
                        key,
                        id,
                        names
                            .iter()
                            .map(|name| format!("'{}'", name))
                            .collect::<Vec<_>>()
                            .join(", "),
                    );
                }
            }
            Insertion::Replaced(previous) => {
                trace!(
                    "Replaced `{}` with `{}` on instance {} under '{}'",
                    previous.type_name(),
                    type_name::<T>(),
                    id,
                    key
                );
            }
        }
    }

    pub(crate) fn try_associated_arc<T: AssocValue>(
        &self,
        id: InstanceId,
        key: &str,
    ) -> AssocResult<Arc<T>> {
        let slot = self.resolver.resolve(key);
        let not_associated = || AssocError::NotAssociated {
            key: key.to_string(),
        };

        let table = self.tables.get(&id).ok_or_else(not_associated)?;
        let entry = table.get(&slot).ok_or_else(not_associated)?;

        entry.downcast::<T>().ok_or_else(|| AssocError::TypeMismatch {
            key: key.to_string(),
            stored: entry.type_name(),
            requested: type_name::<T>(),
        })
    }

    pub(crate) fn associated_type_name(&self, id: InstanceId, key: &str) -> Option<&'static str> {
        let slot = self.resolver.resolve(key);
        let table = self.tables.get(&id)?;
        table.get(&slot).map(Entry::type_name)
    }

    pub(crate) fn is_associated(&self, id: InstanceId, key: &str) -> bool {
        let slot = self.resolver.resolve(key);
        self.tables
            .get(&id)
            .is_some_and(|table| table.contains(&slot))
    }

    pub(crate) fn associated_keys(&self, id: InstanceId) -> Vec<String> {
        self.tables
            .get(&id)
            .map(|table| table.keys().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub(crate) fn disassociate(&self, id: InstanceId, key: &str) {
        let slot = self.resolver.resolve(key);

        let removed = match self.tables.get_mut(&id) {
            Some(mut table) => table.remove(&slot),
            None => None,
        };

        if let Some(entry) = removed {
            trace!(
                "Disassociated `{}` from instance {} under '{}'",
                entry.type_name(),
                id,
                key
            );

            // Empty tables are never kept around. The check runs under the shard lock, so a
            // concurrent association in between keeps the table alive.
            if self
                .tables
                .remove_if(&id, |_, table| table.is_empty())
                .is_some()
            {
                debug!("Released empty side table of instance {}", id);
            }
        }
    }

    pub(crate) fn disassociate_all(&self, id: InstanceId) {
        if let Some(entries) = self.take_table(id) {
            debug!(
                "Disassociated {} value(s) from instance {}",
                entries.len(),
                id
            );
        }
    }

    /// Erase the side table of an instance that is being dropped.
    pub(crate) fn purge(&self, id: InstanceId) {
        if let Some(entries) = self.take_table(id) {
            debug!(
                "Purged side table of dropped instance {} ({} value(s))",
                id,
                entries.len()
            );
        }
    }

    /// Detach the instance's table from the map. The entries are handed back so that they are
    /// dropped by the caller, outside of any shard lock.
    fn take_table(&self, id: InstanceId) -> Option<Vec<Entry>> {
        let (_, mut table) = self.tables.remove(&id)?;
        Some(table.clear())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("instances", &self.tables.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
