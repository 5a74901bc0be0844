use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use log::{debug, warn};

use crate::errors::SettingsError;
use crate::registry::DescriptorRegistry;
use crate::value::Value;

/// Persisted form of the store: full dotted key -> override value.
pub type Snapshot = HashMap<String, Value>;

/// Passed to observers after every successful `set`/`delete`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub key: String,
    /// New effective value (the descriptor default again after a delete).
    pub value: Value,
    /// Whether the key now reads from its default (no override present).
    pub is_default: bool,
}

pub type ObserverId = usize;

type ObserverFn = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

/// Builder for [`SettingsStore`].
#[derive(Default)]
pub struct SettingsStoreBuilder {
    registry: Option<Arc<DescriptorRegistry>>,
    snapshot: Option<Snapshot>,
    snapshot_file: Option<PathBuf>,
}

impl SettingsStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(mut self, registry: Arc<DescriptorRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Seeds the store with an override snapshot.
    pub fn with_snapshot(mut self, snapshot: Snapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Reads the initial snapshot from a RON file, if it exists. An
    /// explicit `with_snapshot` takes precedence.
    pub fn with_snapshot_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.snapshot_file = Some(path.into());
        self
    }

    pub fn build(self) -> Result<SettingsStore, SettingsError> {
        let registry = self
            .registry
            .ok_or(SettingsError::Config("registry not specified"))?;

        let store = SettingsStore {
            registry,
            overrides: RwLock::new(HashMap::new()),
            observers: RwLock::new(Vec::new()),
            next_observer_id: AtomicUsize::new(0),
            mutation: Mutex::new(()),
        };

        if let Some(path) = &self.snapshot_file {
            if path.exists() {
                store.load(SettingsStore::read_snapshot(path)?)?;
            }
        }
        if let Some(snapshot) = self.snapshot {
            store.load(snapshot)?;
        }

        Ok(store)
    }
}

/// Mapping from full dotted key to current value, backed by a
/// descriptor registry that supplies defaults.
///
/// A key without an override reads as its descriptor's default; `set`
/// validates and records an override; `delete` removes the override,
/// reverting to the default. Observers are notified synchronously, in
/// registration order, after the write has landed; each mutation and
/// its fan-out form one critical section, so a concurrent writer waits
/// until the previous mutation's observers have run. Observer callbacks
/// may read the store but must not write to it.
pub struct SettingsStore {
    registry: Arc<DescriptorRegistry>,
    overrides: RwLock<HashMap<String, Value>>,
    observers: RwLock<Vec<(ObserverId, ObserverFn)>>,
    next_observer_id: AtomicUsize,
    /// Held across a write and its notification dispatch. Readers go
    /// through `overrides` directly and never block on this.
    mutation: Mutex<()>,
}

impl SettingsStore {
    pub fn builder() -> SettingsStoreBuilder {
        SettingsStoreBuilder::new()
    }

    pub fn registry(&self) -> &DescriptorRegistry {
        &self.registry
    }

    /// Stored override if present, else the descriptor default.
    pub fn get(&self, full_key: &str) -> Result<Value, SettingsError> {
        let descriptor = self.registry.resolve(full_key)?;
        let Some(default) = descriptor.default() else {
            return Err(SettingsError::invalid(full_key, "group holds no value"));
        };
        let overrides = self.overrides.read().unwrap();
        Ok(overrides
            .get(full_key)
            .cloned()
            .unwrap_or_else(|| default.clone()))
    }

    /// Validates `value` against the key's descriptor, records the
    /// override and notifies observers.
    pub fn set(&self, full_key: &str, value: Value) -> Result<(), SettingsError> {
        let descriptor = self.registry.resolve(full_key)?;
        descriptor
            .validate(&value)
            .map_err(|reason| SettingsError::invalid(full_key, reason))?;
        let _mutation = self.mutation.lock().unwrap();
        {
            let mut overrides = self.overrides.write().unwrap();
            overrides.insert(full_key.to_string(), value.clone());
        }
        debug!("set {full_key}");
        self.notify(&ChangeEvent {
            key: full_key.to_string(),
            value,
            is_default: false,
        });
        Ok(())
    }

    /// Removes any override for `full_key`, reverting it to the
    /// descriptor default. Idempotent.
    pub fn delete(&self, full_key: &str) -> Result<(), SettingsError> {
        let descriptor = self.registry.resolve(full_key)?;
        let Some(default) = descriptor.default() else {
            return Err(SettingsError::invalid(full_key, "group holds no value"));
        };
        let _mutation = self.mutation.lock().unwrap();
        let removed = {
            let mut overrides = self.overrides.write().unwrap();
            overrides.remove(full_key)
        };
        if removed.is_some() {
            debug!("delete {full_key}");
        }
        self.notify(&ChangeEvent {
            key: full_key.to_string(),
            value: default.clone(),
            is_default: true,
        });
        Ok(())
    }

    /// Whether an override exists for `full_key`.
    pub fn contains(&self, full_key: &str) -> bool {
        self.overrides.read().unwrap().contains_key(full_key)
    }

    /// Registers an observer; callbacks run synchronously on the thread
    /// performing the mutation, after the write has landed and while the
    /// mutation section is still held. Callbacks may read the store;
    /// calling `set`/`delete`/`load` from one deadlocks.
    pub fn observe<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let id = self.next_observer_id.fetch_add(1, Ordering::Relaxed);
        self.observers
            .write()
            .unwrap()
            .push((id, Arc::new(callback)));
        id
    }

    pub fn unobserve(&self, id: ObserverId) {
        self.observers
            .write()
            .unwrap()
            .retain(|(observer_id, _)| *observer_id != id);
    }

    fn notify(&self, event: &ChangeEvent) {
        // Clone the list out so observers may (un)register re-entrantly.
        let observers: Vec<ObserverFn> = self
            .observers
            .read()
            .unwrap()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for observer in observers {
            observer(event);
        }
    }

    /// Replaces the override set with `snapshot`. Entries that match no
    /// registered leaf, or fail validation, are pruned with a warning
    /// rather than installed. Emits no observer notifications.
    pub fn load(&self, snapshot: Snapshot) -> Result<(), SettingsError> {
        let mut clean = HashMap::new();
        for (key, value) in snapshot {
            match self.registry.resolve(&key) {
                Ok(descriptor) => match descriptor.validate(&value) {
                    Ok(()) => {
                        clean.insert(key, value);
                    }
                    Err(reason) => warn!("pruning snapshot entry {key}: {reason}"),
                },
                Err(_) => warn!("pruning snapshot entry {key}: no matching descriptor"),
            }
        }
        let _mutation = self.mutation.lock().unwrap();
        *self.overrides.write().unwrap() = clean;
        Ok(())
    }

    /// Current overrides, skipping entries equal to their default.
    pub fn export(&self) -> Snapshot {
        let overrides = self.overrides.read().unwrap();
        overrides
            .iter()
            .filter(|(key, value)| {
                self.registry
                    .resolve(key.as_str())
                    .ok()
                    .and_then(|descriptor| descriptor.default())
                    .map_or(true, |default| default != *value)
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    pub fn read_snapshot(path: &Path) -> Result<Snapshot, SettingsError> {
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Snapshot::new());
        }
        ron::from_str(&content).map_err(|err| SettingsError::Snapshot(err.to_string()))
    }

    /// Writes `export()` as RON: temp file next to the target, then
    /// rename.
    pub fn write_snapshot(&self, path: &Path) -> Result<(), SettingsError> {
        let snapshot = self.export();
        let pretty = ron::ser::PrettyConfig::default();
        let text = ron::ser::to_string_pretty(&snapshot, pretty)?;
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}
