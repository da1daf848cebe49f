//! Synchronization passes and published snapshots.
//!
//! [`synchronize`] walks a [`SettingsSchema`] against a
//! [`PersistentStore`], resolving every declared entry to a validated value
//! and accumulating the results into an immutable [`SettingsSnapshot`].
//! Consumers never hold the store or the schema; they hold a
//! [`SettingsHandle`] and read whole snapshots from it. Replacing the
//! snapshot is an `Arc` swap, so a reader observes either the previous pass
//! or the new one in full, never a mix.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use tracing::warn;

use crate::schema::{SettingKind, SettingValue, SettingsSchema};
use crate::store::PersistentStore;
use crate::Error;

/// Immutable mapping from `(category, key)` to a resolved value.
///
/// Produced once per synchronization pass and never mutated in place; a new
/// snapshot replaces the old one on reload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsSnapshot {
    values: BTreeMap<(String, String), SettingValue>,
}

impl SettingsSnapshot {
    pub(crate) fn insert(&mut self, category: &str, key: &str, value: SettingValue) {
        self.values
            .insert((category.to_string(), key.to_string()), value);
    }

    pub fn get(&self, category: &str, key: &str) -> Option<&SettingValue> {
        self.values
            .get(&(category.to_string(), key.to_string()))
    }

    pub fn bool(&self, category: &str, key: &str) -> Option<bool> {
        self.get(category, key).and_then(SettingValue::as_bool)
    }

    pub fn int(&self, category: &str, key: &str) -> Option<i64> {
        self.get(category, key).and_then(SettingValue::as_int)
    }

    pub fn enum_label(&self, category: &str, key: &str) -> Option<&str> {
        self.get(category, key).and_then(SettingValue::as_enum)
    }

    pub fn list(&self, category: &str, key: &str) -> Option<&[String]> {
        self.get(category, key).and_then(SettingValue::as_list)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(String, String), &SettingValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Combine two snapshots; entries from `other` win on collision.
    pub fn merged(mut self, other: SettingsSnapshot) -> SettingsSnapshot {
        self.values.extend(other.values);
        self
    }
}

/// Cloneable reader handle over the currently published snapshot.
///
/// Any number of readers may call [`current`](Self::current) concurrently,
/// including while a publisher swaps in a new snapshot. Publication should
/// come from a single owner (the service serializes its passes).
#[derive(Debug, Clone, Default)]
pub struct SettingsHandle {
    inner: Arc<RwLock<Arc<SettingsSnapshot>>>,
}

impl SettingsHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently published snapshot.
    pub fn current(&self) -> Arc<SettingsSnapshot> {
        self.inner.read().expect("snapshot lock poisoned").clone()
    }

    /// Atomically replace the published snapshot.
    pub fn publish(&self, snapshot: SettingsSnapshot) {
        let mut guard = self.inner.write().expect("snapshot lock poisoned");
        *guard = Arc::new(snapshot);
    }
}

/// Outcome of one synchronization pass over a (schema, store) pair.
#[derive(Debug)]
pub struct SyncResult {
    pub snapshot: SettingsSnapshot,
    /// Whether any resolved value differed from the on-disk representation.
    pub changed: bool,
    /// Set when persisting was requested and the save failed; the snapshot
    /// is still valid and carries the unsaved in-memory values.
    pub save_error: Option<Error>,
}

/// Resolve every setting declared in `schema` against `store`.
///
/// When `persist` is set and the pass repaired, defaulted, or normalized
/// anything, the store is saved. A save failure is reported in the result
/// but does not abort snapshot construction.
pub fn synchronize(
    schema: &SettingsSchema,
    store: &mut PersistentStore,
    persist: bool,
) -> SyncResult {
    for category in schema.categories() {
        store.add_category(category);
    }

    let mut snapshot = SettingsSnapshot::default();
    for setting in schema.settings() {
        let value = match &setting.kind {
            SettingKind::Bool { default } => {
                SettingValue::Bool(store.get_bool(&setting.category, &setting.key, *default))
            }
            SettingKind::Int { default, bounds } => SettingValue::Int(store.get_int(
                &setting.category,
                &setting.key,
                *default,
                *bounds,
            )),
            SettingKind::Enum { default, domain } => SettingValue::Enum(store.get_enum(
                &setting.category,
                &setting.key,
                default,
                domain,
            )),
            SettingKind::StringList { default } => SettingValue::List(store.get_string_list(
                &setting.category,
                &setting.key,
                default,
            )),
        };
        snapshot.insert(&setting.category, &setting.key, value);
    }

    let changed = store.has_changed();
    let mut save_error = None;
    if persist && changed {
        if let Err(e) = store.save() {
            warn!("failed to persist {}: {}", store.path().display(), e);
            save_error = Some(e);
        }
    }

    SyncResult {
        snapshot,
        changed,
        save_error,
    }
}
