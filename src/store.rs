//! TOML-backed persistent store.
//!
//! A [`PersistentStore`] owns one backing file holding category-grouped
//! `key = value` rows plus a top-level `version` tag used for migration
//! gating. The typed accessors are total: absent or malformed values resolve
//! to the caller-supplied default, numeric values outside their bounds are
//! clamped, and unknown enum labels fall back to the default. Every accessor
//! records the resolved value, so a store that had to repair anything
//! reports [`PersistentStore::has_changed`] and the next
//! [`PersistentStore::save`] rewrites the file in normalized form.
//!
//! # File format
//!
//! ```toml
//! version = "0.4.0"
//!
//! [advanced]
//! maxColumns = 9
//! giveMode = "INVENTORY"
//! ```

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use toml::Value;
use tracing::{debug, warn};

use crate::schema::IntBounds;
use crate::{Error, Result};

/// Raw category mapping: category -> key -> raw TOML value.
pub type RawValues = BTreeMap<String, BTreeMap<String, Value>>;

/// Hook run on load when the on-disk version tag differs from the expected
/// one. Receives the tag found in the file and the raw mapping for in-place
/// rewrites (renaming keys, moving categories).
pub type MigrateFn = fn(found_version: &str, values: &mut RawValues);

/// A category-grouped key-value store backed by one TOML file.
pub struct PersistentStore {
    path: PathBuf,
    version: String,
    migrate: Option<MigrateFn>,
    /// Category save order; declared categories first, file-only ones after.
    declared: Vec<String>,
    values: RawValues,
    dirty: bool,
}

impl PersistentStore {
    pub fn new(path: impl Into<PathBuf>, version: &str) -> Self {
        Self {
            path: path.into(),
            version: version.to_string(),
            migrate: None,
            declared: Vec::new(),
            values: RawValues::new(),
            dirty: false,
        }
    }

    /// Attach a migration hook invoked on version mismatch during `load`.
    pub fn with_migration(mut self, migrate: MigrateFn) -> Self {
        self.migrate = Some(migrate);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Read the backing file, replacing the in-memory mapping.
    ///
    /// A missing file is not an error: the store comes up empty and dirty,
    /// so the first save materializes it with defaults. An unparseable file
    /// is reported and likewise treated as empty; the next save rewrites it
    /// in valid form.
    pub fn load(&mut self) -> Result<()> {
        self.values.clear();
        self.dirty = false;

        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no store file at {}, starting empty", self.path.display());
                self.dirty = true;
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let table: toml::Table = match contents.parse() {
            Ok(table) => table,
            Err(e) => {
                warn!("unreadable store file {}: {}", self.path.display(), e);
                self.dirty = true;
                return Ok(());
            }
        };

        let mut found_version = None;
        for (key, value) in table {
            match value {
                Value::String(tag) if key == "version" => found_version = Some(tag),
                Value::Table(entries) => {
                    self.values.insert(key, entries.into_iter().collect());
                }
                other => {
                    warn!(
                        "ignoring top-level entry {} = {} in {}",
                        key,
                        other,
                        self.path.display()
                    );
                }
            }
        }

        let found_version = found_version.unwrap_or_default();
        if found_version != self.version {
            if let Some(migrate) = self.migrate {
                migrate(&found_version, &mut self.values);
            }
            debug!(
                "store {} at version {:?}, expected {:?}",
                self.path.display(),
                found_version,
                self.version
            );
            self.dirty = true;
        }

        Ok(())
    }

    /// Register a category, fixing its position in the saved file.
    pub fn add_category(&mut self, category: &str) {
        if !self.declared.iter().any(|c| c == category) {
            self.declared.push(category.to_string());
        }
        self.values.entry(category.to_string()).or_default();
    }

    fn raw(&self, category: &str, key: &str) -> Option<&Value> {
        self.values.get(category).and_then(|entries| entries.get(key))
    }

    /// Store `resolved` for `(category, key)`, marking the store changed if
    /// it differs from (or was absent in) the current raw value.
    fn record(&mut self, category: &str, key: &str, resolved: Value) {
        if !self.declared.iter().any(|c| c == category) {
            self.declared.push(category.to_string());
        }
        let entries = self.values.entry(category.to_string()).or_default();
        if entries.get(key) != Some(&resolved) {
            self.dirty = true;
            entries.insert(key.to_string(), resolved);
        }
    }

    /// Overwrite a raw value without validation, e.g. from a settings UI.
    /// The next synchronization pass re-validates it.
    pub fn set_raw(&mut self, category: &str, key: &str, value: Value) {
        self.record(category, key, value);
    }

    pub fn get_bool(&mut self, category: &str, key: &str, default: bool) -> bool {
        let resolved = match self.raw(category, key) {
            Some(Value::Boolean(b)) => *b,
            Some(other) => {
                warn!(
                    "{}.{}: expected boolean, found {}; using default {}",
                    category, key, other, default
                );
                default
            }
            None => default,
        };
        self.record(category, key, Value::Boolean(resolved));
        resolved
    }

    /// Integer accessor. Out-of-range values are clamped into `bounds`
    /// rather than rejected.
    pub fn get_int(&mut self, category: &str, key: &str, default: i64, bounds: IntBounds) -> i64 {
        let resolved = match self.raw(category, key) {
            Some(Value::Integer(i)) => {
                if bounds.contains(*i) {
                    *i
                } else {
                    let clamped = bounds.clamp(*i);
                    warn!(
                        "{}.{}: {} outside [{}, {}], clamped to {}",
                        category, key, i, bounds.min, bounds.max, clamped
                    );
                    clamped
                }
            }
            Some(other) => {
                warn!(
                    "{}.{}: expected integer, found {}; using default {}",
                    category, key, other, default
                );
                default
            }
            None => default,
        };
        self.record(category, key, Value::Integer(resolved));
        resolved
    }

    /// Enum accessor. Labels match case-insensitively and resolve to the
    /// canonical spelling from `domain`; unknown labels fall back to
    /// `default`.
    pub fn get_enum(
        &mut self,
        category: &str,
        key: &str,
        default: &str,
        domain: &[String],
    ) -> String {
        let resolved = match self.raw(category, key) {
            Some(Value::String(label)) => {
                match domain.iter().find(|d| d.eq_ignore_ascii_case(label)) {
                    Some(canonical) => canonical.clone(),
                    None => {
                        warn!(
                            "{}.{}: unrecognized label {:?}; using default {:?}",
                            category, key, label, default
                        );
                        default.to_string()
                    }
                }
            }
            Some(other) => {
                warn!(
                    "{}.{}: expected string, found {}; using default {:?}",
                    category, key, other, default
                );
                default.to_string()
            }
            None => default.to_string(),
        };
        self.record(category, key, Value::String(resolved.clone()));
        resolved
    }

    /// String-list accessor. Non-string elements are dropped with a
    /// warning; a value that is not an array resolves to `default`.
    pub fn get_string_list(
        &mut self,
        category: &str,
        key: &str,
        default: &[String],
    ) -> Vec<String> {
        let resolved = match self.raw(category, key) {
            Some(Value::Array(items)) => {
                let mut entries = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(s) => entries.push(s.clone()),
                        other => {
                            warn!(
                                "{}.{}: dropping non-string element {}",
                                category, key, other
                            );
                        }
                    }
                }
                entries
            }
            Some(other) => {
                warn!(
                    "{}.{}: expected array of strings, found {}; using defaults",
                    category, key, other
                );
                default.to_vec()
            }
            None => default.to_vec(),
        };
        let raw = Value::Array(resolved.iter().cloned().map(Value::String).collect());
        self.record(category, key, raw);
        resolved
    }

    /// True if any accessor since the last `load`/`save` resolved a value
    /// that differed from the on-disk representation.
    pub fn has_changed(&self) -> bool {
        self.dirty
    }

    /// Serialize the in-memory mapping back to the backing file: version
    /// tag first, then categories in declared order.
    pub fn save(&mut self) -> Result<()> {
        let mut out = String::new();
        let _ = writeln!(out, "version = {}", Value::from(self.version.as_str()));

        for category in self.save_order() {
            let _ = writeln!(out);
            let _ = writeln!(out, "[{}]", category);
            if let Some(entries) = self.values.get(&category) {
                for (key, value) in entries {
                    let _ = writeln!(out, "{} = {}", key, value);
                }
            }
        }

        let write = |path: &Path| -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, &out)
        };
        write(&self.path).map_err(|source| Error::StoreWrite {
            path: self.path.clone(),
            source,
        })?;

        debug!("saved {}", self.path.display());
        self.dirty = false;
        Ok(())
    }

    fn save_order(&self) -> Vec<String> {
        let mut order = self.declared.clone();
        for category in self.values.keys() {
            if !order.iter().any(|c| c == category) {
                order.push(category.clone());
            }
        }
        order
    }
}
