//! The configuration service for the overlay client.
//!
//! [`ConfigService`] owns the two backing stores (main overlay settings and
//! search-color names), runs synchronization passes over them, and
//! publishes the merged result as an immutable snapshot. Typed read
//! accessors go through the published snapshot and never touch the disk.
//!
//! Lifecycle: construct, call [`ConfigService::initialize`] exactly once,
//! then [`ConfigService::sync_all`] or [`ConfigService::reload_from_disk`]
//! as needed. The transition operations take `&mut self`, so at most one
//! pass runs at a time; readers hold [`SettingsHandle`] clones and may read
//! concurrently with a pass.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::derived::{build_color_table, ColorRegistry, NullRegistry};
use crate::schema::{SettingsSchema, TypedSetting};
use crate::store::PersistentStore;
use crate::sync::{synchronize, SettingsHandle, SettingsSnapshot};
use crate::{Error, Result};

pub const CATEGORY_ADVANCED: &str = "advanced";
pub const CATEGORY_SEARCH_COLORS: &str = "searchColors";

pub const SMALLEST_NUM_COLUMNS: i64 = 4;
pub const LARGEST_NUM_COLUMNS: i64 = 100;
pub const MIN_PANEL_HEIGHT: i64 = 175;
pub const MAX_PANEL_HEIGHT: i64 = 5000;

const DEFAULT_MAX_COLUMNS: i64 = 9;
const DEFAULT_PANEL_HEIGHT: i64 = 350;

pub const OVERLAY_FILE: &str = "overlay.toml";
pub const SEARCH_COLORS_FILE: &str = "search-colors.toml";

const OVERLAY_VERSION: &str = "0.4.0";
const SEARCH_COLORS_VERSION: &str = "0.1.0";

const KEY_CENTER_SEARCH_BAR: &str = "centerSearchBarEnabled";
const KEY_GIVE_MODE: &str = "giveMode";
const KEY_MAX_COLUMNS: &str = "maxColumns";
const KEY_MAX_PANEL_HEIGHT: &str = "maxPanelHeight";
const KEY_DEBUG_MODE: &str = "debugModeEnabled";
pub const KEY_SEARCH_COLORS: &str = "searchColors";

/// Built-in color-name table, written out when the colors file is absent.
pub const DEFAULT_SEARCH_COLORS: [&str; 16] = [
    "White:FFFFFFFF",
    "LightGray:ABABABFF",
    "Gray:555555FF",
    "Black:141414FF",
    "Red:B02E26FF",
    "Orange:F9801DFF",
    "Yellow:FED83DFF",
    "Lime:80C71FFF",
    "Green:5E7C16FF",
    "Cyan:169C9CFF",
    "LightBlue:3AB3DAFF",
    "Blue:3C44AAFF",
    "Purple:8932B8FF",
    "Magenta:C74EBDFF",
    "Pink:F38BAAFF",
    "Brown:835432FF",
];

/// How a picked item is handed over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GiveMode {
    /// Deliver straight into the inventory (default)
    #[default]
    Inventory,
    /// Attach to the mouse cursor
    MousePickup,
}

impl GiveMode {
    pub const LABELS: [&'static str; 2] = ["INVENTORY", "MOUSE_PICKUP"];

    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "INVENTORY" => Some(GiveMode::Inventory),
            "MOUSE_PICKUP" => Some(GiveMode::MousePickup),
            _ => None,
        }
    }

    /// Convert to the canonical label.
    pub fn as_str(&self) -> &'static str {
        match self {
            GiveMode::Inventory => "INVENTORY",
            GiveMode::MousePickup => "MOUSE_PICKUP",
        }
    }
}

impl std::fmt::Display for GiveMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Receives user-visible notices, e.g. a chat line after an announced
/// reload.
pub trait Notifier {
    fn notify(&self, message: &str);
}

/// Discards notifications.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _message: &str) {}
}

/// Result of an initialize/sync/reload pass across the managed stores.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SyncSummary {
    /// Whether any value changed during the pass.
    pub changed: bool,
    /// Whether a backing file needed rewriting but could not be saved. The
    /// published snapshot still carries the repaired in-memory values.
    pub save_failed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ServiceState {
    Uninitialized,
    Ready,
}

/// Default configuration directory: `<user config dir>/cfgsync`.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cfgsync")
}

fn overlay_schema() -> Result<SettingsSchema> {
    let mut schema = SettingsSchema::new();
    schema.declare(TypedSetting::bool(
        CATEGORY_ADVANCED,
        KEY_CENTER_SEARCH_BAR,
        false,
    ))?;
    schema.declare(TypedSetting::enumeration(
        CATEGORY_ADVANCED,
        KEY_GIVE_MODE,
        GiveMode::Inventory.as_str(),
        GiveMode::LABELS,
    ))?;
    schema.declare(TypedSetting::int(
        CATEGORY_ADVANCED,
        KEY_MAX_COLUMNS,
        DEFAULT_MAX_COLUMNS,
        SMALLEST_NUM_COLUMNS,
        LARGEST_NUM_COLUMNS,
    ))?;
    schema.declare(TypedSetting::int(
        CATEGORY_ADVANCED,
        KEY_MAX_PANEL_HEIGHT,
        DEFAULT_PANEL_HEIGHT,
        MIN_PANEL_HEIGHT,
        MAX_PANEL_HEIGHT,
    ))?;
    schema.declare(TypedSetting::bool(CATEGORY_ADVANCED, KEY_DEBUG_MODE, false).hidden())?;
    Ok(schema)
}

fn search_colors_schema() -> Result<SettingsSchema> {
    let mut schema = SettingsSchema::new();
    schema.declare(TypedSetting::string_list(
        CATEGORY_SEARCH_COLORS,
        KEY_SEARCH_COLORS,
        DEFAULT_SEARCH_COLORS,
    ))?;
    Ok(schema)
}

/// Orchestrator over the overlay's two configuration stores.
pub struct ConfigService {
    overlay_store: PersistentStore,
    colors_store: PersistentStore,
    overlay_schema: SettingsSchema,
    colors_schema: SettingsSchema,
    overlay_snapshot: SettingsSnapshot,
    colors_snapshot: SettingsSnapshot,
    handle: SettingsHandle,
    notifier: Box<dyn Notifier>,
    registry: Box<dyn ColorRegistry>,
    state: ServiceState,
}

impl ConfigService {
    /// Create a service over `config_dir` with no-op collaborators.
    pub fn new(config_dir: &Path) -> Result<Self> {
        Self::with_collaborators(config_dir, Box::new(NullNotifier), Box::new(NullRegistry))
    }

    /// Create a service with explicit collaborators for reload
    /// announcements and color-table publication.
    pub fn with_collaborators(
        config_dir: &Path,
        notifier: Box<dyn Notifier>,
        registry: Box<dyn ColorRegistry>,
    ) -> Result<Self> {
        Ok(Self {
            overlay_store: PersistentStore::new(config_dir.join(OVERLAY_FILE), OVERLAY_VERSION),
            colors_store: PersistentStore::new(
                config_dir.join(SEARCH_COLORS_FILE),
                SEARCH_COLORS_VERSION,
            ),
            overlay_schema: overlay_schema()?,
            colors_schema: search_colors_schema()?,
            overlay_snapshot: SettingsSnapshot::default(),
            colors_snapshot: SettingsSnapshot::default(),
            handle: SettingsHandle::new(),
            notifier,
            registry,
            state: ServiceState::Uninitialized,
        })
    }

    /// Cloneable handle for concurrent readers.
    pub fn handle(&self) -> SettingsHandle {
        self.handle.clone()
    }

    pub fn overlay_path(&self) -> &Path {
        self.overlay_store.path()
    }

    pub fn search_colors_path(&self) -> &Path {
        self.colors_store.path()
    }

    /// Load both backing files, run the first synchronization pass, publish
    /// the initial snapshot, and build the derived color table.
    ///
    /// Valid once; a second call fails with [`Error::AlreadyInitialized`].
    pub fn initialize(&mut self) -> Result<SyncSummary> {
        if self.state == ServiceState::Ready {
            return Err(Error::AlreadyInitialized);
        }
        self.overlay_store.load()?;
        self.colors_store.load()?;

        let summary = self.sync_pass(true);
        self.state = ServiceState::Ready;
        Ok(summary)
    }

    /// Re-validate the current in-memory store state against the schemas
    /// without reloading from disk, republishing the snapshot and the color
    /// table.
    pub fn sync_all(&mut self) -> Result<SyncSummary> {
        self.ensure_ready()?;
        Ok(self.sync_pass(true))
    }

    /// Re-read the main backing file and swap in a fresh snapshot.
    ///
    /// The reloaded file is authoritative, so this pass does not write back;
    /// repaired values live in memory until the next persisting pass. The
    /// colors store is not reloaded and the color table is left as is. With
    /// `announce`, the notifier receives a user-visible message.
    pub fn reload_from_disk(&mut self, announce: bool) -> Result<SyncSummary> {
        self.ensure_ready()?;

        self.overlay_store.load()?;
        let overlay = synchronize(&self.overlay_schema, &mut self.overlay_store, false);
        let changed = overlay.snapshot != self.overlay_snapshot;
        self.overlay_snapshot = overlay.snapshot;
        self.publish();

        debug!("reloaded overlay configuration, changed: {}", changed);
        if announce {
            self.notifier.notify("Reloaded overlay configuration");
        }

        Ok(SyncSummary {
            changed,
            save_failed: false,
        })
    }

    /// Overwrite a raw value in the main store, e.g. from a settings
    /// screen. Takes effect once the next [`sync_all`](Self::sync_all) pass
    /// re-validates it; accessors keep serving the published snapshot until
    /// then.
    pub fn set_raw(&mut self, category: &str, key: &str, value: toml::Value) {
        self.overlay_store.set_raw(category, key, value);
    }

    fn ensure_ready(&self) -> Result<()> {
        match self.state {
            ServiceState::Ready => Ok(()),
            ServiceState::Uninitialized => Err(Error::NotInitialized),
        }
    }

    fn sync_pass(&mut self, persist: bool) -> SyncSummary {
        let overlay = synchronize(&self.overlay_schema, &mut self.overlay_store, persist);
        let colors = synchronize(&self.colors_schema, &mut self.colors_store, persist);

        self.overlay_snapshot = overlay.snapshot;
        self.colors_snapshot = colors.snapshot;
        self.publish();
        self.rebuild_color_table();

        SyncSummary {
            changed: overlay.changed || colors.changed,
            save_failed: overlay.save_error.is_some() || colors.save_error.is_some(),
        }
    }

    fn publish(&self) {
        self.handle.publish(
            self.overlay_snapshot
                .clone()
                .merged(self.colors_snapshot.clone()),
        );
    }

    fn rebuild_color_table(&self) {
        let entries = self
            .colors_snapshot
            .list(CATEGORY_SEARCH_COLORS, KEY_SEARCH_COLORS)
            .unwrap_or(&[]);
        self.registry.publish(build_color_table(entries));
    }

    // Read accessors. These go through the published snapshot only and
    // never trigger I/O.

    pub fn is_debug_mode_enabled(&self) -> bool {
        self.handle
            .current()
            .bool(CATEGORY_ADVANCED, KEY_DEBUG_MODE)
            .unwrap_or(false)
    }

    pub fn is_center_search_bar_enabled(&self) -> bool {
        self.handle
            .current()
            .bool(CATEGORY_ADVANCED, KEY_CENTER_SEARCH_BAR)
            .unwrap_or(false)
    }

    pub fn give_mode(&self) -> GiveMode {
        self.handle
            .current()
            .enum_label(CATEGORY_ADVANCED, KEY_GIVE_MODE)
            .and_then(GiveMode::parse)
            .unwrap_or_default()
    }

    pub fn max_columns(&self) -> i64 {
        self.handle
            .current()
            .int(CATEGORY_ADVANCED, KEY_MAX_COLUMNS)
            .unwrap_or(DEFAULT_MAX_COLUMNS)
    }

    pub fn max_panel_height(&self) -> i64 {
        self.handle
            .current()
            .int(CATEGORY_ADVANCED, KEY_MAX_PANEL_HEIGHT)
            .unwrap_or(DEFAULT_PANEL_HEIGHT)
    }

    pub fn search_colors(&self) -> Vec<String> {
        self.handle
            .current()
            .list(CATEGORY_SEARCH_COLORS, KEY_SEARCH_COLORS)
            .map(<[String]>::to_vec)
            .unwrap_or_default()
    }
}
