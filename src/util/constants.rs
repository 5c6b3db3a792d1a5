// Spellbook - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "Spellbook";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "Spellbook";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Parsing limits
// =============================================================================

/// Maximum number of spell records collected from a single export.
///
/// Real exports hold tens of thousands of spells; the cap only guards
/// against pathological input.
pub const MAX_RECORDS: usize = 1_000_000;

/// Minimum sensible value for the record cap.
pub const MIN_MAX_RECORDS: usize = 1;

// =============================================================================
// Record fields
// =============================================================================

/// Field that delimits blocks and carries the display name.
pub const FIELD_NAME: &str = "Name";

/// Derived numeric spell id.
pub const FIELD_ID: &str = "id";

/// Derived spell family id (family-classified exports only).
pub const FIELD_SPELL_FAMILY_ID: &str = "Spell Family ID";

/// Comma-space separated class list (directly-classified exports only).
pub const FIELD_CLASS: &str = "Class";

/// Separator between labels in the `Class` field.
pub const CLASS_SEPARATOR: &str = ", ";

/// Name substring (case-insensitive) marking a passive spell.
pub const PASSIVE_MARKER: &str = "passive";

/// Name substring (case-insensitive) marking a hidden spell.
pub const HIDDEN_MARKER: &str = "hidden";

/// List label used when a record has no `Name`.
pub const UNNAMED_LABEL: &str = "Unnamed Spell";

/// List label used when a record has no `id`.
pub const NO_ID_LABEL: &str = "No ID";

// =============================================================================
// Retrieval
// =============================================================================

/// Default HTTP timeout when fetching a remote export.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Minimum configurable fetch timeout.
pub const MIN_FETCH_TIMEOUT_SECS: u64 = 1;

/// Maximum configurable fetch timeout.
pub const MAX_FETCH_TIMEOUT_SECS: u64 = 600;

/// Default maximum size of a fetched or read export.
pub const DEFAULT_MAX_SOURCE_BYTES: u64 = 256 * 1024 * 1024; // 256 MB

/// Hard upper bound on the source size setting.
pub const ABSOLUTE_MAX_SOURCE_BYTES: u64 = 2 * 1024 * 1024 * 1024; // 2 GB

/// User agent sent with remote fetches.
pub const FETCH_USER_AGENT: &str = concat!("spellbook/", env!("CARGO_PKG_VERSION"));

// =============================================================================
// Export
// =============================================================================

/// Maximum number of records written by a single export.
pub const MAX_EXPORT_RECORDS: usize = 5_000_000;

// =============================================================================
// Logging
// =============================================================================

/// Default log level when neither RUST_LOG, --debug, nor config sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Valid values for `[logging] level`.
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// =============================================================================
// Files
// =============================================================================

/// Config file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";
