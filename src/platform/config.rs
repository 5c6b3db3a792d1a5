// Spellbook - platform/config.rs
//
// Platform-specific configuration directory resolution and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::classify::Classifier;
use crate::core::filter::QueryMode;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for Spellbook configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/spellbook/ or %APPDATA%\Spellbook\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[parsing]` section.
    pub parsing: ParsingSection,
    /// `[filters]` section.
    pub filters: FiltersSection,
    /// `[fetch]` section.
    pub fetch: FetchSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[parsing]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ParsingSection {
    /// "direct" or "spell-family".
    pub classifier: Option<String>,
    /// Maximum records kept from one export.
    pub max_records: Option<usize>,
}

/// `[filters]` config section. Initial state of the filter toggles.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct FiltersSection {
    pub hide_passives: Option<bool>,
    pub hide_hidden: Option<bool>,
    /// "class", "search" or "combined".
    pub query_mode: Option<String>,
}

/// `[fetch]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct FetchSection {
    /// HTTP timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Maximum export size in bytes.
    pub max_bytes: Option<u64>,
    /// Accept local file paths in addition to http(s) URLs.
    pub allow_files: Option<bool>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // -- Parsing --
    pub classifier: Classifier,
    pub max_records: usize,

    // -- Filters --
    pub hide_passives: bool,
    pub hide_hidden: bool,
    pub query_mode: QueryMode,

    // -- Fetch --
    pub fetch_timeout_secs: u64,
    pub max_source_bytes: u64,
    pub allow_files: bool,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            classifier: Classifier::default(),
            max_records: constants::MAX_RECORDS,
            hide_passives: false,
            hide_hidden: false,
            query_mode: QueryMode::default(),
            fetch_timeout_secs: constants::DEFAULT_FETCH_TIMEOUT_SECS,
            max_source_bytes: constants::DEFAULT_MAX_SOURCE_BYTES,
            allow_files: true,
            log_level: None,
        }
    }
}

/// Load and validate `config.toml` at the platform default location.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first run).
/// If the file is unreadable or unparseable, returns defaults with a
/// warning; the application still starts but the user is informed.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    match read_raw_config(config_path) {
        Ok(raw) => {
            let config = validate(raw, &mut warnings);
            (config, warnings)
        }
        Err(e) => {
            push_warning(&mut warnings, e, "defaults");
            (AppConfig::default(), warnings)
        }
    }
}

/// Load a config file the user named explicitly.
///
/// A missing, unreadable or unparseable file is an error rather than a
/// fallback to defaults. Out-of-range values are still only warnings.
pub fn load_explicit_config(config_path: &Path) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let raw = read_raw_config(config_path)?;
    let mut warnings: Vec<String> = Vec::new();
    let config = validate(raw, &mut warnings);
    Ok((config, warnings))
}

fn read_raw_config(config_path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(config_path).map_err(|e| ConfigError::Io {
        path: config_path.to_path_buf(),
        source: e,
    })?;

    let raw: RawConfig = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
        path: config_path.to_path_buf(),
        source: e,
    })?;

    tracing::info!(path = %config_path.display(), "Loaded config.toml");
    Ok(raw)
}

/// Record a config problem as a user-facing warning.
fn push_warning(warnings: &mut Vec<String>, error: ConfigError, fallback: &str) {
    let msg = format!("{error}. Using {fallback}.");
    tracing::warn!("{}", msg);
    warnings.push(msg);
}

fn out_of_range(field: &str, value: impl ToString, expected: String) -> ConfigError {
    ConfigError::ValueOutOfRange {
        field: field.to_string(),
        value: value.to_string(),
        expected,
    }
}

/// Validate each field against named constants, accumulating all problems.
fn validate(raw: RawConfig, warnings: &mut Vec<String>) -> AppConfig {
    let mut config = AppConfig::default();

    // -- Parsing: classifier --
    if let Some(ref name) = raw.parsing.classifier {
        match name.parse::<Classifier>() {
            Ok(classifier) => config.classifier = classifier,
            Err(_) => push_warning(
                warnings,
                out_of_range(
                    "parsing.classifier",
                    name,
                    "\"direct\" or \"spell-family\"".to_string(),
                ),
                "default (direct)",
            ),
        }
    }

    // -- Parsing: max_records --
    if let Some(max) = raw.parsing.max_records {
        if (constants::MIN_MAX_RECORDS..=constants::MAX_RECORDS).contains(&max) {
            config.max_records = max;
        } else {
            push_warning(
                warnings,
                out_of_range(
                    "parsing.max_records",
                    max,
                    format!("{}-{}", constants::MIN_MAX_RECORDS, constants::MAX_RECORDS),
                ),
                &format!("default ({})", constants::MAX_RECORDS),
            );
        }
    }

    // -- Filters --
    if let Some(hide) = raw.filters.hide_passives {
        config.hide_passives = hide;
    }
    if let Some(hide) = raw.filters.hide_hidden {
        config.hide_hidden = hide;
    }
    if let Some(ref mode) = raw.filters.query_mode {
        match mode.parse::<QueryMode>() {
            Ok(mode) => config.query_mode = mode,
            Err(_) => push_warning(
                warnings,
                out_of_range(
                    "filters.query_mode",
                    mode,
                    "\"class\", \"search\" or \"combined\"".to_string(),
                ),
                "default (class)",
            ),
        }
    }

    // -- Fetch: timeout_secs --
    if let Some(secs) = raw.fetch.timeout_secs {
        if (constants::MIN_FETCH_TIMEOUT_SECS..=constants::MAX_FETCH_TIMEOUT_SECS).contains(&secs)
        {
            config.fetch_timeout_secs = secs;
        } else {
            push_warning(
                warnings,
                out_of_range(
                    "fetch.timeout_secs",
                    secs,
                    format!(
                        "{}-{}",
                        constants::MIN_FETCH_TIMEOUT_SECS,
                        constants::MAX_FETCH_TIMEOUT_SECS
                    ),
                ),
                &format!("default ({})", constants::DEFAULT_FETCH_TIMEOUT_SECS),
            );
        }
    }

    // -- Fetch: max_bytes --
    if let Some(bytes) = raw.fetch.max_bytes {
        if (1..=constants::ABSOLUTE_MAX_SOURCE_BYTES).contains(&bytes) {
            config.max_source_bytes = bytes;
        } else {
            push_warning(
                warnings,
                out_of_range(
                    "fetch.max_bytes",
                    bytes,
                    format!("1-{}", constants::ABSOLUTE_MAX_SOURCE_BYTES),
                ),
                &format!("default ({})", constants::DEFAULT_MAX_SOURCE_BYTES),
            );
        }
    }

    if let Some(allow) = raw.fetch.allow_files {
        config.allow_files = allow;
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        if constants::VALID_LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            push_warning(
                warnings,
                out_of_range(
                    "logging.level",
                    level,
                    constants::VALID_LOG_LEVELS.join(", "),
                ),
                "default (info)",
            );
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join(constants::CONFIG_FILE_NAME);
        fs::write(&path, body).expect("write config");
        path
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().expect("tmpdir");
        let (config, warnings) = load_config(&dir.path().join("absent.toml"));
        assert_eq!(config, AppConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_valid_config_applies() {
        let dir = TempDir::new().expect("tmpdir");
        let path = write_config(
            &dir,
            r#"
[parsing]
classifier = "spell-family"

[filters]
hide_passives = true
query_mode = "combined"

[fetch]
timeout_secs = 5
allow_files = false

[logging]
level = "debug"

[future]
whatever = 1
"#,
        );
        let (config, warnings) = load_config(&path);
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        assert_eq!(config.classifier, Classifier::SpellFamily);
        assert!(config.hide_passives);
        assert!(!config.hide_hidden);
        assert_eq!(config.query_mode, QueryMode::Combined);
        assert_eq!(config.fetch_timeout_secs, 5);
        assert!(!config.allow_files);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_invalid_values_warn_and_fall_back() {
        let dir = TempDir::new().expect("tmpdir");
        let path = write_config(
            &dir,
            r#"
[parsing]
classifier = "guild"
max_records = 0

[fetch]
timeout_secs = 0

[logging]
level = "loud"
"#,
        );
        let (config, warnings) = load_config(&path);
        assert_eq!(warnings.len(), 4);
        assert!(warnings[0].contains("parsing.classifier"));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_explicit_config_missing_file_is_error() {
        let dir = TempDir::new().expect("tmpdir");
        let err = load_explicit_config(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        let top: crate::util::error::SpellbookError = err.into();
        assert!(top.to_string().starts_with("Configuration error: Config I/O error"));
    }

    #[test]
    fn test_explicit_config_unparseable_is_error() {
        let dir = TempDir::new().expect("tmpdir");
        let path = write_config(&dir, "[parsing\nclassifier = ");
        let err = load_explicit_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse { .. }));
    }

    #[test]
    fn test_explicit_config_range_problems_stay_warnings() {
        let dir = TempDir::new().expect("tmpdir");
        let path = write_config(&dir, "[fetch]\ntimeout_secs = 0\nallow_files = false\n");
        let (config, warnings) = load_explicit_config(&path).unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(config.fetch_timeout_secs, constants::DEFAULT_FETCH_TIMEOUT_SECS);
        assert!(!config.allow_files);
    }

    #[test]
    fn test_unparseable_file_warns() {
        let dir = TempDir::new().expect("tmpdir");
        let path = write_config(&dir, "[parsing\nclassifier = ");
        let (config, warnings) = load_config(&path);
        assert_eq!(config, AppConfig::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Config parse error"));
    }
}
