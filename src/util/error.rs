// Spellbook - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Parsing, classification, filtering and detail formatting never fail;
// only retrieval, export and configuration loading produce errors.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all Spellbook operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum SpellbookError {
    /// Retrieving the raw export text failed.
    Fetch(FetchError),

    /// Export operation failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for SpellbookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(e) => write!(f, "Fetch error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for SpellbookError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Fetch errors
// ---------------------------------------------------------------------------

/// Errors raised while retrieving an export from a URL or local file.
#[derive(Debug)]
pub enum FetchError {
    /// The source string was empty after trimming.
    EmptyInput,

    /// The source is not an http(s) URL and local files are not allowed.
    InvalidUrl { input: String },

    /// The HTTP client could not be constructed.
    Client { source: reqwest::Error },

    /// The request failed before a response was received, or the body
    /// could not be read.
    Request { url: String, source: reqwest::Error },

    /// The response body could not be read to completion.
    Body { url: String, source: io::Error },

    /// The server answered with a non-success status.
    Status { url: String, status: u16 },

    /// The export exceeds the configured size cap. `size` is the declared
    /// size, or the bytes read before reading stopped.
    TooLarge {
        source_name: String,
        size: u64,
        max_size: u64,
    },

    /// I/O error reading a local export file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "Source is empty"),
            Self::InvalidUrl { input } => {
                write!(f, "Invalid URL format '{input}': expected http:// or https://")
            }
            Self::Client { source } => write!(f, "Failed to create HTTP client: {source}"),
            Self::Request { url, source } => write!(f, "Request to '{url}' failed: {source}"),
            Self::Body { url, source } => write!(f, "Reading body of '{url}' failed: {source}"),
            Self::Status { url, status } => {
                write!(f, "'{url}' answered with HTTP status {status}")
            }
            Self::TooLarge {
                source_name,
                size,
                max_size,
            } => write!(
                f,
                "'{source_name}' exceeds maximum of {max_size} bytes ({size} bytes seen)"
            ),
            Self::Io { path, source } => {
                write!(f, "I/O error reading '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Client { source } => Some(source),
            Self::Request { source, .. } => Some(source),
            Self::Body { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<FetchError> for SpellbookError {
    fn from(e: FetchError) -> Self {
        Self::Fetch(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Export would exceed maximum record count.
    TooManyRecords { count: usize, max: usize },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
            Self::TooManyRecords { count, max } => write!(
                f,
                "Export of {count} records exceeds maximum of {max}. \
                 Apply filters to reduce the result set."
            ),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ExportError> for SpellbookError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for SpellbookError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for Spellbook results.
pub type Result<T> = std::result::Result<T, SpellbookError>;
