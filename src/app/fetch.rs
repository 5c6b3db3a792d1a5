// Spellbook - app/fetch.rs
//
// Retrieval of the raw export text from an http(s) URL or a local file.
// All-or-nothing: callers receive the complete blob or an error, never a
// partial read.

use crate::platform::fs;
use crate::util::constants;
use crate::util::error::FetchError;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

/// Retrieval limits.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub max_bytes: u64,
    /// Accept local paths; when false only http(s) URLs are valid.
    pub allow_files: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: constants::DEFAULT_FETCH_TIMEOUT_SECS,
            max_bytes: constants::DEFAULT_MAX_SOURCE_BYTES,
            allow_files: true,
        }
    }
}

/// Where an export comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Url(String),
    File(PathBuf),
}

impl SourceKind {
    /// Classify user input. Empty input is rejected; anything that is not an
    /// http(s) URL is a file path when files are allowed.
    pub fn classify(input: &str, allow_files: bool) -> Result<Self, FetchError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(FetchError::EmptyInput);
        }
        if input.starts_with("http://") || input.starts_with("https://") {
            return Ok(SourceKind::Url(input.to_string()));
        }
        if allow_files {
            Ok(SourceKind::File(PathBuf::from(input)))
        } else {
            Err(FetchError::InvalidUrl {
                input: input.to_string(),
            })
        }
    }
}

/// Retrieve the export named by `input`.
pub fn fetch_text(input: &str, config: &FetchConfig) -> Result<String, FetchError> {
    match SourceKind::classify(input, config.allow_files)? {
        SourceKind::Url(url) => fetch_url(&url, config),
        SourceKind::File(path) => read_file(path, config),
    }
}

fn fetch_url(url: &str, config: &FetchConfig) -> Result<String, FetchError> {
    tracing::info!(url, "Fetching spell export");

    let mut builder = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(constants::FETCH_USER_AGENT);
    if is_loopback(url) {
        builder = builder.no_proxy();
    }
    let client = builder
        .build()
        .map_err(|e| FetchError::Client { source: e })?;

    let response = client
        .get(url)
        .send()
        .map_err(|e| FetchError::Request {
            url: url.to_string(),
            source: e,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    if let Some(len) = response.content_length() {
        check_size(url, len, config.max_bytes)?;
    }

    // Bodies without Content-Length are capped while reading.
    let mut body = Vec::new();
    response
        .take(config.max_bytes.saturating_add(1))
        .read_to_end(&mut body)
        .map_err(|e| FetchError::Body {
            url: url.to_string(),
            source: e,
        })?;
    check_size(url, body.len() as u64, config.max_bytes)?;

    tracing::debug!(url, bytes = body.len(), "Fetch complete");
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Loopback hosts bypass any system proxy.
fn is_loopback(url: &str) -> bool {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .is_some_and(|host| host == "localhost" || host == "127.0.0.1" || host == "[::1]")
}

fn read_file(path: PathBuf, config: &FetchConfig) -> Result<String, FetchError> {
    tracing::info!(path = %path.display(), "Reading spell export");

    let io_err = |source| FetchError::Io {
        path: path.clone(),
        source,
    };
    let size = fs::file_size(&path).map_err(io_err)?;
    check_size(&path.display().to_string(), size, config.max_bytes)?;
    fs::read_file_lossy(&path).map_err(io_err)
}

fn check_size(source_name: &str, size: u64, max_size: u64) -> Result<(), FetchError> {
    if size > max_size {
        return Err(FetchError::TooLarge {
            source_name: source_name.to_string(),
            size,
            max_size,
        });
    }
    Ok(())
}
