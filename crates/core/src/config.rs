//! Client runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the API client and
//! the screens. Nothing in the library crates reads environment variables while a screen is
//! running; the binaries read them and hand the raw values to the resolvers below.

use crate::constants::{DEFAULT_API_BASE, SESSION_FILENAME, STATE_DIR_NAME};
use crate::error::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};

/// Client configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    api_base: String,
    session_file: PathBuf,
    download_dir: PathBuf,
}

impl ClientConfig {
    /// Create a new `ClientConfig`.
    ///
    /// The API base is validated and normalised with [`resolve_api_base`].
    pub fn new(
        api_base: impl Into<String>,
        session_file: PathBuf,
        download_dir: PathBuf,
    ) -> ConfigResult<Self> {
        let api_base = resolve_api_base(Some(api_base.into()))?;
        Ok(Self {
            api_base,
            session_file,
            download_dir,
        })
    }

    /// Base URL without a trailing slash, e.g. `http://localhost:5000`.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn session_file(&self) -> &Path {
        &self.session_file
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }
}

/// Resolve the API base URL from an optional override.
///
/// `None` or a blank value falls back to [`DEFAULT_API_BASE`]. Trailing slashes are trimmed so
/// that paths can always be appended as `/patients`.
pub fn resolve_api_base(value: Option<String>) -> ConfigResult<String> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

    let trimmed = value.trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyApiBase);
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidApiBase(value));
    }
    Ok(trimmed.to_string())
}

/// Resolve where the session is persisted.
///
/// Uses the override when given, otherwise `<home>/.pharm-assist/session.json`, or a path
/// relative to the working directory when no home directory is known.
pub fn resolve_session_file(override_path: Option<PathBuf>) -> PathBuf {
    if let Some(path) = override_path.filter(|p| !p.as_os_str().is_empty()) {
        return path;
    }
    let state_dir = match dirs::home_dir() {
        Some(home) => home.join(STATE_DIR_NAME),
        None => PathBuf::from(STATE_DIR_NAME),
    };
    state_dir.join(SESSION_FILENAME)
}

/// Resolve the directory downloads are written to; defaults to the working directory.
pub fn resolve_download_dir(override_dir: Option<PathBuf>) -> PathBuf {
    override_dir
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_base_defaults_when_unset_or_blank() {
        assert_eq!(resolve_api_base(None).unwrap(), "http://localhost:5000");
        assert_eq!(
            resolve_api_base(Some("   ".into())).unwrap(),
            "http://localhost:5000"
        );
    }

    #[test]
    fn api_base_trims_trailing_slashes() {
        assert_eq!(
            resolve_api_base(Some("https://api.example.com//".into())).unwrap(),
            "https://api.example.com"
        );
    }

    #[test]
    fn api_base_rejects_other_schemes() {
        let err = resolve_api_base(Some("ftp://example.com".into())).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidApiBase(_)));
    }

    #[test]
    fn session_file_override_wins() {
        let path = resolve_session_file(Some(PathBuf::from("/tmp/s.json")));
        assert_eq!(path, PathBuf::from("/tmp/s.json"));
    }

    #[test]
    fn session_file_default_ends_with_state_dir() {
        let path = resolve_session_file(None);
        assert!(path.ends_with(Path::new(STATE_DIR_NAME).join(SESSION_FILENAME)));
    }

    #[test]
    fn download_dir_defaults_to_cwd() {
        assert_eq!(resolve_download_dir(None), PathBuf::from("."));
    }

    #[test]
    fn client_config_normalises_base() {
        let cfg = ClientConfig::new(
            "http://localhost:5000/",
            PathBuf::from("s.json"),
            PathBuf::from("."),
        )
        .unwrap();
        assert_eq!(cfg.api_base(), "http://localhost:5000");
    }
}
