//! Startup wiring shared by both binaries: environment, logging and configuration.

use anyhow::Context;
use api_client::{Session, SessionStore};
use pharm_core::config::{resolve_download_dir, resolve_session_file};
use pharm_core::constants::{API_BASE_ENV, DOWNLOAD_DIR_ENV, SESSION_FILE_ENV};
use pharm_core::ClientConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the tracing subscriber. Logs go to stderr so screen output stays readable.
pub fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pharm=info".parse()?)
                .add_directive("api_client=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("Failed to install tracing subscriber")?;
    Ok(())
}

/// Loads `.env` into the process environment, if present.
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Reads the `PHARM_ASSIST_*` variables once.
pub fn load_config() -> anyhow::Result<ClientConfig> {
    let api_base = std::env::var(API_BASE_ENV).unwrap_or_default();
    let session_file = resolve_session_file(std::env::var(SESSION_FILE_ENV).ok().map(PathBuf::from));
    let download_dir =
        resolve_download_dir(std::env::var(DOWNLOAD_DIR_ENV).ok().map(PathBuf::from));

    let config = ClientConfig::new(api_base, session_file, download_dir)
        .with_context(|| format!("Invalid {API_BASE_ENV}"))?;
    tracing::debug!(
        api = config.api_base(),
        session = %config.session_file().display(),
        "configuration loaded"
    );
    Ok(config)
}

/// Restores the persisted login for `config`.
pub fn open_session(config: &ClientConfig) -> anyhow::Result<Session> {
    Session::restore(SessionStore::new(config.session_file())).with_context(|| {
        format!(
            "Failed to read session file {}",
            config.session_file().display()
        )
    })
}
