use clap::Parser;
use pharm_cli::{settings, Console, Downloads, Shell};
use pharm_core::Route;

/// Interactive Pharm Assist client.
#[derive(Parser)]
#[command(name = "pharm-run")]
struct Args {
    /// Route to open first, e.g. `/paciente/novo`. Defaults to the dashboard when signed in,
    /// otherwise the login screen.
    route: Option<String>,
}

/// Main entry point for the interactive client
///
/// Resolves configuration, restores the stored session and follows screen navigation until
/// the user quits or input ends.
///
/// # Environment Variables
/// - `PHARM_ASSIST_API`: API base URL (default: "http://localhost:5000")
/// - `PHARM_ASSIST_SESSION_FILE`: Session file (default: "~/.pharm-assist/session.json")
/// - `PHARM_ASSIST_DOWNLOAD_DIR`: Where CSV and PDF downloads are saved (default: ".")
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    settings::load_dotenv();
    settings::init_tracing()?;
    let args = Args::parse();

    let config = settings::load_config()?;
    let session = settings::open_session(&config)?;
    let api = api_client::PharmApi::new(&config, session)?;

    tracing::info!("-- Starting Pharm Assist client against {}", config.api_base());

    let mut shell = Shell::new(api, Console::stdio(), Downloads::new(config.download_dir()));
    let start = match args.route {
        Some(path) => Route::parse(&path)?,
        None => shell.default_route(),
    };
    shell.run(start).await
}
