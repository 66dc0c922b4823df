use clap::Parser;
use pharm_cli::commands::{self, Cli, Commands};
use pharm_cli::{settings, Downloads};

fn main() -> anyhow::Result<()> {
    settings::load_dotenv();
    settings::init_tracing()?;
    let cli = Cli::parse();

    let config = settings::load_config()?;
    let session = settings::open_session(&config)?;
    let api = api_client::PharmApi::new(&config, session)?;
    let downloads = Downloads::new(config.download_dir());

    let command = cli.command.unwrap_or(Commands::Open { route: None });

    // Screens are driven by one user; a single-threaded runtime is all they need.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(commands::run(command, api, downloads))
}
