use clap::Parser;
use optsync_cli::{cli::Cli, handler::SettingsHandler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    SettingsHandler::handle(cli).await
}
