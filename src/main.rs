use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use assetdb::cli::Cli;
use assetdb::config::StaticConfig;
use assetdb::interfaces::cli::run_cli_command;
use assetdb::system::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    // .env 必须在读取任何配置之前加载
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match StaticConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            return ExitCode::FAILURE;
        }
    };

    let _guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            return ExitCode::FAILURE;
        }
    };
    debug!("Using database {}", config.database.redacted_url());

    match run_cli_command(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            ExitCode::FAILURE
        }
    }
}
