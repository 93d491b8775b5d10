use anyhow::Result;
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use summation::AppConfig;
use summation_bootstrap::CliArgs;
use summation_bootstrap::host::{cancel_on_shutdown_signal, init_logging};
use tokio_util::sync::CancellationToken;

use std::path::PathBuf;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Summation Server - adds two integers over HTTP and gRPC
#[derive(Parser)]
#[command(name = "summation-server")]
#[command(about = "Summation Server - adds two integers over HTTP and gRPC")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for the HTTP adapter (overrides config)
    #[arg(long)]
    http_port: Option<u16>,

    /// Port override for the gRPC adapter (overrides config)
    #[arg(long)]
    grpc_port: Option<u16>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.clone(),
        print_config: cli.print_config,
        verbose: cli.verbose,
        http_port: cli.http_port,
        grpc_port: cli.grpc_port,
    };

    // 1) defaults -> 2) YAML (if provided) -> 3) env (APP__*) -> 4) CLI overrides
    let mut config = AppConfig::load(args.config.as_deref())?;
    config.apply_cli_overrides(&args)?;

    init_logging(&config.logging);

    if args.print_config {
        println!("Effective configuration:\n{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(&config).await,
        Commands::Check => check_config(&config),
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    config.validate()?;
    println!("Configuration is valid");
    println!("{}", config.to_yaml()?);
    Ok(())
}

async fn run_server(config: &AppConfig) -> Result<()> {
    let cancel = CancellationToken::new();
    let signals = cancel_on_shutdown_signal(cancel.clone());

    let server = summation::start(config, cancel).await?;
    let result = server.wait().await;

    signals.abort();
    tracing::info!("Summation Server stopped");
    result
}
