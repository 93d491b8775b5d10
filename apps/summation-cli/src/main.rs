use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use summation_bootstrap::LoggingConfig;
use summation_bootstrap::host::init_logging;
use summation_sdk::{GrpcClientConfig, SERVICE_NAME, SummationClientV1, SummationGrpcClient};

/// Sends one `CalculateSum` call to a summation server and prints the result.
#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(name = "summation-cli")]
struct Cli {
    /// gRPC endpoint of the server
    #[arg(long, default_value = "http://localhost:50051")]
    addr: String,

    /// First operand
    #[arg(short, default_value_t = 10, allow_negative_numbers = true)]
    a: i32,

    /// Second operand
    #[arg(short, default_value_t = 20, allow_negative_numbers = true)]
    b: i32,

    /// Connect and call timeout in seconds
    #[arg(long, default_value_t = 5)]
    timeout: u64,

    /// Log filter; `RUST_LOG` takes precedence
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&LoggingConfig {
        level: cli.log_level.clone(),
        ..LoggingConfig::default()
    });
    let timeout = Duration::from_secs(cli.timeout);

    let cfg = GrpcClientConfig::new(SERVICE_NAME)
        .with_connect_timeout(timeout)
        .with_rpc_timeout(timeout)
        .with_max_retries(0);
    let client = SummationGrpcClient::connect(cli.addr.as_str(), &cfg)
        .await
        .with_context(|| format!("could not reach summation server at {}", cli.addr))?;

    let result = client
        .calculate_sum(cli.a, cli.b)
        .await
        .context("CalculateSum failed")?;
    println!("{} + {} = {result}", cli.a, cli.b);
    Ok(())
}
