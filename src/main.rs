//! tenantgate gateway node

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tenantgate::server::builder::{load_config, run_server};
use tenantgate::utils::logging::init_logging;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "gateway", version, about = "Multi-tenant API gateway node")]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "TENANTGATE_CONFIG", default_value = "config/gateway.yaml")]
    config: PathBuf,

    /// Override the listen host
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port
    #[arg(long)]
    port: Option<u16>,
}

async fn run(args: Args) -> anyhow::Result<()> {
    let (mut config, from_file) = load_config(&args.config).await?;
    if let Some(host) = args.host {
        config.gateway.server.host = host;
    }
    if let Some(port) = args.port {
        config.gateway.server.port = port;
    }

    init_logging(config.logging())?;
    if !from_file {
        warn!(
            "Configuration file {:?} not found, running on defaults and environment",
            args.config
        );
    }

    let build = tenantgate::build_info();
    info!("Starting tenantgate {} ({})", build.version, build.git_hash);
    run_server(config).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
