use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::signal::ctrl_c;
use tokio::time::{interval, Duration};
use tracing::{error, info};

use fabric::cli::{config_check, Cli, Commands};
use fabric::context::FabricContext;
use fabric::model::{FakeMySqlConnector, MySqlConnector};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command.clone().unwrap_or(Commands::Run) {
        Commands::Configcheck => match config_check(&cli.config, &cli.credentials) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("{e}");
                ExitCode::FAILURE
            }
        },
        Commands::Run => {
            if let Err(e) = fabric_config::load(&cli.config, &cli.credentials) {
                error!("{e}");
                return ExitCode::FAILURE;
            }
            run().await;
            ExitCode::SUCCESS
        }
    }
}

/// Build the coordination kernel and keep it alive. The RPC transport that
/// would drive `rpc::dispatch` from the wire is out of this crate's scope;
/// this loop exists so the kernel's background work (the failure detector's
/// reconciliation) keeps running until the process is asked to stop.
async fn run() {
    // A real deployment supplies a driver (e.g. `mysql_async`) behind
    // `MySqlConnector`; the in-memory fake stands in here since the driver
    // itself is out of scope.
    let connector: Arc<dyn MySqlConnector> = Arc::new(FakeMySqlConnector::new());
    let ctx = FabricContext::new(connector);
    info!("fabric kernel started");

    let mut reconcile_tick = interval(Duration::from_secs(5));
    loop {
        tokio::select! {
            _ = reconcile_tick.tick() => {
                ctx.detector.reconcile().await;
            }
            _ = ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }
}
