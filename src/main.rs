//! Daemon entry point: wires the sysfs implementations to the governor and
//! runs it until SIGINT.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use thermgov::actuator::Actuator;
use thermgov::config::GovernorConfig;
use thermgov::governor::Governor;
use thermgov::hardware::{SysfsReader, SysfsWriter};
use thermgov::policy;
use thermgov::profile::HardwareProfile;
use thermgov::sampler::TemperatureSampler;

#[derive(Parser, Debug)]
#[command(name = "thermgov", version, about = "Adaptive thermal frequency governor")]
struct Args {
    /// Path to a JSON configuration file. Built-in defaults are used when
    /// omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "refusing to start");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> thermgov::Result<()> {
    let config = match &args.config {
        Some(path) => {
            info!(path = %path.display(), "loading configuration");
            GovernorConfig::load(path)?
        }
        None => GovernorConfig::default(),
    };
    config.validate()?;

    let reader = Arc::new(SysfsReader::new());
    let writer = Arc::new(SysfsWriter::new());

    let profile = HardwareProfile::discover(reader.as_ref()).await;
    let policy = policy::build(&config, &profile)?;
    let sampler = TemperatureSampler::new(reader, config.default_safe_temperature);
    let actuator = Actuator::new(writer, &config);
    let mut governor = Governor::new(config, profile, sampler, policy, actuator);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = shutdown_tx.send(true);
            }
            Err(e) => warn!(error = %e, "failed to install the interrupt handler"),
        }
    });

    governor.run(shutdown_rx).await;
    Ok(())
}
