//! curfewd - screen-time enforcement agent
//!
//! Wires together:
//! - Configuration loading and the allowed-user gate
//! - Logging
//! - Usage persistence
//! - The enforcement decider
//! - Linux host adapter
//! - MQTT transport

mod logging;
mod phrases;
mod service;
mod transport;

use anyhow::{Context, Result};
use clap::Parser;
use curfew_config::{AgentConfig, load_config};
use curfew_host_api::HostAdapter;
use curfew_host_linux::LinuxHost;
use curfew_store::JsonFileStore;
use curfew_util::{CURFEW_CONFIG_ENV, default_config_path};
use nix::unistd::{User, getuid};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::phrases::Language;
use crate::service::Service;

/// curfewd - Screen-time enforcement agent controlled over MQTT
#[derive(Parser, Debug)]
#[command(name = "curfewd", version)]
#[command(about = "Screen-time enforcement agent controlled over MQTT", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/curfew/config.toml)
    #[arg(short, long, env = CURFEW_CONFIG_ENV, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Log level, used when RUST_LOG is not set
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// Name of the account running the agent
fn current_user() -> String {
    User::from_uid(getuid())
        .ok()
        .flatten()
        .map(|user| user.name)
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_default()
}

async fn run(config: AgentConfig) -> Result<()> {
    info!(
        version = curfew_api::VERSION,
        child_id = %config.child_id,
        device_id = %config.device_id,
        "curfewd starting"
    );
    if curfew_util::is_mock_time_active() {
        warn!(now = %curfew_util::now(), "Mock time is active");
    }

    let language = Language::detect();
    info!(language = language.code(), "Using notification language");

    let host = Arc::new(LinuxHost::new());
    if !host.is_healthy() {
        warn!("Neither lock nor logout is available; enforcement will fail");
    }

    let store = Arc::new(JsonFileStore::new(config.state_path.clone()));
    info!(state_path = %config.state_path.display(), "Usage store initialized");

    let service = Service::new(config, host, store, language.phrases())
        .context("Failed to initialize service")?;
    service.run().await
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config.display(), e);
            return ExitCode::from(2);
        }
    };

    let user = current_user();
    if !config.is_user_allowed(&user) {
        eprintln!("Current user '{}' not in allowed_users. Exiting quietly.", user);
        return ExitCode::SUCCESS;
    }

    if let Err(e) = logging::init(&config, &args.log_level) {
        eprintln!("Failed to initialize logging: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = format!("{:#}", e);
            error!(error = %message, "curfewd failed");
            ExitCode::FAILURE
        }
    }
}
