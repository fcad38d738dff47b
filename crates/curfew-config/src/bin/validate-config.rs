//! Checks a curfewd config file and prints what the agent would run with.
//!
//! Exit status: 0 when valid, 1 when the file is missing or invalid, 2 on
//! usage errors.

use curfew_config::{AgentConfig, ConfigError, load_config};
use curfew_util::{default_config_path, format_duration};
use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str = "Usage: validate-config [config-file]";

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let path = match (args.next(), args.next()) {
        (Some(flag), _) if flag == "-h" || flag == "--help" => {
            println!("{USAGE}");
            println!("Default config file: {}", default_config_path().display());
            return ExitCode::SUCCESS;
        }
        (_, Some(extra)) => {
            eprintln!("unexpected argument: {extra}");
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
        (Some(path), None) => PathBuf::from(path),
        (None, None) => default_config_path(),
    };

    match load_config(&path) {
        Ok(config) => {
            println!("{}: OK", path.display());
            print_summary(&config);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: INVALID", path.display());
            report(&e);
            ExitCode::from(1)
        }
    }
}

fn print_summary(config: &AgentConfig) {
    let topics = config.topics();
    let tls = if config.mqtt.tls { " (tls)" } else { "" };
    let rows = [
        ("child", config.child_id.to_string()),
        ("device", config.device_id.to_string()),
        ("broker", format!("{}:{}{tls}", config.mqtt.host, config.mqtt.port)),
        ("permission topic", topics.allowed()),
        ("budget topic", topics.budget()),
        ("status topic", topics.status()),
        ("enforcement", config.enforcement_mode.to_string()),
        (
            "fail mode",
            format!(
                "{} after {} offline",
                config.fail_mode,
                format_duration(config.offline_grace_period)
            ),
        ),
        (
            "sampling",
            format!(
                "every {}, idle after {}",
                format_duration(config.sample_interval),
                format_duration(config.idle_timeout)
            ),
        ),
        (
            "allowed users",
            config
                .allowed_users
                .as_ref()
                .map_or_else(|| "any".to_string(), |users| users.join(", ")),
        ),
        ("state file", config.state_path.display().to_string()),
    ];
    for (label, value) in rows {
        println!("  {label:<17} {value}");
    }
}

fn report(error: &ConfigError) {
    match error {
        ConfigError::Invalid { errors } => {
            for err in errors {
                eprintln!("  - {err}");
            }
        }
        other => eprintln!("  {other}"),
    }
}
