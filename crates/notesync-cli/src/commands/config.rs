use notesync_core::GatewayConfig;

use crate::cli::{ApiArgs, ConfigCommands};
use crate::config::{default_config_path, effective_gateway_config, CliConfig};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, api: &ApiArgs) -> Result<(), CliError> {
    match command {
        ConfigCommands::Set {
            request_timeout_secs,
        } => run_config_set(api, request_timeout_secs),
        ConfigCommands::Show => run_config_show(api),
    }
}

fn run_config_set(api: &ApiArgs, request_timeout_secs: Option<u64>) -> Result<(), CliError> {
    let update = GatewayConfig {
        request_timeout_secs,
        ..api.gateway_config()
    };
    if update == GatewayConfig::default() {
        return Err(CliError::Config(
            "Nothing to set; pass --api-url, --token or --timeout".to_string(),
        ));
    }

    let mut config = CliConfig::load().map_err(CliError::Config)?;
    config.apply(update);
    validate_config(&config)?;

    let path = config.save().map_err(CliError::Config)?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

/// A persisted base URL must be usable by the HTTP gateway.
pub fn validate_config(config: &CliConfig) -> Result<(), CliError> {
    let gateway = config.gateway_config();
    if gateway.api_base_url.is_some() {
        gateway.normalized_base_url().map_err(CliError::Config)?;
    }
    if config.request_timeout_secs == Some(0) {
        return Err(CliError::Config(
            "request timeout must be at least one second".to_string(),
        ));
    }
    Ok(())
}

fn run_config_show(api: &ApiArgs) -> Result<(), CliError> {
    let file = CliConfig::load().map_err(CliError::Config)?;
    let effective = effective_gateway_config(api, GatewayConfig::from_env(), &file);

    let path = default_config_path().map_err(CliError::Config)?;
    println!("config file:  {}", path.display());
    println!(
        "api url:      {}",
        effective.api_base_url.as_deref().unwrap_or("(not set)")
    );
    println!(
        "token:        {}",
        if effective.access_token().is_some() {
            "(set)"
        } else {
            "(not set)"
        }
    );
    println!(
        "timeout:      {}",
        effective
            .request_timeout_secs
            .map_or_else(|| "(client default)".to_string(), |secs| format!("{secs}s"))
    );
    Ok(())
}
