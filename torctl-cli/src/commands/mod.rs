pub mod events;
pub mod info;
pub mod protocol_info;
pub mod raw;
pub mod signal;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use torctl_client::{connect_authenticated, ClientConfig, ControlConnection, ControlEndpoint};

/// Connection flags shared by every subcommand. Unset flags fall back to
/// `TORCTL_CONTROL` / `TORCTL_COOKIE_FILE` and then to the defaults.
#[derive(Args, Debug, Default)]
pub struct ConnectArgs {
    /// Control endpoint: `host:port` or `unix:/path/to/socket`.
    #[arg(long, global = true, value_name = "ADDR")]
    pub control: Option<String>,

    /// Cookie file to authenticate with instead of discovering one.
    #[arg(long, global = true, value_name = "PATH")]
    pub cookie_file: Option<PathBuf>,

    /// Check the daemon's SERVERHASH before sending our proof.
    #[arg(long, global = true)]
    pub verify_server_hash: bool,
}

impl ConnectArgs {
    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut config = ClientConfig::from_env().context("invalid TORCTL_* environment")?;
        if let Some(control) = &self.control {
            config.endpoint = ControlEndpoint::parse(control)
                .with_context(|| format!("invalid --control value '{control}'"))?;
        }
        if let Some(cookie_file) = &self.cookie_file {
            config.cookie_file = Some(cookie_file.clone());
        }
        config.verify_server_hash |= self.verify_server_hash;
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    pub fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        let rendered = serde_json::to_string(value).context("failed to encode JSON output")?;
        println!("{rendered}");
        Ok(())
    }
}

pub async fn login(config: &ClientConfig) -> Result<ControlConnection> {
    connect_authenticated(config)
        .await
        .with_context(|| format!("could not authenticate to {}", config.endpoint))
}
