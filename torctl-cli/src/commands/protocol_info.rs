//! `torctl protocol-info`: what the daemon accepts, before logging in.

use anyhow::{Context, Result};
use colored::Colorize;

use torctl_client::{ClientConfig, ControlConnection};

use super::Output;

pub async fn run(config: &ClientConfig, output: Output) -> Result<()> {
    let connection = ControlConnection::connect(config)
        .await
        .with_context(|| format!("could not connect to {}", config.endpoint))?;
    let info = connection
        .protocol_info()
        .await
        .context("PROTOCOLINFO failed")?;
    connection.close().await;

    if output.json {
        return output.print_json(&info);
    }

    let version = info.protocol_version.map_or("?".to_string(), |v| v.to_string());
    println!("{} {}", "protocol:".bold(), version);
    println!(
        "{} {}",
        "tor:".bold(),
        info.tor_version.as_deref().unwrap_or("unknown")
    );
    println!("{} {}", "auth methods:".bold(), info.auth_methods.join(", "));
    match &info.cookie_file {
        Some(path) => println!("{} {}", "cookie file:".bold(), path.display()),
        None => println!("{} {}", "cookie file:".bold(), "none reported".dimmed()),
    }
    Ok(())
}
