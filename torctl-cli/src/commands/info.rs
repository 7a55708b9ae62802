//! `torctl info <KEY>...`

use anyhow::{Context, Result};
use clap::Args;

use torctl_client::ClientConfig;

use super::{login, Output};

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// GETINFO keys, e.g. `version`, `traffic/read`, `circuit-status`.
    #[arg(required = true, value_name = "KEY")]
    pub keys: Vec<String>,
}

impl InfoArgs {
    pub async fn run(self, config: &ClientConfig, output: Output) -> Result<()> {
        let connection = login(config).await?;
        let keys: Vec<&str> = self.keys.iter().map(String::as_str).collect();
        let values = connection
            .get_info(&keys)
            .await
            .with_context(|| format!("GETINFO {} failed", keys.join(" ")))?;
        connection.close().await;

        if output.json {
            return output.print_json(&values);
        }
        for (key, value) in &values {
            if value.contains('\n') {
                println!("{key}=");
                println!("{value}");
            } else {
                println!("{key}={value}");
            }
        }
        Ok(())
    }
}
