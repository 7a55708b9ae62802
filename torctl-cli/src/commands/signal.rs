//! `torctl signal <NAME>`

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use torctl_client::ClientConfig;

use super::{login, Output};

#[derive(Args, Debug)]
pub struct SignalArgs {
    /// Signal name: NEWNYM, RELOAD, DUMP, DEBUG, HALT, CLEARDNSCACHE, HEARTBEAT, ...
    pub name: String,
}

impl SignalArgs {
    pub async fn run(self, config: &ClientConfig, output: Output) -> Result<()> {
        let name = self.name.to_ascii_uppercase();
        let connection = login(config).await?;
        connection
            .signal(&name)
            .await
            .with_context(|| format!("SIGNAL {name} failed"))?;
        connection.close().await;

        if output.json {
            return output.print_json(&json!({ "signal": name, "ok": true }));
        }
        println!("sent {name}");
        Ok(())
    }
}
