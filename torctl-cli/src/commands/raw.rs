//! `torctl raw <WORDS>...`: one command, reply printed as received.

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;

use torctl_client::ClientConfig;

use super::{login, Output};

#[derive(Args, Debug)]
pub struct RawArgs {
    /// Command words, joined with single spaces.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub words: Vec<String>,
}

impl RawArgs {
    pub async fn run(self, config: &ClientConfig, output: Output) -> Result<()> {
        let command = self.words.join(" ");
        let connection = login(config).await?;
        let reply = connection.send_command(&command).await?;
        connection.close().await;

        if output.json {
            output.print_json(&reply)?;
        } else if reply.is_success() {
            println!("{reply}");
        } else {
            println!("{}", reply.to_string().red());
        }

        if !reply.is_success() {
            bail!("{command} failed with status {}", reply.status());
        }
        Ok(())
    }
}
