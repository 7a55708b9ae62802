//! `torctl events <NAME>...`: subscribe and print until the daemon hangs up
//! or the user presses ctrl-c.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use torctl_client::ClientConfig;
use torctl_core::{CircuitStatus, Event, EventKind, NetworkLiveness, OrConnStatus, Severity};

use super::{login, Output};

#[derive(Args, Debug)]
pub struct EventsArgs {
    /// Event names: CIRC, ORCONN, NETWORK_LIVENESS, STATUS_GENERAL,
    /// STATUS_CLIENT, STATUS_SERVER, BW.
    #[arg(required = true, value_name = "NAME")]
    pub kinds: Vec<EventKind>,
}

impl EventsArgs {
    pub async fn run(self, config: &ClientConfig, output: Output) -> Result<()> {
        let connection = login(config).await?;
        let mut events = connection.events();
        connection
            .set_events(&self.kinds)
            .await
            .context("SETEVENTS failed")?;

        loop {
            let next = tokio::select! {
                next = events.next() => next,
                _ = tokio::signal::ctrl_c() => break,
            };
            match next {
                Some(Ok(event)) if output.json => output.print_json(&event)?,
                Some(Ok(event)) => println!("{}", describe(&event)),
                Some(Err(err)) => tracing::warn!("{err}"),
                None => {
                    eprintln!("{}", "control connection closed".yellow());
                    break;
                }
            }
        }

        connection.close().await;
        Ok(())
    }
}

/// One human-readable line per event.
fn describe(event: &Event) -> String {
    let tag = format!("{:<16}", event.kind().as_str()).bold();
    match event {
        Event::Circuit(circ) => {
            let status = match &circ.status {
                CircuitStatus::Launched => "LAUNCHED".normal(),
                CircuitStatus::Built => "BUILT".green(),
                CircuitStatus::GuardWait => "GUARD_WAIT".yellow(),
                CircuitStatus::Extended => "EXTENDED".normal(),
                CircuitStatus::Failed => "FAILED".red(),
                CircuitStatus::Closed => "CLOSED".dimmed(),
                CircuitStatus::Unknown(other) => other.as_str().normal(),
            };
            let mut line = format!("{tag} {} {status}", circ.id);
            if !circ.path.is_empty() {
                line.push(' ');
                line.push_str(&circ.path.join(","));
            }
            if let Some(purpose) = &circ.purpose {
                line.push_str(&format!(" purpose={purpose}"));
            }
            if let Some(reason) = &circ.reason {
                line.push_str(&format!(" reason={reason}"));
            }
            line
        }
        Event::OrConnection(conn) => {
            let status = match &conn.status {
                OrConnStatus::New => "NEW".normal(),
                OrConnStatus::Launched => "LAUNCHED".normal(),
                OrConnStatus::Connected => "CONNECTED".green(),
                OrConnStatus::Failed => "FAILED".red(),
                OrConnStatus::Closed => "CLOSED".dimmed(),
                OrConnStatus::Unknown(other) => other.as_str().normal(),
            };
            let mut line = format!("{tag} {} {status}", conn.target);
            if let Some(count) = conn.circuit_count {
                line.push_str(&format!(" circuits={count}"));
            }
            if let Some(reason) = &conn.reason {
                line.push_str(&format!(" reason={reason}"));
            }
            line
        }
        Event::NetworkLiveness { liveness } => match liveness {
            NetworkLiveness::Up => format!("{tag} {}", "UP".green()),
            NetworkLiveness::Down => format!("{tag} {}", "DOWN".red()),
        },
        Event::Status(status) => {
            let severity = match &status.severity {
                Severity::Notice => "NOTICE".normal(),
                Severity::Warn => "WARN".yellow(),
                Severity::Err => "ERR".red(),
                Severity::Unknown(other) => other.as_str().normal(),
            };
            let mut line = format!("{tag} {severity} {}", status.action);
            if let Some(progress) = status.bootstrap_progress() {
                line.push_str(&format!(" {progress}%"));
            }
            for (key, value) in &status.arguments {
                if key != "PROGRESS" || status.bootstrap_progress().is_none() {
                    line.push_str(&format!(" {key}={value}"));
                }
            }
            line
        }
        Event::Bandwidth(bw) => {
            format!("{tag} read={} written={}", bw.bytes_read, bw.bytes_written)
        }
    }
}
