//! Thin command wrappers. Each formats one command line and interprets the
//! reply; none of them touch framing or dispatch.

use std::collections::BTreeMap;

use torctl_core::EventKind;

use crate::connection::ControlConnection;
use crate::error::ControlError;

impl ControlConnection {
    /// `GETINFO <keys>`; values keyed by the requested names.
    ///
    /// Multi-line values (sent as data blocks) are joined with `\n`.
    pub async fn get_info(&self, keys: &[&str]) -> Result<BTreeMap<String, String>, ControlError> {
        if keys.is_empty() {
            return Ok(BTreeMap::new());
        }
        let reply = self
            .expect_success(&format!("GETINFO {}", keys.join(" ")))
            .await?;
        Ok(collect_info_values(reply.lines(), keys))
    }

    /// `SETEVENTS <names>`; replaces the subscribed set. Empty clears it.
    pub async fn set_events(&self, kinds: &[EventKind]) -> Result<(), ControlError> {
        let names: Vec<&str> = kinds.iter().map(|k| k.as_str()).collect();
        let command = if names.is_empty() {
            "SETEVENTS".to_string()
        } else {
            format!("SETEVENTS {}", names.join(" "))
        };
        self.expect_success(&command).await.map(|_| ())
    }

    /// `SIGNAL <name>`, e.g. `NEWNYM`, `RELOAD`, `HEARTBEAT`.
    pub async fn signal(&self, name: &str) -> Result<(), ControlError> {
        self.expect_success(&format!("SIGNAL {name}")).await.map(|_| ())
    }
}

/// Group GETINFO reply lines by key; the trailing `OK` line is dropped.
fn collect_info_values(lines: &[String], keys: &[&str]) -> BTreeMap<String, String> {
    let body = match lines.split_last() {
        Some((_ok, body)) => body,
        None => lines,
    };

    let mut values = BTreeMap::<String, String>::new();
    let mut current: Option<String> = None;
    for line in body {
        match line.split_once('=') {
            Some((key, value)) if keys.contains(&key) => {
                values.insert(key.to_string(), value.to_string());
                current = Some(key.to_string());
            }
            _ => {
                if let Some(value) = current.as_ref().and_then(|key| values.get_mut(key)) {
                    if !value.is_empty() {
                        value.push('\n');
                    }
                    value.push_str(line);
                }
            }
        }
    }
    values
}
