use serde::Serialize;

use crate::tokenizer::KeywordArgs;

/// `650 BW <bytes read> <bytes written>`, emitted once per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BandwidthEvent {
    pub bytes_read: u64,
    pub bytes_written: u64,
}

impl BandwidthEvent {
    pub(crate) fn parse(body: &str) -> Result<Self, String> {
        let args = KeywordArgs::parse(body);
        let count = |index: usize, what: &str| -> Result<u64, String> {
            let raw = args
                .positional(index)
                .ok_or_else(|| format!("missing {what} count"))?;
            raw.parse::<u64>()
                .map_err(|err| format!("bad {what} count {raw:?}: {err}"))
        };
        Ok(Self {
            bytes_read: count(0, "read")?,
            bytes_written: count(1, "written")?,
        })
    }
}
