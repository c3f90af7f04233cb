//! The command log.
//!
//! Every dispatched command is appended here in strict issuance order. An
//! external optimizer drains the log once per tick; the contract is that
//! entries come out exactly as they went in, never reordered, never
//! coalesced by this side.

use serde::{Deserialize, Serialize};
use stratlink_core::command::Command;
use stratlink_core::error::ProtocolError;
use stratlink_core::id::UnitId;

/// One dispatched command, as recorded at issue time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuedCommand {
    pub unit: UnitId,
    pub command: Command,
    /// Frame counter at issue time.
    pub frame: u64,
    /// Monotonic per-session sequence number.
    pub sequence: u64,
}

/// Ordered record of dispatched commands awaiting the optimizer.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CommandLog {
    entries: Vec<IssuedCommand>,
    next_sequence: u64,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry, assigning it the next sequence number.
    pub fn push(&mut self, unit: UnitId, command: Command, frame: u64) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.entries.push(IssuedCommand {
            unit,
            command,
            frame,
            sequence,
        });
    }

    /// Hand the pending entries to the optimizer, oldest first, and clear.
    pub fn drain(&mut self) -> Vec<IssuedCommand> {
        std::mem::take(&mut self.entries)
    }

    pub fn entries(&self) -> &[IssuedCommand] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// JSON export of the pending entries, for replay capture.
    pub fn export_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(&self.entries)?)
    }
}
