//! Wire messages exchanged with the background process.
//!
//! Everything on the Channel is JSON. The shapes are fixed by the
//! background process: settings traffic is keyed by `mode`, tunnel
//! commands by `command`, and inbound frames are distinguished purely by
//! which fields they carry.

use common::SettingKey;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages the control surface sends to the background process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outbound {
    Settings(SettingsRequest),
    Tunnel(TunnelCommand),
}

/// `{"mode":"get","key":k}` or `{"mode":"set","key":k,"value":v}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum SettingsRequest {
    Get { key: SettingKey },
    Set { key: SettingKey, value: Value },
}

/// `{"command":"start"}` or `{"command":"stop"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum TunnelCommand {
    Start,
    Stop,
}

/// Messages the background process sends back.
///
/// Untagged: variant order matters because `serde` takes the first
/// match. The acknowledgement shapes carry a single boolean field and
/// cannot collide with a settings response, which always carries `key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Inbound {
    /// Acknowledgement that a `start` command completed.
    Started { started: bool },

    /// Acknowledgement that a `stop` command completed.
    Stopped { stopped: bool },

    /// Settings response; `value` is absent when nothing is stored.
    Settings {
        key: SettingKey,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },
}
