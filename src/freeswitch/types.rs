//! FreeSWITCH Response Type Definitions
//!
//! Normalized records produced by the parsers, plus the raw document shapes
//! the switch returns for each command.
//!
//! # Commands Covered
//!
//! - `json {"command" : "status"}` → [`StatusEnvelope`], [`SessionsBlock`]
//! - `status` → parsed line by line in [`crate::freeswitch::status`]
//! - `sofia xmlstatus` → [`ProfilesDocument`], [`XmlProfile`]
//! - `sofia xmlstatus gateways` → [`GatewaysDocument`], [`XmlGateway`]
//!
//! # Design Notes
//!
//! - **Defaults**: XML element structs default every field, so a missing
//!   element reads as an empty string instead of failing the whole report.
//! - **Field names**: the normalized records serialize with the field names
//!   the HTTP endpoints have always exposed (`Name`, `Address`, ...).

#![allow(dead_code)] // Document structs keep every element the switch reports
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Session counters from the `status` command
///
/// Serializes with the keys of the `/status` endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionCounters {
    pub active: u64,
    pub peak: u64,
    pub peak_5min: u64,
    pub total: u64,
    pub rate_current: u64,
    pub rate_max: u64,
    pub rate_peak: u64,
    pub rate_peak_5min: u64,
}

/// Result of parsing a `status` reply in either dialect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    /// `"success"` when the switch answered normally
    pub status: String,
    /// Only present when `status` is `"success"`
    pub sessions: Option<SessionCounters>,
}

/// One SIP profile from `sofia xmlstatus`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SofiaProfile {
    pub name: String,
    pub address: String,
    pub running: String,
    #[serde(rename = "Data")]
    pub raw_data: String,
}

/// Normalized gateway state: `"1"` when the switch reports `UP`, `"0"` otherwise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayStatus {
    Down,
    Up,
}

impl GatewayStatus {
    /// Map the switch's status token; anything but `UP` is down
    pub fn from_token(token: &str) -> Self {
        if token == "UP" {
            GatewayStatus::Up
        } else {
            GatewayStatus::Down
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayStatus::Up => "1",
            GatewayStatus::Down => "0",
        }
    }

    pub fn is_up(&self) -> bool {
        matches!(self, GatewayStatus::Up)
    }
}

impl fmt::Display for GatewayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for GatewayStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One gateway from `sofia xmlstatus gateways`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SofiaGateway {
    pub name: String,
    /// Last ping round trip in milliseconds, as reported
    pub ping: String,
    pub status: GatewayStatus,
}

/// Envelope returned by `api json {"command" : "status", ...}`
#[derive(Debug, Deserialize)]
pub struct StatusEnvelope {
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub data: String,
    pub status: String,
    /// Decoded into [`StatusResponse`] only on success; errors carry a string here
    #[serde(default)]
    pub response: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    #[serde(rename = "systemStatus", default)]
    pub system_status: Option<String>,
    pub sessions: SessionsBlock,
}

#[derive(Debug, Deserialize)]
pub struct SessionsBlock {
    pub count: SessionCount,
    pub rate: SessionRate,
}

#[derive(Debug, Deserialize)]
pub struct SessionCount {
    pub total: u64,
    pub active: u64,
    pub peak: u64,
    #[serde(rename = "peak5Min")]
    pub peak_5min: u64,
    #[serde(default)]
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SessionRate {
    pub current: u64,
    pub max: u64,
    pub peak: u64,
    #[serde(rename = "peak5Min")]
    pub peak_5min: u64,
}

impl From<SessionsBlock> for SessionCounters {
    fn from(block: SessionsBlock) -> Self {
        SessionCounters {
            active: block.count.active,
            peak: block.count.peak,
            peak_5min: block.count.peak_5min,
            total: block.count.total,
            rate_current: block.rate.current,
            rate_max: block.rate.max,
            rate_peak: block.rate.peak,
            rate_peak_5min: block.rate.peak_5min,
        }
    }
}

/// `<profiles>` root of `sofia xmlstatus`
///
/// `<alias>` elements may sit between profiles; they are skipped.
#[derive(Debug, Deserialize, Default)]
pub struct ProfilesDocument {
    #[serde(rename = "profile", default)]
    pub profiles: Vec<XmlProfile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct XmlProfile {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// SIP URI of the listener, e.g. `sip:mod_sofia@10.0.0.1:5060`
    pub data: String,
    /// e.g. `RUNNING (2)`
    pub state: String,
}

/// `<gateways>` root of `sofia xmlstatus gateways`
#[derive(Debug, Deserialize, Default)]
pub struct GatewaysDocument {
    #[serde(rename = "gateway", default)]
    pub gateways: Vec<XmlGateway>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct XmlGateway {
    pub name: String,
    pub profile: String,
    pub realm: String,
    pub pingtime: String,
    /// Registration state, e.g. `REGED` or `NOREG`
    pub state: String,
    /// Reachability token, `UP` or `DOWN`
    pub status: String,
}
