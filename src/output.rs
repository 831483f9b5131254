//! Output Formatting
//!
//! Renders the data of a [`Fetcher`] as either InfluxDB line protocol (for
//! Telegraf's `exec` input) or pretty-printed JSON:
//!
//! ```text
//! freeswitch_sessions active=3,peak=7,peak_5min=4,total=118,rate_current=1,rate_max=30,rate_peak=5,rate_peak_5min=2
//! freeswitch_profile_sessions,profile=internal,ip=10.0.0.1 running=3
//! freeswitch_gateway,name=carrier-a ping=12.40,status=1
//! ```

use crate::fetcher::Fetcher;
use crate::freeswitch::types::{GatewayStatus, SessionCounters, SofiaGateway, SofiaProfile};
use crate::freeswitch::Transport;
use serde::Serialize;
use std::fmt::Write;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON, one document per section
    Json,
    /// InfluxDB line protocol
    Line,
}

/// Sessions, profiles and gateways rendered in one format
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattedOutput {
    pub sessions: String,
    pub profiles: String,
    pub gateways: String,
}

#[derive(Serialize)]
struct ProfileView<'a> {
    name: &'a str,
    ip: &'a str,
    running: &'a str,
}

#[derive(Serialize)]
struct GatewayView<'a> {
    name: &'a str,
    ping: &'a str,
    status: GatewayStatus,
}

impl<T: Transport> Fetcher<T> {
    /// Render the stored data; all three sections are empty before the first
    /// successful fetch
    pub fn format_output(&self, format: OutputFormat) -> FormattedOutput {
        match self.sessions() {
            Some(sessions) => format_records(format, sessions, self.profiles(), self.gateways()),
            None => FormattedOutput::default(),
        }
    }
}

pub fn format_records(
    format: OutputFormat,
    sessions: &SessionCounters,
    profiles: &[SofiaProfile],
    gateways: &[SofiaGateway],
) -> FormattedOutput {
    match format {
        OutputFormat::Json => FormattedOutput {
            sessions: to_pretty_json(sessions),
            profiles: to_pretty_json(
                &profiles
                    .iter()
                    .map(|p| ProfileView {
                        name: &p.name,
                        ip: &p.address,
                        running: &p.running,
                    })
                    .collect::<Vec<_>>(),
            ),
            gateways: to_pretty_json(
                &gateways
                    .iter()
                    .map(|g| GatewayView {
                        name: &g.name,
                        ping: &g.ping,
                        status: g.status,
                    })
                    .collect::<Vec<_>>(),
            ),
        },
        OutputFormat::Line => FormattedOutput {
            sessions: sessions_line(sessions),
            profiles: profiles.iter().fold(String::new(), |mut out, p| {
                let _ = writeln!(
                    out,
                    "freeswitch_profile_sessions,profile={},ip={} running={}",
                    p.name, p.address, p.running
                );
                out
            }),
            gateways: gateways.iter().fold(String::new(), |mut out, g| {
                let _ = writeln!(
                    out,
                    "freeswitch_gateway,name={} ping={},status={}",
                    g.name, g.ping, g.status
                );
                out
            }),
        },
    }
}

fn sessions_line(s: &SessionCounters) -> String {
    format!(
        "freeswitch_sessions active={},peak={},peak_5min={},total={},rate_current={},rate_max={},rate_peak={},rate_peak_5min={}\n",
        s.active,
        s.peak,
        s.peak_5min,
        s.total,
        s.rate_current,
        s.rate_max,
        s.rate_peak,
        s.rate_peak_5min
    )
}

/// Pretty JSON with single-space indentation
fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> String {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    match value.serialize(&mut serializer) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(e) => {
            warn!("Failed to serialize output: {}", e);
            String::new()
        }
    }
}
