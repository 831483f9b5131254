//! FreeSWITCH Exporter
//!
//! Polls a FreeSWITCH switch over its event socket and republishes call
//! session counters, Sofia SIP profiles and gateway health either as InfluxDB
//! line protocol (one-shot, for Telegraf's `exec` input) or as JSON over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐    Event Socket      ┌──────────────┐
//! │ FreeSWITCH  │ ◄─────────────────►  │   Exporter   │
//! │             │   api status, ...    │              │
//! └─────────────┘                      │  ┌────────┐  │      HTTP      ┌────────────┐
//!                                      │  │Fetcher │  │ ◄────────────► │  Monitor   │
//!                                      │  └────────┘  │  /gateways/... └────────────┘
//!                                      │  ┌────────┐  │
//!                                      │  │ Output │  │ ──► stdout (line protocol)
//!                                      │  └────────┘  │
//!                                      └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`freeswitch`] - Event socket client, response types and parsers
//! - [`fetcher`] - Fetch orchestration and the short-lived result cache
//! - [`output`] - Line protocol and JSON rendering
//! - [`health`] - Gateway check predicates
//! - [`server`] - HTTP endpoints
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! # Quick Start
//!
//! ```no_run
//! use freeswitch_exporter::{config::Config, fetcher::Fetcher, output::OutputFormat};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/Default.toml")?;
//!     let mut fetcher = Fetcher::connect(&config.freeswitch).await?;
//!     let result = fetcher.get_data().await;
//!     fetcher.close().await;
//!     result?;
//!
//!     let output = fetcher.format_output(OutputFormat::Line);
//!     print!("{}{}{}", output.sessions, output.profiles, output.gateways);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod fetcher;
pub mod freeswitch;
pub mod health;
pub mod output;
pub mod server;
