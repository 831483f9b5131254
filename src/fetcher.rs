//! Switch Data Fetcher
//!
//! A [`Fetcher`] owns one connection to the switch and pulls the three
//! reports the exporter publishes, in order, over that single channel:
//!
//! 1. `status` (JSON dialect, falling back to the plain-text dialect)
//! 2. `sofia xmlstatus`
//! 3. `sofia xmlstatus gateways`
//!
//! # Caching
//!
//! A successful fetch is served from memory for [`CACHE_WINDOW`]; calls inside
//! the window send nothing to the switch. Failed fetches do not touch the
//! stored data or the cache stamp, so the next call retries straight away.
//!
//! # Concurrency
//!
//! One caller per instance. The HTTP layer builds a fetcher per request
//! instead of sharing one.

use crate::config::FreeSwitchConfig;
use crate::error::{ExporterError, FetchStage, Result};
use crate::freeswitch::sofia::{parse_gateways, parse_profiles};
use crate::freeswitch::status::StatusReply;
use crate::freeswitch::types::{SessionCounters, SofiaGateway, SofiaProfile};
use crate::freeswitch::{Command, EslConnection, Transport};
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How long a successful fetch is served from memory
pub const CACHE_WINDOW: Duration = Duration::from_secs(5);

pub struct Fetcher<T: Transport = EslConnection> {
    transport: T,
    sessions: Option<SessionCounters>,
    profiles: Vec<SofiaProfile>,
    gateways: Vec<SofiaGateway>,
    cache_time: Option<Instant>,
}

impl Fetcher<EslConnection> {
    /// Open and authenticate a connection; nothing is fetched yet
    pub async fn connect(config: &FreeSwitchConfig) -> Result<Self> {
        let transport = EslConnection::connect(config).await?;
        Ok(Self::new(transport))
    }
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            sessions: None,
            profiles: Vec::new(),
            gateways: Vec::new(),
            cache_time: None,
        }
    }

    /// Refresh sessions, profiles and gateways unless the cache is fresh
    ///
    /// All three are replaced together or not at all.
    pub async fn get_data(&mut self) -> Result<()> {
        if let Some(cached_at) = self.cache_time {
            if cached_at.elapsed() < CACHE_WINDOW {
                debug!("Serving switch data cached {:?} ago", cached_at.elapsed());
                return Ok(());
            }
        }

        let sessions = self.fetch_sessions().await?;

        let body = self
            .transport
            .send(Command::SofiaProfiles.as_str())
            .await
            .map_err(|e| ExporterError::fetch(FetchStage::SendProfiles, e))?;
        let profiles =
            parse_profiles(&body).map_err(|e| ExporterError::fetch(FetchStage::ParseProfiles, e))?;

        let body = self
            .transport
            .send(Command::SofiaGateways.as_str())
            .await
            .map_err(|e| ExporterError::fetch(FetchStage::SendGateways, e))?;
        let gateways =
            parse_gateways(&body).map_err(|e| ExporterError::fetch(FetchStage::ParseGateways, e))?;

        info!(
            "Fetched switch data: {} active sessions, {} profiles, {} gateways",
            sessions.active,
            profiles.len(),
            gateways.len()
        );

        self.sessions = Some(sessions);
        self.profiles = profiles;
        self.gateways = gateways;
        self.cache_time = Some(Instant::now());
        Ok(())
    }

    /// Send `status`, preferring the JSON dialect
    ///
    /// Only a failed send of the JSON command falls back to plain text; a JSON
    /// reply that does not parse is an error.
    async fn fetch_sessions(&mut self) -> Result<SessionCounters> {
        let reply = match self.transport.send(Command::JsonStatus.as_str()).await {
            Ok(body) => StatusReply::Json(body),
            Err(e) => {
                warn!("JSON status command failed ({}), falling back to plain status", e);
                let body = self
                    .transport
                    .send(Command::Status.as_str())
                    .await
                    .map_err(|e| ExporterError::fetch(FetchStage::SendStatus, e))?;
                StatusReply::Text(body)
            }
        };

        reply
            .parse()
            .and_then(|report| report.into_sessions())
            .map_err(|e| ExporterError::fetch(FetchStage::ParseStatus, e))
    }

    /// Release the connection; safe to call more than once
    pub async fn close(&mut self) {
        self.transport.close().await;
    }

    /// Counters from the last successful fetch
    pub fn sessions(&self) -> Option<&SessionCounters> {
        self.sessions.as_ref()
    }

    pub fn profiles(&self) -> &[SofiaProfile] {
        &self.profiles
    }

    pub fn gateways(&self) -> &[SofiaGateway] {
        &self.gateways
    }

    /// Whether a fetch has ever succeeded
    pub fn is_fetched(&self) -> bool {
        self.cache_time.is_some()
    }
}
