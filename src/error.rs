use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("error {stage}: {source}")]
    Fetch {
        stage: FetchStage,
        #[source]
        source: Box<ExporterError>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExporterError {
    /// Wrap an error with the fetch step it happened in
    pub fn fetch(stage: FetchStage, source: ExporterError) -> Self {
        ExporterError::Fetch {
            stage,
            source: Box::new(source),
        }
    }
}

/// Step of a fetch round that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    SendStatus,
    ParseStatus,
    SendProfiles,
    ParseProfiles,
    SendGateways,
    ParseGateways,
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            FetchStage::SendStatus => "sending status command",
            FetchStage::ParseStatus => "parsing status command",
            FetchStage::SendProfiles => "sending xmlstatus",
            FetchStage::ParseProfiles => "parsing xmlstatus",
            FetchStage::SendGateways => "sending xmlstatus gateways",
            FetchStage::ParseGateways => "parsing xmlstatus gateways",
        };
        f.write_str(stage)
    }
}

pub type Result<T> = std::result::Result<T, ExporterError>;
