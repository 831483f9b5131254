//! Event Socket Connection
//!
//! This module owns the TCP connection to the FreeSWITCH event socket
//! (`mod_event_socket`, port 8021 by default). A connection is authenticated
//! once when it is opened and then carries strictly sequential
//! request/response exchanges: the protocol has no request ids, so a reply is
//! simply the next `api/response` frame on the stream.

use crate::config::FreeSwitchConfig;
use crate::error::{ExporterError, Result};
use crate::freeswitch::protocol::{
    encode_command, read_message, CONTENT_TYPE_API_RESPONSE, CONTENT_TYPE_AUTH_REQUEST,
    CONTENT_TYPE_COMMAND_REPLY, CONTENT_TYPE_DISCONNECT_NOTICE, HEADER_REPLY_TEXT,
};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info};

/// Request/response channel to the switch
#[async_trait]
pub trait Transport: Send {
    /// Send one command and return the body of its reply
    async fn send(&mut self, command: &str) -> Result<Vec<u8>>;

    /// Release the channel; calling it again is a no-op
    async fn close(&mut self);
}

/// Opens fresh transports, one per fetch
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Transport: Transport + 'static;

    async fn connect(&self) -> Result<Self::Transport>;
}

/// An authenticated event socket connection
pub struct EslConnection<S = TcpStream> {
    stream: Option<BufReader<S>>,
}

impl EslConnection<TcpStream> {
    /// Connect to the switch and authenticate
    pub async fn connect(config: &FreeSwitchConfig) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port);
        info!("Connecting to FreeSWITCH event socket at {}", addr);

        let stream = TcpStream::connect(&addr)
            .await
            .map_err(|e| ExporterError::Connection(format!("cannot reach {}: {}", addr, e)))?;

        Self::handshake(stream, config.password.expose_secret()).await
    }
}

impl<S> EslConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Run the `auth/request` exchange on an already open stream
    pub async fn handshake(stream: S, password: &str) -> Result<Self> {
        let mut stream = BufReader::new(stream);

        let greeting = read_message(&mut stream)
            .await
            .map_err(|e| ExporterError::Connection(format!("no greeting from switch: {}", e)))?;
        if greeting.content_type() != Some(CONTENT_TYPE_AUTH_REQUEST) {
            return Err(ExporterError::Connection(format!(
                "expected {}, got {:?}",
                CONTENT_TYPE_AUTH_REQUEST,
                greeting.content_type()
            )));
        }

        debug!("Sending auth request");
        stream
            .write_all(&encode_command(&format!("auth {}", password)))
            .await
            .map_err(|e| ExporterError::Connection(e.to_string()))?;
        stream
            .flush()
            .await
            .map_err(|e| ExporterError::Connection(e.to_string()))?;

        let reply = read_message(&mut stream)
            .await
            .map_err(|e| ExporterError::Connection(format!("no auth reply: {}", e)))?;
        match reply.header(HEADER_REPLY_TEXT) {
            Some(text) if text.starts_with("+OK") => {
                debug!("Authenticated to event socket");
                Ok(Self {
                    stream: Some(stream),
                })
            }
            other => Err(ExporterError::Connection(format!(
                "authentication failed: {}",
                other.unwrap_or("no reply text")
            ))),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.stream.is_none()
    }
}

#[async_trait]
impl<S> Transport for EslConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, command: &str) -> Result<Vec<u8>> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| ExporterError::Transport("connection is closed".to_string()))?;

        debug!("Sending command: {}", command);
        stream
            .write_all(&encode_command(command))
            .await
            .map_err(|e| ExporterError::Transport(e.to_string()))?;
        stream
            .flush()
            .await
            .map_err(|e| ExporterError::Transport(e.to_string()))?;

        loop {
            let message = read_message(stream)
                .await
                .map_err(|e| ExporterError::Transport(e.to_string()))?;

            match message.content_type() {
                Some(CONTENT_TYPE_API_RESPONSE) | Some(CONTENT_TYPE_COMMAND_REPLY) => {
                    if let Some(reply) = message.error_reply() {
                        return Err(ExporterError::Transport(format!(
                            "{} rejected: {}",
                            command, reply
                        )));
                    }
                    debug!("{} reply received ({} bytes)", command, message.body.len());
                    return Ok(message.body);
                }
                Some(CONTENT_TYPE_DISCONNECT_NOTICE) => {
                    self.stream = None;
                    return Err(ExporterError::Transport(
                        "switch closed the event socket".to_string(),
                    ));
                }
                other => debug!("Skipping {:?} message while waiting for reply", other),
            }
        }
    }

    async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.write_all(&encode_command("exit")).await;
            let _ = stream.shutdown().await;
            info!("Event socket connection closed");
        }
    }
}

impl<S> Drop for EslConnection<S> {
    fn drop(&mut self) {
        // The socket itself is released when the stream is dropped
        if self.stream.is_some() {
            debug!("EslConnection dropped without close");
        }
    }
}

/// Connector for the configured switch
#[derive(Debug, Clone)]
pub struct EslConnector {
    config: FreeSwitchConfig,
}

impl EslConnector {
    pub fn new(config: FreeSwitchConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for EslConnector {
    type Transport = EslConnection;

    async fn connect(&self) -> Result<EslConnection> {
        EslConnection::connect(&self.config).await
    }
}
