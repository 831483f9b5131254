//! Event Socket Framing
//!
//! Every message from the switch is a block of `Key: Value` header lines
//! ended by a blank line, followed by exactly `Content-Length` bytes of body
//! when that header is present. Commands go the other way as a single line
//! followed by a blank line.

use std::collections::HashMap;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

pub const CONTENT_TYPE_AUTH_REQUEST: &str = "auth/request";
pub const CONTENT_TYPE_COMMAND_REPLY: &str = "command/reply";
pub const CONTENT_TYPE_API_RESPONSE: &str = "api/response";
pub const CONTENT_TYPE_DISCONNECT_NOTICE: &str = "text/disconnect-notice";

pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_CONTENT_LENGTH: &str = "Content-Length";
pub const HEADER_REPLY_TEXT: &str = "Reply-Text";

/// Bodies above this are treated as a desynchronised stream
pub const MAX_BODY_SIZE: usize = 64 * 1024 * 1024;

/// Commands the exporter issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `status` through the JSON API (FreeSWITCH 1.6+)
    JsonStatus,
    /// Legacy plain-text `status`
    Status,
    SofiaProfiles,
    SofiaGateways,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::JsonStatus => r#"api json {"command" : "status", "data" : ""}"#,
            Command::Status => "api status",
            Command::SofiaProfiles => "api sofia xmlstatus",
            Command::SofiaGateways => "api sofia xmlstatus gateways",
        }
    }
}

/// One framed message from the switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EslMessage {
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl EslMessage {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(HEADER_CONTENT_TYPE)
    }

    /// Error text when the reply signals failure with a leading `-ERR`
    pub fn error_reply(&self) -> Option<String> {
        if let Some(reply) = self.header(HEADER_REPLY_TEXT) {
            if reply.starts_with("-ERR") {
                return Some(reply.to_string());
            }
        }
        if self.body.starts_with(b"-ERR") {
            return Some(String::from_utf8_lossy(&self.body).trim().to_string());
        }
        None
    }
}

/// Encode a command for the wire
pub fn encode_command(command: &str) -> Vec<u8> {
    format!("{}\n\n", command).into_bytes()
}

/// Read one complete message
pub async fn read_message<R>(reader: &mut R) -> io::Result<EslMessage>
where
    R: AsyncBufRead + Unpin,
{
    let mut headers = HashMap::new();
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed by switch",
            ));
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            // Stray blank lines between messages are not a header terminator
            if headers.is_empty() {
                continue;
            }
            break;
        }
        let (key, value) = trimmed.split_once(':').ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid header line {:?}", trimmed),
            )
        })?;
        headers.insert(key.trim().to_string(), value.trim().to_string());
    }

    if !headers.contains_key(HEADER_CONTENT_TYPE) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "message without Content-Type",
        ));
    }

    let body = match headers.get(HEADER_CONTENT_LENGTH) {
        Some(length) => {
            let length: usize = length.parse().map_err(|_| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("invalid Content-Length {:?}", length),
                )
            })?;
            if length > MAX_BODY_SIZE {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Content-Length {} exceeds limit {}", length, MAX_BODY_SIZE),
                ));
            }
            let mut body = vec![0; length];
            reader.read_exact(&mut body).await?;
            body
        }
        None => Vec::new(),
    };

    Ok(EslMessage { headers, body })
}
