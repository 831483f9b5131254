//! `status` Command Parser
//!
//! The same logical command comes back in two dialects depending on the
//! switch version: a JSON envelope (`api json {"command" : "status"}`) or the
//! legacy human-readable dump (`api status`):
//!
//! ```text
//! UP 0 years, 0 days, 2 hours, 10 minutes, 3 seconds, 501 milliseconds, 11 microseconds
//! FreeSWITCH (Version 1.10.9 -release 64bit) is ready
//! 118 session(s) since startup
//! 3 session(s) - peak 7, last 5min 4
//! 1 session(s) per Sec out of max 30, peak 5, last 5min 2
//! 1000 session(s) max
//! min idle cpu 0.00/97.93
//! ```
//!
//! Which dialect to parse is decided by which command the switch accepted,
//! captured as a [`StatusReply`].

use crate::error::{ExporterError, Result};
use crate::freeswitch::types::{SessionCounters, StatusEnvelope, StatusReport, StatusResponse};

/// Value of the status field when the switch answered normally
pub const STATUS_SUCCESS: &str = "success";

/// Raw `status` body tagged with the dialect it was requested in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusReply {
    Json(Vec<u8>),
    Text(Vec<u8>),
}

impl StatusReply {
    pub fn parse(&self) -> Result<StatusReport> {
        match self {
            StatusReply::Json(body) => parse_json_status(body),
            StatusReply::Text(body) => parse_text_status(&String::from_utf8_lossy(body)),
        }
    }
}

impl StatusReport {
    /// Session counters of a successful report, or a parse error otherwise
    pub fn into_sessions(self) -> Result<SessionCounters> {
        if self.status != STATUS_SUCCESS {
            return Err(ExporterError::Parse(format!(
                "switch reported status {:?}",
                self.status
            )));
        }
        self.sessions.ok_or_else(|| {
            ExporterError::Parse("status reply has no session counters".to_string())
        })
    }
}

/// Parse the JSON dialect
pub fn parse_json_status(body: &[u8]) -> Result<StatusReport> {
    let envelope: StatusEnvelope = serde_json::from_slice(body)
        .map_err(|e| ExporterError::Parse(format!("invalid JSON status: {}", e)))?;

    if envelope.status != STATUS_SUCCESS {
        return Ok(StatusReport {
            status: envelope.status,
            sessions: None,
        });
    }

    let response = envelope
        .response
        .ok_or_else(|| ExporterError::Parse("JSON status has no response object".to_string()))?;
    let response: StatusResponse = serde_json::from_value(response)
        .map_err(|e| ExporterError::Parse(format!("invalid JSON status response: {}", e)))?;

    Ok(StatusReport {
        status: envelope.status,
        sessions: Some(response.sessions.into()),
    })
}

/// Parse the plain-text dialect
///
/// The dump carries no status field of its own: a first line starting with
/// `UP` counts as success, anything else (`-ERR ...`) is reported verbatim.
pub fn parse_text_status(body: &str) -> Result<StatusReport> {
    let mut lines = body.lines().map(str::trim).filter(|l| !l.is_empty());

    let first = lines
        .next()
        .ok_or_else(|| ExporterError::Parse("empty status reply".to_string()))?;
    if !first.starts_with("UP") {
        return Ok(StatusReport {
            status: first.to_string(),
            sessions: None,
        });
    }

    let mut total = None;
    let mut current = None;
    let mut rate = None;

    for line in lines {
        if line.ends_with("session(s) since startup") {
            total = Some(leading_number(line)?);
        } else if line.contains("session(s) - peak") {
            current = Some((
                leading_number(line)?,
                number_after(line, "peak ")?,
                number_after(line, "last 5min ")?,
            ));
        } else if line.contains("session(s) per Sec") {
            rate = Some((
                leading_number(line)?,
                number_after(line, "out of max ")?,
                number_after(line, "peak ")?,
                number_after(line, "last 5min ")?,
            ));
        }
    }

    let total = total.ok_or_else(|| missing_line("session(s) since startup"))?;
    let (active, peak, peak_5min) = current.ok_or_else(|| missing_line("session(s) - peak"))?;
    let (rate_current, rate_max, rate_peak, rate_peak_5min) =
        rate.ok_or_else(|| missing_line("session(s) per Sec"))?;

    Ok(StatusReport {
        status: STATUS_SUCCESS.to_string(),
        sessions: Some(SessionCounters {
            active,
            peak,
            peak_5min,
            total,
            rate_current,
            rate_max,
            rate_peak,
            rate_peak_5min,
        }),
    })
}

fn missing_line(what: &str) -> ExporterError {
    ExporterError::Parse(format!("status reply has no '{}' line", what))
}

fn leading_number(line: &str) -> Result<u64> {
    parse_digits(line)
        .ok_or_else(|| ExporterError::Parse(format!("expected a leading count in {:?}", line)))
}

fn number_after(line: &str, label: &str) -> Result<u64> {
    line.find(label)
        .and_then(|pos| parse_digits(&line[pos + label.len()..]))
        .ok_or_else(|| {
            ExporterError::Parse(format!("expected a count after {:?} in {:?}", label, line))
        })
}

fn parse_digits(s: &str) -> Option<u64> {
    let s = s.trim_start();
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_digits_stops_at_first_non_digit() {
        assert_eq!(parse_digits("  42, peak"), Some(42));
        assert_eq!(parse_digits("5min"), Some(5));
        assert_eq!(parse_digits("peak"), None);
    }

    #[test]
    fn test_number_after_uses_first_occurrence() {
        let line = "1 session(s) per Sec out of max 30, peak 5, last 5min 2";
        assert_eq!(number_after(line, "peak ").unwrap(), 5);
        assert_eq!(number_after(line, "last 5min ").unwrap(), 2);
        assert!(number_after(line, "limit ").is_err());
    }
}
