//! Sofia XML Status Parsers
//!
//! Decodes the reports of `sofia xmlstatus` and `sofia xmlstatus gateways`.
//! FreeSWITCH declares `encoding="ISO-8859-1"` on these documents, so every
//! document is transcoded to UTF-8 according to its declaration before it
//! reaches the XML deserializer.

use crate::error::{ExporterError, Result};
use crate::freeswitch::types::{
    GatewayStatus, GatewaysDocument, ProfilesDocument, SofiaGateway, SofiaProfile, XmlGateway,
    XmlProfile,
};
use encoding_rs::{Encoding, UTF_8};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Parse a `sofia xmlstatus` report, keeping document order
pub fn parse_profiles(raw: &[u8]) -> Result<Vec<SofiaProfile>> {
    let document: ProfilesDocument = decode_document(raw)?;
    Ok(document.profiles.into_iter().map(SofiaProfile::from).collect())
}

/// Parse a `sofia xmlstatus gateways` report, keeping document order
pub fn parse_gateways(raw: &[u8]) -> Result<Vec<SofiaGateway>> {
    let document: GatewaysDocument = decode_document(raw)?;
    Ok(document.gateways.into_iter().map(SofiaGateway::from).collect())
}

impl From<XmlProfile> for SofiaProfile {
    fn from(profile: XmlProfile) -> Self {
        SofiaProfile {
            address: address_from_uri(&profile.data),
            running: running_from_state(&profile.state),
            name: profile.name,
            raw_data: profile.data,
        }
    }
}

impl From<XmlGateway> for SofiaGateway {
    fn from(gateway: XmlGateway) -> Self {
        SofiaGateway {
            status: GatewayStatus::from_token(&gateway.status),
            name: gateway.name,
            ping: gateway.pingtime,
        }
    }
}

/// Transcode per the XML declaration, then deserialize
fn decode_document<T: DeserializeOwned>(raw: &[u8]) -> Result<T> {
    let raw = raw.trim_ascii();
    if !raw.starts_with(b"<") {
        return Err(ExporterError::Parse("reply is not an XML document".to_string()));
    }

    let (encoding, body) = match split_declaration(raw)? {
        Some((label, body)) => {
            let encoding = Encoding::for_label(label.as_bytes()).ok_or_else(|| {
                ExporterError::Parse(format!("unsupported XML encoding {:?}", label))
            })?;
            (encoding, body)
        }
        None => (UTF_8, raw),
    };
    debug!("Decoding XML document as {}", encoding.name());

    let text = encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or_else(|| {
            ExporterError::Parse(format!("XML document is not valid {}", encoding.name()))
        })?;

    quick_xml::de::from_str(&text)
        .map_err(|e| ExporterError::Parse(format!("malformed XML: {}", e)))
}

/// Split off a leading `<?xml ...?>` declaration
///
/// Returns the declared encoding label (UTF-8 when the declaration has none)
/// and the rest of the document, or `None` when there is no declaration.
fn split_declaration(raw: &[u8]) -> Result<Option<(String, &[u8])>> {
    let mut reader = Reader::from_reader(raw);
    let decl = match reader.read_event() {
        Ok(Event::Decl(decl)) => decl,
        Ok(_) => return Ok(None),
        Err(e) => {
            return Err(ExporterError::Parse(format!(
                "malformed XML declaration: {}",
                e
            )))
        }
    };

    let label = match decl.encoding() {
        Some(Ok(label)) => String::from_utf8_lossy(&label).trim().to_string(),
        Some(Err(e)) => {
            return Err(ExporterError::Parse(format!(
                "malformed encoding attribute: {}",
                e
            )))
        }
        None => "utf-8".to_string(),
    };

    let end = usize::try_from(reader.buffer_position())
        .map_err(|_| ExporterError::Parse("XML declaration offset overflow".to_string()))?;
    Ok(Some((label, raw[end..].trim_ascii_start())))
}

/// Host part of a listener URI such as `sip:mod_sofia@10.0.0.1:5060`
fn address_from_uri(uri: &str) -> String {
    let uri = uri.trim();
    let host_port = match uri.rsplit_once('@') {
        Some((_, host_port)) => host_port,
        None => uri
            .strip_prefix("sips:")
            .or_else(|| uri.strip_prefix("sip:"))
            .unwrap_or(uri),
    };
    let host_port = host_port.split(';').next().unwrap_or(host_port);

    if let Some(bracketed) = host_port.strip_prefix('[') {
        return bracketed.split(']').next().unwrap_or(bracketed).to_string();
    }
    match host_port.rsplit_once(':') {
        Some((host, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
            host.to_string()
        }
        _ => host_port.to_string(),
    }
}

/// Count in a state token like `RUNNING (3)`; other tokens are kept verbatim
fn running_from_state(state: &str) -> String {
    let state = state.trim();
    match (state.find('('), state.rfind(')')) {
        (Some(open), Some(close)) if open < close => state[open + 1..close].trim().to_string(),
        _ => state.to_string(),
    }
}
