//! Gateway Health Checks
//!
//! Aggregate predicates behind `/gateways/check` and
//! `/gateways/check-latency`. An empty gateway list is healthy.

use crate::config::{HealthConfig, UnparseablePing};
use crate::freeswitch::types::SofiaGateway;

/// Every gateway reports `UP`
pub fn gateways_up(gateways: &[SofiaGateway]) -> bool {
    gateways.iter().all(|g| g.status.is_up())
}

/// Every gateway is up and pings within `max_ping_ms`
pub fn gateways_within_latency(gateways: &[SofiaGateway], config: &HealthConfig) -> bool {
    gateways
        .iter()
        .all(|g| g.status.is_up() && ping_within(&g.ping, config))
}

fn ping_within(ping: &str, config: &HealthConfig) -> bool {
    match ping.trim().parse::<f64>() {
        Ok(ms) if !ms.is_nan() => ms <= config.max_ping_ms,
        _ => config.unparseable_ping == UnparseablePing::Healthy,
    }
}
