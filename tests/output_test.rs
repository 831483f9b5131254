//! Output formatter tests
//!
//! Exact line protocol text and JSON shape for each section.

use freeswitch_exporter::freeswitch::types::{
    GatewayStatus, SessionCounters, SofiaGateway, SofiaProfile,
};
use freeswitch_exporter::output::{format_records, OutputFormat};

fn sessions() -> SessionCounters {
    SessionCounters {
        active: 3,
        peak: 7,
        peak_5min: 4,
        total: 118,
        rate_current: 1,
        rate_max: 30,
        rate_peak: 5,
        rate_peak_5min: 2,
    }
}

fn profiles() -> Vec<SofiaProfile> {
    vec![
        SofiaProfile {
            name: "internal".to_string(),
            address: "10.0.0.1".to_string(),
            running: "3".to_string(),
            raw_data: "sip:mod_sofia@10.0.0.1:5060".to_string(),
        },
        SofiaProfile {
            name: "external".to_string(),
            address: "203.0.113.7".to_string(),
            running: "0".to_string(),
            raw_data: "sip:mod_sofia@203.0.113.7:5080".to_string(),
        },
    ]
}

fn gateways() -> Vec<SofiaGateway> {
    vec![
        SofiaGateway {
            name: "carrier-a".to_string(),
            ping: "12.40".to_string(),
            status: GatewayStatus::Up,
        },
        SofiaGateway {
            name: "carrier-b".to_string(),
            ping: "0.00".to_string(),
            status: GatewayStatus::Down,
        },
    ]
}

#[test]
fn test_line_format_sessions() {
    let output = format_records(OutputFormat::Line, &sessions(), &profiles(), &gateways());

    assert_eq!(
        output.sessions,
        "freeswitch_sessions active=3,peak=7,peak_5min=4,total=118,rate_current=1,rate_max=30,rate_peak=5,rate_peak_5min=2\n"
    );
}

#[test]
fn test_line_format_profiles() {
    let output = format_records(OutputFormat::Line, &sessions(), &profiles(), &gateways());

    assert_eq!(
        output.profiles,
        "freeswitch_profile_sessions,profile=internal,ip=10.0.0.1 running=3\n\
         freeswitch_profile_sessions,profile=external,ip=203.0.113.7 running=0\n"
    );
}

#[test]
fn test_line_format_gateways() {
    let output = format_records(OutputFormat::Line, &sessions(), &profiles(), &gateways());

    assert_eq!(
        output.gateways,
        "freeswitch_gateway,name=carrier-a ping=12.40,status=1\n\
         freeswitch_gateway,name=carrier-b ping=0.00,status=0\n"
    );
}

#[test]
fn test_line_format_without_profiles_or_gateways() {
    let output = format_records(OutputFormat::Line, &sessions(), &[], &[]);

    assert!(output.sessions.starts_with("freeswitch_sessions "));
    assert_eq!(output.profiles, "");
    assert_eq!(output.gateways, "");
}

#[test]
fn test_json_sessions_round_trip_values() {
    // Given: Counters rendered as JSON
    let output = format_records(OutputFormat::Json, &sessions(), &profiles(), &gateways());

    // When: Reading the document back
    let value: serde_json::Value = serde_json::from_str(&output.sessions).unwrap();

    // Then: Every counter keeps its value under its key
    assert_eq!(value["active"], 3);
    assert_eq!(value["peak"], 7);
    assert_eq!(value["peak_5min"], 4);
    assert_eq!(value["total"], 118);
    assert_eq!(value["rate_current"], 1);
    assert_eq!(value["rate_max"], 30);
    assert_eq!(value["rate_peak"], 5);
    assert_eq!(value["rate_peak_5min"], 2);
}

#[test]
fn test_json_is_pretty_printed_with_single_space_indent() {
    let output = format_records(OutputFormat::Json, &sessions(), &[], &[]);

    assert!(output.sessions.starts_with("{\n \"active\": 3,\n \"peak\": 7,"));
    assert_eq!(output.profiles, "[]");
    assert_eq!(output.gateways, "[]");
}

#[test]
fn test_json_profiles_shape() {
    let output = format_records(OutputFormat::Json, &sessions(), &profiles(), &gateways());

    let value: serde_json::Value = serde_json::from_str(&output.profiles).unwrap();
    assert_eq!(
        value,
        serde_json::json!([
            {"name": "internal", "ip": "10.0.0.1", "running": "3"},
            {"name": "external", "ip": "203.0.113.7", "running": "0"}
        ])
    );
}

#[test]
fn test_json_gateways_shape() {
    let output = format_records(OutputFormat::Json, &sessions(), &profiles(), &gateways());

    let value: serde_json::Value = serde_json::from_str(&output.gateways).unwrap();
    assert_eq!(
        value,
        serde_json::json!([
            {"name": "carrier-a", "ping": "12.40", "status": "1"},
            {"name": "carrier-b", "ping": "0.00", "status": "0"}
        ])
    );
}

#[test]
fn test_record_serialization_keeps_endpoint_field_names() {
    let profile = serde_json::to_value(&profiles()[0]).unwrap();
    let gateway = serde_json::to_value(&gateways()[0]).unwrap();

    assert_eq!(
        profile,
        serde_json::json!({
            "Name": "internal",
            "Address": "10.0.0.1",
            "Running": "3",
            "Data": "sip:mod_sofia@10.0.0.1:5060"
        })
    );
    assert_eq!(
        gateway,
        serde_json::json!({"Name": "carrier-a", "Ping": "12.40", "Status": "1"})
    );
}
