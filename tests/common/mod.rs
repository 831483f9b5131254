//! Scripted stand-in for a FreeSWITCH event socket
//!
//! Replies are keyed by command text; a command with no scripted reply fails
//! the way a switch without that API does (`-ERR ... Command not found!`).

#![allow(dead_code)]

use async_trait::async_trait;
use freeswitch_exporter::error::{ExporterError, Result};
use freeswitch_exporter::freeswitch::{Command, Connector, Transport};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const JSON_STATUS_OK: &str = r#"{
  "command": "status",
  "data": "",
  "status": "success",
  "response": {
    "systemStatus": "ready",
    "version": "1.10.9-release 64bit",
    "sessions": {
      "count": {"total": 118, "active": 3, "peak": 7, "peak5Min": 4, "limit": 1000},
      "rate": {"current": 1, "max": 30, "peak": 5, "peak5Min": 2}
    },
    "idleCPU": {"used": 0, "allowed": 97.93},
    "stackSizeKB": {"current": 240, "max": 8192}
  }
}"#;

pub const TEXT_STATUS_OK: &str = "UP 0 years, 0 days, 2 hours, 10 minutes, 3 seconds, 501 milliseconds, 11 microseconds
FreeSWITCH (Version 1.4.26 -release 64bit) is ready
118 session(s) since startup
3 session(s) - peak 7, last 5min 4
1 session(s) per Sec out of max 30, peak 5, last 5min 2
1000 session(s) max
min idle cpu 0.00/97.93
Current Stack Size/Max 240K/8192K
";

pub const PROFILES_XML: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<profiles>
  <profile>
    <name>internal</name>
    <type>profile</type>
    <data>sip:mod_sofia@10.0.0.1:5060</data>
    <state>RUNNING (3)</state>
  </profile>
  <alias>
    <name>10.0.0.1</name>
    <type>alias</type>
    <data>internal</data>
    <state>ALIASED</state>
  </alias>
  <profile>
    <name>external</name>
    <type>profile</type>
    <data>sip:mod_sofia@203.0.113.7:5080</data>
    <state>RUNNING (0)</state>
  </profile>
</profiles>
"#;

pub const GATEWAYS_XML: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<gateways>
  <gateway>
    <name>carrier-a</name>
    <profile>external</profile>
    <scheme>Digest</scheme>
    <realm>sip.carrier-a.example</realm>
    <pingtime>12.40</pingtime>
    <state>REGED</state>
    <status>UP</status>
  </gateway>
  <gateway>
    <name>carrier-b</name>
    <profile>external</profile>
    <realm>sip.carrier-b.example</realm>
    <pingtime>48.00</pingtime>
    <state>REGED</state>
    <status>UP</status>
  </gateway>
</gateways>
"#;

#[derive(Default)]
struct SwitchState {
    replies: HashMap<String, std::result::Result<Vec<u8>, String>>,
    sent: Vec<String>,
    connects: usize,
    closes: usize,
    refuse_connections: bool,
    panic_on_send: bool,
}

/// Shared handle to the scripted switch; clones see the same state
#[derive(Clone, Default)]
pub struct MockSwitch {
    state: Arc<Mutex<SwitchState>>,
}

impl MockSwitch {
    /// A switch with the JSON status API and two profiles, two gateways
    pub fn healthy() -> Self {
        let switch = MockSwitch::default();
        switch.reply(Command::JsonStatus, JSON_STATUS_OK);
        switch.reply(Command::SofiaProfiles, PROFILES_XML);
        switch.reply(Command::SofiaGateways, GATEWAYS_XML);
        switch
    }

    /// A pre-1.6 switch: no JSON API, plain-text status only
    pub fn legacy() -> Self {
        let switch = MockSwitch::default();
        switch.reply(Command::Status, TEXT_STATUS_OK);
        switch.reply(Command::SofiaProfiles, PROFILES_XML);
        switch.reply(Command::SofiaGateways, GATEWAYS_XML);
        switch
    }

    pub fn reply(&self, command: Command, body: &str) {
        self.reply_bytes(command, body.as_bytes().to_vec());
    }

    pub fn reply_bytes(&self, command: Command, body: Vec<u8>) {
        self.state
            .lock()
            .unwrap()
            .replies
            .insert(command.as_str().to_string(), Ok(body));
    }

    pub fn fail(&self, command: Command, message: &str) {
        self.state
            .lock()
            .unwrap()
            .replies
            .insert(command.as_str().to_string(), Err(message.to_string()));
    }

    pub fn refuse_connections(&self) {
        self.state.lock().unwrap().refuse_connections = true;
    }

    pub fn panic_on_send(&self) {
        self.state.lock().unwrap().panic_on_send = true;
    }

    pub fn sent(&self) -> Vec<String> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn clear_sent(&self) {
        self.state.lock().unwrap().sent.clear();
    }

    pub fn connects(&self) -> usize {
        self.state.lock().unwrap().connects
    }

    pub fn closes(&self) -> usize {
        self.state.lock().unwrap().closes
    }

    pub fn transport(&self) -> MockTransport {
        self.state.lock().unwrap().connects += 1;
        MockTransport {
            switch: self.clone(),
            closed: false,
        }
    }
}

pub struct MockTransport {
    switch: MockSwitch,
    closed: bool,
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, command: &str) -> Result<Vec<u8>> {
        if self.closed {
            return Err(ExporterError::Transport("connection is closed".to_string()));
        }
        let mut state = self.switch.state.lock().unwrap();
        if state.panic_on_send {
            drop(state);
            panic!("switch exploded");
        }
        state.sent.push(command.to_string());
        let verb = command.split_whitespace().nth(1).unwrap_or(command).to_string();
        match state.replies.get(command) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(message)) => Err(ExporterError::Transport(message.clone())),
            None => Err(ExporterError::Transport(format!(
                "-ERR {} Command not found!",
                verb
            ))),
        }
    }

    async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.switch.state.lock().unwrap().closes += 1;
        }
    }
}

#[async_trait]
impl Connector for MockSwitch {
    type Transport = MockTransport;

    async fn connect(&self) -> Result<MockTransport> {
        if self.state.lock().unwrap().refuse_connections {
            return Err(ExporterError::Connection(
                "cannot reach localhost:8021: Connection refused".to_string(),
            ));
        }
        Ok(self.transport())
    }
}
