//! Demo: expose a simulated panel over a local MQTT broker.
//!
//! Needs a broker on localhost:1883. Drive it with e.g.
//!
//! ```text
//! mosquitto_sub -t 'visonic/alarm/#' -v
//! mosquitto_pub -t visonic/alarm/set -m '{"op":"ARM_AWAY","code":"1234"}'
//! ```

use std::sync::Mutex;

use visonic_alarm_bridge::bridge::{self, BridgeConfig};
use visonic_alarm_bridge::{AlarmClient, AlarmConfig, LastEvent, PanelSnapshot, Result};

/// Stand-in for a real panel client; arming flips its reported state.
struct SimulatedClient {
    state: Mutex<&'static str>,
}

impl SimulatedClient {
    fn set(&self, state: &'static str) {
        *self.state.lock().unwrap() = state;
    }
}

impl AlarmClient for SimulatedClient {
    async fn refresh(&self) -> Result<PanelSnapshot> {
        Ok(PanelSnapshot {
            state: Some(self.state.lock().unwrap().to_string()),
            ready: true,
            connected: true,
            session_token: "sim-session".to_string(),
            serial_number: "SIM0001".to_string(),
            model: "PowerMaster 30".to_string(),
            alarms: Vec::new(),
        })
    }

    async fn disarm(&self) -> Result<()> {
        self.set("DISARM");
        Ok(())
    }

    async fn arm_home(&self) -> Result<()> {
        self.set("ARMED_HOME");
        Ok(())
    }

    async fn arm_away(&self) -> Result<()> {
        self.set("AWAY");
        Ok(())
    }

    async fn last_event(&self, _hour_offset: i32) -> Result<LastEvent> {
        Ok(LastEvent {
            user: "Demo User".to_string(),
            timestamp: "2026-02-07 08:15:00".to_string(),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG controls verbosity. Default: info.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let alarm_config = AlarmConfig::builder().user_code("1234").build();
    let bridge_config = BridgeConfig::default();
    let client = SimulatedClient {
        state: Mutex::new("DISARM"),
    };

    tokio::select! {
        result = bridge::run(client, alarm_config, bridge_config) => result?,
        _ = tokio::signal::ctrl_c() => println!("shutting down"),
    }
    Ok(())
}
