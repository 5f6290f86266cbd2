//! Demo: arm and disarm a simulated panel.

use std::sync::Mutex;

use visonic_alarm_bridge::{
    AlarmClient, AlarmConfig, LastEvent, LogNotifier, PanelSnapshot, Result, VisonicAlarm,
};

/// Scripted stand-in for a real panel client.
struct SimulatedClient {
    state: Mutex<&'static str>,
    ready: bool,
}

impl SimulatedClient {
    fn new(state: &'static str, ready: bool) -> Self {
        Self {
            state: Mutex::new(state),
            ready,
        }
    }

    fn set(&self, state: &'static str) {
        *self.state.lock().unwrap() = state;
    }
}

impl AlarmClient for SimulatedClient {
    async fn refresh(&self) -> Result<PanelSnapshot> {
        Ok(PanelSnapshot {
            state: Some(self.state.lock().unwrap().to_string()),
            ready: self.ready,
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
        // Real panels report the exit delay first.
        self.set("EXITDELAY");
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
    tracing_subscriber::fmt::init();

    let config = AlarmConfig::builder().user_code("1234").build();
    let client = SimulatedClient::new("DISARM", true);
    let mut alarm = VisonicAlarm::new(client, LogNotifier, config);

    alarm.update().await?;
    println!("{}: {} ({})", alarm.name(), alarm.state(), alarm.icon());

    // Wrong code: refused with a notice, no panel call is made.
    alarm.alarm_arm_away(Some("0000")).await?;
    println!("after wrong code: {}", alarm.state());

    alarm.alarm_arm_away(Some("1234")).await?;
    println!("after arm away: {}", alarm.state());

    alarm.alarm_disarm(Some("1234")).await?;
    println!("after disarm: {}", alarm.state());

    Ok(())
}
