// MIT License - Copyright (c) 2026 Peter Wright

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::client::{AlarmClient, PanelSnapshot};
use crate::config::AlarmConfig;
use crate::error::Result;
use crate::event::{AlarmEvent, EventReceiver, EventSender, event_channel};
use crate::notify::{Notice, Notifier};
use crate::state::AlarmState;

/// Display attributes exposed to the host alongside the canonical state.
///
/// Field names are the wire names hosts see on the attribute record.
#[derive(Debug, Clone, Serialize)]
pub struct StateAttributes {
    pub serial_number: String,
    pub model: String,
    pub ready: bool,
    pub connected: bool,
    pub session_token: String,
    pub last_update: Option<DateTime<Utc>>,
    pub code_format: Option<&'static str>,
    pub changed_by: Option<String>,
    pub changed_timestamp: Option<String>,
    /// Active alarm conditions reported by the panel.
    pub alarm: Vec<String>,
}

/// Alarm panel entity bridging a panel client to a smart-home host.
///
/// Holds the latest [`PanelSnapshot`] and the canonical state derived
/// from it, answers the host's attribute queries, and gates the
/// disarm / arm-home / arm-away commands behind the configured code and
/// the panel's readiness flag.
///
/// Drive it from a single task: [`update`](Self::update) on a fixed
/// interval, commands as the host requests them. Two overlapping command
/// invocations from different tasks would race on the shared client
/// connection; nothing here guards against that.
pub struct VisonicAlarm<C, N> {
    client: C,
    notifier: N,
    config: AlarmConfig,
    state: AlarmState,
    snapshot: PanelSnapshot,
    changed_by: Option<String>,
    changed_timestamp: Option<String>,
    last_update: Option<DateTime<Utc>>,
    event_tx: EventSender,
}

impl<C: AlarmClient, N: Notifier> VisonicAlarm<C, N> {
    /// Create the entity. The snapshot starts empty and the state starts
    /// [`AlarmState::Unknown`]; the first [`update`](Self::update)
    /// populates both.
    pub fn new(client: C, notifier: N, config: AlarmConfig) -> Self {
        let (event_tx, _event_rx) = event_channel(64);
        Self {
            client,
            notifier,
            config,
            state: AlarmState::Unknown,
            snapshot: PanelSnapshot::default(),
            changed_by: None,
            changed_timestamp: None,
            last_update: None,
            event_tx,
        }
    }

    // --- Host surface ---

    pub fn name(&self) -> &'static str {
        "Visonic Alarm"
    }

    /// Panel serial number; empty until the first refresh.
    pub fn unique_id(&self) -> &str {
        &self.snapshot.serial_number
    }

    pub fn state(&self) -> AlarmState {
        self.state
    }

    pub fn icon(&self) -> &'static str {
        self.state.icon()
    }

    /// `None` when no PIN is required, else the code format hint.
    pub fn code_format(&self) -> Option<&'static str> {
        if self.config.no_pin_required {
            None
        } else {
            Some("Number")
        }
    }

    /// User who last armed or disarmed the system, once known.
    pub fn changed_by(&self) -> Option<&str> {
        self.changed_by.as_deref()
    }

    pub fn changed_timestamp(&self) -> Option<&str> {
        self.changed_timestamp.as_deref()
    }

    /// Latest snapshot as fetched from the client.
    pub fn snapshot(&self) -> &PanelSnapshot {
        &self.snapshot
    }

    pub fn config(&self) -> &AlarmConfig {
        &self.config
    }

    /// Subscribe to entity events.
    pub fn subscribe(&self) -> EventReceiver {
        self.event_tx.subscribe()
    }

    /// Display attributes for the host.
    pub fn attributes(&self) -> StateAttributes {
        StateAttributes {
            serial_number: self.snapshot.serial_number.clone(),
            model: self.snapshot.model.clone(),
            ready: self.snapshot.ready,
            connected: self.snapshot.connected,
            session_token: self.snapshot.session_token.clone(),
            last_update: self.last_update,
            code_format: self.code_format(),
            changed_by: self.changed_by.clone(),
            changed_timestamp: self.changed_timestamp.clone(),
            alarm: self.snapshot.alarms.clone(),
        }
    }

    // --- Last change record ---

    /// Record who last armed or disarmed the system. Retained until the
    /// next tracked transition overwrites it.
    pub fn update_last_event(&mut self, user: impl Into<String>, timestamp: impl Into<String>) {
        self.changed_by = Some(user.into());
        self.changed_timestamp = Some(timestamp.into());
    }

    /// Query the client for the most recent change record and store it,
    /// applying the configured hour offset.
    pub async fn refresh_last_event(&mut self) -> Result<()> {
        let event = self.client.last_event(self.config.event_hour_offset).await?;
        self.update_last_event(event.user, event.timestamp);
        Ok(())
    }

    // --- Update ---

    /// Poll the client and re-derive the canonical state from the fresh
    /// snapshot. Emits [`AlarmEvent::StateChanged`] when the state moved
    /// and [`AlarmEvent::ConnectionChanged`] when the connection flag
    /// flipped.
    pub async fn update(&mut self) -> Result<()> {
        let snapshot = self.client.refresh().await?;
        debug!("panel raw state: {:?}", snapshot.state);

        let new_state = AlarmState::from_raw(snapshot.state.as_deref());
        if new_state == AlarmState::Unknown && snapshot.state.is_some() {
            warn!("unmapped panel state {:?}, reporting unknown", snapshot.state);
        }

        if snapshot.connected != self.snapshot.connected {
            let _ = self.event_tx.send(AlarmEvent::ConnectionChanged {
                connected: snapshot.connected,
            });
        }

        let old = self.state;
        self.state = new_state;
        self.snapshot = snapshot;
        self.last_update = Some(Utc::now());

        if old != new_state {
            let _ = self.event_tx.send(AlarmEvent::StateChanged {
                old,
                new: new_state,
            });
        }
        Ok(())
    }

    // --- Commands ---

    /// Disarm the panel.
    ///
    /// A wrong code (when a PIN is required) aborts with a notice and no
    /// client call. Otherwise the panel is disarmed, given the settle
    /// delay, and re-read once.
    pub async fn alarm_disarm(&mut self, code: Option<&str>) -> Result<()> {
        if !self.code_ok(code) {
            self.notifier
                .notify(Notice::new(
                    "Disarm Failed",
                    "You entered the wrong disarm code.",
                ))
                .await;
            return Ok(());
        }

        self.client.disarm().await?;
        self.settle_and_refresh().await
    }

    /// Arm the panel in home (stay) mode.
    ///
    /// Gated on the code like [`alarm_disarm`](Self::alarm_disarm) and
    /// additionally on the panel's readiness flag; a not-ready panel
    /// aborts with a notice and no client call.
    pub async fn alarm_arm_home(&mut self, code: Option<&str>) -> Result<()> {
        if !self.code_ok(code) {
            self.notifier
                .notify(Notice::new("Arm Failed", "You entered the wrong arm code."))
                .await;
            return Ok(());
        }

        if !self.snapshot.ready {
            self.notifier
                .notify(Notice::new(
                    "Arm Failed",
                    "The alarm system is not ready. Doors/windows open?",
                ))
                .await;
            return Ok(());
        }

        self.client.arm_home().await?;
        self.settle_and_refresh().await
    }

    /// Arm the panel in away mode. Same gating as
    /// [`alarm_arm_home`](Self::alarm_arm_home).
    pub async fn alarm_arm_away(&mut self, code: Option<&str>) -> Result<()> {
        if !self.code_ok(code) {
            self.notifier
                .notify(Notice::new(
                    "Unable to Arm",
                    "You entered the wrong arm code.",
                ))
                .await;
            return Ok(());
        }

        if !self.snapshot.ready {
            self.notifier
                .notify(Notice::new(
                    "Unable to Arm",
                    "The alarm system is not ready. Doors/windows open?",
                ))
                .await;
            return Ok(());
        }

        self.client.arm_away().await?;
        self.settle_and_refresh().await
    }

    fn code_ok(&self, code: Option<&str>) -> bool {
        self.config.no_pin_required || code == Some(self.config.user_code.as_str())
    }

    /// Wait for the panel to apply the last command, then poll once.
    ///
    /// The delay deliberately holds the calling task so the follow-up
    /// read sees post-command state rather than the value the panel
    /// reported while still settling.
    async fn settle_and_refresh(&mut self) -> Result<()> {
        sleep(self.config.settle_delay).await;
        self.update().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::LastEvent;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct MockClient {
        calls: Arc<Mutex<Vec<&'static str>>>,
        snapshot: Arc<Mutex<PanelSnapshot>>,
    }

    impl MockClient {
        fn with_state(raw: &str, ready: bool) -> Self {
            let client = Self::default();
            {
                let mut snap = client.snapshot.lock().unwrap();
                snap.state = Some(raw.to_string());
                snap.ready = ready;
                snap.connected = true;
                snap.session_token = "token-1".to_string();
                snap.serial_number = "123456".to_string();
                snap.model = "PowerMaster 10".to_string();
            }
            client
        }

        fn set_state(&self, raw: &str) {
            self.snapshot.lock().unwrap().state = Some(raw.to_string());
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn count(&self, name: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|&&c| c == name).count()
        }
    }

    impl AlarmClient for MockClient {
        async fn refresh(&self) -> Result<PanelSnapshot> {
            self.calls.lock().unwrap().push("refresh");
            Ok(self.snapshot.lock().unwrap().clone())
        }

        async fn disarm(&self) -> Result<()> {
            self.calls.lock().unwrap().push("disarm");
            self.set_state("DISARM");
            Ok(())
        }

        async fn arm_home(&self) -> Result<()> {
            self.calls.lock().unwrap().push("arm_home");
            self.set_state("ARMED_HOME");
            Ok(())
        }

        async fn arm_away(&self) -> Result<()> {
            self.calls.lock().unwrap().push("arm_away");
            self.set_state("AWAY");
            Ok(())
        }

        async fn last_event(&self, _hour_offset: i32) -> Result<LastEvent> {
            self.calls.lock().unwrap().push("last_event");
            Ok(LastEvent {
                user: "Sam".to_string(),
                timestamp: "2026-02-07 08:15:00".to_string(),
            })
        }
    }

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        notices: Arc<Mutex<Vec<Notice>>>,
    }

    impl RecordingNotifier {
        fn notices(&self) -> Vec<Notice> {
            self.notices.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        async fn notify(&self, notice: Notice) {
            self.notices.lock().unwrap().push(notice);
        }
    }

    fn pin_config() -> AlarmConfig {
        AlarmConfig::builder().user_code("1234").build()
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_normalizes_state() {
        let client = MockClient::with_state(" away ", true);
        let mut alarm = VisonicAlarm::new(client, RecordingNotifier::default(), pin_config());

        alarm.update().await.unwrap();
        assert_eq!(alarm.state(), AlarmState::ArmedAway);
        assert_eq!(alarm.icon(), "mdi:shield-lock");
        assert_eq!(alarm.unique_id(), "123456");

        let attrs = alarm.attributes();
        assert_eq!(attrs.serial_number, "123456");
        assert_eq!(attrs.model, "PowerMaster 10");
        assert!(attrs.connected);
        assert!(attrs.ready);
        assert_eq!(attrs.code_format, Some("Number"));
        assert!(attrs.last_update.is_some());
        assert_eq!(attrs.changed_by, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_without_status_is_unknown() {
        let client = MockClient::default();
        let mut alarm = VisonicAlarm::new(client, RecordingNotifier::default(), pin_config());

        alarm.update().await.unwrap();
        assert_eq!(alarm.state(), AlarmState::Unknown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_unmapped_status_is_unknown() {
        let client = MockClient::with_state("foobar", true);
        let mut alarm = VisonicAlarm::new(client, RecordingNotifier::default(), pin_config());

        alarm.update().await.unwrap();
        assert_eq!(alarm.state(), AlarmState::Unknown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_wrong_code_makes_no_client_call() {
        let client = MockClient::with_state("AWAY", true);
        let notifier = RecordingNotifier::default();
        let mut alarm = VisonicAlarm::new(client.clone(), notifier.clone(), pin_config());

        alarm.alarm_disarm(Some("9999")).await.unwrap();

        assert_eq!(client.count("disarm"), 0);
        assert_eq!(client.count("refresh"), 0);
        let notices = notifier.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].title, "Disarm Failed");
        assert_eq!(notices[0].message, "You entered the wrong disarm code.");
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_missing_code_makes_no_client_call() {
        let client = MockClient::with_state("AWAY", true);
        let notifier = RecordingNotifier::default();
        let mut alarm = VisonicAlarm::new(client.clone(), notifier.clone(), pin_config());

        alarm.alarm_disarm(None).await.unwrap();

        assert_eq!(client.count("disarm"), 0);
        assert_eq!(notifier.notices().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_correct_code_commands_then_refreshes_once() {
        let client = MockClient::with_state("AWAY", true);
        let notifier = RecordingNotifier::default();
        let mut alarm = VisonicAlarm::new(client.clone(), notifier.clone(), pin_config());

        alarm.alarm_disarm(Some("1234")).await.unwrap();

        assert_eq!(client.calls(), vec!["disarm", "refresh"]);
        assert_eq!(alarm.state(), AlarmState::Disarmed);
        assert!(notifier.notices().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_arm_home_not_ready_makes_no_client_call() {
        let client = MockClient::with_state("DISARM", false);
        let notifier = RecordingNotifier::default();
        let mut alarm = VisonicAlarm::new(client.clone(), notifier.clone(), pin_config());
        alarm.update().await.unwrap();

        alarm.alarm_arm_home(Some("1234")).await.unwrap();

        assert_eq!(client.count("arm_home"), 0);
        let notices = notifier.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].title, "Arm Failed");
        assert_eq!(
            notices[0].message,
            "The alarm system is not ready. Doors/windows open?"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_arm_away_not_ready_makes_no_client_call() {
        let client = MockClient::with_state("DISARM", false);
        let notifier = RecordingNotifier::default();
        let mut alarm = VisonicAlarm::new(client.clone(), notifier.clone(), pin_config());
        alarm.update().await.unwrap();

        alarm.alarm_arm_away(Some("1234")).await.unwrap();

        assert_eq!(client.count("arm_away"), 0);
        assert_eq!(notifier.notices()[0].title, "Unable to Arm");
    }

    #[tokio::test(start_paused = true)]
    async fn test_arm_away_ready_commands_then_refreshes_once() {
        let client = MockClient::with_state("DISARM", true);
        let notifier = RecordingNotifier::default();
        let mut alarm = VisonicAlarm::new(client.clone(), notifier.clone(), pin_config());
        alarm.update().await.unwrap();

        alarm.alarm_arm_away(Some("1234")).await.unwrap();

        assert_eq!(client.count("arm_away"), 1);
        // One refresh from the explicit update above, exactly one more
        // after the command settled.
        assert_eq!(client.count("refresh"), 2);
        assert_eq!(alarm.state(), AlarmState::ArmedAway);
        assert!(notifier.notices().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_arm_home_ready_commands_then_refreshes_once() {
        let client = MockClient::with_state("DISARM", true);
        let notifier = RecordingNotifier::default();
        let mut alarm = VisonicAlarm::new(client.clone(), notifier.clone(), pin_config());
        alarm.update().await.unwrap();

        alarm.alarm_arm_home(Some("1234")).await.unwrap();

        assert_eq!(client.calls(), vec!["refresh", "arm_home", "refresh"]);
        assert_eq!(alarm.state(), AlarmState::ArmedHome);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_pin_required_skips_code_check() {
        let client = MockClient::with_state("DISARM", true);
        let notifier = RecordingNotifier::default();
        let config = AlarmConfig::builder()
            .user_code("1234")
            .no_pin_required(true)
            .build();
        let mut alarm = VisonicAlarm::new(client.clone(), notifier.clone(), config);
        alarm.update().await.unwrap();

        alarm.alarm_arm_away(None).await.unwrap();
        assert_eq!(client.count("arm_away"), 1);

        alarm.alarm_disarm(Some("not even a number")).await.unwrap();
        assert_eq!(client.count("disarm"), 1);

        alarm.alarm_arm_home(None).await.unwrap();
        assert_eq!(client.count("arm_home"), 1);

        assert!(notifier.notices().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_code_format_follows_pin_requirement() {
        let alarm = VisonicAlarm::new(
            MockClient::default(),
            RecordingNotifier::default(),
            pin_config(),
        );
        assert_eq!(alarm.code_format(), Some("Number"));

        let alarm = VisonicAlarm::new(
            MockClient::default(),
            RecordingNotifier::default(),
            AlarmConfig::builder().no_pin_required(true).build(),
        );
        assert_eq!(alarm.code_format(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_emits_events() {
        let client = MockClient::with_state("AWAY", true);
        let mut alarm = VisonicAlarm::new(client, RecordingNotifier::default(), pin_config());
        let mut events = alarm.subscribe();

        alarm.update().await.unwrap();

        assert_eq!(
            events.try_recv().unwrap(),
            AlarmEvent::ConnectionChanged { connected: true }
        );
        assert_eq!(
            events.try_recv().unwrap(),
            AlarmEvent::StateChanged {
                old: AlarmState::Unknown,
                new: AlarmState::ArmedAway,
            }
        );
        assert!(events.try_recv().is_err());

        // Same state again: no further StateChanged.
        alarm.update().await.unwrap();
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_last_event_stores_record() {
        let client = MockClient::with_state("DISARM", true);
        let mut alarm = VisonicAlarm::new(client.clone(), RecordingNotifier::default(), pin_config());

        alarm.refresh_last_event().await.unwrap();

        assert_eq!(client.count("last_event"), 1);
        assert_eq!(alarm.changed_by(), Some("Sam"));
        assert_eq!(alarm.changed_timestamp(), Some("2026-02-07 08:15:00"));
        let attrs = alarm.attributes();
        assert_eq!(attrs.changed_by.as_deref(), Some("Sam"));
    }
}
