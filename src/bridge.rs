// MIT License - Copyright (c) 2026 Peter Wright

//! MQTT host glue.
//!
//! Publishes the entity's canonical state and display attributes on
//! retained topics for smart-home hosts, consumes arm/disarm commands
//! from a command topic, and delivers notices on a notice topic. One
//! cooperative loop drives the poll ticker, the broker event loop and
//! the entity's event channel, so the entity is only ever touched from
//! a single task.

use chrono::Utc;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use serde::{Deserialize, Serialize};
use tokio::time::{Duration, interval};
use tracing::{debug, error, info, warn};

use crate::client::AlarmClient;
use crate::config::AlarmConfig;
use crate::error::{BridgeError, Result};
use crate::event::AlarmEvent;
use crate::notify::{Notice, Notifier};
use crate::panel::VisonicAlarm;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// MQTT-side configuration.
///
/// Deserializable so hosts can embed it in their own config files; every
/// field has a default.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Broker URL in `mqtt://host:port` form.
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_client_id")]
    pub client_id: String,
    /// Retained canonical state string.
    #[serde(default = "default_state_topic")]
    pub state_topic: String,
    /// Retained JSON attribute record.
    #[serde(default = "default_attributes_topic")]
    pub attributes_topic: String,
    /// Inbound command topic.
    #[serde(default = "default_command_topic")]
    pub command_topic: String,
    /// User-facing notices.
    #[serde(default = "default_notice_topic")]
    pub notice_topic: String,
}

fn default_url() -> String {
    "mqtt://localhost:1883".to_string()
}
fn default_client_id() -> String {
    "visonic-bridge".to_string()
}
fn default_state_topic() -> String {
    "visonic/alarm/state".to_string()
}
fn default_attributes_topic() -> String {
    "visonic/alarm/attributes".to_string()
}
fn default_command_topic() -> String {
    "visonic/alarm/set".to_string()
}
fn default_notice_topic() -> String {
    "visonic/alarm/notice".to_string()
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            client_id: default_client_id(),
            state_topic: default_state_topic(),
            attributes_topic: default_attributes_topic(),
            command_topic: default_command_topic(),
            notice_topic: default_notice_topic(),
        }
    }
}

/// Parse an MQTT URL like "mqtt://host:port" into (host, port).
pub fn parse_mqtt_url(url: &str) -> Result<(String, u16)> {
    let stripped = url
        .strip_prefix("mqtt://")
        .or_else(|| url.strip_prefix("tcp://"))
        .unwrap_or(url);

    let (host, port_str) = stripped
        .rsplit_once(':')
        .ok_or_else(|| BridgeError::InvalidMqttUrl {
            details: "expected mqtt://host:port".to_string(),
        })?;

    let port: u16 = port_str.parse().map_err(|_| BridgeError::InvalidMqttUrl {
        details: format!("invalid port: {port_str}"),
    })?;

    Ok((host.to_string(), port))
}

// ---------------------------------------------------------------------------
// MQTT JSON types
// ---------------------------------------------------------------------------

// Inbound command (subscribed): {op, code?}
#[derive(Debug, Deserialize)]
struct MqttCommand {
    op: String,
    #[serde(default)]
    code: Option<String>,
}

// Published notice: {now, title, message}
#[derive(Serialize)]
struct MqttNotice {
    now: u64,
    title: String,
    message: String,
}

fn now_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

async fn publish_json(client: &AsyncClient, topic: &str, payload: &impl Serialize, retain: bool) {
    match serde_json::to_string(payload) {
        Ok(json) => {
            if let Err(e) = client.publish(topic, QoS::AtLeastOnce, retain, json).await {
                error!("Failed to publish to {topic}: {e}");
            }
        }
        Err(e) => error!("Failed to serialize MQTT payload: {e}"),
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// Delivers notices to the notice topic, the popup analog for MQTT
/// hosts.
#[derive(Clone)]
pub struct MqttNotifier {
    client: AsyncClient,
    topic: String,
}

impl MqttNotifier {
    pub fn new(client: AsyncClient, topic: impl Into<String>) -> Self {
        Self {
            client,
            topic: topic.into(),
        }
    }
}

impl Notifier for MqttNotifier {
    async fn notify(&self, notice: Notice) {
        let msg = MqttNotice {
            now: now_epoch_ms(),
            title: notice.title,
            message: notice.message,
        };
        publish_json(&self.client, &self.topic, &msg, false).await;
    }
}

// ---------------------------------------------------------------------------
// Bridge loop
// ---------------------------------------------------------------------------

/// Publish the retained state and attribute topics.
async fn publish_panel<C: AlarmClient, N: Notifier>(
    mqtt: &AsyncClient,
    config: &BridgeConfig,
    alarm: &VisonicAlarm<C, N>,
) {
    if let Err(e) = mqtt
        .publish(&config.state_topic, QoS::AtLeastOnce, true, alarm.state().as_str())
        .await
    {
        error!("Failed to publish to {}: {e}", config.state_topic);
    }
    publish_json(mqtt, &config.attributes_topic, &alarm.attributes(), true).await;
}

async fn handle_command<C: AlarmClient, N: Notifier>(
    cmd: MqttCommand,
    mqtt: &AsyncClient,
    config: &BridgeConfig,
    alarm: &mut VisonicAlarm<C, N>,
) {
    let code = cmd.code.as_deref();
    let result = match cmd.op.as_str() {
        "DISARM" => alarm.alarm_disarm(code).await,
        "ARM_HOME" => alarm.alarm_arm_home(code).await,
        "ARM_AWAY" => alarm.alarm_arm_away(code).await,
        "REFRESH" => alarm.update().await,
        other => {
            warn!("Unknown command: {other}");
            return;
        }
    };

    match result {
        Ok(()) => publish_panel(mqtt, config, alarm).await,
        Err(e) => error!("{} failed: {e}", cmd.op),
    }
}

/// Connect to the broker and run the bridge.
///
/// Loops until the event channel closes; callers wanting a clean
/// shutdown race this future against their own signal handling.
/// Commands run inline, so their settle delay holds the loop exactly as
/// it would hold any other single-task host.
pub async fn run<C: AlarmClient>(
    client: C,
    alarm_config: AlarmConfig,
    bridge_config: BridgeConfig,
) -> Result<()> {
    let (host, port) = parse_mqtt_url(&bridge_config.url)?;
    let mut mqtt_opts = MqttOptions::new(&bridge_config.client_id, &host, port);
    mqtt_opts.set_keep_alive(Duration::from_secs(30));
    let (mqtt, mut eventloop) = AsyncClient::new(mqtt_opts, 64);

    mqtt.subscribe(&bridge_config.command_topic, QoS::AtLeastOnce)
        .await?;
    info!("MQTT: subscribed to {}", bridge_config.command_topic);

    let notifier = MqttNotifier::new(mqtt.clone(), &bridge_config.notice_topic);
    let mut alarm = VisonicAlarm::new(client, notifier, alarm_config);
    let mut events = alarm.subscribe();

    // Initial poll so the retained topics start out populated.
    if let Err(e) = alarm.update().await {
        warn!("Initial status poll failed: {e}");
    }
    publish_panel(&mqtt, &bridge_config, &alarm).await;

    let mut ticker = interval(alarm.config().scan_interval);
    // Skip the immediate first tick; we just polled.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = alarm.update().await {
                    warn!("Status poll failed: {e}");
                }
                publish_panel(&mqtt, &bridge_config, &alarm).await;
            }

            event = events.recv() => match event {
                Ok(AlarmEvent::StateChanged { old, new }) => {
                    debug!("state changed: {old} -> {new}");
                    if new.is_armed_or_disarmed() {
                        if let Err(e) = alarm.refresh_last_event().await {
                            warn!("Failed to fetch last panel event: {e}");
                        }
                        publish_panel(&mqtt, &bridge_config, &alarm).await;
                    }
                }
                Ok(AlarmEvent::ConnectionChanged { connected }) => {
                    if connected {
                        info!("Panel connected");
                    } else {
                        warn!("Panel disconnected");
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Event receiver lagged, missed {n} events");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                    info!("Event channel closed");
                    return Ok(());
                }
            },

            event = eventloop.poll() => match event {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    // (Re)subscribe after every broker connect/reconnect.
                    // rumqttc does not auto-resubscribe, so without this a
                    // broker restart silently drops our subscription and we
                    // stop receiving commands.
                    info!("MQTT: connected, subscribing to {}", bridge_config.command_topic);
                    if let Err(e) = mqtt
                        .subscribe(&bridge_config.command_topic, QoS::AtLeastOnce)
                        .await
                    {
                        error!("Failed to subscribe to {}: {e}", bridge_config.command_topic);
                    }
                }
                Ok(Event::Incoming(Packet::Publish(msg))) => {
                    if msg.topic == bridge_config.command_topic {
                        let payload = String::from_utf8_lossy(&msg.payload);
                        match serde_json::from_str::<MqttCommand>(&payload) {
                            Ok(cmd) => {
                                info!("MQTT command received: {payload}");
                                handle_command(cmd, &mqtt, &bridge_config, &mut alarm).await;
                            }
                            Err(e) => warn!("Failed to parse MQTT command: {e}"),
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    error!("MQTT event loop error: {e}");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            },
        }
    }
}
