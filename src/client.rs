// MIT License - Copyright (c) 2026 Peter Wright

//! Abstraction over the remote alarm-system client.
//!
//! The actual connection, session handling and command transport live in
//! an external client (typically a vendor REST/cloud session); the bridge
//! only consumes the capabilities below.

use crate::error::Result;

/// Point-in-time view of the panel as reported by the client.
///
/// Produced by [`AlarmClient::refresh`] and read-only to the bridge.
/// `state` carries the raw vendor status string, normalized by
/// [`AlarmState::from_raw`](crate::state::AlarmState::from_raw).
#[derive(Debug, Clone, Default)]
pub struct PanelSnapshot {
    /// Raw vendor status string, if the panel reported one.
    pub state: Option<String>,
    /// Panel-reported arming precondition (no open doors/windows).
    pub ready: bool,
    /// Whether the client currently holds a live connection to the panel.
    pub connected: bool,
    /// Session token of the client's current login.
    pub session_token: String,
    /// Panel serial number; doubles as the entity's unique id.
    pub serial_number: String,
    /// Panel model name.
    pub model: String,
    /// Active alarm conditions, if any.
    pub alarms: Vec<String>,
}

/// The most recent user-attributable change record from the panel log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastEvent {
    /// User who armed or disarmed the system.
    pub user: String,
    /// Panel-local timestamp of the change.
    pub timestamp: String,
}

/// Capabilities the bridge needs from a panel client.
///
/// Implementations own the network and session handling. Failures map to
/// [`BridgeError::Client`](crate::error::BridgeError::Client) (the
/// [`BridgeError::client`](crate::error::BridgeError::client) helper
/// wraps any displayable error) and propagate untouched.
#[allow(async_fn_in_trait)]
pub trait AlarmClient {
    /// Poll the remote system and return a fresh snapshot.
    async fn refresh(&self) -> Result<PanelSnapshot>;

    /// Disarm the panel.
    async fn disarm(&self) -> Result<()>;

    /// Arm the panel in home (stay) mode.
    async fn arm_home(&self) -> Result<()>;

    /// Arm the panel in away mode.
    async fn arm_away(&self) -> Result<()>;

    /// Fetch the most recent (user, timestamp) change record.
    ///
    /// `hour_offset` is added to the panel timestamp to correct for
    /// timezone skew between the panel clock and the host.
    async fn last_event(&self, hour_offset: i32) -> Result<LastEvent>;
}
