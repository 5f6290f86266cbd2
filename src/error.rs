// MIT License - Copyright (c) 2026 Peter Wright

use std::fmt;

/// All errors that can occur in the visonic-alarm-bridge library.
///
/// Wrong codes and not-ready refusals are not errors: they surface through
/// the [`Notifier`](crate::notify::Notifier) only and the command returns
/// `Ok(())`. This type covers the ambient failures around them, chiefly
/// the panel client failing to reach the remote system.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The panel client failed to reach the remote system.
    #[error("panel client error: {message}")]
    Client { message: String },

    /// A broker URL that does not look like `mqtt://host:port`.
    #[cfg(feature = "mqtt")]
    #[error("invalid MQTT URL: {details}")]
    InvalidMqttUrl { details: String },

    #[cfg(feature = "mqtt")]
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),
}

impl BridgeError {
    /// Wrap an arbitrary client-side failure.
    pub fn client(err: impl fmt::Display) -> Self {
        Self::Client {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
