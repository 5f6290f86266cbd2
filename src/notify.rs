// MIT License - Copyright (c) 2026 Peter Wright

use serde::Serialize;
use tracing::warn;

/// A human-readable notice shown to the operator.
///
/// Wrong-code and not-ready command refusals surface only through these;
/// the command caller receives no structured error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Delivery channel for notices (persistent notification, popup, ...).
#[allow(async_fn_in_trait)]
pub trait Notifier {
    async fn notify(&self, notice: Notice);
}

/// Fallback notifier that writes notices to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn notify(&self, notice: Notice) {
        warn!("{}: {}", notice.title, notice.message);
    }
}
