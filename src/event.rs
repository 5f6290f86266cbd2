// MIT License - Copyright (c) 2026 Peter Wright

use crate::state::AlarmState;

/// Notifications broadcast by the alarm entity.
///
/// Hosts subscribe via
/// [`VisonicAlarm::subscribe`](crate::panel::VisonicAlarm::subscribe) to
/// receive a `tokio::sync::broadcast::Receiver<AlarmEvent>`. Purely
/// observational; consuming or dropping events never affects the entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlarmEvent {
    /// The canonical state moved between two values.
    StateChanged { old: AlarmState, new: AlarmState },
    /// The client's connection flag flipped.
    ConnectionChanged { connected: bool },
}

/// Type alias for the broadcast sender.
pub type EventSender = tokio::sync::broadcast::Sender<AlarmEvent>;

/// Type alias for the broadcast receiver.
pub type EventReceiver = tokio::sync::broadcast::Receiver<AlarmEvent>;

/// Create a new event channel with the given capacity.
pub fn event_channel(capacity: usize) -> (EventSender, EventReceiver) {
    tokio::sync::broadcast::channel(capacity)
}
