// MIT License - Copyright (c) 2026 Peter Wright
//
//! # visonic-alarm-bridge
//!
//! Exposes a Visonic alarm control panel to smart-home hosts: a status
//! normalizer mapping the panel's heterogeneous vendor status strings
//! onto a small set of canonical alarm states, and a command gateway for
//! disarm / arm-home / arm-away gated by a user code and the panel's
//! readiness flag.
//!
//! The connection, session handling and command transport live in an
//! external client supplied through the [`AlarmClient`] trait; this
//! crate consumes snapshots and issues commands, nothing more. With the
//! `mqtt` feature (default) the [`bridge`] module publishes the entity
//! over MQTT and consumes commands from a topic.
//!
//! ## Quick Start
//!
//! ```no_run
//! use visonic_alarm_bridge::{
//!     AlarmClient, AlarmConfig, LastEvent, LogNotifier, PanelSnapshot, Result, VisonicAlarm,
//! };
//!
//! struct MyClient; // wraps the vendor REST/cloud session
//!
//! impl AlarmClient for MyClient {
//!     async fn refresh(&self) -> Result<PanelSnapshot> { todo!() }
//!     async fn disarm(&self) -> Result<()> { todo!() }
//!     async fn arm_home(&self) -> Result<()> { todo!() }
//!     async fn arm_away(&self) -> Result<()> { todo!() }
//!     async fn last_event(&self, _hour_offset: i32) -> Result<LastEvent> { todo!() }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AlarmConfig::builder().user_code("1234").build();
//!     let mut alarm = VisonicAlarm::new(MyClient, LogNotifier, config);
//!
//!     alarm.update().await?;
//!     println!("{} is {}", alarm.name(), alarm.state());
//!
//!     alarm.alarm_arm_away(Some("1234")).await?;
//!     Ok(())
//! }
//! ```

#[cfg(feature = "mqtt")]
pub mod bridge;
pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod notify;
pub mod panel;
pub mod state;

// Re-exports for convenience
pub use client::{AlarmClient, LastEvent, PanelSnapshot};
pub use config::{AlarmConfig, AlarmConfigBuilder};
pub use error::{BridgeError, Result};
pub use event::{AlarmEvent, EventReceiver, EventSender};
pub use notify::{LogNotifier, Notice, Notifier};
pub use panel::{StateAttributes, VisonicAlarm};
pub use state::AlarmState;
