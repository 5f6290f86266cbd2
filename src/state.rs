// MIT License - Copyright (c) 2026 Peter Wright

use std::fmt;

use serde::Serialize;

/// Canonical alarm states understood by smart-home hosts.
///
/// Serializes to the snake_case wire strings hosts expect
/// (`"disarmed"`, `"armed_home"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmState {
    Disarmed,
    ArmedHome,
    ArmedAway,
    /// Exit delay running; the panel is on its way to armed.
    Arming,
    /// Entry delay running; disarm now or the siren goes off.
    Pending,
    Triggered,
    /// No status from the panel, or a status outside the synonym table.
    Unknown,
}

/// Vendor status synonyms, grouped by canonical state.
///
/// Different panel firmwares report the same arm state under different
/// names; the table collects every variant observed in the field. Lookup
/// is over the trimmed, upper-cased status string.
const STATE_SYNONYMS: &[(&str, AlarmState)] = &[
    ("AWAY", AlarmState::ArmedAway),
    ("ARMED_AWAY", AlarmState::ArmedAway),
    ("ARM", AlarmState::ArmedAway),
    ("ARM_AWAY", AlarmState::ArmedAway),
    ("HOME", AlarmState::ArmedHome),
    ("STAY", AlarmState::ArmedHome),
    ("ARMED_HOME", AlarmState::ArmedHome),
    ("ARM_HOME", AlarmState::ArmedHome),
    ("DISARM", AlarmState::Disarmed),
    ("DISARMED", AlarmState::Disarmed),
    ("READY", AlarmState::Disarmed),
    ("IDLE", AlarmState::Disarmed),
    ("ARMING", AlarmState::Arming),
    ("EXITDELAY", AlarmState::Arming),
    ("ENTRYDELAY", AlarmState::Pending),
    ("PENDING", AlarmState::Pending),
    ("ALARM", AlarmState::Triggered),
    ("TRIGGERED", AlarmState::Triggered),
];

impl AlarmState {
    /// Normalize a raw panel status string.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// `None` and strings outside the table both come back as
    /// [`AlarmState::Unknown`]; unknown vendor strings are expected and
    /// must degrade gracefully, never fail.
    pub fn from_raw(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Unknown;
        };
        let status = raw.trim().to_ascii_uppercase();
        STATE_SYNONYMS
            .iter()
            .find(|(synonym, _)| *synonym == status)
            .map_or(Self::Unknown, |&(_, state)| state)
    }

    /// The wire string representation (`"disarmed"`, `"armed_home"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disarmed => "disarmed",
            Self::ArmedHome => "armed_home",
            Self::ArmedAway => "armed_away",
            Self::Arming => "arming",
            Self::Pending => "pending",
            Self::Triggered => "triggered",
            Self::Unknown => "unknown",
        }
    }

    /// Icon shown by the host for this state.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::ArmedAway => "mdi:shield-lock",
            Self::ArmedHome => "mdi:shield-home",
            Self::Disarmed => "mdi:shield-check",
            Self::Arming => "mdi:shield-outline",
            _ => "hass:bell-ring",
        }
    }

    /// True for the settled armed/disarmed states. Transitions into one
    /// of these carry a user-attributable change record on the panel log.
    pub fn is_armed_or_disarmed(&self) -> bool {
        matches!(self, Self::Disarmed | Self::ArmedHome | Self::ArmedAway)
    }
}

impl fmt::Display for AlarmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
