//! Home status values that scene conditions are evaluated against.
//!
//! These are read through the `HomeStatus` port: alarm modes per house,
//! calendar events, and grid signals (Ecowatt, EDF Tempo).

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Alarm mode of a house.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlarmMode {
    Armed,
    Disarmed,
    PartiallyArmed,
    Panic,
}

impl std::fmt::Display for AlarmMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Armed => f.write_str("armed"),
            Self::Disarmed => f.write_str("disarmed"),
            Self::PartiallyArmed => f.write_str("partially-armed"),
            Self::Panic => f.write_str("panic"),
        }
    }
}

/// Ecowatt grid signal (French electricity network stress level).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EcowattStatus {
    Ok,
    Warning,
    Critical,
}

/// Which day an EDF Tempo condition looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TempoDay {
    Today,
    Tomorrow,
}

/// EDF Tempo day color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TempoColor {
    Blue,
    White,
    Red,
}

/// EDF Tempo status for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempoStatus {
    /// `None` when the color is not published yet (tomorrow before noon).
    pub color: Option<TempoColor>,
    /// Whether the current time falls in a peak-hour period.
    pub peak_hour: bool,
}

/// A calendar event currently running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub calendar: String,
    pub name: String,
    pub start: Timestamp,
    pub end: Timestamp,
}
