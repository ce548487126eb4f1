//! Regime definitions

use serde::Serialize;

/// The six regulatory regimes of the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Regime {
    /// Resting baseline
    Calm,
    /// Arousal above the low threshold, alarm not yet latched
    Rising,
    /// Alarm latched; held until a sustained low-salience run
    AlarmLatch,
    /// Alarm released, containment still suppressing arousal
    Containment,
    /// Arousal quiet, charge spent, waiting out the calm grace period
    Repair,
    /// Quiet period draining leftover replay pressure
    Consolidation,
}

impl Regime {
    /// Regimes in which replay pressure accumulates
    pub fn is_latched(&self) -> bool {
        matches!(self, Regime::AlarmLatch | Regime::Containment)
    }

    /// Regimes that belong to an open stress episode
    pub fn holds_episode(&self) -> bool {
        matches!(
            self,
            Regime::AlarmLatch | Regime::Containment | Regime::Repair | Regime::Consolidation
        )
    }

    /// Get ANSI color name for terminal display
    pub fn color_name(&self) -> &'static str {
        match self {
            Regime::Calm => "bright black",
            Regime::Rising => "yellow",
            Regime::AlarmLatch => "red",
            Regime::Containment => "magenta",
            Regime::Repair => "cyan",
            Regime::Consolidation => "blue",
        }
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Regime::Calm => "CALM",
            Regime::Rising => "RISING",
            Regime::AlarmLatch => "ALARM_LATCH",
            Regime::Containment => "CONTAINMENT",
            Regime::Repair => "REPAIR",
            Regime::Consolidation => "CONSOLIDATION",
        };
        write!(f, "{}", name)
    }
}
