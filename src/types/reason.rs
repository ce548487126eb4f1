//! Reason codes for regime decisions

use serde::Serialize;

/// Why the engine left the regime where it is after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(non_camel_case_types)]
pub enum ReasonCode {
    // =========================================================================
    // R100: Holding
    // =========================================================================
    /// Nothing happened yet
    R100_BOOT,
    /// Regime unchanged
    R100_HELD,
    /// Alarm latched; waiting for a low-salience run
    R101_LATCH_HELD,
    /// REPAIR waiting out its calm grace period
    R102_GRACE_ACCUMULATING,
    /// CONSOLIDATION waiting for replay pressure to drain
    R103_DRAINING,

    // =========================================================================
    // R200: Escalation
    // =========================================================================
    /// arousal crossed the rising threshold
    R200_AROUSAL_RISING,
    /// arousal crossed the alarm threshold
    R201_ALARM_LATCHED,
    /// Alarm re-entered from inside an open episode
    R202_RELAPSE,

    // =========================================================================
    // R300: Release
    // =========================================================================
    /// Low-salience run reached the alarm grace period
    R300_LATCH_RELEASED,
    /// Containment charge carried arousal down
    R301_CONTAINED,
    /// Containment grace period ran out with a spent charge
    R302_CONTAINMENT_SPENT,
    /// REPAIR resolved with replay pressure still elevated
    R303_CONSOLIDATING,
    /// Returned to baseline
    R304_SETTLED,
    /// RISING fell back below the exit threshold
    R305_SUBSIDED,
}

impl ReasonCode {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::R100_BOOT => "R100_BOOT",
            Self::R100_HELD => "R100_HELD",
            Self::R101_LATCH_HELD => "R101_LATCH_HELD",
            Self::R102_GRACE_ACCUMULATING => "R102_GRACE_ACCUMULATING",
            Self::R103_DRAINING => "R103_DRAINING",
            Self::R200_AROUSAL_RISING => "R200_AROUSAL_RISING",
            Self::R201_ALARM_LATCHED => "R201_ALARM_LATCHED",
            Self::R202_RELAPSE => "R202_RELAPSE",
            Self::R300_LATCH_RELEASED => "R300_LATCH_RELEASED",
            Self::R301_CONTAINED => "R301_CONTAINED",
            Self::R302_CONTAINMENT_SPENT => "R302_CONTAINMENT_SPENT",
            Self::R303_CONSOLIDATING => "R303_CONSOLIDATING",
            Self::R304_SETTLED => "R304_SETTLED",
            Self::R305_SUBSIDED => "R305_SUBSIDED",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::R100_BOOT => "At rest",
            Self::R100_HELD => "Regime unchanged",
            Self::R101_LATCH_HELD => "Alarm latch held",
            Self::R102_GRACE_ACCUMULATING => "Building calm grace",
            Self::R103_DRAINING => "Draining replay pressure",
            Self::R200_AROUSAL_RISING => "Arousal rising",
            Self::R201_ALARM_LATCHED => "Alarm latched",
            Self::R202_RELAPSE => "Alarm relapse",
            Self::R300_LATCH_RELEASED => "Latch released into containment",
            Self::R301_CONTAINED => "Arousal contained, repairing",
            Self::R302_CONTAINMENT_SPENT => "Containment spent, repairing",
            Self::R303_CONSOLIDATING => "Consolidating leftover pressure",
            Self::R304_SETTLED => "Settled to baseline",
            Self::R305_SUBSIDED => "Arousal subsided",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
