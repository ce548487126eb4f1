//! Model state and per-tick event flags

use serde::Serialize;

use crate::error::{Error, Result};
use crate::types::{ReasonCode, Regime};

/// The single long-lived value threaded through every tick
///
/// Only [`crate::Model::boot`] and [`crate::Model::tick`] produce states, so
/// fields are readable but not writable outside the crate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelState {
    pub(crate) arousal: f64,
    pub(crate) containment: f64,
    pub(crate) replay_pressure: f64,
    pub(crate) seal_count: u32,
    pub(crate) regime: Regime,
    pub(crate) low_salience_run: u32,
    /// Ticks spent in the current regime
    pub(crate) dwell: u32,
    /// An alarm was latched and its episode has not been sealed yet
    pub(crate) episode_open: bool,
    pub(crate) tick: u64,
    pub(crate) reason: ReasonCode,
}

impl ModelState {
    /// All fields at rest
    pub(crate) fn at_rest() -> Self {
        Self {
            arousal: 0.0,
            containment: 0.0,
            replay_pressure: 0.0,
            seal_count: 0,
            regime: Regime::Calm,
            low_salience_run: 0,
            dwell: 0,
            episode_open: false,
            tick: 0,
            reason: ReasonCode::R100_BOOT,
        }
    }

    pub fn arousal(&self) -> f64 {
        self.arousal
    }

    pub fn containment(&self) -> f64 {
        self.containment
    }

    pub fn replay_pressure(&self) -> f64 {
        self.replay_pressure
    }

    pub fn seal_count(&self) -> u32 {
        self.seal_count
    }

    pub fn regime(&self) -> Regime {
        self.regime
    }

    pub fn low_salience_run(&self) -> u32 {
        self.low_salience_run
    }

    pub fn dwell(&self) -> u32 {
        self.dwell
    }

    pub fn episode_open(&self) -> bool {
        self.episode_open
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn reason(&self) -> ReasonCode {
        self.reason
    }

    /// Verify the invariants every Boot/Tick state satisfies
    pub fn check(&self) -> Result<()> {
        let bounded = [
            ("arousal", self.arousal),
            ("containment", self.containment),
            ("replay_pressure", self.replay_pressure),
        ];
        for (name, v) in bounded {
            if !(0.0..=1.0).contains(&v) {
                return Err(Error::foreign_state(format!("{name}={v} outside [0, 1]")));
            }
        }
        if self.episode_open && self.regime == Regime::Calm {
            return Err(Error::foreign_state(format!(
                "open episode in regime {}",
                self.regime
            )));
        }
        Ok(())
    }
}

/// Events raised by one dynamics step, consumed by the emitter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EventFlags {
    pub alarm_entered: bool,
    pub containment_active: bool,
    pub replay_fired: bool,
    pub seal_fired: bool,
}

impl EventFlags {
    pub fn any(&self) -> bool {
        self.alarm_entered || self.containment_active || self.replay_fired || self.seal_fired
    }
}
