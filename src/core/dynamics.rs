//! Dynamics Engine: decay, excitation, hysteresis, replay and seal
//!
//! Regime transitions (at most one per tick):
//! - CALM → RISING: arousal > rising_enter
//! - RISING → ALARM_LATCH: arousal ≥ alarm_enter
//! - RISING → CALM: arousal < rising_exit (REPAIR if an episode is open)
//! - ALARM_LATCH → CONTAINMENT: low-salience run ≥ alarm_grace
//! - CONTAINMENT → REPAIR: arousal < quiet_arousal and
//!   (containment ≥ repair_enter or low-salience run ≥ containment_grace)
//! - REPAIR → CALM / CONSOLIDATION: dwell and low-salience run ≥ repair_grace
//! - CONSOLIDATION → CALM: replay pressure drained
//! - CONTAINMENT / REPAIR / CONSOLIDATION → ALARM_LATCH: arousal ≥ alarm_enter

use tracing::{debug, trace};

use crate::types::{EventFlags, ModelConfig, ModelState, ReasonCode, Regime, SalienceVector};

/// Pure state-advancing engine
#[derive(Debug, Clone, Default)]
pub struct DynamicsEngine {
    config: ModelConfig,
}

impl DynamicsEngine {
    /// Create an engine; the config is expected to be validated already
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Produce the next state and this tick's event flags. Does not touch
    /// the tick counter.
    pub fn advance(&self, state: &ModelState, s: &SalienceVector) -> (ModelState, EventFlags) {
        let cfg = &self.config;
        let mut next = state.clone();

        // 1. Decay toward rest
        next.arousal *= cfg.arousal_decay;
        next.containment *= cfg.containment_decay;
        next.replay_pressure *= cfg.replay_decay;

        // 2. Excitation / inhibition
        next.arousal += cfg.threat_weight * s.threat + cfg.ambiguity_weight * s.ambiguity
            - cfg.inhibition_weight * next.containment;
        next.arousal = clamp_unit(next.arousal);

        next.containment += cfg.social_weight * s.social + cfg.repair_weight * s.repair;
        if state.regime == Regime::AlarmLatch {
            next.containment += cfg.recruitment_weight * next.arousal;
        }

        // 3. Clamp
        next.containment = clamp_unit(next.containment);
        next.replay_pressure = clamp_unit(next.replay_pressure);

        // 4. Hysteresis
        if s.combined() < cfg.low_salience_epsilon {
            next.low_salience_run = next.low_salience_run.saturating_add(1);
        } else {
            next.low_salience_run = 0;
        }

        let (regime, reason) = self.compute_transition(&next);
        let alarm_entered = regime == Regime::AlarmLatch && state.regime != Regime::AlarmLatch;
        if regime != state.regime {
            debug!(
                from = %state.regime,
                to = %regime,
                reason = reason.code(),
                arousal = next.arousal,
                containment = next.containment,
                "regime transition"
            );
            next.dwell = 0;
        } else {
            next.dwell = next.dwell.saturating_add(1);
        }
        next.regime = regime;
        next.reason = reason;
        if alarm_entered {
            next.episode_open = true;
        }

        // 5. Replay / seal
        let replay_fired = if regime.is_latched() {
            next.replay_pressure = clamp_unit(
                next.replay_pressure
                    + cfg.replay_latch_gain
                    + cfg.replay_arousal_gain * next.arousal,
            );
            false
        } else {
            next.replay_pressure = (next.replay_pressure - cfg.replay_drain).max(0.0);
            crossed_quantum_downward(state.replay_pressure, next.replay_pressure, cfg.replay_quantum)
        };

        let seal_fired = next.episode_open
            && regime != state.regime
            && matches!(regime, Regime::Calm | Regime::Repair)
            && next.replay_pressure <= cfg.replay_drained;
        if seal_fired {
            next.seal_count += 1;
            next.episode_open = false;
            debug!(seal_count = next.seal_count, regime = %regime, "episode sealed");
        }
        if replay_fired {
            debug!(replay_pressure = next.replay_pressure, "replay discharged");
        }

        // An unsealed episode stays marked even if it slips back into RISING
        let containment_active = next.episode_open
            || matches!(
                regime,
                Regime::AlarmLatch | Regime::Containment | Regime::Repair
            )
            || next.containment >= cfg.containment_active_level;

        let flags = EventFlags {
            alarm_entered,
            containment_active,
            replay_fired,
            seal_fired,
        };

        trace!(
            regime = %next.regime,
            arousal = next.arousal,
            containment = next.containment,
            replay_pressure = next.replay_pressure,
            run = next.low_salience_run,
            "advanced"
        );

        (next, flags)
    }

    /// Decide the regime after this tick's continuous update
    fn compute_transition(&self, next: &ModelState) -> (Regime, ReasonCode) {
        let cfg = &self.config;
        let a = next.arousal;
        let run = next.low_salience_run;

        match next.regime {
            Regime::Calm => {
                if a > cfg.rising_enter {
                    (Regime::Rising, ReasonCode::R200_AROUSAL_RISING)
                } else {
                    (Regime::Calm, ReasonCode::R100_HELD)
                }
            }

            Regime::Rising => {
                if a >= cfg.alarm_enter {
                    (Regime::AlarmLatch, ReasonCode::R201_ALARM_LATCHED)
                } else if a < cfg.rising_exit {
                    if next.episode_open {
                        // Still inside an unsealed episode; finish it through REPAIR
                        (Regime::Repair, ReasonCode::R305_SUBSIDED)
                    } else {
                        (Regime::Calm, ReasonCode::R305_SUBSIDED)
                    }
                } else {
                    (Regime::Rising, ReasonCode::R100_HELD)
                }
            }

            Regime::AlarmLatch => {
                if run >= cfg.alarm_grace {
                    (Regime::Containment, ReasonCode::R300_LATCH_RELEASED)
                } else {
                    (Regime::AlarmLatch, ReasonCode::R101_LATCH_HELD)
                }
            }

            Regime::Containment => {
                if a >= cfg.alarm_enter {
                    (Regime::AlarmLatch, ReasonCode::R202_RELAPSE)
                } else if a < cfg.quiet_arousal && next.containment >= cfg.repair_enter {
                    (Regime::Repair, ReasonCode::R301_CONTAINED)
                } else if a < cfg.quiet_arousal && run >= cfg.containment_grace {
                    (Regime::Repair, ReasonCode::R302_CONTAINMENT_SPENT)
                } else {
                    (Regime::Containment, ReasonCode::R100_HELD)
                }
            }

            Regime::Repair => {
                if a >= cfg.alarm_enter {
                    (Regime::AlarmLatch, ReasonCode::R202_RELAPSE)
                } else if a > cfg.rising_enter {
                    (Regime::Rising, ReasonCode::R200_AROUSAL_RISING)
                } else if next.dwell + 1 >= cfg.repair_grace && run >= cfg.repair_grace {
                    if next.replay_pressure > cfg.replay_drained {
                        (Regime::Consolidation, ReasonCode::R303_CONSOLIDATING)
                    } else {
                        (Regime::Calm, ReasonCode::R304_SETTLED)
                    }
                } else {
                    (Regime::Repair, ReasonCode::R102_GRACE_ACCUMULATING)
                }
            }

            Regime::Consolidation => {
                if a >= cfg.alarm_enter {
                    (Regime::AlarmLatch, ReasonCode::R202_RELAPSE)
                } else if a > cfg.rising_enter {
                    (Regime::Rising, ReasonCode::R200_AROUSAL_RISING)
                } else if next.replay_pressure <= cfg.replay_drained {
                    (Regime::Calm, ReasonCode::R304_SETTLED)
                } else {
                    (Regime::Consolidation, ReasonCode::R103_DRAINING)
                }
            }
        }
    }
}

fn clamp_unit(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

/// True when draining from `prev` to `next` passes a positive multiple of `quantum`
fn crossed_quantum_downward(prev: f64, next: f64, quantum: f64) -> bool {
    prev > 0.0 && next < prev && (prev / quantum).floor() > (next / quantum).floor()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn threat() -> SalienceVector {
        SalienceVector {
            threat: 1.0,
            ..SalienceVector::zero()
        }
    }

    fn run(engine: &DynamicsEngine, state: ModelState, s: SalienceVector, n: usize) -> ModelState {
        (0..n).fold(state, |st, _| engine.advance(&st, &s).0)
    }

    #[test]
    fn test_rest_stays_at_rest() {
        let engine = DynamicsEngine::default();
        let (next, flags) = engine.advance(&ModelState::at_rest(), &SalienceVector::zero());
        assert_eq!(next.regime, Regime::Calm);
        assert_eq!(next.arousal, 0.0);
        assert!(!flags.any());
    }

    #[test]
    fn test_calm_to_rising_to_alarm() {
        let engine = DynamicsEngine::default();
        let (s1, f1) = engine.advance(&ModelState::at_rest(), &threat());
        assert_eq!(s1.regime, Regime::Rising);
        assert!(!f1.alarm_entered);

        let (s2, f2) = engine.advance(&s1, &threat());
        assert_eq!(s2.regime, Regime::AlarmLatch);
        assert!(f2.alarm_entered);
        assert!(f2.containment_active);
        assert!(s2.episode_open);
    }

    #[test]
    fn test_alarm_entered_only_once_while_latched() {
        let engine = DynamicsEngine::default();
        let s = run(&engine, ModelState::at_rest(), threat(), 2);
        let (_, flags) = engine.advance(&s, &threat());
        assert!(!flags.alarm_entered);
    }

    #[test]
    fn test_latch_needs_full_grace_run() {
        let engine = DynamicsEngine::default();
        let grace = engine.config().alarm_grace as usize;
        let latched = run(&engine, ModelState::at_rest(), threat(), 6);

        let held = run(&engine, latched.clone(), SalienceVector::zero(), grace - 1);
        assert_eq!(held.regime, Regime::AlarmLatch);
        assert_eq!(held.reason, ReasonCode::R101_LATCH_HELD);

        let released = run(&engine, latched, SalienceVector::zero(), grace);
        assert_eq!(released.regime, Regime::Containment);
    }

    #[test]
    fn test_rising_subsides_without_alarm() {
        let engine = DynamicsEngine::default();
        let s = run(&engine, ModelState::at_rest(), threat(), 1);
        assert_eq!(s.regime, Regime::Rising);
        let s = run(&engine, s, SalienceVector::zero(), 10);
        assert_eq!(s.regime, Regime::Calm);
        assert_eq!(s.seal_count, 0);
    }

    #[test]
    fn test_replay_pressure_accumulates_only_when_latched() {
        let engine = DynamicsEngine::default();
        let rising = run(&engine, ModelState::at_rest(), threat(), 1);
        assert_eq!(rising.replay_pressure, 0.0);
        let latched = run(&engine, rising, threat(), 3);
        assert!(latched.replay_pressure > 0.2);
    }

    #[test]
    fn test_episode_seals_once_after_silence() {
        let engine = DynamicsEngine::default();
        let mut s = run(&engine, ModelState::at_rest(), threat(), 6);
        let mut seals = 0;
        let mut replays = 0;
        for _ in 0..200 {
            let (next, flags) = engine.advance(&s, &SalienceVector::zero());
            seals += flags.seal_fired as u32;
            replays += flags.replay_fired as u32;
            s = next;
        }
        assert_eq!(seals, 1);
        assert_eq!(s.seal_count, 1);
        assert!(replays >= 1);
        assert_eq!(s.regime, Regime::Calm);
        assert!(!s.episode_open);
        assert_eq!(s.replay_pressure, 0.0);
    }

    #[test]
    fn test_relapse_into_rising_keeps_episode_marked() {
        let engine = DynamicsEngine::default();
        let mut s = run(&engine, ModelState::at_rest(), threat(), 6);
        for _ in 0..50 {
            if s.regime == Regime::Repair {
                break;
            }
            s = engine.advance(&s, &SalienceVector::zero()).0;
        }
        assert_eq!(s.regime, Regime::Repair);
        assert!(s.episode_open);

        let (rising, flags) = engine.advance(&s, &threat());
        assert_eq!(rising.regime, Regime::Rising);
        assert!(rising.episode_open);
        assert!(flags.containment_active);
    }

    #[test]
    fn test_quantum_crossing() {
        assert!(crossed_quantum_downward(0.41, 0.39, 0.2));
        assert!(!crossed_quantum_downward(0.39, 0.21, 0.2));
        assert!(!crossed_quantum_downward(0.0, 0.0, 0.2));
        assert!(!crossed_quantum_downward(0.19, 0.0, 0.2));
    }
}
