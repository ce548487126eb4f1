//! Tunable model constants

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::{
    ALARM_ENTER, ALARM_GRACE, AMBIGUITY_WEIGHT, AROUSAL_DECAY, CONTAINMENT_ACTIVE_LEVEL,
    CONTAINMENT_DECAY, CONTAINMENT_GRACE, INHIBITION_WEIGHT, LOW_SALIENCE_EPSILON, QUIET_AROUSAL,
    RECRUITMENT_WEIGHT, REPAIR_ENTER, REPAIR_GRACE, REPAIR_WEIGHT, REPLAY_AROUSAL_GAIN,
    REPLAY_DECAY, REPLAY_DRAIN, REPLAY_DRAINED, REPLAY_LATCH_GAIN,
    REPLAY_QUANTUM, RISING_ENTER, RISING_EXIT, SOCIAL_WEIGHT, THREAT_WEIGHT,
};

/// Longest grace period a config may ask for, in ticks
pub const MAX_GRACE: u32 = 1_000;

/// Every decay rate, weight, threshold and grace period of the model
///
/// Missing fields in a JSON override fall back to the crate defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub arousal_decay: f64,
    pub containment_decay: f64,
    pub replay_decay: f64,

    pub threat_weight: f64,
    pub ambiguity_weight: f64,
    pub social_weight: f64,
    pub repair_weight: f64,
    pub inhibition_weight: f64,
    pub recruitment_weight: f64,

    pub rising_enter: f64,
    pub rising_exit: f64,
    pub alarm_enter: f64,
    pub repair_enter: f64,
    pub quiet_arousal: f64,

    pub alarm_grace: u32,
    pub containment_grace: u32,
    pub repair_grace: u32,

    pub low_salience_epsilon: f64,
    pub containment_active_level: f64,

    pub replay_latch_gain: f64,
    pub replay_arousal_gain: f64,
    pub replay_drain: f64,
    pub replay_quantum: f64,
    pub replay_drained: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            arousal_decay: AROUSAL_DECAY,
            containment_decay: CONTAINMENT_DECAY,
            replay_decay: REPLAY_DECAY,
            threat_weight: THREAT_WEIGHT,
            ambiguity_weight: AMBIGUITY_WEIGHT,
            social_weight: SOCIAL_WEIGHT,
            repair_weight: REPAIR_WEIGHT,
            inhibition_weight: INHIBITION_WEIGHT,
            recruitment_weight: RECRUITMENT_WEIGHT,
            rising_enter: RISING_ENTER,
            rising_exit: RISING_EXIT,
            alarm_enter: ALARM_ENTER,
            repair_enter: REPAIR_ENTER,
            quiet_arousal: QUIET_AROUSAL,
            alarm_grace: ALARM_GRACE,
            containment_grace: CONTAINMENT_GRACE,
            repair_grace: REPAIR_GRACE,
            low_salience_epsilon: LOW_SALIENCE_EPSILON,
            containment_active_level: CONTAINMENT_ACTIVE_LEVEL,
            replay_latch_gain: REPLAY_LATCH_GAIN,
            replay_arousal_gain: REPLAY_AROUSAL_GAIN,
            replay_drain: REPLAY_DRAIN,
            replay_quantum: REPLAY_QUANTUM,
            replay_drained: REPLAY_DRAINED,
        }
    }
}

impl ModelConfig {
    /// Load overrides from a JSON file and validate them
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the constants describe a convergent, hysteretic model
    pub fn validate(&self) -> Result<()> {
        let decays = [
            ("arousal_decay", self.arousal_decay),
            ("containment_decay", self.containment_decay),
            ("replay_decay", self.replay_decay),
        ];
        for (name, d) in decays {
            if !(d > 0.0 && d < 1.0) {
                return Err(Error::invalid_config(format!("{name} must be in (0, 1), got {d}")));
            }
        }

        let weights = [
            ("threat_weight", self.threat_weight),
            ("ambiguity_weight", self.ambiguity_weight),
            ("social_weight", self.social_weight),
            ("repair_weight", self.repair_weight),
            ("inhibition_weight", self.inhibition_weight),
            ("recruitment_weight", self.recruitment_weight),
            ("replay_latch_gain", self.replay_latch_gain),
            ("replay_arousal_gain", self.replay_arousal_gain),
        ];
        for (name, w) in weights {
            if !(w.is_finite() && w >= 0.0) {
                return Err(Error::invalid_config(format!("{name} must be finite and >= 0, got {w}")));
            }
        }

        let thresholds = [
            ("rising_enter", self.rising_enter),
            ("rising_exit", self.rising_exit),
            ("alarm_enter", self.alarm_enter),
            ("repair_enter", self.repair_enter),
            ("quiet_arousal", self.quiet_arousal),
            ("low_salience_epsilon", self.low_salience_epsilon),
            ("containment_active_level", self.containment_active_level),
            ("replay_drain", self.replay_drain),
            ("replay_quantum", self.replay_quantum),
            ("replay_drained", self.replay_drained),
        ];
        for (name, t) in thresholds {
            if !(0.0..=1.0).contains(&t) {
                return Err(Error::invalid_config(format!("{name} must be in [0, 1], got {t}")));
            }
        }

        if !(self.rising_exit > 0.0
            && self.rising_exit < self.rising_enter
            && self.rising_enter < self.alarm_enter)
        {
            return Err(Error::invalid_config(format!(
                "thresholds must satisfy 0 < rising_exit < rising_enter < alarm_enter, got {} / {} / {}",
                self.rising_exit, self.rising_enter, self.alarm_enter
            )));
        }
        // CONTAINMENT only exits below quiet_arousal
        if !(self.quiet_arousal > 0.0 && self.quiet_arousal < self.alarm_enter) {
            return Err(Error::invalid_config("quiet_arousal must be in (0, alarm_enter)"));
        }
        let graces = [
            ("alarm_grace", self.alarm_grace),
            ("containment_grace", self.containment_grace),
            ("repair_grace", self.repair_grace),
        ];
        for (name, g) in graces {
            if !(1..=MAX_GRACE).contains(&g) {
                return Err(Error::invalid_config(format!(
                    "{name} must be between 1 and {MAX_GRACE} ticks, got {g}"
                )));
            }
        }
        if !(self.replay_drain > 0.0 && self.replay_quantum > 0.0) {
            return Err(Error::invalid_config("replay_drain and replay_quantum must be positive"));
        }
        if self.replay_drained >= self.replay_quantum {
            return Err(Error::invalid_config("replay_drained must be below replay_quantum"));
        }
        if self.low_salience_epsilon == 0.0 {
            return Err(Error::invalid_config("low_salience_epsilon must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ModelConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_inverted_hysteresis() {
        let config = ModelConfig {
            rising_exit: 0.4,
            ..ModelConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_non_decaying_field() {
        let config = ModelConfig {
            replay_decay: 1.0,
            ..ModelConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_grace() {
        let config = ModelConfig {
            alarm_grace: 0,
            ..ModelConfig::default()
        };
        assert!(config.validate().is_err());
    }

    fn rejects(json: &str) -> bool {
        let config: ModelConfig = serde_json::from_str(json).unwrap();
        matches!(config.validate(), Err(Error::InvalidConfig(_)))
    }

    #[test]
    fn test_rejects_unreachable_quiet_arousal() {
        assert!(rejects(r#"{"quiet_arousal": 0.0}"#));
        assert!(rejects(r#"{"quiet_arousal": -0.2}"#));
    }

    #[test]
    fn test_rejects_negative_replay_drained() {
        assert!(rejects(r#"{"replay_drained": -0.1}"#));
    }

    #[test]
    fn test_rejects_out_of_range_repair_enter() {
        assert!(rejects(r#"{"repair_enter": 2.0}"#));
        assert!(rejects(r#"{"repair_enter": 2.0, "containment_grace": 4000000000}"#));
    }

    #[test]
    fn test_rejects_unbounded_grace() {
        assert!(rejects(r#"{"containment_grace": 4000000000}"#));
        assert!(!rejects(r#"{"containment_grace": 1000}"#));
    }

    #[test]
    fn test_rejects_zero_rising_exit() {
        assert!(rejects(r#"{"rising_exit": 0.0}"#));
    }

    #[test]
    fn test_rejects_nan_thresholds() {
        for field in [
            "quiet_arousal",
            "replay_drained",
            "repair_enter",
            "low_salience_epsilon",
            "containment_active_level",
        ] {
            let config = {
                let mut c = ModelConfig::default();
                match field {
                    "quiet_arousal" => c.quiet_arousal = f64::NAN,
                    "replay_drained" => c.replay_drained = f64::NAN,
                    "repair_enter" => c.repair_enter = f64::NAN,
                    "low_salience_epsilon" => c.low_salience_epsilon = f64::NAN,
                    _ => c.containment_active_level = f64::NAN,
                }
                c
            };
            assert!(config.validate().is_err(), "{} = NaN accepted", field);
        }
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: ModelConfig = serde_json::from_str(r#"{"alarm_grace": 7}"#).unwrap();
        assert_eq!(config.alarm_grace, 7);
        assert_eq!(config.arousal_decay, AROUSAL_DECAY);
    }
}
