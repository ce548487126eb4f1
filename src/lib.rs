//! Iris: tick-driven symbolic regulation model
//!
//! Each tick takes a text stimulus or silence, scores it for salience,
//! advances a latched regime machine and emits a glyph:
//!
//! ```text
//! Stimulus → SalienceExtractor → DynamicsEngine → emit → Option<Glyph>
//! ```
//!
//! State is threaded by value: `boot()` once, then `tick(&state, input)`
//! in a loop, keeping the returned state.

pub mod core;
pub mod error;
pub mod types;

pub use crate::core::{boot, tick, Model};
pub use error::{Error, Result};
pub use types::{Glyph, Marker, ModelConfig, ModelState, Regime, Stimulus};

// =============================================================================
// DECAY RATES [per tick]
// =============================================================================

/// Arousal is the fastest field
pub const AROUSAL_DECAY: f64 = 0.80;

/// Containment charge outlives arousal so it can gate the alarm exit
pub const CONTAINMENT_DECAY: f64 = 0.93;

/// Replay pressure discharges slowest
pub const REPLAY_DECAY: f64 = 0.98;

// =============================================================================
// EXCITATION / INHIBITION WEIGHTS
// =============================================================================

pub const THREAT_WEIGHT: f64 = 0.35;
pub const AMBIGUITY_WEIGHT: f64 = 0.04;
pub const SOCIAL_WEIGHT: f64 = 0.10;
pub const REPAIR_WEIGHT: f64 = 0.15;

/// Containment pushing arousal down
pub const INHIBITION_WEIGHT: f64 = 0.10;

/// Containment recruited by arousal while the alarm is latched
pub const RECRUITMENT_WEIGHT: f64 = 0.12;

// =============================================================================
// HYSTERESIS THRESHOLDS
// =============================================================================

/// arousal above this leaves CALM
pub const RISING_ENTER: f64 = 0.25;

/// arousal below this drops RISING back to CALM (REPAIR while an episode is open)
pub const RISING_EXIT: f64 = 0.15;

/// arousal at or above this latches the alarm
pub const ALARM_ENTER: f64 = 0.60;

/// Containment charge needed to move CONTAINMENT → REPAIR
pub const REPAIR_ENTER: f64 = 0.30;

/// arousal must be below this to leave CONTAINMENT
pub const QUIET_AROUSAL: f64 = 0.15;

/// Consecutive low-salience ticks before the alarm latch releases
pub const ALARM_GRACE: u32 = 4;

/// Low-salience ticks after which CONTAINMENT releases even with a spent charge
pub const CONTAINMENT_GRACE: u32 = 12;

/// Calm ticks spent in REPAIR before it resolves
pub const REPAIR_GRACE: u32 = 6;

/// Combined salience below this counts as a low-salience tick
pub const LOW_SALIENCE_EPSILON: f64 = 0.05;

/// Containment charge that shows the containment marker outside an episode
pub const CONTAINMENT_ACTIVE_LEVEL: f64 = 0.50;

// =============================================================================
// REPLAY / SEAL
// =============================================================================

/// Flat pressure gained per latched tick
pub const REPLAY_LATCH_GAIN: f64 = 0.06;

/// Extra pressure per unit of arousal while latched
pub const REPLAY_AROUSAL_GAIN: f64 = 0.10;

/// Linear drain per quiet tick, on top of decay
pub const REPLAY_DRAIN: f64 = 0.01;

/// A replay fires each time draining pressure crosses a multiple of this
pub const REPLAY_QUANTUM: f64 = 0.20;

/// Pressure at or below this counts as drained; anything above routes
/// REPAIR through CONSOLIDATION
pub const REPLAY_DRAINED: f64 = 0.0;

// =============================================================================
// SALIENCE HEURISTICS
// =============================================================================

pub const THREAT_CAPS_WEIGHT: f64 = 0.40;
pub const THREAT_EXCLAIM_WEIGHT: f64 = 0.25;
pub const THREAT_KEYWORD_WEIGHT: f64 = 0.35;

/// Exclamation marks that saturate the exclamation score
pub const EXCLAIM_SATURATION: f64 = 3.0;

/// Threat keyword hits that saturate the keyword score
pub const KEYWORD_SATURATION: f64 = 2.0;

/// Score added per social or repair keyword hit
pub const KEYWORD_HIT_SCORE: f64 = 0.5;

pub const QUESTION_SATURATION: f64 = 3.0;
pub const QUESTION_AMBIGUITY: f64 = 0.6;
pub const PUNCTUATION_ONLY_AMBIGUITY: f64 = 0.5;
pub const LOW_DIVERSITY_AMBIGUITY: f64 = 0.3;

/// Text that scores nothing at all still carries this much ambiguity
pub const UNSCORED_AMBIGUITY: f64 = 0.15;

/// Empty or whitespace-only text
pub const BLANK_AMBIGUITY: f64 = 0.10;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "0.5.0";
