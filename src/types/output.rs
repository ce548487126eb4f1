//! Output structures for terminal display

use colored::Colorize;
use serde::Serialize;

use crate::types::{render, Glyph, ModelState, ReasonCode, Regime};

/// One line of output per tick
#[derive(Debug, Clone, Serialize)]
pub struct TickOutput {
    pub tick: u64,
    /// `None` for silence
    pub input: Option<String>,
    pub glyph: Option<Glyph>,
    /// Glyph with the baseline dot substituted
    pub symbol: String,
    pub regime: Regime,
    pub arousal: f64,
    pub containment: f64,
    pub replay_pressure: f64,
    pub seal_count: u32,
    pub reason: ReasonCode,
}

impl TickOutput {
    /// Capture the state a tick returned along with its glyph
    pub fn new(state: &ModelState, input: Option<&str>, glyph: Option<Glyph>) -> Self {
        Self {
            tick: state.tick(),
            input: input.map(str::to_string),
            glyph,
            symbol: render(glyph.as_ref()),
            regime: state.regime(),
            arousal: state.arousal(),
            containment: state.containment(),
            replay_pressure: state.replay_pressure(),
            seal_count: state.seal_count(),
            reason: state.reason(),
        }
    }

    fn input_label(&self) -> String {
        match &self.input {
            Some(text) => format!("{:?}", text),
            None => "None".to_string(),
        }
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let line = format!(
            "{:>4}  in={:<34}  sym={:<4} | {} | a={:.3} c={:.3} rp={:.3} | seals={}",
            self.tick,
            self.input_label(),
            self.symbol,
            self.regime,
            self.arousal,
            self.containment,
            self.replay_pressure,
            self.seal_count,
        );
        line.as_str().color(self.regime.color_name()).to_string()
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "tick={} | sym={} | regime={} | a={:.3} | c={:.3} | rp={:.3} | seals={} | reason={}",
            self.tick,
            self.symbol,
            self.regime,
            self.arousal,
            self.containment,
            self.replay_pressure,
            self.seal_count,
            self.reason.code()
        )
    }
}
