//! Stimulus and salience structures

use serde::Serialize;

/// One input event: a line of text or a tick of silence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stimulus<'a> {
    Silence,
    Text(&'a str),
}

impl<'a> From<&'a str> for Stimulus<'a> {
    fn from(text: &'a str) -> Self {
        Stimulus::Text(text)
    }
}

impl<'a> From<Option<&'a str>> for Stimulus<'a> {
    fn from(input: Option<&'a str>) -> Self {
        input.map_or(Stimulus::Silence, Stimulus::Text)
    }
}

impl std::fmt::Display for Stimulus<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stimulus::Silence => write!(f, "None"),
            Stimulus::Text(text) => write!(f, "{:?}", text),
        }
    }
}

/// Normalized per-tick signal scores, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SalienceVector {
    /// Capitals, exclamations, alarm words
    pub threat: f64,
    /// Greetings, thanks, we/you
    pub social: f64,
    /// Questions, punctuation-only, unscorable text
    pub ambiguity: f64,
    /// Soothing and grounding words
    pub repair: f64,
}

impl SalienceVector {
    /// The vector produced by silence
    pub fn zero() -> Self {
        Self::default()
    }

    /// Sum of all four scores
    pub fn combined(&self) -> f64 {
        self.threat + self.social + self.ambiguity + self.repair
    }

    pub fn is_zero(&self) -> bool {
        self.combined() == 0.0
    }
}
