//! Core types for Iris

mod config;
mod glyph;
mod output;
mod reason;
mod regime;
mod salience;
mod state;

pub use config::ModelConfig;
pub use glyph::{render, Glyph, Marker, BASELINE_DOT};
pub use output::TickOutput;
pub use reason::ReasonCode;
pub use regime::Regime;
pub use salience::{SalienceVector, Stimulus};
pub use state::{EventFlags, ModelState};
