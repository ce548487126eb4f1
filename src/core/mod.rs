//! Core modules for Iris

pub mod dynamics;
pub mod emitter;
pub mod model;
pub mod probe;
pub mod salience;

pub use dynamics::DynamicsEngine;
pub use emitter::emit;
pub use model::{boot, tick, Model};
pub use probe::{
    resilience_curve, run_experiment, time_to_dot, Experiment, MarkerStats, RunConfig, RunReport,
    Step, TimeToDot,
};
pub use salience::SalienceExtractor;
