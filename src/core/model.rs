//! Boot and Tick: the two operations callers drive

use tracing::trace;

use crate::core::{emit, DynamicsEngine, SalienceExtractor};
use crate::error::Result;
use crate::types::{Glyph, ModelConfig, ModelState, Stimulus};

/// Extractor, engine and emitter wired together under one config
#[derive(Debug, Clone, Default)]
pub struct Model {
    extractor: SalienceExtractor,
    engine: DynamicsEngine,
}

impl Model {
    /// Build a model from a config, rejecting constants that break hysteresis
    pub fn new(config: ModelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            extractor: SalienceExtractor::new(),
            engine: DynamicsEngine::new(config),
        })
    }

    pub fn config(&self) -> &ModelConfig {
        self.engine.config()
    }

    /// Initial state: everything at rest, regime CALM
    pub fn boot(&self) -> ModelState {
        ModelState::at_rest()
    }

    /// Advance one tick: Extract → Advance → Emit
    ///
    /// # Panics
    ///
    /// Panics if `state` violates the invariants of the Boot/Tick lineage.
    pub fn tick<'a>(
        &self,
        state: &ModelState,
        input: impl Into<Stimulus<'a>>,
    ) -> (ModelState, Option<Glyph>) {
        if let Err(e) = state.check() {
            panic!("{}", e);
        }

        let stimulus = input.into();
        let salience = self.extractor.extract(stimulus);
        let (mut next, flags) = self.engine.advance(state, &salience);
        next.tick += 1;

        let glyph = emit(&flags, next.regime);
        trace!(tick = next.tick, input = %stimulus, glyph = %crate::types::render(glyph.as_ref()), "tick");

        (next, glyph)
    }
}

/// Boot with the default model
pub fn boot() -> ModelState {
    ModelState::at_rest()
}

/// Tick with the default model
pub fn tick<'a>(state: &ModelState, input: impl Into<Stimulus<'a>>) -> (ModelState, Option<Glyph>) {
    Model::default().tick(state, input)
}
