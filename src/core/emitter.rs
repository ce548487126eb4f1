//! Symbol Emitter: event flags + regime → glyph

use crate::types::{EventFlags, Glyph, Marker, Regime};

/// Map one tick's flags to a glyph, or `None` for the baseline dot
///
/// Flags compose in fixed precedence: alarm, containment, replay, seal.
/// With no flag raised, CALM and RISING are baseline; any regime holding an
/// episode still shows the containment marker. An open episode always raises
/// `containment_active`, so the dot never appears mid-episode.
pub fn emit(flags: &EventFlags, regime: Regime) -> Option<Glyph> {
    let raised = [
        (flags.alarm_entered, Marker::Alarm),
        (flags.containment_active, Marker::Containment),
        (flags.replay_fired, Marker::Replay),
        (flags.seal_fired, Marker::Seal),
    ];

    let glyph = Glyph::from_markers(raised.into_iter().filter(|(on, _)| *on).map(|(_, m)| m));
    if glyph.is_some() {
        return glyph;
    }

    regime
        .holds_episode()
        .then(|| Glyph::single(Marker::Containment))
}
