//! Integration tests for Boot / Tick
//!
//! Covers:
//! - Determinism and boot idempotence
//! - Baseline stability under silence and neutral text
//! - Threshold crossing into ALARM_LATCH
//! - Latch persistence through short silences
//! - Stress pulse followed by a long silence

use iris::types::{render, Glyph, Marker, ModelConfig, ModelState, ReasonCode, Regime, Stimulus};
use iris::core::time_to_dot;
use iris::{boot, tick, Model};
use pretty_assertions::assert_eq;

const ALARM: &str = "URGENT HELP NOW!!!";

fn feed(model: &Model, state: &ModelState, input: Stimulus<'_>, n: usize) -> (ModelState, Vec<Option<Glyph>>) {
    let mut state = state.clone();
    let mut glyphs = Vec::with_capacity(n);
    for _ in 0..n {
        let (next, glyph) = model.tick(&state, input);
        state = next;
        glyphs.push(glyph);
    }
    (state, glyphs)
}

fn rendered(glyphs: &[Option<Glyph>]) -> String {
    glyphs.iter().map(|g| render(g.as_ref())).collect()
}

// =============================================================================
// DETERMINISM
// =============================================================================

#[test]
fn test_boot_is_idempotent() {
    let model = Model::default();
    assert_eq!(model.boot(), model.boot());
    assert_eq!(model.boot(), boot());
}

#[test]
fn test_same_sequence_same_glyphs() {
    let model = Model::default();
    let script: Vec<Stimulus> = vec![
        Stimulus::Silence,
        "hey".into(),
        ALARM.into(),
        ALARM.into(),
        "???".into(),
        Stimulus::Silence,
        "ok breathe".into(),
    ];

    let run = |model: &Model| {
        let mut s = model.boot();
        let mut out = Vec::new();
        for input in &script {
            let (next, g) = model.tick(&s, *input);
            out.push((next.clone(), g));
            s = next;
        }
        out
    };

    assert_eq!(run(&model), run(&model));
}

#[test]
fn test_free_functions_match_default_model() {
    let model = Model::default();
    let s = boot();
    assert_eq!(tick(&s, ALARM), model.tick(&s, ALARM));
}

// =============================================================================
// BASELINE
// =============================================================================

#[test]
fn test_silence_from_boot_is_all_dots() {
    let model = Model::default();
    let (s, glyphs) = feed(&model, &model.boot(), Stimulus::Silence, 50);
    assert!(glyphs.iter().all(Option::is_none));
    assert_eq!(s.regime(), Regime::Calm);
    assert_eq!(s.arousal(), 0.0);
    assert_eq!(s.tick(), 50);
}

#[test]
fn test_neutral_text_keeps_baseline() {
    let model = Model::default();
    let (s, glyphs) = feed(&model, &model.boot(), "the quick brown fox".into(), 30);
    assert!(glyphs.iter().all(Option::is_none), "got {}", rendered(&glyphs));
    assert_eq!(s.regime(), Regime::Calm);
}

// =============================================================================
// THRESHOLD CROSSING
// =============================================================================

#[test]
fn test_repeated_alarm_phrase_latches_within_two_ticks() {
    let model = Model::default();
    let (s1, g1) = model.tick(&model.boot(), ALARM);
    assert_eq!(s1.regime(), Regime::Rising);
    assert_eq!(g1, None);

    let (s2, g2) = model.tick(&s1, ALARM);
    assert_eq!(s2.regime(), Regime::AlarmLatch);
    assert_eq!(s2.reason(), ReasonCode::R201_ALARM_LATCHED);
    let g2 = g2.unwrap();
    assert!(g2.contains(Marker::Alarm));
    assert!(g2.contains(Marker::Containment));
    assert_eq!(g2.to_string(), "⁂∥");
}

#[test]
fn test_single_pulse_subsides_without_alarm() {
    let model = Model::default();
    let (s, _) = model.tick(&model.boot(), ALARM);
    assert_eq!(s.regime(), Regime::Rising);

    let (s, glyphs) = feed(&model, &s, Stimulus::Silence, 10);
    assert!(glyphs.iter().flatten().all(|g| !g.contains(Marker::Alarm)));
    assert_eq!(s.regime(), Regime::Calm);
    assert_eq!(s.seal_count(), 0);
}

// =============================================================================
// LATCH PERSISTENCE
// =============================================================================

#[test]
fn test_latch_holds_through_short_silence() {
    let model = Model::default();
    let grace = model.config().alarm_grace as usize;
    let (latched, _) = feed(&model, &model.boot(), ALARM.into(), 6);
    assert_eq!(latched.regime(), Regime::AlarmLatch);

    let (held, glyphs) = feed(&model, &latched, Stimulus::Silence, grace - 1);
    assert_eq!(held.regime(), Regime::AlarmLatch);
    assert!(glyphs.iter().all(|g| g.map_or(false, |g| g.contains(Marker::Containment))));

    let (released, _) = model.tick(&held, Stimulus::Silence);
    assert_eq!(released.regime(), Regime::Containment);
    assert_eq!(released.reason(), ReasonCode::R300_LATCH_RELEASED);
}

#[test]
fn test_noise_interrupts_latch_grace() {
    let model = Model::default();
    let grace = model.config().alarm_grace as usize;
    let (latched, _) = feed(&model, &model.boot(), ALARM.into(), 6);

    let (s, _) = feed(&model, &latched, Stimulus::Silence, grace - 1);
    let (s, _) = model.tick(&s, "???");
    assert_eq!(s.low_salience_run(), 0);
    let (s, _) = feed(&model, &s, Stimulus::Silence, grace - 1);
    assert_eq!(s.regime(), Regime::AlarmLatch);
}

#[test]
fn test_alarm_marker_only_on_entry_tick() {
    let model = Model::default();
    let (_, glyphs) = feed(&model, &model.boot(), ALARM.into(), 8);
    let alarms = glyphs
        .iter()
        .flatten()
        .filter(|g| g.contains(Marker::Alarm))
        .count();
    assert_eq!(alarms, 1);
}

// =============================================================================
// STRESS THEN SILENCE
// =============================================================================

#[test]
fn test_dots_then_pulse_then_long_silence() {
    let model = Model::default();

    let (s, calm) = feed(&model, &model.boot(), Stimulus::Silence, 20);
    assert_eq!(rendered(&calm), "·".repeat(20));

    let (s, pulse) = feed(&model, &s, ALARM.into(), 6);
    assert!(pulse.iter().flatten().any(|g| g.contains(Marker::Alarm)));

    let (s, tail) = feed(&model, &s, Stimulus::Silence, 200);
    let seals = tail.iter().flatten().filter(|g| g.contains(Marker::Seal)).count();
    let replays = tail.iter().flatten().filter(|g| g.contains(Marker::Replay)).count();
    assert_eq!(seals, 1);
    assert!(replays >= 1);

    // Ends at rest, and stays there
    assert_eq!(s.regime(), Regime::Calm);
    assert_eq!(s.seal_count(), 1);
    assert!(!s.episode_open());
    assert!(tail.last().unwrap().is_none());
    let first_dot = tail.iter().position(Option::is_none).unwrap();
    assert!(tail[first_dot..].iter().all(Option::is_none), "{}", rendered(&tail));
}

#[test]
fn test_replay_precedes_seal() {
    let model = Model::default();
    let (s, _) = feed(&model, &model.boot(), ALARM.into(), 6);
    let (_, tail) = feed(&model, &s, Stimulus::Silence, 200);

    let first_replay = tail.iter().position(|g| g.map_or(false, |g| g.contains(Marker::Replay)));
    let seal = tail.iter().position(|g| g.map_or(false, |g| g.contains(Marker::Seal)));
    assert!(first_replay.unwrap() < seal.unwrap());
}

#[test]
fn test_relapse_during_recovery_reopens_latch() {
    let model = Model::default();
    let (s, _) = feed(&model, &model.boot(), ALARM.into(), 6);
    let (s, _) = feed(&model, &s, Stimulus::Silence, 6);
    assert_ne!(s.regime(), Regime::AlarmLatch);

    let (s, _) = feed(&model, &s, ALARM.into(), 3);
    assert_eq!(s.regime(), Regime::AlarmLatch);
    assert!(s.episode_open());
    assert_eq!(s.seal_count(), 0);
}

#[test]
fn test_relapse_into_rising_is_not_baseline() {
    let model = Model::default();
    let (mut s, _) = feed(&model, &model.boot(), ALARM.into(), 6);
    for _ in 0..50 {
        if s.regime() == Regime::Repair {
            break;
        }
        s = model.tick(&s, Stimulus::Silence).0;
    }
    assert_eq!(s.regime(), Regime::Repair);

    let (s, g) = model.tick(&s, "STOP NOW!!!");
    assert_eq!(s.regime(), Regime::Rising);
    assert!(s.episode_open());
    assert!(g.unwrap().contains(Marker::Containment));

    // Recovery is only reported once the episode is sealed
    let ttd = time_to_dot(&model, &s, 200);
    assert!(ttd.latency.unwrap() > 1);
    assert!(!ttd.state.episode_open());
    assert_eq!(ttd.state.seal_count(), 1);

    let (_, after) = feed(&model, &ttd.state, Stimulus::Silence, 40);
    assert!(after.iter().all(Option::is_none), "{}", rendered(&after));
}

// =============================================================================
// CONFIG
// =============================================================================

#[test]
fn test_longer_grace_holds_latch_longer() {
    let config = ModelConfig {
        alarm_grace: 10,
        ..ModelConfig::default()
    };
    let model = Model::new(config).unwrap();
    let (s, _) = feed(&model, &model.boot(), ALARM.into(), 6);
    let (s, _) = feed(&model, &s, Stimulus::Silence, 9);
    assert_eq!(s.regime(), Regime::AlarmLatch);
    let (s, _) = model.tick(&s, Stimulus::Silence);
    assert_eq!(s.regime(), Regime::Containment);
}

#[test]
fn test_config_rejects_inverted_thresholds() {
    let config = ModelConfig {
        rising_exit: 0.5,
        rising_enter: 0.4,
        ..ModelConfig::default()
    };
    let err = Model::new(config).unwrap_err();
    assert!(err.to_string().contains("invalid config"), "{}", err);
}

#[test]
fn test_config_that_cannot_recover_is_rejected() {
    for json in [
        r#"{ "quiet_arousal": 0.0 }"#,
        r#"{ "replay_drained": -0.1 }"#,
        r#"{ "repair_enter": 2.0, "containment_grace": 4000000000 }"#,
    ] {
        let config: ModelConfig = serde_json::from_str(json).unwrap();
        assert!(Model::new(config).is_err(), "accepted {}", json);
    }
}

#[test]
fn test_config_json_partial_override() {
    let config: ModelConfig = serde_json::from_str(r#"{ "alarm_grace": 7 }"#).unwrap();
    assert_eq!(config.alarm_grace, 7);
    assert_eq!(config.alarm_enter, ModelConfig::default().alarm_enter);
}
