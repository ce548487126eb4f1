//! Probe layer: scripted stimulus runs, time-to-dot and marker statistics
//!
//! Everything here is built on `Model::boot` / `Model::tick` only. The
//! three built-in experiments replay the phase scripts the model is usually
//! exercised with:
//!
//! - `quick`: ten silent ticks, then one alarm phrase
//! - `ecology`: calm, social, threat burst, noise, repair, consolidation,
//!   then a mini-stressor and its time-to-dot
//! - `extinction`: cold-start alarm, latch ecology, extinction latency,
//!   consolidation window, resilience curve

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::core::Model;
use crate::error::{Error, Result};
use crate::types::{render, Glyph, Marker, ModelState, Stimulus, TickOutput};

/// The phrase every built-in stress pulse uses
pub const ALARM_PHRASE: &str = "URGENT HELP NOW!!!";

// =============================================================================
// SCRIPTS
// =============================================================================

/// One stimulus repeated `reps` times; `None` is silence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub stimulus: Option<String>,
    pub reps: u32,
}

impl Step {
    pub fn text(text: &str, reps: u32) -> Self {
        Self {
            stimulus: Some(text.to_string()),
            reps,
        }
    }

    pub fn silence(reps: u32) -> Self {
        Self {
            stimulus: None,
            reps,
        }
    }
}

/// A named run of steps whose statistics are reported together
#[derive(Debug, Clone, Serialize)]
pub struct Phase {
    pub name: String,
    pub steps: Vec<Step>,
}

impl Phase {
    pub fn new(name: &str, steps: Vec<Step>) -> Self {
        Self {
            name: name.to_string(),
            steps,
        }
    }

    pub fn len(&self) -> u32 {
        self.steps.iter().map(|s| s.reps).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One segment of an experiment script
#[derive(Debug, Clone)]
pub enum Segment {
    /// Feed a phase and report its marker statistics
    Phase(Phase),
    /// Optional pulse, then silence until the baseline dot returns
    TimeToDot {
        label: String,
        pulse: Option<Step>,
        max_ticks: u32,
    },
    /// Repeated pulse → time-to-dot → silent buffer rounds
    Resilience {
        rounds: u32,
        pulse: Step,
        max_ticks: u32,
        buffer: u32,
    },
}

/// Built-in experiments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Experiment {
    Quick,
    Ecology,
    Extinction,
}

impl Experiment {
    pub const ALL: [Experiment; 3] = [Experiment::Quick, Experiment::Ecology, Experiment::Extinction];

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "quick" => Ok(Experiment::Quick),
            "ecology" => Ok(Experiment::Ecology),
            "extinction" => Ok(Experiment::Extinction),
            other => Err(Error::UnknownExperiment(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Experiment::Quick => "quick",
            Experiment::Ecology => "ecology",
            Experiment::Extinction => "extinction",
        }
    }

    /// The experiment's segments in run order
    pub fn script(&self) -> Vec<Segment> {
        match self {
            Experiment::Quick => vec![Segment::Phase(Phase::new(
                "quick sanity",
                vec![Step::silence(10), Step::text(ALARM_PHRASE, 1)],
            ))],
            Experiment::Ecology => ecology_script(),
            Experiment::Extinction => extinction_script(),
        }
    }
}

fn ecology_script() -> Vec<Segment> {
    vec![
        Segment::Phase(Phase::new("A: calm baseline", vec![Step::silence(20)])),
        Segment::Phase(Phase::new(
            "B: social / co-regulation",
            vec![
                Step::text("hey", 2),
                Step::text("just checking in", 2),
                Step::text("thanks", 2),
                Step::silence(6),
                Step::text("appreciate you", 2),
                Step::silence(6),
            ],
        )),
        Segment::Phase(Phase::new(
            "C: threat burst",
            vec![
                Step::text(ALARM_PHRASE, 3),
                Step::text("STOP NOW!!!", 3),
                Step::text("EMERGENCY EMERGENCY EMERGENCY!!!", 3),
                Step::text("HELP HELP HELP!!!", 3),
                Step::text("THIS IS NOT A DRILL!!!", 3),
            ],
        )),
        Segment::Phase(Phase::new(
            "D: ambiguity / noise",
            vec![
                Step::text("???", 3),
                Step::text("   ", 3),
                Step::text("\n", 2),
                Step::text("the quick brown fox", 2),
                Step::text("aaaaaaaaaaaaaaaaaaaaaaaaaa", 2),
                Step::silence(6),
                Step::text("…", 3),
                Step::text("123 456 789", 2),
                Step::silence(7),
            ],
        )),
        Segment::Phase(Phase::new(
            "E: repair / grounding",
            vec![
                Step::text("ok breathe", 2),
                Step::text("sorry", 2),
                Step::text("we're good", 2),
                Step::silence(8),
                Step::text("thank you", 2),
            ],
        )),
        Segment::Phase(Phase::new("F: consolidation silence", vec![Step::silence(160)])),
        Segment::TimeToDot {
            label: "G: mini-stressor".to_string(),
            pulse: Some(Step::text(ALARM_PHRASE, 8)),
            max_ticks: 200,
        },
    ]
}

fn extinction_script() -> Vec<Segment> {
    vec![
        Segment::Phase(Phase::new(
            "1: cold-start alarm",
            vec![
                Step::text(ALARM_PHRASE, 6),
                Step::text("STOP NOW!!!", 4),
                Step::text("EMERGENCY EMERGENCY EMERGENCY!!!", 4),
                Step::text("HELP HELP HELP!!!", 4),
            ],
        )),
        Segment::Phase(Phase::new(
            "2: latch ecology",
            vec![
                Step::text("hey", 2),
                Step::text("thanks", 2),
                Step::silence(4),
                Step::text("???", 3),
                Step::text("the quick brown fox", 2),
                Step::text(ALARM_PHRASE, 3),
                Step::text("ok breathe", 2),
                Step::text("sorry", 2),
                Step::silence(8),
            ],
        )),
        Segment::TimeToDot {
            label: "3: extinction".to_string(),
            pulse: None,
            max_ticks: 250,
        },
        Segment::Phase(Phase::new("4: consolidation window", vec![Step::silence(220)])),
        Segment::Resilience {
            rounds: 6,
            pulse: Step::text(ALARM_PHRASE, 6),
            max_ticks: 200,
            buffer: 24,
        },
    ]
}

// =============================================================================
// RUN CONFIG
// =============================================================================

/// Explicit run parameters; nothing here is process-global
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunConfig {
    pub seed: u64,
    /// Silence steps are stretched or shortened by up to this many ticks
    pub jitter: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { seed: 7, jitter: 0 }
    }
}

// =============================================================================
// METRICS
// =============================================================================

/// Marker counts and rates over a timeline
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarkerStats {
    pub n: usize,
    pub baseline_count: usize,
    pub alarm_count: usize,
    pub containment_count: usize,
    pub replay_count: usize,
    pub seal_count: usize,
    pub containment_rate: f64,
    pub replay_rate: f64,
    pub seal_rate: f64,
}

impl MarkerStats {
    pub fn from_timeline(timeline: &[Option<Glyph>]) -> Self {
        let count = |m: Marker| {
            timeline
                .iter()
                .filter(|g| g.map_or(false, |g| g.contains(m)))
                .count()
        };
        let n = timeline.len();
        let denom = n.max(1) as f64;
        let containment_count = count(Marker::Containment);
        let replay_count = count(Marker::Replay);
        let seal_count = count(Marker::Seal);

        Self {
            n,
            baseline_count: timeline.iter().filter(|g| g.is_none()).count(),
            alarm_count: count(Marker::Alarm),
            containment_count,
            replay_count,
            seal_count,
            containment_rate: containment_count as f64 / denom,
            replay_rate: replay_count as f64 / denom,
            seal_rate: seal_count as f64 / denom,
        }
    }
}

/// Result of feeding silence until the baseline dot returns
#[derive(Debug, Clone)]
pub struct TimeToDot {
    /// 1-based tick index of the first dot; `None` if it never came
    pub latency: Option<u32>,
    pub state: ModelState,
    pub tail: Vec<Option<Glyph>>,
}

/// Feed silence from `state` until a tick emits no glyph, up to `max_ticks`
pub fn time_to_dot(model: &Model, state: &ModelState, max_ticks: u32) -> TimeToDot {
    let mut state = state.clone();
    let mut tail = Vec::new();
    for i in 1..=max_ticks {
        let (next, glyph) = model.tick(&state, Stimulus::Silence);
        state = next;
        tail.push(glyph);
        if glyph.is_none() {
            return TimeToDot {
                latency: Some(i),
                state,
                tail,
            };
        }
    }
    TimeToDot {
        latency: None,
        state,
        tail,
    }
}

/// Repeated stress pulse → time-to-dot → silent buffer; one latency per round
pub fn resilience_curve(
    model: &Model,
    state: &ModelState,
    rounds: u32,
    pulse: &Step,
    max_ticks: u32,
    buffer: u32,
) -> (ModelState, Vec<Option<u32>>) {
    let mut state = state.clone();
    let mut curve = Vec::with_capacity(rounds as usize);
    for round in 1..=rounds {
        for _ in 0..pulse.reps {
            state = model.tick(&state, Stimulus::from(pulse.stimulus.as_deref())).0;
        }
        let ttd = time_to_dot(model, &state, max_ticks);
        debug!(round, latency = ?ttd.latency, "resilience round");
        curve.push(ttd.latency);
        state = ttd.state;
        for _ in 0..buffer {
            state = model.tick(&state, Stimulus::Silence).0;
        }
    }
    (state, curve)
}

// =============================================================================
// REPORT
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PhaseReport {
    pub name: String,
    pub stats: MarkerStats,
    pub timeline: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LatencyReport {
    pub label: String,
    pub latency: Option<u32>,
    pub tail: String,
}

/// Everything a scripted run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub experiment: Experiment,
    pub run: RunConfig,
    pub phases: Vec<PhaseReport>,
    pub time_to_dot: Vec<LatencyReport>,
    pub resilience: Vec<Option<u32>>,
    pub totals: MarkerStats,
    pub final_seal_count: u32,
    /// SHA-256 of the full rendered glyph timeline
    pub digest: String,
    pub generated_at: DateTime<Utc>,
}

/// Drive an experiment from boot, calling `observer` on every tick
pub fn run_experiment(
    model: &Model,
    experiment: Experiment,
    run: RunConfig,
    mut observer: impl FnMut(&TickOutput),
) -> RunReport {
    let mut rng = StdRng::seed_from_u64(run.seed);
    let mut state = model.boot();
    let mut timeline: Vec<Option<Glyph>> = Vec::new();
    let mut phases = Vec::new();
    let mut latencies = Vec::new();
    let mut resilience = Vec::new();

    info!(experiment = experiment.name(), seed = run.seed, jitter = run.jitter, "run started");

    for segment in experiment.script() {
        match segment {
            Segment::Phase(phase) => {
                let mut phase_timeline = Vec::with_capacity(phase.len() as usize);
                for step in &phase.steps {
                    let reps = jittered_reps(step, run.jitter, &mut rng);
                    let input = step.stimulus.as_deref();
                    for _ in 0..reps {
                        let (next, glyph) = model.tick(&state, Stimulus::from(input));
                        observer(&TickOutput::new(&next, input, glyph));
                        state = next;
                        phase_timeline.push(glyph);
                    }
                }
                phases.push(PhaseReport {
                    name: phase.name,
                    stats: MarkerStats::from_timeline(&phase_timeline),
                    timeline: render_timeline(&phase_timeline),
                });
                timeline.extend(phase_timeline);
            }

            Segment::TimeToDot {
                label,
                pulse,
                max_ticks,
            } => {
                if let Some(pulse) = pulse {
                    let input = pulse.stimulus.as_deref();
                    for _ in 0..pulse.reps {
                        let (next, glyph) = model.tick(&state, Stimulus::from(input));
                        observer(&TickOutput::new(&next, input, glyph));
                        state = next;
                        timeline.push(glyph);
                    }
                }
                let ttd = time_to_dot(model, &state, max_ticks);
                debug!(label = %label, latency = ?ttd.latency, "time-to-dot");
                latencies.push(LatencyReport {
                    label,
                    latency: ttd.latency,
                    tail: render_timeline(&ttd.tail),
                });
                timeline.extend(ttd.tail);
                state = ttd.state;
            }

            Segment::Resilience {
                rounds,
                pulse,
                max_ticks,
                buffer,
            } => {
                let (next, curve) =
                    resilience_curve(model, &state, rounds, &pulse, max_ticks, buffer);
                state = next;
                resilience = curve;
            }
        }
    }

    let report = RunReport {
        experiment,
        run,
        phases,
        time_to_dot: latencies,
        resilience,
        totals: MarkerStats::from_timeline(&timeline),
        final_seal_count: state.seal_count(),
        digest: timeline_digest(&timeline),
        generated_at: Utc::now(),
    };
    info!(digest = %report.digest, seals = report.final_seal_count, "run finished");
    report
}

/// Silence steps absorb the jitter; stimulus steps are replayed exactly
fn jittered_reps(step: &Step, jitter: u32, rng: &mut StdRng) -> u32 {
    if jitter == 0 || step.stimulus.is_some() {
        return step.reps;
    }
    let j = jitter as i64;
    let delta = rng.gen_range(-j..=j);
    (step.reps as i64 + delta).max(1) as u32
}

/// Concatenate rendered glyphs, dots included
pub fn render_timeline(timeline: &[Option<Glyph>]) -> String {
    timeline.iter().map(|g| render(g.as_ref())).collect()
}

/// Hex SHA-256 of the rendered timeline
pub fn timeline_digest(timeline: &[Option<Glyph>]) -> String {
    let mut hasher = Sha256::new();
    for g in timeline {
        hasher.update(render(g.as_ref()).as_bytes());
        hasher.update([0u8]); // Separator
    }
    hasher.finalize().iter().map(|b| format!("{:02x}", b)).collect()
}
