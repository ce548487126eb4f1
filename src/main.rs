//! Iris CLI
//!
//! Usage:
//!   iris --text "URGENT HELP NOW!!!"       # One tick from boot
//!   iris --interactive                     # One tick per stdin line (empty line = silence)
//!   iris --experiment ecology              # Scripted run with report
//!   iris --experiment extinction --json    # Report as JSON

use clap::Parser;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use iris::core::{run_experiment, Experiment, RunConfig, RunReport};
use iris::types::{ModelConfig, Stimulus, TickOutput};
use iris::{Model, Result, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "iris",
    version = VERSION,
    about = "Iris - tick-driven symbolic regulation model",
    long_about = "Iris scores each input (text or silence) for salience, advances a\n\
                  hysteresis-latched regime machine and emits one glyph per tick.\n\n\
                  Glyphs:\n  \
                  ·  baseline (no glyph)\n  \
                  ⁂  alarm entered\n  \
                  ∥  containment active\n  \
                  ↺  replay discharge\n  \
                  ●  episode sealed\n\n\
                  Experiments: quick, ecology, extinction"
)]
struct Args {
    /// Text to feed as a single tick from boot
    #[arg(short, long)]
    text: Option<String>,

    /// Interactive mode - one tick per stdin line, empty line is silence
    #[arg(short, long)]
    interactive: bool,

    /// Run a built-in experiment script
    #[arg(short, long)]
    experiment: Option<String>,

    /// JSON file overriding model constants
    #[arg(short, long)]
    config: Option<String>,

    /// Seed for script jitter
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Max ticks added to or removed from each silence step
    #[arg(long, default_value_t = 0)]
    jitter: u32,

    /// Output JSON instead of text
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Print every tick of an experiment, not just the report
    #[arg(long)]
    verbose: bool,
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    if args.no_color {
        colored::control::set_override(false);
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; RUST_LOG overrides the default `warn`
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => ModelConfig::from_json_file(path)?,
        None => ModelConfig::default(),
    };
    let model = Model::new(config)?;

    if let Some(name) = &args.experiment {
        let experiment = Experiment::from_name(name)?;
        let run = RunConfig {
            seed: args.seed,
            jitter: args.jitter,
        };
        run_scripted(&model, experiment, run, args)
    } else if args.interactive {
        run_interactive(&model, args)
    } else if let Some(text) = &args.text {
        run_single(&model, text, args)
    } else {
        // Default to interactive if no mode specified
        run_interactive(&model, args)
    }
}

/// One tick from boot
fn run_single(model: &Model, text: &str, args: &Args) -> Result<()> {
    let (state, glyph) = model.tick(&model.boot(), text);
    print_tick(&TickOutput::new(&state, Some(text), glyph), args)
}

/// Interactive mode - stdin lines drive ticks
fn run_interactive(model: &Model, args: &Args) -> Result<()> {
    if !args.json {
        print_header();
        println!("One line = one tick. Empty line = silence. Type 'quit' to exit.");
        println!();
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut state = model.boot();

    loop {
        if !args.json {
            print!("[{}] > ", state.regime());
            stdout.flush()?;
        }

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let line = line.trim_end_matches(&['\r', '\n'][..]);
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            if !args.json {
                println!("\nSession ended. Ticks: {} | Seals: {}", state.tick(), state.seal_count());
            }
            break;
        }

        let input = (!line.is_empty()).then_some(line);
        let (next, glyph) = model.tick(&state, Stimulus::from(input));
        print_tick(&TickOutput::new(&next, input, glyph), args)?;
        state = next;
    }
    Ok(())
}

/// Scripted experiment with a closing report
fn run_scripted(model: &Model, experiment: Experiment, run: RunConfig, args: &Args) -> Result<()> {
    let verbose = args.verbose && !args.json;
    let report = run_experiment(model, experiment, run, |out| {
        if verbose {
            if args.no_color {
                println!("{}", out.to_parseable_string());
            } else {
                println!("{}", out.to_terminal_string());
            }
        }
    });

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_tick(out: &TickOutput, args: &Args) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string(out)?);
    } else if args.no_color {
        println!("{}", out.to_parseable_string());
    } else {
        println!("{}", out.to_terminal_string());
    }
    Ok(())
}

/// Banner shown above interactive sessions and reports
fn header() -> String {
    let rule = "========================================";
    let title = format!("  Iris v{}", VERSION);
    format!("{}\n{}\n{}", rule.bold(), title.as_str().bold(), rule.bold())
}

/// Print header
fn print_header() {
    println!("{}", header());
    println!();
}

fn print_report(report: &RunReport) {
    print_header();
    println!("experiment={} seed={} jitter={}", report.experiment.name(), report.run.seed, report.run.jitter);

    for phase in &report.phases {
        let s = &phase.stats;
        println!();
        println!("[{}] N={}  ∥={}  ⁂={}  ↺={}  ●={}", phase.name, s.n, s.containment_count, s.alarm_count, s.replay_count, s.seal_count);
        println!(
            "[{}] rates  ∥={:.3}  ↺={:.3}  ●={:.3}",
            phase.name, s.containment_rate, s.replay_rate, s.seal_rate
        );
        println!("[{}] {}", phase.name, phase.timeline);
    }

    for latency in &report.time_to_dot {
        println!();
        match latency.latency {
            Some(n) => println!("[{}] time-to-dot latency: {}", latency.label, n),
            None => println!("[{}] time-to-dot: no dot within window", latency.label),
        }
        println!("[{}] tail: {}", latency.label, latency.tail);
    }

    if !report.resilience.is_empty() {
        println!();
        for (i, lat) in report.resilience.iter().enumerate() {
            match lat {
                Some(n) => println!("round {}: time-to-dot = {}", i + 1, n),
                None => println!("round {}: time-to-dot = none", i + 1),
            }
        }
    }

    let t = &report.totals;
    println!();
    println!(
        "totals N={}  ∥={:.3}  ↺={:.3}  ●={:.3}  seals={}",
        t.n, t.containment_rate, t.replay_rate, t.seal_rate, report.final_seal_count
    );
    println!("digest {}", report.digest);
}
