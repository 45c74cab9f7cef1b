//! slidedeck - terminal slide presenter with a pacing timer
//!
//! Shows a TOML slide deck in the terminal. An optional timer compares the
//! elapsed time with the slide position and warns when the talk runs early
//! or late.

mod config;
mod core;
mod data;
mod frontend;

use anyhow::{Context, Result};
use clap::{Args, Parser as ClapParser, Subcommand};
use crate::core::app_core::StartOptions;
use crate::core::messages::MessageBus;
use crate::core::position::{position_channel, SlidePosition};
use crate::core::progress::{evaluate, pace, ProgressSample, ThresholdConfig};
use crate::core::scheduler::{Clock, SystemClock};
use crate::core::timer::{Timer, TimerContext};
use crate::frontend::Frontend;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(ClapParser)]
#[command(name = "slidedeck")]
#[command(about = "Terminal slide presenter with a pacing timer", long_about = None)]
struct Cli {
    /// Custom data directory (default: ~/.slidedeck)
    /// Can also be set via SLIDEDECK_DIR environment variable
    #[arg(long, value_name = "DIR", global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Present a deck in the terminal
    Present {
        /// Deck file to present
        #[arg(value_name = "DECK")]
        deck: PathBuf,

        /// Start in fullscreen instead of the slide list
        #[arg(short, long)]
        fullscreen: bool,

        /// Slide to open on (one-based)
        #[arg(short, long, default_value_t = 1)]
        slide: usize,

        /// Configuration file path
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Validate a deck and its timer configuration
    Check {
        /// Deck file to validate
        #[arg(value_name = "DECK")]
        deck: PathBuf,
    },
    /// Print the warning band for one progress sample
    Evaluate(EvaluateArgs),
}

#[derive(Args)]
struct EvaluateArgs {
    /// Slide progress in percent
    #[arg(long, allow_hyphen_values = true)]
    slides: f64,

    /// Time progress in percent
    #[arg(long, allow_hyphen_values = true)]
    time: f64,

    #[arg(long)]
    rush_for: Option<f64>,

    #[arg(long)]
    rush_for_critical: Option<f64>,

    #[arg(long)]
    late_for: Option<f64>,

    #[arg(long)]
    late_for_critical: Option<f64>,

    /// Print the band as JSON
    #[arg(long)]
    json: bool,
}

impl EvaluateArgs {
    fn thresholds(&self) -> ThresholdConfig {
        let defaults = ThresholdConfig::default();
        ThresholdConfig {
            rush_for: self.rush_for.unwrap_or(defaults.rush_for),
            rush_for_critical: self.rush_for_critical.unwrap_or(defaults.rush_for_critical),
            late_for: self.late_for.unwrap_or(defaults.late_for),
            late_for_critical: self.late_for_critical.unwrap_or(defaults.late_for_critical),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set custom data directory before anything resolves paths
    if let Some(data_dir) = &cli.data_dir {
        std::env::set_var(config::DIR_ENV, data_dir);
    }

    init_logging()?;
    if let Some(data_dir) = &cli.data_dir {
        tracing::info!("Using custom data directory: {:?}", data_dir);
    }

    match cli.command {
        Commands::Present {
            deck,
            fullscreen,
            slide,
            config,
        } => {
            let config = match &config {
                Some(path) => config::Config::load_from_path(path)?,
                None => config::Config::load()?,
            };
            let options = StartOptions {
                fullscreen,
                slide: slide.saturating_sub(1),
            };
            run_tui(config, &deck, options)
        }
        Commands::Check { deck } => {
            let defaults = config::Config::load()
                .map(|c| c.timer_defaults)
                .unwrap_or_default();
            if !check_deck(&deck, &defaults) {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Evaluate(args) => print_evaluation(&args),
    }
}

/// Log to a file in the data directory (use RUST_LOG to control level)
/// TUI apps can't log to stdout
fn init_logging() -> Result<()> {
    let log_path = config::Config::log_path()?;
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create data directory: {:?}", parent))?;
    }
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .context(format!("Failed to open log file: {:?}", log_path))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false) // No color codes in log file
        .init();
    Ok(())
}

/// Run the TUI presentation
fn run_tui(config: config::Config, deck_path: &Path, options: StartOptions) -> Result<()> {
    let deck = data::Deck::load(deck_path)?;
    let frame = Duration::from_millis(config.ui.frame_interval_ms);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let mut app = crate::core::AppCore::new(config, deck, clock, options)?;

    // Single-threaded: the core is the only writer
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    let mut frontend = frontend::TuiFrontend::new()?;
    let result = runtime.block_on(frame_loop(&mut app, &mut frontend, frame));
    frontend.cleanup()?;
    tracing::info!("presentation closed");
    result
}

/// Poll input, advance the core by one frame, draw; until quit
async fn frame_loop(
    app: &mut crate::core::AppCore,
    frontend: &mut impl Frontend,
    frame: Duration,
) -> Result<()> {
    let mut interval = tokio::time::interval(frame);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    while app.is_running() {
        interval.tick().await;

        for event in frontend.poll_events()? {
            if !app.handle_event(&event) {
                break;
            }
        }

        app.tick();
        frontend.render(app)?;
    }
    Ok(())
}

/// Print a validation report; returns false on errors
fn check_deck(path: &Path, defaults: &ThresholdConfig) -> bool {
    println!("Validating deck: {:?}", path);

    let deck = match data::Deck::load(path) {
        Ok(deck) => deck,
        Err(e) => {
            eprintln!("✗ Failed to load deck: {}", e);
            return false;
        }
    };

    println!("✓ Deck loaded successfully");
    println!("  \"{}\": {} slides", deck.title, deck.len());

    let mut errors = 0;
    let mut warnings = 0;

    for (i, slide) in deck.slides.iter().enumerate() {
        if slide.lines().is_empty() {
            println!("⚠ Warning: Slide {} has no content", i + 1);
            warnings += 1;
        }
    }

    match &deck.timer {
        Some(attrs) => {
            let bus = MessageBus::new();
            let (_positions, position) = position_channel(SlidePosition::for_slide(0, deck.len()));
            let clock: Arc<dyn Clock> = Arc::new(SystemClock);
            let ctx = TimerContext {
                clock,
                bus: &bus,
                position: Some(position),
                defaults: *defaults,
                fullscreen: false,
            };
            match Timer::new(attrs, ctx) {
                Ok(timer) => {
                    println!(
                        "✓ Timer \"{}\": {} min from {}",
                        timer.label(),
                        timer.duration().num_minutes(),
                        timer.start_time().format("%Y-%m-%d %H:%M:%S UTC")
                    );
                    if let Some(t) = timer.thresholds() {
                        println!(
                            "  relative: rush {}/{}, late {}/{}",
                            t.rush_for, t.rush_for_critical, t.late_for, t.late_for_critical
                        );
                    }
                }
                Err(e) => {
                    eprintln!("✗ Error: Timer: {}", e);
                    errors += 1;
                }
            }
        }
        None => println!("  no timer"),
    }

    if errors == 0 && warnings == 0 {
        println!("✓ Deck is valid with no issues");
    } else {
        if errors > 0 {
            eprintln!("\n✗ Found {} error(s)", errors);
        }
        if warnings > 0 {
            println!("⚠ Found {} warning(s)", warnings);
        }
    }

    errors == 0
}

fn print_evaluation(args: &EvaluateArgs) -> Result<()> {
    let sample = ProgressSample::new(args.slides, args.time);
    let band = evaluate(sample, &args.thresholds());

    if args.json {
        let json = serde_json::to_string_pretty(&serde_json::json!({
            "pace": pace(sample),
            "band": band,
        }))
        .context("Failed to serialize band")?;
        println!("{}", json);
    } else {
        println!("pace:    {:?}", pace(sample));
        println!("optimum: {}", band.optimum);
        println!("low:     {}", band.low);
        println!("high:    {}", band.high);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_args() {
        let cli = Cli::try_parse_from([
            "slidedeck",
            "evaluate",
            "--slides",
            "40",
            "--time",
            "60",
            "--rush-for",
            "20",
        ])
        .unwrap();
        let Commands::Evaluate(args) = cli.command else {
            panic!("expected evaluate");
        };
        let thresholds = args.thresholds();
        assert_eq!(thresholds.rush_for, 20.0);
        assert_eq!(thresholds.rush_for_critical, 50.0);
        let band = evaluate(ProgressSample::new(args.slides, args.time), &thresholds);
        assert_eq!((band.low, band.high), (60.0, 90.0));
    }

    #[test]
    fn test_present_defaults() {
        let cli = Cli::try_parse_from(["slidedeck", "present", "talk.toml", "--data-dir", "/tmp/x"])
            .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        match cli.command {
            Commands::Present {
                deck,
                fullscreen,
                slide,
                config,
            } => {
                assert_eq!(deck, PathBuf::from("talk.toml"));
                assert!(!fullscreen);
                assert_eq!(slide, 1);
                assert!(config.is_none());
            }
            _ => panic!("expected present"),
        }
    }

    #[test]
    fn test_check_reports_bad_timer() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.toml");
        std::fs::write(&good, "[[slides]]\ncontent = \"hi\"\n").unwrap();
        let defaults = ThresholdConfig::default();
        assert!(check_deck(&good, &defaults));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[timer]\nrelative = true\n\n[[slides]]\ncontent = \"hi\"\n").unwrap();
        assert!(!check_deck(&bad, &defaults));

        assert!(!check_deck(&dir.path().join("missing.toml"), &defaults));
    }
}
