mod dashboard;
mod feed;

use std::fs::File;
use std::io::{self, BufWriter};
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use log::LevelFilter;

use repcoach::config::CoachConfig;
use repcoach::exercise::ExerciseKind;
use repcoach::logging::{Target, init_logger, parse_level};
use repcoach::session::{DisplayStats, SessionController, poll_stats};
use repcoach::synthetic::MotionSynth;
use repcoach::trace::{load_trace, write_trace};

use crate::feed::{FrameFeed, run_frame_worker};

#[derive(Parser, Debug)]
#[command(version, about = "RepCoach - exercise repetition counter", long_about = None)]
struct Args {
    /// off, error, warn, info, debug or trace (defaults to REPCOACH_LOG)
    #[arg(long, global = true, value_parser = parse_log_level)]
    log_level: Option<LevelFilter>,
    #[command(subcommand)]
    command: Commands,
}

fn parse_exercise(s: &str) -> Result<ExerciseKind, String> {
    s.parse().map_err(|e: anyhow::Error| e.to_string())
}

fn parse_log_level(s: &str) -> Result<LevelFilter, String> {
    parse_level(s).ok_or_else(|| format!("unknown log level {:?}", s))
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Live dashboard fed by a landmark trace or by simulated motion
    Live {
        #[arg(short, long, conflicts_with = "simulate")]
        trace: Option<PathBuf>,
        #[arg(long)]
        simulate: bool,
        /// Start the trace over when it ends
        #[arg(long)]
        repeat: bool,
        #[arg(short, long, default_value = "Push-ups", value_parser = parse_exercise)]
        exercise: ExerciseKind,
        #[arg(long)]
        fps: Option<u32>,
        #[arg(long, default_value_t = 1.0)]
        noise: f64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Process a landmark trace without a UI and print the stats as they change
    Replay {
        #[arg(short, long)]
        trace: PathBuf,
        #[arg(short, long, default_value = "Push-ups", value_parser = parse_exercise)]
        exercise: ExerciseKind,
        #[arg(long)]
        fps: Option<u32>,
        /// Process frames back to back instead of at the frame rate
        #[arg(long)]
        no_wait: bool,
    },
    /// Write a synthetic landmark trace
    Simulate {
        #[arg(short, long, value_parser = parse_exercise)]
        exercise: ExerciseKind,
        #[arg(short, long)]
        reps: u32,
        #[arg(long, default_value_t = 30)]
        frames_per_rep: u32,
        #[arg(long, default_value_t = 1.0)]
        noise: f64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn format_stats(stats: &DisplayStats) -> String {
    format!(
        "{} | reps {} | {:?} | {}",
        stats.exercise, stats.reps, stats.phase, stats.feedback
    )
}

fn run_live(
    config: &CoachConfig,
    feed: FrameFeed,
    exercise: ExerciseKind,
    source: &str,
) -> Result<()> {
    let session = Arc::new(SessionController::new(exercise));
    let stop = Arc::new(AtomicBool::new(false));
    let frame_interval = config.frame_interval();

    let worker = {
        let session = Arc::clone(&session);
        let stop = Arc::clone(&stop);
        std::thread::spawn(move || run_frame_worker(feed, session, frame_interval, stop))
    };

    let terminal = ratatui::init();
    let result = dashboard::run_dashboard(terminal, Arc::clone(&session), config.poll_interval, source);
    ratatui::restore();

    stop.store(true, Ordering::Release);
    let frames = worker
        .join()
        .map_err(|_| anyhow::anyhow!("frame worker panicked"))?;
    result?;

    println!("Processed {} frames", frames);
    println!("{}", format_stats(&session.read_stats()));
    Ok(())
}

async fn run_replay(config: &CoachConfig, trace: PathBuf, exercise: ExerciseKind) -> Result<()> {
    let records = load_trace(&trace)?;
    let session = Arc::new(SessionController::new(exercise));
    let done = Arc::new(AtomicBool::new(false));
    let frame_interval = config.frame_interval();

    let worker = {
        let session = Arc::clone(&session);
        let done = Arc::clone(&done);
        tokio::task::spawn_blocking(move || {
            let feed = FrameFeed::Trace {
                records,
                repeat: false,
            };
            let frames = run_frame_worker(feed, session, frame_interval, Arc::new(AtomicBool::new(false)));
            done.store(true, Ordering::Release);
            frames
        })
    };

    let mut last: Option<DisplayStats> = None;
    poll_stats(Arc::clone(&session), config.poll_interval, |stats| {
        if last.as_ref() != Some(&stats) {
            println!("{}", format_stats(&stats));
            last = Some(stats);
        }
        if done.load(Ordering::Acquire) {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })
    .await;

    let frames = worker.await.context("replay worker failed")?;
    let stats = session.read_stats();
    println!(
        "Replayed {} frames from {}: {} reps of {}, last feedback: {}",
        frames,
        trace.display(),
        stats.reps,
        stats.exercise,
        stats.feedback
    );
    Ok(())
}

fn run_simulate(synth: MotionSynth, output: Option<PathBuf>) -> Result<()> {
    let records = synth.generate();
    match output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_trace(BufWriter::new(file), &records)?;
            eprintln!("Wrote {} frames to {}", records.len(), path.display());
        }
        None => write_trace(BufWriter::new(io::stdout().lock()), &records)?,
    }
    Ok(())
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();
    let mut config = CoachConfig::from_env()?;

    match args.command {
        Commands::Live {
            trace,
            simulate,
            repeat,
            exercise,
            fps,
            noise,
            seed,
        } => {
            // the dashboard owns the terminal, so stay quiet unless asked
            init_logger(args.log_level.unwrap_or(LevelFilter::Off), Target::Stderr);
            if let Some(fps) = fps {
                config.fps = fps.max(1);
            }
            let (feed, source) = match trace {
                Some(path) => {
                    let records = load_trace(&path)?;
                    let source = format!("trace {}", path.display());
                    (FrameFeed::Trace { records, repeat }, source)
                }
                None => {
                    if !simulate {
                        eprintln!("No --trace given, using simulated motion");
                    }
                    let feed = FrameFeed::Simulated {
                        noise_deg: noise,
                        seed,
                    };
                    (feed, "simulated motion".to_string())
                }
            };
            run_live(&config, feed, exercise, &source)
        }
        Commands::Replay {
            trace,
            exercise,
            fps,
            no_wait,
        } => {
            init_logger(args.log_level.unwrap_or(config.log_level), Target::Stderr);
            if let Some(fps) = fps {
                config.fps = fps.max(1);
            }
            if no_wait {
                config.fps = u32::MAX;
            }
            run_replay(&config, trace, exercise).await
        }
        Commands::Simulate {
            exercise,
            reps,
            frames_per_rep,
            noise,
            seed,
            output,
        } => {
            init_logger(args.log_level.unwrap_or(config.log_level), Target::Stderr);
            let synth = MotionSynth {
                frames_per_rep,
                fps: config.fps,
                noise_deg: noise,
                seed,
                ..MotionSynth::new(exercise, reps)
            };
            run_simulate(synth, output)
        }
    }
}
