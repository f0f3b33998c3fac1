use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use log::{debug, info};
use repcoach::session::SessionController;
use repcoach::synthetic::MotionSynth;
use repcoach::trace::TraceRecord;

/// Where the worker's landmarks come from.
pub enum FrameFeed {
    Trace {
        records: Vec<TraceRecord>,
        repeat: bool,
    },
    /// One synthetic repetition at a time of whatever exercise is currently selected.
    Simulated { noise_deg: f64, seed: u64 },
}

/// Pushes each record's landmarks into the session, one per `frame_interval`, until the feed
/// ends or `stop` is raised. The terminal has no video to show, so no frames are drawn.
/// Returns the number of records consumed.
pub fn run_frame_worker(
    feed: FrameFeed,
    session: Arc<SessionController>,
    frame_interval: Duration,
    stop: Arc<AtomicBool>,
) -> u64 {
    let mut frames = 0;
    let mut pass: u64 = 0;

    while !stop.load(Ordering::Acquire) {
        let records = match &feed {
            FrameFeed::Trace { records, repeat } => {
                if pass > 0 && !repeat {
                    break;
                }
                records.clone()
            }
            FrameFeed::Simulated { noise_deg, seed } => MotionSynth {
                noise_deg: *noise_deg,
                seed: seed.wrapping_add(pass),
                ..MotionSynth::new(session.active_exercise(), 1)
            }
            .generate(),
        };
        if records.is_empty() {
            break;
        }
        pass += 1;
        debug!("Frame feed pass {} with {} records", pass, records.len());

        for record in &records {
            if stop.load(Ordering::Acquire) {
                break;
            }
            if let Some(landmarks) = &record.landmarks {
                session.process_landmarks(landmarks);
            }
            frames += 1;
            if !frame_interval.is_zero() {
                thread::sleep(frame_interval);
            }
        }
    }

    info!("Frame feed stopped after {} frames", frames);
    frames
}
