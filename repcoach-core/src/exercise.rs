//! Exercise kinds and the per-exercise up/down repetition state machine.

use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::feedback;
use crate::landmarks::JointAngles;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
pub enum ExerciseKind {
    PushUp,
    HalfSquat,
}

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 2] = [ExerciseKind::PushUp, ExerciseKind::HalfSquat];

    pub fn display_name(self) -> &'static str {
        match self {
            ExerciseKind::PushUp => "Push-ups",
            ExerciseKind::HalfSquat => "Half-Squats",
        }
    }

    /// Enter-down and exit-up angles. The gap between them is the hysteresis band.
    pub fn thresholds(self) -> Thresholds {
        match self {
            ExerciseKind::PushUp => Thresholds {
                down_below: 90.0,
                up_above: 160.0,
            },
            ExerciseKind::HalfSquat => Thresholds {
                down_below: 150.0,
                up_above: 170.0,
            },
        }
    }

    /// The single joint angle that drives the phase: elbow for push-ups, knee for squats.
    pub fn diagnostic_angle(self, angles: &JointAngles) -> f64 {
        match self {
            ExerciseKind::PushUp => angles.elbow,
            ExerciseKind::HalfSquat => angles.knee,
        }
    }

    pub fn starting_message(self) -> String {
        format!("Starting {}...", self.display_name())
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ExerciseKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "push-ups" | "push-up" | "pushups" | "pushup" | "push_up" => Ok(ExerciseKind::PushUp),
            "half-squats" | "half-squat" | "halfsquat" | "half_squat" | "squats" | "squat" => {
                Ok(ExerciseKind::HalfSquat)
            }
            _ => Err(anyhow!(
                "unknown exercise {:?}, expected \"Push-ups\" or \"Half-Squats\"",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
pub enum ExercisePhase {
    #[default]
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub down_below: f64,
    pub up_above: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    None,
    WentDown,
    CompletedRep,
}

/// Phase and repetition count of one exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RepTracker {
    pub phase: ExercisePhase,
    pub reps: u32,
}

impl RepTracker {
    /// Feeds one angle reading. NaN never satisfies a threshold, so it holds the phase.
    pub fn advance(&mut self, angle: f64, thresholds: Thresholds) -> Transition {
        match self.phase {
            ExercisePhase::Up if angle < thresholds.down_below => {
                self.phase = ExercisePhase::Down;
                Transition::WentDown
            }
            ExercisePhase::Down if angle > thresholds.up_above => {
                self.phase = ExercisePhase::Up;
                self.reps += 1;
                Transition::CompletedRep
            }
            _ => Transition::None,
        }
    }

    pub fn reset_count(&mut self) {
        self.reps = 0;
    }
}

/// Result of running one frame's angles through an exercise, ready to be committed.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    pub kind: ExerciseKind,
    pub tracker: RepTracker,
    pub transition: Transition,
    /// `None` leaves the previous message in place.
    pub feedback: Option<String>,
    /// Switch count of the session state the input tracker was read from.
    pub generation: u64,
}

/// Advances `tracker` for `kind` by one frame and evaluates form feedback on the new phase.
pub fn step(kind: ExerciseKind, mut tracker: RepTracker, angles: &JointAngles) -> FrameOutcome {
    let reading = kind.diagnostic_angle(angles);
    let transition = tracker.advance(reading, kind.thresholds());
    if transition != Transition::None {
        debug!(
            "{} {:?} at {:.1} deg, reps={}",
            kind, transition, reading, tracker.reps
        );
    }

    let feedback = feedback::evaluate(kind, tracker.phase, angles).map(str::to_string);
    FrameOutcome {
        kind,
        tracker,
        transition,
        feedback,
        generation: 0,
    }
}
