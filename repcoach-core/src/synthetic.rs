use std::f64::consts::TAU;

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::exercise::ExerciseKind;
use crate::geometry::{Point2D, place_at_angle};
use crate::landmarks::{Joint, LandmarkSet};
use crate::trace::TraceRecord;

pub const UP_ANGLE: f64 = 175.0;
const UPPER_ARM: f64 = 0.12;
const FOREARM: f64 = 0.12;
const THIGH: f64 = 0.2;
const SHIN: f64 = 0.2;

pub fn bottom_angle(kind: ExerciseKind) -> f64 {
    match kind {
        ExerciseKind::PushUp => 75.0,
        ExerciseKind::HalfSquat => 120.0,
    }
}

/// Left-side landmarks whose elbow, hip and knee angles are the given values.
pub fn pose_with_angles(elbow: f64, hip: f64, knee: f64) -> LandmarkSet {
    let shoulder = Point2D::new(0.4, 0.3);
    let hip_at = Point2D::new(0.45, 0.55);
    let elbow_at = Point2D::new(shoulder.x, shoulder.y + UPPER_ARM);
    let wrist = place_at_angle(shoulder, elbow_at, elbow, FOREARM);
    let knee_at = place_at_angle(shoulder, hip_at, hip, THIGH);
    let ankle = place_at_angle(hip_at, knee_at, knee, SHIN);

    LandmarkSet::new()
        .with(Joint::LeftShoulder, shoulder)
        .with(Joint::LeftElbow, elbow_at)
        .with(Joint::LeftWrist, wrist)
        .with(Joint::LeftHip, hip_at)
        .with(Joint::LeftKnee, knee_at)
        .with(Joint::LeftAnkle, ankle)
}

#[derive(Debug, Clone)]
pub struct MotionSynth {
    pub kind: ExerciseKind,
    pub reps: u32,
    pub frames_per_rep: u32,
    pub fps: u32,
    pub noise_deg: f64,
    pub seed: u64,
}

impl MotionSynth {
    pub fn new(kind: ExerciseKind, reps: u32) -> Self {
        Self {
            kind,
            reps,
            frames_per_rep: 30,
            fps: 30,
            noise_deg: 1.0,
            seed: 0,
        }
    }

    /// Diagnostic angle over the frames: rest at the top, one cosine dip per repetition,
    /// rest at the top again.
    fn sweep(&self) -> Vec<f64> {
        let frames_per_rep = self.frames_per_rep.max(4);
        let rest = (frames_per_rep / 4).max(2);
        let depth = UP_ANGLE - bottom_angle(self.kind);

        let mut angles = vec![UP_ANGLE; rest as usize];
        for _ in 0..self.reps {
            for i in 0..frames_per_rep {
                let t = i as f64 / frames_per_rep as f64;
                angles.push(UP_ANGLE - depth * (1.0 - (TAU * t).cos()) / 2.0);
            }
        }
        angles.extend(std::iter::repeat_n(UP_ANGLE, rest as usize));
        angles
    }

    pub fn generate(&self) -> Vec<TraceRecord> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let noise = self.noise_deg.abs();
        let mut jitter = move || {
            if noise > 0.0 {
                rng.random_range(-noise..=noise)
            } else {
                0.0
            }
        };
        let fps = self.fps.max(1) as u64;

        let records: Vec<TraceRecord> = self
            .sweep()
            .into_iter()
            .enumerate()
            .map(|(frame, diagnostic)| {
                let (elbow, knee) = match self.kind {
                    ExerciseKind::PushUp => (diagnostic, UP_ANGLE),
                    ExerciseKind::HalfSquat => (UP_ANGLE, diagnostic),
                };
                let landmarks = pose_with_angles(
                    elbow + jitter(),
                    (UP_ANGLE + jitter()).min(180.0),
                    (knee + jitter()).min(180.0),
                );
                TraceRecord {
                    timestamp_ms: Some(frame as u64 * 1000 / fps),
                    landmarks: Some(landmarks),
                }
            })
            .collect();

        info!(
            "Generated {} frames of {} ({} reps, noise {:.1} deg)",
            records.len(),
            self.kind,
            self.reps,
            noise
        );
        records
    }
}
