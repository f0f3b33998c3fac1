//! Body landmarks as handed over by the pose detector, and the joint angles derived from them.

use std::collections::BTreeMap;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::geometry::{Point2D, angle};

/// MediaPipe pose joints, discriminants are the detector's landmark indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Joint {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

pub const JOINT_COUNT: usize = 33;

impl Joint {
    pub const ALL: [Joint; JOINT_COUNT] = [
        Joint::Nose,
        Joint::LeftEyeInner,
        Joint::LeftEye,
        Joint::LeftEyeOuter,
        Joint::RightEyeInner,
        Joint::RightEye,
        Joint::RightEyeOuter,
        Joint::LeftEar,
        Joint::RightEar,
        Joint::MouthLeft,
        Joint::MouthRight,
        Joint::LeftShoulder,
        Joint::RightShoulder,
        Joint::LeftElbow,
        Joint::RightElbow,
        Joint::LeftWrist,
        Joint::RightWrist,
        Joint::LeftPinky,
        Joint::RightPinky,
        Joint::LeftIndex,
        Joint::RightIndex,
        Joint::LeftThumb,
        Joint::RightThumb,
        Joint::LeftHip,
        Joint::RightHip,
        Joint::LeftKnee,
        Joint::RightKnee,
        Joint::LeftAnkle,
        Joint::RightAnkle,
        Joint::LeftHeel,
        Joint::RightHeel,
        Joint::LeftFootIndex,
        Joint::RightFootIndex,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Joints the rep counter reads every frame.
pub const TRACKED_JOINTS: [Joint; 6] = [
    Joint::LeftShoulder,
    Joint::LeftElbow,
    Joint::LeftWrist,
    Joint::LeftHip,
    Joint::LeftKnee,
    Joint::LeftAnkle,
];

/// Limb connections drawn on the annotated frame.
pub const POSE_CONNECTIONS: [(Joint, Joint); 12] = [
    (Joint::LeftShoulder, Joint::RightShoulder),
    (Joint::LeftShoulder, Joint::LeftElbow),
    (Joint::LeftElbow, Joint::LeftWrist),
    (Joint::RightShoulder, Joint::RightElbow),
    (Joint::RightElbow, Joint::RightWrist),
    (Joint::LeftShoulder, Joint::LeftHip),
    (Joint::RightShoulder, Joint::RightHip),
    (Joint::LeftHip, Joint::RightHip),
    (Joint::LeftHip, Joint::LeftKnee),
    (Joint::LeftKnee, Joint::LeftAnkle),
    (Joint::RightHip, Joint::RightKnee),
    (Joint::RightKnee, Joint::RightAnkle),
];

/// One frame's detected joints. Joints the detector did not report are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: BTreeMap<Joint, Point2D>,
}

impl LandmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, joint: Joint, point: Point2D) {
        self.points.insert(joint, point);
    }

    pub fn with(mut self, joint: Joint, point: Point2D) -> Self {
        self.insert(joint, point);
        self
    }

    pub fn get(&self, joint: Joint) -> Option<Point2D> {
        self.points.get(&joint).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Joint, Point2D)> + '_ {
        self.points.iter().map(|(joint, point)| (*joint, *point))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Builds a set from a detector's flat output: 33 landmarks of `stride` floats each,
    /// `x` and `y` first. `stride` is 2 for `[x, y]` and 3 for `[x, y, z]`.
    pub fn from_flat(data: &[f32], stride: usize) -> Result<Self> {
        if stride < 2 {
            bail!("landmark stride must be at least 2, got {}", stride);
        }
        if data.len() != JOINT_COUNT * stride {
            bail!(
                "invalid landmark data length: {} (expected {})",
                data.len(),
                JOINT_COUNT * stride
            );
        }

        let points = Joint::ALL
            .iter()
            .map(|joint| {
                let offset = joint.index() * stride;
                let point = Point2D::new(data[offset] as f64, data[offset + 1] as f64);
                (*joint, point)
            })
            .collect();
        Ok(Self { points })
    }
}

/// Angles at the left elbow, hip and knee, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointAngles {
    pub elbow: f64,
    pub hip: f64,
    pub knee: f64,
}

impl JointAngles {
    /// `None` when any tracked joint is missing, which counts as "no person detected".
    pub fn from_landmarks(landmarks: &LandmarkSet) -> Option<Self> {
        let shoulder = landmarks.get(Joint::LeftShoulder)?;
        let elbow = landmarks.get(Joint::LeftElbow)?;
        let wrist = landmarks.get(Joint::LeftWrist)?;
        let hip = landmarks.get(Joint::LeftHip)?;
        let knee = landmarks.get(Joint::LeftKnee)?;
        let ankle = landmarks.get(Joint::LeftAnkle)?;

        Some(Self {
            elbow: angle(shoulder, elbow, wrist),
            hip: angle(shoulder, hip, knee),
            knee: angle(hip, knee, ankle),
        })
    }
}
