use std::sync::Arc;

use log::debug;

use crate::annotate::{Annotator, Frame};
use crate::exercise::ExerciseKind;
use crate::landmarks::LandmarkSet;
use crate::session::{DisplayStats, SessionController};
use crate::uniffi_interface::errors::CoachError;

/// Session handle for hosts that run their own camera and pose detector.
#[derive(uniffi::Object)]
pub struct CoachSession {
    controller: Arc<SessionController>,
    annotator: Annotator,
}

#[uniffi::export]
impl CoachSession {
    #[uniffi::constructor]
    pub fn new(initial: ExerciseKind) -> Arc<Self> {
        Arc::new(Self {
            controller: Arc::new(SessionController::new(initial)),
            annotator: Annotator::new(),
        })
    }

    pub fn session_id(&self) -> String {
        self.controller.id().to_string()
    }

    /// Returns whether the exercise changed (and all counters were reset).
    pub fn set_exercise(&self, kind: ExerciseKind) -> bool {
        self.controller.select_exercise(kind)
    }

    /// Accepts the names shown to users, e.g. "Push-ups" or "Half-Squats".
    pub fn set_exercise_by_name(&self, name: &str) -> Result<bool, CoachError> {
        let kind: ExerciseKind = name.parse()?;
        Ok(self.controller.select_exercise(kind))
    }

    pub fn get_display_stats(&self) -> DisplayStats {
        self.controller.read_stats()
    }

    /// Feeds one frame of detector output: 33 landmarks of `stride` floats (`x`, `y` first).
    /// An empty list means nobody was detected.
    pub fn process_landmarks(
        &self,
        landmarks: Vec<f32>,
        stride: u32,
    ) -> Result<DisplayStats, CoachError> {
        if !landmarks.is_empty() {
            let set = LandmarkSet::from_flat(&landmarks, stride as usize)?;
            if self.controller.process_landmarks(&set).is_none() {
                debug!("Session {} frame not committed", self.controller.id());
            }
        }
        Ok(self.controller.read_stats())
    }

    /// Draws the current stats onto a BGR24 frame and returns the pixels.
    pub fn annotate_frame(
        &self,
        width: u32,
        height: u32,
        bgr: Vec<u8>,
    ) -> Result<Vec<u8>, CoachError> {
        let mut frame = Frame::new(width, height, bgr)?;
        let stats = self.controller.read_stats();
        self.annotator.draw_stats(&mut frame, &stats);
        Ok(frame.into_data())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{JOINT_COUNT, Joint};
    use crate::synthetic::pose_with_angles;

    fn flat(set: &LandmarkSet) -> Vec<f32> {
        let mut data = vec![0.0f32; JOINT_COUNT * 2];
        for (joint, point) in set.iter() {
            data[joint.index() * 2] = point.x as f32;
            data[joint.index() * 2 + 1] = point.y as f32;
        }
        data
    }

    #[test]
    fn counts_from_flat_landmarks() {
        let session = CoachSession::new(ExerciseKind::PushUp);
        for elbow in [170.0, 80.0, 170.0] {
            session
                .process_landmarks(flat(&pose_with_angles(elbow, 175.0, 175.0)), 2)
                .unwrap();
        }
        assert_eq!(session.get_display_stats().reps, 1);
        assert!(session.process_landmarks(vec![], 2).is_ok());
        assert!(session.process_landmarks(vec![0.0; 10], 2).is_err());
        assert_eq!(Joint::ALL.len(), JOINT_COUNT);
    }

    #[test]
    fn rejects_unknown_exercise_names() {
        let session = CoachSession::new(ExerciseKind::PushUp);
        assert!(session.set_exercise_by_name("Burpees").is_err());
        assert!(session.set_exercise_by_name("Half-Squats").unwrap());
        assert!(!session.set_exercise(ExerciseKind::HalfSquat));
    }

    #[test]
    fn annotates_in_place_size() {
        let session = CoachSession::new(ExerciseKind::PushUp);
        let out = session.annotate_frame(300, 200, vec![0; 300 * 200 * 3]).unwrap();
        assert_eq!(out.len(), 300 * 200 * 3);
        assert!(session.annotate_frame(300, 200, vec![0; 7]).is_err());
    }
}
