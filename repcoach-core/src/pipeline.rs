use std::sync::Arc;

use anyhow::Result;
use log::{debug, warn};

use crate::annotate::{Annotator, Frame};
use crate::landmarks::LandmarkSet;
use crate::session::SessionController;

/// The pose detector. `Ok(None)` means nobody was found in the frame.
pub trait LandmarkDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Option<LandmarkSet>>;
}

impl<D: LandmarkDetector + ?Sized> LandmarkDetector for Box<D> {
    fn detect(&mut self, frame: &Frame) -> Result<Option<LandmarkSet>> {
        (**self).detect(frame)
    }
}

pub struct FrameProcessor<D: LandmarkDetector> {
    detector: D,
    session: Arc<SessionController>,
    annotator: Annotator,
    frames: u64,
}

impl<D: LandmarkDetector> FrameProcessor<D> {
    pub fn new(detector: D, session: Arc<SessionController>) -> Self {
        Self {
            detector,
            session,
            annotator: Annotator::new(),
            frames: 0,
        }
    }

    pub fn session(&self) -> &Arc<SessionController> {
        &self.session
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames
    }

    /// Processes one frame and returns it annotated, same size and format.
    /// Detector failures are treated like an empty frame.
    pub fn process(&mut self, mut frame: Frame) -> Frame {
        self.frames += 1;
        let landmarks = match self.detector.detect(&frame) {
            Ok(landmarks) => landmarks,
            Err(e) => {
                warn!("Landmark detection failed on frame {}: {:#}", self.frames, e);
                None
            }
        };

        match &landmarks {
            Some(set) => {
                if self.session.process_landmarks(set).is_none() {
                    debug!("Frame {} produced no commit", self.frames);
                }
            }
            None => debug!("Frame {}: no person detected", self.frames),
        }

        let stats = self.session.read_stats();
        self.annotator.annotate(&mut frame, landmarks.as_ref(), &stats);
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::PANEL_COLOR;
    use crate::exercise::ExercisePhase;
    use crate::geometry::{Point2D, place_at_angle};
    use crate::landmarks::Joint;
    use anyhow::anyhow;

    /// Replays a script of per-frame results.
    struct Scripted(std::vec::IntoIter<Result<Option<LandmarkSet>>>);

    impl LandmarkDetector for Scripted {
        fn detect(&mut self, _frame: &Frame) -> Result<Option<LandmarkSet>> {
            self.0.next().unwrap_or(Ok(None))
        }
    }

    fn with_elbow(elbow: f64) -> LandmarkSet {
        let shoulder = Point2D::new(0.3, 0.4);
        let elbow_at = Point2D::new(0.45, 0.45);
        let hip = Point2D::new(0.6, 0.45);
        LandmarkSet::new()
            .with(Joint::LeftShoulder, shoulder)
            .with(Joint::LeftElbow, elbow_at)
            .with(Joint::LeftWrist, place_at_angle(shoulder, elbow_at, elbow, 0.1))
            .with(Joint::LeftHip, hip)
            .with(Joint::LeftKnee, place_at_angle(shoulder, hip, 175.0, 0.15))
            .with(Joint::LeftAnkle, Point2D::new(0.9, 0.5))
    }

    #[test]
    fn counts_through_detection_gaps_and_errors() {
        let script = vec![
            Ok(Some(with_elbow(170.0))),
            Ok(Some(with_elbow(80.0))),
            Ok(None),
            Err(anyhow!("camera glitch")),
            Ok(Some(with_elbow(170.0))),
        ];
        let session = Arc::new(SessionController::default());
        let mut processor = FrameProcessor::new(Scripted(script.into_iter()), Arc::clone(&session));

        for _ in 0..5 {
            let out = processor.process(Frame::blank(320, 240));
            assert_eq!((out.width(), out.height()), (320, 240));
            assert_eq!(out.pixel(0, 0), Some(PANEL_COLOR));
        }

        let stats = session.read_stats();
        assert_eq!(stats.reps, 1);
        assert_eq!(stats.phase, ExercisePhase::Up);
        assert_eq!(stats.feedback, "Good Form");
        assert_eq!(processor.frames_processed(), 5);
    }

    #[test]
    fn no_detection_keeps_previous_state() {
        let script = vec![Ok(Some(with_elbow(80.0))), Ok(None), Ok(None)];
        let session = Arc::new(SessionController::default());
        let mut processor = FrameProcessor::new(Scripted(script.into_iter()), Arc::clone(&session));

        processor.process(Frame::blank(64, 48));
        let after_down = session.snapshot();
        processor.process(Frame::blank(64, 48));
        processor.process(Frame::blank(64, 48));
        assert_eq!(session.snapshot(), after_down);
    }
}
