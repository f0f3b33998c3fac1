//! Draws the rep counter, form feedback and detected skeleton onto outgoing frames.

mod font;
mod frame;

pub use font::{draw_text, text_width};
pub use frame::{Bgr, Frame};

use crate::feedback::is_good_form;
use crate::landmarks::{LandmarkSet, POSE_CONNECTIONS};
use crate::session::DisplayStats;

pub const PANEL_COLOR: Bgr = Bgr(245, 117, 16);
pub const LANDMARK_COLOR: Bgr = Bgr(245, 117, 66);
pub const CONNECTION_COLOR: Bgr = Bgr(245, 66, 230);

pub const REPS_BOX_RIGHT: i64 = 225;
pub const REPS_BOX_BOTTOM: i64 = 73;
pub const FEEDBACK_STRIP_HEIGHT: i64 = 70;

const LABEL_SCALE: i64 = 2;
const COUNT_SCALE: i64 = 7;
const MESSAGE_SCALE: i64 = 4;
const SKELETON_THICKNESS: i64 = 2;
const LANDMARK_RADIUS: i64 = 2;

pub fn feedback_color(message: &str) -> Bgr {
    if is_good_form(message) {
        Bgr::GREEN
    } else {
        Bgr::RED
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Annotator;

impl Annotator {
    pub fn new() -> Self {
        Self
    }

    /// Dots on each landmark and lines along the limb connections.
    pub fn draw_skeleton(&self, frame: &mut Frame, landmarks: &LandmarkSet) {
        // `as` saturates, so far-away points land on the i64 range and get clipped later
        let to_pixel = |x: f64, y: f64| -> Option<(i64, i64)> {
            let (px, py) = (x * frame.width() as f64, y * frame.height() as f64);
            if !px.is_finite() || !py.is_finite() {
                return None;
            }
            Some((px.round() as i64, py.round() as i64))
        };

        let lines: Vec<_> = POSE_CONNECTIONS
            .iter()
            .filter_map(|(from, to)| {
                let a = landmarks.get(*from)?;
                let b = landmarks.get(*to)?;
                Some((to_pixel(a.x, a.y)?, to_pixel(b.x, b.y)?))
            })
            .collect();
        let dots: Vec<_> = landmarks
            .iter()
            .filter_map(|(_, p)| to_pixel(p.x, p.y))
            .collect();

        for (from, to) in lines {
            frame.draw_line(from, to, SKELETON_THICKNESS, CONNECTION_COLOR);
        }
        for (x, y) in dots {
            frame.fill_circle(x, y, LANDMARK_RADIUS, LANDMARK_COLOR);
        }
    }

    /// Reps box in the top-left corner and a full-width feedback strip along the bottom.
    pub fn draw_stats(&self, frame: &mut Frame, stats: &DisplayStats) {
        let width = frame.width() as i64;
        let height = frame.height() as i64;

        frame.fill_rect(0, 0, REPS_BOX_RIGHT, REPS_BOX_BOTTOM, PANEL_COLOR);
        draw_text(frame, "REPS", 15, 20, LABEL_SCALE, Bgr::BLACK);
        draw_text(frame, &stats.reps.to_string(), 10, 60, COUNT_SCALE, Bgr::WHITE);

        let strip_top = height - FEEDBACK_STRIP_HEIGHT;
        frame.fill_rect(0, strip_top, width - 1, height - 1, PANEL_COLOR);
        draw_text(frame, "FEEDBACK", 15, height - 50, LABEL_SCALE, Bgr::BLACK);
        draw_text(
            frame,
            &stats.feedback,
            10,
            height - 20,
            MESSAGE_SCALE,
            feedback_color(&stats.feedback),
        );
    }

    pub fn annotate(&self, frame: &mut Frame, landmarks: Option<&LandmarkSet>, stats: &DisplayStats) {
        if let Some(landmarks) = landmarks {
            self.draw_skeleton(frame, landmarks);
        }
        self.draw_stats(frame, stats);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::{ExerciseKind, ExercisePhase};
    use crate::geometry::Point2D;
    use crate::landmarks::Joint;

    fn stats(reps: u32, feedback: &str) -> DisplayStats {
        DisplayStats {
            exercise: ExerciseKind::PushUp,
            phase: ExercisePhase::Down,
            reps,
            feedback: feedback.to_string(),
        }
    }

    fn count(frame: &Frame, color: Bgr) -> usize {
        let mut n = 0;
        for y in 0..frame.height() {
            for x in 0..frame.width() {
                if frame.pixel(x, y) == Some(color) {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn overlay_regions() {
        let mut frame = Frame::blank(640, 480);
        Annotator::new().draw_stats(&mut frame, &stats(3, "Good Form"));

        assert_eq!(frame.width(), 640);
        assert_eq!(frame.height(), 480);
        assert_eq!(frame.pixel(200, 5), Some(PANEL_COLOR));
        assert_eq!(frame.pixel(226, 5), Some(Bgr::BLACK));
        assert_eq!(frame.pixel(639, 470), Some(PANEL_COLOR));
        assert_eq!(frame.pixel(639, 409), Some(Bgr::BLACK));
        assert_eq!(frame.pixel(320, 200), Some(Bgr::BLACK));
    }

    #[test]
    fn feedback_colour_depends_on_exact_message() {
        let mut good = Frame::blank(640, 480);
        Annotator::new().draw_stats(&mut good, &stats(0, "Good Form"));
        assert!(count(&good, Bgr::GREEN) > 0);
        assert_eq!(count(&good, Bgr::RED), 0);

        let mut bad = Frame::blank(640, 480);
        Annotator::new().draw_stats(&mut bad, &stats(0, "Good form"));
        assert!(count(&bad, Bgr::RED) > 0);
        assert_eq!(count(&bad, Bgr::GREEN), 0);
    }

    #[test]
    fn tiny_frames_are_clipped_not_rejected() {
        let mut frame = Frame::blank(32, 24);
        Annotator::new().annotate(&mut frame, None, &stats(12, "Keep your chest up!"));
        assert_eq!(frame.data().len(), 32 * 24 * 3);
    }

    #[test]
    fn skeleton_lands_on_landmarks() {
        let landmarks = LandmarkSet::new()
            .with(Joint::LeftShoulder, Point2D::new(0.5, 0.5))
            .with(Joint::LeftElbow, Point2D::new(0.75, 0.5));
        let mut frame = Frame::blank(100, 100);
        Annotator::new().draw_skeleton(&mut frame, &landmarks);
        assert_eq!(frame.pixel(50, 50), Some(LANDMARK_COLOR));
        assert_eq!(frame.pixel(62, 50), Some(CONNECTION_COLOR));
        assert_eq!(frame.pixel(10, 10), Some(Bgr::BLACK));
    }

    #[test]
    fn wild_landmarks_are_clipped_quickly() {
        let started = std::time::Instant::now();
        for (elbow_x, width, height) in [(f64::MAX, 64, 48), (2e5, 640, 480), (-2e5, 640, 480)] {
            let landmarks = LandmarkSet::new()
                .with(Joint::LeftShoulder, Point2D::new(0.5, 0.5))
                .with(Joint::LeftElbow, Point2D::new(elbow_x, 0.5));
            let mut frame = Frame::blank(width, height);
            Annotator::new().draw_skeleton(&mut frame, &landmarks);
            assert_eq!(frame.pixel(width / 2, height / 2), Some(LANDMARK_COLOR));
        }
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
    }

    #[test]
    fn non_finite_landmarks_are_skipped() {
        let landmarks = LandmarkSet::new()
            .with(Joint::LeftShoulder, Point2D::new(f64::NAN, 0.5))
            .with(Joint::LeftElbow, Point2D::new(0.5, f64::INFINITY));
        let mut frame = Frame::blank(40, 40);
        Annotator::new().draw_skeleton(&mut frame, &landmarks);
        assert_eq!(frame, Frame::blank(40, 40));
    }
}
