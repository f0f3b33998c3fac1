use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};
use uuid::Uuid;

use crate::exercise::{self, ExerciseKind, ExercisePhase, FrameOutcome, RepTracker, Transition};
use crate::landmarks::{JointAngles, LandmarkSet};
use crate::session::state::SessionState;

/// Snapshot handed to displays. Always taken under the lock in one piece.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct DisplayStats {
    pub exercise: ExerciseKind,
    pub phase: ExercisePhase,
    pub reps: u32,
    pub feedback: String,
}

/// Active exercise and its tracker as read in one critical section, with the switch count
/// they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerSnapshot {
    pub kind: ExerciseKind,
    pub tracker: RepTracker,
    pub generation: u64,
}

impl TrackerSnapshot {
    pub fn step(&self, angles: &JointAngles) -> FrameOutcome {
        FrameOutcome {
            generation: self.generation,
            ..exercise::step(self.kind, self.tracker, angles)
        }
    }
}

pub struct SessionController {
    id: Uuid,
    state: Mutex<SessionState>,
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new(ExerciseKind::PushUp)
    }
}

impl SessionController {
    pub fn new(initial: ExerciseKind) -> Self {
        let id = Uuid::new_v4();
        info!("Session {} created with {}", id, initial);
        Self {
            id,
            state: Mutex::new(SessionState::new(initial)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    // Critical sections only assign whole fields, so a poisoned guard is still consistent.
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes `kind` the active exercise, clearing every count. Returns `false` and changes
    /// nothing when `kind` is already active.
    pub fn select_exercise(&self, kind: ExerciseKind) -> bool {
        let changed = self.lock().switch_to(kind);
        if changed {
            info!("Session {} switched to {}", self.id, kind);
        }
        changed
    }

    pub fn active_exercise(&self) -> ExerciseKind {
        self.lock().active
    }

    pub fn read_stats(&self) -> DisplayStats {
        let state = self.lock();
        let tracker = state.tracker(state.active);
        DisplayStats {
            exercise: state.active,
            phase: tracker.phase,
            reps: tracker.reps,
            feedback: state.feedback.clone(),
        }
    }

    pub fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }

    pub fn active_tracker(&self) -> TrackerSnapshot {
        let state = self.lock();
        TrackerSnapshot {
            kind: state.active,
            tracker: state.tracker(state.active),
            generation: state.generation,
        }
    }

    /// Commits a frame's outcome in one critical section. Discarded, returning `false`,
    /// when any switch happened after the outcome's tracker was read, even one that came
    /// back to the same exercise.
    pub fn apply_frame_result(&self, outcome: &FrameOutcome) -> bool {
        let mut state = self.lock();
        if state.active != outcome.kind || state.generation != outcome.generation {
            warn!(
                "Session {} discarded stale {} frame result, active exercise is now {}",
                self.id, outcome.kind, state.active
            );
            return false;
        }

        *state.tracker_mut(outcome.kind) = outcome.tracker;
        if let Some(message) = &outcome.feedback {
            if state.feedback != *message {
                debug!("Session {} feedback: {}", self.id, message);
            }
            state.feedback.clone_from(message);
        }
        state.frames_committed += 1;
        true
    }

    /// Runs one frame of landmarks through the active exercise and commits the result.
    /// Returns the committed outcome; `None` when the landmarks lack a tracked joint or the
    /// exercise changed mid-frame.
    pub fn process_landmarks(&self, landmarks: &LandmarkSet) -> Option<FrameOutcome> {
        let angles = JointAngles::from_landmarks(landmarks)?;
        let outcome = self.active_tracker().step(&angles);

        if !self.apply_frame_result(&outcome) {
            return None;
        }
        if outcome.transition == Transition::CompletedRep {
            info!("{} rep {} completed", outcome.kind, outcome.tracker.reps);
        }
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::{GOING_TOO_DEEP, GOOD_FORM, KEEP_CHEST_UP};
    use crate::session::INITIAL_FEEDBACK;

    fn outcome(
        session: &SessionController,
        phase: ExercisePhase,
        reps: u32,
        feedback: Option<&str>,
    ) -> FrameOutcome {
        let snapshot = session.active_tracker();
        FrameOutcome {
            kind: snapshot.kind,
            tracker: RepTracker { phase, reps },
            transition: Transition::None,
            feedback: feedback.map(str::to_string),
            generation: snapshot.generation,
        }
    }

    fn push_up_reps(count: usize) -> Vec<JointAngles> {
        let mut readings = Vec::new();
        for _ in 0..count {
            readings.push(angles(80.0, 175.0, 175.0));
            readings.push(angles(170.0, 175.0, 175.0));
        }
        readings
    }

    fn angles(elbow: f64, hip: f64, knee: f64) -> JointAngles {
        JointAngles { elbow, hip, knee }
    }

    fn feed(session: &SessionController, readings: &[JointAngles]) {
        for a in readings {
            let outcome = session.active_tracker().step(a);
            assert!(session.apply_frame_result(&outcome));
        }
    }

    #[test]
    fn fresh_session_stats() {
        let session = SessionController::default();
        let stats = session.read_stats();
        assert_eq!(stats.exercise, ExerciseKind::PushUp);
        assert_eq!(stats.reps, 0);
        assert_eq!(stats.phase, ExercisePhase::Up);
        assert_eq!(stats.feedback, INITIAL_FEEDBACK);
    }

    #[test]
    fn push_up_sequence_counts_and_keeps_feedback_when_up() {
        let session = SessionController::default();
        feed(
            &session,
            &[
                angles(170.0, 175.0, 175.0),
                angles(80.0, 150.0, 175.0),
                angles(170.0, 175.0, 175.0),
            ],
        );
        let stats = session.read_stats();
        assert_eq!(stats.reps, 1);
        assert_eq!(stats.phase, ExercisePhase::Up);
        // last feedback came from the down frame and persists while up
        assert_eq!(stats.feedback, "Keep your back straight!");
    }

    #[test]
    fn squat_feedback_cases() {
        let session = SessionController::new(ExerciseKind::HalfSquat);
        feed(&session, &[angles(170.0, 170.0, 95.0)]);
        assert_eq!(session.read_stats().feedback, GOING_TOO_DEEP);
        feed(&session, &[angles(170.0, 140.0, 120.0)]);
        assert_eq!(session.read_stats().feedback, KEEP_CHEST_UP);
        feed(&session, &[angles(170.0, 170.0, 120.0)]);
        assert_eq!(session.read_stats().feedback, GOOD_FORM);
    }

    #[test]
    fn switching_resets_both_counters() {
        let session = SessionController::default();
        assert!(session.apply_frame_result(&outcome(&session, ExercisePhase::Up, 5, None)));

        assert!(session.select_exercise(ExerciseKind::HalfSquat));
        let state = session.snapshot();
        assert_eq!(state.tracker(ExerciseKind::PushUp).reps, 0);
        assert_eq!(state.tracker(ExerciseKind::HalfSquat).reps, 0);
        assert_eq!(session.read_stats().feedback, "Starting Half-Squats...");

        // squat counts a bit, switching back clears it again
        assert!(session.apply_frame_result(&outcome(&session, ExercisePhase::Up, 2, None)));
        assert!(session.select_exercise(ExerciseKind::PushUp));
        assert_eq!(session.snapshot().tracker(ExerciseKind::HalfSquat).reps, 0);
    }

    #[test]
    fn reselecting_active_exercise_changes_nothing() {
        let session = SessionController::default();
        session.apply_frame_result(&outcome(&session, ExercisePhase::Down, 3, Some(GOOD_FORM)));
        let before = session.snapshot();
        assert!(!session.select_exercise(ExerciseKind::PushUp));
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn stale_outcome_is_discarded() {
        let session = SessionController::default();
        let stale = session.active_tracker().step(&angles(80.0, 150.0, 175.0));

        session.select_exercise(ExerciseKind::HalfSquat);
        assert!(!session.apply_frame_result(&stale));

        let stats = session.read_stats();
        assert_eq!(stats.exercise, ExerciseKind::HalfSquat);
        assert_eq!(stats.feedback, "Starting Half-Squats...");
        assert_eq!(session.snapshot().tracker(ExerciseKind::PushUp).phase, ExercisePhase::Up);
        assert_eq!(session.snapshot().frames_committed, 0);
    }

    #[test]
    fn outcome_from_before_a_round_trip_switch_is_discarded() {
        let session = SessionController::default();
        feed(&session, &push_up_reps(3));
        assert_eq!(session.read_stats().reps, 3);

        let stale = session.active_tracker().step(&angles(80.0, 175.0, 175.0));
        assert!(session.select_exercise(ExerciseKind::HalfSquat));
        assert!(session.select_exercise(ExerciseKind::PushUp));

        assert!(!session.apply_frame_result(&stale));
        let stats = session.read_stats();
        assert_eq!(stats.exercise, ExerciseKind::PushUp);
        assert_eq!(stats.reps, 0);
        assert_eq!(stats.feedback, "Starting Push-ups...");

        // frames read after the switch commit normally
        feed(&session, &push_up_reps(1));
        assert_eq!(session.read_stats().reps, 1);
    }

    #[test]
    fn missing_landmarks_leave_state_alone() {
        let session = SessionController::default();
        assert!(session.process_landmarks(&LandmarkSet::new()).is_none());
        assert_eq!(session.snapshot(), SessionState::default());
    }
}
