use std::collections::HashMap;

use crate::exercise::{ExerciseKind, RepTracker};

pub const INITIAL_FEEDBACK: &str = "Start your exercise!";

/// Mutable aggregate shared by the session's actors. Only reachable through
/// `SessionController`'s lock.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub active: ExerciseKind,
    pub trackers: HashMap<ExerciseKind, RepTracker>,
    pub feedback: String,
    pub frames_committed: u64,
    /// Bumped by every switch. Frame results computed against an older value are stale.
    pub generation: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(ExerciseKind::PushUp)
    }
}

impl SessionState {
    pub fn new(active: ExerciseKind) -> Self {
        Self {
            active,
            trackers: ExerciseKind::ALL
                .iter()
                .map(|kind| (*kind, RepTracker::default()))
                .collect(),
            feedback: INITIAL_FEEDBACK.to_string(),
            frames_committed: 0,
            generation: 0,
        }
    }

    pub fn tracker(&self, kind: ExerciseKind) -> RepTracker {
        self.trackers.get(&kind).copied().unwrap_or_default()
    }

    pub fn tracker_mut(&mut self, kind: ExerciseKind) -> &mut RepTracker {
        self.trackers.entry(kind).or_default()
    }

    /// Switches the active exercise. Every kind's count is cleared, not only the new one's.
    /// Returns `false` when `kind` is already active.
    pub fn switch_to(&mut self, kind: ExerciseKind) -> bool {
        if self.active == kind {
            return false;
        }
        self.active = kind;
        for tracker in self.trackers.values_mut() {
            tracker.reset_count();
        }
        self.feedback = kind.starting_message();
        self.generation += 1;
        true
    }
}
