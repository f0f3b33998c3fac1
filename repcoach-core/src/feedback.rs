//! Form feedback rules. Each exercise has an ordered rule table; the first matching rule
//! supplies the message. Rules are only consulted while the exercise is in its down phase.

use crate::exercise::{ExerciseKind, ExercisePhase};
use crate::landmarks::JointAngles;

pub const GOOD_FORM: &str = "Good Form";
pub const KEEP_BACK_STRAIGHT: &str = "Keep your back straight!";
pub const GOING_TOO_DEEP: &str = "Going too deep!";
pub const KEEP_CHEST_UP: &str = "Keep your chest up!";

pub struct FeedbackRule {
    pub applies: fn(&JointAngles) -> bool,
    pub message: &'static str,
}

pub const PUSH_UP_RULES: &[FeedbackRule] = &[
    FeedbackRule {
        applies: |a| a.hip < 160.0,
        message: KEEP_BACK_STRAIGHT,
    },
    FeedbackRule {
        applies: |_| true,
        message: GOOD_FORM,
    },
];

pub const HALF_SQUAT_RULES: &[FeedbackRule] = &[
    FeedbackRule {
        applies: |a| a.knee < 100.0,
        message: GOING_TOO_DEEP,
    },
    FeedbackRule {
        applies: |a| a.hip < 160.0,
        message: KEEP_CHEST_UP,
    },
    FeedbackRule {
        applies: |_| true,
        message: GOOD_FORM,
    },
];

pub fn rules_for(kind: ExerciseKind) -> &'static [FeedbackRule] {
    match kind {
        ExerciseKind::PushUp => PUSH_UP_RULES,
        ExerciseKind::HalfSquat => HALF_SQUAT_RULES,
    }
}

/// First-match-wins over `rules`.
pub fn first_match(rules: &[FeedbackRule], angles: &JointAngles) -> Option<&'static str> {
    rules
        .iter()
        .find(|rule| (rule.applies)(angles))
        .map(|rule| rule.message)
}

/// Message for the current frame, or `None` while the exercise is up.
pub fn evaluate(
    kind: ExerciseKind,
    phase: ExercisePhase,
    angles: &JointAngles,
) -> Option<&'static str> {
    match phase {
        ExercisePhase::Up => None,
        ExercisePhase::Down => first_match(rules_for(kind), angles),
    }
}

pub fn is_good_form(message: &str) -> bool {
    message == GOOD_FORM
}

#[cfg(test)]
mod tests {
    use super::*;

    fn angles(hip: f64, knee: f64) -> JointAngles {
        JointAngles {
            elbow: 120.0,
            hip,
            knee,
        }
    }

    fn squat_down(hip: f64, knee: f64) -> Option<&'static str> {
        evaluate(ExerciseKind::HalfSquat, ExercisePhase::Down, &angles(hip, knee))
    }

    #[test]
    fn squat_rules_in_order() {
        assert_eq!(squat_down(170.0, 95.0), Some(GOING_TOO_DEEP));
        // too deep wins even when the chest is also down
        assert_eq!(squat_down(140.0, 95.0), Some(GOING_TOO_DEEP));
        assert_eq!(squat_down(140.0, 120.0), Some(KEEP_CHEST_UP));
        assert_eq!(squat_down(170.0, 120.0), Some(GOOD_FORM));
        assert_eq!(squat_down(170.0, 100.0), Some(GOOD_FORM));
    }

    #[test]
    fn push_up_back_check() {
        let down = |hip| evaluate(ExerciseKind::PushUp, ExercisePhase::Down, &angles(hip, 170.0));
        assert_eq!(down(150.0), Some(KEEP_BACK_STRAIGHT));
        assert_eq!(down(160.0), Some(GOOD_FORM));
        assert_eq!(down(178.0), Some(GOOD_FORM));
    }

    #[test]
    fn silent_while_up() {
        for kind in ExerciseKind::ALL {
            assert_eq!(evaluate(kind, ExercisePhase::Up, &angles(90.0, 90.0)), None);
        }
    }

    #[test]
    fn every_table_ends_with_a_catch_all() {
        let nan = JointAngles {
            elbow: f64::NAN,
            hip: f64::NAN,
            knee: f64::NAN,
        };
        for kind in ExerciseKind::ALL {
            assert_eq!(first_match(rules_for(kind), &nan), Some(GOOD_FORM));
        }
    }
}
