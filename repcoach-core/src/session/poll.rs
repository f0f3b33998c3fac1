use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio::time::{MissedTickBehavior, interval};

use crate::session::{DisplayStats, SessionController};

/// Reads the session's stats every `period` and hands them to `on_stats` until it breaks.
/// The first read happens immediately.
pub async fn poll_stats<F>(session: Arc<SessionController>, period: Duration, mut on_stats: F)
where
    F: FnMut(DisplayStats) -> ControlFlow<()>,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut polls: u64 = 0;

    loop {
        ticker.tick().await;
        polls += 1;
        if on_stats(session.read_stats()).is_break() {
            break;
        }
    }
    debug!("Stats poll for session {} stopped after {} reads", session.id(), polls);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::ExerciseKind;

    #[tokio::test(start_paused = true)]
    async fn polls_until_break() {
        let session = Arc::new(SessionController::default());
        let mut seen = Vec::new();
        poll_stats(session, Duration::from_millis(100), |stats| {
            seen.push(stats.reps);
            if seen.len() == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .await;
        assert_eq!(seen, vec![0, 0, 0]);
    }

    #[tokio::test(start_paused = true)]
    async fn observes_exercise_switch() {
        let session = Arc::new(SessionController::default());
        let control = Arc::clone(&session);
        let mut exercises = Vec::new();
        poll_stats(session, Duration::from_millis(100), |stats| {
            exercises.push(stats.exercise);
            if exercises.len() == 1 {
                control.select_exercise(ExerciseKind::HalfSquat);
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(())
            }
        })
        .await;
        assert_eq!(exercises, vec![ExerciseKind::PushUp, ExerciseKind::HalfSquat]);
    }
}
