//! Session module for the live exercise session.
//!
//! All three actors (frame processing, the stats poll loop and exercise selection) go
//! through the one `SessionController`, which guards the whole `SessionState` with a
//! single lock.

mod controller;
mod poll;
mod state;

pub use controller::{DisplayStats, SessionController, TrackerSnapshot};
pub use poll::poll_stats;
pub use state::{INITIAL_FEEDBACK, SessionState};
