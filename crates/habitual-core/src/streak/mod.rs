mod engine;

pub use engine::{evaluate_check_in, replay, CheckInOutcome, StreakState, StreakStatus};
