// Score module - Input judgment and the session score

pub mod scorer;
pub mod state;

pub use scorer::{HitScorer, judge_event};
pub use state::{Judgment, ScoreSnapshot, ScoreState};
