use crate::types::Difficulty;

pub const TICK_MS: u64 = 150;

pub const PELLET_POINTS: i32 = 10;
pub const POWER_PELLET_POINTS: i32 = 50;
pub const GHOST_POINTS: i32 = 200;

pub const MAX_HIGH_SCORES: usize = 5;

/// Render hint per spawn slot: the first ghost is the red chaser, the rest
/// are random walkers.
pub const GHOST_COLORS: [&str; 4] = ["red", "pink", "cyan", "orange"];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultyParams {
    /// Stored per ghost and exposed in views; movement is one tile per tick
    /// regardless of this value.
    pub ghost_speed: f32,
    /// Power mode and ghost frightened duration, in ticks.
    pub power_duration_ticks: u32,
}

pub fn get_difficulty_params(difficulty: Difficulty) -> DifficultyParams {
    match difficulty {
        Difficulty::Easy => DifficultyParams {
            ghost_speed: 0.15,
            power_duration_ticks: 450,
        },
        Difficulty::Medium => DifficultyParams {
            ghost_speed: 0.2,
            power_duration_ticks: 300,
        },
        Difficulty::Hard => DifficultyParams {
            ghost_speed: 0.25,
            power_duration_ticks: 150,
        },
    }
}
