//! Base Runner - A side-scrolling runner game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, collisions, game state)
//! - `session`: Session controller (game-over side effects, HUD telemetry)
//! - `render`: Draw-target abstraction and scene feeding
//! - `platform`: Browser/native platform abstraction
//! - `persistence`: High score and leaderboard storage
//! - `tuning`: Data-driven game balance

pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod render;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::{Leaderboard, LeaderboardEntry};
pub use session::{GameOverHooks, GameOverSummary, NoHooks, Session, Snapshot};
pub use settings::{QualityPreset, Settings};
pub use tuning::{SpeedPolicy, Tuning};

/// Game configuration constants
pub mod consts {
    /// Simulation ticks per second
    pub const TICK_RATE: f64 = 60.0;
    /// Length of one simulation tick in milliseconds
    pub const TICK_MS: f64 = 1000.0 / TICK_RATE;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 5;
    /// Largest frame delta the host feeds the accumulator (ms)
    pub const MAX_FRAME_MS: f64 = 100.0;

    /// Logical world dimensions (render surface coordinate space)
    pub const WORLD_WIDTH: f32 = 1000.0;
    pub const WORLD_HEIGHT: f32 = 600.0;
    /// Ground line y-coordinate
    pub const GROUND_Y: f32 = WORLD_HEIGHT - 50.0;
}
