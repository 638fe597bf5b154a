//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by pool slot)
//! - No rendering or platform dependencies

pub mod collision;
pub mod effects;
pub mod obstacle;
pub mod player;
pub mod pool;
pub mod state;
pub mod tick;
pub mod token;

pub use collision::{Aabb, intersects};
pub use effects::{FloatingText, FloatingTextSystem, Particle, ParticleKind, ParticleSystem};
pub use obstacle::{KindSpec, Obstacle, ObstacleKind, ObstacleManager};
pub use player::Player;
pub use pool::Pool;
pub use state::{GameEvent, GamePhase, GameState};
pub use tick::{TickInput, tick};
pub use token::{Token, TokenManager};
