//! Game state and core simulation types
//!
//! `GameState` owns every entity collection for one session. It is built
//! once and reset in place between runs.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::effects::{FloatingTextSystem, ParticleKind, ParticleSystem};
use super::obstacle::ObstacleManager;
use super::player::Player;
use super::token::TokenManager;
use crate::tuning::Tuning;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, nothing moves
    Menu,
    /// Active run
    Playing,
    /// Run ended by a crash
    GameOver,
}

/// Something the session controller or presentation may want to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Started,
    Jumped,
    TokenCollected { value: u32, at: Vec2 },
    PowerModeStarted,
    PowerModeEnded,
    /// Entered game over with the floored final score
    GameOver { final_score: u64 },
}

/// Particles per burst
pub const COLLECT_BURST: usize = 8;
pub const JUMP_BURST: usize = 5;
pub const ROCKET_BURST: usize = 15;
pub const EXPLOSION_BURST: usize = 20;

/// Floating "+value" text color
pub const SCORE_TEXT_COLOR: u32 = 0xFFD700;

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Real-valued score; display and persistence floor it
    pub score: f64,
    /// Tokens collected toward the next power mode
    pub coins: u32,
    /// Elapsed play time at power-mode activation, if active
    pub power_mode_since_ms: Option<f64>,
    pub game_speed: f32,
    /// Background scroll offset, wraps at `tuning.session.scroll_wrap`
    pub bg_offset: f32,
    /// Simulation ticks since the run started
    pub time_ticks: u64,
    /// Play clock (ms), advanced by one tick length per tick
    pub elapsed_ms: f64,
    pub player: Player,
    pub obstacles: ObstacleManager,
    pub tokens: TokenManager,
    pub particles: ParticleSystem,
    pub floating_texts: FloatingTextSystem,
    /// Events raised since the last drain
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a session in the menu phase
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let w = &tuning.world;
        let player = Player::new(&tuning.player, w.ground_y);
        let obstacles = ObstacleManager::new(&tuning.obstacles, w.width, w.ground_y);
        let tokens = TokenManager::new(&tuning.tokens, w.width, w.ground_y);
        let game_speed = tuning.session.speed.initial();
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Menu,
            score: 0.0,
            coins: 0,
            power_mode_since_ms: None,
            game_speed,
            bg_offset: 0.0,
            time_ticks: 0,
            elapsed_ms: 0.0,
            player,
            obstacles,
            tokens,
            particles: ParticleSystem::default(),
            floating_texts: FloatingTextSystem::new(true),
            events: Vec::new(),
            tuning,
        }
    }

    pub fn ground_y(&self) -> f32 {
        self.tuning.world.ground_y
    }

    /// Begin a run from the menu or after a game over, resetting everything.
    /// Ignored while already playing; returns whether a run started.
    pub fn start(&mut self) -> bool {
        if self.phase == GamePhase::Playing {
            return false;
        }

        self.score = 0.0;
        self.coins = 0;
        self.power_mode_since_ms = None;
        self.game_speed = self.tuning.session.speed.initial();
        self.bg_offset = 0.0;
        self.time_ticks = 0;
        self.elapsed_ms = 0.0;

        let spawn_x = self.tuning.player.spawn_x;
        let spawn_y = self.ground_y() - self.tuning.player.height;
        self.player.reset(spawn_x, spawn_y);
        self.obstacles.reset();
        self.tokens.reset();
        self.particles.clear();
        self.floating_texts.clear();

        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::Started);
        true
    }

    pub fn power_mode_active(&self) -> bool {
        self.power_mode_since_ms.is_some()
    }

    /// Milliseconds of power mode left (0 when inactive)
    pub fn power_mode_remaining_ms(&self) -> f64 {
        match self.power_mode_since_ms {
            Some(since) => {
                (self.tuning.session.power_mode_duration_ms - (self.elapsed_ms - since)).max(0.0)
            }
            None => 0.0,
        }
    }

    /// Score as shown to the player
    pub fn display_score(&self) -> u64 {
        self.score.max(0.0).floor() as u64
    }

    pub(crate) fn activate_power_mode(&mut self) {
        log::info!("Power mode activated at {:.0} ms", self.elapsed_ms);
        self.power_mode_since_ms = Some(self.elapsed_ms);
        self.coins = 0;
        let center = self.player.center();
        self.particles
            .emit(center, ParticleKind::Rocket, ROCKET_BURST, &mut self.rng);
        self.events.push(GameEvent::PowerModeStarted);
    }

    pub(crate) fn deactivate_power_mode(&mut self) {
        log::info!("Power mode ended at {:.0} ms", self.elapsed_ms);
        self.power_mode_since_ms = None;
        let center = self.player.center();
        self.particles
            .emit(center, ParticleKind::Explosion, EXPLOSION_BURST, &mut self.rng);
        let ground_y = self.ground_y();
        self.player.land(ground_y);
        self.events.push(GameEvent::PowerModeEnded);
    }

    /// Crash: freeze the world and report the final score. Idempotent.
    pub(crate) fn enter_game_over(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.phase = GamePhase::GameOver;
        let center = self.player.center();
        self.particles
            .emit(center, ParticleKind::Explosion, EXPLOSION_BURST, &mut self.rng);
        let final_score = self.display_score();
        log::info!("Game over with score {}", final_score);
        self.events.push(GameEvent::GameOver { final_score });
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
