//! Collectible tokens and their spawner

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::pool::Pool;
use crate::tuning::TokenTuning;

/// A collectible token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub pos: Vec2,
    pub size: Vec2,
    pub value: u32,
    pub active: bool,
    pub collected: bool,
}

impl Token {
    pub fn new(x: f32, y: f32, size: f32, value: u32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::splat(size),
            value,
            active: true,
            collected: false,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb {
            pos: self.pos,
            size: self.size,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn is_off_screen(&self) -> bool {
        self.pos.x + self.size.x < 0.0
    }

    /// Mark as collected. Returns the point value the first time only.
    pub fn collect(&mut self) -> Option<u32> {
        if self.collected || !self.active {
            return None;
        }
        self.collected = true;
        self.active = false;
        Some(self.value)
    }

    pub fn is_live(&self) -> bool {
        self.active && !self.collected
    }
}

/// Owns the token pool and spawn timing
#[derive(Debug, Clone)]
pub struct TokenManager {
    pool: Pool<Token>,
    last_spawn_ms: f64,
    spawn_x: f32,
    ground_y: f32,
    params: TokenTuning,
}

impl TokenManager {
    pub fn new(params: &TokenTuning, spawn_x: f32, ground_y: f32) -> Self {
        Self {
            pool: Pool::new(),
            last_spawn_ms: 0.0,
            spawn_x,
            ground_y,
            params: params.clone(),
        }
    }

    /// Spawn if due, then advance and sweep out collected or off-screen tokens
    pub fn update<R: Rng + ?Sized>(&mut self, game_speed: f32, now_ms: f64, rng: &mut R) {
        if now_ms - self.last_spawn_ms > self.params.interval_ms {
            self.spawn_token(rng);
            self.last_spawn_ms = now_ms;
        }

        let speed = self.params.speed;
        self.pool.retain_active(|token| {
            token.pos.x -= speed * game_speed;
            if token.is_off_screen() {
                token.active = false;
            }
            token.is_live()
        });
    }

    /// Spawn one token at the right edge, in the jump band or at ground level
    pub fn spawn_token<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let p = &self.params;
        let y = if rng.random::<f32>() < p.jump_band_chance {
            self.ground_y - rng.random_range(p.jump_band_min..=p.jump_band_max) as f32
        } else {
            self.ground_y - p.ground_offset
        };
        self.pool
            .spawn(Token::new(self.spawn_x, y, p.size, p.value))
    }

    /// Live tokens with their slot indices
    pub fn active_tokens(&self) -> impl Iterator<Item = (usize, &Token)> {
        self.pool.iter_active().filter(|(_, token)| token.is_live())
    }

    /// Collect the token in `slot`. Returns its value, or `None` if it was
    /// already collected or is not active.
    pub fn collect(&mut self, slot: usize) -> Option<u32> {
        self.pool.get_mut(slot).and_then(Token::collect)
    }

    pub fn token(&self, slot: usize) -> Option<&Token> {
        self.pool.get(slot)
    }

    /// Return every token to the pool and restart the spawn timer
    pub fn reset(&mut self) {
        self.pool.retain_active(|token| {
            token.active = false;
            false
        });
        self.last_spawn_ms = 0.0;
    }

    pub fn active_count(&self) -> usize {
        self.pool.active_len()
    }

    pub fn pooled_count(&self) -> usize {
        self.pool.free_len()
    }

    pub fn allocated(&self) -> usize {
        self.pool.capacity()
    }
}
