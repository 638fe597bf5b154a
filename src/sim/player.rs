//! The runner

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::tuning::PlayerTuning;

/// The player-controlled body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub vel_y: f32,
    pub on_ground: bool,
    pub jumping: bool,
    pub power_mode: bool,
    params: PlayerTuning,
}

impl Player {
    /// Create a player standing on the ground line
    pub fn new(params: &PlayerTuning, ground_y: f32) -> Self {
        let mut player = Self {
            pos: Vec2::ZERO,
            size: Vec2::new(params.width, params.height),
            vel_y: 0.0,
            on_ground: true,
            jumping: false,
            power_mode: false,
            params: params.clone(),
        };
        player.reset(params.spawn_x, ground_y - params.height);
        player
    }

    /// Advance one tick of vertical physics
    pub fn update(&mut self, ground_y: f32, power_mode: bool) {
        self.power_mode = power_mode;
        let p = &self.params;

        if power_mode {
            self.vel_y += p.thrust;
            self.vel_y += p.gravity * p.thrust_gravity_scale;
            // Keep climbing instead of oscillating
            if self.vel_y > p.min_ascent_speed {
                self.vel_y = p.ascent_speed;
            }
            self.pos.y += self.vel_y;

            let min_y = p.sky_min_y;
            let max_y = ground_y - self.size.y - p.sky_margin;
            if self.pos.y < min_y {
                self.pos.y = min_y;
                self.vel_y = 0.0;
            } else if self.pos.y > max_y {
                self.pos.y = max_y;
                self.vel_y = p.ascent_speed;
            }

            self.on_ground = false;
        } else {
            self.vel_y += p.gravity;
            self.pos.y += self.vel_y;

            let floor = ground_y - self.size.y;
            if self.pos.y >= floor {
                self.pos.y = floor;
                self.vel_y = 0.0;
                self.on_ground = true;
                self.jumping = false;
            } else {
                self.on_ground = false;
            }
        }
    }

    /// Jump if standing on the ground. Returns whether the jump happened.
    pub fn jump(&mut self) -> bool {
        if !self.on_ground || self.jumping {
            return false;
        }
        self.vel_y = self.params.jump_impulse;
        self.jumping = true;
        self.on_ground = false;
        true
    }

    /// Put the player back on the ground line with no vertical motion
    pub fn land(&mut self, ground_y: f32) {
        self.pos.y = ground_y - self.size.y;
        self.vel_y = 0.0;
        self.on_ground = true;
        self.jumping = false;
        self.power_mode = false;
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

    /// Restore spawn position and clear all motion and mode flags
    pub fn reset(&mut self, x: f32, y: f32) {
        self.pos = Vec2::new(x, y);
        self.vel_y = 0.0;
        self.on_ground = true;
        self.jumping = false;
        self.power_mode = false;
    }
}
