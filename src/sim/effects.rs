//! Decorative particles and floating score text
//!
//! Both are short-lived and plentiful, so they are plain vectors that get
//! filtered every tick instead of pooled.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Downward velocity added to particles each tick
pub const PARTICLE_GRAVITY: f32 = 0.2;
/// Default cap on live particles
pub const MAX_PARTICLES: usize = 300;

/// Burst styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    /// Token pickup: small upward drift, fast fade
    Collect,
    /// Dust kicked up by a jump
    Jump,
    /// Power-mode ignition
    Rocket,
    /// Crash or power-mode end: omnidirectional, larger
    Explosion,
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub kind: ParticleKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub color: u32,
    /// 1.0 at birth, removed at or below 0
    pub life: f32,
    pub decay: f32,
}

impl Particle {
    fn spawn<R: Rng + ?Sized>(pos: Vec2, kind: ParticleKind, rng: &mut R) -> Self {
        let (vx, vy, size, color, decay) = match kind {
            ParticleKind::Collect => (
                rng.random_range(-2.0..2.0),
                rng.random_range(-3.0..-1.0),
                rng.random_range(3.0..6.0),
                0x0052FF,
                0.02,
            ),
            ParticleKind::Jump => (
                rng.random_range(-1.0..1.0),
                rng.random_range(-2.0..0.0),
                rng.random_range(2.0..4.0),
                0x3D7FFF,
                0.02,
            ),
            ParticleKind::Rocket => {
                let color = if rng.random_bool(0.5) { 0xFF6B00 } else { 0xFFD700 };
                (
                    rng.random_range(-4.0..4.0),
                    rng.random_range(-5.0..-2.0),
                    rng.random_range(4.0..8.0),
                    color,
                    0.015,
                )
            }
            ParticleKind::Explosion => (
                rng.random_range(-3.0..3.0),
                rng.random_range(-3.0..3.0),
                rng.random_range(4.0..8.0),
                0xFF4444,
                0.02,
            ),
        };
        Self {
            kind,
            pos,
            vel: Vec2::new(vx, vy),
            size,
            color,
            life: 1.0,
            decay,
        }
    }

    fn update(&mut self) {
        self.pos += self.vel;
        self.vel.y += PARTICLE_GRAVITY;
        self.life -= self.decay;
    }
}

/// Owns all live particles
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    max: usize,
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::new(MAX_PARTICLES)
    }
}

impl ParticleSystem {
    pub fn new(max: usize) -> Self {
        Self {
            particles: Vec::new(),
            max,
        }
    }

    /// Change the live-particle cap, dropping the oldest if over it
    pub fn set_max(&mut self, max: usize) {
        self.max = max;
        self.trim();
    }

    /// Emit a burst of `count` particles at `pos`
    pub fn emit<R: Rng + ?Sized>(
        &mut self,
        pos: Vec2,
        kind: ParticleKind,
        count: usize,
        rng: &mut R,
    ) {
        if self.max == 0 {
            return;
        }
        self.particles
            .extend((0..count).map(|_| Particle::spawn(pos, kind, rng)));
        self.trim();
    }

    fn trim(&mut self) {
        if self.particles.len() > self.max {
            let excess = self.particles.len() - self.max;
            self.particles.drain(..excess);
        }
    }

    pub fn update(&mut self) {
        for particle in &mut self.particles {
            particle.update();
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

/// Rising, fading score callout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingText {
    pub pos: Vec2,
    pub vel_y: f32,
    pub text: String,
    pub color: u32,
    pub life: f32,
    pub decay: f32,
    /// Grows from 1.0 to 1.5 as the text fades
    pub scale: f32,
}

impl FloatingText {
    pub fn new(pos: Vec2, text: impl Into<String>, color: u32) -> Self {
        Self {
            pos,
            vel_y: -2.0,
            text: text.into(),
            color,
            life: 1.0,
            decay: 0.02,
            scale: 1.0,
        }
    }

    fn update(&mut self) {
        self.pos.y += self.vel_y;
        self.vel_y *= 0.95;
        self.life -= self.decay;
        self.scale = 1.0 + (1.0 - self.life) * 0.5;
    }
}

/// Owns all live floating texts
#[derive(Debug, Clone)]
pub struct FloatingTextSystem {
    texts: Vec<FloatingText>,
    enabled: bool,
}

impl Default for FloatingTextSystem {
    fn default() -> Self {
        Self::new(true)
    }
}

impl FloatingTextSystem {
    pub fn new(enabled: bool) -> Self {
        Self {
            texts: Vec::new(),
            enabled,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.texts.clear();
        }
    }

    pub fn add(&mut self, pos: Vec2, text: impl Into<String>, color: u32) {
        if self.enabled {
            self.texts.push(FloatingText::new(pos, text, color));
        }
    }

    pub fn update(&mut self) {
        for text in &mut self.texts {
            text.update();
        }
        self.texts.retain(|t| t.life > 0.0);
    }

    pub fn clear(&mut self) {
        self.texts.clear();
    }

    pub fn texts(&self) -> &[FloatingText] {
        &self.texts
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_default_floating_text_is_enabled() {
        let mut texts = FloatingTextSystem::default();
        texts.add(Vec2::new(0.0, 0.0), "+10", 0xFFD700);
        assert_eq!(texts.len(), 1);
    }

    #[test]
    fn test_emit_and_decay() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ps = ParticleSystem::default();
        ps.emit(Vec2::new(10.0, 10.0), ParticleKind::Collect, 8, &mut rng);
        assert_eq!(ps.len(), 8);

        // decay 0.02 per tick: gone after 50 ticks
        for _ in 0..49 {
            ps.update();
        }
        assert_eq!(ps.len(), 8);
        ps.update();
        ps.update();
        assert!(ps.is_empty());
    }

    #[test]
    fn test_collect_drifts_up() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut ps = ParticleSystem::default();
        ps.emit(Vec2::ZERO, ParticleKind::Collect, 20, &mut rng);
        for p in ps.particles() {
            assert!(p.vel.y < 0.0);
            assert!(p.vel.x.abs() <= 2.0);
            assert_eq!(p.color, 0x0052FF);
        }
    }

    #[test]
    fn test_rocket_decays_slower() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut ps = ParticleSystem::default();
        ps.emit(Vec2::ZERO, ParticleKind::Rocket, 15, &mut rng);
        ps.emit(Vec2::ZERO, ParticleKind::Explosion, 20, &mut rng);
        for _ in 0..55 {
            ps.update();
        }
        assert!(ps.particles().iter().all(|p| p.kind == ParticleKind::Rocket));
        assert_eq!(ps.len(), 15);
    }

    #[test]
    fn test_gravity_bias() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut ps = ParticleSystem::default();
        ps.emit(Vec2::ZERO, ParticleKind::Explosion, 1, &mut rng);
        let vy = ps.particles()[0].vel.y;
        ps.update();
        assert!((ps.particles()[0].vel.y - (vy + PARTICLE_GRAVITY)).abs() < 1e-6);
    }

    #[test]
    fn test_cap_drops_oldest() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut ps = ParticleSystem::new(10);
        ps.emit(Vec2::ZERO, ParticleKind::Jump, 8, &mut rng);
        ps.emit(Vec2::ZERO, ParticleKind::Explosion, 8, &mut rng);
        assert_eq!(ps.len(), 10);
        assert_eq!(
            ps.particles()
                .iter()
                .filter(|p| p.kind == ParticleKind::Explosion)
                .count(),
            8
        );

        ps.set_max(0);
        assert!(ps.is_empty());
        ps.emit(Vec2::ZERO, ParticleKind::Jump, 8, &mut rng);
        assert!(ps.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut ps = ParticleSystem::default();
        ps.emit(Vec2::ZERO, ParticleKind::Explosion, 20, &mut rng);
        ps.clear();
        assert!(ps.is_empty());
    }

    #[test]
    fn test_floating_text_rises_and_grows() {
        let mut texts = FloatingTextSystem::new(true);
        texts.add(Vec2::new(50.0, 100.0), "+10", 0xFFD700);
        texts.update();
        let t = &texts.texts()[0];
        assert!(t.pos.y < 100.0);
        assert!(t.scale > 1.0);
        assert!((t.vel_y - (-1.9)).abs() < 1e-6);

        for _ in 0..60 {
            texts.update();
        }
        assert!(texts.is_empty());
    }

    #[test]
    fn test_floating_text_disabled() {
        let mut texts = FloatingTextSystem::new(false);
        texts.add(Vec2::ZERO, "+10", 0xFFD700);
        assert!(texts.is_empty());
    }
}
