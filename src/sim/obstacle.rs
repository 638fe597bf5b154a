//! Obstacles and their spawner
//!
//! Kinds are a closed enum with a static table of dimensions, speed, spawn
//! weight and ground attachment. The spawner picks a kind with a single
//! uniform draw walked over the cumulative weights.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::pool::Pool;
use crate::tuning::ObstacleTuning;

/// Obstacle types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Small airborne critter, slightly faster than the scroll
    Bug,
    /// Mid-sized airborne shape
    Glitch,
    /// Large airborne hazard, slower than the scroll
    RugPull,
    /// Broken block sitting on the ground line
    Block,
}

/// Static per-kind properties
#[derive(Debug, Clone, Copy)]
pub struct KindSpec {
    pub width: f32,
    pub height: f32,
    pub speed_multiplier: f32,
    /// Spawn probability; the weights of all kinds sum to 1
    pub weight: f32,
    /// Position is relative to the ground line rather than absolute
    pub grounded: bool,
    /// Presentation color (0xRRGGBB)
    pub color: u32,
}

impl ObstacleKind {
    /// All kinds, in cumulative-weight order
    pub const ALL: [ObstacleKind; 4] = [
        ObstacleKind::Bug,
        ObstacleKind::Glitch,
        ObstacleKind::Block,
        ObstacleKind::RugPull,
    ];

    pub const fn spec(self) -> KindSpec {
        match self {
            ObstacleKind::Bug => KindSpec {
                width: 35.0,
                height: 35.0,
                speed_multiplier: 1.15,
                weight: 0.40,
                grounded: false,
                color: 0xFF4444,
            },
            ObstacleKind::Glitch => KindSpec {
                width: 45.0,
                height: 50.0,
                speed_multiplier: 1.0,
                weight: 0.25,
                grounded: false,
                color: 0xFF00FF,
            },
            ObstacleKind::Block => KindSpec {
                width: 60.0,
                height: 45.0,
                speed_multiplier: 1.0,
                weight: 0.20,
                grounded: true,
                color: 0x666666,
            },
            ObstacleKind::RugPull => KindSpec {
                width: 70.0,
                height: 60.0,
                speed_multiplier: 0.85,
                weight: 0.15,
                grounded: false,
                color: 0xFF6600,
            },
        }
    }

    /// Map a uniform draw in [0, 1) onto a kind
    pub fn from_roll(roll: f32) -> ObstacleKind {
        let mut cumulative = 0.0;
        for kind in Self::ALL {
            cumulative += kind.spec().weight;
            if roll < cumulative {
                return kind;
            }
        }
        // Rounding in the weights can leave a sliver just below 1.0
        ObstacleKind::RugPull
    }
}

/// An obstacle entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    /// Top-left corner. For grounded kinds `pos.y` is the ground line and
    /// the box is resolved against it in [`Obstacle::bounds`].
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
    pub active: bool,
}

impl Obstacle {
    pub fn new(kind: ObstacleKind, x: f32, y: f32, speed: f32) -> Self {
        let spec = kind.spec();
        Self {
            kind,
            pos: Vec2::new(x, y),
            size: Vec2::new(spec.width, spec.height),
            speed,
            active: true,
        }
    }

    pub fn is_grounded(&self) -> bool {
        self.kind.spec().grounded
    }

    /// Ground-aware collision box
    pub fn bounds(&self, ground_y: f32) -> Aabb {
        let y = if self.is_grounded() {
            ground_y - self.size.y
        } else {
            self.pos.y
        };
        Aabb {
            pos: Vec2::new(self.pos.x, y),
            size: self.size,
        }
    }

    pub fn is_off_screen(&self) -> bool {
        self.pos.x + self.size.x < 0.0
    }
}

/// Owns the obstacle pool and the spawn/difficulty policy
#[derive(Debug, Clone)]
pub struct ObstacleManager {
    pool: Pool<Obstacle>,
    last_spawn_ms: f64,
    spawn_interval_ms: f64,
    spawn_x: f32,
    ground_y: f32,
    params: ObstacleTuning,
}

impl ObstacleManager {
    pub fn new(params: &ObstacleTuning, spawn_x: f32, ground_y: f32) -> Self {
        Self {
            pool: Pool::new(),
            last_spawn_ms: 0.0,
            spawn_interval_ms: params.base_interval_ms,
            spawn_x,
            ground_y,
            params: params.clone(),
        }
    }

    /// Spawn interval for a given score: shrinks with score, floored
    pub fn interval_for_score(&self, score: f64) -> f64 {
        (self.params.base_interval_ms - score * self.params.difficulty_factor)
            .max(self.params.min_interval_ms)
    }

    /// Spawn if due, then advance and recycle
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        game_speed: f32,
        now_ms: f64,
        score: f64,
        rng: &mut R,
    ) {
        self.spawn_interval_ms = self.interval_for_score(score);

        if now_ms - self.last_spawn_ms > self.spawn_interval_ms {
            self.spawn_obstacle(game_speed, rng);
            self.last_spawn_ms = now_ms;
        }

        self.pool.retain_active(|obstacle| {
            obstacle.pos.x -= obstacle.speed * game_speed;
            if obstacle.is_off_screen() {
                obstacle.active = false;
            }
            obstacle.active
        });
    }

    /// Spawn one obstacle at the right edge. Returns its slot index.
    pub fn spawn_obstacle<R: Rng + ?Sized>(&mut self, game_speed: f32, rng: &mut R) -> usize {
        let kind = ObstacleKind::from_roll(rng.random::<f32>());
        self.spawn_kind(kind, game_speed, rng)
    }

    /// Spawn a specific kind at the right edge
    pub fn spawn_kind<R: Rng + ?Sized>(
        &mut self,
        kind: ObstacleKind,
        game_speed: f32,
        rng: &mut R,
    ) -> usize {
        let spec = kind.spec();
        let y = if spec.grounded {
            self.ground_y
        } else {
            let offset = rng.random_range(self.params.air_offset_min..=self.params.air_offset_max);
            self.ground_y - offset as f32
        };
        let speed = self.params.base_speed * spec.speed_multiplier * game_speed;
        self.pool
            .spawn(Obstacle::new(kind, self.spawn_x, y, speed))
    }

    /// Active obstacles in spawn order
    pub fn active_obstacles(&self) -> impl Iterator<Item = &Obstacle> {
        self.pool
            .iter_active()
            .map(|(_, obstacle)| obstacle)
            .filter(|obstacle| obstacle.active)
    }

    /// Return every active obstacle to the pool and restart the spawn timer
    pub fn reset(&mut self) {
        self.pool.retain_active(|obstacle| {
            obstacle.active = false;
            false
        });
        self.last_spawn_ms = 0.0;
        self.spawn_interval_ms = self.params.base_interval_ms;
    }

    pub fn spawn_interval_ms(&self) -> f64 {
        self.spawn_interval_ms
    }

    pub fn active_count(&self) -> usize {
        self.pool.active_len()
    }

    pub fn pooled_count(&self) -> usize {
        self.pool.free_len()
    }

    /// Obstacles ever allocated
    pub fn allocated(&self) -> usize {
        self.pool.capacity()
    }

    /// Direct slot access, mainly for inspection
    pub fn slot(&self, index: usize) -> Option<&Obstacle> {
        self.pool.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{GROUND_Y, TICK_MS, WORLD_WIDTH};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn manager() -> ObstacleManager {
        ObstacleManager::new(&ObstacleTuning::default(), WORLD_WIDTH, GROUND_Y)
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total: f32 = ObstacleKind::ALL.iter().map(|k| k.spec().weight).sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_from_roll_boundaries() {
        assert_eq!(ObstacleKind::from_roll(0.0), ObstacleKind::Bug);
        assert_eq!(ObstacleKind::from_roll(0.39), ObstacleKind::Bug);
        assert_eq!(ObstacleKind::from_roll(0.41), ObstacleKind::Glitch);
        assert_eq!(ObstacleKind::from_roll(0.70), ObstacleKind::Block);
        assert_eq!(ObstacleKind::from_roll(0.90), ObstacleKind::RugPull);
        assert_eq!(ObstacleKind::from_roll(0.999_999), ObstacleKind::RugPull);
    }

    #[test]
    fn test_interval_scales_with_score() {
        let m = manager();
        assert_eq!(m.interval_for_score(0.0), 2000.0);
        assert_eq!(m.interval_for_score(2000.0), 1000.0);
        assert_eq!(m.interval_for_score(10_000.0), 800.0);
    }

    #[test]
    fn test_interval_recomputed_on_update() {
        let mut m = manager();
        let mut rng = Pcg32::seed_from_u64(1);
        m.update(1.0, 0.0, 2000.0, &mut rng);
        assert_eq!(m.spawn_interval_ms(), 1000.0);
    }

    #[test]
    fn test_spawns_after_interval_elapses() {
        let mut m = manager();
        let mut rng = Pcg32::seed_from_u64(7);
        m.update(1.0, 2000.0, 0.0, &mut rng);
        assert_eq!(m.active_count(), 0, "interval must be strictly exceeded");
        m.update(1.0, 2000.0 + TICK_MS, 0.0, &mut rng);
        assert_eq!(m.active_count(), 1);
        m.update(1.0, 2100.0, 0.0, &mut rng);
        assert_eq!(m.active_count(), 1);
    }

    #[test]
    fn test_grounded_kind_resolves_against_ground() {
        let mut m = manager();
        let mut rng = Pcg32::seed_from_u64(3);
        m.spawn_kind(ObstacleKind::Block, 1.0, &mut rng);
        let obstacle = m.active_obstacles().next().unwrap();
        assert_eq!(obstacle.pos.y, GROUND_Y);
        let bounds = obstacle.bounds(GROUND_Y);
        assert_eq!(bounds.bottom(), GROUND_Y);
        assert_eq!(bounds.pos.x, WORLD_WIDTH);
    }

    #[test]
    fn test_airborne_offset_range() {
        let mut m = manager();
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..50 {
            m.spawn_kind(ObstacleKind::Bug, 1.0, &mut rng);
        }
        for obstacle in m.active_obstacles() {
            assert!(obstacle.pos.y >= GROUND_Y - 80.0 && obstacle.pos.y <= GROUND_Y - 40.0);
        }
    }

    #[test]
    fn test_moves_left_and_recycles_off_screen() {
        let mut m = manager();
        let mut rng = Pcg32::seed_from_u64(5);
        m.spawn_kind(ObstacleKind::Glitch, 1.0, &mut rng);
        let mut last_x = WORLD_WIDTH;
        let mut ticks = 0;
        while m.active_count() > 0 {
            // Far in the past so nothing new spawns
            m.update(1.0, 0.0, 0.0, &mut rng);
            if let Some(o) = m.active_obstacles().next() {
                assert!(o.pos.x < last_x);
                last_x = o.pos.x;
            }
            ticks += 1;
            assert!(ticks < 1000);
        }
        assert_eq!(m.pooled_count(), 1);
        assert_eq!(m.allocated(), 1);
    }

    #[test]
    fn test_reset_then_spawn_reuses_slot() {
        let mut m = manager();
        let mut rng = Pcg32::seed_from_u64(9);
        let first = m.spawn_kind(ObstacleKind::Bug, 1.0, &mut rng);
        let second = m.spawn_kind(ObstacleKind::RugPull, 1.0, &mut rng);
        m.reset();
        assert_eq!(m.active_count(), 0);
        assert_eq!(m.pooled_count(), 2);

        let reused = m.spawn_kind(ObstacleKind::Block, 2.0, &mut rng);
        assert!(reused == first || reused == second);
        assert_eq!(m.allocated(), 2, "no new allocation while the pool has slots");
        let obstacle = m.slot(reused).unwrap();
        assert_eq!(obstacle.kind, ObstacleKind::Block);
        assert_eq!(obstacle.pos.x, WORLD_WIDTH);
        assert!(obstacle.active);
        assert_eq!(obstacle.speed, 5.0 * 2.0);
    }

    proptest! {
        #[test]
        fn prop_pool_conservation(
            seed in any::<u64>(),
            steps in 1usize..600,
            score in 0.0f64..5000.0
        ) {
            let mut m = manager();
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut max_allocated = 0;
            for step in 0..steps {
                let before = m.active_count() + m.pooled_count();
                m.update(1.1, step as f64 * TICK_MS, score, &mut rng);
                let after = m.active_count() + m.pooled_count();
                prop_assert!(after >= before);
                prop_assert_eq!(after, m.allocated());
                prop_assert!(m.allocated() >= max_allocated);
                max_allocated = m.allocated();
            }
            m.reset();
            prop_assert_eq!(m.active_count(), 0);
            prop_assert_eq!(m.pooled_count(), m.allocated());
        }
    }
}
