//! Data-driven game balance
//!
//! Every number the simulation uses lives here so a run can be rebalanced
//! from JSON without touching the sim code. Defaults reproduce the shipped
//! game feel.

use anyhow::{Context, ensure};
use serde::{Deserialize, Serialize};

use crate::consts::{GROUND_Y, WORLD_HEIGHT, WORLD_WIDTH};

/// How the global game speed evolves while playing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SpeedPolicy {
    /// Same speed for the whole run
    Constant { speed: f32 },
    /// Linear ramp from `initial`, capped at `max`
    Ramp {
        initial: f32,
        per_second: f32,
        max: f32,
    },
}

impl Default for SpeedPolicy {
    fn default() -> Self {
        SpeedPolicy::Constant { speed: 1.10 }
    }
}

impl SpeedPolicy {
    /// Game speed at session start
    pub fn initial(&self) -> f32 {
        match *self {
            SpeedPolicy::Constant { speed } => speed,
            SpeedPolicy::Ramp { initial, .. } => initial,
        }
    }

    /// Game speed after `elapsed_ms` of play
    pub fn speed_at(&self, elapsed_ms: f64) -> f32 {
        match *self {
            SpeedPolicy::Constant { speed } => speed,
            SpeedPolicy::Ramp {
                initial,
                per_second,
                max,
            } => (initial + per_second * (elapsed_ms / 1000.0) as f32).min(max),
        }
    }
}

/// Logical world geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    pub width: f32,
    pub height: f32,
    pub ground_y: f32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            width: WORLD_WIDTH,
            height: WORLD_HEIGHT,
            ground_y: GROUND_Y,
        }
    }
}

/// Player body and physics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub spawn_x: f32,
    pub width: f32,
    pub height: f32,
    /// Downward acceleration per tick
    pub gravity: f32,
    /// Vertical velocity set by a jump (negative is up)
    pub jump_impulse: f32,
    /// Upward thrust added each tick in power mode
    pub thrust: f32,
    /// Fraction of gravity still applied in power mode
    pub thrust_gravity_scale: f32,
    /// Top of the power-mode sky band
    pub sky_min_y: f32,
    /// Clearance kept above the ground in power mode
    pub sky_margin: f32,
    /// Velocity above this (i.e. too slow upward) is reset to `ascent_speed`
    pub min_ascent_speed: f32,
    pub ascent_speed: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            spawn_x: 100.0,
            width: 45.0,
            height: 60.0,
            gravity: 0.8,
            jump_impulse: -15.0,
            thrust: -12.0,
            thrust_gravity_scale: 0.1,
            sky_min_y: 50.0,
            sky_margin: 20.0,
            min_ascent_speed: -5.0,
            ascent_speed: -8.0,
        }
    }
}

/// Obstacle spawning and difficulty
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleTuning {
    pub base_interval_ms: f64,
    pub min_interval_ms: f64,
    /// Milliseconds removed from the spawn interval per point of score
    pub difficulty_factor: f64,
    pub base_speed: f32,
    /// Airborne obstacles spawn this far above the ground line (inclusive range)
    pub air_offset_min: u32,
    pub air_offset_max: u32,
}

impl Default for ObstacleTuning {
    fn default() -> Self {
        Self {
            base_interval_ms: 2000.0,
            min_interval_ms: 800.0,
            difficulty_factor: 0.5,
            base_speed: 5.0,
            air_offset_min: 40,
            air_offset_max: 80,
        }
    }
}

/// Token spawning and value
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenTuning {
    pub interval_ms: f64,
    pub size: f32,
    pub value: u32,
    pub speed: f32,
    /// Probability that a token spawns in the jump band rather than at ground level
    pub jump_band_chance: f32,
    pub jump_band_min: u32,
    pub jump_band_max: u32,
    pub ground_offset: f32,
}

impl Default for TokenTuning {
    fn default() -> Self {
        Self {
            interval_ms: 1500.0,
            size: 30.0,
            value: 10,
            speed: 5.0,
            jump_band_chance: 0.6,
            jump_band_min: 50,
            jump_band_max: 70,
            ground_offset: 25.0,
        }
    }
}

/// Session-level rules: pace, scoring, power mode
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionTuning {
    pub speed: SpeedPolicy,
    pub scroll_base_speed: f32,
    pub scroll_factor: f32,
    pub scroll_wrap: f32,
    /// Survival score per tick, multiplied by game speed
    pub survival_rate: f64,
    pub coins_for_power_mode: u32,
    pub power_mode_duration_ms: f64,
}

impl Default for SessionTuning {
    fn default() -> Self {
        Self {
            speed: SpeedPolicy::default(),
            scroll_base_speed: 8.8,
            scroll_factor: 0.5,
            scroll_wrap: 40.0,
            survival_rate: 0.1,
            coins_for_power_mode: 5,
            power_mode_duration_ms: 2500.0,
        }
    }
}

/// Complete balance table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub world: WorldTuning,
    pub player: PlayerTuning,
    pub obstacles: ObstacleTuning,
    pub tokens: TokenTuning,
    pub session: SessionTuning,
}

impl Tuning {
    /// Parse overrides from JSON (missing fields keep their defaults)
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let tuning: Tuning = serde_json::from_str(json).context("invalid tuning JSON")?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject tables the simulation cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        let w = &self.world;
        ensure!(
            w.width > 0.0 && w.height > 0.0,
            "world size must be positive (got {}x{})",
            w.width,
            w.height
        );
        ensure!(
            w.ground_y > 0.0 && w.ground_y <= w.height,
            "ground line {} must lie inside the world height {}",
            w.ground_y,
            w.height
        );

        let p = &self.player;
        ensure!(
            p.width > 0.0 && p.height > 0.0,
            "player size must be positive"
        );
        ensure!(
            [
                p.spawn_x,
                p.gravity,
                p.jump_impulse,
                p.thrust,
                p.thrust_gravity_scale,
                p.sky_min_y,
                p.sky_margin,
                p.min_ascent_speed,
                p.ascent_speed,
            ]
            .iter()
            .all(|v| v.is_finite()),
            "player tuning contains a non-finite value"
        );
        ensure!(p.jump_impulse < 0.0, "jump impulse must point upward");
        ensure!(
            p.sky_min_y < w.ground_y - p.height - p.sky_margin,
            "power-mode sky band is empty"
        );

        let o = &self.obstacles;
        ensure!(
            o.min_interval_ms > 0.0 && o.min_interval_ms <= o.base_interval_ms,
            "obstacle min interval {} must be in (0, base interval {}]",
            o.min_interval_ms,
            o.base_interval_ms
        );
        ensure!(o.difficulty_factor >= 0.0, "difficulty factor must not be negative");
        ensure!(
            o.base_speed.is_finite() && o.base_speed > 0.0,
            "obstacle base speed {} must be positive",
            o.base_speed
        );
        ensure!(
            o.air_offset_min <= o.air_offset_max,
            "obstacle air offset range is inverted"
        );

        let t = &self.tokens;
        ensure!(t.interval_ms > 0.0, "token interval must be positive");
        ensure!(t.size > 0.0, "token size must be positive");
        ensure!(
            t.speed.is_finite() && t.speed > 0.0,
            "token speed {} must be positive",
            t.speed
        );
        ensure!(
            (0.0..=1.0).contains(&t.jump_band_chance),
            "token jump band chance {} outside [0, 1]",
            t.jump_band_chance
        );
        ensure!(
            t.jump_band_min <= t.jump_band_max,
            "token jump band range is inverted"
        );

        let s = &self.session;
        ensure!(s.coins_for_power_mode > 0, "coin threshold must be at least 1");
        ensure!(s.scroll_wrap > 0.0, "scroll wrap must be positive");
        ensure!(
            s.power_mode_duration_ms >= 0.0,
            "power mode duration must not be negative"
        );
        ensure!(
            s.speed.initial().is_finite() && s.speed.initial() > 0.0,
            "initial game speed must be positive"
        );
        if let SpeedPolicy::Ramp {
            initial,
            per_second,
            max,
        } = s.speed
        {
            ensure!(
                per_second.is_finite() && per_second >= 0.0,
                "speed ramp {} per second must be finite and not negative",
                per_second
            );
            ensure!(
                max.is_finite() && max > 0.0 && max >= initial,
                "speed ramp cap {} must be positive and at least the initial speed {}",
                max,
                initial
            );
        }
        ensure!(
            s.survival_rate.is_finite() && s.survival_rate >= 0.0,
            "survival rate {} must be finite and not negative",
            s.survival_rate
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "session": { "coins_for_power_mode": 3 } }"#).unwrap();
        assert_eq!(tuning.session.coins_for_power_mode, 3);
        assert_eq!(tuning.session.power_mode_duration_ms, 2500.0);
        assert_eq!(tuning.obstacles.base_interval_ms, 2000.0);
    }

    #[test]
    fn test_speed_policy_from_json() {
        let tuning = Tuning::from_json(
            r#"{ "session": { "speed": {
                "mode": "ramp", "initial": 1.0, "per_second": 0.1, "max": 2.0
            } } }"#,
        )
        .unwrap();
        assert_eq!(tuning.session.speed.initial(), 1.0);
        assert!((tuning.session.speed.speed_at(5000.0) - 1.5).abs() < 1e-5);
        assert_eq!(tuning.session.speed.speed_at(60_000.0), 2.0);
    }

    #[test]
    fn test_rejects_inverted_spawn_floor() {
        let mut tuning = Tuning::default();
        tuning.obstacles.min_interval_ms = 5000.0;
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_coin_threshold() {
        let err = Tuning::from_json(r#"{ "session": { "coins_for_power_mode": 0 } }"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_rejects_non_finite_gravity() {
        let mut tuning = Tuning::default();
        tuning.player.gravity = f32::INFINITY;
        assert!(tuning.validate().is_err());
    }

    fn ramp(per_second: f32, max: f32) -> Tuning {
        let mut tuning = Tuning::default();
        tuning.session.speed = SpeedPolicy::Ramp {
            initial: 1.0,
            per_second,
            max,
        };
        tuning
    }

    #[test]
    fn test_rejects_decreasing_ramp() {
        let err = Tuning::from_json(
            r#"{ "session": { "speed": {
                "mode": "ramp", "initial": 1.0, "per_second": -1.0, "max": 2.0
            } } }"#,
        );
        assert!(err.is_err());
        assert!(ramp(f32::NAN, 2.0).validate().is_err());
        assert!(ramp(0.0, 2.0).validate().is_ok());
    }

    #[test]
    fn test_rejects_ramp_cap_below_initial() {
        assert!(ramp(0.1, 0.5).validate().is_err());
        assert!(ramp(0.1, 1.0).validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_ramp_cap() {
        assert!(ramp(0.1, 0.0).validate().is_err());
        assert!(ramp(0.1, -3.0).validate().is_err());
        assert!(ramp(0.1, f32::INFINITY).validate().is_err());
    }

    #[test]
    fn test_rejects_bad_survival_rate() {
        let mut tuning = Tuning::default();
        tuning.session.survival_rate = -0.1;
        assert!(tuning.validate().is_err());
        tuning.session.survival_rate = f64::NAN;
        assert!(tuning.validate().is_err());
        tuning.session.survival_rate = 0.0;
        assert!(tuning.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_obstacle_speed() {
        let mut tuning = Tuning::default();
        tuning.obstacles.base_speed = 0.0;
        assert!(tuning.validate().is_err());
        tuning.obstacles.base_speed = -5.0;
        assert!(tuning.validate().is_err());
        tuning.obstacles.base_speed = f32::NAN;
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_token_speed() {
        let mut tuning = Tuning::default();
        tuning.tokens.speed = 0.0;
        assert!(tuning.validate().is_err());
        tuning.tokens.speed = f32::INFINITY;
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(Tuning::from_json("not json").is_err());
    }
}
