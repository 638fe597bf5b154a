//! Scene drawing
//!
//! The simulation never draws. [`draw_scene`] walks a [`GameState`] and
//! issues primitive calls against any [`Surface`] in logical world units.

#[cfg(target_arch = "wasm32")]
pub mod canvas;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;

use crate::settings::QualityPreset;
use crate::sim::{GamePhase, GameState};

/// Spacing of the scrolling background grid
pub const GRID_SPACING: f32 = 40.0;

const BACKGROUND: u32 = 0x0A0B14;
const GRID: u32 = 0x1A1F3A;
const GROUND: u32 = 0x0052FF;
const PLAYER: u32 = 0x0052FF;
const PLAYER_GLOW: u32 = 0xFF6B00;
const TOKEN: u32 = 0xFFD700;
const TEXT: u32 = 0xFFFFFF;

/// Base floating-text font size before scaling
const TEXT_SIZE: f32 = 20.0;

/// Convert 0xRRGGBB plus alpha into normalized RGBA
pub fn rgba(hex: u32, alpha: f32) -> [f32; 4] {
    let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
    let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
    let b = (hex & 0xFF) as f32 / 255.0;
    [r, g, b, alpha.clamp(0.0, 1.0)]
}

/// A draw target addressed in logical world coordinates
pub trait Surface {
    fn clear(&mut self, color: [f32; 4]);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: [f32; 4]);
    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: [f32; 4]);
    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, width: f32, color: [f32; 4]);
    /// Text centered on (x, y)
    fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: [f32; 4]);
}

/// Draw one frame of the world. Low quality skips the background grid.
pub fn draw_scene(surface: &mut impl Surface, state: &GameState, quality: QualityPreset) {
    let world = &state.tuning.world;
    let ground_y = world.ground_y;

    surface.clear(rgba(BACKGROUND, 1.0));

    if quality.grid_enabled() {
        draw_grid(surface, state);
    }

    surface.line(0.0, ground_y, world.width, ground_y, 3.0, rgba(GROUND, 1.0));

    for obstacle in state.obstacles.active_obstacles() {
        let b = obstacle.bounds(ground_y);
        surface.fill_rect(
            b.pos.x,
            b.pos.y,
            b.size.x,
            b.size.y,
            rgba(obstacle.kind.spec().color, 1.0),
        );
    }

    for (_, token) in state.tokens.active_tokens() {
        let c = token.center();
        surface.fill_circle(c.x, c.y, token.size.x * 0.5, rgba(TOKEN, 1.0));
    }

    let player = &state.player;
    if state.power_mode_active() {
        let c = player.center();
        surface.fill_circle(c.x, c.y, player.size.y * 0.75, rgba(PLAYER_GLOW, 0.35));
    }
    if state.phase != GamePhase::GameOver {
        surface.fill_rect(
            player.pos.x,
            player.pos.y,
            player.size.x,
            player.size.y,
            rgba(PLAYER, 1.0),
        );
    }

    for p in state.particles.particles() {
        surface.fill_circle(p.pos.x, p.pos.y, p.size, rgba(p.color, p.life));
    }

    for t in state.floating_texts.texts() {
        surface.fill_text(&t.text, t.pos.x, t.pos.y, TEXT_SIZE * t.scale, rgba(t.color, t.life));
    }

    draw_indicators(surface, state);
}

/// Background grid, scrolling with the world
fn draw_grid(surface: &mut impl Surface, state: &GameState) {
    let world = &state.tuning.world;
    let grid = rgba(GRID, 0.5);
    let mut x = -state.bg_offset;
    while x < world.width {
        surface.line(x, 0.0, x, world.ground_y, 1.0, grid);
        x += GRID_SPACING;
    }
    let mut y = 0.0;
    while y < world.ground_y {
        surface.line(0.0, y, world.width, y, 1.0, grid);
        y += GRID_SPACING;
    }
}

/// Coin progress pips and the power-mode timer bar
fn draw_indicators(surface: &mut impl Surface, state: &GameState) {
    let needed = state.tuning.session.coins_for_power_mode;
    for i in 0..needed {
        let alpha = if i < state.coins { 1.0 } else { 0.25 };
        surface.fill_circle(20.0 + i as f32 * 18.0, 20.0, 6.0, rgba(TOKEN, alpha));
    }

    if state.power_mode_active() {
        let duration = state.tuning.session.power_mode_duration_ms;
        let frac = if duration > 0.0 {
            (state.power_mode_remaining_ms() / duration) as f32
        } else {
            0.0
        };
        surface.fill_rect(10.0, 36.0, 120.0 * frac, 6.0, rgba(PLAYER_GLOW, 1.0));
        surface.fill_text("ROCKET", 70.0, 56.0, 14.0, rgba(TEXT, 1.0));
    }
}
