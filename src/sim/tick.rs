//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use glam::Vec2;

use super::collision::intersects;
use super::effects::ParticleKind;
use super::state::{COLLECT_BURST, GameEvent, GamePhase, GameState, JUMP_BURST, SCORE_TEXT_COLOR};
use crate::consts::TICK_MS;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pending jump request. Cleared by the tick that consumes it, so a
    /// request made during power mode waits for the next eligible tick.
    pub jump: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &mut TickInput) {
    match state.phase {
        GamePhase::Playing => {}
        GamePhase::GameOver => {
            // World is frozen; let the crash burst play out
            state.particles.update();
            state.floating_texts.update();
            return;
        }
        GamePhase::Menu => return,
    }

    state.time_ticks += 1;
    state.elapsed_ms = state.time_ticks as f64 * TICK_MS;
    let ground_y = state.ground_y();

    state.game_speed = state.tuning.session.speed.speed_at(state.elapsed_ms);

    // Power-mode timeout, otherwise jump input
    if let Some(since) = state.power_mode_since_ms {
        if state.elapsed_ms - since >= state.tuning.session.power_mode_duration_ms {
            state.deactivate_power_mode();
        }
    } else if input.jump {
        input.jump = false;
        if state.player.jump() {
            let feet = Vec2::new(state.player.center().x, ground_y);
            state
                .particles
                .emit(feet, ParticleKind::Jump, JUMP_BURST, &mut state.rng);
            state.events.push(GameEvent::Jumped);
        }
    }

    let s = &state.tuning.session;
    state.bg_offset =
        (state.bg_offset + s.scroll_base_speed * state.game_speed * s.scroll_factor)
            .rem_euclid(s.scroll_wrap);

    let power_mode = state.power_mode_active();
    state.player.update(ground_y, power_mode);

    state.obstacles.update(
        state.game_speed,
        state.elapsed_ms,
        state.score,
        &mut state.rng,
    );
    state
        .tokens
        .update(state.game_speed, state.elapsed_ms, &mut state.rng);

    state.particles.update();
    state.floating_texts.update();

    collect_tokens(state);

    if !state.power_mode_active() && hits_obstacle(state) {
        state.enter_game_over();
        return;
    }

    state.score += state.tuning.session.survival_rate * state.game_speed as f64;
}

/// Award every token the player overlaps. The power-mode threshold is
/// checked after each token, so it can trigger mid-sweep.
fn collect_tokens(state: &mut GameState) {
    let player_box = state.player.bounds();
    let touching: Vec<usize> = state
        .tokens
        .active_tokens()
        .filter(|(_, token)| intersects(&player_box, &token.bounds()))
        .map(|(slot, _)| slot)
        .collect();

    for slot in touching {
        let Some(center) = state.tokens.token(slot).map(|t| t.center()) else {
            continue;
        };
        let Some(value) = state.tokens.collect(slot) else {
            continue;
        };

        state.score += value as f64;
        state.coins += 1;
        state
            .particles
            .emit(center, ParticleKind::Collect, COLLECT_BURST, &mut state.rng);
        state
            .floating_texts
            .add(center, format!("+{value}"), SCORE_TEXT_COLOR);
        state.events.push(GameEvent::TokenCollected { value, at: center });

        if state.coins >= state.tuning.session.coins_for_power_mode && !state.power_mode_active() {
            state.activate_power_mode();
        }
    }
}

fn hits_obstacle(state: &GameState) -> bool {
    let player_box = state.player.bounds();
    let ground_y = state.ground_y();
    state
        .obstacles
        .active_obstacles()
        .any(|obstacle| intersects(&player_box, &obstacle.bounds(ground_y)))
}
