//! Session controller
//!
//! Wraps the deterministic [`GameState`] with everything that touches the
//! outside world: the score store, game-over hooks (score submission, share
//! image) and the HUD snapshot. Collaborator failures are logged and
//! swallowed; they never stop the simulation.

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::highscores::LeaderboardEntry;
use crate::persistence::ScoreStore;
use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
use crate::tuning::Tuning;

/// Outcome of a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameOverSummary {
    /// Floored final score
    pub final_score: u64,
    /// High score before this run
    pub previous_high_score: u64,
    pub new_high_score: bool,
    /// Leaderboard rank, when a player address was set and submission worked
    pub rank: Option<usize>,
}

/// Optional game-over side effects
pub trait GameOverHooks {
    /// Report the score for a connected player address
    fn submit_score(&mut self, _address: &str, _summary: &GameOverSummary) -> anyhow::Result<()> {
        Ok(())
    }

    /// Produce a shareable result card
    fn generate_share_image(&mut self, _summary: &GameOverSummary) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Hooks that do nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl GameOverHooks for NoHooks {}

/// Read-only HUD telemetry for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub score: f64,
    pub display_score: u64,
    pub high_score: u64,
    pub coins: u32,
    pub coins_needed: u32,
    pub power_mode: bool,
    pub power_mode_remaining_ms: f64,
    pub game_speed: f32,
    pub bg_offset: f32,
    pub game_over: Option<GameOverSummary>,
}

/// One player's game: simulation plus collaborators
pub struct Session {
    state: GameState,
    input: TickInput,
    store: Box<dyn ScoreStore>,
    hooks: Box<dyn GameOverHooks>,
    high_score: u64,
    player_address: Option<String>,
    last_summary: Option<GameOverSummary>,
    /// Score after the last step that passed the finite check
    last_finite_score: f64,
}

impl Session {
    /// Build a session in the menu phase. Fails only on invalid tuning.
    pub fn new(
        tuning: Tuning,
        settings: &Settings,
        seed: u64,
        store: Box<dyn ScoreStore>,
        hooks: Box<dyn GameOverHooks>,
    ) -> anyhow::Result<Self> {
        tuning.validate()?;

        let high_score = match store.get_high_score() {
            Ok(score) => score,
            Err(e) => {
                log::warn!("High score unavailable, starting from 0: {:#}", e);
                0
            }
        };

        let mut session = Self {
            state: GameState::new(tuning, seed),
            input: TickInput::default(),
            store,
            hooks,
            high_score,
            player_address: None,
            last_summary: None,
            last_finite_score: 0.0,
        };
        session.apply_settings(settings);
        Ok(session)
    }

    /// Apply effect preferences to the running state
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.state.particles.set_max(settings.max_particles());
        self.state.floating_texts.set_enabled(settings.floating_text);
    }

    /// Start (or restart) a run. Ignored while playing.
    pub fn start(&mut self) -> bool {
        let restart = self.state.phase == GamePhase::GameOver;
        if !self.state.start() {
            return false;
        }
        self.input = TickInput::default();
        self.last_summary = None;
        self.last_finite_score = 0.0;
        if restart {
            log::info!("Session restarted");
        } else {
            log::info!("Session started");
        }
        true
    }

    /// Queue a jump for the next eligible tick
    pub fn request_jump(&mut self) {
        self.input.jump = true;
    }

    /// Advance one fixed step and run any game-over side effects.
    ///
    /// An error means the step produced a non-finite value; the player has
    /// already been put back on the ground so the next step is valid.
    pub fn tick(&mut self) -> anyhow::Result<()> {
        tick(&mut self.state, &mut self.input);

        for event in self.state.drain_events() {
            match event {
                GameEvent::GameOver { final_score } => self.finish_run(final_score),
                other => log::debug!("{:?}", other),
            }
        }

        self.check_finite()
    }

    fn finish_run(&mut self, final_score: u64) {
        let previous_high_score = self.high_score;
        let new_high_score = final_score > previous_high_score;
        if new_high_score {
            log::info!("New high score {} (was {})", final_score, previous_high_score);
            self.high_score = final_score;
            if let Err(e) = self.store.set_high_score(final_score) {
                log::warn!("Failed to save high score: {:#}", e);
            }
        }

        let rank = match self.player_address.as_deref() {
            Some(address) => match self.store.submit_leaderboard_entry(address, final_score) {
                Ok(rank) => rank,
                Err(e) => {
                    log::warn!("Failed to record leaderboard entry: {:#}", e);
                    None
                }
            },
            None => None,
        };

        let summary = GameOverSummary {
            final_score,
            previous_high_score,
            new_high_score,
            rank,
        };

        if let Some(address) = self.player_address.as_deref() {
            if let Err(e) = self.hooks.submit_score(address, &summary) {
                log::warn!("Score submission failed: {:#}", e);
            }
        }
        if let Err(e) = self.hooks.generate_share_image(&summary) {
            log::warn!("Share image generation failed: {:#}", e);
        }

        self.last_summary = Some(summary);
    }

    fn check_finite(&mut self) -> anyhow::Result<()> {
        let state = &self.state;
        let player = &state.player;
        if state.score.is_finite()
            && state.game_speed.is_finite()
            && player.pos.is_finite()
            && player.vel_y.is_finite()
        {
            self.last_finite_score = state.score;
            return Ok(());
        }

        let details = format!(
            "score={} speed={} player=({}, {}) vy={}",
            state.score, state.game_speed, player.pos.x, player.pos.y, player.vel_y
        );
        let ground_y = self.state.ground_y();
        let spawn_x = self.state.tuning.player.spawn_x;
        if !self.state.player.pos.x.is_finite() {
            self.state.player.pos.x = spawn_x;
        }
        self.state.player.land(ground_y);
        if !self.state.game_speed.is_finite() {
            self.state.game_speed = self.state.tuning.session.speed.initial();
        }
        if !self.state.score.is_finite() {
            self.state.score = self.last_finite_score;
        }
        bail!(
            "non-finite simulation state at tick {}: {}",
            self.state.time_ticks,
            details
        )
    }

    /// Connected player address for leaderboard submission (None to clear)
    pub fn set_player_address(&mut self, address: Option<String>) {
        self.player_address = address.filter(|a| !a.trim().is_empty());
    }

    pub fn player_address(&self) -> Option<&str> {
        self.player_address.as_deref()
    }

    /// Best `limit` leaderboard entries (empty if the store is unavailable)
    pub fn leaderboard(&self, limit: usize) -> Vec<LeaderboardEntry> {
        self.store.get_leaderboard(limit).unwrap_or_else(|e| {
            log::warn!("Leaderboard unavailable: {:#}", e);
            Vec::new()
        })
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn last_summary(&self) -> Option<&GameOverSummary> {
        self.last_summary.as_ref()
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutable state access for tools and tests
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn store(&self) -> &dyn ScoreStore {
        self.store.as_ref()
    }

    /// HUD telemetry
    pub fn snapshot(&self) -> Snapshot {
        let s = &self.state;
        Snapshot {
            phase: s.phase,
            score: s.score,
            display_score: s.display_score(),
            high_score: self.high_score,
            coins: s.coins,
            coins_needed: s.tuning.session.coins_for_power_mode,
            power_mode: s.power_mode_active(),
            power_mode_remaining_ms: s.power_mode_remaining_ms(),
            game_speed: s.game_speed,
            bg_offset: s.bg_offset,
            game_over: self.last_summary.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::StorageScoreStore;
    use crate::platform::MemoryStorage;
    use crate::platform::storage::testing::FailingStorage;
    use anyhow::anyhow;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorded {
        submitted: Vec<(String, u64)>,
        shared: Vec<GameOverSummary>,
    }

    #[derive(Clone, Default)]
    struct RecordingHooks(Rc<RefCell<Recorded>>);

    impl GameOverHooks for RecordingHooks {
        fn submit_score(&mut self, address: &str, summary: &GameOverSummary) -> anyhow::Result<()> {
            self.0
                .borrow_mut()
                .submitted
                .push((address.to_string(), summary.final_score));
            Ok(())
        }

        fn generate_share_image(&mut self, summary: &GameOverSummary) -> anyhow::Result<()> {
            self.0.borrow_mut().shared.push(summary.clone());
            Ok(())
        }
    }

    struct BrokenHooks;

    impl GameOverHooks for BrokenHooks {
        fn submit_score(&mut self, _: &str, _: &GameOverSummary) -> anyhow::Result<()> {
            Err(anyhow!("wallet disconnected"))
        }

        fn generate_share_image(&mut self, _: &GameOverSummary) -> anyhow::Result<()> {
            Err(anyhow!("no canvas"))
        }
    }

    fn memory_session(seed: u64, hooks: Box<dyn GameOverHooks>) -> Session {
        let store = StorageScoreStore::new(MemoryStorage::new());
        Session::new(
            Tuning::default(),
            &Settings::default(),
            seed,
            Box::new(store),
            hooks,
        )
        .unwrap()
    }

    /// Tick without jumping until the first crash
    fn run_until_game_over(session: &mut Session) {
        for _ in 0..20_000 {
            session.tick().unwrap();
            if session.phase() == GamePhase::GameOver {
                return;
            }
        }
        panic!("run never ended");
    }

    #[test]
    fn test_invalid_tuning_rejected() {
        let mut tuning = Tuning::default();
        tuning.session.coins_for_power_mode = 0;
        let result = Session::new(
            tuning,
            &Settings::default(),
            1,
            Box::new(StorageScoreStore::new(MemoryStorage::new())),
            Box::new(NoHooks),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_menu_ticks_are_inert() {
        let mut session = memory_session(1, Box::new(NoHooks));
        session.request_jump();
        for _ in 0..30 {
            session.tick().unwrap();
        }
        let snap = session.snapshot();
        assert_eq!(snap.phase, GamePhase::Menu);
        assert_eq!(snap.score, 0.0);
    }

    #[test]
    fn test_game_over_records_high_score() {
        let hooks = RecordingHooks::default();
        let mut session = memory_session(21, Box::new(hooks.clone()));
        assert!(session.start());
        assert!(!session.start());
        run_until_game_over(&mut session);

        let summary = session.last_summary().cloned().unwrap();
        assert_eq!(summary.previous_high_score, 0);
        assert_eq!(summary.new_high_score, summary.final_score > 0);
        assert_eq!(session.high_score(), summary.final_score);
        assert_eq!(
            session.store().get_high_score().unwrap(),
            summary.final_score
        );

        let recorded = hooks.0.borrow();
        assert_eq!(recorded.shared, vec![summary]);
        assert!(recorded.submitted.is_empty(), "no address, no submission");
    }

    #[test]
    fn test_lower_score_keeps_high_score() {
        let mut session = memory_session(3, Box::new(NoHooks));
        session.high_score = 1_000_000;
        session.start();
        run_until_game_over(&mut session);
        let summary = session.last_summary().unwrap();
        assert!(!summary.new_high_score);
        assert_eq!(session.high_score(), 1_000_000);
        assert_eq!(session.store().get_high_score().unwrap(), 0);
    }

    #[test]
    fn test_address_submits_to_leaderboard() {
        let hooks = RecordingHooks::default();
        let mut session = memory_session(5, Box::new(hooks.clone()));
        session.set_player_address(Some("0xBEEF".to_string()));
        session.start();
        run_until_game_over(&mut session);

        let final_score = session.last_summary().unwrap().final_score;
        assert_eq!(session.last_summary().unwrap().rank, Some(1));
        let board = session.leaderboard(10);
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].address, "0xBEEF");
        assert_eq!(board[0].score, final_score);
        assert_eq!(
            hooks.0.borrow().submitted,
            vec![("0xBEEF".to_string(), final_score)]
        );
    }

    #[test]
    fn test_collaborator_failures_do_not_stop_the_game() {
        let store = StorageScoreStore::new(FailingStorage);
        let mut session = Session::new(
            Tuning::default(),
            &Settings::default(),
            9,
            Box::new(store),
            Box::new(BrokenHooks),
        )
        .unwrap();
        session.set_player_address(Some("0x1".to_string()));
        assert_eq!(session.high_score(), 0);

        session.start();
        run_until_game_over(&mut session);
        let summary = session.last_summary().cloned().unwrap();
        assert_eq!(summary.rank, None);
        assert_eq!(session.high_score(), summary.final_score);
        assert!(session.leaderboard(10).is_empty());

        // Restart works after failures
        assert!(session.start());
        assert!(session.last_summary().is_none());
        session.tick().unwrap();
        assert_eq!(session.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_non_finite_state_is_reported_and_repaired() {
        let mut session = memory_session(4, Box::new(NoHooks));
        session.start();
        session.state_mut().player.vel_y = f32::NAN;
        assert!(session.tick().is_err());
        assert!(session.state().player.on_ground);
        assert!(session.tick().is_ok());
    }

    #[test]
    fn test_non_finite_score_is_restored() {
        let mut session = memory_session(4, Box::new(NoHooks));
        session.start();
        for _ in 0..5 {
            session.tick().unwrap();
        }
        let good = session.state().score;
        assert!(good > 0.0);

        session.state_mut().score = f64::NAN;
        assert!(session.tick().is_err());
        assert_eq!(session.state().score, good);

        // The loop recovers: later steps pass and scoring resumes
        session.tick().unwrap();
        assert!(session.state().score > good);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut session = memory_session(8, Box::new(NoHooks));
        session.start();
        for _ in 0..10 {
            session.tick().unwrap();
        }
        let snap = session.snapshot();
        assert_eq!(snap.phase, GamePhase::Playing);
        assert_eq!(snap.coins_needed, 5);
        assert!(!snap.power_mode);
        assert_eq!(snap.display_score, snap.score.floor() as u64);
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"phase\":\"Playing\""));
    }

    #[test]
    fn test_settings_applied() {
        let settings = Settings {
            particles: false,
            floating_text: false,
            ..Settings::default()
        };
        let session = Session::new(
            Tuning::default(),
            &settings,
            1,
            Box::new(StorageScoreStore::new(MemoryStorage::new())),
            Box::new(NoHooks),
        )
        .unwrap();
        let mut state = session.state().clone();
        state.start();
        state.enter_game_over();
        assert!(state.particles.is_empty());
    }
}
