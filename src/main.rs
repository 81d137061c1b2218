//! Rink Rush entry point
//!
//! Native builds run a headless AI-vs-AI match and log what happens.
//! Web builds expose a [`WebMatch`] handle the page drives once per frame.
//!
//! Usage: `rink-rush [seed] [settings.json]`

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use glam::Vec2;
    use wasm_bindgen::prelude::*;

    use rink_rush::consts::*;
    use rink_rush::input::RawControls;
    use rink_rush::sim::{KinematicRink, MatchPhase, MatchState, Team, TickInput, tick};
    use rink_rush::{GameplaySettings, TeamConfig};

    /// A match driven by the page's animation frame loop
    #[wasm_bindgen]
    pub struct WebMatch {
        state: MatchState,
        rink: KinematicRink,
        accumulator: f32,
        input: TickInput,
    }

    #[wasm_bindgen]
    impl WebMatch {
        /// Human plays team A's center
        #[wasm_bindgen(constructor)]
        pub fn new(seed: u64) -> WebMatch {
            let settings = GameplaySettings::default();
            let state = MatchState::new(
                &settings,
                &TeamConfig::default(),
                &TeamConfig::default(),
                Some((Team::A, 4)),
                seed,
            );
            WebMatch {
                rink: KinematicRink::new(&state.settings),
                state,
                accumulator: 0.0,
                input: TickInput::default(),
            }
        }

        /// Latch this frame's device state
        pub fn set_controls(&mut self, x: f32, y: f32, sprint: bool, shoot: bool, pass: bool, switch_player: bool) {
            self.input.human = Some(RawControls {
                move_vector: Vec2::new(x, y),
                sprint,
                shoot,
                pass,
                switch_player,
            });
        }

        pub fn toggle_pause(&mut self) {
            self.input.pause = true;
        }

        /// Run as many fixed ticks as `dt` covers
        pub fn update(&mut self, dt: f32) {
            self.accumulator += dt.min(0.1);

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.clone();
                tick(&mut self.state, &input, &mut self.rink, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Device levels stay latched; the human adapter finds the edges
                self.input.pause = false;
            }

            for event in self.state.drain_events() {
                log::debug!("{:?}", event);
            }
        }

        pub fn score_a(&self) -> u32 {
            self.state.scores.score().team_a
        }

        pub fn score_b(&self) -> u32 {
            self.state.scores.score().team_b
        }

        pub fn period(&self) -> u32 {
            self.state.clock.period()
        }

        pub fn time_remaining(&self) -> f32 {
            self.state.clock.remaining()
        }

        pub fn is_over(&self) -> bool {
            self.state.phase == MatchPhase::GameOver
        }

        /// Flat `[x, z, yaw, team]` per skater
        pub fn players(&self) -> Vec<f32> {
            self.state
                .players
                .iter()
                .flat_map(|p| [p.pos.x, p.pos.z, p.yaw, p.team.index() as f32])
                .collect()
        }

        pub fn puck(&self) -> Vec<f32> {
            vec![self.state.puck.pos.x, self.state.puck.pos.z]
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        return;
    }
    log::info!("Rink Rush starting...");
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use rink_rush::consts::*;
    use rink_rush::sim::{GameEvent, KinematicRink, MatchPhase, MatchState, TickInput, tick};
    use rink_rush::{GameplaySettings, TeamConfig};

    env_logger::init();
    log::info!("Rink Rush (native) starting...");

    let mut args = std::env::args().skip(1);
    let seed = match args.next().map(|s| s.parse::<u64>()) {
        Some(Ok(seed)) => seed,
        Some(Err(e)) => {
            log::warn!("Bad seed ({}), using 1", e);
            1
        }
        None => 1,
    };
    let settings = match args.next() {
        Some(path) => load_settings(&path),
        None => GameplaySettings::default(),
    };

    let mut state = MatchState::new(&settings, &TeamConfig::default(), &TeamConfig::default(), None, seed);
    let mut rink = KinematicRink::new(&state.settings);
    let input = TickInput::default();

    // Pretend to be a 30 fps host so the substep cap is exercised
    let frame_dt = 1.0 / 30.0;
    let mut accumulator = 0.0;
    let frame_limit = 60 * 60 * 60;
    let mut frames = 0;

    while state.phase != MatchPhase::GameOver && frames < frame_limit {
        accumulator += frame_dt;
        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut state, &input, &mut rink, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;
        }
        frames += 1;

        for event in state.drain_events() {
            match event {
                GameEvent::StateChanged { .. } | GameEvent::PossessionChanged { .. } => {
                    log::trace!("{:?}", event)
                }
                GameEvent::PuckShot { .. } | GameEvent::PuckPassed { .. } => log::debug!("{:?}", event),
                other => log::info!("[{:>7.2}s] {:?}", state.time, other),
            }
        }
    }

    let score = state.scores.score();
    println!(
        "Final: Team A {} - {} Team B ({} ticks, seed {})",
        score.team_a, score.team_b, state.time_ticks, seed
    );
}

/// Read match settings from JSON; fall back to defaults on any problem
#[cfg(not(target_arch = "wasm32"))]
fn load_settings(path: &str) -> rink_rush::GameplaySettings {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("Failed to read {}: {}", path, e);
            return rink_rush::GameplaySettings::default();
        }
    };
    match rink_rush::GameplaySettings::from_json(&json) {
        Ok(settings) => {
            log::info!("Loaded settings from {}", path);
            settings
        }
        Err(e) => {
            log::warn!("Failed to parse {}: {}", path, e);
            rink_rush::GameplaySettings::default()
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
