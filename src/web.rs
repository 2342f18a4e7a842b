//! Browser host
//!
//! Exposes the simulation to the JS presentation layer. The page calls
//! `frame(now)` from `requestAnimationFrame`; elapsed time is converted into
//! fixed simulation steps. Steering and pause intents are queued and applied
//! on the next step.

use wasm_bindgen::prelude::*;

use crate::consts::{MAX_FRAME_MS, MAX_SUBSTEPS, SIM_DT_MS};
use crate::questions::{self, parse_pool};
use crate::sim::{GameState, TickInput, tick};
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    // Only fails if a logger is already installed
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Quiz Rush starting...");
}

/// Game instance holding all state
#[wasm_bindgen]
pub struct QuizGame {
    state: GameState,
    accumulator: f64,
    last_time: Option<f64>,
    input: TickInput,
}

#[wasm_bindgen]
impl QuizGame {
    /// New session on the intro screen, loaded with the built-in questions
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<f64>) -> QuizGame {
        let seed = seed.unwrap_or_else(js_sys::Date::now) as u64;
        let mut state = GameState::new(seed);
        state.load_question_pool(questions::builtin());
        Self {
            state,
            accumulator: 0.0,
            last_time: None,
            input: TickInput::default(),
        }
    }

    /// Replace the balance; takes effect on the next start/restart
    pub fn set_tuning(&mut self, json: &str) -> Result<(), JsValue> {
        let tuning = Tuning::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.state.tuning = tuning;
        Ok(())
    }

    /// Load a session's questions (`[{id, question, options, answer}]`)
    pub fn load_question_pool(&mut self, json: &str) -> Result<usize, JsValue> {
        let pool = parse_pool(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let count = pool.len();
        self.state.load_question_pool(pool);
        Ok(count)
    }

    pub fn start(&mut self) {
        self.state.start();
        self.reset_clock();
    }

    pub fn restart(&mut self) {
        self.state.restart();
        self.reset_clock();
    }

    pub fn toggle_pause(&mut self) {
        self.input.pause = !self.input.pause;
    }

    /// Queue a lane change; JS numbers outside the track are dropped here
    pub fn select_lane(&mut self, lane: f64) {
        match crate::lane_from_host(lane) {
            Some(lane) => self.input.lane = Some(lane),
            None => log::warn!("Ignoring selection of lane {}", lane),
        }
    }

    /// Run exactly one fixed step
    pub fn tick(&mut self) {
        let input = std::mem::take(&mut self.input);
        tick(&mut self.state, &input, SIM_DT_MS);
    }

    /// Run as many fixed steps as the time since the previous frame covers
    pub fn frame(&mut self, now_ms: f64) {
        let elapsed = match self.last_time {
            Some(last) => (now_ms - last).clamp(0.0, MAX_FRAME_MS),
            None => 0.0,
        };
        self.last_time = Some(now_ms);
        self.accumulator += elapsed;

        // Intents must not wait for a step while the game is frozen
        if !self.state.is_playing() && (self.input.pause || self.input.lane.is_some()) {
            self.tick();
        }

        let mut substeps = 0;
        while self.accumulator >= SIM_DT_MS && substeps < MAX_SUBSTEPS {
            self.tick();
            self.accumulator -= SIM_DT_MS;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            // Behind by more than we can catch up on; drop the backlog
            self.accumulator = 0.0;
        }
    }

    /// `frame` stamped with `performance.now()`, for hosts without a rAF timestamp
    pub fn frame_now(&mut self) {
        let now = web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now);
        self.frame(now);
    }

    /// Public state as JSON for rendering
    pub fn snapshot(&self) -> Result<String, JsValue> {
        self.state
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn status(&self) -> String {
        format!("{:?}", self.state.status).to_lowercase()
    }

    pub fn score(&self) -> f64 {
        self.state.score as f64
    }

    pub fn lives(&self) -> u8 {
        self.state.lives
    }
}

impl QuizGame {
    fn reset_clock(&mut self) {
        self.accumulator = 0.0;
        self.last_time = None;
        self.input = TickInput::default();
    }
}
