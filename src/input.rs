//! Control signals
//!
//! Every skater is driven by an [`InputSignal`], whether a human or the AI is
//! behind it. Both sides implement [`InputSource`]; locomotion never asks which.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::sim::ai::AgentBrain;
use crate::sim::player::ControlSource;

/// One tick of control intent for one skater
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSignal {
    /// Stick direction; x maps to world X, y maps to world Z
    pub move_vector: Vec2,
    pub sprint_held: bool,
    /// Edge-triggered: true only on the tick the control went down
    pub shoot_performed: bool,
    pub pass_performed: bool,
    pub switch_player_performed: bool,
}

impl InputSignal {
    /// Same levels, no one-shot triggers
    pub fn levels_only(&self) -> Self {
        Self {
            move_vector: self.move_vector,
            sprint_held: self.sprint_held,
            ..Default::default()
        }
    }
}

/// Raw level state from the device poller (keyboard, pad, touch)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawControls {
    pub move_vector: Vec2,
    pub sprint: bool,
    pub shoot: bool,
    pub pass: bool,
    pub switch_player: bool,
}

/// Read-only world view handed to an input source each tick
#[derive(Debug, Clone, Copy)]
pub struct SourceContext {
    /// Simulation time (seconds)
    pub now: f32,
    pub position: Vec3,
    pub yaw: f32,
    pub has_puck: bool,
    pub puck_position: Vec3,
    /// Anchor of the goal this skater attacks
    pub attack_goal: Vec3,
}

/// Anything that can drive a skater
pub trait InputSource {
    /// Produce this tick's signal, or `None` if the source has nothing to offer
    fn poll(&mut self, ctx: &SourceContext) -> Option<InputSignal>;
}

/// Turns level-state device input into an edge-triggered [`InputSignal`]
#[derive(Debug, Clone, Default)]
pub struct HumanInput {
    pending: Option<RawControls>,
    previous: RawControls,
}

impl HumanInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand over the latest device state; consumed by the next poll
    pub fn feed(&mut self, raw: RawControls) {
        self.pending = Some(raw);
    }
}

impl InputSource for HumanInput {
    fn poll(&mut self, _ctx: &SourceContext) -> Option<InputSignal> {
        let raw = self.pending.take()?;
        let signal = InputSignal {
            move_vector: raw.move_vector,
            sprint_held: raw.sprint,
            shoot_performed: raw.shoot && !self.previous.shoot,
            pass_performed: raw.pass && !self.previous.pass,
            switch_player_performed: raw.switch_player && !self.previous.switch_player,
        };
        self.previous = raw;
        Some(signal)
    }
}

/// Who is behind a skater
#[derive(Debug, Clone)]
pub enum Controller {
    Human(HumanInput),
    Ai(Box<AgentBrain>),
}

impl Controller {
    pub fn source(&self) -> ControlSource {
        match self {
            Controller::Human(_) => ControlSource::Human,
            Controller::Ai(_) => ControlSource::Ai,
        }
    }
}

impl InputSource for Controller {
    fn poll(&mut self, ctx: &SourceContext) -> Option<InputSignal> {
        match self {
            Controller::Human(human) => human.poll(ctx),
            Controller::Ai(brain) => brain.poll(ctx),
        }
    }
}

/// Lets a diagnostic through at most once per window of simulation time
#[derive(Debug, Clone, Copy)]
pub struct LogThrottle {
    window: f32,
    last: Option<f32>,
}

impl Default for LogThrottle {
    fn default() -> Self {
        Self::new(crate::consts::DIAGNOSTIC_WINDOW)
    }
}

impl LogThrottle {
    pub fn new(window: f32) -> Self {
        Self { window, last: None }
    }

    pub fn ready(&mut self, now: f32) -> bool {
        match self.last {
            Some(last) if now - last < self.window => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> SourceContext {
        SourceContext {
            now: 0.0,
            position: Vec3::ZERO,
            yaw: 0.0,
            has_puck: false,
            puck_position: Vec3::ZERO,
            attack_goal: Vec3::new(0.0, 0.0, 29.0),
        }
    }

    #[test]
    fn test_human_triggers_fire_on_edge_only() {
        let mut human = HumanInput::new();
        let held = RawControls {
            shoot: true,
            move_vector: Vec2::new(0.0, 1.0),
            ..Default::default()
        };

        human.feed(held);
        let first = human.poll(&ctx()).expect("fed");
        assert!(first.shoot_performed);
        assert_eq!(first.move_vector, Vec2::new(0.0, 1.0));

        human.feed(held);
        let second = human.poll(&ctx()).expect("fed");
        assert!(!second.shoot_performed, "holding the button must not re-fire");

        human.feed(RawControls::default());
        human.poll(&ctx());
        human.feed(held);
        assert!(human.poll(&ctx()).expect("fed").shoot_performed);
    }

    #[test]
    fn test_human_without_device_state_is_missing() {
        let mut human = HumanInput::new();
        assert!(human.poll(&ctx()).is_none());
        human.feed(RawControls::default());
        assert!(human.poll(&ctx()).is_some());
        assert!(human.poll(&ctx()).is_none(), "state is consumed once");
    }

    #[test]
    fn test_throttle_window() {
        let mut throttle = LogThrottle::new(5.0);
        assert!(throttle.ready(0.0));
        assert!(!throttle.ready(1.0));
        assert!(!throttle.ready(4.9));
        assert!(throttle.ready(5.0));
    }
}
