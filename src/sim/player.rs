//! Skaters and their locomotion
//!
//! Each tick a skater turns its [`InputSignal`] into a planar velocity and a
//! facing, keeps its action state in step with the input, and may ask the puck
//! to be shot or passed.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::events::{EventQueue, GameEvent};
use super::state_machine::{PlayerState, PlayerStateMachine, Transition};
use crate::config::{PlayerConfig, PlayerPosition};
use crate::consts::*;
use crate::input::{InputSignal, LogThrottle};
use crate::{flatten, forward_of, heading_of, move_towards, rotate_towards, to_plane};

/// Stable skater identifier (also the iteration order within a tick)
pub type PlayerId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    /// Defends the -Z goal
    A,
    /// Defends the +Z goal
    B,
}

impl Team {
    pub const BOTH: [Team; 2] = [Team::A, Team::B];

    pub fn index(&self) -> usize {
        match self {
            Team::A => 0,
            Team::B => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Team::A),
            1 => Some(Team::B),
            _ => None,
        }
    }

    pub fn opponent(&self) -> Team {
        match self {
            Team::A => Team::B,
            Team::B => Team::A,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Team::A => "A",
            Team::B => "B",
        }
    }
}

/// Who drives a skater
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlSource {
    Human,
    Ai,
}

/// What a skater wants done with the puck this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PuckRequest {
    Shoot { direction: Vec3, power: f32 },
    /// Direction is picked by the match (nearest open teammate)
    Pass { power: f32 },
}

#[derive(Debug, Clone)]
pub struct PlayerEntity {
    pub id: PlayerId,
    pub name: String,
    pub jersey: u32,
    pub team: Team,
    pub slot: PlayerPosition,
    pub pos: Vec3,
    pub vel: Vec3,
    /// Facing (radians about +Y, 0 = +Z)
    pub yaw: f32,
    /// Where this skater started; faceoffs return it here
    pub spawn: Vec3,
    pub has_puck: bool,
    pub control: ControlSource,
    config: PlayerConfig,
    state_machine: PlayerStateMachine,
    last_shot_at: Option<f32>,
    released_at: Option<f32>,
    missing_input_log: LogThrottle,
}

impl PlayerEntity {
    pub fn new(id: PlayerId, team: Team, config: &PlayerConfig, spawn: Vec3) -> Self {
        // Face the attacked end
        let yaw = match team {
            Team::A => 0.0,
            Team::B => std::f32::consts::PI,
        };
        Self {
            id,
            name: config.player_name.clone(),
            jersey: config.jersey_number,
            team,
            slot: config.position,
            pos: spawn,
            vel: Vec3::ZERO,
            yaw: crate::normalize_angle(yaw),
            spawn,
            has_puck: false,
            control: ControlSource::Ai,
            config: config.sanitized(),
            state_machine: PlayerStateMachine::new(),
            last_shot_at: None,
            released_at: None,
            missing_input_log: LogThrottle::default(),
        }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn state(&self) -> PlayerState {
        self.state_machine.current()
    }

    pub fn state_machine(&self) -> &PlayerStateMachine {
        &self.state_machine
    }

    pub fn forward(&self) -> Vec3 {
        forward_of(self.yaw)
    }

    pub fn planar_speed(&self) -> f32 {
        flatten(self.vel).length()
    }

    /// Ask for a state change; the gate may refuse
    pub fn request_state(&mut self, target: PlayerState, events: &mut EventQueue) -> Transition {
        let result = self.state_machine.change_state(target);
        self.announce(result, events);
        result
    }

    /// Clear back to Idle from any state (used by match logic, not locomotion)
    pub fn force_idle(&mut self, events: &mut EventQueue) {
        let result = self.state_machine.force_idle();
        self.announce(result, events);
    }

    /// Can this skater collect a loose puck right now?
    pub fn can_collect(&self, now: f32) -> bool {
        let recently_released = self
            .released_at
            .is_some_and(|at| now - at < RELEASE_COOLDOWN);
        !self.has_puck
            && !recently_released
            && !matches!(self.state(), PlayerState::Stunned | PlayerState::Celebrating)
    }

    pub fn mark_released(&mut self, now: f32) {
        self.has_puck = false;
        self.released_at = Some(now);
    }

    /// Put the skater back on its spawn point, standing still
    pub fn return_to_spawn(&mut self) {
        self.pos = self.spawn;
        self.vel = Vec3::ZERO;
        self.yaw = match self.team {
            Team::A => 0.0,
            Team::B => crate::normalize_angle(std::f32::consts::PI),
        };
    }

    /// Advance one tick of locomotion
    ///
    /// `None` input means the skater's controller produced nothing this tick:
    /// the skater stands still and the omission is logged (throttled).
    pub fn locomote(
        &mut self,
        input: Option<&InputSignal>,
        now: f32,
        dt: f32,
        events: &mut EventQueue,
    ) -> Option<PuckRequest> {
        let Some(input) = input else {
            if self.missing_input_log.ready(now) {
                log::warn!("[{}] No input this tick", self.name);
            }
            self.vel = Vec3::ZERO;
            return None;
        };

        let raw = to_plane(input.move_vector);
        let magnitude = raw.length();
        let direction = if magnitude > INPUT_DEADZONE {
            raw / magnitude
        } else {
            Vec3::ZERO
        };

        // Velocity ramp: accelerate toward input, decelerate (harder) when released
        let sprint = if input.sprint_held {
            self.config.sprint_multiplier
        } else {
            1.0
        };
        let target_speed = if direction == Vec3::ZERO {
            0.0
        } else {
            self.config.move_speed * sprint
        };
        let target_vel = direction * target_speed;
        let rate = if target_speed > 0.0 {
            self.config.acceleration
        } else {
            self.config.deceleration
        };
        let mut vel = move_towards(flatten(self.vel), target_vel, rate * dt);
        // Letting go of sprint drops straight to the walking cap
        let cap = self.config.move_speed * sprint;
        if vel.length() > cap {
            vel = vel.normalize_or_zero() * cap;
        }
        self.vel = vel;

        if direction != Vec3::ZERO {
            let max_turn = self.config.rotation_speed.to_radians() * dt;
            self.yaw = rotate_towards(self.yaw, heading_of(direction), max_turn);
        }

        // Movement states only when nothing stronger holds the skater
        if self.state_machine.can_transition_to(PlayerState::Idle) {
            let derived = if magnitude > INPUT_DEADZONE {
                if input.sprint_held {
                    PlayerState::Sprinting
                } else {
                    PlayerState::Skating
                }
            } else {
                PlayerState::Idle
            };
            self.request_state(derived, events);
        }

        if input.shoot_performed {
            if let Some(request) = self.try_shoot(now, events) {
                return Some(request);
            }
        }
        if input.pass_performed {
            return self.try_pass(events);
        }
        None
    }

    fn try_shoot(&mut self, now: f32, events: &mut EventQueue) -> Option<PuckRequest> {
        if !self.has_puck {
            return None;
        }
        if self
            .last_shot_at
            .is_some_and(|at| now - at < self.config.shot_cooldown)
        {
            return None;
        }

        self.last_shot_at = Some(now);
        self.request_state(PlayerState::Shooting, events);
        log::debug!("{} shoots!", self.name);
        Some(PuckRequest::Shoot {
            direction: self.forward(),
            power: self.config.shot_power,
        })
    }

    fn try_pass(&mut self, events: &mut EventQueue) -> Option<PuckRequest> {
        if !self.has_puck {
            return None;
        }
        self.request_state(PlayerState::Passing, events);
        log::debug!("{} passes!", self.name);
        Some(PuckRequest::Pass {
            power: self.config.pass_power,
        })
    }

    fn announce(&self, result: Transition, events: &mut EventQueue) {
        if let Some(change) = result.changed() {
            events.push(GameEvent::state_changed(self.id, change));
        }
    }
}
