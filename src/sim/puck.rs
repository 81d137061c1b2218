//! Puck dynamics
//!
//! The puck is either loose (sliding under friction) or possessed by exactly
//! one skater. The owner lives inside [`PuckState`] so "at most one owner" can't
//! be violated by construction.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::player::PlayerId;
use crate::config::GameplaySettings;
use crate::consts::*;
use crate::{flatten, forward_of};

/// Puck possession state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PuckState {
    /// No owner; friction and board bounces apply
    Loose,
    /// Carried on a skater's stick, velocity pinned to zero
    Possessed { owner: PlayerId },
}

/// Puck physics tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PuckConfig {
    pub max_speed: f32,
    /// Fraction of horizontal speed lost per second while loose (0-1)
    pub friction: f32,
    /// Speed kept after a board hit (0-1)
    pub bounciness: f32,
}

impl Default for PuckConfig {
    fn default() -> Self {
        Self::from_settings(&GameplaySettings::default())
    }
}

impl PuckConfig {
    pub fn from_settings(settings: &GameplaySettings) -> Self {
        Self {
            max_speed: settings.puck_max_speed.max(0.0),
            friction: settings.puck_friction.clamp(0.0, 1.0),
            bounciness: settings.puck_bounce.clamp(0.0, 1.0),
        }
    }

    /// Multiplier applied to horizontal velocity for one tick of length `dt`
    pub fn friction_factor(&self, dt: f32) -> f32 {
        (1.0 - self.friction).powf(dt)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Puck {
    pub pos: Vec3,
    pub vel: Vec3,
    pub angular_vel: Vec3,
    state: PuckState,
    config: PuckConfig,
}

impl Puck {
    pub fn new(config: PuckConfig, at: Vec3) -> Self {
        let mut puck = Self {
            pos: Vec3::ZERO,
            vel: Vec3::ZERO,
            angular_vel: Vec3::ZERO,
            state: PuckState::Loose,
            config,
        };
        puck.reset_to_position(at);
        puck
    }

    pub fn state(&self) -> PuckState {
        self.state
    }

    pub fn config(&self) -> &PuckConfig {
        &self.config
    }

    pub fn is_loose(&self) -> bool {
        self.state == PuckState::Loose
    }

    pub fn owner(&self) -> Option<PlayerId> {
        match self.state {
            PuckState::Possessed { owner } => Some(owner),
            PuckState::Loose => None,
        }
    }

    pub fn horizontal_speed(&self) -> f32 {
        flatten(self.vel).length()
    }

    /// Fire the puck along `direction` (flattened onto the ice) and release it
    pub fn shoot(&mut self, direction: Vec3, power: f32) {
        let direction = flatten(direction).normalize_or_zero();
        self.vel = direction * power.max(0.0);
        self.state = PuckState::Loose;
        log::debug!("Puck shot with power {:.1}, direction {:?}", power, direction);
    }

    /// A softened shot
    pub fn pass(&mut self, direction: Vec3, power: f32) {
        self.shoot(direction, power * PASS_SOFTENING);
    }

    pub fn attach_to_player(&mut self, owner: PlayerId) {
        self.state = PuckState::Possessed { owner };
        self.vel = Vec3::ZERO;
    }

    /// Release without changing velocity
    pub fn drop_puck(&mut self) {
        self.state = PuckState::Loose;
    }

    /// Place the puck on the ice at `point`, dead still and loose
    pub fn reset_to_position(&mut self, point: Vec3) {
        self.pos = Vec3::new(point.x, PUCK_ICE_HEIGHT, point.z);
        self.vel = Vec3::ZERO;
        self.angular_vel = Vec3::ZERO;
        self.state = PuckState::Loose;
    }

    /// Keep a carried puck on the owner's stick blade
    pub fn carry(&mut self, owner_pos: Vec3, owner_yaw: f32) {
        if self.is_loose() {
            return;
        }
        let blade = flatten(owner_pos) + forward_of(owner_yaw) * STICK_REACH;
        self.pos = Vec3::new(blade.x, PUCK_ICE_HEIGHT, blade.z);
        self.vel = Vec3::ZERO;
    }

    /// Per-tick physics: friction (loose only), speed clamp, ice pin
    pub fn step(&mut self, dt: f32) {
        if self.is_loose() {
            let factor = self.config.friction_factor(dt);
            self.vel.x *= factor;
            self.vel.z *= factor;
        }

        let horizontal = flatten(self.vel);
        if horizontal.length() > self.config.max_speed {
            let clamped = horizontal.normalize_or_zero() * self.config.max_speed;
            self.vel = Vec3::new(clamped.x, self.vel.y, clamped.z);
        }

        self.pin_to_ice();
    }

    /// Inelastic board hit; the substrate already changed direction
    pub fn on_wall_collision(&mut self) {
        self.vel *= self.config.bounciness;
    }

    fn pin_to_ice(&mut self) {
        self.pos.y = PUCK_ICE_HEIGHT;
        self.vel.y = 0.0;
    }
}
