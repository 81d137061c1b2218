//! Rink Rush - arcade ice-hockey gameplay core
//!
//! Core modules:
//! - `sim`: Deterministic match simulation (locomotion, puck, AI, referee, score)
//! - `input`: Control signals shared by human and AI players
//! - `config`: Data-driven player, team and match tuning
//!
//! The world is Y-up. Skaters and the puck live on the X-Z "play plane";
//! team A defends the -Z end, team B the +Z end.

pub mod config;
pub mod input;
pub mod sim;

pub use config::{GameplaySettings, PlayerConfig, PlayerPosition, TeamConfig};
pub use input::{Controller, HumanInput, InputSignal, InputSource, RawControls};

use glam::{Vec2, Vec3};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Move-vector magnitude below which input counts as "no input"
    pub const INPUT_DEADZONE: f32 = 0.1;

    /// Puck rests this far above the ice
    pub const PUCK_ICE_HEIGHT: f32 = 0.05;
    pub const PUCK_RADIUS: f32 = 0.15;
    pub const PUCK_MAX_SPEED: f32 = 50.0;
    /// Pass power is softened relative to a shot
    pub const PASS_SOFTENING: f32 = 0.6;

    pub const PLAYER_RADIUS: f32 = 0.4;
    /// Distance ahead of a skater where a carried puck sits
    pub const STICK_REACH: f32 = 0.9;
    /// Distance from a skater within which a loose puck can be collected
    pub const PICKUP_REACH: f32 = 1.0;
    /// A skater can't re-collect the puck this soon after releasing it (seconds)
    pub const RELEASE_COOLDOWN: f32 = 0.3;

    /// Goal is awarded when the puck is this close to a goal anchor
    pub const GOAL_THRESHOLD: f32 = 2.0;
    /// Goal anchors sit this far in from the end boards
    pub const GOAL_LINE_INSET: f32 = 1.0;
    /// Half-width (X) and depth (Z) of the goal trigger volume
    pub const GOAL_ZONE_HALF_WIDTH: f32 = 1.5;
    pub const GOAL_ZONE_DEPTH: f32 = 2.5;

    /// Restart delays (seconds)
    pub const GOAL_FACEOFF_DELAY: f32 = 2.0;
    pub const VIOLATION_FACEOFF_DELAY: f32 = 1.0;
    pub const PERIOD_FACEOFF_DELAY: f32 = 1.0;

    /// Minimum spacing between repeated diagnostics for one entity (seconds)
    pub const DIAGNOSTIC_WINDOW: f32 = 5.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Map a 2-D control vector onto the play plane (x -> X, y -> Z)
#[inline]
pub fn to_plane(v: Vec2) -> Vec3 {
    Vec3::new(v.x, 0.0, v.y)
}

/// Drop the vertical component
#[inline]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Yaw (radians about +Y) that faces along `dir`; 0 faces +Z
#[inline]
pub fn heading_of(dir: Vec3) -> f32 {
    dir.x.atan2(dir.z)
}

/// Unit vector on the play plane for a yaw angle
#[inline]
pub fn forward_of(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, yaw.cos())
}

/// Step `current` toward `target` by at most `max_delta` without overshooting
#[inline]
pub fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let delta = target - current;
    let dist = delta.length();
    if dist <= max_delta || dist == 0.0 {
        target
    } else {
        current + delta / dist * max_delta
    }
}

/// Rotate yaw `current` toward `target` by at most `max_delta`, taking the short way round
#[inline]
pub fn rotate_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = normalize_angle(target - current);
    let step = delta.clamp(-max_delta, max_delta);
    normalize_angle(current + step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_heading_round_trip() {
        let dir = Vec3::new(1.0, 0.0, 0.0);
        let yaw = heading_of(dir);
        assert!((yaw - FRAC_PI_2).abs() < 1e-5);
        assert!((forward_of(yaw) - dir).length() < 1e-5);
    }

    #[test]
    fn test_move_towards_does_not_overshoot() {
        let v = move_towards(Vec3::ZERO, Vec3::new(3.0, 0.0, 4.0), 10.0);
        assert_eq!(v, Vec3::new(3.0, 0.0, 4.0));

        let v = move_towards(Vec3::ZERO, Vec3::new(3.0, 0.0, 4.0), 1.0);
        assert!((v.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_rotate_towards_wraps() {
        // From just below +π to just above -π is a short hop, not a full turn
        let yaw = rotate_towards(PI - 0.1, -PI + 0.1, 0.5);
        assert!(normalize_angle(yaw - (-PI + 0.1)).abs() < 1e-4);

        let yaw = rotate_towards(0.0, FRAC_PI_2, 0.1);
        assert!((yaw - 0.1).abs() < 1e-5);
    }
}
