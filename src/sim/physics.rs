//! Physics substrate boundary
//!
//! The match core never integrates positions itself. It hands its bodies to a
//! [`PhysicsSubstrate`] once per tick and reacts to the [`Contact`]s that come
//! back. [`KinematicRink`] is a plain rectangular rink good enough for headless
//! play and tests; an engine integration would provide its own substrate.

use glam::Vec3;

use super::player::{PlayerEntity, PlayerId, Team};
use super::puck::Puck;
use super::referee::GoalAnchors;
use crate::config::GameplaySettings;
use crate::consts::*;
use crate::flatten;

/// A body the substrate can move
pub trait Mobile {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, pos: Vec3);
    fn velocity(&self) -> Vec3;
    fn set_velocity(&mut self, vel: Vec3);
    fn radius(&self) -> f32;
}

impl Mobile for PlayerEntity {
    fn position(&self) -> Vec3 {
        self.pos
    }
    fn set_position(&mut self, pos: Vec3) {
        self.pos = pos;
    }
    fn velocity(&self) -> Vec3 {
        self.vel
    }
    fn set_velocity(&mut self, vel: Vec3) {
        self.vel = vel;
    }
    fn radius(&self) -> f32 {
        PLAYER_RADIUS
    }
}

impl Mobile for Puck {
    fn position(&self) -> Vec3 {
        self.pos
    }
    fn set_position(&mut self, pos: Vec3) {
        self.pos = pos;
    }
    fn velocity(&self) -> Vec3 {
        self.vel
    }
    fn set_velocity(&mut self, vel: Vec3) {
        self.vel = vel;
    }
    fn radius(&self) -> f32 {
        PUCK_RADIUS
    }
}

/// Collision/trigger notifications reported back to the core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Puck struck the boards (collision-enter with a wall)
    PuckHitWall,
    /// Puck is within stick reach of a skater
    PlayerTouchedPuck(PlayerId),
    /// Puck overlaps the goal zone defended by this team
    PuckInGoalZone(Team),
}

pub trait PhysicsSubstrate {
    /// Integrate all bodies by `dt` and report what touched what
    fn step(&mut self, players: &mut [PlayerEntity], puck: &mut Puck, dt: f32) -> Vec<Contact>;
}

/// Reflect velocity off a surface with the given normal
#[inline]
pub fn reflect_velocity(velocity: Vec3, normal: Vec3) -> Vec3 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Result of pushing a body back inside the boards
#[derive(Debug, Clone, Copy)]
pub struct WallHit {
    /// Corrected position
    pub pos: Vec3,
    /// Inward normal of the wall(s) hit (summed at corners)
    pub normal: Vec3,
}

/// Keep a round body inside an axis-aligned rink centered on the origin
pub fn rink_wall_collision(pos: Vec3, radius: f32, half_width: f32, half_length: f32) -> Option<WallHit> {
    let max_x = (half_width - radius).max(0.0);
    let max_z = (half_length - radius).max(0.0);
    let mut corrected = pos;
    let mut normal = Vec3::ZERO;

    if pos.x > max_x {
        corrected.x = max_x;
        normal.x -= 1.0;
    } else if pos.x < -max_x {
        corrected.x = -max_x;
        normal.x += 1.0;
    }
    if pos.z > max_z {
        corrected.z = max_z;
        normal.z -= 1.0;
    } else if pos.z < -max_z {
        corrected.z = -max_z;
        normal.z += 1.0;
    }

    (normal != Vec3::ZERO).then(|| WallHit {
        pos: corrected,
        normal: normal.normalize(),
    })
}

/// Rectangular rink with boards, two goal zones and stick-reach pickup
#[derive(Debug, Clone)]
pub struct KinematicRink {
    pub half_width: f32,
    pub half_length: f32,
    pub goals: GoalAnchors,
    pub zone_half_width: f32,
    pub zone_depth: f32,
    pub pickup_reach: f32,
}

impl KinematicRink {
    pub fn new(settings: &GameplaySettings) -> Self {
        Self {
            half_width: settings.half_width(),
            half_length: settings.half_length(),
            goals: GoalAnchors::from_settings(settings),
            zone_half_width: GOAL_ZONE_HALF_WIDTH,
            zone_depth: GOAL_ZONE_DEPTH,
            pickup_reach: PICKUP_REACH,
        }
    }

    fn in_zone(&self, pos: Vec3, anchor: Vec3) -> bool {
        (pos.x - anchor.x).abs() <= self.zone_half_width && (pos.z - anchor.z).abs() <= self.zone_depth
    }

    fn integrate<M: Mobile>(body: &mut M, dt: f32) {
        let pos = body.position() + flatten(body.velocity()) * dt;
        body.set_position(pos);
    }
}

impl PhysicsSubstrate for KinematicRink {
    fn step(&mut self, players: &mut [PlayerEntity], puck: &mut Puck, dt: f32) -> Vec<Contact> {
        let mut contacts = Vec::new();

        // Skaters stop dead against the boards
        for player in players.iter_mut() {
            Self::integrate(player, dt);
            if let Some(hit) = rink_wall_collision(player.position(), player.radius(), self.half_width, self.half_length) {
                player.pos = hit.pos;
                let into_wall = player.vel.dot(hit.normal);
                if into_wall < 0.0 {
                    player.vel -= hit.normal * into_wall;
                }
            }
        }

        // The puck reflects; the core damps it on PuckHitWall
        Self::integrate(puck, dt);
        if let Some(hit) = rink_wall_collision(puck.position(), puck.radius(), self.half_width, self.half_length) {
            puck.pos = hit.pos;
            if puck.vel.dot(hit.normal) < 0.0 {
                puck.vel = reflect_velocity(puck.vel, hit.normal);
                contacts.push(Contact::PuckHitWall);
            }
        }

        for team in Team::BOTH {
            if self.in_zone(puck.pos, self.goals.defended_by(team)) {
                contacts.push(Contact::PuckInGoalZone(team));
            }
        }

        for player in players.iter() {
            if flatten(player.pos - puck.pos).length() <= self.pickup_reach {
                contacts.push(Contact::PlayerTouchedPuck(player.id));
            }
        }

        contacts
    }
}
