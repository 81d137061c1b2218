//! Referee: goals, stoppages and faceoffs
//!
//! Restarts are deadlines on the simulation clock rather than blocking waits.
//! A new stoppage while a restart is pending replaces it (latest call wins).

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::events::{EventQueue, GameEvent};
use super::player::Team;
use super::puck::Puck;
use super::score::ScoreManager;
use crate::config::GameplaySettings;
use crate::consts::*;

/// Stoppage calls (adjudication itself lives outside the core)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Violation {
    Icing,
    Offside,
    GoalieInterference,
}

/// Goal mouths, keyed by the team that defends them
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalAnchors {
    pub team_a: Vec3,
    pub team_b: Vec3,
}

impl GoalAnchors {
    pub fn from_settings(settings: &GameplaySettings) -> Self {
        let z = (settings.half_length() - GOAL_LINE_INSET).max(0.0);
        Self {
            team_a: Vec3::new(0.0, 0.0, -z),
            team_b: Vec3::new(0.0, 0.0, z),
        }
    }

    /// Goal `team` protects
    pub fn defended_by(&self, team: Team) -> Vec3 {
        match team {
            Team::A => self.team_a,
            Team::B => self.team_b,
        }
    }

    /// Goal `team` shoots at
    pub fn attacked_by(&self, team: Team) -> Vec3 {
        self.defended_by(team.opponent())
    }
}

#[derive(Debug, Clone)]
pub struct RefereeSystem {
    puck_in_play: bool,
    anchors: GoalAnchors,
    center: Vec3,
    goal_threshold: f32,
    pending_faceoff: Option<f32>,
    icing_enabled: bool,
    offside_enabled: bool,
}

impl RefereeSystem {
    pub fn new(settings: &GameplaySettings) -> Self {
        Self {
            puck_in_play: true,
            anchors: GoalAnchors::from_settings(settings),
            center: Vec3::ZERO,
            goal_threshold: GOAL_THRESHOLD,
            pending_faceoff: None,
            icing_enabled: settings.icing_enabled,
            offside_enabled: settings.offside_enabled,
        }
    }

    pub fn is_puck_in_play(&self) -> bool {
        self.puck_in_play
    }

    pub fn anchors(&self) -> &GoalAnchors {
        &self.anchors
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Deadline of the scheduled faceoff, if any
    pub fn pending_faceoff(&self) -> Option<f32> {
        self.pending_faceoff
    }

    /// Puck overlaps the goal zone `defending` protects; award a goal if it's deep enough
    ///
    /// Returns the scoring team when a goal was given.
    pub fn on_goal_zone(
        &mut self,
        defending: Team,
        puck_pos: Vec3,
        now: f32,
        scores: &mut ScoreManager,
        events: &mut EventQueue,
    ) -> Option<Team> {
        if !self.puck_in_play {
            return None;
        }
        let anchor = self.anchors.defended_by(defending);
        if puck_pos.distance(anchor) >= self.goal_threshold {
            return None;
        }

        let scoring = defending.opponent();
        self.puck_in_play = false;
        scores.score_goal(scoring, events);
        log::info!("[Referee] Goal by Team {}!", scoring.as_str());
        self.schedule_faceoff(now + GOAL_FACEOFF_DELAY);
        Some(scoring)
    }

    /// Stop play for a rules call; returns false if that rule is switched off
    pub fn call_violation(&mut self, kind: Violation, now: f32, events: &mut EventQueue) -> bool {
        let enabled = match kind {
            Violation::Icing => self.icing_enabled,
            Violation::Offside => self.offside_enabled,
            Violation::GoalieInterference => true,
        };
        if !enabled {
            log::debug!("[Referee] Ignoring {:?}, rule disabled", kind);
            return false;
        }

        self.puck_in_play = false;
        events.push(GameEvent::ViolationCalled { kind });
        log::info!("[Referee] Violation: {:?}", kind);
        self.schedule_faceoff(now + VIOLATION_FACEOFF_DELAY);
        true
    }

    /// Schedule (or reschedule) the restart
    pub fn schedule_faceoff(&mut self, at: f32) {
        if let Some(previous) = self.pending_faceoff {
            log::debug!("[Referee] Faceoff at {:.2}s replaced by {:.2}s", previous, at);
        }
        self.pending_faceoff = Some(at);
    }

    pub fn cancel_faceoff(&mut self) {
        self.pending_faceoff = None;
    }

    /// Has the scheduled restart come due?
    pub fn faceoff_due(&self, now: f32) -> bool {
        self.pending_faceoff.is_some_and(|at| now >= at)
    }

    /// Drop the puck at center ice and resume play
    pub fn call_faceoff(&mut self, puck: &mut Puck, events: &mut EventQueue) {
        self.pending_faceoff = None;
        self.puck_in_play = true;
        puck.reset_to_position(self.center);
        events.push(GameEvent::Faceoff);
        log::info!("[Referee] Faceoff!");
    }

    pub fn stop_play(&mut self) {
        self.puck_in_play = false;
    }

    pub fn resume_play(&mut self) {
        self.puck_in_play = true;
    }
}
