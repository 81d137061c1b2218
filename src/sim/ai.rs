//! AI decision loop
//!
//! An [`AgentBrain`] drives one skater through the same [`InputSignal`] a human
//! produces. It only thinks every `reaction_time` seconds; in between the last
//! decision's stick input persists.

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::config::{GameplaySettings, TeamConfig};
use crate::input::{InputSignal, InputSource, SourceContext};
use crate::{flatten, forward_of};

/// Distance to the target below which the skater holds position
const ARRIVE_DISTANCE: f32 = 1.0;
/// Shoot when this close to the attacked goal...
const SHOT_RANGE: f32 = 12.0;
/// ...and facing it at least this squarely (cosine)
const SHOT_ALIGNMENT: f32 = 0.8;

/// Per-difficulty (easy, medium, hard) sprint trigger distance and lateral aim error
const SPRINT_DISTANCE: [f32; 3] = [f32::INFINITY, 12.0, 6.0];
const AIM_JITTER: [f32; 3] = [3.0, 1.5, 0.5];

#[derive(Debug, Clone)]
pub struct AgentBrain {
    home: Vec3,
    /// Seconds between decisions
    pub reaction_time: f32,
    /// Magnitude of the produced move vector
    pub pursuit_speed: f32,
    /// 0 = stay home, 1 = chase the puck
    pub positioning_weight: f32,
    /// Hold sprint while the target is farther than this
    pub sprint_distance: f32,
    aim_jitter: f32,
    next_decision_at: f32,
    signal: InputSignal,
    rng: Pcg32,
}

impl AgentBrain {
    pub fn new(home: Vec3, seed: u64) -> Self {
        Self {
            home,
            reaction_time: 0.2,
            pursuit_speed: 0.8,
            positioning_weight: 0.5,
            sprint_distance: f32::INFINITY,
            aim_jitter: 0.0,
            next_decision_at: 0.0,
            signal: InputSignal::default(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Brain tuned from match settings; stronger defense reacts faster
    pub fn from_settings(home: Vec3, settings: &GameplaySettings, team: &TeamConfig, seed: u64) -> Self {
        let difficulty = usize::from(settings.ai_difficulty.min(2));
        let defense = if team.defense_multiplier > 0.0 {
            team.defense_multiplier
        } else {
            1.0
        };
        Self {
            reaction_time: settings.ai_reaction_time.max(0.0) / defense,
            sprint_distance: SPRINT_DISTANCE[difficulty],
            aim_jitter: AIM_JITTER[difficulty],
            ..Self::new(home, seed)
        }
    }

    pub fn home(&self) -> Vec3 {
        self.home
    }

    pub fn set_home(&mut self, home: Vec3) {
        self.home = home;
    }

    /// Last decision (levels and triggers as decided)
    pub fn last_signal(&self) -> &InputSignal {
        &self.signal
    }

    /// Point the skater heads for when it doesn't have the puck
    pub fn target_point(&self, puck_position: Vec3) -> Vec3 {
        self.home.lerp(puck_position, self.positioning_weight)
    }

    /// Think once: where to skate and whether to shoot
    pub fn decide(&mut self, ctx: &SourceContext) -> InputSignal {
        let mut signal = InputSignal::default();

        let target = if ctx.has_puck {
            let aim = if self.aim_jitter > 0.0 {
                self.rng.random_range(-self.aim_jitter..=self.aim_jitter)
            } else {
                0.0
            };
            ctx.attack_goal + Vec3::X * aim
        } else {
            self.target_point(ctx.puck_position)
        };

        let to_target = flatten(target - ctx.position);
        if to_target.length() > ARRIVE_DISTANCE {
            let dir = to_target.normalize();
            signal.move_vector = Vec2::new(dir.x, dir.z) * self.pursuit_speed;
            signal.sprint_held = to_target.length() > self.sprint_distance;
        }

        if ctx.has_puck {
            let to_goal = flatten(ctx.attack_goal - ctx.position);
            let facing = forward_of(ctx.yaw).dot(to_goal.normalize_or_zero());
            if to_goal.length() <= SHOT_RANGE && facing > SHOT_ALIGNMENT {
                signal.shoot_performed = true;
            }
        }

        signal
    }
}

impl InputSource for AgentBrain {
    fn poll(&mut self, ctx: &SourceContext) -> Option<InputSignal> {
        if ctx.now >= self.next_decision_at {
            self.signal = self.decide(ctx);
            self.next_decision_at = ctx.now + self.reaction_time;
            return Some(self.signal);
        }
        // Triggers fire once; stick and sprint carry over
        Some(self.signal.levels_only())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_at(position: Vec3, puck: Vec3, now: f32) -> SourceContext {
        SourceContext {
            now,
            position,
            yaw: 0.0,
            has_puck: false,
            puck_position: puck,
            attack_goal: Vec3::new(0.0, 0.0, 29.0),
        }
    }

    #[test]
    fn test_target_blends_home_and_puck() {
        let mut brain = AgentBrain::new(Vec3::new(0.0, 0.0, -20.0), 1);
        brain.positioning_weight = 0.5;
        assert_eq!(brain.target_point(Vec3::ZERO), Vec3::new(0.0, 0.0, -10.0));

        let signal = brain.decide(&ctx_at(Vec3::new(0.0, 0.0, -20.0), Vec3::ZERO, 0.0));
        let expected = Vec2::new(0.0, 1.0) * brain.pursuit_speed;
        assert!((signal.move_vector - expected).length() < 1e-5);
        assert!(!signal.shoot_performed);
    }

    #[test]
    fn test_holds_position_when_close() {
        let mut brain = AgentBrain::new(Vec3::new(0.0, 0.0, -20.0), 1);
        let signal = brain.decide(&ctx_at(Vec3::new(0.5, 0.0, -10.0), Vec3::ZERO, 0.0));
        assert_eq!(signal.move_vector, Vec2::ZERO);
    }

    #[test]
    fn test_decisions_follow_reaction_time() {
        let mut brain = AgentBrain::new(Vec3::ZERO, 1);
        brain.reaction_time = 0.2;

        let first = brain
            .poll(&ctx_at(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 0.0))
            .expect("brains always answer");
        assert!(first.move_vector.x > 0.0);

        // Puck jumped to the other side, but the brain hasn't reacted yet
        let stale = brain
            .poll(&ctx_at(Vec3::ZERO, Vec3::new(-10.0, 0.0, 0.0), 0.1))
            .expect("brains always answer");
        assert_eq!(stale.move_vector, first.move_vector);

        let fresh = brain
            .poll(&ctx_at(Vec3::ZERO, Vec3::new(-10.0, 0.0, 0.0), 0.2))
            .expect("brains always answer");
        assert!(fresh.move_vector.x < 0.0);
    }

    #[test]
    fn test_shoots_when_lined_up_with_goal() {
        let mut brain = AgentBrain::new(Vec3::ZERO, 1);
        let mut ctx = ctx_at(Vec3::new(0.0, 0.0, 20.0), Vec3::new(0.0, 0.0, 20.9), 0.0);
        ctx.has_puck = true;

        let signal = brain.poll(&ctx).expect("brains always answer");
        assert!(signal.shoot_performed);
        assert!(signal.move_vector.y > 0.0, "carries toward the goal");

        // Trigger is one-shot until the next decision
        ctx.now = 0.05;
        assert!(!brain.poll(&ctx).expect("brains always answer").shoot_performed);
    }

    #[test]
    fn test_no_shot_from_distance_or_facing_away() {
        let mut brain = AgentBrain::new(Vec3::ZERO, 1);
        let mut ctx = ctx_at(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO, 0.0);
        ctx.has_puck = true;
        assert!(!brain.decide(&ctx).shoot_performed);

        ctx.position = Vec3::new(0.0, 0.0, 22.0);
        ctx.yaw = std::f32::consts::PI;
        assert!(!brain.decide(&ctx).shoot_performed);
    }

    #[test]
    fn test_settings_tune_the_brain() {
        let settings = GameplaySettings {
            ai_difficulty: 2,
            ai_reaction_time: 0.4,
            ..Default::default()
        };
        let team = TeamConfig {
            defense_multiplier: 2.0,
            ..Default::default()
        };
        let brain = AgentBrain::from_settings(Vec3::ZERO, &settings, &team, 9);
        assert!((brain.reaction_time - 0.2).abs() < 1e-6);
        assert_eq!(brain.sprint_distance, 6.0);
    }

    #[test]
    fn test_harder_brains_sprint_sooner() {
        let team = TeamConfig::default();
        let brain_at = |difficulty| {
            let settings = GameplaySettings {
                ai_difficulty: difficulty,
                ..Default::default()
            };
            AgentBrain::from_settings(Vec3::new(0.0, 0.0, -20.0), &settings, &team, 3)
        };
        // Target is 10 units away
        let ctx = ctx_at(Vec3::new(0.0, 0.0, -20.0), Vec3::ZERO, 0.0);

        assert!(!brain_at(0).decide(&ctx).sprint_held);
        assert!(!brain_at(1).decide(&ctx).sprint_held);
        assert!(brain_at(2).decide(&ctx).sprint_held);

        let close = ctx_at(Vec3::new(0.0, 0.0, -12.0), Vec3::ZERO, 0.0);
        assert!(!brain_at(2).decide(&close).sprint_held);
    }
}
