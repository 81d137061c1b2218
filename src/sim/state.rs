//! Match state
//!
//! Everything a match owns lives in [`MatchState`]: skaters, their controllers,
//! the puck and the referee/score/clock services. Nothing is global; callers
//! hold one `MatchState` and pass it to [`tick`](super::tick::tick).

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::ai::AgentBrain;
use super::clock::{MatchClock, PeriodOutcome};
use super::events::{EventQueue, GameEvent};
use super::player::{ControlSource, PlayerEntity, PlayerId, PuckRequest, Team};
use super::puck::{Puck, PuckConfig};
use super::referee::{RefereeSystem, Violation};
use super::score::ScoreManager;
use super::state_machine::PlayerState;
use crate::config::{GameplaySettings, PlayerConfig, TeamConfig};
use crate::consts::*;
use crate::flatten;
use crate::input::{Controller, HumanInput, RawControls, SourceContext};

/// Overall match flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    Playing,
    Paused,
    GameOver,
}

/// Team A spawn points in roster order; team B mirrors them through center ice
const TEAM_A_SPAWNS: [Vec3; 6] = [
    Vec3::new(0.0, 0.0, -27.0),
    Vec3::new(-5.0, 0.0, -20.0),
    Vec3::new(5.0, 0.0, -20.0),
    Vec3::new(-8.0, 0.0, -5.0),
    Vec3::new(0.0, 0.0, -2.0),
    Vec3::new(8.0, 0.0, -5.0),
];

fn spawn_point(team: Team, slot: usize) -> Vec3 {
    let a = TEAM_A_SPAWNS[slot % TEAM_A_SPAWNS.len()];
    match team {
        Team::A => a,
        Team::B => -a,
    }
}

#[derive(Debug, Clone)]
pub struct MatchState {
    pub seed: u64,
    pub settings: GameplaySettings,
    pub phase: MatchPhase,
    /// Simulation time (seconds)
    pub time: f32,
    pub time_ticks: u64,
    /// Indexed by `PlayerId`
    pub players: Vec<PlayerEntity>,
    controllers: Vec<Option<Controller>>,
    teams: [TeamConfig; 2],
    human: Option<PlayerId>,
    pub puck: Puck,
    pub referee: RefereeSystem,
    pub scores: ScoreManager,
    pub clock: MatchClock,
    pub events: EventQueue,
}

impl MatchState {
    /// Rink with a puck at center ice and no skaters yet
    pub fn empty(settings: &GameplaySettings, seed: u64) -> Self {
        let settings = settings.sanitized();
        Self {
            seed,
            phase: MatchPhase::Playing,
            time: 0.0,
            time_ticks: 0,
            players: Vec::new(),
            controllers: Vec::new(),
            teams: [TeamConfig::default(), TeamConfig::default()],
            human: None,
            puck: Puck::new(PuckConfig::from_settings(&settings), Vec3::ZERO),
            referee: RefereeSystem::new(&settings),
            scores: ScoreManager::new(),
            clock: MatchClock::new(&settings),
            events: EventQueue::new(),
            settings,
        }
    }

    /// Full six-a-side match; `human` picks the (team, roster slot) a person controls
    pub fn new(
        settings: &GameplaySettings,
        team_a: &TeamConfig,
        team_b: &TeamConfig,
        human: Option<(Team, usize)>,
        seed: u64,
    ) -> Self {
        let mut state = Self::empty(settings, seed);
        state.teams = [team_a.clone(), team_b.clone()];

        if let Some((team, slot)) = human.filter(|&(_, slot)| slot >= TEAM_A_SPAWNS.len()) {
            log::warn!(
                "No roster slot {} on team {}, nobody is human-controlled",
                slot,
                team.as_str()
            );
        }

        for team in Team::BOTH {
            let roster = state.teams[team.index()].clone();
            for slot in 0..TEAM_A_SPAWNS.len() {
                let base = match roster.roster.get(slot) {
                    Some(config) => config.clone(),
                    None => {
                        log::warn!(
                            "[{}] No roster entry for slot {}, using defaults",
                            roster.team_name,
                            slot
                        );
                        PlayerConfig::default()
                    }
                };
                let config = base.with_team_modifiers(&roster);
                let is_human = human == Some((team, slot));
                state.spawn_player(team, &config, spawn_point(team, slot), is_human);
            }
        }

        log::info!(
            "Match set up: {} vs {} ({} skaters, seed {})",
            team_a.team_name,
            team_b.team_name,
            state.players.len(),
            seed
        );
        state
    }

    /// Add a skater; humans get the device adapter, everyone else a brain homed on `spawn`
    pub fn spawn_player(&mut self, team: Team, config: &PlayerConfig, spawn: Vec3, human: bool) -> PlayerId {
        let id = self.players.len() as PlayerId;
        self.players.push(PlayerEntity::new(id, team, config, spawn));
        self.controllers.push(None);

        let controller = if human {
            Controller::Human(HumanInput::new())
        } else {
            Controller::Ai(Box::new(self.brain_for(id)))
        };
        self.set_controller(id, Some(controller));
        id
    }

    fn brain_for(&self, id: PlayerId) -> AgentBrain {
        let player = &self.players[id as usize];
        let seed = self.seed.wrapping_mul(0x9E37_79B9_7F4A_7C15).wrapping_add(u64::from(id));
        AgentBrain::from_settings(player.spawn, &self.settings, &self.teams[player.team.index()], seed)
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerEntity> {
        self.players.get(id as usize)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut PlayerEntity> {
        self.players.get_mut(id as usize)
    }

    pub fn team_players(&self, team: Team) -> impl Iterator<Item = &PlayerEntity> {
        self.players.iter().filter(move |p| p.team == team)
    }

    /// Skater currently under human control
    pub fn human_player(&self) -> Option<PlayerId> {
        self.human
    }

    pub fn controller(&self, id: PlayerId) -> Option<&Controller> {
        self.controllers.get(id as usize).and_then(|c| c.as_ref())
    }

    /// Bind (or unbind with `None`) the controller driving a skater
    ///
    /// There is one human at a time: binding a human here hands the previous
    /// human's skater to a fresh brain.
    pub fn set_controller(&mut self, id: PlayerId, controller: Option<Controller>) {
        if id as usize >= self.controllers.len() {
            return;
        }
        let source = controller.as_ref().map(Controller::source);
        if source == Some(ControlSource::Human) {
            if let Some(previous) = self.human.filter(|&p| p != id) {
                log::debug!("Human control moves from {} to {}", previous, id);
                let brain = self.brain_for(previous);
                self.controllers[previous as usize] = Some(Controller::Ai(Box::new(brain)));
                self.players[previous as usize].control = ControlSource::Ai;
            }
            self.human = Some(id);
        } else if self.human == Some(id) {
            self.human = None;
        }
        if let Some(source) = source {
            self.players[id as usize].control = source;
        }
        self.controllers[id as usize] = controller;
    }

    /// Hand this tick's device state to the human adapter
    pub fn feed_human(&mut self, raw: RawControls) {
        let Some(id) = self.human else {
            return;
        };
        if let Some(Some(Controller::Human(human))) = self.controllers.get_mut(id as usize) {
            human.feed(raw);
        }
    }

    pub(crate) fn source_context(&self, id: PlayerId) -> SourceContext {
        let player = &self.players[id as usize];
        SourceContext {
            now: self.time,
            position: player.pos,
            yaw: player.yaw,
            has_puck: player.has_puck,
            puck_position: self.puck.pos,
            attack_goal: self.referee.anchors().attacked_by(player.team),
        }
    }

    pub(crate) fn controller_slot_mut(&mut self, id: PlayerId) -> Option<&mut Controller> {
        self.controllers.get_mut(id as usize).and_then(|c| c.as_mut())
    }

    // ------------------------------------------------------------------
    // Possession
    // ------------------------------------------------------------------

    /// Give the puck to a skater in one assignment, clearing any previous holder
    pub fn attach_puck(&mut self, id: PlayerId) {
        if id as usize >= self.players.len() || self.puck.owner() == Some(id) {
            return;
        }
        if let Some(previous) = self.puck.owner() {
            self.players[previous as usize].has_puck = false;
        }
        self.puck.attach_to_player(id);
        let player = &mut self.players[id as usize];
        player.has_puck = true;
        self.puck.carry(player.pos, player.yaw);
        self.events.push(GameEvent::PossessionChanged { player: Some(id) });
        log::debug!("{} has the puck", player.name);
    }

    /// Knock the puck loose (keeps its velocity)
    pub fn drop_puck(&mut self) {
        let Some(owner) = self.puck.owner() else {
            return;
        };
        self.players[owner as usize].mark_released(self.time);
        self.puck.drop_puck();
        self.events.push(GameEvent::PossessionChanged { player: None });
    }

    /// Carry out a shot or pass; ignored unless `id` holds the puck
    pub(crate) fn apply_puck_request(&mut self, id: PlayerId, request: PuckRequest) {
        if self.puck.owner() != Some(id) {
            return;
        }
        match request {
            PuckRequest::Shoot { direction, power } => {
                self.puck.shoot(direction, power);
                self.events.push(GameEvent::PuckShot { player: id, power });
            }
            PuckRequest::Pass { power } => {
                let direction = self.pass_direction(id);
                self.puck.pass(direction, power);
                self.events.push(GameEvent::PuckPassed { player: id, power });
            }
        }
        self.players[id as usize].mark_released(self.time);
        self.events.push(GameEvent::PossessionChanged { player: None });
    }

    /// Toward the nearest teammate ahead of the passer, else straight ahead
    pub fn pass_direction(&self, id: PlayerId) -> Vec3 {
        let passer = &self.players[id as usize];
        let forward = passer.forward();
        self.team_players(passer.team)
            .filter(|p| p.id != id)
            .map(|p| flatten(p.pos - passer.pos))
            .filter(|to| to.length() > 0.0 && forward.dot(to.normalize()) >= std::f32::consts::FRAC_1_SQRT_2)
            .min_by(|a, b| a.length().total_cmp(&b.length()))
            .map(|to| to.normalize())
            .unwrap_or(forward)
    }

    // ------------------------------------------------------------------
    // Rules surface
    // ------------------------------------------------------------------

    pub fn call_violation(&mut self, kind: Violation) -> bool {
        self.referee.call_violation(kind, self.time, &mut self.events)
    }

    pub fn stop_play(&mut self) {
        self.referee.stop_play();
    }

    pub fn resume_play(&mut self) {
        self.referee.resume_play();
    }

    /// Knock a skater down; a carried puck comes loose
    pub fn stun_player(&mut self, id: PlayerId) {
        if self.puck.owner() == Some(id) {
            self.drop_puck();
        }
        if let Some(player) = self.players.get_mut(id as usize) {
            player.request_state(PlayerState::Stunned, &mut self.events);
        }
    }

    /// Puck to center, everyone back to their spot and cleared to Idle
    pub fn call_faceoff(&mut self) {
        if let Some(owner) = self.puck.owner() {
            self.players[owner as usize].has_puck = false;
        }
        self.referee.call_faceoff(&mut self.puck, &mut self.events);
        for player in &mut self.players {
            player.has_puck = false;
            player.force_idle(&mut self.events);
            player.return_to_spawn();
        }
    }

    /// React to a goal already credited by the referee
    pub(crate) fn on_goal(&mut self, scoring: Team) {
        for player in self.players.iter_mut().filter(|p| p.team == scoring) {
            player.request_state(PlayerState::Celebrating, &mut self.events);
        }
        if self.clock.is_sudden_death() {
            self.end_match();
        }
    }

    /// A period ran out
    pub(crate) fn on_period_end(&mut self, period: u32) {
        self.referee.stop_play();
        self.events.push(GameEvent::PeriodEnded { period });
        log::info!("End of period {}", period);

        let tied = self.scores.leading_team().is_none();
        match self.clock.begin_next(tied) {
            PeriodOutcome::NextPeriod | PeriodOutcome::Overtime => {
                self.referee.schedule_faceoff(self.time + PERIOD_FACEOFF_DELAY);
            }
            PeriodOutcome::MatchOver => self.end_match(),
        }
    }

    pub fn end_match(&mut self) {
        if self.phase == MatchPhase::GameOver {
            return;
        }
        self.clock.finish();
        self.referee.stop_play();
        self.referee.cancel_faceoff();
        let winner = self.scores.leading_team();
        self.events.push(GameEvent::MatchEnded { winner });
        self.set_phase(MatchPhase::GameOver);
        log::info!(
            "Match over: {}",
            winner.map_or("tie".to_string(), |t| format!("Team {} wins", t.as_str()))
        );
    }

    pub(crate) fn set_phase(&mut self, phase: MatchPhase) {
        if self.phase == phase {
            return;
        }
        let previous = self.phase;
        self.phase = phase;
        self.events.push(GameEvent::PhaseChanged {
            previous,
            new: phase,
        });
    }

    /// Move human control to the teammate nearest the puck
    pub fn switch_human(&mut self) -> Option<PlayerId> {
        let current = self.human?;
        let team = self.players[current as usize].team;
        let puck_pos = self.puck.pos;
        let next = self
            .team_players(team)
            .filter(|p| p.id != current)
            .min_by(|a, b| {
                let da = flatten(a.pos - puck_pos).length();
                let db = flatten(b.pos - puck_pos).length();
                da.total_cmp(&db)
            })?
            .id;

        let human = self.controllers[current as usize].take();
        let brain = self.brain_for(current);
        self.set_controller(current, Some(Controller::Ai(Box::new(brain))));
        self.set_controller(next, human);

        self.events.push(GameEvent::ControlSwitched {
            from: current,
            to: next,
        });
        log::info!(
            "Control switched: {} -> {}",
            self.players[current as usize].name,
            self.players[next as usize].name
        );
        Some(next)
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_match(human: Option<(Team, usize)>) -> MatchState {
        MatchState::new(
            &GameplaySettings::default(),
            &TeamConfig::default(),
            &TeamConfig::default(),
            human,
            42,
        )
    }

    #[test]
    fn test_team_setup() {
        let state = full_match(Some((Team::A, 4)));
        assert_eq!(state.players.len(), 12);
        assert_eq!(state.team_players(Team::B).count(), 6);
        assert_eq!(state.human_player(), Some(4));
        assert_eq!(state.players[4].control, ControlSource::Human);
        assert_eq!(state.players[4].pos, Vec3::new(0.0, 0.0, -2.0));
        // Team B is mirrored
        assert_eq!(state.players[6].pos, Vec3::new(0.0, 0.0, 27.0));
        assert!(state
            .players
            .iter()
            .filter(|p| p.id != 4)
            .all(|p| p.control == ControlSource::Ai));
    }

    #[test]
    fn test_out_of_range_human_slot_leaves_all_ai() {
        let state = full_match(Some((Team::B, 6)));
        assert_eq!(state.players.len(), 12);
        assert_eq!(state.human_player(), None);
        assert!(state.players.iter().all(|p| p.control == ControlSource::Ai));
    }

    #[test]
    fn test_binding_second_human_demotes_first() {
        let mut state = full_match(Some((Team::A, 4)));
        state.set_controller(2, Some(Controller::Human(HumanInput::new())));

        assert_eq!(state.human_player(), Some(2));
        assert_eq!(state.players[2].control, ControlSource::Human);
        assert_eq!(state.players[4].control, ControlSource::Ai);
        assert!(matches!(state.controller(4), Some(Controller::Ai(_))));
        assert_eq!(
            state
                .players
                .iter()
                .filter(|p| p.control == ControlSource::Human)
                .count(),
            1
        );
    }

    #[test]
    fn test_attach_moves_possession_atomically() {
        let mut state = full_match(None);
        state.attach_puck(3);
        state.attach_puck(8);
        assert_eq!(state.puck.owner(), Some(8));
        assert!(!state.players[3].has_puck);
        assert!(state.players[8].has_puck);
        assert_eq!(state.players.iter().filter(|p| p.has_puck).count(), 1);
    }

    #[test]
    fn test_request_ignored_for_non_owner() {
        let mut state = full_match(None);
        state.attach_puck(2);
        state.apply_puck_request(
            5,
            PuckRequest::Shoot {
                direction: Vec3::Z,
                power: 25.0,
            },
        );
        assert_eq!(state.puck.owner(), Some(2));
    }

    #[test]
    fn test_pass_goes_to_teammate_ahead() {
        let mut state = MatchState::empty(&GameplaySettings::default(), 1);
        let passer = state.spawn_player(Team::A, &PlayerConfig::default(), Vec3::ZERO, false);
        state.spawn_player(Team::A, &PlayerConfig::default(), Vec3::new(2.0, 0.0, 3.0), false);
        state.spawn_player(Team::A, &PlayerConfig::default(), Vec3::new(0.0, 0.0, -2.0), false);

        let dir = state.pass_direction(passer);
        assert!((dir - Vec3::new(2.0, 0.0, 3.0).normalize()).length() < 1e-5);

        // Nobody ahead: straight along the facing
        state.players[1].pos = Vec3::new(5.0, 0.0, 0.0);
        assert!((state.pass_direction(passer) - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_switch_to_teammate_nearest_puck() {
        let mut state = full_match(Some((Team::A, 0)));
        state.puck.reset_to_position(Vec3::new(8.0, 0.0, -6.0));

        let next = state.switch_human();
        assert_eq!(next, Some(5));
        assert_eq!(state.human_player(), Some(5));
        assert_eq!(state.players[5].control, ControlSource::Human);
        assert_eq!(state.players[0].control, ControlSource::Ai);
        assert!(matches!(state.controller(0), Some(Controller::Ai(_))));
        assert!(state
            .drain_events()
            .contains(&GameEvent::ControlSwitched { from: 0, to: 5 }));
    }

    #[test]
    fn test_faceoff_clears_everything() {
        let mut state = full_match(None);
        state.attach_puck(4);
        state.players[4].pos = Vec3::new(6.0, 0.0, 6.0);
        state.players[4].request_state(PlayerState::Celebrating, &mut state.events);
        state.stop_play();

        state.call_faceoff();
        assert!(state.referee.is_puck_in_play());
        assert!(state.puck.is_loose());
        assert!(state.players.iter().all(|p| !p.has_puck));
        assert_eq!(state.players[4].state(), PlayerState::Idle);
        assert_eq!(state.players[4].pos, state.players[4].spawn);
    }

    #[test]
    fn test_sudden_death_goal_ends_match() {
        let settings = GameplaySettings {
            period_count: 1,
            ..Default::default()
        };
        let mut state = MatchState::empty(&settings, 1);
        let remaining = state.clock.remaining();
        state.clock.advance(remaining);
        state.on_period_end(1);
        assert!(state.clock.is_sudden_death());
        assert_eq!(state.phase, MatchPhase::Playing);

        state.scores.score_goal(Team::B, &mut state.events);
        state.on_goal(Team::B);
        assert_eq!(state.phase, MatchPhase::GameOver);
        assert!(state
            .drain_events()
            .contains(&GameEvent::MatchEnded { winner: Some(Team::B) }));
    }
}
