//! Fixed timestep simulation tick
//!
//! One call to [`tick`] advances a match by `dt` in a fixed phase order:
//!
//! 1. Inputs: feed the human adapter, poll every controller (AI brains only
//!    rethink when their reaction time has elapsed)
//! 2. Locomotion for every skater in id order, collecting shot/pass requests
//! 3. Puck: apply requests, keep a carried puck on its stick, friction/clamp
//! 4. Substrate: integrate bodies, collect contacts, resolve board bounces and
//!    pickups (one possession assignment per tick, lowest id first)
//! 5. Referee: goals, due faceoffs, period clock
//! 6. Score updates land in the event queue during step 5; the caller drains
//!    events after the tick
//!
//! Nothing in a tick returns an error; problems surface as logs and events.

use super::physics::{Contact, PhysicsSubstrate};
use super::player::{ControlSource, PuckRequest};
use super::state::{MatchPhase, MatchState};
use crate::input::{InputSignal, InputSource, RawControls};

/// External commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Device state for the human-controlled skater (`None` = no device this tick)
    pub human: Option<RawControls>,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the match by one fixed timestep
pub fn tick(state: &mut MatchState, input: &TickInput, physics: &mut dyn PhysicsSubstrate, dt: f32) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            MatchPhase::Playing => state.set_phase(MatchPhase::Paused),
            MatchPhase::Paused => state.set_phase(MatchPhase::Playing),
            MatchPhase::GameOver => {}
        }
    }

    // Don't tick if paused or game over
    if state.phase != MatchPhase::Playing {
        return;
    }

    state.time_ticks += 1;
    state.time += dt;

    let signals = gather_inputs(state, input);
    let requests = run_locomotion(state, &signals, dt);
    step_puck(state, requests, dt);
    let contacts = physics.step(&mut state.players, &mut state.puck, dt);
    resolve_contacts(state, &contacts);
    officiate(state, &contacts, dt);
}

/// Phase 1: one signal (or none) per skater
fn gather_inputs(state: &mut MatchState, input: &TickInput) -> Vec<Option<InputSignal>> {
    if let Some(raw) = input.human {
        state.feed_human(raw);
    }

    (0..state.players.len() as u32)
        .map(|id| {
            let ctx = state.source_context(id);
            state
                .controller_slot_mut(id)
                .and_then(|controller| controller.poll(&ctx))
        })
        .collect()
}

/// Phase 2: move everyone; returns puck requests in id order
fn run_locomotion(
    state: &mut MatchState,
    signals: &[Option<InputSignal>],
    dt: f32,
) -> Vec<(u32, PuckRequest)> {
    let now = state.time;
    let mut requests = Vec::new();
    let mut switch_requested = false;

    for (player, signal) in state.players.iter_mut().zip(signals) {
        if let Some(request) = player.locomote(signal.as_ref(), now, dt, &mut state.events) {
            requests.push((player.id, request));
        }
        if player.control == ControlSource::Human
            && signal.as_ref().is_some_and(|s| s.switch_player_performed)
        {
            switch_requested = true;
        }
    }

    if switch_requested {
        state.switch_human();
    }
    requests
}

/// Phase 3: possession release and puck integration
fn step_puck(state: &mut MatchState, requests: Vec<(u32, PuckRequest)>, dt: f32) {
    // Only the holder's request can succeed; once released the rest are ignored
    for (id, request) in requests {
        state.apply_puck_request(id, request);
    }

    if let Some(owner) = state.puck.owner() {
        let holder = &state.players[owner as usize];
        state.puck.carry(holder.pos, holder.yaw);
    }
    state.puck.step(dt);
}

/// Phase 4: board bounces and pickups
fn resolve_contacts(state: &mut MatchState, contacts: &[Contact]) {
    for contact in contacts {
        if *contact == Contact::PuckHitWall {
            state.puck.on_wall_collision();
        }
    }

    if !state.referee.is_puck_in_play() || !state.puck.is_loose() {
        return;
    }
    let now = state.time;
    let collector = contacts
        .iter()
        .filter_map(|c| match c {
            Contact::PlayerTouchedPuck(id) => Some(*id),
            _ => None,
        })
        .filter(|&id| state.player(id).is_some_and(|p| p.can_collect(now)))
        .min();
    if let Some(id) = collector {
        state.attach_puck(id);
    }
}

/// Phase 5: goals, scheduled restarts, clock
fn officiate(state: &mut MatchState, contacts: &[Contact], dt: f32) {
    let now = state.time;

    for contact in contacts {
        if let Contact::PuckInGoalZone(defending) = *contact {
            let scored = state.referee.on_goal_zone(
                defending,
                state.puck.pos,
                now,
                &mut state.scores,
                &mut state.events,
            );
            if let Some(team) = scored {
                state.on_goal(team);
            }
        }
    }

    if state.phase != MatchPhase::Playing {
        return;
    }

    if state.referee.faceoff_due(now) {
        state.call_faceoff();
    }

    if state.referee.is_puck_in_play() {
        if let Some(period) = state.clock.advance(dt) {
            state.on_period_end(period);
        }
    }
}
