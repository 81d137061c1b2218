//! Match events
//!
//! The sim pushes events into an [`EventQueue`] during a tick; the presentation
//! layer drains it afterwards. Order within a tick follows the phase order.

use serde::{Deserialize, Serialize};

use super::player::{PlayerId, Team};
use super::referee::Violation;
use super::state::MatchPhase;
use super::state_machine::PlayerState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ScoreChanged { team_a: u32, team_b: u32 },
    GoalScored { team: Team },
    StateChanged { player: PlayerId, previous: PlayerState, new: PlayerState },
    ViolationCalled { kind: Violation },
    Faceoff,
    PuckShot { player: PlayerId, power: f32 },
    PuckPassed { player: PlayerId, power: f32 },
    /// `None` means the puck went loose
    PossessionChanged { player: Option<PlayerId> },
    ControlSwitched { from: PlayerId, to: PlayerId },
    PeriodEnded { period: u32 },
    /// `None` is a tie
    MatchEnded { winner: Option<Team> },
    PhaseChanged { previous: MatchPhase, new: MatchPhase },
}

impl GameEvent {
    /// Shorthand for a state-change event
    pub fn state_changed(player: PlayerId, (previous, new): (PlayerState, PlayerState)) -> Self {
        GameEvent::StateChanged {
            player,
            previous,
            new,
        }
    }
}

/// FIFO of events produced by the sim
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take everything emitted so far, oldest first
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_preserves_order_and_empties() {
        let mut queue = EventQueue::new();
        queue.push(GameEvent::GoalScored { team: Team::A });
        queue.push(GameEvent::ScoreChanged {
            team_a: 1,
            team_b: 0,
        });
        let events = queue.drain();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], GameEvent::GoalScored { team: Team::A }));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_events_serialize() {
        let event = GameEvent::ViolationCalled {
            kind: Violation::Offside,
        };
        let json = serde_json::to_string(&event).expect("serializable");
        assert!(json.contains("Offside"));
    }
}
