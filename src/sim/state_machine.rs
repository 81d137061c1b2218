//! Per-skater action states and the transition gate

use serde::{Deserialize, Serialize};

/// What a skater is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayerState {
    #[default]
    Idle,
    Skating,
    Sprinting,
    Shooting,
    Passing,
    BodyChecking,
    /// Only recovers to Idle
    Stunned,
    /// Locked until cleared by match logic
    Celebrating,
}

/// Outcome of a transition request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Changed { from: PlayerState, to: PlayerState },
    /// Already in the requested state
    Unchanged,
    /// Blocked by the legality table
    Rejected,
}

impl Transition {
    pub fn changed(&self) -> Option<(PlayerState, PlayerState)> {
        match *self {
            Transition::Changed { from, to } => Some((from, to)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerStateMachine {
    current: PlayerState,
    previous: PlayerState,
}

impl PlayerStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> PlayerState {
        self.current
    }

    pub fn previous(&self) -> PlayerState {
        self.previous
    }

    pub fn is_in(&self, state: PlayerState) -> bool {
        self.current == state
    }

    pub fn can_transition_to(&self, target: PlayerState) -> bool {
        match self.current {
            PlayerState::Stunned => target == PlayerState::Idle,
            PlayerState::Celebrating => false,
            _ => true,
        }
    }

    /// Request a transition; illegal requests are dropped silently
    pub fn change_state(&mut self, target: PlayerState) -> Transition {
        if self.current == target {
            return Transition::Unchanged;
        }
        if !self.can_transition_to(target) {
            return Transition::Rejected;
        }
        self.apply(target)
    }

    /// Clear back to Idle regardless of the gate (penalty expiry, faceoff)
    pub fn force_idle(&mut self) -> Transition {
        if self.current == PlayerState::Idle {
            return Transition::Unchanged;
        }
        self.apply(PlayerState::Idle)
    }

    fn apply(&mut self, target: PlayerState) -> Transition {
        self.previous = self.current;
        self.current = target;
        Transition::Changed {
            from: self.previous,
            to: target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [PlayerState; 8] = [
        PlayerState::Idle,
        PlayerState::Skating,
        PlayerState::Sprinting,
        PlayerState::Shooting,
        PlayerState::Passing,
        PlayerState::BodyChecking,
        PlayerState::Stunned,
        PlayerState::Celebrating,
    ];

    fn machine_in(state: PlayerState) -> PlayerStateMachine {
        let mut sm = PlayerStateMachine::new();
        sm.change_state(state);
        sm
    }

    #[test]
    fn test_initial_state_is_idle() {
        let sm = PlayerStateMachine::new();
        assert_eq!(sm.current(), PlayerState::Idle);
        assert_eq!(sm.previous(), PlayerState::Idle);
    }

    #[test]
    fn test_stunned_only_recovers_to_idle() {
        for target in ALL {
            let mut sm = machine_in(PlayerState::Stunned);
            let result = sm.change_state(target);
            match target {
                PlayerState::Idle => {
                    assert_eq!(
                        result,
                        Transition::Changed {
                            from: PlayerState::Stunned,
                            to: PlayerState::Idle
                        }
                    );
                }
                PlayerState::Stunned => assert_eq!(result, Transition::Unchanged),
                _ => {
                    assert_eq!(result, Transition::Rejected);
                    assert_eq!(sm.current(), PlayerState::Stunned);
                }
            }
        }
    }

    #[test]
    fn test_celebrating_is_locked() {
        for target in ALL {
            let mut sm = machine_in(PlayerState::Celebrating);
            assert!(sm.change_state(target).changed().is_none());
            assert_eq!(sm.current(), PlayerState::Celebrating);
        }
    }

    #[test]
    fn test_same_state_request_is_noop() {
        let mut sm = machine_in(PlayerState::Skating);
        assert_eq!(sm.previous(), PlayerState::Idle);
        assert_eq!(sm.change_state(PlayerState::Skating), Transition::Unchanged);
        assert_eq!(sm.previous(), PlayerState::Idle);
    }

    #[test]
    fn test_previous_state_recorded() {
        let mut sm = machine_in(PlayerState::Sprinting);
        sm.change_state(PlayerState::Shooting);
        assert_eq!(sm.previous(), PlayerState::Sprinting);
        assert!(sm.is_in(PlayerState::Shooting));
    }

    #[test]
    fn test_force_idle_clears_locked_states() {
        let mut sm = machine_in(PlayerState::Celebrating);
        assert_eq!(
            sm.force_idle().changed(),
            Some((PlayerState::Celebrating, PlayerState::Idle))
        );
        assert_eq!(sm.force_idle(), Transition::Unchanged);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn only_legal_transitions_happen(
                requests in proptest::collection::vec(0usize..8, 1..64)
            ) {
                let mut sm = PlayerStateMachine::new();
                for idx in requests {
                    let before = sm.current();
                    let target = ALL[idx];
                    let result = sm.change_state(target);
                    if let Transition::Changed { from, to } = result {
                        prop_assert_eq!(from, before);
                        prop_assert_eq!(to, target);
                        prop_assert!(before != PlayerState::Celebrating);
                        prop_assert!(before != PlayerState::Stunned || to == PlayerState::Idle);
                    } else {
                        prop_assert_eq!(sm.current(), before);
                    }
                }
            }
        }
    }
}
