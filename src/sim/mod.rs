//! Deterministic match simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by player ID)
//! - No rendering, audio or engine dependencies; bodies move through a
//!   [`PhysicsSubstrate`]

pub mod ai;
pub mod clock;
pub mod events;
pub mod physics;
pub mod player;
pub mod puck;
pub mod referee;
pub mod score;
pub mod state;
pub mod state_machine;
pub mod tick;

pub use ai::AgentBrain;
pub use clock::{MatchClock, PeriodOutcome};
pub use events::{EventQueue, GameEvent};
pub use physics::{Contact, KinematicRink, Mobile, PhysicsSubstrate, reflect_velocity};
pub use player::{ControlSource, PlayerEntity, PlayerId, PuckRequest, Team};
pub use puck::{Puck, PuckConfig, PuckState};
pub use referee::{GoalAnchors, RefereeSystem, Violation};
pub use score::{Score, ScoreManager};
pub use state::{MatchPhase, MatchState};
pub use state_machine::{PlayerState, PlayerStateMachine, Transition};
pub use tick::{TickInput, tick};
