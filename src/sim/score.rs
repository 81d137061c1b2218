//! Goal tally

use serde::{Deserialize, Serialize};

use super::events::{EventQueue, GameEvent};
use super::player::Team;

/// Goals per team
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub team_a: u32,
    pub team_b: u32,
}

impl Score {
    pub fn for_team(&self, team: Team) -> u32 {
        match team {
            Team::A => self.team_a,
            Team::B => self.team_b,
        }
    }

    /// Team ahead, `None` when tied
    pub fn leader(&self) -> Option<Team> {
        match self.team_a.cmp(&self.team_b) {
            std::cmp::Ordering::Greater => Some(Team::A),
            std::cmp::Ordering::Less => Some(Team::B),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn difference(&self) -> u32 {
        self.team_a.abs_diff(self.team_b)
    }
}

/// Owns the score and announces every change
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreManager {
    score: Score,
}

impl ScoreManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> Score {
        self.score
    }

    /// Credit a goal: emits `GoalScored` then `ScoreChanged`
    pub fn score_goal(&mut self, team: Team, events: &mut EventQueue) {
        match team {
            Team::A => self.score.team_a = self.score.team_a.saturating_add(1),
            Team::B => self.score.team_b = self.score.team_b.saturating_add(1),
        }

        events.push(GameEvent::GoalScored { team });
        self.emit_changed(events);

        log::info!(
            "Team {} scored! Score: {} - {}",
            team.as_str(),
            self.score.team_a,
            self.score.team_b
        );
    }

    pub fn reset_scores(&mut self, events: &mut EventQueue) {
        self.score = Score::default();
        self.emit_changed(events);
    }

    /// Team ahead, `None` when tied
    pub fn leading_team(&self) -> Option<Team> {
        self.score.leader()
    }

    pub fn score_difference(&self) -> u32 {
        self.score.difference()
    }

    fn emit_changed(&self, events: &mut EventQueue) {
        events.push(GameEvent::ScoreChanged {
            team_a: self.score.team_a,
            team_b: self.score.team_b,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_goals_for_team_a() {
        let mut events = EventQueue::new();
        let mut scores = ScoreManager::new();
        scores.score_goal(Team::A, &mut events);
        scores.score_goal(Team::A, &mut events);

        assert_eq!(scores.score(), Score { team_a: 2, team_b: 0 });
        assert_eq!(scores.leading_team(), Some(Team::A));
        assert_eq!(scores.score_difference(), 2);
    }

    #[test]
    fn test_goal_then_score_changed_exactly_once() {
        let mut events = EventQueue::new();
        let mut scores = ScoreManager::new();
        scores.score_goal(Team::B, &mut events);

        let events = events.drain();
        assert_eq!(
            events,
            vec![
                GameEvent::GoalScored { team: Team::B },
                GameEvent::ScoreChanged {
                    team_a: 0,
                    team_b: 1
                },
            ]
        );
    }

    #[test]
    fn test_tied_and_reset() {
        let mut events = EventQueue::new();
        let mut scores = ScoreManager::new();
        assert_eq!(scores.leading_team(), None);

        scores.score_goal(Team::A, &mut events);
        scores.score_goal(Team::B, &mut events);
        assert_eq!(scores.leading_team(), None);
        assert_eq!(scores.score_difference(), 0);

        events.drain();
        scores.reset_scores(&mut events);
        assert_eq!(scores.score(), Score::default());
        assert_eq!(
            events.drain(),
            vec![GameEvent::ScoreChanged {
                team_a: 0,
                team_b: 0
            }]
        );
    }
}
