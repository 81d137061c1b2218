//! Player, team and match tuning
//!
//! Plain records loaded by an outside collaborator (JSON here) and read-only to
//! the simulation. Missing fields fall back to the defaults below.

use serde::{Deserialize, Serialize};

/// Roster slot a skater was created for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerPosition {
    Goalie,
    LeftDefense,
    RightDefense,
    LeftWing,
    #[default]
    Center,
    RightWing,
}

impl PlayerPosition {
    /// Roster order used by team setup
    pub const ROSTER: [PlayerPosition; 6] = [
        PlayerPosition::Goalie,
        PlayerPosition::LeftDefense,
        PlayerPosition::RightDefense,
        PlayerPosition::LeftWing,
        PlayerPosition::Center,
        PlayerPosition::RightWing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerPosition::Goalie => "Goalie",
            PlayerPosition::LeftDefense => "Left Defense",
            PlayerPosition::RightDefense => "Right Defense",
            PlayerPosition::LeftWing => "Left Wing",
            PlayerPosition::Center => "Center",
            PlayerPosition::RightWing => "Right Wing",
        }
    }
}

/// Per-skater tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    // === Movement ===
    /// Cruise speed (units/s)
    pub move_speed: f32,
    pub sprint_multiplier: f32,
    /// Velocity ramp while there is input (units/s²)
    pub acceleration: f32,
    /// Velocity ramp with no input (units/s²)
    pub deceleration: f32,
    /// Turn rate (degrees/s)
    pub rotation_speed: f32,

    // === Physics (for engine substrates with body contact; the kinematic rink ignores these) ===
    pub mass: f32,
    pub drag: f32,

    // === Shooting ===
    pub shot_power: f32,
    pub pass_power: f32,
    /// Minimum seconds between accepted shots
    pub shot_cooldown: f32,

    // === Identity ===
    pub jersey_number: u32,
    pub player_name: String,
    pub position: PlayerPosition,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            move_speed: 8.0,
            sprint_multiplier: 1.5,
            acceleration: 15.0,
            deceleration: 12.0,
            rotation_speed: 720.0,

            mass: 1.0,
            drag: 2.0,

            shot_power: 25.0,
            pass_power: 15.0,
            shot_cooldown: 0.5,

            jersey_number: 1,
            player_name: "Player".to_string(),
            position: PlayerPosition::Center,
        }
    }
}

impl PlayerConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Copy with every rate clamped to be non-negative (NaN becomes zero)
    pub fn sanitized(&self) -> Self {
        let nn = |v: f32| if v.is_nan() { 0.0 } else { v.max(0.0) };
        Self {
            move_speed: nn(self.move_speed),
            sprint_multiplier: nn(self.sprint_multiplier),
            acceleration: nn(self.acceleration),
            deceleration: nn(self.deceleration),
            rotation_speed: nn(self.rotation_speed),
            mass: nn(self.mass),
            drag: nn(self.drag),
            shot_power: nn(self.shot_power),
            pass_power: nn(self.pass_power),
            shot_cooldown: nn(self.shot_cooldown),
            ..self.clone()
        }
    }

    /// Apply team-level multipliers (speed scales skating, offense scales shot/pass power)
    pub fn with_team_modifiers(&self, team: &TeamConfig) -> Self {
        let mut config = self.clone();
        config.move_speed *= team.speed_multiplier;
        config.shot_power *= team.offense_multiplier;
        config.pass_power *= team.offense_multiplier;
        config
    }

    /// Top planar speed this config allows (sprinting)
    pub fn max_speed(&self) -> f32 {
        self.move_speed * self.sprint_multiplier.max(1.0)
    }
}

/// Team identity, roster and AI modifiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamConfig {
    pub team_name: String,
    pub abbreviation: String,
    /// RGBA
    pub primary_color: [f32; 4],
    pub secondary_color: [f32; 4],
    /// [0]=Goalie, [1-2]=Defense, [3-5]=Forwards
    pub roster: Vec<PlayerConfig>,
    pub offense_multiplier: f32,
    pub defense_multiplier: f32,
    pub speed_multiplier: f32,
}

impl Default for TeamConfig {
    fn default() -> Self {
        Self {
            team_name: "Team".to_string(),
            abbreviation: "TM".to_string(),
            primary_color: [1.0, 0.0, 0.0, 1.0],
            secondary_color: [1.0, 1.0, 1.0, 1.0],
            roster: Vec::new(),
            offense_multiplier: 1.0,
            defense_multiplier: 1.0,
            speed_multiplier: 1.0,
        }
    }
}

impl TeamConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn goalie(&self) -> Option<&PlayerConfig> {
        self.roster.first()
    }

    pub fn defense(&self) -> &[PlayerConfig] {
        if self.roster.len() < 3 {
            return &[];
        }
        &self.roster[1..3]
    }

    pub fn forwards(&self) -> &[PlayerConfig] {
        if self.roster.len() < 6 {
            return &[];
        }
        &self.roster[3..6]
    }
}

/// Match-wide constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplaySettings {
    // === Match ===
    pub period_count: u32,
    pub period_length_minutes: f32,
    pub overtime_length_minutes: f32,
    pub sudden_death_overtime: bool,

    // === Physics ===
    /// Fraction of loose-puck speed lost per second on the ice
    pub puck_friction: f32,
    /// Speed kept after a board hit (0-1)
    pub puck_bounce: f32,
    pub puck_max_speed: f32,
    /// Body-contact tuning for engine substrates (unused by the kinematic rink)
    pub player_collision_force: f32,

    // === Rules ===
    pub icing_enabled: bool,
    pub offside_enabled: bool,
    /// Read by engine substrates with body contact; the kinematic rink has none
    pub body_checking_enabled: bool,

    // === AI ===
    /// 0 = Easy, 1 = Medium, 2 = Hard
    pub ai_difficulty: u8,
    /// Seconds between AI decisions (lower = harder)
    pub ai_reaction_time: f32,

    // === Rink (meters) ===
    pub rink_length: f32,
    pub rink_width: f32,
    pub blue_line_distance: f32,
    pub goal_crease_radius: f32,
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            period_count: 3,
            period_length_minutes: 5.0,
            overtime_length_minutes: 5.0,
            sudden_death_overtime: true,

            puck_friction: 0.1,
            puck_bounce: 0.8,
            puck_max_speed: crate::consts::PUCK_MAX_SPEED,
            player_collision_force: 10.0,

            icing_enabled: true,
            offside_enabled: true,
            body_checking_enabled: true,

            ai_difficulty: 1,
            ai_reaction_time: 0.3,

            rink_length: 60.0,
            rink_width: 26.0,
            blue_line_distance: 17.5,
            goal_crease_radius: 1.8,
        }
    }
}

impl GameplaySettings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Copy with ranges clamped so the sim never sees nonsense
    pub fn sanitized(&self) -> Self {
        let nn = |v: f32| if v.is_nan() { 0.0 } else { v.max(0.0) };
        Self {
            period_count: self.period_count.max(1),
            period_length_minutes: nn(self.period_length_minutes),
            overtime_length_minutes: nn(self.overtime_length_minutes),
            puck_friction: nn(self.puck_friction).min(1.0),
            puck_bounce: nn(self.puck_bounce).min(1.0),
            puck_max_speed: nn(self.puck_max_speed),
            player_collision_force: nn(self.player_collision_force),
            ai_difficulty: self.ai_difficulty.min(2),
            ai_reaction_time: nn(self.ai_reaction_time),
            rink_length: nn(self.rink_length),
            rink_width: nn(self.rink_width),
            blue_line_distance: nn(self.blue_line_distance),
            goal_crease_radius: nn(self.goal_crease_radius),
            ..self.clone()
        }
    }

    pub fn period_length_seconds(&self) -> f32 {
        self.period_length_minutes * 60.0
    }

    pub fn overtime_length_seconds(&self) -> f32 {
        self.overtime_length_minutes * 60.0
    }

    pub fn half_length(&self) -> f32 {
        self.rink_length / 2.0
    }

    pub fn half_width(&self) -> f32 {
        self.rink_width / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = PlayerConfig::from_json(r#"{ "move_speed": 10.0, "player_name": "Gretz" }"#)
            .expect("valid json");
        assert_eq!(config.move_speed, 10.0);
        assert_eq!(config.player_name, "Gretz");
        assert_eq!(config.sprint_multiplier, 1.5);
        assert_eq!(config.shot_cooldown, 0.5);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(GameplaySettings::from_json("{ period_count: ").is_err());
    }

    #[test]
    fn test_sanitized_clamps_negatives() {
        let config = PlayerConfig {
            move_speed: -3.0,
            acceleration: f32::NAN,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(config.move_speed, 0.0);
        assert_eq!(config.acceleration, 0.0);
        assert_eq!(config.deceleration, 12.0);

        let settings = GameplaySettings {
            puck_bounce: 3.0,
            period_count: 0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(settings.puck_bounce, 1.0);
        assert_eq!(settings.period_count, 1);
    }

    #[test]
    fn test_team_modifiers() {
        let team = TeamConfig {
            speed_multiplier: 1.5,
            offense_multiplier: 0.5,
            ..Default::default()
        };
        let config = PlayerConfig::default().with_team_modifiers(&team);
        assert_eq!(config.move_speed, 12.0);
        assert_eq!(config.shot_power, 12.5);
        assert_eq!(config.pass_power, 7.5);
    }

    #[test]
    fn test_roster_slices() {
        let mut team = TeamConfig::default();
        assert!(team.goalie().is_none());
        assert!(team.forwards().is_empty());

        team.roster = PlayerPosition::ROSTER
            .iter()
            .map(|&position| PlayerConfig {
                position,
                ..Default::default()
            })
            .collect();
        assert_eq!(team.goalie().map(|c| c.position), Some(PlayerPosition::Goalie));
        assert_eq!(team.defense().len(), 2);
        assert_eq!(team.forwards()[2].position, PlayerPosition::RightWing);
    }
}
