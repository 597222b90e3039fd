pub mod client;
pub mod decode;
pub mod query;
pub mod wire;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Domain types, independent of the balldontlie wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Conference {
    East,
    West,
}

impl Conference {
    /// Display order used by standings.
    pub const ALL: [Conference; 2] = [Conference::East, Conference::West];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "east" | "eastern" => Some(Conference::East),
            "west" | "western" => Some(Conference::West),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Conference::East => "East",
            Conference::West => "West",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Division {
    Atlantic,
    Central,
    Southeast,
    Northwest,
    Pacific,
    Southwest,
}

impl Division {
    /// Display order used by standings: eastern divisions first.
    pub const ALL: [Division; 6] = [
        Division::Atlantic,
        Division::Central,
        Division::Southeast,
        Division::Northwest,
        Division::Pacific,
        Division::Southwest,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "atlantic" => Some(Division::Atlantic),
            "central" => Some(Division::Central),
            "southeast" => Some(Division::Southeast),
            "northwest" => Some(Division::Northwest),
            "pacific" => Some(Division::Pacific),
            "southwest" => Some(Division::Southwest),
            _ => None,
        }
    }

    pub fn conference(&self) -> Conference {
        match self {
            Division::Atlantic | Division::Central | Division::Southeast => Conference::East,
            Division::Northwest | Division::Pacific | Division::Southwest => Conference::West,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Division::Atlantic => "Atlantic",
            Division::Central => "Central",
            Division::Southeast => "Southeast",
            Division::Northwest => "Northwest",
            Division::Pacific => "Pacific",
            Division::Southwest => "Southwest",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: u32,
    pub abbreviation: String, // "BOS"; some payloads reference teams by this instead of id
    pub city: String,
    pub name: String,      // "Celtics"
    pub full_name: String, // "Boston Celtics"
    pub conference: Option<Conference>, // absent on some endpoints
    pub division: Option<Division>,
}

impl Team {
    /// True if `other` refers to the same franchise, by id or, failing that,
    /// by abbreviation.
    pub fn same_as(&self, other: &Team) -> bool {
        if self.id != 0 && other.id != 0 {
            return self.id == other.id;
        }
        !self.abbreviation.is_empty() && self.abbreviation == other.abbreviation
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    pub first_name: String,
    pub last_name: String,
    pub position: Option<String>,
    pub team_id: Option<u32>,
    pub team_abbreviation: Option<String>,
}

impl Player {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Game {
    pub id: u32,
    pub date: String, // "2022-10-19"
    pub season: u16,
    pub postseason: bool,
    pub home_team: Team,
    pub away_team: Team,
    pub home_score: u16,
    pub away_score: u16,
    pub period: Option<u8>,
    pub time: Option<String>,   // "Q4 2:31" while live, absent for historical games
    pub status: Option<String>, // "Final", a clock string, or a scheduled start time
}

impl Game {
    pub fn is_final(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.trim().eq_ignore_ascii_case("final"))
    }

    /// Scheduled or in progress. Historical games carry no status and count as
    /// played.
    pub fn is_pending(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty() && !s.trim().eq_ignore_ascii_case("final"))
    }

    /// Which side `team` plays on. `None` when it plays neither or both.
    pub fn side_of(&self, team: &Team) -> Option<Side> {
        match (self.home_team.same_as(team), self.away_team.same_as(team)) {
            (true, false) => Some(Side::Home),
            (false, true) => Some(Side::Away),
            _ => None,
        }
    }
}

/// One player's box-score line for one game, flattened from the nested
/// player/team/game objects of the stats endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerGameStat {
    pub id: u32,
    pub player_id: u32,
    pub player_name: String,
    pub team_id: u32,
    pub team_abbreviation: String,
    pub game_id: u32,
    pub game_date: String,
    pub home_team_id: u32,
    pub away_team_id: u32,
    pub home_score: u16,
    pub away_score: u16,
    pub minutes: u16,
    pub points: u16,
    pub rebounds: u16,
    pub offensive_rebounds: u16,
    pub defensive_rebounds: u16,
    pub assists: u16,
    pub steals: u16,
    pub blocks: u16,
    pub turnovers: u16,
    pub fouls: u16,
    pub fgm: u16,
    pub fga: u16,
    pub fg3m: u16,
    pub fg3a: u16,
    pub ftm: u16,
    pub fta: u16,
    pub fg_pct: Option<f32>, // percentage, one decimal: 47.6
    pub fg3_pct: Option<f32>,
    pub ft_pct: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerSeasonAverage {
    pub player_id: u32,
    pub season: u16,
    pub games_played: u16,
    pub minutes: String,
    pub points: f32,
    pub assists: f32,
    pub rebounds: f32,
}
