//! balldontlie raw wire types: serde shapes for deserializing API responses.
//! These map to our clean domain types via the decoders in decode.rs.
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Every collection endpoint wraps its rows as `{ "data": [ ... ] }`.
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: Vec<T>,
}

// ---------------------------------------------------------------------------
// Teams / players
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone, Default)]
pub struct WireTeam {
    pub id: u32,
    pub abbreviation: Option<String>,
    pub city: Option<String>,
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub conference: Option<String>, // "East" | "West", missing on some endpoints
    pub division: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WirePlayer {
    pub id: u32,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub position: Option<String>,
    pub team: Option<WireTeam>,
}

// ---------------------------------------------------------------------------
// Games
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
pub struct WireGame {
    pub id: u32,
    pub date: String, // "2022-10-19T00:00:00.000Z"
    pub season: Option<u16>,
    pub postseason: Option<bool>,
    pub home_team: WireTeam,
    pub visitor_team: WireTeam,
    pub home_team_score: Option<u16>,
    pub visitor_team_score: Option<u16>,
    pub period: Option<u8>,
    pub time: Option<String>,
    pub status: Option<String>,
}

// ---------------------------------------------------------------------------
// Box-score stats. Player, team and game are nested objects
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
pub struct WireStat {
    pub id: u32,
    pub player: WireStatPlayer,
    pub team: WireTeam,
    pub game: WireStatGame,
    pub min: Option<WireMinutes>,
    pub pts: Option<u16>,
    pub reb: Option<u16>,
    pub oreb: Option<u16>,
    pub dreb: Option<u16>,
    pub ast: Option<u16>,
    pub stl: Option<u16>,
    pub blk: Option<u16>,
    pub turnover: Option<u16>,
    pub pf: Option<u16>,
    pub fgm: Option<u16>,
    pub fga: Option<u16>,
    pub fg3m: Option<u16>,
    pub fg3a: Option<u16>,
    pub ftm: Option<u16>,
    pub fta: Option<u16>,
    pub fg_pct: Option<f64>, // fraction in [0, 1]
    pub fg3_pct: Option<f64>,
    pub ft_pct: Option<f64>,
}

/// The stats endpoint nests a reduced player object that carries `team_id`
/// instead of a full team.
#[derive(Debug, Deserialize, Clone)]
pub struct WireStatPlayer {
    pub id: u32,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub position: Option<String>,
    pub team_id: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WireStatGame {
    pub id: u32,
    pub date: String,
    pub home_team_id: u32,
    pub visitor_team_id: u32,
    pub home_team_score: Option<u16>,
    pub visitor_team_score: Option<u16>,
    pub season: Option<u16>,
    pub status: Option<String>,
}

/// Minutes normally arrive as a string ("34", "34:12") but older rows use
/// bare numbers.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum WireMinutes {
    Text(String),
    Number(f64),
}

// ---------------------------------------------------------------------------
// Season averages
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
pub struct WireSeasonAverage {
    pub player_id: u32,
    pub season: u16,
    pub games_played: Option<u16>,
    pub min: Option<String>,
    pub pts: Option<f32>,
    pub ast: Option<f32>,
    pub reb: Option<f32>,
}
