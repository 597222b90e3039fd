use crate::cache::LoadError;
use crate::stats::season::TeamSeasonRecord;
use crate::stats::standings::Standings;
use crate::stats::team_game::GameTotals;
use nba_api::client::ApiError;
use nba_api::{Game, Player, PlayerGameStat, PlayerSeasonAverage, Team};

/// Work for the network worker. `reload` bypasses the cache read.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkRequest {
    LoadTeams { season: u16, reload: bool },
    LoadGames { date: String, reload: bool },
    LoadBoxScore { game_id: u32, reload: bool },
    LoadStandings { season: u16, reload: bool },
    LoadSeasonAverages { season: u16, player_ids: Vec<u32>, reload: bool },
    /// Interactive lookups are never cached.
    SearchPlayers { name: String },
}

#[derive(Debug)]
pub enum NetworkResponse {
    TeamsLoaded { teams: Vec<Team> },
    GamesLoaded { date: String, games: Vec<Game> },
    /// Totals are `None` when the game has no box score yet.
    BoxScoreLoaded { game_id: u32, stats: Vec<PlayerGameStat>, totals: Option<GameTotals> },
    StandingsLoaded {
        season: u16,
        records: Vec<TeamSeasonRecord>,
        standings: Standings,
        /// Games dropped from the fold because of inconsistent participants.
        rejected_games: usize,
    },
    SeasonAveragesLoaded { season: u16, averages: Vec<PlayerSeasonAverage> },
    PlayersFound { players: Vec<Player> },
    Error { alert: Alert },
}

/// A dismissable message: short title, descriptive body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { title: title.into(), message: message.into() }
    }
}

impl From<&ApiError> for Alert {
    fn from(e: &ApiError) -> Self {
        match e {
            ApiError::InvalidRequest(msg) => Alert::new("Invalid Request", msg.clone()),
            ApiError::Network(..) => Alert::new(
                "Network Error",
                "Could not reach the stats server. Check your connection and try again.",
            ),
            ApiError::Api { code, message } => Alert::new(format!("Server Error ({code})"), message.clone()),
            ApiError::Decode(e) => Alert::new("Unexpected Data", e.to_string()),
        }
    }
}

impl From<&LoadError> for Alert {
    fn from(e: &LoadError) -> Self {
        match e {
            LoadError::Api(e) => Alert::from(e),
            LoadError::Decode(e) => Alert::new("Unexpected Data", e.to_string()),
            LoadError::CacheRead(e) => Alert::new("Cache Error", e.to_string()),
        }
    }
}
