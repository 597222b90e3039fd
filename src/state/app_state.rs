use crate::favourites::{Favourites, Preferences};
use crate::state::messages::Alert;
use crate::stats::season::TeamSeasonRecord;
use crate::stats::standings::Standings;
use crate::stats::team_game::GameTotals;
use nba_api::{Game, Player, PlayerGameStat, PlayerSeasonAverage, Team};

// ---------------------------------------------------------------------------
// Loaded data
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct GamesState {
    pub date: Option<String>,
    pub games: Vec<Game>,
}

#[derive(Debug, Default)]
pub struct BoxScoreState {
    pub game_id: u32,
    pub stats: Vec<PlayerGameStat>,
    pub totals: Option<GameTotals>,
}

#[derive(Debug)]
pub struct StandingsState {
    pub season: u16,
    pub records: Vec<TeamSeasonRecord>,
    pub standings: Standings,
    pub rejected_games: usize,
}

#[derive(Debug, Default)]
pub struct SeasonAveragesState {
    pub season: u16,
    pub averages: Vec<PlayerSeasonAverage>,
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

/// Everything the front end shows. Only the task that owns the `App` mutates it.
#[derive(Debug, Default)]
pub struct AppState {
    pub last_error: Option<Alert>,
    pub teams: Vec<Team>,
    pub games: GamesState,
    pub box_score: Option<BoxScoreState>,
    pub standings: Option<StandingsState>,
    pub season_averages: SeasonAveragesState,
    pub player_results: Vec<Player>,
    pub favourites: Favourites,
    pub preferences: Preferences,
}

impl AppState {
    pub fn new(favourites: Favourites, preferences: Preferences) -> Self {
        Self { favourites, preferences, ..Self::default() }
    }

    pub fn find_team(&self, team_id: u32) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == team_id)
    }
}
