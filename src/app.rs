use crate::favourites::{Favourites, FavouritesError, FavouritesStore, Preferences};
use crate::state::app_settings::AppSettings;
use crate::state::app_state::{
    AppState, BoxScoreState, GamesState, SeasonAveragesState, StandingsState,
};
use crate::state::messages::{Alert, NetworkResponse};
use crate::stats::standings::{Position, StandingsError};
use log::{error, warn};
use nba_api::{Game, Player, Team};

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
    store: Box<dyn FavouritesStore + Send>,
}

impl App {
    /// A favourites file that cannot be read is reported and treated as empty.
    pub fn new(settings: AppSettings, store: Box<dyn FavouritesStore + Send>) -> Self {
        let favourites = store.load().unwrap_or_else(|e| {
            warn!("starting with no favourites: {e}");
            Default::default()
        });
        let preferences = store.load_preferences();
        Self { settings, state: AppState::new(favourites, preferences), store }
    }

    // -----------------------------------------------------------------------
    // Network response handlers
    // -----------------------------------------------------------------------

    pub fn on_response(&mut self, response: NetworkResponse) {
        match response {
            NetworkResponse::TeamsLoaded { teams } => self.on_teams_loaded(teams),
            NetworkResponse::GamesLoaded { date, games } => {
                self.state.last_error = None;
                self.state.games = GamesState { date: Some(date), games };
            }
            NetworkResponse::BoxScoreLoaded { game_id, stats, totals } => {
                self.state.last_error = None;
                self.state.box_score = Some(BoxScoreState { game_id, stats, totals });
            }
            NetworkResponse::StandingsLoaded { season, records, standings, rejected_games } => {
                self.state.last_error = None;
                if rejected_games > 0 {
                    warn!("{rejected_games} games skipped while building {season} standings");
                }
                self.state.standings =
                    Some(StandingsState { season, records, standings, rejected_games });
            }
            NetworkResponse::SeasonAveragesLoaded { season, averages } => {
                self.state.last_error = None;
                self.state.season_averages = SeasonAveragesState { season, averages };
            }
            NetworkResponse::PlayersFound { players } => {
                self.state.last_error = None;
                self.state.player_results = players;
            }
            NetworkResponse::Error { alert } => self.on_error(alert),
        }
    }

    fn on_teams_loaded(&mut self, teams: Vec<Team>) {
        self.state.last_error = None;
        self.state.teams = teams;
    }

    /// Failed loads leave previously loaded data in place.
    pub fn on_error(&mut self, alert: Alert) {
        error!("{}: {}", alert.title, alert.message);
        self.state.last_error = Some(alert);
    }

    // -----------------------------------------------------------------------
    // Derived views
    // -----------------------------------------------------------------------

    /// The loaded day's games, limited to favourite teams when the
    /// favourites-only preference is set.
    pub fn visible_games(&self) -> Vec<&Game> {
        let only_favourites = self.state.preferences.favourites_only;
        let favourites = &self.state.favourites;
        self.state
            .games
            .games
            .iter()
            .filter(|g| {
                !only_favourites
                    || favourites.has_team(g.home_team.id)
                    || favourites.has_team(g.away_team.id)
            })
            .collect()
    }

    /// Standings positions of each favourite team, in favourites order.
    pub fn favourite_positions(&self) -> Vec<(&Team, Result<Position, StandingsError>)> {
        let Some(loaded) = &self.state.standings else {
            return Vec::new();
        };
        self.state
            .favourites
            .teams()
            .iter()
            .map(|team| {
                // Saved favourites may predate the loaded team list; prefer fresh data.
                let current = self.state.find_team(team.id).unwrap_or(team);
                (team, loaded.standings.position(current))
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Favourites & preferences
    // -----------------------------------------------------------------------

    /// Adds a loaded team by id. `Ok(None)` if no such team is loaded,
    /// `Ok(Some(false))` if it was already a favourite.
    pub fn add_favourite_team(&mut self, team_id: u32) -> Result<Option<bool>, FavouritesError> {
        let Some(team) = self.state.find_team(team_id).cloned() else {
            return Ok(None);
        };
        self.update_favourites(|f| f.add_team(team)).map(Some)
    }

    pub fn add_favourite_player(&mut self, player: Player) -> Result<bool, FavouritesError> {
        self.update_favourites(|f| f.add_player(player))
    }

    pub fn remove_favourite_team(&mut self, index: usize) -> Result<Option<Team>, FavouritesError> {
        self.update_favourites(|f| f.remove_team(index))
    }

    pub fn remove_favourite_player(&mut self, index: usize) -> Result<Option<Player>, FavouritesError> {
        self.update_favourites(|f| f.remove_player(index))
    }

    pub fn set_game_alerts(&mut self, enabled: bool) -> Result<(), FavouritesError> {
        let preferences = Preferences { game_alerts: enabled, ..self.state.preferences };
        self.store.save_preferences(preferences)?;
        self.state.preferences = preferences;
        Ok(())
    }

    pub fn set_favourites_only(&mut self, enabled: bool) -> Result<(), FavouritesError> {
        let preferences = Preferences { favourites_only: enabled, ..self.state.preferences };
        self.store.save_preferences(preferences)?;
        self.state.preferences = preferences;
        Ok(())
    }

    /// Applies `change` to a copy of the favourites and keeps it only once it is
    /// saved. Unchanged lists are not written.
    fn update_favourites<R>(
        &mut self,
        change: impl FnOnce(&mut Favourites) -> R,
    ) -> Result<R, FavouritesError> {
        let mut updated = self.state.favourites.clone();
        let result = change(&mut updated);
        if updated != self.state.favourites {
            self.store.save(&updated)?;
            self.state.favourites = updated;
        }
        Ok(result)
    }
}
