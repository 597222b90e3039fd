use log::{debug, warn};
use nba_api::{Player, Team};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const TEAMS_FILE: &str = "favourite_teams.json";
const PLAYERS_FILE: &str = "favourite_players.json";
const PREFERENCES_FILE: &str = "notification_preferences.bin";

/// The user's favourite teams and players, in the order they were added.
/// Neither list holds two entries with the same id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Favourites {
    teams: Vec<Team>,
    players: Vec<Player>,
}

impl Favourites {
    pub fn new(teams: Vec<Team>, players: Vec<Player>) -> Self {
        let mut favourites = Self::default();
        for team in teams {
            favourites.add_team(team);
        }
        for player in players {
            favourites.add_player(player);
        }
        favourites
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Returns false if a team with the same id is already a favourite.
    pub fn add_team(&mut self, team: Team) -> bool {
        if self.has_team(team.id) {
            return false;
        }
        self.teams.push(team);
        true
    }

    pub fn add_player(&mut self, player: Player) -> bool {
        if self.players.iter().any(|p| p.id == player.id) {
            return false;
        }
        self.players.push(player);
        true
    }

    /// Remove by list position.
    pub fn remove_team(&mut self, index: usize) -> Option<Team> {
        (index < self.teams.len()).then(|| self.teams.remove(index))
    }

    pub fn remove_player(&mut self, index: usize) -> Option<Player> {
        (index < self.players.len()).then(|| self.players.remove(index))
    }

    pub fn has_team(&self, team_id: u32) -> bool {
        self.teams.iter().any(|t| t.id == team_id)
    }
}

/// Notification toggles. Persisted as two bytes, one per flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Preferences {
    pub game_alerts: bool,
    pub favourites_only: bool,
}

impl Preferences {
    pub fn to_bytes(self) -> [u8; 2] {
        [u8::from(self.game_alerts), u8::from(self.favourites_only)]
    }

    pub fn from_bytes(raw: &[u8]) -> Option<Self> {
        let flag = |b: u8| match b {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        };
        match raw {
            [alerts, only] => Some(Self {
                game_alerts: flag(*alerts)?,
                favourites_only: flag(*only)?,
            }),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum FavouritesError {
    Io { path: PathBuf, source: io::Error },
    Format { path: PathBuf, source: serde_json::Error },
}

impl fmt::Display for FavouritesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FavouritesError::Io { path, source } => write!(f, "{}: {source}", path.display()),
            FavouritesError::Format { path, source } => {
                write!(f, "{} is not a valid favourites list: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for FavouritesError {}

/// Persistence for favourites and notification preferences.
pub trait FavouritesStore {
    fn load(&self) -> Result<Favourites, FavouritesError>;
    fn save(&self, favourites: &Favourites) -> Result<(), FavouritesError>;
    /// Never fails: unreadable or malformed preferences fall back to defaults.
    fn load_preferences(&self) -> Preferences;
    fn save_preferences(&self, preferences: Preferences) -> Result<(), FavouritesError>;
}

/// Stores each favourites list as its own JSON file and the preferences as a
/// two-byte blob, all under one directory.
#[derive(Debug, Clone)]
pub struct FileFavouritesStore {
    dir: PathBuf,
}

impl FileFavouritesStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn read_list<T: serde::de::DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, FavouritesError> {
        let path = self.dir.join(file);
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(FavouritesError::Io { path, source }),
        };
        serde_json::from_slice(&raw).map_err(|source| FavouritesError::Format { path, source })
    }

    fn write_list<T: serde::Serialize>(&self, file: &str, items: &[T]) -> Result<(), FavouritesError> {
        let path = self.dir.join(file);
        let raw = serde_json::to_vec_pretty(items)
            .map_err(|source| FavouritesError::Format { path: path.clone(), source })?;
        write_file(&self.dir, &path, &raw)
    }
}

fn write_file(dir: &Path, path: &Path, raw: &[u8]) -> Result<(), FavouritesError> {
    let io_err = |source| FavouritesError::Io { path: path.to_path_buf(), source };
    fs::create_dir_all(dir).map_err(io_err)?;
    fs::write(path, raw).map_err(io_err)
}

impl FavouritesStore for FileFavouritesStore {
    fn load(&self) -> Result<Favourites, FavouritesError> {
        let teams = self.read_list(TEAMS_FILE)?;
        let players = self.read_list(PLAYERS_FILE)?;
        Ok(Favourites::new(teams, players))
    }

    fn save(&self, favourites: &Favourites) -> Result<(), FavouritesError> {
        self.write_list(TEAMS_FILE, favourites.teams())?;
        self.write_list(PLAYERS_FILE, favourites.players())?;
        debug!(
            "saved {} favourite teams, {} favourite players",
            favourites.teams().len(),
            favourites.players().len()
        );
        Ok(())
    }

    fn load_preferences(&self) -> Preferences {
        let path = self.dir.join(PREFERENCES_FILE);
        match fs::read(&path) {
            Ok(raw) => Preferences::from_bytes(&raw).unwrap_or_else(|| {
                warn!("ignoring malformed preferences at {}", path.display());
                Preferences::default()
            }),
            Err(_) => Preferences::default(),
        }
    }

    fn save_preferences(&self, preferences: Preferences) -> Result<(), FavouritesError> {
        let path = self.dir.join(PREFERENCES_FILE);
        write_file(&self.dir, &path, &preferences.to_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(id: u32, abbreviation: &str) -> Team {
        Team { id, abbreviation: abbreviation.into(), ..Default::default() }
    }

    fn player(id: u32, last_name: &str) -> Player {
        Player { id, last_name: last_name.into(), ..Default::default() }
    }

    #[test]
    fn adding_the_same_id_twice_is_ignored() {
        let mut favs = Favourites::default();
        assert!(favs.add_team(team(2, "BOS")));
        assert!(!favs.add_team(team(2, "BOS")));
        assert!(favs.add_team(team(14, "LAL")));
        assert!(favs.add_player(player(237, "James")));
        assert!(!favs.add_player(player(237, "James")));
        assert_eq!(favs.teams().len(), 2);
        assert_eq!(favs.players().len(), 1);
    }

    #[test]
    fn removal_is_by_position() {
        let mut favs = Favourites::new(vec![team(1, "A"), team(2, "B"), team(3, "C")], vec![]);
        assert_eq!(favs.remove_team(1).map(|t| t.id), Some(2));
        assert_eq!(favs.teams().iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 3]);
        assert!(favs.remove_team(5).is_none());
        assert!(favs.remove_player(0).is_none());
    }

    #[test]
    fn constructor_drops_duplicates() {
        let favs = Favourites::new(vec![team(1, "A"), team(1, "A2")], vec![player(5, "X"), player(5, "Y")]);
        assert_eq!(favs.teams()[0].abbreviation, "A");
        assert_eq!(favs.players().len(), 1);
    }

    #[test]
    fn store_round_trips_lists_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileFavouritesStore::new(dir.path().join("data"));
        assert_eq!(store.load().unwrap(), Favourites::default());

        let favs = Favourites::new(vec![team(14, "LAL"), team(2, "BOS")], vec![player(237, "James")]);
        store.save(&favs).unwrap();
        assert_eq!(store.load().unwrap(), favs);
    }

    #[test]
    fn corrupt_list_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(TEAMS_FILE), b"{not json").unwrap();
        let store = FileFavouritesStore::new(dir.path());
        assert!(matches!(store.load(), Err(FavouritesError::Format { .. })));
    }

    #[test]
    fn preferences_are_two_bytes() {
        let prefs = Preferences { game_alerts: true, favourites_only: false };
        assert_eq!(prefs.to_bytes(), [1, 0]);
        assert_eq!(Preferences::from_bytes(&[1, 0]), Some(prefs));
        assert_eq!(Preferences::from_bytes(&[1]), None);
        assert_eq!(Preferences::from_bytes(&[1, 7]), None);
    }

    #[test]
    fn preferences_round_trip_and_fall_back_silently() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileFavouritesStore::new(dir.path());
        assert_eq!(store.load_preferences(), Preferences::default());

        let prefs = Preferences { game_alerts: true, favourites_only: true };
        store.save_preferences(prefs).unwrap();
        assert_eq!(store.load_preferences(), prefs);

        fs::write(dir.path().join(PREFERENCES_FILE), b"garbage").unwrap();
        assert_eq!(store.load_preferences(), Preferences::default());
    }
}
