mod app;
mod cache;
mod draw;
mod favourites;
mod state;
mod stats;

use crate::app::App;
use crate::cache::CacheStore;
use crate::favourites::FileFavouritesStore;
use crate::state::app_settings::AppSettings;
use crate::state::messages::{NetworkRequest, NetworkResponse};
use crate::state::network::NetworkWorker;
use chrono::{Local, NaiveDate};
use log::{LevelFilter, info};
use nba_api::client::NbaApi;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Teams,
    /// `None` means today.
    Games { date: Option<String> },
    BoxScore { game_id: u32 },
    Standings { season: Option<u16> },
    Players { search: String },
    Averages { season: u16, player_ids: Vec<u32> },
    FavList,
    FavAddTeam { team_id: u32 },
    FavAddPlayer { search: String },
    FavRemoveTeam { index: usize },
    FavRemovePlayer { index: usize },
    Prefs { alerts: Option<bool>, favourites_only: Option<bool> },
}

#[derive(Debug, PartialEq)]
enum CliAction {
    Help,
    Version,
    Run { command: Command, reload: bool },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (command, reload) = match handle_cli_args(std::env::args().skip(1)) {
        Ok(CliAction::Help) => {
            println!("{}", usage_text());
            return Ok(());
        }
        Ok(CliAction::Version) => {
            println!("hoopstats {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Ok(CliAction::Run { command, reload }) => (command, reload),
        Err(message) => {
            eprintln!("{message}\n\n{}", usage_text());
            std::process::exit(2);
        }
    };

    better_panic::install();

    let mut settings = AppSettings::load();
    settings.force_reload = reload;

    logger_builder(env_logger::DEFAULT_FILTER_ENV, settings.log_level).init();
    info!("cache at {}, data at {}", settings.cache_dir.display(), settings.data_dir.display());

    let client = NbaApi::new(&settings.api_url, settings.timeout).with_per_page(settings.per_page);
    let cache = CacheStore::new(&settings.cache_dir);
    let store = FileFavouritesStore::new(&settings.data_dir);

    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(16);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(16);

    // Network thread
    let network_worker = NetworkWorker::new(client, cache, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    let mut session = Session {
        app: App::new(settings, Box::new(store)),
        requests: network_req_tx,
        responses: network_resp_rx,
    };
    let result = session.run(command).await;

    network_task.abort();

    match result {
        Ok(true) => Ok(()),
        Ok(false) => {
            if let Some(alert) = &session.app.state.last_error {
                eprintln!("{}", draw::draw_alert(alert));
            }
            std::process::exit(1);
        }
        Err(e) => Err(e),
    }
}

/// Front-end side of the worker channels. Owns the `App`, so it is the only
/// writer of app state.
struct Session {
    app: App,
    requests: mpsc::Sender<NetworkRequest>,
    responses: mpsc::Receiver<NetworkResponse>,
}

impl Session {
    /// Runs one command. `Ok(false)` means a load failed and the alert is in
    /// `app.state.last_error`.
    async fn run(&mut self, command: Command) -> anyhow::Result<bool> {
        let reload = self.app.settings.force_reload;
        let season = self.app.settings.season;

        match command {
            Command::Teams => {
                if !self.load(NetworkRequest::LoadTeams { season, reload }).await? {
                    return Ok(false);
                }
                print!("{}", draw::draw_teams(&self.app.state.teams));
            }
            Command::Games { date } => {
                let date = date.unwrap_or_else(|| Local::now().date_naive().to_string());
                if !self.load(NetworkRequest::LoadGames { date: date.clone(), reload }).await? {
                    return Ok(false);
                }
                print!("{}", draw::draw_games(&date, &self.app.visible_games()));
            }
            Command::BoxScore { game_id } => {
                if !self.load(NetworkRequest::LoadBoxScore { game_id, reload }).await? {
                    return Ok(false);
                }
                print!("{}", draw::draw_box_score(&self.app));
            }
            Command::Standings { season: requested } => {
                let season = requested.unwrap_or(season);
                if !self.load(NetworkRequest::LoadStandings { season, reload }).await? {
                    return Ok(false);
                }
                print!("{}", draw::draw_standings(&self.app));
            }
            Command::Players { search } => {
                if !self.load(NetworkRequest::SearchPlayers { name: search }).await? {
                    return Ok(false);
                }
                print!("{}", draw::draw_players(&self.app.state.player_results));
            }
            Command::Averages { season, player_ids } => {
                let request = NetworkRequest::LoadSeasonAverages { season, player_ids, reload };
                if !self.load(request).await? {
                    return Ok(false);
                }
                let loaded = &self.app.state.season_averages;
                print!("{}", draw::draw_season_averages(loaded.season, &loaded.averages));
            }
            Command::FavList => {
                if !self.app.state.favourites.teams().is_empty()
                    && !self.load(NetworkRequest::LoadStandings { season, reload }).await?
                {
                    return Ok(false);
                }
                print!("{}", draw::draw_favourites(&self.app));
            }
            Command::FavAddTeam { team_id } => {
                if !self.load(NetworkRequest::LoadTeams { season, reload }).await? {
                    return Ok(false);
                }
                match self.app.add_favourite_team(team_id)? {
                    Some(true) => println!("Added team {team_id} to favourites."),
                    Some(false) => println!("Team {team_id} is already a favourite."),
                    None => println!("No team with id {team_id}."),
                }
            }
            Command::FavAddPlayer { search } => {
                if !self.load(NetworkRequest::SearchPlayers { name: search.clone() }).await? {
                    return Ok(false);
                }
                let results = self.app.state.player_results.clone();
                match results.as_slice() {
                    [player] => {
                        let name = player.full_name();
                        if self.app.add_favourite_player(player.clone())? {
                            println!("Added {name} to favourites.");
                        } else {
                            println!("{name} is already a favourite.");
                        }
                    }
                    [] => println!("No players match \"{search}\"."),
                    many => {
                        println!("\"{search}\" matches {} players, narrow the search:", many.len());
                        print!("{}", draw::draw_players(many));
                    }
                }
            }
            Command::FavRemoveTeam { index } => match self.app.remove_favourite_team(index)? {
                Some(team) => println!("Removed {} from favourites.", team.full_name),
                None => println!("No favourite team at position {index}."),
            },
            Command::FavRemovePlayer { index } => match self.app.remove_favourite_player(index)? {
                Some(player) => println!("Removed {} from favourites.", player.full_name()),
                None => println!("No favourite player at position {index}."),
            },
            Command::Prefs { alerts, favourites_only } => {
                if let Some(enabled) = alerts {
                    self.app.set_game_alerts(enabled)?;
                }
                if let Some(enabled) = favourites_only {
                    self.app.set_favourites_only(enabled)?;
                }
                print!("{}", draw::draw_preferences(&self.app));
            }
        }
        Ok(true)
    }

    /// Sends one request and applies its response. `Ok(false)` on a failed load.
    async fn load(&mut self, request: NetworkRequest) -> anyhow::Result<bool> {
        self.requests.send(request).await?;
        let response = self
            .responses
            .recv()
            .await
            .ok_or_else(|| anyhow::anyhow!("network worker stopped"))?;
        let failed = matches!(response, NetworkResponse::Error { .. });
        self.app.on_response(response);
        Ok(!failed)
    }
}

/// `filter_var` (normally `RUST_LOG`) wins over the configured level when set.
fn logger_builder(filter_var: &str, level: LevelFilter) -> env_logger::Builder {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::new().filter_or(filter_var, level.as_str()));
    builder.format_timestamp(None);
    builder
}

fn handle_cli_args(args: impl IntoIterator<Item = String>) -> Result<CliAction, String> {
    let mut reload = false;
    let mut words = Vec::new();
    for arg in args {
        match arg.as_str() {
            "-h" | "--help" => return Ok(CliAction::Help),
            "-V" | "--version" => return Ok(CliAction::Version),
            "-r" | "--reload" => reload = true,
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(format!("Unknown argument: {flag}"));
            }
            _ => words.push(arg),
        }
    }

    let command = parse_command(&words)?;
    Ok(CliAction::Run { command, reload })
}

fn parse_command(words: &[String]) -> Result<Command, String> {
    let words: Vec<&str> = words.iter().map(String::as_str).collect();
    let command = match words.as_slice() {
        [] => Command::Games { date: None },
        ["teams"] => Command::Teams,
        ["games"] => Command::Games { date: None },
        ["games", date] => Command::Games { date: Some(parse_date(date)?) },
        ["boxscore", id] => Command::BoxScore { game_id: parse_number(id, "game id")? },
        ["standings"] => Command::Standings { season: None },
        ["standings", season] => Command::Standings { season: Some(parse_number(season, "season")?) },
        ["players", search @ ..] if !search.is_empty() => Command::Players { search: search.join(" ") },
        ["averages", season, ids @ ..] if !ids.is_empty() => Command::Averages {
            season: parse_number(season, "season")?,
            player_ids: ids
                .iter()
                .map(|id| parse_number(id, "player id"))
                .collect::<Result<_, _>>()?,
        },
        ["fav"] | ["fav", "list"] => Command::FavList,
        ["fav", "add-team", id] => Command::FavAddTeam { team_id: parse_number(id, "team id")? },
        ["fav", "add-player", search @ ..] if !search.is_empty() => {
            Command::FavAddPlayer { search: search.join(" ") }
        }
        ["fav", "rm-team", idx] => Command::FavRemoveTeam { index: parse_number(idx, "position")? },
        ["fav", "rm-player", idx] => Command::FavRemovePlayer { index: parse_number(idx, "position")? },
        ["prefs", rest @ ..] => parse_prefs(rest)?,
        _ => return Err(format!("Unknown command: {}", words.join(" "))),
    };
    Ok(command)
}

fn parse_prefs(words: &[&str]) -> Result<Command, String> {
    let mut alerts = None;
    let mut favourites_only = None;
    for pair in words.chunks(2) {
        let [name, value] = pair else {
            return Err(format!("Missing on/off for {}", pair[0]));
        };
        let enabled = match *value {
            "on" => true,
            "off" => false,
            other => return Err(format!("Expected on or off, got {other}")),
        };
        match *name {
            "alerts" => alerts = Some(enabled),
            "favourites-only" => favourites_only = Some(enabled),
            other => return Err(format!("Unknown preference: {other}")),
        }
    }
    Ok(Command::Prefs { alerts, favourites_only })
}

fn parse_date(raw: &str) -> Result<String, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.to_string())
        .map_err(|_| format!("Invalid date: {raw} (expected YYYY-MM-DD)"))
}

fn parse_number<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, String> {
    raw.parse().map_err(|_| format!("Invalid {what}: {raw}"))
}

fn usage_text() -> &'static str {
    "hoopstats - NBA scores, box scores, standings and favourites

Usage:
  hoopstats [--reload] [command]
  hoopstats --help
  hoopstats --version

Commands:
  games [YYYY-MM-DD]            Games on a day (default: today)
  teams                         All teams
  boxscore <game-id>            Player lines and team totals for a game
  standings [season]            Conference and division standings
  players <name>                Search players
  averages <season> <id>...     Season averages for players
  fav [list]                    Favourite teams and players
  fav add-team <team-id>
  fav add-player <name>
  fav rm-team <position>
  fav rm-player <position>
  prefs [alerts on|off] [favourites-only on|off]

Options:
  -r, --reload                  Ignore cached data and fetch fresh copies

Environment:
  HOOPSTATS_API_URL       Stats API base URL
  HOOPSTATS_CACHE_DIR     Cache directory (default $XDG_CACHE_HOME/hoopstats)
  HOOPSTATS_DATA_DIR      Favourites directory (default $XDG_DATA_HOME/hoopstats)
  HOOPSTATS_SEASON        Default season (default: current season)
  HOOPSTATS_PER_PAGE      Results per request (default 100)
  HOOPSTATS_TIMEOUT_SECS  Request timeout in seconds (default 10)
  HOOPSTATS_LOG           Log level (default warn)"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliAction, String> {
        handle_cli_args(args.iter().map(|a| a.to_string()))
    }

    fn run(command: Command, reload: bool) -> Result<CliAction, String> {
        Ok(CliAction::Run { command, reload })
    }

    #[test]
    fn no_arguments_shows_todays_games() {
        assert_eq!(parse(&[]), run(Command::Games { date: None }, false));
    }

    #[test]
    fn reload_flag_anywhere() {
        assert_eq!(
            parse(&["standings", "--reload", "2021"]),
            run(Command::Standings { season: Some(2021) }, true)
        );
        assert_eq!(parse(&["-r", "teams"]), run(Command::Teams, true));
    }

    #[test]
    fn help_and_version_win() {
        assert_eq!(parse(&["teams", "--help"]), Ok(CliAction::Help));
        assert_eq!(parse(&["-V"]), Ok(CliAction::Version));
    }

    #[test]
    fn dates_are_validated() {
        assert_eq!(
            parse(&["games", "2022-10-19"]),
            run(Command::Games { date: Some("2022-10-19".into()) }, false)
        );
        assert!(parse(&["games", "2022-02-30"]).is_err());
        assert!(parse(&["games", "yesterday"]).is_err());
    }

    #[test]
    fn multi_word_searches_and_id_lists() {
        assert_eq!(
            parse(&["fav", "add-player", "lebron", "james"]),
            run(Command::FavAddPlayer { search: "lebron james".into() }, false)
        );
        assert_eq!(
            parse(&["averages", "2022", "237", "115"]),
            run(Command::Averages { season: 2022, player_ids: vec![237, 115] }, false)
        );
        assert!(parse(&["averages", "2022"]).is_err());
        assert!(parse(&["averages", "2022", "x"]).is_err());
    }

    #[test]
    fn prefs_parse_on_off_pairs() {
        assert_eq!(
            parse(&["prefs", "favourites-only", "on", "alerts", "off"]),
            run(Command::Prefs { alerts: Some(false), favourites_only: Some(true) }, false)
        );
        assert_eq!(parse(&["prefs"]), run(Command::Prefs { alerts: None, favourites_only: None }, false));
        assert!(parse(&["prefs", "alerts"]).is_err());
        assert!(parse(&["prefs", "alerts", "maybe"]).is_err());
    }

    #[test]
    fn log_level_defaults_from_settings() {
        let logger = logger_builder("HOOPSTATS_TEST_UNSET_FILTER", LevelFilter::Info).build();
        assert_eq!(logger.filter(), LevelFilter::Info);
    }

    #[test]
    fn filter_variable_overrides_settings() {
        // Only this test touches this variable.
        unsafe { std::env::set_var("HOOPSTATS_TEST_LOG_FILTER", "debug") };
        let logger = logger_builder("HOOPSTATS_TEST_LOG_FILTER", LevelFilter::Warn).build();
        assert_eq!(logger.filter(), LevelFilter::Debug);
    }

    #[test]
    fn unknown_input_is_rejected() {
        assert!(parse(&["--frobnicate"]).is_err());
        assert!(parse(&["scores"]).is_err());
    }
}
