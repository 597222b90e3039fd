use crate::decode::{self, DecodeError};
use crate::query::{Query, ResourceKind};
use crate::{Game, Player, PlayerGameStat, PlayerSeasonAverage, Team};
use log::debug;
use reqwest::{Client, Url};
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_BASE_URL: &str = "https://www.balldontlie.io/api/v1/";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PER_PAGE: u32 = 100;
const GENERIC_ERROR_MESSAGE: &str = "Something went wrong, please try again later";

/// NBA stats client backed by the balldontlie API. One attempt per call, no retries.
#[derive(Debug, Clone)]
pub struct NbaApi {
    client: Client,
    base_url: String,
    timeout: Duration,
    per_page: u32,
}

impl Default for NbaApi {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

#[derive(Debug)]
pub enum ApiError {
    /// The request URL could not be built.
    InvalidRequest(String),
    /// Transport failure: timeout, DNS, connection reset.
    Network(reqwest::Error, String),
    /// Non-2xx response.
    Api { code: u16, message: String },
    Decode(DecodeError),
}

impl ApiError {
    pub fn from_status(code: u16) -> Self {
        ApiError::Api { code, message: status_message(code).to_owned() }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {msg}"),
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api { code, message } => write!(f, "API error {code}: {message}"),
            ApiError::Decode(e) => write!(f, "Parse error: {e}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(e, _) => Some(e),
            ApiError::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DecodeError> for ApiError {
    fn from(e: DecodeError) -> Self {
        ApiError::Decode(e)
    }
}

/// User-facing message for an HTTP status. Unmapped codes get a generic message.
pub fn status_message(code: u16) -> &'static str {
    match code {
        400 => "Bad request, please check your search",
        404 => "The requested resource could not be found",
        406 => "Requested format is not supported",
        429 => "Too many server requests",
        500 => "There was a problem with the server, try again later",
        503 => "Service temporarily offline for maintenance",
        _ => GENERIC_ERROR_MESSAGE,
    }
}

impl NbaApi {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let mut base_url = base_url.trim().to_owned();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            client: Client::builder()
                .user_agent(concat!("hoopstats/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            base_url,
            timeout,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    /// Issue one GET for `kind` and return the raw, unparsed response body.
    pub async fn fetch(&self, kind: ResourceKind, query: &Query) -> ApiResult<Vec<u8>> {
        let url = self.url_for(kind, query)?;
        debug!("GET {url}");

        let response = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            debug!("{url} answered {status}");
            return Err(ApiError::from_status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e, url.to_string()))?;
        Ok(body.to_vec())
    }

    pub fn url_for(&self, kind: ResourceKind, query: &Query) -> ApiResult<Url> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| ApiError::InvalidRequest(format!("{}: {e}", self.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidRequest(format!(
                "{} cannot be used as a base URL",
                self.base_url
            )));
        }
        let mut url = base
            .join(kind.path())
            .map_err(|e| ApiError::InvalidRequest(format!("{}: {e}", kind.path())))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.pairs());
        }
        Ok(url)
    }

    // -----------------------------------------------------------------------
    // Queries used by the app, paired with their decoders
    // -----------------------------------------------------------------------

    pub fn teams_query(&self) -> Query {
        Query::new().per_page(self.per_page)
    }

    pub fn games_on_query(&self, date: &str) -> Query {
        Query::new().dates(&[date]).per_page(self.per_page)
    }

    pub fn team_season_games_query(&self, team_id: u32, season: u16) -> Query {
        Query::new()
            .seasons(&[season])
            .team_ids(&[team_id])
            .per_page(self.per_page)
    }

    pub fn game_stats_query(&self, game_id: u32) -> Query {
        Query::new().game_ids(&[game_id]).per_page(self.per_page)
    }

    pub fn player_search_query(&self, name: &str) -> Query {
        Query::new().search(name).per_page(self.per_page)
    }

    pub fn season_averages_query(&self, season: u16, player_ids: &[u32]) -> Query {
        Query::new().season(season).player_ids(player_ids)
    }

    pub async fn fetch_teams(&self) -> ApiResult<Vec<Team>> {
        let raw = self.fetch(ResourceKind::Teams, &self.teams_query()).await?;
        Ok(decode::decode_teams(&raw)?)
    }

    /// All games scheduled or played on `date` ("YYYY-MM-DD").
    pub async fn fetch_games_on(&self, date: &str) -> ApiResult<Vec<Game>> {
        let raw = self.fetch(ResourceKind::Games, &self.games_on_query(date)).await?;
        Ok(decode::decode_games(&raw)?)
    }

    pub async fn fetch_team_season_games(&self, team_id: u32, season: u16) -> ApiResult<Vec<Game>> {
        let query = self.team_season_games_query(team_id, season);
        let raw = self.fetch(ResourceKind::Games, &query).await?;
        Ok(decode::decode_games(&raw)?)
    }

    /// Every player's box-score line for one game.
    pub async fn fetch_game_stats(&self, game_id: u32) -> ApiResult<Vec<PlayerGameStat>> {
        let raw = self.fetch(ResourceKind::Stats, &self.game_stats_query(game_id)).await?;
        Ok(decode::decode_stats(&raw)?)
    }

    pub async fn search_players(&self, name: &str) -> ApiResult<Vec<Player>> {
        let raw = self
            .fetch(ResourceKind::Players, &self.player_search_query(name))
            .await?;
        Ok(decode::decode_players(&raw)?)
    }

    pub async fn fetch_season_averages(
        &self,
        season: u16,
        player_ids: &[u32],
    ) -> ApiResult<Vec<PlayerSeasonAverage>> {
        let query = self.season_averages_query(season, player_ids);
        let raw = self.fetch(ResourceKind::SeasonAverages, &query).await?;
        Ok(decode::decode_season_averages(&raw)?)
    }
}
