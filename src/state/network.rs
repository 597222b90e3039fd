use crate::cache::{CacheKey, CachePolicy, CacheStore, LoadError, load_cached};
use crate::state::messages::{Alert, NetworkRequest, NetworkResponse};
use crate::stats::season::fold_season;
use crate::stats::standings::Standings;
use crate::stats::team_game::aggregate_box_score;
use log::{debug, error, info};
use nba_api::client::NbaApi;
use nba_api::decode;
use nba_api::query::ResourceKind;
use nba_api::Team;
use tokio::sync::mpsc;

/// Handles requests one at a time, so at most one fetch is ever in flight.
/// Decoding, caching and aggregation finish before the response is sent.
pub struct NetworkWorker {
    client: NbaApi,
    cache: CacheStore,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
}

impl NetworkWorker {
    pub fn new(
        client: NbaApi,
        cache: CacheStore,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self { client, cache, requests, responses }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            let response = self.handle(request).await;
            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    pub async fn handle(&self, request: NetworkRequest) -> NetworkResponse {
        debug!("handling {request:?}");
        let result = match request {
            NetworkRequest::LoadTeams { season, reload } => self.handle_load_teams(season, reload).await,
            NetworkRequest::LoadGames { date, reload } => self.handle_load_games(date, reload).await,
            NetworkRequest::LoadBoxScore { game_id, reload } => {
                self.handle_load_box_score(game_id, reload).await
            }
            NetworkRequest::LoadStandings { season, reload } => {
                self.handle_load_standings(season, reload).await
            }
            NetworkRequest::LoadSeasonAverages { season, player_ids, reload } => {
                self.handle_load_season_averages(season, player_ids, reload).await
            }
            NetworkRequest::SearchPlayers { name } => self.handle_search_players(name).await,
        };

        result.unwrap_or_else(|err| {
            error!("Network error: {err}");
            NetworkResponse::Error { alert: Alert::from(&err) }
        })
    }

    async fn handle_load_teams(&self, season: u16, reload: bool) -> Result<NetworkResponse, LoadError> {
        let teams = self.load_teams(season, CachePolicy::from_reload(reload)).await?;
        Ok(NetworkResponse::TeamsLoaded { teams })
    }

    async fn handle_load_games(&self, date: String, reload: bool) -> Result<NetworkResponse, LoadError> {
        let query = self.client.games_on_query(&date);
        let games = load_cached(
            &self.cache,
            &CacheKey::GameCollection { date: date.clone() },
            CachePolicy::from_reload(reload),
            || self.client.fetch(ResourceKind::Games, &query),
            decode::decode_games,
        )
        .await?;
        Ok(NetworkResponse::GamesLoaded { date, games })
    }

    async fn handle_load_box_score(&self, game_id: u32, reload: bool) -> Result<NetworkResponse, LoadError> {
        let query = self.client.game_stats_query(game_id);
        let stats = load_cached(
            &self.cache,
            &CacheKey::TeamStats { game_id },
            CachePolicy::from_reload(reload),
            || self.client.fetch(ResourceKind::Stats, &query),
            decode::decode_stats,
        )
        .await?;
        let totals = aggregate_box_score(&stats);
        Ok(NetworkResponse::BoxScoreLoaded { game_id, stats, totals })
    }

    /// Teams, then each current franchise's season games, folded into records.
    /// Any failed fetch aborts the whole load so no partial standings escape.
    async fn handle_load_standings(&self, season: u16, reload: bool) -> Result<NetworkResponse, LoadError> {
        let policy = CachePolicy::from_reload(reload);
        let teams: Vec<Team> = self
            .load_teams(season, policy)
            .await?
            .into_iter()
            .filter(|t| t.conference.is_some() && t.division.is_some())
            .collect();

        let mut records = Vec::with_capacity(teams.len());
        let mut rejected_games = 0;
        for team in teams {
            let query = self.client.team_season_games_query(team.id, season);
            let games = load_cached(
                &self.cache,
                &CacheKey::SeasonGames { team_id: team.id, season },
                policy,
                || self.client.fetch(ResourceKind::Games, &query),
                decode::decode_games,
            )
            .await?;
            let fold = fold_season(team, &games);
            rejected_games += fold.rejected.len();
            records.push(fold.record);
        }

        info!("built {season} standings from {} teams", records.len());
        let standings = Standings::build(&records);
        Ok(NetworkResponse::StandingsLoaded { season, records, standings, rejected_games })
    }

    async fn handle_load_season_averages(
        &self,
        season: u16,
        player_ids: Vec<u32>,
        reload: bool,
    ) -> Result<NetworkResponse, LoadError> {
        let query = self.client.season_averages_query(season, &player_ids);
        let averages = load_cached(
            &self.cache,
            &CacheKey::season_averages(season, &player_ids),
            CachePolicy::from_reload(reload),
            || self.client.fetch(ResourceKind::SeasonAverages, &query),
            decode::decode_season_averages,
        )
        .await?;
        Ok(NetworkResponse::SeasonAveragesLoaded { season, averages })
    }

    async fn handle_search_players(&self, name: String) -> Result<NetworkResponse, LoadError> {
        let players = self.client.search_players(&name).await?;
        Ok(NetworkResponse::PlayersFound { players })
    }

    async fn load_teams(&self, season: u16, policy: CachePolicy) -> Result<Vec<Team>, LoadError> {
        let query = self.client.teams_query();
        load_cached(
            &self.cache,
            &CacheKey::AllTeams { season },
            policy,
            || self.client.fetch(ResourceKind::Teams, &query),
            decode::decode_teams,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::time::Duration;

    const TEAMS: &str = r#"{"data": [
        {"id": 1, "abbreviation": "ATL", "conference": "East", "division": "Southeast"},
        {"id": 2, "abbreviation": "BOS", "conference": "East", "division": "Atlantic"},
        {"id": 40, "abbreviation": "AND", "conference": " ", "division": " "}
    ]}"#;

    fn games_json(games: &[(u32, u32, u16, u32, u16)]) -> String {
        let rows: Vec<String> = games
            .iter()
            .map(|(id, home, hs, away, vs)| {
                // Game 1 is shaped like a historical record: no status field at all.
                let status = if *id == 1 { "" } else { r#""status": "Final","# };
                format!(
                    r#"{{"id": {id}, "date": "2022-11-0{id}T00:00:00.000Z", "season": 2022,
                        {status} "home_team": {{"id": {home}}},
                        "visitor_team": {{"id": {away}}},
                        "home_team_score": {hs}, "visitor_team_score": {vs}}}"#
                )
            })
            .collect();
        format!(r#"{{"data": [{}]}}"#, rows.join(","))
    }

    fn worker_for(server: &mockito::ServerGuard, cache_dir: &std::path::Path) -> NetworkWorker {
        let (_req_tx, req_rx) = mpsc::channel(1);
        let (resp_tx, _resp_rx) = mpsc::channel(1);
        NetworkWorker::new(
            NbaApi::new(&format!("{}/api/v1/", server.url()), Duration::from_secs(5)),
            CacheStore::new(cache_dir),
            req_rx,
            resp_tx,
        )
    }

    #[tokio::test]
    async fn standings_load_fetches_once_then_serves_from_cache() {
        let mut server = mockito::Server::new_async().await;
        let teams = server
            .mock("GET", "/api/v1/teams")
            .match_query(Matcher::Any)
            .with_body(TEAMS)
            .expect(1)
            .create_async()
            .await;
        let atl = server
            .mock("GET", "/api/v1/games")
            .match_query(Matcher::UrlEncoded("team_ids[]".into(), "1".into()))
            .with_body(games_json(&[(1, 1, 100, 2, 90), (2, 2, 110, 1, 105)]))
            .expect(1)
            .create_async()
            .await;
        let bos = server
            .mock("GET", "/api/v1/games")
            .match_query(Matcher::UrlEncoded("team_ids[]".into(), "2".into()))
            .with_body(games_json(&[(1, 1, 100, 2, 90), (2, 2, 110, 1, 105), (3, 2, 99, 5, 98)]))
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let worker = worker_for(&server, dir.path());
        let request = NetworkRequest::LoadStandings { season: 2022, reload: false };

        for _ in 0..2 {
            match worker.handle(request.clone()).await {
                NetworkResponse::StandingsLoaded { records, standings, rejected_games, .. } => {
                    assert_eq!(records.len(), 2, "defunct franchise is excluded");
                    assert_eq!(rejected_games, 0);
                    assert!(records.iter().all(|r| r.played >= 2), "status-less game 1 is counted");
                    let leader = &standings.league.rows[0];
                    assert_eq!(leader.record.team.abbreviation, "BOS");
                    assert_eq!((leader.record.wins, leader.record.losses), (2, 1));
                    assert_eq!(standings.league.rows[1].games_behind, 0.5);
                }
                other => panic!("unexpected response {other:?}"),
            }
        }

        teams.assert_async().await;
        atl.assert_async().await;
        bos.assert_async().await;
    }

    #[tokio::test]
    async fn box_score_is_aggregated_from_fetched_rows() {
        let mut server = mockito::Server::new_async().await;
        let row = |id: u32, team: u32, pts: u16| {
            format!(
                r#"{{"id": {id}, "pts": {pts}, "min": "30",
                    "game": {{"id": 5, "date": "2022-10-19", "home_team_id": 10, "visitor_team_id": 20}},
                    "player": {{"id": {id}, "first_name": "P", "last_name": "{id}"}},
                    "team": {{"id": {team}}}}}"#
            )
        };
        let body = format!(r#"{{"data": [{}, {}, {}]}}"#, row(1, 10, 20), row(2, 10, 15), row(3, 20, 30));
        server
            .mock("GET", "/api/v1/stats")
            .match_query(Matcher::UrlEncoded("game_ids[]".into(), "5".into()))
            .with_body(body)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let worker = worker_for(&server, dir.path());
        match worker.handle(NetworkRequest::LoadBoxScore { game_id: 5, reload: false }).await {
            NetworkResponse::BoxScoreLoaded { stats, totals: Some(totals), .. } => {
                assert_eq!(stats.len(), 3);
                assert_eq!(totals.away.points, 30);
                assert_eq!(totals.home.points, 35);
            }
            other => panic!("unexpected response {other:?}"),
        }
        assert!(CacheStore::new(dir.path()).exists(&CacheKey::TeamStats { game_id: 5 }));
    }

    #[tokio::test]
    async fn api_failure_becomes_an_alert() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/games")
            .match_query(Matcher::Any)
            .with_status(429)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let worker = worker_for(&server, dir.path());
        let response = worker
            .handle(NetworkRequest::LoadGames { date: "2022-10-19".into(), reload: false })
            .await;
        match response {
            NetworkResponse::Error { alert } => {
                assert_eq!(alert.message, "Too many server requests");
            }
            other => panic!("unexpected response {other:?}"),
        }
        assert!(!CacheStore::new(dir.path()).exists(&CacheKey::GameCollection { date: "2022-10-19".into() }));
    }
}
