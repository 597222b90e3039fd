use crate::wire::{
    DataEnvelope, WireGame, WireMinutes, WirePlayer, WireSeasonAverage, WireStat, WireTeam,
};
use crate::{Conference, Division, Game, Player, PlayerGameStat, PlayerSeasonAverage, Team};
use chrono::{DateTime, NaiveDate};
use serde::de::DeserializeOwned;
use std::fmt;

pub type DecodeResult<T> = Result<T, DecodeError>;

/// A payload that could not be turned into domain records.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeError {
    pub resource: &'static str,
    pub message: String,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not decode {}: {}", self.resource, self.message)
    }
}

impl std::error::Error for DecodeError {}

// ---------------------------------------------------------------------------
// Collection decoders
// ---------------------------------------------------------------------------

pub fn decode_teams(bytes: &[u8]) -> DecodeResult<Vec<Team>> {
    decode_collection("teams", bytes, map_team)
}

pub fn decode_players(bytes: &[u8]) -> DecodeResult<Vec<Player>> {
    decode_collection("players", bytes, map_player)
}

pub fn decode_games(bytes: &[u8]) -> DecodeResult<Vec<Game>> {
    decode_collection("games", bytes, map_game)
}

pub fn decode_stats(bytes: &[u8]) -> DecodeResult<Vec<PlayerGameStat>> {
    decode_collection("stats", bytes, map_stat)
}

pub fn decode_season_averages(bytes: &[u8]) -> DecodeResult<Vec<PlayerSeasonAverage>> {
    decode_collection("season averages", bytes, map_season_average)
}

fn decode_collection<W, T>(
    resource: &'static str,
    bytes: &[u8],
    map: impl Fn(W) -> T,
) -> DecodeResult<Vec<T>>
where
    W: DeserializeOwned,
{
    let envelope: DataEnvelope<W> = serde_json::from_slice(bytes).map_err(|e| DecodeError {
        resource,
        message: e.to_string(),
    })?;
    Ok(envelope.data.into_iter().map(map).collect())
}

// ---------------------------------------------------------------------------
// Mapping: wire types → clean domain types
// ---------------------------------------------------------------------------

fn map_team(t: WireTeam) -> Team {
    Team {
        id: t.id,
        abbreviation: t.abbreviation.unwrap_or_default(),
        city: t.city.unwrap_or_default(),
        name: t.name.unwrap_or_default(),
        full_name: t.full_name.unwrap_or_default(),
        conference: t.conference.as_deref().and_then(Conference::parse),
        division: t.division.as_deref().and_then(Division::parse),
    }
}

fn map_player(p: WirePlayer) -> Player {
    Player {
        id: p.id,
        first_name: p.first_name.unwrap_or_default(),
        last_name: p.last_name.unwrap_or_default(),
        position: p.position.filter(|s| !s.trim().is_empty()),
        team_id: p.team.as_ref().map(|t| t.id),
        team_abbreviation: p.team.and_then(|t| t.abbreviation),
    }
}

fn map_game(g: WireGame) -> Game {
    Game {
        id: g.id,
        date: normalize_date(&g.date),
        season: g.season.unwrap_or_default(),
        postseason: g.postseason.unwrap_or(false),
        home_team: map_team(g.home_team),
        away_team: map_team(g.visitor_team),
        home_score: g.home_team_score.unwrap_or_default(),
        away_score: g.visitor_team_score.unwrap_or_default(),
        period: g.period,
        // The API sends " " for historical games; treat blank as absent.
        time: g.time.filter(|s| !s.trim().is_empty()),
        status: g.status.filter(|s| !s.trim().is_empty()),
    }
}

fn map_stat(s: WireStat) -> PlayerGameStat {
    let player_name = [s.player.first_name, s.player.last_name]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    PlayerGameStat {
        id: s.id,
        player_id: s.player.id,
        player_name,
        team_id: s.team.id,
        team_abbreviation: s.team.abbreviation.unwrap_or_default(),
        game_id: s.game.id,
        game_date: normalize_date(&s.game.date),
        home_team_id: s.game.home_team_id,
        away_team_id: s.game.visitor_team_id,
        home_score: s.game.home_team_score.unwrap_or_default(),
        away_score: s.game.visitor_team_score.unwrap_or_default(),
        minutes: s.min.as_ref().map(parse_minutes).unwrap_or_default(),
        points: s.pts.unwrap_or_default(),
        rebounds: s.reb.unwrap_or_default(),
        offensive_rebounds: s.oreb.unwrap_or_default(),
        defensive_rebounds: s.dreb.unwrap_or_default(),
        assists: s.ast.unwrap_or_default(),
        steals: s.stl.unwrap_or_default(),
        blocks: s.blk.unwrap_or_default(),
        turnovers: s.turnover.unwrap_or_default(),
        fouls: s.pf.unwrap_or_default(),
        fgm: s.fgm.unwrap_or_default(),
        fga: s.fga.unwrap_or_default(),
        fg3m: s.fg3m.unwrap_or_default(),
        fg3a: s.fg3a.unwrap_or_default(),
        ftm: s.ftm.unwrap_or_default(),
        fta: s.fta.unwrap_or_default(),
        fg_pct: s.fg_pct.map(to_percent),
        fg3_pct: s.fg3_pct.map(to_percent),
        ft_pct: s.ft_pct.map(to_percent),
    }
}

fn map_season_average(a: WireSeasonAverage) -> PlayerSeasonAverage {
    PlayerSeasonAverage {
        player_id: a.player_id,
        season: a.season,
        games_played: a.games_played.unwrap_or_default(),
        minutes: a.min.unwrap_or_default(),
        points: a.pts.unwrap_or_default(),
        assists: a.ast.unwrap_or_default(),
        rebounds: a.reb.unwrap_or_default(),
    }
}

/// Convert a fraction in [0, 1] into a percentage with one decimal place.
pub fn to_percent(fraction: f64) -> f32 {
    ((fraction * 1000.0).round() / 10.0) as f32
}

/// Whole minutes played. Anything unparseable ("", "DNP", garbage) counts as 0.
pub fn parse_minutes(raw: &WireMinutes) -> u16 {
    let minutes = match raw {
        WireMinutes::Number(n) => *n,
        WireMinutes::Text(s) => s
            .split(':')
            .next()
            .and_then(|m| m.trim().parse::<f64>().ok())
            .unwrap_or_default(),
    };
    if minutes.is_finite() && minutes > 0.0 {
        minutes.trunc().min(f64::from(u16::MAX)) as u16
    } else {
        0
    }
}

/// Reduce the API's timestamp dates ("2022-10-19T00:00:00.000Z") to the
/// calendar date used for cache keys and display.
pub fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.date_naive().format("%Y-%m-%d").to_string();
    }
    if let Some(prefix) = raw.get(..10)
        && NaiveDate::parse_from_str(prefix, "%Y-%m-%d").is_ok()
    {
        return prefix.to_owned();
    }
    raw.to_owned()
}
