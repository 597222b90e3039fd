use std::fmt::Write;

use crate::app::App;
use crate::state::messages::Alert;
use crate::stats::standings::{StandingsGroup, StandingsRow};
use crate::stats::team_game::TeamGameAggregate;
use nba_api::{Game, Player, PlayerGameStat, PlayerSeasonAverage, Team};

// Plain-text renderers. Each returns the full block so callers decide where it goes.

pub fn draw_teams(teams: &[Team]) -> String {
    let mut out = String::new();
    for t in teams {
        let conference = t.conference.map(|c| c.label()).unwrap_or("-");
        let division = t.division.map(|d| d.label()).unwrap_or("-");
        let _ = writeln!(
            out,
            "{:>3}  {:<4} {:<26} {:<5} {}",
            t.id, t.abbreviation, t.full_name, conference, division
        );
    }
    if out.is_empty() {
        out.push_str("No teams.\n");
    }
    out
}

pub fn draw_games(date: &str, games: &[&Game]) -> String {
    let mut out = format!("Games on {date}\n");
    if games.is_empty() {
        out.push_str("  No games.\n");
        return out;
    }
    for g in games {
        let _ = writeln!(
            out,
            "  [{}] {:<4} {:>3}  @  {:<4} {:>3}   {}",
            g.id,
            g.away_team.abbreviation,
            g.away_score,
            g.home_team.abbreviation,
            g.home_score,
            game_status(g)
        );
    }
    out
}

fn game_status(game: &Game) -> String {
    let status = game.status.as_deref().unwrap_or("").trim();
    match game.time.as_deref().map(str::trim) {
        Some(time) if !time.is_empty() && !game.is_final() => format!("{status} {time}"),
        _ => status.to_owned(),
    }
}

pub fn draw_box_score(app: &App) -> String {
    let Some(box_score) = &app.state.box_score else {
        return "No box score loaded.\n".to_owned();
    };
    let Some(totals) = &box_score.totals else {
        return format!("Game {} has no box score yet.\n", box_score.game_id);
    };

    let mut out = String::new();
    for side in [&totals.away, &totals.home] {
        let _ = writeln!(out, "{}", side.team_abbreviation);
        let _ = writeln!(out, "  {:<24} {:>3} {:>3} {:>3} {:>3}  {:>7}", "PLAYER", "MIN", "PTS", "REB", "AST", "FG");
        for line in box_score.stats.iter().filter(|s| s.team_id == side.team_id) {
            let _ = writeln!(out, "{}", player_line(line));
        }
        let _ = writeln!(out, "{}", totals_line(side));
        out.push('\n');
    }
    out
}

fn player_line(line: &PlayerGameStat) -> String {
    format!(
        "  {:<24} {:>3} {:>3} {:>3} {:>3}  {:>7}",
        line.player_name,
        line.minutes,
        line.points,
        line.rebounds,
        line.assists,
        format!("{}-{}", line.fgm, line.fga)
    )
}

fn totals_line(totals: &TeamGameAggregate) -> String {
    let pct = |p: Option<f32>| p.map(|p| format!("{p:.1}%")).unwrap_or_else(|| "-".to_owned());
    format!(
        "  {:<24} {:>3} {:>3} {:>3} {:>3}  {:>7}  FG {} 3P {} FT {}",
        "TOTAL",
        totals.minutes,
        totals.points,
        totals.rebounds,
        totals.assists,
        format!("{}-{}", totals.fgm, totals.fga),
        pct(totals.fg_pct()),
        pct(totals.fg3_pct()),
        pct(totals.ft_pct())
    )
}

pub fn draw_standings(app: &App) -> String {
    let Some(loaded) = &app.state.standings else {
        return "No standings loaded.\n".to_owned();
    };
    let mut out = format!("{} season\n\n", loaded.season);
    for group in &loaded.standings.conferences {
        out.push_str(&draw_group(group));
        out.push('\n');
    }
    for group in &loaded.standings.divisions {
        out.push_str(&draw_group(group));
        out.push('\n');
    }
    if loaded.rejected_games > 0 {
        let _ = writeln!(out, "{} games skipped (inconsistent data)", loaded.rejected_games);
    }
    out
}

pub fn draw_group(group: &StandingsGroup) -> String {
    let mut out = format!(
        "{:<12} {:>3} {:>3}  {:>5}  {:>4}  {:>5}  {:>5}  {:>5}\n",
        group.key.label(),
        "W",
        "L",
        "PCT",
        "GB",
        "HOME",
        "AWAY",
        "DIFF"
    );
    for (rank, row) in group.rows.iter().enumerate() {
        let _ = writeln!(out, "{}", standings_line(rank + 1, row));
    }
    out
}

fn standings_line(rank: usize, row: &StandingsRow) -> String {
    let r = &row.record;
    let gb = if row.games_behind == 0.0 { "-".to_owned() } else { format!("{:.1}", row.games_behind) };
    format!(
        "{:>2}. {:<8} {:>3} {:>3}  {:.3}  {:>4}  {:>5}  {:>5}  {:>+5}",
        rank,
        r.team.abbreviation,
        r.wins,
        r.losses,
        r.pct,
        gb,
        format!("{}-{}", r.home_wins, r.home_losses),
        format!("{}-{}", r.away_wins, r.away_losses),
        r.point_differential()
    )
}

pub fn draw_players(players: &[Player]) -> String {
    if players.is_empty() {
        return "No players found.\n".to_owned();
    }
    let mut out = String::new();
    for p in players {
        let _ = writeln!(
            out,
            "{:>7}  {:<26} {:<3} {}",
            p.id,
            p.full_name(),
            p.position.as_deref().unwrap_or("-"),
            p.team_abbreviation.as_deref().unwrap_or("-")
        );
    }
    out
}

pub fn draw_season_averages(season: u16, averages: &[PlayerSeasonAverage]) -> String {
    let mut out = format!("{season} season averages\n");
    if averages.is_empty() {
        out.push_str("  No averages.\n");
        return out;
    }
    let _ = writeln!(out, "  {:>7} {:>3} {:>6} {:>5} {:>5} {:>5}", "PLAYER", "GP", "MIN", "PTS", "REB", "AST");
    for a in averages {
        let _ = writeln!(
            out,
            "  {:>7} {:>3} {:>6} {:>5.1} {:>5.1} {:>5.1}",
            a.player_id, a.games_played, a.minutes, a.points, a.rebounds, a.assists
        );
    }
    out
}

pub fn draw_favourites(app: &App) -> String {
    let favourites = &app.state.favourites;
    let mut out = String::from("Favourite teams\n");
    if favourites.teams().is_empty() {
        out.push_str("  none\n");
    }
    for (i, t) in favourites.teams().iter().enumerate() {
        let _ = writeln!(out, "  {i}. {} ({})", t.full_name, t.abbreviation);
    }
    for (team, position) in app.favourite_positions() {
        match position {
            Ok(p) => {
                let _ = writeln!(
                    out,
                    "     {}: #{} division, #{} conference, #{} league",
                    team.abbreviation, p.division, p.conference, p.league
                );
            }
            Err(e) => {
                let _ = writeln!(out, "     {e}");
            }
        }
    }

    out.push_str("Favourite players\n");
    if favourites.players().is_empty() {
        out.push_str("  none\n");
    }
    for (i, p) in favourites.players().iter().enumerate() {
        let _ = writeln!(out, "  {i}. {}", p.full_name());
    }
    out
}

pub fn draw_preferences(app: &App) -> String {
    let on_off = |b: bool| if b { "on" } else { "off" };
    let prefs = app.state.preferences;
    format!(
        "game alerts:     {}\nfavourites only: {}\n",
        on_off(prefs.game_alerts),
        on_off(prefs.favourites_only)
    )
}

pub fn draw_alert(alert: &Alert) -> String {
    format!("{}: {}", alert.title, alert.message)
}
