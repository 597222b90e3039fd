use log::{debug, warn};
use nba_api::{Game, Side, Team};
use std::fmt;

/// Running win/loss bookkeeping for one team across a season.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamSeasonRecord {
    pub team: Team,
    pub played: u16,
    pub wins: u16,
    pub losses: u16,
    pub home_wins: u16,
    pub home_losses: u16,
    pub away_wins: u16,
    pub away_losses: u16,
    /// +0.5 per win, -0.5 per loss. Differences between two teams give games behind.
    pub season_score: f64,
    /// wins / played, three decimal places. Recomputed in full after every game.
    pub pct: f64,
    pub points_for: u32,
    pub points_against: u32,
}

/// A game that does not involve the team exactly once. Points at bad upstream data.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrityError {
    pub team: String,
    pub game_id: u32,
    pub home: String,
    pub away: String,
}

impl fmt::Display for IntegrityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "game {} ({} vs {}) cannot be counted for {}",
            self.game_id, self.home, self.away, self.team
        )
    }
}

impl std::error::Error for IntegrityError {}

impl TeamSeasonRecord {
    pub fn new(team: Team) -> Self {
        Self {
            team,
            played: 0,
            wins: 0,
            losses: 0,
            home_wins: 0,
            home_losses: 0,
            away_wins: 0,
            away_losses: 0,
            season_score: 0.0,
            pct: 0.0,
            points_for: 0,
            points_against: 0,
        }
    }

    /// Fold one game into the record. The team must be on exactly one side;
    /// otherwise the record is left unchanged.
    ///
    /// A tied score counts as a loss. Completed games cannot end tied, so this
    /// only matters for callers that fold unfinished games.
    pub fn add_game(&mut self, game: &Game) -> Result<(), IntegrityError> {
        let side = game.side_of(&self.team).ok_or_else(|| IntegrityError {
            team: self.team.abbreviation.clone(),
            game_id: game.id,
            home: game.home_team.abbreviation.clone(),
            away: game.away_team.abbreviation.clone(),
        })?;

        let (scored, conceded) = match side {
            Side::Home => (game.home_score, game.away_score),
            Side::Away => (game.away_score, game.home_score),
        };

        self.played += 1;
        self.points_for += u32::from(scored);
        self.points_against += u32::from(conceded);

        if scored > conceded {
            self.wins += 1;
            match side {
                Side::Home => self.home_wins += 1,
                Side::Away => self.away_wins += 1,
            }
            self.season_score += 0.5;
        } else {
            self.losses += 1;
            match side {
                Side::Home => self.home_losses += 1,
                Side::Away => self.away_losses += 1,
            }
            self.season_score -= 0.5;
        }

        self.pct = (f64::from(self.wins) / f64::from(self.played) * 1000.0).round() / 1000.0;
        Ok(())
    }

    pub fn point_differential(&self) -> i64 {
        i64::from(self.points_for) - i64::from(self.points_against)
    }
}

#[derive(Debug, Clone)]
pub struct SeasonFold {
    pub record: TeamSeasonRecord,
    /// Games rejected because the team was not on exactly one side.
    pub rejected: Vec<IntegrityError>,
}

/// Build a team's record from its season games. Scheduled, live and tied games
/// are left out; games with bad participants are skipped and reported, not fatal.
pub fn fold_season(team: Team, games: &[Game]) -> SeasonFold {
    let mut record = TeamSeasonRecord::new(team);
    let mut rejected = Vec::new();

    for game in games {
        if game.is_pending() {
            debug!("{}: skipping unfinished game {}", record.team.abbreviation, game.id);
            continue;
        }
        if game.home_score == game.away_score {
            warn!(
                "{}: skipping game {} with tied score {}-{}",
                record.team.abbreviation, game.id, game.home_score, game.away_score
            );
            continue;
        }
        if let Err(e) = record.add_game(game) {
            warn!("{e}");
            rejected.push(e);
        }
    }

    SeasonFold { record, rejected }
}
