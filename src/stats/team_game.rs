use nba_api::PlayerGameStat;
use nba_api::decode::to_percent;

/// Team box-score totals for one game, summed from the players' lines.
/// Always rebuilt from the current player rows; never cached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamGameAggregate {
    pub team_id: u32,
    pub team_abbreviation: String,
    pub game_id: u32,
    pub players: u32,
    pub minutes: u32,
    pub points: u32,
    pub rebounds: u32,
    pub offensive_rebounds: u32,
    pub defensive_rebounds: u32,
    pub assists: u32,
    pub steals: u32,
    pub blocks: u32,
    pub turnovers: u32,
    pub fouls: u32,
    pub fgm: u32,
    pub fga: u32,
    pub fg3m: u32,
    pub fg3a: u32,
    pub ftm: u32,
    pub fta: u32,
}

impl TeamGameAggregate {
    fn new(team_id: u32, game_id: u32) -> Self {
        Self { team_id, game_id, ..Self::default() }
    }

    fn add(&mut self, line: &PlayerGameStat) {
        if self.team_abbreviation.is_empty() {
            self.team_abbreviation = line.team_abbreviation.clone();
        }
        self.players += 1;
        self.minutes += u32::from(line.minutes);
        self.points += u32::from(line.points);
        self.rebounds += u32::from(line.rebounds);
        self.offensive_rebounds += u32::from(line.offensive_rebounds);
        self.defensive_rebounds += u32::from(line.defensive_rebounds);
        self.assists += u32::from(line.assists);
        self.steals += u32::from(line.steals);
        self.blocks += u32::from(line.blocks);
        self.turnovers += u32::from(line.turnovers);
        self.fouls += u32::from(line.fouls);
        self.fgm += u32::from(line.fgm);
        self.fga += u32::from(line.fga);
        self.fg3m += u32::from(line.fg3m);
        self.fg3a += u32::from(line.fg3a);
        self.ftm += u32::from(line.ftm);
        self.fta += u32::from(line.fta);
    }

    pub fn fg_pct(&self) -> Option<f32> {
        shooting_pct(self.fgm, self.fga)
    }

    pub fn fg3_pct(&self) -> Option<f32> {
        shooting_pct(self.fg3m, self.fg3a)
    }

    pub fn ft_pct(&self) -> Option<f32> {
        shooting_pct(self.ftm, self.fta)
    }
}

fn shooting_pct(made: u32, attempted: u32) -> Option<f32> {
    (attempted > 0).then(|| to_percent(f64::from(made) / f64::from(attempted)))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameTotals {
    pub home: TeamGameAggregate,
    pub away: TeamGameAggregate,
}

/// Split one game's player rows by team and sum each side. Rows whose team is
/// not `away_team_id` belong to the home side.
pub fn aggregate_game(stats: &[PlayerGameStat], away_team_id: u32) -> GameTotals {
    let game_id = stats.first().map(|s| s.game_id).unwrap_or_default();
    let home_team_id = stats
        .iter()
        .map(|s| s.team_id)
        .find(|&id| id != away_team_id)
        .or_else(|| stats.first().map(|s| s.home_team_id))
        .unwrap_or_default();

    let mut totals = GameTotals {
        home: TeamGameAggregate::new(home_team_id, game_id),
        away: TeamGameAggregate::new(away_team_id, game_id),
    };
    for line in stats {
        if line.team_id == away_team_id {
            totals.away.add(line);
        } else {
            totals.home.add(line);
        }
    }
    totals
}

/// Aggregate a box score using the away team recorded on the rows themselves.
pub fn aggregate_box_score(stats: &[PlayerGameStat]) -> Option<GameTotals> {
    let away_team_id = stats.first()?.away_team_id;
    Some(aggregate_game(stats, away_team_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(team_id: u32, points: u16) -> PlayerGameStat {
        PlayerGameStat {
            game_id: 77,
            team_id,
            home_team_id: 10,
            away_team_id: 20,
            points,
            rebounds: points / 5,
            assists: points / 7,
            fgm: points / 2,
            fga: points,
            ..Default::default()
        }
    }

    #[test]
    fn splits_players_between_home_and_away() {
        let stats = vec![line(10, 20), line(10, 15), line(20, 30)];
        let totals = aggregate_game(&stats, 20);
        assert_eq!(totals.away.points, 30);
        assert_eq!(totals.home.points, 35);
        assert_eq!(totals.home.team_id, 10);
        assert_eq!(totals.home.players, 2);
        assert_eq!(totals.away.players, 1);
        assert_eq!(totals.home.game_id, 77);
    }

    #[test]
    fn both_sides_sum_to_every_player() {
        let stats: Vec<_> = (0..13u16)
            .map(|i| line(if i % 3 == 0 { 20 } else { 10 }, i * 3 + 1))
            .collect();
        let totals = aggregate_game(&stats, 20);

        let sum = |f: fn(&PlayerGameStat) -> u16| stats.iter().map(|s| u32::from(f(s))).sum::<u32>();
        assert_eq!(totals.home.points + totals.away.points, sum(|s| s.points));
        assert_eq!(totals.home.rebounds + totals.away.rebounds, sum(|s| s.rebounds));
        assert_eq!(totals.home.assists + totals.away.assists, sum(|s| s.assists));
        assert_eq!(totals.home.fga + totals.away.fga, sum(|s| s.fga));
        assert_eq!(totals.home.players + totals.away.players, stats.len() as u32);

        let away_only: u32 = stats
            .iter()
            .filter(|s| s.team_id == 20)
            .map(|s| u32::from(s.points))
            .sum();
        assert_eq!(totals.away.points, away_only);
    }

    #[test]
    fn shooting_percentages_come_from_summed_attempts() {
        let mut a = line(10, 0);
        a.fgm = 5;
        a.fga = 10;
        let mut b = line(10, 0);
        b.fgm = 3;
        b.fga = 11;
        let totals = aggregate_game(&[a, b], 20);
        assert_eq!(totals.home.fg_pct(), Some(38.1));
        assert_eq!(totals.home.fg3_pct(), None);
    }

    #[test]
    fn box_score_uses_row_away_team() {
        assert!(aggregate_box_score(&[]).is_none());
        let totals = aggregate_box_score(&[line(10, 12), line(20, 8)]).unwrap();
        assert_eq!(totals.away.team_id, 20);
        assert_eq!(totals.away.points, 8);
        assert_eq!(totals.home.points, 12);
    }
}
