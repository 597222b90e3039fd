use crate::stats::season::TeamSeasonRecord;
use log::warn;
use nba_api::{Conference, Division, Team};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    League,
    Conference(Conference),
    Division(Division),
}

impl GroupKey {
    pub fn label(&self) -> &'static str {
        match self {
            GroupKey::League => "League",
            GroupKey::Conference(c) => c.label(),
            GroupKey::Division(d) => d.label(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StandingsRow {
    pub record: TeamSeasonRecord,
    /// Leader's season score minus this team's. Zero for the leader.
    pub games_behind: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StandingsGroup {
    pub key: GroupKey,
    pub rows: Vec<StandingsRow>,
}

impl StandingsGroup {
    /// Stable sort by winning percentage, best first; ties keep input order.
    fn build(key: GroupKey, mut records: Vec<TeamSeasonRecord>) -> Self {
        records.sort_by(|a, b| b.pct.total_cmp(&a.pct));
        let leader_score = records.first().map(|r| r.season_score).unwrap_or_default();
        let rows = records
            .into_iter()
            .map(|record| StandingsRow { games_behind: leader_score - record.season_score, record })
            .collect();
        Self { key, rows }
    }

    /// 1-based rank of `team_id` in this group.
    pub fn rank_of(&self, team_id: u32) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.record.team.id == team_id)
            .map(|i| i + 1)
    }

    pub fn leader(&self) -> Option<&StandingsRow> {
        self.rows.first()
    }
}

/// League, conference and division tables built from one snapshot of records.
/// Groups are listed in a fixed order: East before West, then divisions as in
/// `Division::ALL`.
#[derive(Debug, Clone, PartialEq)]
pub struct Standings {
    pub league: StandingsGroup,
    pub conferences: Vec<StandingsGroup>,
    pub divisions: Vec<StandingsGroup>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub division: usize,
    pub conference: usize,
    pub league: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StandingsError {
    /// Team has no conference/division, so it cannot be placed.
    Unaffiliated { team: String },
    /// Team is missing from a group it belongs to.
    NotInGroup { team: String, group: GroupKey },
}

impl fmt::Display for StandingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StandingsError::Unaffiliated { team } => {
                write!(f, "{team} has no conference or division")
            }
            StandingsError::NotInGroup { team, group } => {
                write!(f, "{team} is missing from the {} standings", group.label())
            }
        }
    }
}

impl std::error::Error for StandingsError {}

impl Standings {
    /// Records lacking a conference or division only appear in the league table.
    pub fn build(records: &[TeamSeasonRecord]) -> Self {
        for r in records {
            if r.team.conference.is_none() || r.team.division.is_none() {
                warn!("{} has no conference/division; league table only", r.team.abbreviation);
            }
        }

        let conferences = Conference::ALL
            .iter()
            .map(|&c| {
                let members = records
                    .iter()
                    .filter(|r| r.team.conference == Some(c))
                    .cloned()
                    .collect();
                StandingsGroup::build(GroupKey::Conference(c), members)
            })
            .collect();

        let divisions = Division::ALL
            .iter()
            .map(|&d| {
                let members = records
                    .iter()
                    .filter(|r| r.team.division == Some(d))
                    .cloned()
                    .collect();
                StandingsGroup::build(GroupKey::Division(d), members)
            })
            .collect();

        Self {
            league: StandingsGroup::build(GroupKey::League, records.to_vec()),
            conferences,
            divisions,
        }
    }

    pub fn conference(&self, conference: Conference) -> Option<&StandingsGroup> {
        self.conferences
            .iter()
            .find(|g| g.key == GroupKey::Conference(conference))
    }

    pub fn division(&self, division: Division) -> Option<&StandingsGroup> {
        self.divisions
            .iter()
            .find(|g| g.key == GroupKey::Division(division))
    }

    /// The team's 1-based rank in its division, its conference and the league.
    pub fn position(&self, team: &Team) -> Result<Position, StandingsError> {
        let (Some(conference), Some(division)) = (team.conference, team.division) else {
            return Err(StandingsError::Unaffiliated { team: team.abbreviation.clone() });
        };
        let rank_in = |group: Option<&StandingsGroup>, key: GroupKey| {
            group
                .and_then(|g| g.rank_of(team.id))
                .ok_or_else(|| StandingsError::NotInGroup {
                    team: team.abbreviation.clone(),
                    group: key,
                })
        };

        Ok(Position {
            division: rank_in(self.division(division), GroupKey::Division(division))?,
            conference: rank_in(self.conference(conference), GroupKey::Conference(conference))?,
            league: rank_in(Some(&self.league), GroupKey::League)?,
        })
    }
}
