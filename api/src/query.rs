//! Resource paths and query vocabulary of the stats API.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Stats,
    Games,
    Teams,
    Players,
    SeasonAverages,
}

impl ResourceKind {
    /// Path segment under the API base path.
    pub fn path(&self) -> &'static str {
        match self {
            ResourceKind::Stats => "stats",
            ResourceKind::Games => "games",
            ResourceKind::Teams => "teams",
            ResourceKind::Players => "players",
            ResourceKind::SeasonAverages => "season_averages",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Scalar(String),
    /// Encoded as repeated `name[]=value` pairs.
    Array(Vec<String>),
}

/// Ordered query parameters. Setting a parameter twice replaces the first value
/// in place so two identically-built queries always encode identically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(&'static str, ParamValue)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(self, term: &str) -> Self {
        self.scalar("search", term)
    }

    pub fn game_ids(self, ids: &[u32]) -> Self {
        self.array("game_ids", ids.iter().map(u32::to_string).collect())
    }

    pub fn per_page(self, n: u32) -> Self {
        self.scalar("per_page", n)
    }

    pub fn page(self, n: u32) -> Self {
        self.scalar("page", n)
    }

    pub fn dates(self, dates: &[&str]) -> Self {
        self.array("dates", dates.iter().map(|d| d.to_string()).collect())
    }

    pub fn start_date(self, date: &str) -> Self {
        self.scalar("start_date", date)
    }

    pub fn end_date(self, date: &str) -> Self {
        self.scalar("end_date", date)
    }

    pub fn seasons(self, seasons: &[u16]) -> Self {
        self.array("seasons", seasons.iter().map(u16::to_string).collect())
    }

    /// `season_averages` takes a scalar `season` rather than `seasons[]`.
    pub fn season(self, season: u16) -> Self {
        self.scalar("season", season)
    }

    pub fn team_ids(self, ids: &[u32]) -> Self {
        self.array("team_ids", ids.iter().map(u32::to_string).collect())
    }

    pub fn player_ids(self, ids: &[u32]) -> Self {
        self.array("player_ids", ids.iter().map(u32::to_string).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Flatten to `(key, value)` pairs ready for URL encoding.
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (name, value) in &self.params {
            match value {
                ParamValue::Scalar(v) => pairs.push((name.to_string(), v.clone())),
                ParamValue::Array(values) => {
                    for v in values {
                        pairs.push((format!("{name}[]"), v.clone()));
                    }
                }
            }
        }
        pairs
    }

    fn scalar(self, name: &'static str, value: impl ToString) -> Self {
        self.set(name, ParamValue::Scalar(value.to_string()))
    }

    fn array(self, name: &'static str, values: Vec<String>) -> Self {
        self.set(name, ParamValue::Array(values))
    }

    fn set(mut self, name: &'static str, value: ParamValue) -> Self {
        match self.params.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.params.push((name, value)),
        }
        self
    }
}
