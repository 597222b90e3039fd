use log::{debug, warn};
use nba_api::client::{ApiError, ApiResult};
use nba_api::decode::{DecodeError, DecodeResult};
use std::fmt::{self, Write as _};
use std::fs;
use std::future::Future;
use std::io;
use std::path::PathBuf;

/// Identifies one cached resource fetch. Equal resolved parameters give equal keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Every game on one calendar day.
    GameCollection { date: String },
    /// Raw box-score rows for one game. Team totals are derived, never stored.
    TeamStats { game_id: u32 },
    SeasonGames { team_id: u32, season: u16 },
    AllTeams { season: u16 },
    SeasonAverages { season: u16, player_ids: Vec<u32> },
}

impl CacheKey {
    pub fn season_averages(season: u16, player_ids: &[u32]) -> Self {
        let mut player_ids = player_ids.to_vec();
        player_ids.sort_unstable();
        player_ids.dedup();
        CacheKey::SeasonAverages { season, player_ids }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::GameCollection { date } => write!(f, "{date}-gameCollection"),
            CacheKey::TeamStats { game_id } => write!(f, "{game_id}-teamStats"),
            CacheKey::SeasonGames { team_id, season } => {
                write!(f, "{team_id}-{season}-seasonGamesData")
            }
            CacheKey::AllTeams { season } => write!(f, "{season}-all_teams"),
            CacheKey::SeasonAverages { season, player_ids } => {
                let ids: Vec<String> = player_ids.iter().map(u32::to_string).collect();
                write!(f, "{season}-{}-seasonAverages", ids.join("_"))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    #[default]
    PreferCache,
    /// Skip the read, always fetch, write the fresh payload back.
    ForceReload,
}

impl CachePolicy {
    pub fn from_reload(reload: bool) -> Self {
        if reload { CachePolicy::ForceReload } else { CachePolicy::PreferCache }
    }
}

#[derive(Debug)]
pub enum CacheError {
    Read { key: String, source: io::Error },
    Write { key: String, source: io::Error },
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Read { key, source } => write!(f, "could not read cache entry {key}: {source}"),
            CacheError::Write { key, source } => {
                write!(f, "could not write cache entry {key}: {source}")
            }
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Read { source, .. } | CacheError::Write { source, .. } => Some(source),
        }
    }
}

/// Filesystem key → blob store. No expiry: an entry stays valid until overwritten.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn exists(&self, key: &CacheKey) -> bool {
        self.path_for(key).exists()
    }

    /// `Ok(None)` when the key is absent; `Err` when it is present but unreadable.
    pub fn read(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CacheError::Read { key: key.to_string(), source }),
        }
    }

    /// Unconditional overwrite; last write wins.
    pub fn write(&self, key: &CacheKey, bytes: &[u8]) -> Result<(), CacheError> {
        let path = self.path_for(key);
        let write_err = |source| CacheError::Write { key: key.to_string(), source };

        fs::create_dir_all(&self.root).map_err(write_err)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes).map_err(write_err)?;
        fs::rename(&tmp, &path).map_err(write_err)?;
        Ok(())
    }

    /// Bytes outside `[A-Za-z0-9_-]` are percent-encoded, so distinct keys never
    /// share a file.
    fn path_for(&self, key: &CacheKey) -> PathBuf {
        let mut file_name = String::new();
        for b in key.to_string().bytes() {
            if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
                file_name.push(char::from(b));
            } else {
                let _ = write!(file_name, "%{b:02X}");
            }
        }
        self.root.join(format!("{file_name}.json"))
    }
}

/// Everything that can go wrong resolving one resource through the cache.
#[derive(Debug)]
pub enum LoadError {
    Api(ApiError),
    Decode(DecodeError),
    CacheRead(CacheError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Api(e) => write!(f, "{e}"),
            LoadError::Decode(e) => write!(f, "{e}"),
            LoadError::CacheRead(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<ApiError> for LoadError {
    fn from(e: ApiError) -> Self {
        LoadError::Api(e)
    }
}

impl From<DecodeError> for LoadError {
    fn from(e: DecodeError) -> Self {
        LoadError::Decode(e)
    }
}

impl From<CacheError> for LoadError {
    fn from(e: CacheError) -> Self {
        LoadError::CacheRead(e)
    }
}

/// Serve `key` from the cache unless the policy forces a reload, otherwise run
/// `fetch`, decode, and persist the raw payload. Nothing is written unless the
/// fresh payload decodes.
pub async fn load_cached<T, F, Fut, D>(
    cache: &CacheStore,
    key: &CacheKey,
    policy: CachePolicy,
    fetch: F,
    decode: D,
) -> Result<T, LoadError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = ApiResult<Vec<u8>>>,
    D: Fn(&[u8]) -> DecodeResult<T>,
{
    if policy == CachePolicy::PreferCache
        && cache.exists(key)
        && let Some(raw) = cache.read(key)?
    {
        match decode(&raw) {
            Ok(value) => {
                debug!("cache hit {key}");
                return Ok(value);
            }
            Err(e) => warn!("cached {key} no longer decodes, refetching: {e}"),
        }
    }

    debug!("fetching {key} ({policy:?})");
    let raw = fetch().await?;
    let value = decode(&raw)?;
    match cache.write(key, &raw) {
        Ok(()) => debug!("cached {key} ({} bytes)", raw.len()),
        Err(e) => warn!("{e}"),
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nba_api::decode::decode_games;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const GAMES: &[u8] = br#"{"data": [{"id": 1, "date": "2022-10-19T00:00:00.000Z",
        "home_team": {"id": 2, "abbreviation": "BOS"}, "visitor_team": {"id": 23, "abbreviation": "PHI"},
        "home_team_score": 126, "visitor_team_score": 117, "status": "Final"}]}"#;

    fn date_key() -> CacheKey {
        CacheKey::GameCollection { date: "2022-10-19".into() }
    }

    #[test]
    fn key_strings_are_deterministic() {
        assert_eq!(date_key().to_string(), "2022-10-19-gameCollection");
        assert_eq!(CacheKey::TeamStats { game_id: 857 }.to_string(), "857-teamStats");
        assert_eq!(
            CacheKey::SeasonGames { team_id: 2, season: 2022 }.to_string(),
            "2-2022-seasonGamesData"
        );
        assert_eq!(CacheKey::AllTeams { season: 2022 }.to_string(), "2022-all_teams");
        assert_eq!(
            CacheKey::season_averages(2022, &[237, 115, 237]),
            CacheKey::season_averages(2022, &[115, 237])
        );
        assert_eq!(
            CacheKey::season_averages(2022, &[237, 115]).to_string(),
            "2022-115_237-seasonAverages"
        );
    }

    #[test]
    fn exists_flips_after_write() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path().join("cache"));
        assert!(!cache.exists(&date_key()));
        cache.write(&date_key(), GAMES).unwrap();
        assert!(cache.exists(&date_key()));
    }

    #[test]
    fn write_then_read_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path());
        let blob: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let key = CacheKey::TeamStats { game_id: 9 };
        cache.write(&key, &blob).unwrap();
        assert_eq!(cache.read(&key).unwrap(), Some(blob));

        cache.write(&key, b"second").unwrap();
        assert_eq!(cache.read(&key).unwrap().as_deref(), Some(&b"second"[..]));
    }

    #[test]
    fn keys_differing_only_in_punctuation_do_not_share_an_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path());
        let dotted = CacheKey::GameCollection { date: "2022.10.19".into() };
        let underscored = CacheKey::GameCollection { date: "2022_10_19".into() };
        let slashed = CacheKey::GameCollection { date: "2022/10/19".into() };

        cache.write(&dotted, b"dotted").unwrap();
        assert!(!cache.exists(&underscored));
        assert!(!cache.exists(&slashed));

        cache.write(&slashed, b"slashed").unwrap();
        assert_eq!(cache.read(&dotted).unwrap().as_deref(), Some(&b"dotted"[..]));
        assert_eq!(cache.read(&slashed).unwrap().as_deref(), Some(&b"slashed"[..]));
        assert!(dir.path().join("2022%2E10%2E19-gameCollection.json").exists());
    }

    #[test]
    fn absent_key_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path());
        assert!(cache.read(&date_key()).unwrap().is_none());
    }

    #[test]
    fn unreadable_entry_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path());
        // A directory where the blob should be: present, but not readable as a file.
        fs::create_dir_all(dir.path().join("2022-10-19-gameCollection.json")).unwrap();
        assert!(cache.exists(&date_key()));
        assert!(matches!(cache.read(&date_key()), Err(CacheError::Read { .. })));
    }

    #[tokio::test]
    async fn cache_hit_skips_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path());
        cache.write(&date_key(), GAMES).unwrap();

        let calls = AtomicUsize::new(0);
        let games = load_cached(
            &cache,
            &date_key(),
            CachePolicy::PreferCache,
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Vec::new())
            },
            decode_games,
        )
        .await
        .unwrap();

        assert_eq!(games.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn forced_reload_fetches_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path());
        cache.write(&date_key(), br#"{"data": []}"#).unwrap();

        let games = load_cached(
            &cache,
            &date_key(),
            CachePolicy::ForceReload,
            || async { Ok(GAMES.to_vec()) },
            decode_games,
        )
        .await
        .unwrap();

        assert_eq!(games.len(), 1);
        assert_eq!(cache.read(&date_key()).unwrap().as_deref(), Some(GAMES));
    }

    #[tokio::test]
    async fn undecodable_payload_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path());

        let result = load_cached(
            &cache,
            &date_key(),
            CachePolicy::PreferCache,
            || async { Ok(b"not json".to_vec()) },
            decode_games,
        )
        .await;

        assert!(matches!(result, Err(LoadError::Decode(_))));
        assert!(!cache.exists(&date_key()));
    }

    #[tokio::test]
    async fn api_failure_leaves_cache_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path());
        cache.write(&date_key(), GAMES).unwrap();

        let result = load_cached(
            &cache,
            &date_key(),
            CachePolicy::ForceReload,
            || async { Err(ApiError::from_status(503)) },
            decode_games,
        )
        .await;

        assert!(matches!(result, Err(LoadError::Api(ApiError::Api { code: 503, .. }))));
        assert_eq!(cache.read(&date_key()).unwrap().as_deref(), Some(GAMES));
    }

    #[tokio::test]
    async fn stale_undecodable_entry_is_refetched() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path());
        cache.write(&date_key(), b"garbage").unwrap();

        let games = load_cached(
            &cache,
            &date_key(),
            CachePolicy::PreferCache,
            || async { Ok(GAMES.to_vec()) },
            decode_games,
        )
        .await
        .unwrap();

        assert_eq!(games.len(), 1);
        assert_eq!(cache.read(&date_key()).unwrap().as_deref(), Some(GAMES));
    }
}
