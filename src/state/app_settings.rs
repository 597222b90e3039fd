use chrono::{Datelike, Local, NaiveDate};
use log::LevelFilter;
use nba_api::client::DEFAULT_BASE_URL;
use std::path::PathBuf;
use std::time::Duration;

const APP_DIR: &str = "hoopstats";

/// Startup configuration, built once and handed to every component.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub api_url: String,
    pub cache_dir: PathBuf,
    pub data_dir: PathBuf,
    pub season: u16,
    pub per_page: u32,
    pub timeout: Duration,
    pub log_level: LevelFilter,
    /// Bypass cache reads for this run (fresh payloads are still written back).
    pub force_reload: bool,
}

impl AppSettings {
    /// Defaults overridden by `HOOPSTATS_*` environment variables.
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), Local::now().date_naive())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>, today: NaiveDate) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let cache_dir = var("HOOPSTATS_CACHE_DIR")
            .map(PathBuf::from)
            .or_else(|| xdg_dir(&var, "XDG_CACHE_HOME", ".cache"))
            .unwrap_or_else(|| PathBuf::from(".hoopstats-cache"));
        let data_dir = var("HOOPSTATS_DATA_DIR")
            .map(PathBuf::from)
            .or_else(|| xdg_dir(&var, "XDG_DATA_HOME", ".local/share"))
            .unwrap_or_else(|| PathBuf::from(".hoopstats-data"));

        Self {
            api_url: var("HOOPSTATS_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            cache_dir,
            data_dir,
            season: var("HOOPSTATS_SEASON")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or_else(|| current_season(today)),
            per_page: var("HOOPSTATS_PER_PAGE")
                .and_then(|s| s.trim().parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(100),
            timeout: Duration::from_secs(
                var("HOOPSTATS_TIMEOUT_SECS")
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(10),
            ),
            log_level: var("HOOPSTATS_LOG")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(LevelFilter::Warn),
            force_reload: false,
        }
    }
}

fn xdg_dir(
    var: &impl Fn(&str) -> Option<String>,
    xdg_key: &str,
    home_fallback: &str,
) -> Option<PathBuf> {
    if let Some(base) = var(xdg_key) {
        return Some(PathBuf::from(base).join(APP_DIR));
    }
    let home = var("HOME")?;
    Some(PathBuf::from(home).join(home_fallback).join(APP_DIR))
}

/// NBA seasons are named by the year they start. From October onwards the
/// new season is current.
pub fn current_season(today: NaiveDate) -> u16 {
    let year = if today.month() >= 10 { today.year() } else { today.year() - 1 };
    u16::try_from(year).unwrap_or_default()
}
