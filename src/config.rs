use crate::game::window::{MAX_EDGE_COUNT, TieBreak, WindowConfig};
use ini::Ini;
use log::{info, warn};
use std::str::FromStr;
use std::sync::Mutex;

const CONFIG_PATH: &str = "scorewindow.ini";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warn => "Warn",
            Self::Info => "Info",
            Self::Debug => "Debug",
            Self::Trace => "Trace",
        }
    }

    pub const fn as_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub log_level: LogLevel,
    /// Rows kept above and below the live player once the window is settled.
    pub edge_count: usize,
    /// Bounded snapshots at least this large do not declare a new position up front.
    pub large_snapshot_threshold: usize,
    pub tie_break: TieBreak,
    /// Report no rank (instead of N+1) for a trailing player on a large bounded board.
    pub withhold_unconfirmed_rank: bool,
}

impl Default for Config {
    fn default() -> Self {
        let window = WindowConfig::default();
        Self {
            log_level: LogLevel::Warn,
            edge_count: window.edge_count,
            large_snapshot_threshold: window.large_snapshot_threshold,
            tie_break: window.tie_break,
            withhold_unconfirmed_rank: window.withhold_unconfirmed_rank,
        }
    }
}

impl Config {
    pub const fn window(&self) -> WindowConfig {
        WindowConfig {
            edge_count: self.edge_count,
            large_snapshot_threshold: self.large_snapshot_threshold,
            tie_break: self.tie_break,
            withhold_unconfirmed_rank: self.withhold_unconfirmed_rank,
        }
    }

    /// Parses INI text, falling back to defaults for anything missing or malformed.
    pub fn from_ini_str(content: &str) -> Self {
        match Ini::load_from_str(content) {
            Ok(conf) => Self::from_ini(&conf),
            Err(e) => {
                warn!("Failed to parse config text: {e}. Using default values.");
                Self::default()
            }
        }
    }

    fn from_ini(conf: &Ini) -> Self {
        let default = Self::default();
        let get = |section: &str, key: &str| conf.get_from(Some(section), key).map(str::trim);

        Self {
            log_level: get("Options", "LogLevel")
                .and_then(|v| LogLevel::from_str(v).ok())
                .unwrap_or(default.log_level),
            edge_count: get("Leaderboard", "EdgeCount")
                .and_then(|v| v.parse::<usize>().ok())
                .map_or(default.edge_count, |v| v.clamp(1, MAX_EDGE_COUNT)),
            large_snapshot_threshold: get("Leaderboard", "LargeSnapshotThreshold")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(default.large_snapshot_threshold),
            tie_break: get("Leaderboard", "TieBreak")
                .and_then(|v| TieBreak::from_str(v).ok())
                .unwrap_or(default.tie_break),
            withhold_unconfirmed_rank: get("Leaderboard", "WithholdUnconfirmedRank")
                .and_then(parse_flag)
                .unwrap_or(default.withhold_unconfirmed_rank),
        }
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    if v.is_empty() {
        None
    } else if v.eq_ignore_ascii_case("true")
        || v.eq_ignore_ascii_case("yes")
        || v.eq_ignore_ascii_case("on")
    {
        Some(true)
    } else if v.eq_ignore_ascii_case("false")
        || v.eq_ignore_ascii_case("no")
        || v.eq_ignore_ascii_case("off")
    {
        Some(false)
    } else {
        v.parse::<u8>().ok().map(|n| n != 0)
    }
}

// Global, mutable configuration instance.
static CONFIG: std::sync::LazyLock<Mutex<Config>> =
    std::sync::LazyLock::new(|| Mutex::new(Config::default()));

pub fn load() {
    if !std::path::Path::new(CONFIG_PATH).exists() {
        info!("'{CONFIG_PATH}' not found, using default values.");
        return;
    }
    match Ini::load_from_file(CONFIG_PATH) {
        Ok(conf) => {
            let loaded = Config::from_ini(&conf);
            *CONFIG.lock().unwrap() = loaded;
            info!("Configuration loaded from '{CONFIG_PATH}'.");
        }
        Err(e) => {
            warn!("Failed to load '{CONFIG_PATH}': {e}. Using default values.");
        }
    }
}

pub fn get() -> Config {
    *CONFIG.lock().unwrap()
}
