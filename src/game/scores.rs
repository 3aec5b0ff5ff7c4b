use crate::game::window::TieBreak;
use log::{info, warn};
use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

// --- Score Entries ---

/// A ranked leaderboard record. Snapshot entries get their rank once, at
/// install time; the live player's entry carries whatever rank it currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEntry {
    pub identity: String,
    pub total_score: u64,
    pub rank: Option<u32>,
}

impl ScoreEntry {
    pub fn new(identity: impl Into<String>, total_score: u64) -> Self {
        Self {
            identity: identity.into(),
            total_score,
            rank: None,
        }
    }
}

/// Where a snapshot came from, as far as rank extrapolation is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// The source is exhaustive or capped (an online top-N board).
    #[default]
    Bounded,
    /// Local or otherwise open-ended scores.
    Unbounded,
}

impl Scope {
    #[inline(always)]
    pub const fn is_bounded(&self) -> bool {
        matches!(self, Self::Bounded)
    }
}

// --- Snapshot ---

/// Immutable, densely ranked list of scores (rank 1 = highest).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    entries: Vec<ScoreEntry>,
    scope: Scope,
}

impl Snapshot {
    /// Sorts by total score, highest first. Equal scores keep their input order.
    pub fn install(mut entries: Vec<ScoreEntry>, scope: Scope) -> Self {
        entries.sort_by(|a, b| b.total_score.cmp(&a.total_score));
        for (i, entry) in entries.iter_mut().enumerate() {
            entry.rank = Some(i as u32 + 1);
        }
        Self { entries, scope }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub const fn scope(&self) -> Scope {
        self.scope
    }

    /// 1-based lookup.
    #[inline(always)]
    pub fn get(&self, rank: u32) -> Option<&ScoreEntry> {
        (rank as usize)
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
    }

    /// Whether there is anything worth showing next to a live player.
    pub fn has_scores(&self) -> bool {
        self.entries.len() > 1
    }

    /// Small or open-ended boards may present a trailing player as a new position.
    pub fn allows_new_position(&self, large_threshold: usize) -> bool {
        !self.scope.is_bounded() || self.entries.len() < large_threshold
    }

    /// The 1-based slot a live score takes, `len() + 1` when it trails everyone.
    pub fn slot_for(&self, score: u64, tie_break: TieBreak) -> u32 {
        let above = self
            .entries
            .partition_point(|e| !tie_break.live_outranks(score, e.total_score));
        above as u32 + 1
    }
}

// --- Providers ---

pub struct SnapshotSource {
    pub entries: Vec<ScoreEntry>,
    pub scope: Scope,
}

/// Supplies leaderboard scores on demand (network, disk, or memory).
pub trait SnapshotProvider {
    fn fetch(&self) -> Result<SnapshotSource, Box<dyn Error + Send + Sync>>;
}

/// Fixed scores held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticSnapshotProvider {
    pub entries: Vec<ScoreEntry>,
    pub scope: Scope,
}

impl StaticSnapshotProvider {
    pub fn new(entries: Vec<ScoreEntry>, scope: Scope) -> Self {
        Self { entries, scope }
    }
}

impl SnapshotProvider for StaticSnapshotProvider {
    fn fetch(&self) -> Result<SnapshotSource, Box<dyn Error + Send + Sync>> {
        Ok(SnapshotSource {
            entries: self.entries.clone(),
            scope: self.scope,
        })
    }
}

#[derive(Deserialize, Debug)]
struct LeaderboardFile {
    #[serde(default)]
    scope: Scope,
    #[serde(default)]
    leaderboard: Vec<LeaderboardScore>,
}

#[derive(Deserialize, Debug)]
struct LeaderboardScore {
    name: String,
    score: u64,
}

/// Reads a saved leaderboard document:
/// `{"scope": "bounded", "leaderboard": [{"name": "...", "score": 1234567}]}`.
#[derive(Debug, Clone)]
pub struct JsonFileSnapshotProvider {
    path: PathBuf,
}

impl JsonFileSnapshotProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

pub fn parse_leaderboard_json(text: &str) -> Result<SnapshotSource, Box<dyn Error + Send + Sync>> {
    let file: LeaderboardFile = serde_json::from_str(text)?;
    let mut entries = Vec::with_capacity(file.leaderboard.len());
    for score in file.leaderboard {
        if score.name.trim().is_empty() {
            warn!("Skipping leaderboard score {} with an empty name", score.score);
            continue;
        }
        entries.push(ScoreEntry::new(score.name, score.score));
    }
    Ok(SnapshotSource {
        entries,
        scope: file.scope,
    })
}

impl SnapshotProvider for JsonFileSnapshotProvider {
    fn fetch(&self) -> Result<SnapshotSource, Box<dyn Error + Send + Sync>> {
        let text = fs::read_to_string(&self.path)?;
        let source = parse_leaderboard_json(&text)?;
        info!(
            "Read {} leaderboard scores ({:?}) from {:?}",
            source.entries.len(),
            source.scope,
            self.path
        );
        Ok(source)
    }
}
