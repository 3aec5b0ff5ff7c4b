use crate::game::scores::ScoreEntry;
use std::str::FromStr;

pub const DEFAULT_EDGE_COUNT: usize = 3;
pub const MAX_EDGE_COUNT: usize = 32;
pub const DEFAULT_LARGE_SNAPSHOT_THRESHOLD: usize = 50;

/// How a live score that equals a snapshot score is ordered against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// The snapshot entry keeps its place; the live player sits below it.
    #[default]
    SnapshotFirst,
    /// The live player moves above equal snapshot scores.
    LiveFirst,
}

impl TieBreak {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SnapshotFirst => "SnapshotFirst",
            Self::LiveFirst => "LiveFirst",
        }
    }

    /// Whether a live score ranks above a snapshot score.
    #[inline(always)]
    pub const fn live_outranks(&self, live: u64, snapshot: u64) -> bool {
        match self {
            Self::SnapshotFirst => live > snapshot,
            Self::LiveFirst => live >= snapshot,
        }
    }
}

impl FromStr for TieBreak {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "snapshotfirst" | "snapshot" => Ok(Self::SnapshotFirst),
            "livefirst" | "live" => Ok(Self::LiveFirst),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    pub edge_count: usize,
    pub large_snapshot_threshold: usize,
    pub tie_break: TieBreak,
    pub withhold_unconfirmed_rank: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            edge_count: DEFAULT_EDGE_COUNT,
            large_snapshot_threshold: DEFAULT_LARGE_SNAPSHOT_THRESHOLD,
            tie_break: TieBreak::SnapshotFirst,
            withhold_unconfirmed_rank: false,
        }
    }
}

impl WindowConfig {
    pub fn with_edge_count(mut self, edge_count: usize) -> Self {
        self.edge_count = edge_count.clamp(1, MAX_EDGE_COUNT);
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn with_withhold_unconfirmed_rank(mut self, withhold: bool) -> Self {
        self.withhold_unconfirmed_rank = withhold;
        self
    }

    /// Edge count in `1..=MAX_EDGE_COUNT`, whatever the field holds.
    #[inline(always)]
    pub const fn edge(&self) -> usize {
        if self.edge_count == 0 {
            1
        } else if self.edge_count > MAX_EDGE_COUNT {
            MAX_EDGE_COUNT
        } else {
            self.edge_count
        }
    }

    /// Rows shown at once: `edge` above, `edge` below, plus the live player.
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        self.edge() * 2 + 1
    }
}

/// One displayed leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRow {
    /// Snapshot entries keep their snapshot rank here; the pivot carries its live rank.
    pub entry: ScoreEntry,
    /// Position shown next to the row. Entries ranked at or below the live
    /// player are pushed down by one.
    pub position: Option<u32>,
    pub is_pivot: bool,
}

/// Read-only copy of what the board currently shows, top to bottom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowState {
    pub visible: Vec<WindowRow>,
    pub pivot_rank: Option<u32>,
    pub declare_new_position: bool,
}

impl WindowState {
    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn pivot(&self) -> Option<&WindowRow> {
        self.visible.iter().find(|row| row.is_pivot)
    }

    /// First visible row with this identity. The live row wins over a
    /// snapshot row sharing its identity.
    pub fn row(&self, identity: &str) -> Option<&WindowRow> {
        self.visible
            .iter()
            .filter(|row| row.entry.identity == identity)
            .max_by_key(|row| row.is_pivot)
    }

    pub fn position_of(&self, identity: &str) -> Option<u32> {
        self.row(identity).and_then(|row| row.position)
    }

    pub fn has_position(&self, position: u32) -> bool {
        self.visible.iter().any(|row| row.position == Some(position))
    }

    /// Snapshot ranks currently on screen, top to bottom.
    pub fn snapshot_ranks(&self) -> Vec<u32> {
        self.visible
            .iter()
            .filter(|row| !row.is_pivot)
            .filter_map(|row| row.entry.rank)
            .collect()
    }

    /// Displayed positions, top to bottom.
    pub fn positions(&self) -> Vec<Option<u32>> {
        self.visible.iter().map(|row| row.position).collect()
    }
}
