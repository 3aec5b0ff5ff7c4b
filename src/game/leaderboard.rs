//! In-game leaderboard window.
//!
//! Keeps a bounded, rank-accurate view of the live player inside a large
//! ranked snapshot. The first display is collapsed (top and bottom `edge`
//! rows). Once the live score moves, the window scrolls so that the player is
//! surrounded by its `edge` nearest neighbours on each side. Near either end
//! of the board the short side is made up from the other one, so the window
//! stays full.
//!
//! Ranks are 1-based. The live player occupies a *slot* in `1..=N+1`: the
//! snapshot entries ranked above the slot stay where they are, the ones at or
//! below it are shown one position lower.

use crate::game::scores::{Scope, ScoreEntry, Snapshot, SnapshotProvider};
use crate::game::window::{WindowConfig, WindowRow, WindowState};
use log::{debug, info, trace};
use std::collections::BTreeSet;

#[derive(Debug, thiserror::Error)]
pub enum LeaderboardError {
    #[error("no leaderboard snapshot is installed")]
    NoSnapshot,

    #[error("no live player is attached to the leaderboard")]
    NoPivot,

    #[error("failed to fetch leaderboard scores: {0}")]
    Provider(Box<dyn std::error::Error + Send + Sync>),
}

/// What a single score update did to the window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollReport {
    pub previous_rank: Option<u32>,
    pub rank: Option<u32>,
    /// Rows inserted by the upward pass (cascade included).
    pub pulled_above: usize,
    /// Rows inserted by the downward pass.
    pub pulled_below: usize,
    pub trimmed: usize,
    pub cascaded: bool,
    /// The board was too small to scroll; only the rank moved and the
    /// new-position flag was left alone.
    pub compact: bool,
}

#[derive(Debug, Clone)]
struct Pivot {
    identity: String,
    score: Option<u64>,
    /// Place among the snapshot entries, `1..=N+1`. `None` until first scored.
    slot: Option<u32>,
    rank: Option<u32>,
}

/// Snapshot ranks that belong on screen around `slot`: `lo..slot` above the
/// player and `slot..=hi` below. Only meaningful once `n + 1 >= capacity`.
#[inline(always)]
fn neighbourhood(config: WindowConfig, n: u32, slot: u32) -> (u32, u32) {
    let edge = config.edge() as u32;
    let capacity = config.capacity() as u32;
    let max_lo = (n + 2).saturating_sub(capacity).max(1);
    let lo = slot.saturating_sub(edge).max(1).min(max_lo);
    let hi = (lo + capacity - 2).min(n);
    (lo, hi)
}

#[derive(Debug, Clone)]
pub struct ScoreWindowEngine {
    config: WindowConfig,
    snapshot: Option<Snapshot>,
    /// Snapshot ranks currently on screen.
    rows: BTreeSet<u32>,
    pivot: Option<Pivot>,
    declare_new_position: bool,
}

impl Default for ScoreWindowEngine {
    fn default() -> Self {
        Self::new(WindowConfig::default())
    }
}

impl ScoreWindowEngine {
    pub fn new(config: WindowConfig) -> Self {
        Self {
            config,
            snapshot: None,
            rows: BTreeSet::new(),
            pivot: None,
            declare_new_position: false,
        }
    }

    pub const fn config(&self) -> WindowConfig {
        self.config
    }

    pub const fn capacity(&self) -> usize {
        self.config.capacity()
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Whether the installed board has anything to compare the player against.
    pub fn has_scores(&self) -> bool {
        self.snapshot.as_ref().is_some_and(Snapshot::has_scores)
    }

    pub fn pivot_rank(&self) -> Option<u32> {
        self.pivot.as_ref().and_then(|p| p.rank)
    }

    pub const fn declare_new_position(&self) -> bool {
        self.declare_new_position
    }

    /// Replaces the leaderboard. The previous window is discarded and the new
    /// board starts collapsed. A player that already has a live score is
    /// placed right away, but the new-position flag keeps the value the board
    /// starts with until the next score update.
    pub fn install_snapshot(&mut self, entries: Vec<ScoreEntry>, scope: Scope) {
        let snapshot = Snapshot::install(entries, scope);
        self.declare_new_position =
            snapshot.allows_new_position(self.config.large_snapshot_threshold);
        info!(
            "Installed leaderboard snapshot: {} scores, {:?} scope, new position {}",
            snapshot.len(),
            scope,
            if self.declare_new_position { "allowed" } else { "withheld" }
        );
        self.snapshot = Some(snapshot);
        self.collapse();

        if let Some(score) = self.pivot.as_ref().and_then(|p| p.score) {
            self.place_pivot(score);
            self.settle_rank();
        }
    }

    pub fn install_from<P>(&mut self, provider: &P) -> Result<(), LeaderboardError>
    where
        P: SnapshotProvider + ?Sized,
    {
        let source = provider.fetch().map_err(LeaderboardError::Provider)?;
        self.install_snapshot(source.entries, source.scope);
        Ok(())
    }

    /// Drops the board but keeps the live player attached.
    pub fn clear_snapshot(&mut self) {
        self.snapshot = None;
        self.rows.clear();
        self.declare_new_position = false;
        if let Some(pivot) = self.pivot.as_mut() {
            pivot.slot = None;
            pivot.rank = None;
        }
    }

    /// Attaches the live player. Any previous one is replaced and the board
    /// goes back to its collapsed view; the new player has no rank until its
    /// first score arrives.
    pub fn set_pivot(&mut self, identity: impl Into<String>) {
        let identity = identity.into();
        debug!("Live leaderboard player set to '{identity}'");
        self.pivot = Some(Pivot {
            identity,
            score: None,
            slot: None,
            rank: None,
        });
        if let Some(snapshot) = self.snapshot.as_ref() {
            self.declare_new_position =
                snapshot.allows_new_position(self.config.large_snapshot_threshold);
        }
        self.collapse();
    }

    /// Feeds a new live score and scrolls the window around it.
    ///
    /// Calls must not overlap; a caller that reacts to the window by changing
    /// the score again has to queue that change.
    pub fn on_pivot_score_changed(&mut self, score: u64) -> Result<ScrollReport, LeaderboardError> {
        if self.snapshot.is_none() {
            return Err(LeaderboardError::NoSnapshot);
        }
        let Some(pivot) = self.pivot.as_mut() else {
            return Err(LeaderboardError::NoPivot);
        };
        pivot.score = Some(score);
        let mut report = ScrollReport {
            previous_rank: pivot.rank,
            ..ScrollReport::default()
        };
        let unplaced = pivot.slot.is_none();

        if self.visible_len() < self.config.capacity() {
            report.compact = true;
            self.place_pivot(score);
        } else {
            if unplaced {
                self.place_pivot(score);
            }
            self.scroll_up(&mut report);
            self.scroll_down(&mut report);
        }
        let new_position = self.settle_rank();
        if !report.compact {
            self.declare_new_position = new_position;
        }

        report.rank = self.pivot_rank();
        if report.rank != report.previous_rank {
            debug!(
                "Live rank {:?} -> {:?} (score {score}, new position {})",
                report.previous_rank, report.rank, self.declare_new_position
            );
        }
        Ok(report)
    }

    pub fn current_window(&self) -> WindowState {
        let pivot_slot = self.pivot.as_ref().and_then(|p| p.slot);
        let mut pivot_row = self.pivot.as_ref().map(|p| WindowRow {
            entry: ScoreEntry {
                identity: p.identity.clone(),
                total_score: p.score.unwrap_or(0),
                rank: p.rank,
            },
            position: p.rank,
            is_pivot: true,
        });

        let mut visible = Vec::with_capacity(self.rows.len() + 1);
        if let Some(snapshot) = self.snapshot.as_ref() {
            for &rank in &self.rows {
                let Some(entry) = snapshot.get(rank) else {
                    continue;
                };
                let below_pivot = pivot_slot.is_some_and(|slot| rank >= slot);
                if below_pivot && let Some(row) = pivot_row.take() {
                    visible.push(row);
                }
                visible.push(WindowRow {
                    entry: entry.clone(),
                    position: Some(if below_pivot { rank + 1 } else { rank }),
                    is_pivot: false,
                });
            }
        }
        visible.extend(pivot_row);

        WindowState {
            visible,
            pivot_rank: self.pivot_rank(),
            declare_new_position: self.declare_new_position,
        }
    }

    #[inline(always)]
    fn visible_len(&self) -> usize {
        self.rows.len() + usize::from(self.pivot.is_some())
    }

    /// Rows available to snapshot entries once the live player takes its own.
    #[inline(always)]
    fn row_limit(&self) -> usize {
        self.config.capacity() - 1
    }

    /// First display: the whole board when it fits, otherwise the top and
    /// bottom `edge` entries.
    fn collapse(&mut self) {
        self.rows.clear();
        if let Some(pivot) = self.pivot.as_mut() {
            pivot.slot = None;
            pivot.rank = None;
        }
        let Some(n) = self.snapshot.as_ref().map(|s| s.len() as u32) else {
            return;
        };
        let edge = self.config.edge() as u32;
        let slots = (self.config.capacity() - usize::from(self.pivot.is_some())) as u32;
        if n <= slots {
            self.rows.extend(1..=n);
        } else {
            self.rows.extend(1..=edge);
            self.rows.extend(n - edge + 1..=n);
        }
        debug!("Collapsed leaderboard view: {} of {} rows", self.rows.len(), n);
    }

    fn place_pivot(&mut self, score: u64) {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return;
        };
        let Some(pivot) = self.pivot.as_mut() else {
            return;
        };
        pivot.score = Some(score);
        pivot.slot = Some(snapshot.slot_for(score, self.config.tie_break));
    }

    /// Moves the slot up past every entry the live score now beats, makes
    /// sure the rows above the player are on screen, then drops surplus rows
    /// from the bottom (never from inside the neighbourhood).
    fn scroll_up(&mut self, report: &mut ScrollReport) {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return;
        };
        let Some(pivot) = self.pivot.as_mut() else {
            return;
        };
        let (Some(score), Some(mut slot)) = (pivot.score, pivot.slot) else {
            return;
        };
        let tie_break = self.config.tie_break;

        while slot > 1
            && snapshot
                .get(slot - 1)
                .is_some_and(|above| tie_break.live_outranks(score, above.total_score))
        {
            slot -= 1;
        }
        pivot.slot = Some(slot);

        let (lo, hi) = neighbourhood(self.config, snapshot.len() as u32, slot);
        for rank in lo..slot {
            if self.rows.insert(rank) {
                report.pulled_above += 1;
            }
        }

        let limit = self.row_limit();
        while self.rows.len() > limit {
            match self.rows.last().copied() {
                Some(rank) if rank > hi => {
                    self.rows.remove(&rank);
                    report.trimmed += 1;
                }
                _ => break,
            }
        }
        trace!("scroll up: slot {slot}, rows {lo}..={hi}, {} on screen", self.rows.len());
    }

    /// Moves the slot down past every entry that still holds its place,
    /// pulling those entries in along with the rows below the player, then
    /// drops surplus rows from the top. If that ate into the rows above the
    /// player, or the window is still over capacity, the upward pass runs again.
    fn scroll_down(&mut self, report: &mut ScrollReport) {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return;
        };
        let Some(pivot) = self.pivot.as_mut() else {
            return;
        };
        let (Some(score), Some(mut slot)) = (pivot.score, pivot.slot) else {
            return;
        };
        let tie_break = self.config.tie_break;

        while let Some(entry) = snapshot.get(slot) {
            if tie_break.live_outranks(score, entry.total_score) {
                break;
            }
            if self.rows.insert(slot) {
                report.pulled_below += 1;
            }
            slot += 1;
        }
        pivot.slot = Some(slot);

        let (lo, hi) = neighbourhood(self.config, snapshot.len() as u32, slot);
        for rank in slot..=hi {
            if self.rows.insert(rank) {
                report.pulled_below += 1;
            }
        }

        let limit = self.row_limit();
        if self.rows.len() <= limit {
            trace!("scroll down: slot {slot}, rows {lo}..={hi}, nothing to trim");
            return;
        }
        while self.rows.len() > limit {
            match self.rows.first().copied() {
                Some(rank) if rank < slot => {
                    self.rows.remove(&rank);
                    report.trimmed += 1;
                }
                _ => break,
            }
        }

        let above_missing = (lo..slot).any(|rank| !self.rows.contains(&rank));
        if above_missing || self.rows.len() > limit {
            debug!("Leaderboard trim left slot {slot} short above; scrolling up again");
            report.cascaded = true;
            self.scroll_up(report);
        }
    }

    /// Turns the slot into the rank shown to the player. Returns whether that
    /// rank is a new position past the end of the board.
    fn settle_rank(&mut self) -> bool {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return false;
        };
        let Some(pivot) = self.pivot.as_mut() else {
            return false;
        };
        let Some(slot) = pivot.slot else {
            pivot.rank = None;
            return false;
        };
        let trailing = slot as usize > snapshot.len();
        let withheld = trailing
            && self.config.withhold_unconfirmed_rank
            && !snapshot.allows_new_position(self.config.large_snapshot_threshold);
        pivot.rank = if withheld { None } else { Some(slot) };
        trailing && !withheld
    }
}
