pub mod config;
pub mod game;

pub use game::leaderboard::{LeaderboardError, ScoreWindowEngine, ScrollReport};
pub use game::scores::{Scope, ScoreEntry, Snapshot, SnapshotProvider, SnapshotSource};
pub use game::window::{TieBreak, WindowConfig, WindowRow, WindowState};
