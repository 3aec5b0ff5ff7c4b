//! Property-based invariant tests for the leaderboard window.
//!
//! After every live score update, for any board and any sequence of scores:
//!
//! 1. The window never shows more than `2 * edge + 1` rows.
//! 2. Displayed positions are strictly increasing, top to bottom.
//! 3. The live rank is one more than the number of entries that hold their
//!    place against the live score, unless a trailing rank is withheld on a
//!    large bounded board.
//! 4. Boards of at least `2 * edge` entries show exactly the live player's
//!    neighbourhood, clamped to the ends of the board, and declare a new
//!    position only for a trailing rank that is shown.
//! 5. Smaller boards show every entry and keep the new-position flag they
//!    were installed with.
//! 6. Feeding the same score twice changes nothing.
//! 7. Replacing the live player collapses the board; later updates obey 1-5.

use proptest::prelude::*;
use scorewindow::{Scope, ScoreEntry, ScoreWindowEngine, TieBreak, WindowConfig};

const LARGE_THRESHOLD: usize = 50;

// ── Helpers ─────────────────────────────────────────────────────────────

fn board(max_len: usize) -> impl Strategy<Value = Vec<u64>> {
    proptest::collection::vec(0u64..=1000, 0..=max_len)
}

/// Live scores, with extra weight on 0 so trailing ranks show up on large boards.
fn updates() -> impl Strategy<Value = Vec<u64>> {
    proptest::collection::vec(prop_oneof![4 => 0u64..=1100, 1 => Just(0u64)], 1..=30)
}

#[derive(Debug, Clone, Copy)]
struct Case {
    edge: usize,
    tie_break: TieBreak,
    scope: Scope,
    withhold: bool,
}

impl Case {
    fn new(edge: usize, live_first: bool, bounded: bool, withhold: bool) -> Self {
        Self {
            edge,
            tie_break: if live_first {
                TieBreak::LiveFirst
            } else {
                TieBreak::SnapshotFirst
            },
            scope: if bounded {
                Scope::Bounded
            } else {
                Scope::Unbounded
            },
            withhold,
        }
    }

    fn capacity(&self) -> u32 {
        2 * self.edge as u32 + 1
    }

    /// New-position flag a freshly installed board starts with.
    fn initial_declare(&self, n: usize) -> bool {
        !self.scope.is_bounded() || n < LARGE_THRESHOLD
    }
}

fn engine_for(scores: &[u64], case: Case) -> ScoreWindowEngine {
    let config = WindowConfig::default()
        .with_edge_count(case.edge)
        .with_tie_break(case.tie_break)
        .with_withhold_unconfirmed_rank(case.withhold);
    let mut engine = ScoreWindowEngine::new(config);
    engine.set_pivot("You");
    let entries = scores
        .iter()
        .enumerate()
        .map(|(i, &score)| ScoreEntry::new(format!("p{i}"), score))
        .collect();
    engine.install_snapshot(entries, case.scope);
    engine
}

fn expected_slot(scores: &[u64], live: u64, tie_break: TieBreak) -> u32 {
    let holding = scores
        .iter()
        .filter(|&&s| !tie_break.live_outranks(live, s))
        .count();
    holding as u32 + 1
}

fn check_window(
    engine: &ScoreWindowEngine,
    scores: &[u64],
    live: u64,
    case: Case,
) -> Result<(), TestCaseError> {
    let n = scores.len() as u32;
    let edge = case.edge as u32;
    let capacity = case.capacity();
    let window = engine.current_window();

    prop_assert!(
        window.len() <= capacity as usize,
        "{} rows for capacity {}",
        window.len(),
        capacity
    );

    let slot = expected_slot(scores, live, case.tie_break);
    let trailing = slot == n + 1;
    let withheld = trailing && case.withhold && !case.initial_declare(scores.len());
    let rank = if withheld { None } else { Some(slot) };
    prop_assert_eq!(window.pivot_rank, rank);

    let positions: Vec<u32> = window.positions().into_iter().flatten().collect();
    prop_assert_eq!(
        positions.len(),
        window.len() - usize::from(withheld),
        "only a withheld pivot lacks a position"
    );
    prop_assert!(
        positions.windows(2).all(|w| w[0] < w[1]),
        "positions not increasing: {:?}",
        positions
    );

    if n >= 2 * edge {
        prop_assert_eq!(window.declare_new_position, trailing && !withheld);
        let lo = slot.saturating_sub(edge).max(1).min(n + 2 - capacity);
        let ranks: Vec<u32> = (lo..=lo + capacity - 2).collect();
        prop_assert_eq!(window.snapshot_ranks(), ranks, "slot {} of {}", slot, n);
        let last_shown = if withheld { lo + capacity - 2 } else { lo + capacity - 1 };
        let shown: Vec<u32> = (lo..=last_shown).collect();
        prop_assert_eq!(positions, shown);
    } else {
        prop_assert_eq!(
            window.declare_new_position,
            case.initial_declare(scores.len())
        );
        let ranks: Vec<u32> = (1..=n).collect();
        prop_assert_eq!(window.snapshot_ranks(), ranks);
    }
    Ok(())
}

// ═════════════════════════════════════════════════════════════════════════
// 1-5. Window shape after every update
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn window_tracks_the_live_player(
        scores in board(80),
        live_scores in updates(),
        edge in 1usize..=4,
        live_first in any::<bool>(),
        bounded in any::<bool>(),
        withhold in any::<bool>(),
    ) {
        let case = Case::new(edge, live_first, bounded, withhold);
        let mut engine = engine_for(&scores, case);

        for &live in &live_scores {
            engine.on_pivot_score_changed(live).expect("score update");
            check_window(&engine, &scores, live, case)?;
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Repeated scores are idempotent
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn repeated_score_is_a_no_op(
        scores in board(60),
        live_scores in updates(),
        edge in 1usize..=4,
        withhold in any::<bool>(),
    ) {
        let case = Case::new(edge, false, true, withhold);
        let mut engine = engine_for(&scores, case);
        for &live in &live_scores {
            engine.on_pivot_score_changed(live).expect("score update");
            let before = engine.current_window();
            let report = engine.on_pivot_score_changed(live).expect("score update");
            prop_assert_eq!(engine.current_window(), before);
            prop_assert_eq!(report.previous_rank, report.rank);
            prop_assert!(!report.cascaded);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Replacing the live player mid-sequence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn replacing_the_player_starts_over(
        scores in board(80),
        first in updates(),
        second in updates(),
        edge in 1usize..=4,
        bounded in any::<bool>(),
        withhold in any::<bool>(),
    ) {
        let case = Case::new(edge, false, bounded, withhold);
        let mut engine = engine_for(&scores, case);
        for &live in &first {
            engine.on_pivot_score_changed(live).expect("score update");
        }

        engine.set_pivot("Someone Else");
        let window = engine.current_window();
        let n = scores.len() as u32;
        let collapsed: Vec<u32> = if n < case.capacity() {
            (1..=n).collect()
        } else {
            (1..=edge as u32).chain(n - edge as u32 + 1..=n).collect()
        };
        prop_assert_eq!(window.pivot_rank, None);
        prop_assert_eq!(window.declare_new_position, case.initial_declare(scores.len()));
        prop_assert_eq!(window.snapshot_ranks(), collapsed);
        prop_assert_eq!(
            window.pivot().map(|row| row.entry.identity.as_str()),
            Some("Someone Else")
        );

        for &live in &second {
            engine.on_pivot_score_changed(live).expect("score update");
            check_window(&engine, &scores, live, case)?;
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 8. Reinstalling a board keeps a scored player placed
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn reinstall_keeps_the_live_rank(
        scores in board(80),
        replacement in board(80),
        live in 0u64..=1100,
        edge in 1usize..=4,
        bounded in any::<bool>(),
    ) {
        let case = Case::new(edge, false, bounded, false);
        let mut engine = engine_for(&scores, case);
        engine.on_pivot_score_changed(live).expect("score update");

        let entries = replacement
            .iter()
            .enumerate()
            .map(|(i, &score)| ScoreEntry::new(format!("r{i}"), score))
            .collect();
        engine.install_snapshot(entries, case.scope);
        prop_assert_eq!(
            engine.pivot_rank(),
            Some(expected_slot(&replacement, live, TieBreak::SnapshotFirst))
        );
        prop_assert_eq!(
            engine.declare_new_position(),
            case.initial_declare(replacement.len())
        );
        prop_assert!(engine.current_window().len() <= 2 * edge + 1);
    }
}
