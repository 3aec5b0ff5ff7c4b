use scorewindow::config;
use scorewindow::game::leaderboard::ScoreWindowEngine;
use scorewindow::game::scores::{
    JsonFileSnapshotProvider, Scope, ScoreEntry, StaticSnapshotProvider,
};
use scorewindow::game::window::WindowState;

const PLAYER_NAME: &str = "You";
const SCORE_STEPS: u64 = 200;
const DEFAULT_FINAL_SCORE: u64 = 10_000_000;

fn sample_leaderboard() -> StaticSnapshotProvider {
    let entries = (2..14)
        .map(|i| ScoreEntry::new(format!("Player {i}"), 1_000_000 * i))
        .collect();
    StaticSnapshotProvider::new(entries, Scope::Bounded)
}

fn print_window(window: &WindowState) {
    for row in &window.visible {
        let position = row
            .position
            .map_or_else(|| "--".to_string(), |p| format!("#{p}"));
        let marker = if row.is_pivot { ">" } else { " " };
        println!(
            "{marker} {position:>6}  {:<24} {:>12}",
            row.entry.identity, row.entry.total_score
        );
    }
    if window.declare_new_position {
        println!("  (new position)");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install logger immediately, then set runtime max level from config after loading it.
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .try_init();
    // Startup default when config is missing or malformed.
    log::set_max_level(log::LevelFilter::Warn);

    config::load();
    let cfg = config::get();
    log::set_max_level(cfg.log_level.as_level_filter());

    let mut args = std::env::args().skip(1);
    let snapshot_path = args.next();
    let final_score = match args.next() {
        Some(v) => v.trim().parse::<u64>()?,
        None => DEFAULT_FINAL_SCORE,
    };

    let mut engine = ScoreWindowEngine::new(cfg.window());
    engine.set_pivot(PLAYER_NAME);
    match snapshot_path {
        Some(path) => engine.install_from(&JsonFileSnapshotProvider::new(path))?,
        None => engine.install_from(&sample_leaderboard())?,
    }
    if !engine.has_scores() {
        log::warn!("Leaderboard has fewer than two scores; nothing to race against.");
    }

    print_window(&engine.current_window());

    for step in 0..=SCORE_STEPS {
        let score = (u128::from(final_score) * u128::from(step) / u128::from(SCORE_STEPS)) as u64;
        let report = engine.on_pivot_score_changed(score)?;
        if report.rank != report.previous_rank {
            log::info!(
                "{PLAYER_NAME} at {score}: rank {:?} -> {:?}{}",
                report.previous_rank,
                report.rank,
                if report.cascaded { " (cascaded)" } else { "" }
            );
        }
    }

    println!();
    print_window(&engine.current_window());
    Ok(())
}
