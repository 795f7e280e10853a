//! Skirmish - headless combat simulation driver
//!
//! Loads settings, runs the configured duel, and writes a snapshot of the
//! final arena state.
//!
//! Usage: `skirmish [LABEL]`, `skirmish --write-settings`, `skirmish --list`

mod duel;
mod save;
mod settings;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::save::ArenaSnapshot;
use crate::settings::GameSettings;

fn main() -> Result<()> {
    // Initialize logging, RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")?;

    let arg = std::env::args().nth(1);
    match arg.as_deref() {
        Some("--write-settings") => GameSettings::default().save(),
        Some("--list") => list(),
        label => run(label.unwrap_or("latest")),
    }
}

fn run(label: &str) -> Result<()> {
    info!("Starting Skirmish...");
    let settings = GameSettings::load();

    let report = duel::run_duel(&settings).context("Duel failed")?;
    for combatant in &report.combatants {
        info!(
            "{}: {:.1}/{:.1} HP, shield {:.1}, armor {:.1}{}",
            combatant.name,
            combatant.health(),
            combatant.max_health(),
            combatant.shield().map_or(0.0, |pool| pool.current()),
            combatant.armor().map_or(0.0, |pool| pool.current()),
            if combatant.is_alive() { "" } else { " (dead)" }
        );
    }
    info!(
        "Finished in {} over {} steps",
        save::format_sim_time(report.duration),
        report.steps
    );

    let snapshot = ArenaSnapshot::from_report(label, &report);
    let path = save::save_snapshot(&snapshot)?;
    info!("Snapshot written to {:?}", path);
    Ok(())
}

fn list() -> Result<()> {
    let snapshots = save::list_snapshots()?;
    if snapshots.is_empty() {
        info!("No snapshots saved");
    }
    for snapshot in snapshots {
        info!(
            "{} ({}): {} at {}",
            snapshot.label,
            snapshot.filename,
            snapshot.winner.as_deref().unwrap_or("no winner"),
            snapshot.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}
