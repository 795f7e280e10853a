//! Arena snapshots
//!
//! Writes the final state of a duel (every combatant's pools, block gate,
//! and active effects) to JSON files so runs can be inspected or compared.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skirmish_combat::CombatantState;

use crate::duel::DuelReport;

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Top-level snapshot structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaSnapshot {
    /// Snapshot format version (for future migration)
    pub version: u32,
    /// Name the snapshot was saved under
    pub label: String,
    /// When the snapshot was taken
    pub created_at: DateTime<Utc>,
    /// Simulated seconds at the time of the snapshot
    pub sim_time: f32,
    #[serde(default)]
    pub winner: Option<String>,
    /// Dispatched events by name
    #[serde(default)]
    pub event_counts: BTreeMap<String, usize>,
    pub combatants: Vec<CombatantState>,
}

impl ArenaSnapshot {
    /// Snapshot the end of a duel
    pub fn from_report(label: impl Into<String>, report: &DuelReport) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            label: label.into(),
            created_at: Utc::now(),
            sim_time: report.duration,
            winner: report.winner.clone(),
            event_counts: report.event_counts.clone(),
            combatants: report.combatants.clone(),
        }
    }
}

/// Summary info for a snapshot file
#[derive(Debug, Clone)]
pub struct SnapshotInfo {
    /// Filename (without extension)
    pub filename: String,
    pub label: String,
    pub created_at: DateTime<Utc>,
    pub winner: Option<String>,
}

/// Get the snapshot directory path, creating it if it doesn't exist
fn snapshot_dir() -> Result<PathBuf> {
    let dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("skirmish")
        .join("snapshots");
    fs::create_dir_all(&dir).context("Failed to create snapshot directory")?;
    Ok(dir)
}

/// Sanitize a label into a valid filename
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect::<String>()
        .to_lowercase()
}

/// Save a snapshot under its label. Returns the written path.
pub fn save_snapshot(snapshot: &ArenaSnapshot) -> Result<PathBuf> {
    let path = snapshot_dir()?.join(format!("{}.json", sanitize_filename(&snapshot.label)));
    write_snapshot(&path, snapshot)?;
    Ok(path)
}

/// List saved snapshots, newest first
pub fn list_snapshots() -> Result<Vec<SnapshotInfo>> {
    let dir = snapshot_dir()?;
    let mut snapshots = Vec::new();

    for entry in fs::read_dir(&dir).context("Failed to read snapshot directory")? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }

        let filename = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();

        if let Ok(snapshot) = read_snapshot(&path) {
            snapshots.push(SnapshotInfo {
                filename,
                label: snapshot.label,
                created_at: snapshot.created_at,
                winner: snapshot.winner,
            });
        }
    }

    snapshots.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(snapshots)
}

pub fn write_snapshot(path: &Path, snapshot: &ArenaSnapshot) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot).context("Failed to serialize snapshot")?;
    fs::write(path, json).context("Failed to write snapshot file")?;
    Ok(())
}

pub fn read_snapshot(path: &Path) -> Result<ArenaSnapshot> {
    let json = fs::read_to_string(path).context("Failed to read snapshot file")?;
    let snapshot = serde_json::from_str(&json).context("Failed to deserialize snapshot")?;
    Ok(snapshot)
}

/// Format simulated time as "Xm Ys" or "Y.YYs"
pub fn format_sim_time(seconds: f32) -> String {
    if seconds >= 60.0 {
        let total = seconds as u64;
        format!("{}m {}s", total / 60, total % 60)
    } else {
        format!("{:.2}s", seconds.max(0.0))
    }
}
