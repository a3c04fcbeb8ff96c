//! Shared test utilities for the draft engine.
//!
//! This module provides common helper functions for setting up test databases
//! and drafts with sensible defaults.

use crate::{
    config::draft::DraftSettings,
    core::{
        SeasonId, TeamId,
        engine::DraftEngine,
        ledger,
        pool::{self, NewPoolEntry},
        sequencer::DraftStyle,
        session::{self, SessionParams},
    },
    entities::draft_session,
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::{
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

/// Season used by tests unless they need a second one.
pub const SEASON: SeasonId = 1;

/// Installs a test-friendly tracing subscriber once per process.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a file-backed `SQLite` database in the temp dir with all tables initialized.
///
/// Unlike `sqlite::memory:` the pool holds several connections, so concurrent
/// requests really overlap. Pair with [`remove_file_db`].
pub async fn setup_file_db(name: &str) -> Result<(DatabaseConnection, PathBuf)> {
    init_test_tracing();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let path = std::env::temp_dir().join(format!(
        "draft-engine-{name}-{}-{nanos}.sqlite",
        std::process::id()
    ));
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let db = sea_orm::Database::connect(&url).await?;
    crate::config::database::create_tables(&db).await?;
    Ok((db, path))
}

/// Closes a database from [`setup_file_db`] and deletes its files.
pub async fn remove_file_db(db: DatabaseConnection, path: &Path) -> Result<()> {
    db.close().await?;
    for suffix in ["", "-wal", "-shm", "-journal"] {
        let mut file = path.as_os_str().to_owned();
        file.push(suffix);
        let _ = std::fs::remove_file(file);
    }
    Ok(())
}

/// Creates an engine with default settings over a fresh in-memory database.
pub async fn test_engine() -> Result<DraftEngine> {
    let db = setup_test_db().await?;
    Ok(DraftEngine::new(db, DraftSettings::default()))
}

/// Builds pool entries from `(name, cost)` pairs.
pub fn pool_entries(entries: &[(&str, i32)]) -> Vec<NewPoolEntry> {
    entries
        .iter()
        .map(|(entity, cost)| NewPoolEntry {
            entity: (*entity).to_string(),
            cost: *cost,
        })
        .collect()
}

/// Snake-draft session parameters with a 45 second clock.
pub const fn test_params(total_rounds: i32) -> SessionParams {
    SessionParams {
        style: DraftStyle::Snake,
        total_rounds,
        pick_time_limit_secs: 45,
        auto_draft_enabled: false,
    }
}

/// Creates a snake session in [`SEASON`] with `teams` in the given (unshuffled) order.
pub async fn create_test_session(
    db: &DatabaseConnection,
    teams: &[TeamId],
    total_rounds: i32,
) -> Result<draft_session::Model> {
    session::create_session(db, SEASON, teams.to_vec(), test_params(total_rounds)).await
}

/// Sets up a complete draft in [`SEASON`] on a fresh in-memory database.
/// See [`seed_draft`] for the arguments.
pub async fn setup_draft(
    teams: &[TeamId],
    total_rounds: i32,
    pool: &[(&str, i32)],
    cap: i32,
) -> Result<(DatabaseConnection, draft_session::Model)> {
    let db = setup_test_db().await?;
    let session = seed_draft(&db, teams, total_rounds, pool, cap).await?;
    Ok((db, session))
}

/// Seeds a draft in [`SEASON`]: pool, a budget of `cap` per team, and an
/// active session in the given turn order.
///
/// # Arguments
/// * `teams` - Turn order, used as-is
/// * `total_rounds` - Rounds in the session
/// * `pool` - `(name, cost)` pairs to seed
/// * `cap` - Budget cap for every team
pub async fn seed_draft(
    db: &DatabaseConnection,
    teams: &[TeamId],
    total_rounds: i32,
    pool: &[(&str, i32)],
    cap: i32,
) -> Result<draft_session::Model> {
    pool::seed_pool(db, SEASON, &pool_entries(pool)).await?;
    for &team in teams {
        ledger::open_budget(db, team, SEASON, cap).await?;
    }
    create_test_session(db, teams, total_rounds).await
}
