//! Database configuration module for the draft engine.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`; the uniqueness rules the entities cannot
//! express (composite keys and the one-open-session-per-season rule) are added
//! as indexes afterwards. Every statement is `IF NOT EXISTS`, so bootstrapping an
//! existing database is a no-op.

use crate::entities::{DraftBudget, DraftPool, DraftSession, RosterEntry};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::debug;

/// Default `SQLite` file, created on first connect.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/draft_engine.sqlite?mode=rwc";

/// Indexes enforcing the storage-level uniqueness rules.
const INDEXES: [&str; 4] = [
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_draft_pool_season_entity \
     ON draft_pool (season_id, entity_key)",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_draft_budgets_team_season \
     ON draft_budgets (team_id, season_id)",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_roster_entries_season_pool_entry \
     ON roster_entries (season_id, pool_entry_id)",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_draft_sessions_one_open_per_season \
     ON draft_sessions (season_id) WHERE status IN ('pending', 'active', 'paused')",
];

/// Gets the database URL from the `DATABASE_URL` environment variable or the default path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    if let Some(dir) = sqlite_parent_dir(&database_url) {
        std::fs::create_dir_all(dir)?;
    }
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Directory of a file-backed `SQLite` URL, if it has one.
fn sqlite_parent_dir(url: &str) -> Option<&str> {
    let path = url.strip_prefix("sqlite://")?;
    let path = path.split('?').next()?;
    let (dir, _file) = path.rsplit_once('/')?;
    (!dir.is_empty()).then_some(dir)
}

/// Creates all draft tables and their unique indexes.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    // Parents before roster_entries, which references sessions and pool entries.
    create_table(db, &schema, DraftSession).await?;
    create_table(db, &schema, DraftPool).await?;
    create_table(db, &schema, DraftBudget).await?;
    create_table(db, &schema, RosterEntry).await?;

    for index in INDEXES {
        db.execute_unprepared(index).await?;
    }

    debug!("draft tables ready");
    Ok(())
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        draft_budget::Model as DraftBudgetModel, draft_pool::Model as DraftPoolModel,
        draft_session::Model as DraftSessionModel, roster_entry::Model as RosterEntryModel,
    };
    use sea_orm::{ActiveModelTrait, QuerySelect, Set};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<DraftSessionModel> = DraftSession::find().limit(1).all(&db).await?;
        let _: Vec<DraftPoolModel> = DraftPool::find().limit(1).all(&db).await?;
        let _: Vec<DraftBudgetModel> = DraftBudget::find().limit(1).all(&db).await?;
        let _: Vec<RosterEntryModel> = RosterEntry::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_budget_unique_per_team_and_season() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        let budget = |season_id| crate::entities::draft_budget::ActiveModel {
            team_id: Set(1),
            season_id: Set(season_id),
            total_points: Set(120),
            spent_points: Set(0),
            ..Default::default()
        };
        budget(1).insert(&db).await?;
        budget(2).insert(&db).await?;

        let duplicate = budget(1).insert(&db).await;
        assert!(matches!(
            duplicate.as_ref().map_err(sea_orm::DbErr::sql_err),
            Err(Some(sea_orm::SqlErr::UniqueConstraintViolation(_)))
        ));

        Ok(())
    }

    #[test]
    fn test_sqlite_parent_dir() {
        assert_eq!(sqlite_parent_dir(DEFAULT_DATABASE_URL), Some("data"));
        assert_eq!(sqlite_parent_dir("sqlite://draft.sqlite"), None);
        assert_eq!(sqlite_parent_dir("sqlite::memory:"), None);
    }
}
