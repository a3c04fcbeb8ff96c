//! Draft pool business logic - Availability checks, reservation and seeding.
//!
//! Reservation is a single conditional UPDATE keyed on the entry's status, so two
//! callers racing for the same entity cannot both succeed regardless of any
//! session-level locking.

use crate::{
    core::{SeasonId, TeamId},
    entities::{DraftPool, draft_pool},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use tracing::{debug, info};

/// Availability of a pool entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolStatus {
    /// Can still be drafted
    Available,
    /// Already on a team's roster
    Drafted,
}

impl PoolStatus {
    /// Database representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Drafted => "drafted",
        }
    }
}

impl fmt::Display for PoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoolStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "available" => Ok(Self::Available),
            "drafted" => Ok(Self::Drafted),
            other => Err(Error::invariant(format!("unknown pool status \"{other}\""))),
        }
    }
}

/// One entity to add to a season's pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPoolEntry {
    /// Name of the entity
    pub entity: String,
    /// Price in budget points
    pub cost: i32,
}

/// Optional filters for listing available entities.
///
/// Pool entries carry only a name and a cost, so there is no filtering by
/// generation, type or other catalog attributes.
#[derive(Debug, Clone, Default)]
pub struct PoolFilter {
    /// Only entries costing at least this much
    pub min_cost: Option<i32>,
    /// Only entries costing at most this much
    pub max_cost: Option<i32>,
    /// Case-insensitive substring of the entity name
    pub search: Option<String>,
}

/// Finds the pool entry for `entity_key` in a season, drafted or not.
pub async fn get_entry<C>(
    db: &C,
    entity_key: &str,
    season_id: SeasonId,
) -> Result<Option<draft_pool::Model>>
where
    C: ConnectionTrait,
{
    DraftPool::find()
        .filter(draft_pool::Column::SeasonId.eq(season_id))
        .filter(draft_pool::Column::EntityKey.eq(entity_key))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns true if the entity exists in the season's pool and has not been drafted.
pub async fn is_available<C>(db: &C, entity_key: &str, season_id: SeasonId) -> Result<bool>
where
    C: ConnectionTrait,
{
    let entry = get_entry(db, entity_key, season_id).await?;
    Ok(entry.is_some_and(|e| e.status == PoolStatus::Available.as_str()))
}

/// Marks an entry as drafted by `team_id` at the given round and pick.
///
/// The status flip is one statement:
/// `UPDATE draft_pool SET status = 'drafted', ... WHERE ... AND status = 'available'`.
/// If no row matches, the entry is missing or already drafted and nothing is written.
///
/// # Errors
/// Returns `EntityNotAvailable` when the conditional update matches no row.
pub async fn reserve<C>(
    db: &C,
    entity_key: &str,
    season_id: SeasonId,
    team_id: TeamId,
    round: i32,
    pick_number: i32,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = DraftPool::update_many()
        .col_expr(
            draft_pool::Column::Status,
            Expr::value(PoolStatus::Drafted.as_str()),
        )
        .col_expr(draft_pool::Column::DraftedByTeamId, Expr::value(team_id))
        .col_expr(draft_pool::Column::DraftedRound, Expr::value(round))
        .col_expr(
            draft_pool::Column::DraftedPickNumber,
            Expr::value(pick_number),
        )
        .filter(draft_pool::Column::SeasonId.eq(season_id))
        .filter(draft_pool::Column::EntityKey.eq(entity_key))
        .filter(draft_pool::Column::Status.eq(PoolStatus::Available.as_str()))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        debug!(entity_key, season_id, "reserve matched no available entry");
        return Err(Error::EntityNotAvailable {
            entity_key: entity_key.to_string(),
            season_id,
        });
    }
    Ok(())
}

/// Lists undrafted entries for a season, most expensive first, then by name.
pub async fn list_available(
    db: &DatabaseConnection,
    season_id: SeasonId,
    filter: &PoolFilter,
) -> Result<Vec<draft_pool::Model>> {
    let mut query = DraftPool::find()
        .filter(draft_pool::Column::SeasonId.eq(season_id))
        .filter(draft_pool::Column::Status.eq(PoolStatus::Available.as_str()));

    if let Some(min) = filter.min_cost {
        query = query.filter(draft_pool::Column::PointCost.gte(min));
    }
    if let Some(max) = filter.max_cost {
        query = query.filter(draft_pool::Column::PointCost.lte(max));
    }

    let entries = query
        .order_by_desc(draft_pool::Column::PointCost)
        .order_by_asc(draft_pool::Column::EntityKey)
        .all(db)
        .await?;

    // SQLite LIKE is only case-insensitive for ASCII, so match in Rust instead.
    Ok(match filter.search.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => {
            let needle = term.to_lowercase();
            entries
                .into_iter()
                .filter(|e| e.entity_key.to_lowercase().contains(&needle))
                .collect()
        }
        _ => entries,
    })
}

/// Adds entries to a season's pool in one transaction.
///
/// Keys already present in the season are left untouched, so seeding is
/// idempotent. Returns the number of entries inserted.
///
/// # Errors
/// Returns `InvalidInput` for an empty name or a non-positive cost; nothing is
/// inserted in that case.
pub async fn seed_pool(
    db: &DatabaseConnection,
    season_id: SeasonId,
    entries: &[NewPoolEntry],
) -> Result<usize> {
    for entry in entries {
        if entry.entity.trim().is_empty() {
            return Err(Error::invalid_input("Pool entity name cannot be empty"));
        }
        if entry.cost <= 0 {
            return Err(Error::invalid_input(format!(
                "Point cost for \"{}\" must be positive, got {}",
                entry.entity, entry.cost
            )));
        }
    }

    let txn = db.begin().await?;
    let mut inserted = 0;
    for entry in entries {
        let key = entry.entity.trim();
        if get_entry(&txn, key, season_id).await?.is_some() {
            debug!(key, season_id, "pool entry already seeded");
            continue;
        }
        draft_pool::ActiveModel {
            season_id: Set(season_id),
            entity_key: Set(key.to_string()),
            point_cost: Set(entry.cost),
            status: Set(PoolStatus::Available.as_str().to_string()),
            drafted_by_team_id: Set(None),
            drafted_round: Set(None),
            drafted_pick_number: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        inserted += 1;
    }
    txn.commit().await?;

    info!(season_id, inserted, "Seeded draft pool");
    Ok(inserted)
}
