//! Pick processing - Validates and commits a single draft pick.
//!
//! One attempt runs inside one database transaction:
//!
//! 1. load the session and require `active`
//! 2. derive the team on the clock and compare it with the caller
//! 3. look up the pool entry in the session's season
//! 4. look up the team's ledger and check the cap
//! 5. reserve the pool entry, charge the ledger, append the roster entry
//! 6. compute the next cursor
//! 7. advance the session with a compare-and-set on the pick number
//!
//! Any error rolls the transaction back, so pool, ledger, roster and session
//! either all change or none do. Losing the compare-and-set in step 7 yields
//! `ConcurrentPickConflict`; `make_pick` retries that once from step 1 with
//! fresh reads before giving up.

use crate::{
    core::{
        SeasonId, SessionId, TeamId, ledger,
        pool::{self, PoolStatus},
        roster::{self, DraftedEntity},
        sequencer,
        session::{self, SessionStatus},
    },
    errors::{Error, Result},
};
use sea_orm::{DatabaseTransaction, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::{info, instrument, warn};

/// Attempts per pick: the first try plus one retry after a lost race.
const MAX_ATTEMPTS: u32 = 2;

/// A pick that has been committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommittedPick {
    /// Session the pick was made in
    pub session_id: SessionId,
    /// Season whose pool was drafted from
    pub season_id: SeasonId,
    /// Team that made the pick
    pub team_id: TeamId,
    /// Entity drafted
    pub entity_key: String,
    /// Round of the pick
    pub round: i32,
    /// Overall pick number
    pub pick_number: i32,
    /// Points charged to the team
    pub cost: i32,
    /// True when this was the final pick of the draft
    pub completes_draft: bool,
}

/// Makes a pick for `team_id` in `session_id`.
///
/// Rejections (`SessionNotFound`, `SessionNotActive`, `NotYourTurn`,
/// `EntityNotAvailable`, `BudgetNotFound`, `InsufficientBudget`,
/// `ConcurrentPickConflict`) leave every table untouched. Storage faults are
/// returned as `StorageUnavailable`, also without partial writes.
#[instrument(skip(db))]
pub async fn make_pick(
    db: &DatabaseConnection,
    session_id: SessionId,
    team_id: TeamId,
    entity_key: &str,
) -> Result<CommittedPick> {
    let mut attempt = 1;
    loop {
        match try_pick(db, session_id, team_id, entity_key).await {
            Err(Error::ConcurrentPickConflict { pick_number }) if attempt < MAX_ATTEMPTS => {
                warn!(pick_number, attempt, "Lost pick race, retrying with fresh state");
                attempt += 1;
            }
            Err(e) => {
                if e.is_rejection() {
                    warn!(error = %e, "Pick rejected");
                }
                return Err(e);
            }
            Ok(pick) => {
                info!(
                    round = pick.round,
                    pick_number = pick.pick_number,
                    cost = pick.cost,
                    completes_draft = pick.completes_draft,
                    "Pick committed"
                );
                return Ok(pick);
            }
        }
    }
}

/// One attempt: opens a transaction, runs the pick inside it, then commits or
/// rolls back.
async fn try_pick(
    db: &DatabaseConnection,
    session_id: SessionId,
    team_id: TeamId,
    entity_key: &str,
) -> Result<CommittedPick> {
    let txn = db.begin().await?;
    match pick_in_transaction(&txn, session_id, team_id, entity_key).await {
        Ok(pick) => {
            txn.commit().await?;
            Ok(pick)
        }
        Err(e) => {
            txn.rollback().await?;
            Err(e)
        }
    }
}

async fn pick_in_transaction(
    txn: &DatabaseTransaction,
    session_id: SessionId,
    team_id: TeamId,
    entity_key: &str,
) -> Result<CommittedPick> {
    // 1. Session must exist and be active
    let current = session::get_session(txn, session_id)
        .await?
        .ok_or(Error::SessionNotFound { session_id })?;
    let status = session::status_of(&current)?;
    if status != SessionStatus::Active {
        return Err(Error::SessionNotActive {
            session_id,
            status: status.to_string(),
        });
    }

    // 2. Only the team on the clock may pick
    let order = session::turn_order_of(&current)?;
    let style = session::style_of(&current)?;
    let pick_number = current.current_pick_number;
    let expected = sequencer::acting_team(&order, style, pick_number)?;
    if expected != team_id {
        return Err(Error::NotYourTurn {
            team_id,
            expected,
        });
    }
    let round = sequencer::round_for_pick(pick_number, current.total_teams)?;
    if round != current.current_round {
        return Err(Error::invariant(format!(
            "session {session_id} stores round {} for pick {pick_number}, expected {round}",
            current.current_round
        )));
    }

    // 3. The entity must still be in the season's pool
    let season_id = current.season_id;
    let entry = pool::get_entry(txn, entity_key, season_id)
        .await?
        .filter(|e| e.status == PoolStatus::Available.as_str())
        .ok_or_else(|| Error::EntityNotAvailable {
            entity_key: entity_key.to_string(),
            season_id,
        })?;

    // 4. The team must be able to afford it
    let budget = ledger::get_budget(txn, team_id, season_id)
        .await?
        .ok_or(Error::BudgetNotFound { team_id, season_id })?;
    if entry.point_cost > budget.remaining {
        return Err(Error::InsufficientBudget {
            needed: entry.point_cost,
            remaining: budget.remaining,
        });
    }

    // 5. Consume the pool entry, the points and a roster slot
    pool::reserve(txn, &entry.entity_key, season_id, team_id, round, pick_number).await?;
    ledger::charge(txn, team_id, season_id, entry.point_cost).await?;
    roster::append_draft_pick(
        txn,
        &DraftedEntity {
            team_id,
            season_id,
            session_id,
            pool_entry_id: entry.id,
            entity_key: &entry.entity_key,
            round,
            pick_number,
            points: entry.point_cost,
        },
    )
    .await?;

    // 6-7. Move the cursor, conditioned on nobody else having done so
    let next = session::next_cursor(&current)?;
    session::advance(txn, &current, &next).await?;

    Ok(CommittedPick {
        session_id,
        season_id,
        team_id,
        entity_key: entry.entity_key,
        round,
        pick_number,
        cost: entry.point_cost,
        completes_draft: next.is_complete,
    })
}
