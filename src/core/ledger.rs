//! Budget ledger business logic - Per-team point caps for a season.
//!
//! Spending is recorded with one guarded increment,
//! `UPDATE draft_budgets SET spent_points = spent_points + ? WHERE ... AND spent_points <= total_points - ?`,
//! so a retried request or a second writer can never push a team over its cap
//! or lose an update.

use crate::{
    core::{SeasonId, TeamId},
    entities::{DraftBudget, draft_budget},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*, sea_query::Expr};
use serde::Serialize;
use tracing::{debug, info};

/// Snapshot of a team's budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Budget {
    /// Fixed point cap
    pub total: i32,
    /// Points consumed so far
    pub spent: i32,
    /// `total - spent`
    pub remaining: i32,
}

impl From<&draft_budget::Model> for Budget {
    fn from(model: &draft_budget::Model) -> Self {
        Self {
            total: model.total_points,
            spent: model.spent_points,
            remaining: model.total_points - model.spent_points,
        }
    }
}

async fn find_ledger<C>(
    db: &C,
    team_id: TeamId,
    season_id: SeasonId,
) -> Result<Option<draft_budget::Model>>
where
    C: ConnectionTrait,
{
    DraftBudget::find()
        .filter(draft_budget::Column::TeamId.eq(team_id))
        .filter(draft_budget::Column::SeasonId.eq(season_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the team's budget for the season, or None if no ledger exists.
pub async fn get_budget<C>(db: &C, team_id: TeamId, season_id: SeasonId) -> Result<Option<Budget>>
where
    C: ConnectionTrait,
{
    let ledger = find_ledger(db, team_id, season_id).await?;
    Ok(ledger.as_ref().map(Budget::from))
}

/// Creates a ledger row with nothing spent, or returns the existing one unchanged.
///
/// # Errors
/// Returns `InvalidInput` if `total_points` is not positive.
pub async fn open_budget<C>(
    db: &C,
    team_id: TeamId,
    season_id: SeasonId,
    total_points: i32,
) -> Result<Budget>
where
    C: ConnectionTrait,
{
    if total_points <= 0 {
        return Err(Error::invalid_input(format!(
            "Budget cap must be positive, got {total_points}"
        )));
    }

    if let Some(existing) = find_ledger(db, team_id, season_id).await? {
        debug!(team_id, season_id, "budget already open");
        return Ok(Budget::from(&existing));
    }

    let model = draft_budget::ActiveModel {
        team_id: Set(team_id),
        season_id: Set(season_id),
        total_points: Set(total_points),
        spent_points: Set(0),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(team_id, season_id, total_points, "Opened draft budget");
    Ok(Budget::from(&model))
}

/// Adds `amount` to the team's spent points if the cap allows it.
///
/// The cap check and the increment are a single UPDATE. Returns the budget
/// after the charge.
///
/// # Errors
/// - `InvalidInput` for a negative amount
/// - `BudgetNotFound` if the team has no ledger for the season
/// - `InsufficientBudget` if `spent + amount > total`; nothing is written
pub async fn charge<C>(db: &C, team_id: TeamId, season_id: SeasonId, amount: i32) -> Result<Budget>
where
    C: ConnectionTrait,
{
    if amount < 0 {
        return Err(Error::invalid_input(format!(
            "Charge amount cannot be negative, got {amount}"
        )));
    }

    let result = DraftBudget::update_many()
        .col_expr(
            draft_budget::Column::SpentPoints,
            Expr::col(draft_budget::Column::SpentPoints).add(amount),
        )
        .filter(draft_budget::Column::TeamId.eq(team_id))
        .filter(draft_budget::Column::SeasonId.eq(season_id))
        .filter(
            Expr::col(draft_budget::Column::SpentPoints)
                .lte(Expr::col(draft_budget::Column::TotalPoints).sub(amount)),
        )
        .exec(db)
        .await?;

    let ledger = find_ledger(db, team_id, season_id)
        .await?
        .ok_or(Error::BudgetNotFound { team_id, season_id })?;
    let budget = Budget::from(&ledger);

    if result.rows_affected == 0 {
        return Err(Error::InsufficientBudget {
            needed: amount,
            remaining: budget.remaining,
        });
    }

    debug!(team_id, season_id, amount, spent = budget.spent, "charged budget");
    Ok(budget)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_open_budget_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = open_budget(&db, 1, SEASON, 0).await;
        assert!(matches!(result, Err(Error::InvalidInput { .. })));

        let result = open_budget(&db, 1, SEASON, -120).await;
        assert!(matches!(result, Err(Error::InvalidInput { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_open_budget_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;

        let opened = open_budget(&db, 1, SEASON, 120).await?;
        assert_eq!(
            opened,
            Budget {
                total: 120,
                spent: 0,
                remaining: 120
            }
        );

        charge(&db, 1, SEASON, 20).await?;

        // Re-opening does not reset spending or change the cap
        let reopened = open_budget(&db, 1, SEASON, 200).await?;
        assert_eq!(reopened.total, 120);
        assert_eq!(reopened.spent, 20);

        Ok(())
    }

    #[tokio::test]
    async fn test_charge_accumulates() -> Result<()> {
        let db = setup_test_db().await?;
        open_budget(&db, 1, SEASON, 120).await?;

        charge(&db, 1, SEASON, 19).await?;
        let after = charge(&db, 1, SEASON, 8).await?;
        assert_eq!(after.spent, 27);
        assert_eq!(after.remaining, 93);

        let stored = get_budget(&db, 1, SEASON).await?.unwrap();
        assert_eq!(stored, after);

        Ok(())
    }

    #[tokio::test]
    async fn test_charge_up_to_exact_cap() -> Result<()> {
        let db = setup_test_db().await?;
        open_budget(&db, 1, SEASON, 30).await?;

        let budget = charge(&db, 1, SEASON, 30).await?;
        assert_eq!(budget.remaining, 0);

        let result = charge(&db, 1, SEASON, 1).await;
        assert!(matches!(
            result,
            Err(Error::InsufficientBudget {
                needed: 1,
                remaining: 0
            })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_charge_over_cap_leaves_spent_unchanged() -> Result<()> {
        let db = setup_test_db().await?;
        open_budget(&db, 1, SEASON, 20).await?;
        charge(&db, 1, SEASON, 15).await?;

        let result = charge(&db, 1, SEASON, 6).await;
        assert!(matches!(
            result,
            Err(Error::InsufficientBudget {
                needed: 6,
                remaining: 5
            })
        ));
        assert_eq!(get_budget(&db, 1, SEASON).await?.unwrap().spent, 15);

        Ok(())
    }

    #[tokio::test]
    async fn test_charge_missing_budget() -> Result<()> {
        let db = setup_test_db().await?;
        open_budget(&db, 1, SEASON, 120).await?;

        let result = charge(&db, 2, SEASON, 5).await;
        assert!(matches!(
            result,
            Err(Error::BudgetNotFound {
                team_id: 2,
                season_id: SEASON
            })
        ));
        assert!(get_budget(&db, 1, SEASON + 1).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_negative_charge_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        open_budget(&db, 1, SEASON, 120).await?;

        let result = charge(&db, 1, SEASON, -5).await;
        assert!(matches!(result, Err(Error::InvalidInput { .. })));
        assert_eq!(get_budget(&db, 1, SEASON).await?.unwrap().spent, 0);

        Ok(())
    }
}
