//! Draft budget entity - Per-team point ledger for a season.
//!
//! Remaining points are always derived as `total_points - spent_points`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Budget ledger database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "draft_budgets")]
pub struct Model {
    /// Unique identifier for the ledger row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Team owning the budget
    pub team_id: i64,
    /// Season the budget applies to
    pub season_id: i64,
    /// Fixed point cap
    pub total_points: i32,
    /// Points consumed so far
    pub spent_points: i32,
}

/// `DraftBudget` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
