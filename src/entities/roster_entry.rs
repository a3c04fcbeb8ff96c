//! Roster entry entity - One entity acquired by a team.
//!
//! Entries are append-only while a draft runs; each committed pick produces one.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Roster entry database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "roster_entries")]
pub struct Model {
    /// Unique identifier for the roster entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Team that owns the entity
    pub team_id: i64,
    /// Season of the roster
    pub season_id: i64,
    /// Session that produced the entry, None for free-agency acquisitions
    pub session_id: Option<i64>,
    /// Pool entry that was consumed
    pub pool_entry_id: i64,
    /// Name of the acquired entity
    pub entity_key: String,
    /// Round in which the entity was drafted
    pub draft_round: i32,
    /// Overall pick number at which the entity was drafted
    pub draft_pick_number: i32,
    /// Points charged to the team's budget
    pub points_spent: i32,
    /// `"draft"` or `"free_agency"`
    pub acquisition_source: String,
    /// When the entry was recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `RosterEntry` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each draft acquisition belongs to one session
    #[sea_orm(
        belongs_to = "super::draft_session::Entity",
        from = "Column::SessionId",
        to = "super::draft_session::Column::Id"
    )]
    DraftSession,
    /// Each roster entry consumes one pool entry
    #[sea_orm(
        belongs_to = "super::draft_pool::Entity",
        from = "Column::PoolEntryId",
        to = "super::draft_pool::Column::Id"
    )]
    DraftPool,
}

impl Related<super::draft_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DraftSession.def()
    }
}

impl Related<super::draft_pool::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DraftPool.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
