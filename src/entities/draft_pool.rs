//! Draft pool entity - A draftable entity with its point cost for one season.
//!
//! `drafted_by_team_id` is set exactly when `status` is `"drafted"`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Draft pool database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "draft_pool")]
pub struct Model {
    /// Unique identifier for the pool entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Season whose pool this entry belongs to
    pub season_id: i64,
    /// Name of the draftable entity, unique within a season
    pub entity_key: String,
    /// Price in budget points
    pub point_cost: i32,
    /// `"available"` or `"drafted"`
    pub status: String,
    /// Team that drafted the entry
    pub drafted_by_team_id: Option<i64>,
    /// Round in which the entry was drafted
    pub drafted_round: Option<i32>,
    /// Overall pick number at which the entry was drafted
    pub drafted_pick_number: Option<i32>,
}

/// Defines relationships between `DraftPool` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A drafted entry is referenced by one roster entry
    #[sea_orm(has_many = "super::roster_entry::Entity")]
    RosterEntries,
}

impl Related<super::roster_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RosterEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
