//! Draft session entity - One live draft for a season.
//!
//! Holds the lifecycle status, the pick cursor (pick number, round, acting team)
//! and the turn order fixed at creation. The turn order is stored as a JSON array
//! of team ids.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Draft session database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "draft_sessions")]
pub struct Model {
    /// Unique identifier for the session
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Season this draft belongs to
    pub season_id: i64,
    /// `"pending"`, `"active"`, `"paused"`, `"completed"` or `"cancelled"`
    pub status: String,
    /// 1-based number of the pick currently on the clock
    pub current_pick_number: i32,
    /// Round of the current pick
    pub current_round: i32,
    /// Team on the clock, None once the draft is no longer running
    pub current_team_id: Option<i64>,
    /// Team ids in first-round order (JSON array)
    #[sea_orm(column_type = "Json")]
    pub turn_order: Json,
    /// Number of teams in the turn order
    pub total_teams: i32,
    /// Number of rounds before the draft completes
    pub total_rounds: i32,
    /// `"snake"`, `"linear"` or `"auction"`
    pub draft_style: String,
    /// Advisory per-pick clock used by external timers
    pub pick_time_limit_secs: i32,
    /// Whether an external auto-draft component may pick for absent teams
    pub auto_draft_enabled: bool,
    /// When the session was opened
    pub started_at: DateTimeUtc,
    /// When the session completed or was cancelled
    pub completed_at: Option<DateTimeUtc>,
    /// Last modification time
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `DraftSession` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One session produces many roster entries
    #[sea_orm(has_many = "super::roster_entry::Entity")]
    RosterEntries,
}

impl Related<super::roster_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RosterEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
