//! Roster business logic - Append-only record of acquired entities.

use crate::{
    core::{SeasonId, SessionId, TeamId},
    entities::{RosterEntry, roster_entry},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use std::{fmt, str::FromStr};

/// How a team acquired a roster entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionSource {
    /// Picked during a draft session
    Draft,
    /// Added after the draft by a free-agency transaction
    FreeAgency,
}

impl AcquisitionSource {
    /// Database representation of the source.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::FreeAgency => "free_agency",
        }
    }
}

impl fmt::Display for AcquisitionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AcquisitionSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "draft" => Ok(Self::Draft),
            "free_agency" => Ok(Self::FreeAgency),
            other => Err(Error::invariant(format!(
                "unknown acquisition source \"{other}\""
            ))),
        }
    }
}

/// A drafted entity to append to a team's roster.
#[derive(Debug, Clone)]
pub struct DraftedEntity<'a> {
    /// Team receiving the entity
    pub team_id: TeamId,
    /// Season of the roster
    pub season_id: SeasonId,
    /// Session in which the pick was made
    pub session_id: SessionId,
    /// Pool entry consumed by the pick
    pub pool_entry_id: i64,
    /// Name of the entity
    pub entity_key: &'a str,
    /// Round of the pick
    pub round: i32,
    /// Overall pick number
    pub pick_number: i32,
    /// Points charged
    pub points: i32,
}

/// Inserts a draft acquisition. Roster rows are never updated in place.
pub async fn append_draft_pick<C>(db: &C, pick: &DraftedEntity<'_>) -> Result<roster_entry::Model>
where
    C: ConnectionTrait,
{
    roster_entry::ActiveModel {
        team_id: Set(pick.team_id),
        season_id: Set(pick.season_id),
        session_id: Set(Some(pick.session_id)),
        pool_entry_id: Set(pick.pool_entry_id),
        entity_key: Set(pick.entity_key.to_string()),
        draft_round: Set(pick.round),
        draft_pick_number: Set(pick.pick_number),
        points_spent: Set(pick.points),
        acquisition_source: Set(AcquisitionSource::Draft.as_str().to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Returns a team's roster for a season in draft order.
pub async fn get_team_roster(
    db: &DatabaseConnection,
    team_id: TeamId,
    season_id: SeasonId,
) -> Result<Vec<roster_entry::Model>> {
    RosterEntry::find()
        .filter(roster_entry::Column::TeamId.eq(team_id))
        .filter(roster_entry::Column::SeasonId.eq(season_id))
        .order_by_asc(roster_entry::Column::DraftRound)
        .order_by_asc(roster_entry::Column::DraftPickNumber)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Returns every pick committed in a session, ordered by pick number.
pub async fn get_session_picks(
    db: &DatabaseConnection,
    session_id: SessionId,
) -> Result<Vec<roster_entry::Model>> {
    RosterEntry::find()
        .filter(roster_entry::Column::SessionId.eq(session_id))
        .order_by_asc(roster_entry::Column::DraftPickNumber)
        .all(db)
        .await
        .map_err(Into::into)
}
