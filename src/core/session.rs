//! Draft session business logic - Lifecycle and pick cursor.
//!
//! A session is created directly in `active` with pick 1 on the clock. From
//! there it only moves forward:
//!
//! ```text
//! pending ──► active ──► completed        (automatic, after the last pick)
//!    │         │  ▲
//!    │         ▼  │
//!    │        paused
//!    │         │
//!    └─────────┴──────► cancelled         (administrative)
//! ```
//!
//! Every status change and every cursor move is a conditional UPDATE keyed on the
//! state that was read, so a stale caller fails instead of overwriting.

use crate::{
    core::{
        SeasonId, SessionId, TeamId,
        sequencer::{self, DraftStyle},
    },
    entities::{DraftSession, draft_session},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{
    QueryOrder, Set,
    prelude::*,
    sea_query::{Expr, SimpleExpr},
};
use serde::Serialize;
use std::{collections::HashSet, fmt, str::FromStr};
use tracing::{info, warn};

/// Lifecycle state of a draft session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Created but not yet open for picks
    Pending,
    /// Accepting picks
    Active,
    /// Temporarily halted by an administrator
    Paused,
    /// Every pick has been made
    Completed,
    /// Abandoned by an administrator
    Cancelled,
}

impl SessionStatus {
    /// Database representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled sessions never change again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether the state machine allows moving from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending | Self::Paused, Self::Active)
                | (Self::Active, Self::Paused | Self::Completed)
                | (Self::Pending | Self::Active | Self::Paused, Self::Cancelled)
        )
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(Error::invariant(format!(
                "unknown session status \"{other}\""
            ))),
        }
    }
}

/// Fixed parameters of a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionParams {
    /// Ordering rule between rounds
    pub style: DraftStyle,
    /// Rounds before the draft completes
    pub total_rounds: i32,
    /// Advisory per-pick clock in seconds
    pub pick_time_limit_secs: i32,
    /// Whether auto-draft may pick for absent teams
    pub auto_draft_enabled: bool,
}

/// Display projection of whose turn it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurrentTurn {
    /// Team on the clock, None when the session is not active
    pub team_id: Option<TeamId>,
    /// Pick number on the clock
    pub pick_number: i32,
    /// Round of that pick
    pub round: i32,
    /// True when the round runs in reverse order
    pub is_snake_round: bool,
}

/// The cursor after a pick is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextCursor {
    /// Pick number now on the clock
    pub pick_number: i32,
    /// Round of that pick
    pub round: i32,
    /// Team on the clock, None once the draft is complete
    pub team_id: Option<TeamId>,
    /// True when the committed pick was the last one
    pub is_complete: bool,
}

/// Parsed status of a stored session.
pub fn status_of(session: &draft_session::Model) -> Result<SessionStatus> {
    session.status.parse()
}

/// Parsed draft style of a stored session.
pub fn style_of(session: &draft_session::Model) -> Result<DraftStyle> {
    session.draft_style.parse()
}

/// Decodes and validates the stored turn order.
///
/// # Errors
/// Returns `InvariantViolation` if the JSON is not a list of team ids, its length
/// differs from `total_teams`, or a team appears twice.
pub fn turn_order_of(session: &draft_session::Model) -> Result<Vec<TeamId>> {
    let order: Vec<TeamId> = serde_json::from_value(session.turn_order.clone()).map_err(|e| {
        Error::invariant(format!(
            "turn order of session {} is malformed: {e}",
            session.id
        ))
    })?;
    let expected = usize::try_from(session.total_teams).unwrap_or(0);
    if order.is_empty() || order.len() != expected {
        return Err(Error::invariant(format!(
            "session {} has {} teams in its turn order but total_teams is {}",
            session.id,
            order.len(),
            session.total_teams
        )));
    }
    let distinct: HashSet<_> = order.iter().collect();
    if distinct.len() != order.len() {
        return Err(Error::invariant(format!(
            "session {} lists a team twice in its turn order",
            session.id
        )));
    }
    Ok(order)
}

/// Total number of picks in the session.
///
/// # Errors
/// Returns `InvariantViolation` if `total_teams * total_rounds` does not fit in an `i32`.
pub fn total_picks(session: &draft_session::Model) -> Result<i32> {
    session
        .total_teams
        .checked_mul(session.total_rounds)
        .ok_or_else(|| {
            Error::invariant(format!(
                "session {} has {} teams x {} rounds, too many picks",
                session.id, session.total_teams, session.total_rounds
            ))
        })
}

/// Computes the cursor that follows the session's current pick.
pub fn next_cursor(session: &draft_session::Model) -> Result<NextCursor> {
    let order = turn_order_of(session)?;
    let style = style_of(session)?;
    let pick_number = session.current_pick_number.checked_add(1).ok_or_else(|| {
        Error::invariant(format!("session {} pick number overflowed", session.id))
    })?;
    let round = sequencer::round_for_pick(pick_number, session.total_teams)?;
    let is_complete = pick_number > total_picks(session)?;
    let team_id = if is_complete {
        None
    } else {
        Some(sequencer::acting_team(&order, style, pick_number)?)
    };
    Ok(NextCursor {
        pick_number,
        round,
        team_id,
        is_complete,
    })
}

/// Opens a session in `active` with pick 1 on the clock for `turn_order[0]`.
///
/// The caller supplies the already-shuffled turn order.
///
/// # Errors
/// - `InvalidInput` for an empty or duplicated turn order, non-positive rounds
///   or pick time, more picks than an `i32` can number, or the auction style
/// - `SessionAlreadyActive` if the season has a non-terminal session
pub async fn create_session(
    db: &DatabaseConnection,
    season_id: SeasonId,
    turn_order: Vec<TeamId>,
    params: SessionParams,
) -> Result<draft_session::Model> {
    let Some(&first_team) = turn_order.first() else {
        return Err(Error::invalid_input("A draft needs at least one team"));
    };
    let distinct: HashSet<_> = turn_order.iter().collect();
    if distinct.len() != turn_order.len() {
        return Err(Error::invalid_input("Each team may appear only once"));
    }
    if params.total_rounds < 1 {
        return Err(Error::invalid_input(format!(
            "Total rounds must be at least 1, got {}",
            params.total_rounds
        )));
    }
    if params.pick_time_limit_secs < 1 {
        return Err(Error::invalid_input(format!(
            "Pick time limit must be positive, got {}",
            params.pick_time_limit_secs
        )));
    }
    if params.style == DraftStyle::Auction {
        return Err(Error::invalid_input(
            "Auction drafts are not supported by the turn sequencer",
        ));
    }
    let total_teams = i32::try_from(turn_order.len())
        .map_err(|_| Error::invalid_input("Too many teams for one draft"))?;
    // The cursor rests one past the final pick once the draft completes.
    if total_teams
        .checked_mul(params.total_rounds)
        .and_then(|picks| picks.checked_add(1))
        .is_none()
    {
        return Err(Error::invalid_input(format!(
            "{total_teams} teams x {} rounds is too many picks for one draft",
            params.total_rounds
        )));
    }

    if let Some(existing) = get_open_session(db, season_id).await? {
        return Err(Error::SessionAlreadyActive {
            season_id,
            session_id: existing.id,
        });
    }

    let now = Utc::now();
    let session = draft_session::ActiveModel {
        season_id: Set(season_id),
        status: Set(SessionStatus::Active.as_str().to_string()),
        current_pick_number: Set(1),
        current_round: Set(1),
        current_team_id: Set(Some(first_team)),
        turn_order: Set(Json::from(turn_order)),
        total_teams: Set(total_teams),
        total_rounds: Set(params.total_rounds),
        draft_style: Set(params.style.as_str().to_string()),
        pick_time_limit_secs: Set(params.pick_time_limit_secs),
        auto_draft_enabled: Set(params.auto_draft_enabled),
        started_at: Set(now),
        completed_at: Set(None),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = session.insert(db).await.map_err(|e| {
        // The partial unique index catches a concurrent creator that passed the check above.
        if matches!(e.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_))) {
            warn!(season_id, "lost race creating draft session");
        }
        Error::from(e)
    })?;

    info!(
        session_id = model.id,
        season_id,
        total_teams,
        total_rounds = params.total_rounds,
        style = %params.style,
        "Draft session created"
    );
    Ok(model)
}

/// Finds a session by id.
pub async fn get_session<C>(db: &C, session_id: SessionId) -> Result<Option<draft_session::Model>>
where
    C: ConnectionTrait,
{
    DraftSession::find_by_id(session_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds the season's session that is currently `active`.
pub async fn get_active_session(
    db: &DatabaseConnection,
    season_id: SeasonId,
) -> Result<Option<draft_session::Model>> {
    DraftSession::find()
        .filter(draft_session::Column::SeasonId.eq(season_id))
        .filter(draft_session::Column::Status.eq(SessionStatus::Active.as_str()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds the season's non-terminal (`pending`, `active` or `paused`) session.
pub async fn get_open_session(
    db: &DatabaseConnection,
    season_id: SeasonId,
) -> Result<Option<draft_session::Model>> {
    DraftSession::find()
        .filter(draft_session::Column::SeasonId.eq(season_id))
        .filter(draft_session::Column::Status.is_in([
            SessionStatus::Pending.as_str(),
            SessionStatus::Active.as_str(),
            SessionStatus::Paused.as_str(),
        ]))
        .order_by_desc(draft_session::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Read-only projection of the pick on the clock.
pub fn current_turn(session: &draft_session::Model) -> Result<CurrentTurn> {
    let style = style_of(session)?;
    let team_id = if status_of(session)? == SessionStatus::Active {
        let order = turn_order_of(session)?;
        Some(sequencer::acting_team(
            &order,
            style,
            session.current_pick_number,
        )?)
    } else {
        None
    };
    Ok(CurrentTurn {
        team_id,
        pick_number: session.current_pick_number,
        round: session.current_round,
        is_snake_round: sequencer::is_reversed_round(style, session.current_round),
    })
}

/// Moves the session cursor past its current pick.
///
/// The UPDATE only applies while the session is still `active` at
/// the pick number read into `session`.
///
/// # Errors
/// Returns `ConcurrentPickConflict` if another request advanced the session first.
pub async fn advance<C>(
    db: &C,
    session: &draft_session::Model,
    next: &NextCursor,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let now = Utc::now();
    let (status, completed_at) = if next.is_complete {
        (SessionStatus::Completed, Some(now))
    } else {
        (SessionStatus::Active, None)
    };

    let result = DraftSession::update_many()
        .col_expr(
            draft_session::Column::CurrentPickNumber,
            Expr::value(next.pick_number),
        )
        .col_expr(draft_session::Column::CurrentRound, Expr::value(next.round))
        .col_expr(
            draft_session::Column::CurrentTeamId,
            Expr::value(next.team_id),
        )
        .col_expr(draft_session::Column::Status, Expr::value(status.as_str()))
        .col_expr(draft_session::Column::CompletedAt, Expr::value(completed_at))
        .col_expr(draft_session::Column::UpdatedAt, Expr::value(now))
        .filter(draft_session::Column::Id.eq(session.id))
        .filter(draft_session::Column::CurrentPickNumber.eq(session.current_pick_number))
        .filter(draft_session::Column::Status.eq(SessionStatus::Active.as_str()))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::ConcurrentPickConflict {
            pick_number: session.current_pick_number,
        });
    }
    Ok(())
}

/// Applies an administrative status change guarded on the current status.
async fn transition(
    db: &DatabaseConnection,
    session_id: SessionId,
    next: SessionStatus,
) -> Result<draft_session::Model> {
    let session = get_session(db, session_id)
        .await?
        .ok_or(Error::SessionNotFound { session_id })?;
    let current = status_of(&session)?;

    // Completion is only ever reached through the final pick.
    if next == SessionStatus::Completed || !current.can_transition_to(next) {
        return Err(Error::InvalidTransition {
            session_id,
            from: current.to_string(),
            to: next.to_string(),
        });
    }

    let now = Utc::now();
    let current_team: SimpleExpr = if next == SessionStatus::Active {
        let order = turn_order_of(&session)?;
        let team = sequencer::acting_team(&order, style_of(&session)?, session.current_pick_number)?;
        Expr::value(Some(team))
    } else {
        Expr::value(None::<TeamId>)
    };
    let completed_at = if next == SessionStatus::Cancelled {
        Some(now)
    } else {
        None
    };

    let result = DraftSession::update_many()
        .col_expr(draft_session::Column::Status, Expr::value(next.as_str()))
        .col_expr(draft_session::Column::CurrentTeamId, current_team)
        .col_expr(draft_session::Column::CompletedAt, Expr::value(completed_at))
        .col_expr(draft_session::Column::UpdatedAt, Expr::value(now))
        .filter(draft_session::Column::Id.eq(session_id))
        .filter(draft_session::Column::Status.eq(current.as_str()))
        .exec(db)
        .await?;

    let updated = get_session(db, session_id)
        .await?
        .ok_or(Error::SessionNotFound { session_id })?;

    if result.rows_affected == 0 {
        // Someone else changed the status between our read and write.
        return Err(Error::InvalidTransition {
            session_id,
            from: updated.status,
            to: next.to_string(),
        });
    }

    info!(session_id, from = %current, to = %next, "Draft session status changed");
    Ok(updated)
}

/// Halts an active session; picks are rejected until it is resumed.
pub async fn pause_session(
    db: &DatabaseConnection,
    session_id: SessionId,
) -> Result<draft_session::Model> {
    transition(db, session_id, SessionStatus::Paused).await
}

/// Re-opens a paused (or pending) session for picks at the same cursor.
pub async fn resume_session(
    db: &DatabaseConnection,
    session_id: SessionId,
) -> Result<draft_session::Model> {
    transition(db, session_id, SessionStatus::Active).await
}

/// Abandons a session that has not completed.
pub async fn cancel_session(
    db: &DatabaseConnection,
    session_id: SessionId,
) -> Result<draft_session::Model> {
    transition(db, session_id, SessionStatus::Cancelled).await
}

/// Changes the advisory settings of a non-terminal session.
///
/// # Errors
/// - `SessionNotFound` for an unknown id
/// - `InvalidInput` for a non-positive pick time limit
/// - `InvalidTransition` if the session already completed or was cancelled
pub async fn update_settings(
    db: &DatabaseConnection,
    session_id: SessionId,
    pick_time_limit_secs: Option<i32>,
    auto_draft_enabled: Option<bool>,
) -> Result<draft_session::Model> {
    if let Some(limit) = pick_time_limit_secs.filter(|limit| *limit < 1) {
        return Err(Error::invalid_input(format!(
            "Pick time limit must be positive, got {limit}"
        )));
    }

    let session = get_session(db, session_id)
        .await?
        .ok_or(Error::SessionNotFound { session_id })?;
    let status = status_of(&session)?;
    if status.is_terminal() {
        return Err(Error::InvalidTransition {
            session_id,
            from: status.to_string(),
            to: status.to_string(),
        });
    }

    let mut model: draft_session::ActiveModel = session.into();
    if let Some(limit) = pick_time_limit_secs {
        model.pick_time_limit_secs = Set(limit);
    }
    if let Some(enabled) = auto_draft_enabled {
        model.auto_draft_enabled = Set(enabled);
    }
    model.updated_at = Set(Utc::now());
    let updated = model.update(db).await?;

    info!(
        session_id,
        pick_time_limit_secs = updated.pick_time_limit_secs,
        auto_draft_enabled = updated.auto_draft_enabled,
        "Draft session settings updated"
    );
    Ok(updated)
}
