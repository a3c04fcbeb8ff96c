//! Unified error type for the draft engine.
//!
//! Errors fall into two groups. Rejections are caller-correctable outcomes of a
//! pick or administrative request (wrong turn, entity already taken, budget
//! exhausted) and never damage the session. Faults (`StorageUnavailable`,
//! `InvariantViolation`, `Config`) abort the operation without mutating state.

use crate::core::{SeasonId, SessionId, TeamId};
use thiserror::Error;

/// All errors surfaced by the draft engine.
#[derive(Debug, Error)]
pub enum Error {
    /// No session exists with the requested id
    #[error("Draft session {session_id} not found")]
    SessionNotFound {
        /// The id that was looked up
        session_id: SessionId,
    },

    /// The session exists but is not accepting picks
    #[error("Draft session {session_id} is {status}")]
    SessionNotActive {
        /// The session that rejected the pick
        session_id: SessionId,
        /// Its current status
        status: String,
    },

    /// The season already has a non-terminal session
    #[error("Season {season_id} already has an open draft session ({session_id})")]
    SessionAlreadyActive {
        /// The season being drafted
        season_id: SeasonId,
        /// The session that is already open
        session_id: SessionId,
    },

    /// Another team is on the clock
    #[error("It's not team {team_id}'s turn to pick (team {expected} is on the clock)")]
    NotYourTurn {
        /// The team that attempted the pick
        team_id: TeamId,
        /// The team whose turn it is
        expected: TeamId,
    },

    /// The entity is missing from the pool or has already been drafted
    #[error("\"{entity_key}\" is not available in the draft pool for season {season_id}")]
    EntityNotAvailable {
        /// The requested entity
        entity_key: String,
        /// The season whose pool was searched
        season_id: SeasonId,
    },

    /// The team has no budget ledger for the season
    #[error("Team {team_id} has no budget for season {season_id}")]
    BudgetNotFound {
        /// The team whose ledger is missing
        team_id: TeamId,
        /// The season that was searched
        season_id: SeasonId,
    },

    /// The pick would take the team over its cap
    #[error("Insufficient points. Need {needed}, have {remaining}")]
    InsufficientBudget {
        /// Cost of the requested entity
        needed: i32,
        /// Points left before the pick
        remaining: i32,
    },

    /// The session cursor moved between reading and committing
    #[error("Pick {pick_number} was already taken by a concurrent request")]
    ConcurrentPickConflict {
        /// The pick number the losing request tried to commit
        pick_number: i32,
    },

    /// An administrative status change that the state machine does not allow
    #[error("Cannot move draft session {session_id} from {from} to {to}")]
    InvalidTransition {
        /// The session being changed
        session_id: SessionId,
        /// Status before the request
        from: String,
        /// Requested status
        to: String,
    },

    /// Caller-supplied arguments are unusable
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of what is wrong
        message: String,
    },

    /// Stored data breaks an invariant the engine relies on
    #[error("Invariant violation: {message}")]
    InvariantViolation {
        /// Description of the broken invariant
        message: String,
    },

    /// Configuration could not be loaded or is out of range
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// The backing store failed
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] sea_orm::DbErr),

    /// I/O failure outside the database (reading config files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true for caller-correctable rejections, false for faults.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::SessionNotFound { .. }
                | Self::SessionNotActive { .. }
                | Self::SessionAlreadyActive { .. }
                | Self::NotYourTurn { .. }
                | Self::EntityNotAvailable { .. }
                | Self::BudgetNotFound { .. }
                | Self::InsufficientBudget { .. }
                | Self::ConcurrentPickConflict { .. }
                | Self::InvalidTransition { .. }
                | Self::InvalidInput { .. }
        )
    }

    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
