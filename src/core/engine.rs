//! Draft engine - Service facade over the draft modules.
//!
//! `DraftEngine` owns the database connection and the configured defaults, and
//! is what a transport layer (or the binary) talks to. All state lives in the
//! database; the engine holds no locks. Share it behind an `Arc`.

use crate::{
    config::draft::DraftSettings,
    core::{
        SeasonId, SessionId, TeamId,
        ledger::{self, Budget},
        picks::{self, CommittedPick},
        pool::{self, NewPoolEntry, PoolFilter},
        roster,
        sequencer::DraftStyle,
        session::{self, CurrentTurn, SessionParams},
    },
    entities::{draft_pool, draft_session, roster_entry},
    errors::{Error, Result},
};
use rand::seq::SliceRandom;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Serialize;
use tracing::{info, instrument};

/// Per-session overrides of the configured defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    /// Ordering rule between rounds
    pub style: Option<DraftStyle>,
    /// Rounds before the draft completes
    pub total_rounds: Option<i32>,
    /// Advisory per-pick clock in seconds
    pub pick_time_limit_secs: Option<i32>,
    /// Whether auto-draft may pick for absent teams
    pub auto_draft_enabled: Option<bool>,
}

/// A team's budget and roster for one season.
#[derive(Debug, Clone, Serialize)]
pub struct TeamStatus {
    /// Team the status belongs to
    pub team_id: TeamId,
    /// Season the status belongs to
    pub season_id: SeasonId,
    /// Budget ledger, None if the team was never given one
    pub budget: Option<Budget>,
    /// Acquired entities in draft order
    pub roster: Vec<roster_entry::Model>,
}

/// Entry point for every draft operation.
#[derive(Debug)]
pub struct DraftEngine {
    db: DatabaseConnection,
    settings: DraftSettings,
}

impl DraftEngine {
    /// Creates an engine over an existing connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection, settings: DraftSettings) -> Self {
        Self { db, settings }
    }

    /// The underlying connection.
    #[must_use]
    pub const fn database(&self) -> &DatabaseConnection {
        &self.db
    }

    /// The configured defaults.
    #[must_use]
    pub const fn settings(&self) -> &DraftSettings {
        &self.settings
    }

    /// Starts a draft for `team_ids` in a random turn order.
    ///
    /// Options left as None fall back to the configured defaults.
    ///
    /// # Errors
    /// - `InvalidInput` for an empty or duplicated team list or a zero round count
    /// - `SessionAlreadyActive` if the season already has an open session
    #[instrument(skip(self))]
    pub async fn create_session(
        &self,
        season_id: SeasonId,
        team_ids: &[TeamId],
        options: SessionOptions,
    ) -> Result<draft_session::Model> {
        let params = SessionParams {
            style: options.style.unwrap_or(self.settings.style),
            total_rounds: options.total_rounds.unwrap_or(self.settings.total_rounds),
            pick_time_limit_secs: options
                .pick_time_limit_secs
                .unwrap_or(self.settings.pick_time_limit_secs),
            auto_draft_enabled: options
                .auto_draft_enabled
                .unwrap_or(self.settings.auto_draft),
        };
        let turn_order = shuffle_turn_order(team_ids);
        session::create_session(&self.db, season_id, turn_order, params).await
    }

    /// Whose turn it is in a session.
    ///
    /// # Errors
    /// Returns `SessionNotFound` for an unknown id.
    #[instrument(skip(self))]
    pub async fn get_current_turn(&self, session_id: SessionId) -> Result<CurrentTurn> {
        let current = self.require_session(session_id).await?;
        session::current_turn(&current)
    }

    /// Drafts `entity_key` for `team_id`. See [`picks::make_pick`].
    pub async fn make_pick(
        &self,
        session_id: SessionId,
        team_id: TeamId,
        entity_key: &str,
    ) -> Result<CommittedPick> {
        picks::make_pick(&self.db, session_id, team_id, entity_key).await
    }

    /// Budget and roster of a team for a season.
    #[instrument(skip(self))]
    pub async fn get_team_status(&self, team_id: TeamId, season_id: SeasonId) -> Result<TeamStatus> {
        let budget = ledger::get_budget(&self.db, team_id, season_id).await?;
        let roster = roster::get_team_roster(&self.db, team_id, season_id).await?;
        Ok(TeamStatus {
            team_id,
            season_id,
            budget,
            roster,
        })
    }

    /// Halts an active session.
    #[instrument(skip(self))]
    pub async fn pause_session(&self, session_id: SessionId) -> Result<draft_session::Model> {
        session::pause_session(&self.db, session_id).await
    }

    /// Re-opens a paused session at the same pick.
    #[instrument(skip(self))]
    pub async fn resume_session(&self, session_id: SessionId) -> Result<draft_session::Model> {
        session::resume_session(&self.db, session_id).await
    }

    /// Abandons a session that has not completed.
    #[instrument(skip(self))]
    pub async fn cancel_session(&self, session_id: SessionId) -> Result<draft_session::Model> {
        session::cancel_session(&self.db, session_id).await
    }

    /// Changes the pick clock or auto-draft flag of an open session.
    #[instrument(skip(self))]
    pub async fn update_session_settings(
        &self,
        session_id: SessionId,
        pick_time_limit_secs: Option<i32>,
        auto_draft_enabled: Option<bool>,
    ) -> Result<draft_session::Model> {
        session::update_settings(&self.db, session_id, pick_time_limit_secs, auto_draft_enabled)
            .await
    }

    /// Looks up a session.
    ///
    /// # Errors
    /// Returns `SessionNotFound` for an unknown id.
    pub async fn get_session(&self, session_id: SessionId) -> Result<draft_session::Model> {
        self.require_session(session_id).await
    }

    /// The season's `active` session, if any.
    pub async fn get_active_session(
        &self,
        season_id: SeasonId,
    ) -> Result<Option<draft_session::Model>> {
        session::get_active_session(&self.db, season_id).await
    }

    /// Every committed pick of a session in pick order.
    ///
    /// # Errors
    /// Returns `SessionNotFound` for an unknown id.
    #[instrument(skip(self))]
    pub async fn draft_history(&self, session_id: SessionId) -> Result<Vec<roster_entry::Model>> {
        self.require_session(session_id).await?;
        roster::get_session_picks(&self.db, session_id).await
    }

    /// Undrafted pool entries of a season.
    pub async fn available_entities(
        &self,
        season_id: SeasonId,
        filter: &PoolFilter,
    ) -> Result<Vec<draft_pool::Model>> {
        pool::list_available(&self.db, season_id, filter).await
    }

    /// Adds entries to a season's pool, skipping keys already present.
    #[instrument(skip(self, entries), fields(count = entries.len()))]
    pub async fn seed_pool(&self, season_id: SeasonId, entries: &[NewPoolEntry]) -> Result<usize> {
        pool::seed_pool(&self.db, season_id, entries).await
    }

    /// Opens a ledger at the configured cap for each team that lacks one.
    ///
    /// All ledgers are opened in one transaction.
    #[instrument(skip(self))]
    pub async fn open_budgets(&self, season_id: SeasonId, team_ids: &[TeamId]) -> Result<Vec<Budget>> {
        let txn = self.db.begin().await?;
        let mut budgets = Vec::with_capacity(team_ids.len());
        for &team_id in team_ids {
            match ledger::open_budget(&txn, team_id, season_id, self.settings.total_points).await {
                Ok(budget) => budgets.push(budget),
                Err(e) => {
                    txn.rollback().await?;
                    return Err(e);
                }
            }
        }
        txn.commit().await?;

        info!(season_id, teams = team_ids.len(), "Draft budgets ready");
        Ok(budgets)
    }

    async fn require_session(&self, session_id: SessionId) -> Result<draft_session::Model> {
        session::get_session(&self.db, session_id)
            .await?
            .ok_or(Error::SessionNotFound { session_id })
    }
}

/// Returns `team_ids` in a uniformly random order (Fisher-Yates).
#[must_use]
pub fn shuffle_turn_order(team_ids: &[TeamId]) -> Vec<TeamId> {
    let mut order = team_ids.to_vec();
    order.shuffle(&mut rand::thread_rng());
    order
}
