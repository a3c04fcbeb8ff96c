//! Core business logic - framework-agnostic draft operations.
//!
//! Each module owns one table (or one pure computation) and exposes free async
//! functions generic over [`sea_orm::ConnectionTrait`], so the same code runs on a
//! plain connection or inside the pick transaction. [`engine::DraftEngine`] ties
//! them together for callers.

/// Public service facade over the draft operations
pub mod engine;
/// Per-team point caps
pub mod ledger;
/// Atomic pick processing
pub mod picks;
/// Draftable entities and their availability
pub mod pool;
/// Append-only team rosters
pub mod roster;
/// Pure turn-order arithmetic
pub mod sequencer;
/// Session lifecycle and pick cursor
pub mod session;

/// Identifier of a participating team.
pub type TeamId = i64;
/// Identifier of a season (league year).
pub type SeasonId = i64;
/// Identifier of a draft session.
pub type SessionId = i64;
