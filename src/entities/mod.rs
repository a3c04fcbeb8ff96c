//! Entity module - Contains all SeaORM entity definitions for the draft store.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod draft_budget;
pub mod draft_pool;
pub mod draft_session;
pub mod roster_entry;

// Re-export specific types to avoid conflicts
pub use draft_budget::{
    Column as DraftBudgetColumn, Entity as DraftBudget, Model as DraftBudgetModel,
};
pub use draft_pool::{Column as DraftPoolColumn, Entity as DraftPool, Model as DraftPoolModel};
pub use draft_session::{
    Column as DraftSessionColumn, Entity as DraftSession, Model as DraftSessionModel,
};
pub use roster_entry::{
    Column as RosterEntryColumn, Entity as RosterEntry, Model as RosterEntryModel,
};
