/// Database configuration and connection management
pub mod database;

/// Draft defaults and pool seeding from draft.toml
pub mod draft;
