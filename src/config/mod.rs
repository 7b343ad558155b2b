/// Application settings loaded from config.toml
pub mod app;

/// Database configuration and connection management
pub mod database;

/// First-run seeding of the owner and jars
pub mod seed;
