//! Shared types, error model, and configuration for champscout.
//!
//! This crate is the foundation depended on by all other champscout crates.
//! It provides:
//! - [`ScoutError`]: the unified error type
//! - Record types ([`ChampionRecord`], [`MasteryRecord`]) and identifiers ([`RiotId`], [`Locale`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, FetchConfig, MarkersConfig, SelectorsConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, write_default_config,
};
pub use error::{Result, ScoutError};
pub use types::{
    ChampionRecord, DEFAULT_TOP_N, Locale, MasteryRecord, PLACEHOLDER, RiotId, UNKNOWN_NAME,
};
