//! # Song Library Common
//!
//! Shared code for the song library services:
//! - Error type for bootstrap concerns
//! - TOML bootstrap configuration and logging setup
//! - SQLite pool bootstrap and catalog schema

pub mod config;
pub mod db;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
