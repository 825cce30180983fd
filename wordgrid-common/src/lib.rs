//! # Wordgrid Common Library
//!
//! Shared code for the wordgrid crates:
//! - Error type and result alias
//! - TOML bootstrap configuration loading
//! - Tracing subscriber initialization

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
