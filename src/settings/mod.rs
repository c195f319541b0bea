//! Settings module for err_x509
//!
//! This module contains the fixer configuration and its loaders

pub mod config;

// Re-export settings struct and errors
pub use config::{Settings, SettingsError};
