//! # Database Configuration
//!
//! Loaded once at startup, usually from a TOML file:
//!
//! ```toml
//! initial_group_capacity = 256
//! expected_groups = 16
//! trace_structural_changes = true
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{DbError, DbResult};

/// Configuration for the entities database.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DbConfig {
    /// Records reserved when a group first receives a component type.
    pub initial_group_capacity: usize,
    /// Group slots reserved per component type.
    pub expected_groups: usize,
    /// Emit a `trace` event for every structural change.
    pub trace_structural_changes: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            initial_group_capacity: 64,
            expected_groups: 8,
            trace_structural_changes: false,
        }
    }
}

impl DbConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// Missing keys fall back to [`DbConfig::default`].
    ///
    /// # Errors
    ///
    /// [`DbError::InvalidConfig`] on malformed TOML, unknown keys, or
    /// out-of-range values.
    pub fn from_toml_str(text: &str) -> DbResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| DbError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// [`DbError::InvalidConfig`] if the file cannot be read or its contents
    /// are rejected.
    pub fn from_toml_file(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            DbError::InvalidConfig(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`DbError::InvalidConfig`] if `initial_group_capacity` is zero or
    /// above `u32::MAX`.
    pub fn validate(&self) -> DbResult<()> {
        if self.initial_group_capacity == 0 {
            return Err(DbError::InvalidConfig(
                "initial_group_capacity must be greater than zero".to_string(),
            ));
        }
        if u32::try_from(self.initial_group_capacity).is_err() {
            return Err(DbError::InvalidConfig(
                "initial_group_capacity cannot exceed u32::MAX".to_string(),
            ));
        }
        Ok(())
    }
}
