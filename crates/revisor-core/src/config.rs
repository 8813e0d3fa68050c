//! Revisioner configuration
//!
//! Every choice here is made once, when the revision table is created, and
//! stays fixed for the lifetime of that table.

use crate::codec::BodyStorage;
use crate::errors::{ExError, Result, RevisionError};
use crate::model::{InstanceIdType, PrimaryKeyStrategy};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TABLE_NAME: &str = "revisions";

/// Configuration surface of the revision table and its hooks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RevisionerConfig {
    /// Name of the shared revision table
    pub table_name: String,
    pub primary_key: PrimaryKeyStrategy,
    pub instance_id_type: InstanceIdType,
    pub body_storage: BodyStorage,
    /// Whether `enable` installs the retention hook unless told otherwise
    pub install_retention_hook: bool,
}

impl Default for RevisionerConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            primary_key: PrimaryKeyStrategy::default(),
            instance_id_type: InstanceIdType::default(),
            body_storage: BodyStorage::default(),
            install_retention_hook: true,
        }
    }
}

impl RevisionerConfig {
    pub fn with_table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = name.into();
        self
    }

    pub fn with_primary_key(mut self, strategy: PrimaryKeyStrategy) -> Self {
        self.primary_key = strategy;
        self
    }

    pub fn with_instance_id_type(mut self, id_type: InstanceIdType) -> Self {
        self.instance_id_type = id_type;
        self
    }

    pub fn with_body_storage(mut self, storage: BodyStorage) -> Self {
        self.body_storage = storage;
        self
    }

    pub fn with_retention_hook(mut self, install: bool) -> Self {
        self.install_retention_hook = install;
        self
    }

    /// Parse a YAML document; absent keys take their defaults
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for malformed YAML, unknown keys, or an invalid table name
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let config: RevisionerConfig = serde_yaml::from_str(source).map_err(|e| {
            ExError::from(RevisionError::InvalidConfig {
                reason: e.to_string(),
            })
            .with_op("config_parse")
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML configuration file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            ExError::from(RevisionError::InvalidConfig {
                reason: format!("{}: {}", path.display(), e),
            })
            .with_op("config_load")
        })?;
        Self::from_yaml_str(&source)
    }

    /// Check that the table name is safe to interpolate into SQL
    pub fn validate(&self) -> Result<()> {
        let mut chars = self.table_name.chars();
        let valid = match chars.next() {
            Some(first) if first.is_ascii_alphabetic() || first == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        };
        if !valid {
            return Err(ExError::from(RevisionError::InvalidTableName {
                name: self.table_name.clone(),
            })
            .with_op("config_validate"));
        }
        Ok(())
    }
}

/// Per-type options passed when tracking is enabled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackOptions {
    /// Override for `install_retention_hook`; `None` uses the config default
    pub retention: Option<bool>,
}

impl TrackOptions {
    pub fn keep_history_on_delete() -> Self {
        Self {
            retention: Some(false),
        }
    }

    /// Resolve against the configuration default
    ///
    /// An explicit `Some(false)` always wins.
    pub fn installs_retention(&self, config: &RevisionerConfig) -> bool {
        self.retention.unwrap_or(config.install_retention_hook)
    }
}
