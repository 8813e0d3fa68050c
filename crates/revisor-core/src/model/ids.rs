//! Identifier types for revisions and the instances they track

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary key strategy for the revision table, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryKeyStrategy {
    /// Auto-incrementing integer assigned by the store
    #[default]
    Integer,
    /// Random unique token generated by the capture hook
    Token,
}

impl PrimaryKeyStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimaryKeyStrategy::Integer => "integer",
            PrimaryKeyStrategy::Token => "token",
        }
    }
}

/// Primary key type of the tracked entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceIdType {
    #[default]
    Integer,
    Token,
}

impl InstanceIdType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceIdType::Integer => "integer",
            InstanceIdType::Token => "token",
        }
    }

    /// Parse a textual id (CLI input, entity table keys) as this type
    pub fn parse(&self, raw: &str) -> Option<InstanceId> {
        match self {
            InstanceIdType::Integer => raw.parse::<i64>().ok().map(InstanceId::Integer),
            InstanceIdType::Token if !raw.is_empty() => Some(InstanceId::Token(raw.to_string())),
            InstanceIdType::Token => None,
        }
    }
}

/// Identifier of a tracked entity instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InstanceId {
    Integer(i64),
    Token(String),
}

impl InstanceId {
    pub fn id_type(&self) -> InstanceIdType {
        match self {
            InstanceId::Integer(_) => InstanceIdType::Integer,
            InstanceId::Token(_) => InstanceIdType::Token,
        }
    }
}

impl From<i64> for InstanceId {
    fn from(value: i64) -> Self {
        InstanceId::Integer(value)
    }
}

impl From<&str> for InstanceId {
    fn from(value: &str) -> Self {
        InstanceId::Token(value.to_string())
    }
}

impl From<String> for InstanceId {
    fn from(value: String) -> Self {
        InstanceId::Token(value)
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceId::Integer(v) => write!(f, "{}", v),
            InstanceId::Token(v) => write!(f, "{}", v),
        }
    }
}

/// Identifier of a revision row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RevisionId {
    Integer(i64),
    Token(String),
}

impl RevisionId {
    pub fn strategy(&self) -> PrimaryKeyStrategy {
        match self {
            RevisionId::Integer(_) => PrimaryKeyStrategy::Integer,
            RevisionId::Token(_) => PrimaryKeyStrategy::Token,
        }
    }

    /// Parse a textual revision id according to the table's strategy
    pub fn parse(strategy: PrimaryKeyStrategy, raw: &str) -> Option<RevisionId> {
        match strategy {
            PrimaryKeyStrategy::Integer => raw.parse::<i64>().ok().map(RevisionId::Integer),
            PrimaryKeyStrategy::Token if !raw.is_empty() => {
                Some(RevisionId::Token(raw.to_string()))
            }
            PrimaryKeyStrategy::Token => None,
        }
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevisionId::Integer(v) => write!(f, "{}", v),
            RevisionId::Token(v) => write!(f, "{}", v),
        }
    }
}
