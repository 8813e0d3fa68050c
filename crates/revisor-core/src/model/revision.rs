//! Revision records

use crate::model::ids::{InstanceId, RevisionId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// A revision about to be inserted
///
/// `id` and `created_at` are normally left empty and assigned by the store.
/// Under the token primary key strategy the capture hook fills `id` itself.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRevision {
    pub id: Option<RevisionId>,
    pub instance_type: String,
    pub instance_id: InstanceId,
    pub body: Value,
    pub created_at: Option<DateTime<Utc>>,
}

impl NewRevision {
    pub fn new(instance_type: impl Into<String>, instance_id: InstanceId, body: Value) -> Self {
        Self {
            id: None,
            instance_type: instance_type.into(),
            instance_id,
            body,
            created_at: None,
        }
    }

    pub fn with_id(mut self, id: RevisionId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// A persisted revision with every column present
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Revision {
    pub id: RevisionId,
    pub instance_type: String,
    pub instance_id: InstanceId,
    pub body: Value,
    pub created_at: DateTime<Utc>,
}

/// A revision as returned by a projected query
///
/// `id` and `created_at` are always selected; the other columns are present
/// only when the projection asked for them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedRevision {
    pub id: RevisionId,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<InstanceId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl ProjectedRevision {
    /// Convert into a full record, if every column was selected
    pub fn into_revision(self) -> Option<Revision> {
        Some(Revision {
            id: self.id,
            instance_type: self.instance_type?,
            instance_id: self.instance_id?,
            body: self.body?,
            created_at: self.created_at,
        })
    }
}

impl From<Revision> for ProjectedRevision {
    fn from(revision: Revision) -> Self {
        Self {
            id: revision.id,
            created_at: revision.created_at,
            instance_type: Some(revision.instance_type),
            instance_id: Some(revision.instance_id),
            body: Some(revision.body),
        }
    }
}
