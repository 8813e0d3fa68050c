//! Tracked entity boundary
//!
//! Whatever framework persists the primary entities exposes them to the
//! revisioning layer through this trait: the instance's own id, and its
//! plain field values as a structured value.

use crate::codec::encode_value;
use crate::errors::{ExError, Result, RevisionError};
use crate::model::ids::InstanceId;
use serde::Serialize;
use serde_json::Value;

/// A domain object whose saves and deletes are observed to produce revisions
pub trait Entity: Serialize {
    /// The instance's own primary key
    fn instance_id(&self) -> InstanceId;

    /// Plain field values, in declaration order
    ///
    /// # Errors
    ///
    /// - `Serialization` if the value has no JSON representation, or is not
    ///   an object
    fn plain_values(&self) -> Result<Value> {
        let value = encode_value(self)?;
        if value.is_object() {
            Ok(value)
        } else {
            Err(ExError::from(RevisionError::BodyNotObject {
                instance_type: std::any::type_name::<Self>().to_string(),
            })
            .with_op("plain_values"))
        }
    }
}

/// Render the polymorphic key of an instance, e.g. `Post#1`
pub fn entity_key(instance_type: &str, instance_id: &InstanceId) -> String {
    format!("{}#{}", instance_type, instance_id)
}

/// Reject empty type tags before they reach storage
pub fn validate_type_tag(instance_type: &str) -> Result<()> {
    if instance_type.trim().is_empty() {
        return Err(ExError::from(RevisionError::EmptyInstanceType).with_op("validate_type_tag"));
    }
    Ok(())
}
