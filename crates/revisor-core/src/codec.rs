//! Snapshot body codec
//!
//! The revision body is a structured JSON value. How it reaches the column
//! is a storage strategy chosen once, at configuration time:
//!
//! - `Native`: the backing column holds structured JSON itself; encode and
//!   decode are identity operations.
//! - `Serialized`: the column holds text; encode produces canonical JSON
//!   text and decode is its exact inverse.
//!
//! Callers never see the stored form; the store applies the codec at its
//! boundary.

use crate::errors::{ExError, Result, RevisionError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Debug;

/// How revision bodies are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyStorage {
    /// Structured JSON column
    Native,
    /// JSON text column
    #[default]
    Serialized,
}

/// Body in its storable form
#[derive(Debug, Clone, PartialEq)]
pub enum StoredBody {
    Native(Value),
    Text(String),
}

/// Converts structured bodies to and from their stored form
pub trait BodyCodec: Send + Sync + Debug {
    /// The strategy this codec implements
    fn storage(&self) -> BodyStorage;

    /// Turn a structured body into its storable form
    ///
    /// # Errors
    ///
    /// - `Serialization` if the body has no serialized representation
    fn encode(&self, body: &Value) -> Result<StoredBody>;

    /// Turn a stored body back into a structured value
    ///
    /// # Errors
    ///
    /// - `Serialization` if stored text is not well-formed JSON
    fn decode(&self, stored: StoredBody) -> Result<Value>;
}

/// Identity codec for structured columns
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCodec;

impl BodyCodec for NativeCodec {
    fn storage(&self) -> BodyStorage {
        BodyStorage::Native
    }

    fn encode(&self, body: &Value) -> Result<StoredBody> {
        Ok(StoredBody::Native(body.clone()))
    }

    fn decode(&self, stored: StoredBody) -> Result<Value> {
        match stored {
            StoredBody::Native(value) => Ok(value),
            StoredBody::Text(text) => parse_text(&text),
        }
    }
}

/// Canonical JSON text codec for text columns
#[derive(Debug, Clone, Copy, Default)]
pub struct SerializedCodec;

impl BodyCodec for SerializedCodec {
    fn storage(&self) -> BodyStorage {
        BodyStorage::Serialized
    }

    fn encode(&self, body: &Value) -> Result<StoredBody> {
        serde_json::to_string(body)
            .map(StoredBody::Text)
            .map_err(|e| encode_error(e.to_string()))
    }

    fn decode(&self, stored: StoredBody) -> Result<Value> {
        match stored {
            StoredBody::Text(text) => parse_text(&text),
            StoredBody::Native(value) => Ok(value),
        }
    }
}

/// Select the codec for a storage strategy
pub fn codec_for(storage: BodyStorage) -> Box<dyn BodyCodec> {
    match storage {
        BodyStorage::Native => Box::new(NativeCodec),
        BodyStorage::Serialized => Box::new(SerializedCodec),
    }
}

/// Capture any serializable value as a structured body
///
/// # Errors
///
/// - `Serialization` when the value cannot be represented as JSON
///   (e.g. a map with non-string keys, or a failing `Serialize` impl)
pub fn encode_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| encode_error(e.to_string()))
}

fn parse_text(text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|e| {
        ExError::from(RevisionError::Decode {
            reason: e.to_string(),
        })
        .with_op("body_decode")
    })
}

fn encode_error(reason: String) -> ExError {
    ExError::from(RevisionError::Encode { reason }).with_op("body_encode")
}
