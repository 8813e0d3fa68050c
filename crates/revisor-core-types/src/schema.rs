//! Canonical schema constants for structured logging and events
//!
//! These constants keep log records consistent across the store, the hooks
//! and the history reader.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Revision identifiers
pub const FIELD_REVISION_ID: &str = "revision_id";
pub const FIELD_INSTANCE_TYPE: &str = "instance_type";
pub const FIELD_INSTANCE_ID: &str = "instance_id";

// Collection sizes
pub const FIELD_ROW_COUNT: &str = "row_count";
pub const FIELD_DELETED_COUNT: &str = "deleted_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
