#![allow(clippy::unwrap_used, clippy::expect_used)]

use revisor_core::errors::{ExError, ExErrorKind};
use revisor_core::logging_facility::test_capture::init_test_capture;
use revisor_core::{log_op_end, log_op_error, log_op_start};
use revisor_core_types::schema::{
    EVENT_END, EVENT_END_ERROR, EVENT_START, FIELD_DURATION_MS, FIELD_ERR_CODE,
};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name, instance_type = "Post");

    let events = capture.events_for(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event.as_deref(), Some(EVENT_START));
    assert_eq!(events[0].field("instance_type"), Some("Post"));
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let events = capture.events_for(op_name);
    assert_eq!(events.len(), 1, "Should have exactly one end event");
    assert_eq!(events[0].event.as_deref(), Some(EVENT_END));
    assert_eq!(events[0].field(FIELD_DURATION_MS), Some("42"));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = ExError::new(ExErrorKind::ConstraintViolation).with_message("rejected");
    log_op_error!(op_name, err, duration_ms = 10);

    let events = capture.events_for(op_name);
    assert_eq!(events.len(), 1, "Should have exactly one error event");
    assert_eq!(events[0].event.as_deref(), Some(EVENT_END_ERROR));
    assert_eq!(
        events[0].field(FIELD_ERR_CODE),
        Some("ERR_CONSTRAINT_VIOLATION")
    );
    assert_eq!(events[0].level, tracing::Level::ERROR);
}

#[test]
fn test_single_start_and_end_per_operation() {
    let capture = init_test_capture();
    let op_name = "test_boundary_unique_4";

    log_op_start!(op_name, instance_type = "Comment");
    log_op_end!(op_name, duration_ms = 1, instance_type = "Comment");

    capture.assert_event_exists(op_name, EVENT_START);
    capture.assert_event_exists(op_name, EVENT_END);
    assert_eq!(
        capture
            .events_where(op_name, "instance_type", "Comment")
            .len(),
        2
    );
}
