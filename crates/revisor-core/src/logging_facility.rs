//! Structured logging facility for Revisor
//!
//! This module provides:
//! - Single initialization point via `init(profile)`
//! - Structured boundary macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! # Usage
//!
//! ```rust
//! use revisor_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```
//!
//! The engine layer owns `start`/`end`/`end_error` events for capture,
//! retention and history operations. The store layer only emits
//! `tracing::debug!` details.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
