//! Core types shared across Revisor facilities
//!
//! This crate provides the canonical field keys and event names used by the
//! logging facility and by anything that emits structured events about
//! revisions.

pub mod schema;
