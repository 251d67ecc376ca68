//! Common types and utilities for the arkinfer type inference engine.
//!
//! This crate provides foundational items used across all arkinfer crates:
//! - Reserved IR names (`names`) shared by the IR builder and the engine
//! - Centralized recursion limits (`limits`)
//! - Cycle/depth guards for recursive lookups (`recursion`)
//! - Diagnostics for unexpected shapes met during inference (`diagnostics`)
//! - Tracing subscriber setup (`tracing_config`)

// Reserved names for synthetic IR entities
pub mod names;

// Centralized limits and thresholds
pub mod limits;

// Recursion guards (cycle detection + depth limiting)
pub mod recursion;
pub use recursion::{DepthCounter, RecursionGuard, RecursionProfile, RecursionResult};

// Diagnostics reported by the inference passes
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory};

// Tracing setup driven by ARKINFER_LOG / ARKINFER_LOG_FORMAT
pub mod tracing_config;
