//! # Workflows Module
//!
//! High-level orchestration of the engine: connectivity resolution,
//! descriptor computation, filtering, and diagnostics as one call.

pub mod dedup;
