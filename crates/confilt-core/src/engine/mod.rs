//! # Engine Module
//!
//! The algorithmic core of the library: geometric perception of molecular
//! connectivity and the tolerance-driven conformer filtration policies.
//!
//! ## Architecture
//!
//! - **Perception** ([`perception`]) - Bond classification, fragment
//!   partitioning, and bond-angle enumeration from a reference conformer
//! - **Descriptors** ([`descriptors`]) - Per-conformer bond/angle value
//!   vectors and the scalar totals the filter sorts by
//! - **Filtering** ([`filter`]) - The three removal policies (dynamic/all,
//!   dynamic/separate, static binning) with keep-list protection
//! - **Diagnostics** ([`histogram`]) - Probability histograms of descriptor
//!   distributions before and after filtering
//! - **Configuration** ([`config`]) - The explicit filter configuration and
//!   its builder
//! - **Error Handling** ([`error`]) - Engine-specific error types

pub mod config;
pub mod descriptors;
pub mod error;
pub mod filter;
pub mod histogram;
pub mod perception;
