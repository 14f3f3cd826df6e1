//! # Confilt Core Library
//!
//! A modernized, high-performance library for deduplicating ensembles of
//! molecular conformers produced by Monte-Carlo and free-energy simulation
//! software, removing snapshots that differ only by simulation noise.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a
//! clear separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models (`Atom`,
//!   `Conformer`, bond/angle index types), the covalent-radius tables, and the
//!   pure geometric primitives (squared distances, bond angles).
//!
//! - **[`engine`]: The Logic Core.** Implements geometric bond and angle
//!   perception, per-conformer descriptor computation, the three
//!   tolerance-driven removal policies, and the probability-histogram
//!   diagnostics.
//!
//! - **[`workflows`]: The Public API.** This is the highest-level, user-facing
//!   layer. It ties perception and filtering together into complete
//!   deduplication runs, including filtering a population against an external
//!   reference set.

pub mod core;
pub mod engine;
pub mod workflows;
