//! # Core Module
//!
//! Fundamental building blocks for conformer deduplication: the molecular
//! data model and the pure numeric primitives everything else is built on.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, conformers, and the
//!   bond/angle index types that define the descriptor space
//! - **Numeric Primitives** ([`utils`]) - Covalent-radius lookup and
//!   squared-distance/angle geometry

pub mod models;
pub mod utils;
