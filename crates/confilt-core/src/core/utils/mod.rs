//! Numeric primitives for perception and filtering: element-radius lookup
//! and the squared-distance/angle geometry helpers.

pub mod elements;
pub mod geometry;
