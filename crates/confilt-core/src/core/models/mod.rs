//! Data structures shared by perception and filtering.

pub mod atom;
pub mod indices;
