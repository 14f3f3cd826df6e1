use thiserror::Error;

use super::config::ConfigError;
use super::perception::bonds::PerceptionError;
use crate::core::utils::geometry::GeometryError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Perception failed: {source}")]
    Perception {
        #[from]
        source: PerceptionError,
    },

    #[error(
        "Invalid bond index at list position {position}: ({i}, {j}) for {atom_count} atoms"
    )]
    InvalidBondIndex {
        position: usize,
        i: usize,
        j: usize,
        atom_count: usize,
    },

    #[error(
        "Invalid angle index at list position {position}: ({i}, {j}, {k}) for {atom_count} atoms"
    )]
    InvalidAngleIndex {
        position: usize,
        i: usize,
        j: usize,
        k: usize,
        atom_count: usize,
    },

    #[error("Conformer {conformer}: angle ({i}, {j}, {k}): {source}")]
    DegenerateAngle {
        conformer: usize,
        i: usize,
        j: usize,
        k: usize,
        source: GeometryError,
    },

    #[error("Keep-list index {index} out of range for population of {population}")]
    KeepIndexOutOfRange { index: usize, population: usize },

    #[error("Invalid filter configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },
}
