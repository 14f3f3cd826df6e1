use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::error::EngineError;
use crate::core::models::atom::Conformer;
use crate::core::models::indices::{AngleIndex, BondIndex};
use crate::core::utils::geometry::{angle_degrees, distance_squared};

/// Per-conformer geometric descriptors over a shared connectivity.
///
/// Row `c` of each value table corresponds to conformer `c`; column order
/// follows the bond/angle lists the descriptors were computed from. Totals
/// are the row sums the filter sorts by.
#[derive(Debug, Clone, Default)]
pub struct Descriptors {
    /// Squared bond lengths in Angstrom^2, one row per conformer.
    pub bond_values: Vec<Vec<f64>>,
    /// Angles in degrees, one row per conformer.
    pub angle_values: Vec<Vec<f64>>,
    /// Sum of squared bond lengths per conformer.
    pub bond_totals: Vec<f64>,
    /// Sum of angles per conformer.
    pub angle_totals: Vec<f64>,
}

impl Descriptors {
    /// Number of conformers described.
    pub fn len(&self) -> usize {
        self.bond_totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bond_totals.is_empty()
    }

    /// Evaluates every bond and angle of the shared connectivity on every
    /// conformer of `population`.
    ///
    /// Index lists are validated against the first conformer's atom count
    /// up front; a degenerate angle (coincident atoms) in any conformer is
    /// an error naming the conformer and triple.
    #[instrument(skip_all, fields(
        population = population.len(),
        bonds = bonds.len(),
        angles = angles.len()
    ))]
    pub fn compute(
        population: &[Conformer],
        bonds: &[BondIndex],
        angles: &[AngleIndex],
    ) -> Result<Self, EngineError> {
        let Some(first) = population.first() else {
            return Ok(Self::default());
        };
        let atom_count = first.len();
        validate_bonds(bonds, atom_count)?;
        validate_angles(angles, atom_count)?;

        let evaluate = |(index, conformer): (usize, &Conformer)| {
            evaluate_conformer(index, conformer, bonds, angles)
        };

        #[cfg(feature = "parallel")]
        let rows: Vec<(Vec<f64>, Vec<f64>)> = population
            .par_iter()
            .enumerate()
            .map(evaluate)
            .collect::<Result<_, _>>()?;
        #[cfg(not(feature = "parallel"))]
        let rows: Vec<(Vec<f64>, Vec<f64>)> = population
            .iter()
            .enumerate()
            .map(evaluate)
            .collect::<Result<_, _>>()?;

        let mut descriptors = Self {
            bond_values: Vec::with_capacity(rows.len()),
            angle_values: Vec::with_capacity(rows.len()),
            bond_totals: Vec::with_capacity(rows.len()),
            angle_totals: Vec::with_capacity(rows.len()),
        };
        for (bond_row, angle_row) in rows {
            descriptors.bond_totals.push(bond_row.iter().sum());
            descriptors.angle_totals.push(angle_row.iter().sum());
            descriptors.bond_values.push(bond_row);
            descriptors.angle_values.push(angle_row);
        }

        debug!(conformers = descriptors.len(), "Descriptor computation complete");
        Ok(descriptors)
    }
}

fn validate_bonds(bonds: &[BondIndex], atom_count: usize) -> Result<(), EngineError> {
    for (position, bond) in bonds.iter().enumerate() {
        if bond.i == bond.j || bond.j >= atom_count {
            return Err(EngineError::InvalidBondIndex {
                position,
                i: bond.i,
                j: bond.j,
                atom_count,
            });
        }
    }
    Ok(())
}

fn validate_angles(angles: &[AngleIndex], atom_count: usize) -> Result<(), EngineError> {
    for (position, angle) in angles.iter().enumerate() {
        let distinct = angle.i != angle.j && angle.j != angle.k && angle.i != angle.k;
        if !distinct || angle.i.max(angle.j).max(angle.k) >= atom_count {
            return Err(EngineError::InvalidAngleIndex {
                position,
                i: angle.i,
                j: angle.j,
                k: angle.k,
                atom_count,
            });
        }
    }
    Ok(())
}

fn evaluate_conformer(
    index: usize,
    conformer: &Conformer,
    bonds: &[BondIndex],
    angles: &[AngleIndex],
) -> Result<(Vec<f64>, Vec<f64>), EngineError> {
    let atoms = conformer.atoms();
    let bond_row = bonds
        .iter()
        .map(|bond| distance_squared(&atoms[bond.i].position, &atoms[bond.j].position))
        .collect();
    let mut angle_row = Vec::with_capacity(angles.len());
    for angle in angles {
        let value = angle_degrees(
            &atoms[angle.j].position,
            &atoms[angle.i].position,
            &atoms[angle.k].position,
        )
        .map_err(|source| EngineError::DegenerateAngle {
            conformer: index,
            i: angle.i,
            j: angle.j,
            k: angle.k,
            source,
        })?;
        angle_row.push(value);
    }
    Ok((bond_row, angle_row))
}
