use std::collections::VecDeque;

use thiserror::Error;
use tracing::{debug, instrument};

use crate::core::models::atom::Conformer;
use crate::core::models::indices::{BondIndex, Fragment};
use crate::core::utils::elements::{ElementError, RadiusTable};
use crate::core::utils::geometry::distance_squared;

/// Lower squared-distance cutoff (0.8 Angstrom squared): pairs closer than
/// this are overlapping artifacts, never bonds.
const MIN_BOND_DISTANCE_SQ: f64 = 0.64;

/// Additive slack on the covalent-radius sum in the upper cutoff.
const RADIUS_SUM_MARGIN: f64 = 0.4;

#[derive(Debug, Error)]
pub enum PerceptionError {
    #[error("Atom {index}: {source}")]
    UnknownElement { index: usize, source: ElementError },
}

/// Pairwise bond classification of a single conformer plus its partition
/// into connected fragments.
///
/// All pair lists hold canonical `i <= j` indices, ordered lexicographically
/// within each enumeration group.
#[derive(Debug, Clone, Default)]
pub struct BondPerception {
    /// Every unordered atom pair.
    pub all_pairs: Vec<BondIndex>,
    /// Pairs classified as bonded.
    pub bonded: Vec<BondIndex>,
    /// Pairs classified as non-bonded.
    pub non_bonded: Vec<BondIndex>,
    /// Connected components of the bond graph; members sorted ascending,
    /// bonded fragments in discovery order, then singletons ascending.
    pub fragments: Vec<Fragment>,
    /// Every pair with both atoms in the same fragment.
    pub fragment_all_pairs: Vec<BondIndex>,
    /// Non-bonded pairs with both atoms in the same fragment.
    pub fragment_non_bonded: Vec<BondIndex>,
    /// Pairs spanning two different fragments (all non-bonded by
    /// construction).
    pub cross_non_bonded: Vec<BondIndex>,
}

impl BondPerception {
    /// Classifies every atom pair of `conformer` with the distance rule
    /// `0.64 <= d^2 <= (r_i + r_j + 0.4)^2` and partitions the atoms into
    /// fragments by breadth-first traversal of the bond graph.
    ///
    /// A conformer with fewer than two atoms yields an empty perception.
    #[instrument(skip_all, fields(atoms = conformer.len()))]
    pub fn perceive(
        conformer: &Conformer,
        radii: &RadiusTable,
    ) -> Result<Self, PerceptionError> {
        let n = conformer.len();
        if n < 2 {
            return Ok(Self::default());
        }

        let mut atom_radii = Vec::with_capacity(n);
        for (index, atom) in conformer.atoms().iter().enumerate() {
            let radius = radii
                .radius(&atom.element)
                .map_err(|source| PerceptionError::UnknownElement { index, source })?;
            atom_radii.push(radius);
        }

        let mut perception = Self::default();
        let indices: Vec<usize> = (0..n).collect();
        classify_pairs(
            conformer,
            &atom_radii,
            &indices,
            &mut perception.all_pairs,
            &mut perception.bonded,
            &mut perception.non_bonded,
        );

        perception.fragments = connected_fragments(n, &perception.bonded);

        for fragment in &perception.fragments {
            if fragment.len() < 2 {
                continue;
            }
            let mut bonded_scratch = Vec::new();
            classify_pairs(
                conformer,
                &atom_radii,
                fragment,
                &mut perception.fragment_all_pairs,
                &mut bonded_scratch,
                &mut perception.fragment_non_bonded,
            );
        }

        for (pos, left) in perception.fragments.iter().enumerate() {
            for right in &perception.fragments[pos + 1..] {
                for &i in left {
                    for &j in right {
                        perception.cross_non_bonded.push(BondIndex::new(i, j));
                    }
                }
            }
        }

        debug!(
            bonded = perception.bonded.len(),
            non_bonded = perception.non_bonded.len(),
            fragments = perception.fragments.len(),
            "Bond perception complete"
        );
        Ok(perception)
    }
}

/// Classifies every unordered pair drawn from `members` (ascending indices).
fn classify_pairs(
    conformer: &Conformer,
    atom_radii: &[f64],
    members: &[usize],
    all_pairs: &mut Vec<BondIndex>,
    bonded: &mut Vec<BondIndex>,
    non_bonded: &mut Vec<BondIndex>,
) {
    let atoms = conformer.atoms();
    for (pos, &i) in members.iter().enumerate() {
        for &j in &members[pos + 1..] {
            let pair = BondIndex::new(i, j);
            all_pairs.push(pair);
            let d_sq = distance_squared(&atoms[i].position, &atoms[j].position);
            let reach = atom_radii[i] + atom_radii[j] + RADIUS_SUM_MARGIN;
            if d_sq >= MIN_BOND_DISTANCE_SQ && d_sq <= reach * reach {
                bonded.push(pair);
            } else {
                non_bonded.push(pair);
            }
        }
    }
}

/// Connected components of the bond graph. Bonded components come first in
/// the order their lowest atom is reached, then isolated atoms ascending.
fn connected_fragments(atom_count: usize, bonded: &[BondIndex]) -> Vec<Fragment> {
    let mut adjacency = vec![Vec::new(); atom_count];
    for bond in bonded {
        adjacency[bond.i].push(bond.j);
        adjacency[bond.j].push(bond.i);
    }

    let mut visited = vec![false; atom_count];
    let mut fragments = Vec::new();
    for start in 0..atom_count {
        if visited[start] || adjacency[start].is_empty() {
            continue;
        }
        let mut members = Vec::new();
        let mut queue = VecDeque::from([start]);
        visited[start] = true;
        while let Some(atom) = queue.pop_front() {
            members.push(atom);
            for &next in &adjacency[atom] {
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }
        members.sort_unstable();
        fragments.push(members);
    }
    for atom in 0..atom_count {
        if !visited[atom] {
            fragments.push(vec![atom]);
        }
    }
    fragments
}
