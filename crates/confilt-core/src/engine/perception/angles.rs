use std::collections::HashSet;

use tracing::{debug, instrument};

use super::bonds::BondPerception;
use crate::core::models::indices::{AngleIndex, BondIndex, Fragment};

/// Angle enumeration over a conformer's perceived bond graph.
///
/// All triples are canonical (`i <= k`, center in the middle). Combinatorial
/// lists emit the three centered variants of each atom triple.
#[derive(Debug, Clone, Default)]
pub struct AnglePerception {
    /// Every centered triple over all atoms.
    pub all_angles: Vec<AngleIndex>,
    /// Angles realized by the bond graph: two bonds sharing a center atom.
    pub angles: Vec<AngleIndex>,
    /// All triples not realized by the bond graph.
    pub non_angles: Vec<AngleIndex>,
    /// Centered triples drawn entirely from a single fragment.
    pub fragment_all_angles: Vec<AngleIndex>,
    /// Intra-fragment triples not realized by the fragment's bonds.
    pub fragment_non_angles: Vec<AngleIndex>,
    /// Triples with two atoms in one fragment and one in a later fragment.
    pub cross_pair_non_angles: Vec<AngleIndex>,
    /// Triples spanning three distinct fragments.
    pub cross_triple_non_angles: Vec<AngleIndex>,
}

impl AnglePerception {
    /// Enumerates angle triples from the bond perception of a conformer with
    /// `atom_count` atoms. Fewer than three atoms yields an empty perception.
    #[instrument(skip_all, fields(atoms = atom_count))]
    pub fn perceive(atom_count: usize, bonds: &BondPerception) -> Self {
        if atom_count < 3 {
            return Self::default();
        }

        let mut perception = Self::default();
        let everyone: Vec<usize> = (0..atom_count).collect();
        perception.all_angles = combinatorial_angles(&everyone);
        perception.angles = angles_from_bonds(&bonds.bonded);

        let realized: HashSet<AngleIndex> = perception.angles.iter().copied().collect();
        perception.non_angles = perception
            .all_angles
            .iter()
            .copied()
            .filter(|angle| !realized.contains(angle))
            .collect();

        for fragment in &bonds.fragments {
            let fragment_angles = combinatorial_angles(fragment);
            let members: HashSet<usize> = fragment.iter().copied().collect();
            let fragment_bonds: Vec<BondIndex> = bonds
                .bonded
                .iter()
                .copied()
                .filter(|bond| members.contains(&bond.i) && members.contains(&bond.j))
                .collect();
            let fragment_realized: HashSet<AngleIndex> =
                angles_from_bonds(&fragment_bonds).into_iter().collect();
            perception.fragment_non_angles.extend(
                fragment_angles
                    .iter()
                    .copied()
                    .filter(|angle| !fragment_realized.contains(angle)),
            );
            perception.fragment_all_angles.extend(fragment_angles);
        }

        perception.enumerate_cross_fragment(&bonds.fragments);

        debug!(
            angles = perception.angles.len(),
            non_angles = perception.non_angles.len(),
            "Angle perception complete"
        );
        perception
    }

    fn enumerate_cross_fragment(&mut self, fragments: &[Fragment]) {
        // Two atoms from one fragment, one from any later fragment.
        for (pos, left) in fragments.iter().enumerate() {
            if left.len() < 2 {
                continue;
            }
            for right in &fragments[pos + 1..] {
                for (s, &ai) in left.iter().enumerate() {
                    for &aj in &left[s + 1..] {
                        for &ak in right {
                            self.cross_pair_non_angles.extend(centered_variants(ai, aj, ak));
                        }
                    }
                }
            }
        }

        // One atom from each of three distinct fragments.
        for (pos_i, frag_i) in fragments.iter().enumerate() {
            for (pos_j, frag_j) in fragments.iter().enumerate().skip(pos_i + 1) {
                for frag_k in &fragments[pos_j + 1..] {
                    for &ai in frag_i {
                        for &aj in frag_j {
                            for &ak in frag_k {
                                self.cross_triple_non_angles
                                    .extend(centered_variants(ai, aj, ak));
                            }
                        }
                    }
                }
            }
        }
    }
}

/// The three centered variants of one atom triple.
#[inline]
fn centered_variants(a: usize, b: usize, c: usize) -> [AngleIndex; 3] {
    [
        AngleIndex::new(b, a, c),
        AngleIndex::new(a, b, c),
        AngleIndex::new(a, c, b),
    ]
}

/// Every centered triple over `members` (each unordered triple contributes
/// its three center choices).
fn combinatorial_angles(members: &[usize]) -> Vec<AngleIndex> {
    if members.len() < 3 {
        return Vec::new();
    }
    let mut angles = Vec::new();
    for (s, &a) in members.iter().enumerate() {
        for (t, &b) in members.iter().enumerate().skip(s + 1) {
            for &c in &members[t + 1..] {
                angles.extend(centered_variants(a, b, c));
            }
        }
    }
    angles
}

/// Angles realized by pairs of bonds sharing an atom; the shared atom is the
/// center. Deduplicated, insertion order preserved.
fn angles_from_bonds(bonds: &[BondIndex]) -> Vec<AngleIndex> {
    if bonds.len() < 2 {
        return Vec::new();
    }
    let mut seen = HashSet::new();
    let mut angles = Vec::new();
    for (pos, left) in bonds.iter().enumerate() {
        for right in bonds.iter().take(pos).chain(bonds.iter().skip(pos + 1)) {
            for center in [left.i, left.j] {
                let (Some(a), Some(b)) = (left.other(center), right.other(center))
                else {
                    continue;
                };
                let angle = AngleIndex::new(a, center, b);
                if seen.insert(angle) {
                    angles.push(angle);
                }
            }
        }
    }
    angles
}
