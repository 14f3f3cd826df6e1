/// An unordered pair of atom positions within a conformer, stored with
/// `i < j` so that the same pair never has two representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BondIndex {
    pub i: usize,
    pub j: usize,
}

impl BondIndex {
    /// Builds a canonical pair. `i == j` is not rejected here; descriptor
    /// computation validates indices against the conformer it runs on.
    pub fn new(i: usize, j: usize) -> Self {
        if i <= j { Self { i, j } } else { Self { i: j, j: i } }
    }

    pub fn contains(&self, atom: usize) -> bool {
        self.i == atom || self.j == atom
    }

    /// The atom paired with `atom`, if `atom` is one of the two members.
    pub fn other(&self, atom: usize) -> Option<usize> {
        if self.i == atom {
            Some(self.j)
        } else if self.j == atom {
            Some(self.i)
        } else {
            None
        }
    }
}

/// An ordered atom triple `(i, j, k)`: the angle centered at `j` between the
/// `j -> i` and `j -> k` directions. Canonicalized with `i < k` so each
/// geometric angle has exactly one representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AngleIndex {
    pub i: usize,
    pub j: usize,
    pub k: usize,
}

impl AngleIndex {
    pub fn new(i: usize, j: usize, k: usize) -> Self {
        if i <= k {
            Self { i, j, k }
        } else {
            Self { i: k, j, k: i }
        }
    }

    pub fn center(&self) -> usize {
        self.j
    }
}

/// A set of atom positions that are transitively bond-connected, sorted
/// ascending. Isolated atoms form singleton fragments.
pub type Fragment = Vec<usize>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bond_index_canonicalizes_pair_order() {
        assert_eq!(BondIndex::new(3, 1), BondIndex::new(1, 3));
        assert_eq!(BondIndex::new(3, 1).i, 1);
    }

    #[test]
    fn bond_index_reports_membership_and_partner() {
        let pair = BondIndex::new(2, 5);
        assert!(pair.contains(2));
        assert!(!pair.contains(4));
        assert_eq!(pair.other(2), Some(5));
        assert_eq!(pair.other(5), Some(2));
        assert_eq!(pair.other(3), None);
    }

    #[test]
    fn angle_index_canonicalizes_outer_atoms_and_keeps_center() {
        let angle = AngleIndex::new(4, 1, 2);
        assert_eq!(angle, AngleIndex::new(2, 1, 4));
        assert_eq!(angle.i, 2);
        assert_eq!(angle.center(), 1);
        assert_eq!(angle.k, 4);
    }
}
