use nalgebra::Point3;

/// Represents a single atom: an element label and a 3D coordinate.
///
/// The label may be an element symbol (`"C"`, `"cl"`) or an atomic-number
/// string (`"6"`); resolution to a covalent radius happens at perception
/// time. Atoms are immutable value data once a conformer is constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Element symbol or atomic-number string, as read from the input.
    pub element: String,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
}

impl Atom {
    pub fn new(element: &str, position: Point3<f64>) -> Self {
        Self {
            element: element.to_string(),
            position,
        }
    }
}

/// One 3D coordinate snapshot of a fixed-topology molecule.
///
/// Every conformer in a population is expected to have the same atom count
/// and the same per-position element labels; the loader guarantees that
/// invariant and this core trusts it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Conformer {
    atoms: Vec<Atom>,
}

impl Conformer {
    pub fn new(atoms: Vec<Atom>) -> Self {
        Self { atoms }
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conformer_exposes_atoms_in_insertion_order() {
        let conformer = Conformer::new(vec![
            Atom::new("C", Point3::new(0.0, 0.0, 0.0)),
            Atom::new("H", Point3::new(1.0, 0.0, 0.0)),
        ]);
        assert_eq!(conformer.len(), 2);
        assert_eq!(conformer.atom(0).unwrap().element, "C");
        assert_eq!(conformer.atom(1).unwrap().element, "H");
        assert!(conformer.atom(2).is_none());
    }
}
