use super::atom::Atom;
use super::residue::{Residue, ResidueKind};

/// A complete structure: an ordered list of residues with their atoms.
///
/// Residue order is file order, which the writer preserves so that repeated
/// runs over the same input produce byte-identical output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure {
    residues: Vec<Residue>,
}

impl Structure {
    /// Creates a new, empty structure.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a structure from an already-ordered list of residues.
    pub fn from_residues(residues: Vec<Residue>) -> Self {
        Self { residues }
    }

    /// Appends a residue at the end of the structure.
    pub fn push_residue(&mut self, residue: Residue) {
        self.residues.push(residue);
    }

    /// Returns an iterator over all residues in order.
    pub fn residues(&self) -> impl Iterator<Item = &Residue> {
        self.residues.iter()
    }

    /// Returns an iterator over `(residue, atom)` pairs in file order.
    pub fn atoms(&self) -> impl Iterator<Item = (&Residue, &Atom)> {
        self.residues
            .iter()
            .flat_map(|res| res.atoms.iter().map(move |atom| (res, atom)))
    }

    /// Total number of atoms across all residues.
    pub fn atom_count(&self) -> usize {
        self.residues.iter().map(|r| r.atoms.len()).sum()
    }

    /// Number of residues.
    pub fn residue_count(&self) -> usize {
        self.residues.len()
    }

    /// Returns true if the structure holds no atoms at all.
    pub fn is_empty(&self) -> bool {
        self.atom_count() == 0
    }

    /// Returns true if any residue is an explicit water molecule.
    pub fn contains_water(&self) -> bool {
        self.residues.iter().any(|r| r.kind == ResidueKind::Water)
    }

    /// Removes every heterogen residue (water, ions, ligands), keeping only
    /// protein residues. When `keep_water` is set, water residues survive.
    ///
    /// The minimization workflow always calls this with `keep_water = false`:
    /// discarding crystallographic and added solvent water is a fixed policy
    /// of the clean output, not a user option.
    pub fn strip_heterogens(&mut self, keep_water: bool) {
        self.residues.retain(|res| {
            !res.kind.is_heterogen() || (keep_water && res.kind == ResidueKind::Water)
        });
    }
}
