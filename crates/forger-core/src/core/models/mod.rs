//! Data structures for atoms, residues, and complete structures.

pub mod atom;
pub mod residue;
pub mod structure;

pub use atom::Atom;
pub use residue::{Residue, ResidueKind};
pub use structure::Structure;
