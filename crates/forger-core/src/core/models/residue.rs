use super::atom::Atom;

/// The twenty standard amino acids plus common protonation-state and
/// disulfide variants emitted by repair tools.
const AMINO_ACID_NAMES: &[&str] = &[
    "ALA", "ARG", "ASN", "ASP", "CYS", "GLN", "GLU", "GLY", "HIS", "ILE", "LEU", "LYS", "MET",
    "PHE", "PRO", "SER", "THR", "TRP", "TYR", "VAL", "HID", "HIE", "HIP", "HSD", "HSE", "HSP",
    "CYX", "ASH", "GLH", "LYN",
];

/// Residue names used for explicit water by the common water models.
const WATER_NAMES: &[&str] = &["HOH", "WAT", "TIP", "TIP3", "SOL", "H2O"];

/// Residue names of monatomic ions added during solvation or present in
/// crystal structures.
const ION_NAMES: &[&str] = &[
    "NA", "CL", "K", "MG", "ZN", "CA", "MN", "FE", "CU", "BR", "IOD", "CS", "LI", "RB", "NA+",
    "CL-", "K+",
];

/// Classifies a residue by its role in the structure.
///
/// Everything that is not a standard amino acid is a heterogen; the finer
/// split matters because heterogen removal always discards water and ions
/// together with ligands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResidueKind {
    /// A standard protein residue (including protonation variants).
    AminoAcid,
    /// An explicit solvent water molecule.
    Water,
    /// A monatomic ion.
    Ion,
    /// Any other heterogen (ligands, cofactors, modified residues).
    Ligand,
}

impl ResidueKind {
    /// Classifies a three-letter PDB residue name.
    pub fn from_name(name: &str) -> Self {
        let name = name.trim().to_ascii_uppercase();
        if AMINO_ACID_NAMES.contains(&name.as_str()) {
            ResidueKind::AminoAcid
        } else if WATER_NAMES.contains(&name.as_str()) {
            ResidueKind::Water
        } else if ION_NAMES.contains(&name.as_str()) {
            ResidueKind::Ion
        } else {
            ResidueKind::Ligand
        }
    }

    /// Returns true for every non-protein residue kind.
    pub fn is_heterogen(&self) -> bool {
        !matches!(self, ResidueKind::AminoAcid)
    }
}

/// A residue: a named, numbered group of atoms on a chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    /// The three-letter residue name (e.g., "ALA", "HOH").
    pub name: String,
    /// The chain identifier this residue belongs to.
    pub chain_id: char,
    /// The residue sequence number from the source file.
    pub seq_number: isize,
    /// Insertion code, if any.
    pub insertion_code: Option<char>,
    /// Classification derived from the residue name.
    pub kind: ResidueKind,
    /// The atoms of this residue, in file order.
    pub atoms: Vec<Atom>,
}

impl Residue {
    /// Creates an empty residue; the kind is derived from the name.
    pub fn new(name: &str, chain_id: char, seq_number: isize) -> Self {
        Self {
            name: name.to_string(),
            chain_id,
            seq_number,
            insertion_code: None,
            kind: ResidueKind::from_name(name),
            atoms: Vec::new(),
        }
    }
}
