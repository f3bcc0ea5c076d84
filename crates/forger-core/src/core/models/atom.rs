use nalgebra::Point3;

/// Represents a single atom within a residue.
///
/// Only the information needed to round-trip PDB records and to reason about
/// heterogen content is kept: name, element symbol, and coordinates. Force
/// field parameters never appear here; parameterization belongs to the
/// external simulation engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The PDB atom name (e.g., "CA", "N", "OXT", "HB2").
    pub name: String,
    /// The element symbol (e.g., "C", "N", "O"), as found in PDB columns
    /// 77-78. May be empty for files that omit it.
    pub element: String,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    /// Crystallographic occupancy (1.0 when absent).
    pub occupancy: f64,
    /// Temperature factor (0.0 when absent).
    pub b_factor: f64,
}

impl Atom {
    /// Creates an atom with the given name and position and neutral
    /// crystallographic fields.
    pub fn new(name: &str, element: &str, position: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            element: element.to_string(),
            position,
            occupancy: 1.0,
            b_factor: 0.0,
        }
    }

    /// Returns true if this atom is a hydrogen, judged by its element symbol
    /// or, when the element column is empty, by its name.
    pub fn is_hydrogen(&self) -> bool {
        if !self.element.is_empty() {
            return self.element.eq_ignore_ascii_case("H");
        }
        self.name
            .trim_start_matches(|c: char| c.is_ascii_digit())
            .starts_with(['H', 'h'])
    }
}
