//! Reading and writing structure file formats.
//!
//! A trait-based interface keeps the pipeline independent of any single
//! format; the PDB text format is the only implementation this tool needs,
//! since both the external repair library and the simulation engine exchange
//! structures as PDB files.

pub mod pdb;
pub mod traits;
