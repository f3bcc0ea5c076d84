//! Fundamental building blocks for representing and persisting protein
//! structures.
//!
//! This module is deliberately free of any simulation logic. It provides the
//! in-memory structure model shared by every pipeline stage and the PDB
//! text-format I/O used for both input intake and output persistence:
//!
//! - **Molecular Representation** ([`models`]) - Atoms, residues, and whole
//!   structures, with residue classification (amino acid, water, ion,
//!   ligand) driving heterogen removal.
//! - **File I/O** ([`io`]) - A trait-based interface for structure file
//!   formats and its PDB implementation.

pub mod io;
pub mod models;
