//! # ProteinForger Core Library
//!
//! A library for preparing protein structures for molecular-dynamics work:
//! it repairs missing atoms and hydrogens, solvates the structure in an
//! explicit water box, builds a PME system under a chosen force field, runs
//! a short energy minimization, and persists both the raw (solvated) and
//! clean (heterogen-stripped) minimized structures.
//!
//! The scientific computation itself (force-field parameterization, PME
//! electrostatics, Langevin integration, atom-repair heuristics) is never
//! implemented here. It is delegated to an external simulation engine
//! reached through the [`engine::backend::SimulationBackend`] seam; this
//! crate owns only the sequencing, validation, persistence, and reporting
//! around those calls.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Stateless structure model (`Structure`,
//!   `Residue`, `Atom`) and PDB file I/O.
//!
//! - **[`engine`]: The Logic Core.** Job configuration and validation, the
//!   normalized error taxonomy, progress reporting, per-file outcomes, and
//!   the simulation-backend adapters (including the OpenMM subprocess
//!   bridge).
//!
//! - **[`workflows`]: The Public API.** The batch minimization workflow:
//!   a strictly sequential, fail-soft state machine that drives each input
//!   file through repair, solvation, minimization, and two-stage output.

pub mod core;
pub mod engine;
pub mod workflows;
