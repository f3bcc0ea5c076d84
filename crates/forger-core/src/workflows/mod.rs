//! # Workflows Module
//!
//! High-level entry points tying the structure model, the engine
//! configuration, and a simulation backend together into complete
//! procedures.
//!
//! - **Minimization Workflow** ([`minimize`]) - The batch
//!   repair → solvate → build → minimize → persist pipeline with fail-soft
//!   per-file outcomes and two-stage (raw + clean) output.

pub mod minimize;
