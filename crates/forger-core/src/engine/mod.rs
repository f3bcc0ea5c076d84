//! # Engine Module
//!
//! Everything the minimization workflow needs around the structure model:
//! validated job configuration, the normalized error taxonomy, progress
//! reporting, per-file outcome tracking, and the simulation-backend seam.
//!
//! The module deliberately contains no numerical code. Force-field math,
//! PME electrostatics, and integrator numerics live behind
//! [`backend::SimulationBackend`]; the engine's job is to sequence those
//! calls, normalize their failures, and report what happened.
//!
//! - **Configuration** ([`config`]) - Force field / water model pairing,
//!   compute platform, iteration cap, output root, and fixed process
//!   constants (pH, padding, thermostat parameters).
//! - **Error Handling** ([`error`]) - One error enum covering the whole
//!   taxonomy; backend-specific errors are normalized at the adapter
//!   boundary and never leak upward.
//! - **Progress Monitoring** ([`progress`]) - Advisory event channel from
//!   the workflow to whatever front end is listening.
//! - **Outcomes** ([`outcome`]) - Per-file terminal states and the batch
//!   report.
//! - **Backends** ([`backend`]) - The repair/solvate/minimize adapter
//!   contracts and the OpenMM subprocess bridge.

pub mod backend;
pub mod config;
pub mod error;
pub mod outcome;
pub mod progress;
