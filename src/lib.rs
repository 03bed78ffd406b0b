//! Monthly duty-roster planning for occupational physicians.
//!
//! Given a fixed set of clinical sessions and a pool of physicians with
//! capacity limits, unavailability, skills, cadence rules, and location
//! preferences, the planner assigns exactly one physician to each
//! session, honoring every hard constraint and maximizing the summed
//! physician-location preference scores.
//!
//! # Pipeline
//!
//! 1. [`io`] — input normalization: CSV/Excel tables → typed entities
//! 2. [`expand`] — optional session expansion from weekly templates
//! 3. [`feasibility`] — per-session eligible physician sets
//! 4. [`planner`] — constraint model, solve, schedule materialization
//!
//! # Modules
//!
//! - **[`models`]**: domain types — `Physician`, `Location`, `Room`,
//!   `Session`, rule tables, `Schedule`
//! - **[`solver`]**: binary linear models behind the `CpSolver` trait,
//!   with an exact branch-and-bound backend
//! - **[`config`]**: the planning run's configuration record
//! - **[`error`]**: the failure taxonomy and exit-code mapping
//!
//! # References
//!
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering"
//! - Wolsey (1998), "Integer Programming"

pub mod config;
pub mod error;
pub mod expand;
pub mod feasibility;
pub mod io;
pub mod models;
pub mod planner;
pub mod solver;
