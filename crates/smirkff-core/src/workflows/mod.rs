//! # Workflows Module
//!
//! Top-level entry points: [`parameterize`] assigns a rule set to one molecule and
//! [`batch`] does the same for many molecules, isolating failures per molecule.

pub mod batch;
pub mod parameterize;
