//! # Force Field Module
//!
//! Force-field rules and the ordered rule set they live in.
//!
//! ## Overview
//!
//! A force field is a list of rules per interaction class. Each rule pairs a SMIRKS pattern,
//! whose tagged atoms describe one interaction site, with the parameter values that site
//! receives when the rule wins it. The order of rules within a class is significant: when
//! several rules match the same site, the one declared last wins.
//!
//! ## Key Components
//!
//! - [`class`] - The closed set of interaction classes and their descriptor table
//! - [`params`] - Parameter payloads (bond, angle, torsion terms, nonbonded and auxiliary)
//! - [`rule`] - Compiled, validated rules
//! - [`ruleset`] - Append-only ordered rule collection
//! - [`loader`] - TOML force-field files, including multi-file merging

pub mod class;
pub mod loader;
pub mod params;
pub mod rule;
pub mod ruleset;
