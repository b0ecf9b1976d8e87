//! # Core Module
//!
//! The stateless foundation of the library: molecular graphs, SMIRKS patterns and matching,
//! force-field rules, and interaction-site enumeration.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, bonds, validated molecule graphs and the
//!   parameterized topology produced by assignment
//! - **Pattern Matching** ([`smirks`]) - SMIRKS parsing and substructure search
//! - **Force Field Rules** ([`forcefield`]) - Interaction classes, parameter values, rule sets and
//!   their TOML file format
//! - **Interaction Sites** ([`topology`]) - Candidate sites of each class in canonical form
//!
//! ## Key Capabilities
//!
//! - **Constraint-expression patterns** with logical operators and recursive environments
//! - **Lazy, symmetry-aware matching** that reports each site once
//! - **Ordered, append-only rule sets** merged from one or more files

pub mod forcefield;
pub mod models;
pub mod smirks;
pub mod topology;
