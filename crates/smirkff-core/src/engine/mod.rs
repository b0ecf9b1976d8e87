//! # Engine Module
//!
//! Turns a compiled [`RuleSet`](crate::core::forcefield::ruleset::RuleSet) and a molecular
//! graph into assigned parameters.
//!
//! - **Resolution** ([`resolver`]) - per-class site enumeration, rule matching and last-wins merge
//! - **Diagnostics** ([`diagnostics`]) - rule usage, unused rules and duplicate patterns
//! - **Configuration** ([`config`]) - class processing order and reporting switches
//! - **Progress Monitoring** ([`progress`]) - callback-based progress events
//! - **Error Handling** ([`error`]) - failures that abort the assignment of one molecule
//!
//! Rule matching within a class runs on the rayon pool when the `parallel` feature is enabled.
//! Results are always merged in declaration order, so the outcome never depends on scheduling.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod progress;
pub mod resolver;
