//! # smirkff Core Library
//!
//! Assignment of force-field parameters to molecules by matching SMIRKS substructure patterns
//! against their bonded graphs.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Molecule`, `RuleSet`,
//!   `ParameterizedTopology`), the SMIRKS parser and matcher, and force-field file loading.
//!
//! - **[`engine`]: The Logic Core.** The assignment resolver, which matches every rule of a
//!   class and lets the last-declared matching rule win each site, together with diagnostics,
//!   configuration, errors and progress reporting.
//!
//! - **[`workflows`]: The Public API.** Entry points that parameterize a single molecule or a
//!   batch of molecules, with each molecule's failure isolated from the others.
//!
//! ## Example
//!
//! ```
//! use smirkff::core::forcefield::ruleset::RuleSet;
//! use smirkff::core::forcefield::class::InteractionClass;
//! use smirkff::core::models::{atom::Atom, bond::BondOrder, molecule::Molecule};
//! use smirkff::engine::config::AssignmentConfig;
//! use smirkff::engine::progress::ProgressReporter;
//! use smirkff::workflows::parameterize;
//!
//! let rules = RuleSet::from_toml_str(
//!     r#"
//!     [[bonds.parameters]]
//!     id = "b1"
//!     smirks = "[*:1]~[*:2]"
//!     length = 1.0
//!     k = 500.0
//!     "#,
//!     "inline",
//! )
//! .unwrap();
//!
//! let mut builder = Molecule::builder("hydrogen");
//! let a = builder.add_atom(Atom::new(1));
//! let b = builder.add_atom(Atom::new(1));
//! builder.bond(a, b, BondOrder::Single);
//! let molecule = builder.build().unwrap();
//!
//! let result = parameterize::run(
//!     &molecule,
//!     &rules,
//!     &AssignmentConfig::default(),
//!     &ProgressReporter::new(),
//! )
//! .unwrap();
//! let term = result.topology.lookup(InteractionClass::Bond, &[1, 0]).unwrap();
//! assert_eq!(term.rule_id, "b1");
//! ```

pub mod core;
pub mod engine;
pub mod workflows;
