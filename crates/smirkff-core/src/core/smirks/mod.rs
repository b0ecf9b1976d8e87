//! # SMIRKS Pattern Module
//!
//! Parsing of SMIRKS patterns into constraint-expression trees and substructure matching of
//! those patterns against [`Molecule`](crate::core::models::molecule::Molecule) graphs.
//!
//! ## Overview
//!
//! A SMIRKS pattern is a SMARTS pattern whose atoms may carry `:n` tags. The tagged atoms,
//! taken in tag order, identify the interaction site a force-field rule parameterizes: two
//! tags for a bond, three for an angle, four for a torsion.
//!
//! ## Architecture
//!
//! - [`parser`] - Recursive-descent parser producing a [`Pattern`]
//! - [`expr`] - Atom and bond expression trees and their evaluation
//! - [`pattern`] - The compiled pattern graph
//! - [`matcher`] - Lazy backtracking matcher with symmetry-aware duplicate suppression
//!
//! ## Example
//!
//! ```
//! use smirkff::core::models::{atom::Atom, bond::BondOrder, molecule::Molecule};
//! use smirkff::core::smirks::{parse_smirks, MatchSymmetry, Matcher};
//!
//! let mut builder = Molecule::builder("water");
//! let o = builder.add_atom(Atom::new(8));
//! let h1 = builder.add_atom(Atom::new(1));
//! let h2 = builder.add_atom(Atom::new(1));
//! builder.bond(o, h1, BondOrder::Single);
//! builder.bond(o, h2, BondOrder::Single);
//! let water = builder.build().unwrap();
//!
//! let pattern = parse_smirks("[#1:1]-[#8:2]-[#1:3]").unwrap();
//! let angles: Vec<_> = Matcher::new(&pattern, &water)
//!     .symmetry(MatchSymmetry::Reversible)
//!     .matches()
//!     .collect();
//! assert_eq!(angles, vec![vec![1, 0, 2]]);
//! ```

pub mod expr;
pub mod matcher;
pub mod parser;
pub mod pattern;

pub use matcher::{MatchSymmetry, Matcher, Matches};
pub use parser::{Replacements, SmirksError, parse_smirks, parse_smirks_with};
pub use pattern::Pattern;
