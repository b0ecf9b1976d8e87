//! # Topology Module
//!
//! Candidate interaction sites of a molecule: every bond, every angle, every proper torsion,
//! every improper center with three of its neighbors, and every atom, each written once in the
//! canonical atom order of its class.
//!
//! The resolver assigns exactly one rule to each of these sites. Matches that do not land on a
//! candidate site are ignored.

pub mod sites;
