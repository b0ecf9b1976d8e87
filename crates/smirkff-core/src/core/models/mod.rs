//! # Core Models Module
//!
//! Data structures describing the molecules that parameters are assigned to, and the
//! parameterized topology that assignment produces.
//!
//! ## Overview
//!
//! A [`molecule::Molecule`] is an immutable bonded graph whose atoms and bonds carry the
//! attributes a SMIRKS pattern can test: element, formal charge, aromaticity, ring membership,
//! bond order and implicit hydrogen counts. Perception of these attributes is the caller's job;
//! the models only store them and derive simple counts such as degree or total connectivity.
//!
//! ## Key Components
//!
//! - [`element`] - Static element symbol table
//! - [`atom`] - Atom attributes
//! - [`bond`] - Bond orders and bond attributes
//! - [`molecule`] - Validated molecular graph, its builder, and the serializable record form
//! - [`parameterized`] - Output of parameter assignment, grouped by interaction class

pub mod atom;
pub mod bond;
pub mod element;
pub mod molecule;
pub mod parameterized;

#[cfg(test)]
pub(crate) mod fixtures;
