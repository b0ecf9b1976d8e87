use super::atom::Atom;
use super::bond::{Bond, BondOrder, ParseBondOrderError};
use super::element;
use crate::core::smirks::matcher::{MatchSymmetry, Matcher};
use crate::core::smirks::pattern::Pattern;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("Bond {bond} references atom {atom}, but the molecule only has {atom_count} atoms")]
    DanglingBond {
        bond: usize,
        atom: usize,
        atom_count: usize,
    },
    #[error("Bond {bond} connects atom {atom} to itself")]
    SelfBond { bond: usize, atom: usize },
    #[error("Atoms {i} and {j} are bonded more than once")]
    DuplicateBond { i: usize, j: usize },
    #[error("Atom {atom} has unknown element symbol '{symbol}'")]
    UnknownElement { atom: usize, symbol: String },
    #[error("Bond {bond} has an invalid order: {source}")]
    InvalidBondOrder {
        bond: usize,
        #[source]
        source: ParseBondOrderError,
    },
}

/// An immutable molecular graph with caller-perceived atom and bond attributes.
///
/// Atoms and bonds are addressed by their insertion index. The adjacency list is built once
/// by [`MoleculeBuilder::build`], which is also where the graph is validated, so every
/// `Molecule` in existence is free of dangling, self and duplicate bonds.
#[derive(Debug, Clone)]
pub struct Molecule {
    name: String,
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    adjacency: Vec<Vec<(usize, usize)>>, // (neighbor atom, bond index), in bond insertion order
}

impl Molecule {
    pub fn builder(name: impl Into<String>) -> MoleculeBuilder {
        MoleculeBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    pub fn bond(&self, index: usize) -> Option<&Bond> {
        self.bonds.get(index)
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    /// Neighbor/bond-index pairs of an atom. Out-of-range indices yield an empty slice.
    pub fn adjacency(&self, atom: usize) -> &[(usize, usize)] {
        self.adjacency.get(atom).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn neighbors(&self, atom: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency(atom).iter().map(|&(n, _)| n)
    }

    /// Returns the bond connecting `a` and `b`, if any.
    pub fn bond_between(&self, a: usize, b: usize) -> Option<&Bond> {
        self.adjacency(a)
            .iter()
            .find(|&&(n, _)| n == b)
            .map(|&(_, bond)| &self.bonds[bond])
    }

    /// Number of explicit neighbors (`D`).
    pub fn degree(&self, atom: usize) -> usize {
        self.adjacency(atom).len()
    }

    /// Total hydrogen count (`H`): implicit hydrogens plus explicit hydrogen neighbors.
    pub fn total_hydrogens(&self, atom: usize) -> usize {
        let implicit = self.atoms.get(atom).map_or(0, |a| a.implicit_hydrogens as usize);
        implicit
            + self
                .neighbors(atom)
                .filter(|&n| self.atoms[n].is_hydrogen())
                .count()
    }

    /// Total connectivity (`X`): explicit neighbors plus implicit hydrogens.
    pub fn connectivity(&self, atom: usize) -> usize {
        self.degree(atom) + self.atoms.get(atom).map_or(0, |a| a.implicit_hydrogens as usize)
    }

    /// Total bond order (`v`), with aromatic bonds counted as 1.5 and the sum truncated.
    pub fn valence(&self, atom: usize) -> usize {
        let half: u32 = self
            .adjacency(atom)
            .iter()
            .map(|&(_, b)| self.bonds[b].order.half_valence())
            .sum();
        (half / 2) as usize + self.atoms.get(atom).map_or(0, |a| a.implicit_hydrogens as usize)
    }

    /// Number of ring bonds on the atom (`x`).
    pub fn ring_bond_count(&self, atom: usize) -> usize {
        self.adjacency(atom)
            .iter()
            .filter(|&&(_, b)| self.bonds[b].in_ring)
            .count()
    }

    /// Returns every unique tagged-atom tuple at which `pattern` matches this molecule.
    ///
    /// Tuples are reported in tag order; two tuples that differ only in orientation are both
    /// reported. This is the exploratory counterpart of rule assignment, useful for checking
    /// what a pattern would hit before adding it to a force field.
    pub fn environment_matches(&self, pattern: &Pattern) -> Vec<Vec<usize>> {
        Matcher::new(pattern, self)
            .symmetry(MatchSymmetry::Exact)
            .matches()
            .collect()
    }
}

/// Incremental constructor for [`Molecule`].
#[derive(Debug, Clone, Default)]
pub struct MoleculeBuilder {
    name: String,
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
}

impl MoleculeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Appends an atom and returns its index.
    pub fn add_atom(&mut self, atom: Atom) -> usize {
        self.atoms.push(atom);
        self.atoms.len() - 1
    }

    /// Appends a bond and returns its index. Endpoints are checked in [`build`](Self::build).
    pub fn add_bond(&mut self, bond: Bond) -> usize {
        self.bonds.push(bond);
        self.bonds.len() - 1
    }

    pub fn bond(&mut self, i: usize, j: usize, order: BondOrder) -> usize {
        self.add_bond(Bond::new(i, j, order))
    }

    pub fn build(self) -> Result<Molecule, GraphError> {
        let atom_count = self.atoms.len();
        let mut adjacency = vec![Vec::new(); atom_count];
        let mut seen = HashSet::with_capacity(self.bonds.len());

        for (index, bond) in self.bonds.iter().enumerate() {
            for atom in [bond.i, bond.j] {
                if atom >= atom_count {
                    return Err(GraphError::DanglingBond {
                        bond: index,
                        atom,
                        atom_count,
                    });
                }
            }
            if bond.i == bond.j {
                return Err(GraphError::SelfBond {
                    bond: index,
                    atom: bond.i,
                });
            }
            let (i, j) = bond.sorted_pair();
            if !seen.insert((i, j)) {
                return Err(GraphError::DuplicateBond { i, j });
            }
            adjacency[bond.i].push((bond.j, index));
            adjacency[bond.j].push((bond.i, index));
        }

        Ok(Molecule {
            name: self.name,
            atoms: self.atoms,
            bonds: self.bonds,
            adjacency,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AtomRecord {
    pub element: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub charge: i8,
    #[serde(default)]
    pub aromatic: bool,
    #[serde(default)]
    pub implicit_hydrogens: u8,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ring_sizes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct BondRecord {
    pub atoms: [usize; 2],
    #[serde(default = "default_bond_order")]
    pub order: String,
    /// Overrides the aromatic flag derived from `order`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aromatic: Option<bool>,
    #[serde(default)]
    pub ring: bool,
    #[serde(default)]
    pub stereo: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fractional_order: Option<f64>,
}

fn default_bond_order() -> String {
    "single".to_string()
}

/// Serializable description of a molecule, as found in molecule input files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct MoleculeRecord {
    pub name: String,
    #[serde(default)]
    pub atoms: Vec<AtomRecord>,
    #[serde(default)]
    pub bonds: Vec<BondRecord>,
}

impl TryFrom<&MoleculeRecord> for Molecule {
    type Error = GraphError;

    fn try_from(record: &MoleculeRecord) -> Result<Self, Self::Error> {
        let mut builder = MoleculeBuilder::new(record.name.clone());

        for (index, a) in record.atoms.iter().enumerate() {
            let atomic_number = element::atomic_number(&a.element)
                .or_else(|| element::aromatic_atomic_number(&a.element))
                .ok_or_else(|| GraphError::UnknownElement {
                    atom: index,
                    symbol: a.element.clone(),
                })?;
            let mut atom = Atom::new(atomic_number)
                .with_charge(a.charge)
                .with_implicit_hydrogens(a.implicit_hydrogens)
                .with_ring_sizes(a.ring_sizes.iter().copied());
            atom.is_aromatic = a.aromatic;
            atom.name = a.name.clone();
            builder.add_atom(atom);
        }

        for (index, b) in record.bonds.iter().enumerate() {
            let order: BondOrder = b
                .order
                .parse()
                .map_err(|source| GraphError::InvalidBondOrder { bond: index, source })?;
            let mut bond = Bond::new(b.atoms[0], b.atoms[1], order)
                .in_ring(b.ring)
                .with_stereo(b.stereo);
            if let Some(aromatic) = b.aromatic {
                bond = bond.with_aromatic(aromatic);
            }
            if let Some(order) = b.fractional_order {
                bond = bond.with_fractional_order(order);
            }
            builder.add_bond(bond);
        }

        builder.build()
    }
}

impl TryFrom<MoleculeRecord> for Molecule {
    type Error = GraphError;

    fn try_from(record: MoleculeRecord) -> Result<Self, Self::Error> {
        Molecule::try_from(&record)
    }
}
