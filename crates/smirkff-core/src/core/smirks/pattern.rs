use super::expr::{AtomExpr, BondExpr};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct PatternAtom {
    pub expr: AtomExpr,
    /// The `:n` tag, if the atom is part of the interaction site.
    pub tag: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatternBond {
    pub a: usize,
    pub b: usize,
    pub expr: BondExpr,
}

/// A compiled SMIRKS pattern.
///
/// Atoms are stored in the order they appear in the source text. `tagged` lists the indices of
/// the tagged atoms sorted by tag, so `tagged[0]` is the atom written with `:1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    smirks: String,
    atoms: Vec<PatternAtom>,
    bonds: Vec<PatternBond>,
    adjacency: Vec<Vec<(usize, usize)>>,
    tagged: Vec<usize>,
}

impl Pattern {
    /// Assembles a pattern from already-validated parts.
    pub(crate) fn from_parts(
        smirks: String,
        atoms: Vec<PatternAtom>,
        bonds: Vec<PatternBond>,
        tagged: Vec<usize>,
    ) -> Self {
        let mut adjacency = vec![Vec::new(); atoms.len()];
        for (index, bond) in bonds.iter().enumerate() {
            adjacency[bond.a].push((bond.b, index));
            adjacency[bond.b].push((bond.a, index));
        }
        Self {
            smirks,
            atoms,
            bonds,
            adjacency,
            tagged,
        }
    }

    pub fn smirks(&self) -> &str {
        &self.smirks
    }

    pub fn atoms(&self) -> &[PatternAtom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[PatternBond] {
        &self.bonds
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// Number of tagged atoms, i.e. the arity of the site this pattern describes.
    pub fn tag_count(&self) -> usize {
        self.tagged.len()
    }

    /// Pattern atom indices of the tagged atoms, in tag order.
    pub fn tagged_atoms(&self) -> &[usize] {
        &self.tagged
    }

    pub fn adjacency(&self, atom: usize) -> &[(usize, usize)] {
        self.adjacency.get(atom).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn bond_between(&self, a: usize, b: usize) -> Option<&PatternBond> {
        self.adjacency(a)
            .iter()
            .find(|&&(n, _)| n == b)
            .map(|&(_, bond)| &self.bonds[bond])
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.smirks)
    }
}
