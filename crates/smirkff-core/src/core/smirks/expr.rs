use super::matcher::Matcher;
use super::pattern::Pattern;
use crate::core::models::bond::{Bond, BondOrder};
use crate::core::models::molecule::Molecule;

/// A single atom test inside a bracket atom.
#[derive(Debug, Clone, PartialEq)]
pub enum AtomPrimitive {
    /// `*`
    Any,
    /// `#n` or an element symbol.
    AtomicNumber(u8),
    /// `a`
    Aromatic,
    /// `A`
    Aliphatic,
    /// `D<n>`: explicit neighbor count.
    Degree(u8),
    /// `H<n>`: total hydrogen count, implicit plus explicit neighbors.
    TotalHydrogens(u8),
    /// `h<n>`: implicit hydrogen count.
    ImplicitHydrogens(u8),
    /// `X<n>`: total connectivity.
    Connectivity(u8),
    /// `x<n>`: number of ring bonds.
    RingConnectivity(u8),
    /// `v<n>`: total bond order.
    Valence(u8),
    /// `R` or `r` without a number.
    InRing,
    /// `R<n>`: number of rings the atom belongs to.
    RingCount(u8),
    /// `r<n>`: membership in a ring of the given size; `r0` means acyclic.
    RingSize(u8),
    /// `+`, `-`, `+<n>`, `-<n>`, `++`, `--`.
    Charge(i8),
    /// `$(...)` or `$name`: the atom is the first atom of a match of the inner pattern.
    Recursive(Box<Pattern>),
}

/// Atom constraint expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum AtomExpr {
    Primitive(AtomPrimitive),
    Not(Box<AtomExpr>),
    And(Vec<AtomExpr>),
    Or(Vec<AtomExpr>),
}

impl AtomExpr {
    pub fn any() -> Self {
        Self::Primitive(AtomPrimitive::Any)
    }

    /// Element written as a symbol: aromatic for lowercase, aliphatic for uppercase.
    pub fn element(atomic_number: u8, aromatic: bool) -> Self {
        let flag = if aromatic {
            AtomPrimitive::Aromatic
        } else {
            AtomPrimitive::Aliphatic
        };
        Self::And(vec![
            Self::Primitive(AtomPrimitive::AtomicNumber(atomic_number)),
            Self::Primitive(flag),
        ])
    }

    /// Builds a conjunction, collapsing single-element lists.
    pub(crate) fn all(mut terms: Vec<AtomExpr>) -> Self {
        if terms.len() == 1 {
            terms.remove(0)
        } else {
            Self::And(terms)
        }
    }

    pub(crate) fn any_of(mut terms: Vec<AtomExpr>) -> Self {
        if terms.len() == 1 {
            terms.remove(0)
        } else {
            Self::Or(terms)
        }
    }

    pub fn evaluate(&self, molecule: &Molecule, atom: usize) -> bool {
        match self {
            Self::Primitive(p) => p.evaluate(molecule, atom),
            Self::Not(inner) => !inner.evaluate(molecule, atom),
            Self::And(terms) => terms.iter().all(|t| t.evaluate(molecule, atom)),
            Self::Or(terms) => terms.iter().any(|t| t.evaluate(molecule, atom)),
        }
    }
}

impl AtomPrimitive {
    pub fn evaluate(&self, molecule: &Molecule, index: usize) -> bool {
        let Some(atom) = molecule.atom(index) else {
            return false;
        };
        match self {
            Self::Any => true,
            Self::AtomicNumber(z) => atom.atomic_number == *z,
            Self::Aromatic => atom.is_aromatic,
            Self::Aliphatic => !atom.is_aromatic,
            Self::Degree(n) => molecule.degree(index) == *n as usize,
            Self::TotalHydrogens(n) => molecule.total_hydrogens(index) == *n as usize,
            Self::ImplicitHydrogens(n) => atom.implicit_hydrogens == *n,
            Self::Connectivity(n) => molecule.connectivity(index) == *n as usize,
            Self::RingConnectivity(n) => molecule.ring_bond_count(index) == *n as usize,
            Self::Valence(n) => molecule.valence(index) == *n as usize,
            Self::InRing => atom.is_in_ring(),
            Self::RingCount(n) => atom.ring_count() == *n as usize,
            Self::RingSize(0) => !atom.is_in_ring(),
            Self::RingSize(n) => atom.is_in_ring_of_size(*n),
            Self::Charge(c) => atom.formal_charge == *c,
            Self::Recursive(pattern) => Matcher::new(pattern, molecule).anchored(index).has_match(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondPrimitive {
    /// `-`: single and not aromatic.
    Single,
    /// `=`: double and not aromatic.
    Double,
    /// `#`
    Triple,
    /// `:`
    Aromatic,
    /// `~`
    Any,
    /// `@`
    Ring,
    /// `/` or `\`. Stereo is not perceived, so these behave as single bonds.
    Directional,
}

impl BondPrimitive {
    pub fn evaluate(self, bond: &Bond) -> bool {
        match self {
            Self::Single | Self::Directional => {
                bond.order == BondOrder::Single && !bond.is_aromatic
            }
            Self::Double => bond.order == BondOrder::Double && !bond.is_aromatic,
            Self::Triple => bond.order == BondOrder::Triple,
            Self::Aromatic => bond.is_aromatic,
            Self::Any => true,
            Self::Ring => bond.in_ring,
        }
    }
}

/// Bond constraint expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum BondExpr {
    Primitive(BondPrimitive),
    Not(Box<BondExpr>),
    And(Vec<BondExpr>),
    Or(Vec<BondExpr>),
}

impl BondExpr {
    /// The bond implied when two atoms are written next to each other: single or aromatic.
    pub fn implicit() -> Self {
        Self::Or(vec![
            Self::Primitive(BondPrimitive::Single),
            Self::Primitive(BondPrimitive::Aromatic),
        ])
    }

    pub(crate) fn all(mut terms: Vec<BondExpr>) -> Self {
        if terms.len() == 1 {
            terms.remove(0)
        } else {
            Self::And(terms)
        }
    }

    pub(crate) fn any_of(mut terms: Vec<BondExpr>) -> Self {
        if terms.len() == 1 {
            terms.remove(0)
        } else {
            Self::Or(terms)
        }
    }

    pub fn evaluate(&self, bond: &Bond) -> bool {
        match self {
            Self::Primitive(p) => p.evaluate(bond),
            Self::Not(inner) => !inner.evaluate(bond),
            Self::And(terms) => terms.iter().all(|t| t.evaluate(bond)),
            Self::Or(terms) => terms.iter().any(|t| t.evaluate(bond)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::fixtures;

    #[test]
    fn element_expression_checks_aromaticity() {
        let benzene = fixtures::benzene();
        assert!(AtomExpr::element(6, true).evaluate(&benzene, 0));
        assert!(!AtomExpr::element(6, false).evaluate(&benzene, 0));
        assert!(AtomExpr::element(1, false).evaluate(&benzene, 6));
    }

    #[test]
    fn logical_operators_combine_primitives() {
        let ethane = fixtures::ethane();
        let carbon = AtomExpr::Primitive(AtomPrimitive::AtomicNumber(6));
        let four_connected = AtomExpr::Primitive(AtomPrimitive::Connectivity(4));
        let expr = AtomExpr::And(vec![carbon.clone(), four_connected]);
        assert!(expr.evaluate(&ethane, 0));
        assert!(!expr.evaluate(&ethane, 2));
        assert!(AtomExpr::Not(Box::new(carbon.clone())).evaluate(&ethane, 2));
        let either = AtomExpr::Or(vec![
            carbon,
            AtomExpr::Primitive(AtomPrimitive::AtomicNumber(1)),
        ]);
        assert!((0..ethane.atom_count()).all(|i| either.evaluate(&ethane, i)));
    }

    #[test]
    fn ring_primitives_follow_supplied_ring_sizes() {
        let benzene = fixtures::benzene();
        assert!(AtomPrimitive::InRing.evaluate(&benzene, 0));
        assert!(AtomPrimitive::RingSize(6).evaluate(&benzene, 0));
        assert!(!AtomPrimitive::RingSize(5).evaluate(&benzene, 0));
        assert!(AtomPrimitive::RingCount(1).evaluate(&benzene, 0));
        assert!(AtomPrimitive::RingCount(0).evaluate(&benzene, 6));
        assert!(AtomPrimitive::RingSize(0).evaluate(&benzene, 6));
        assert!(AtomPrimitive::RingConnectivity(2).evaluate(&benzene, 0));
    }

    #[test]
    fn out_of_range_atom_never_matches() {
        let ethane = fixtures::ethane();
        assert!(!AtomPrimitive::Any.evaluate(&ethane, 100));
    }

    #[test]
    fn bond_primitives_distinguish_aromatic_from_kekule_orders() {
        let aromatic = Bond::new(0, 1, BondOrder::Aromatic);
        let kekule_double = Bond::new(0, 1, BondOrder::Double).with_aromatic(true);
        let single = Bond::new(0, 1, BondOrder::Single);

        assert!(BondPrimitive::Aromatic.evaluate(&aromatic));
        assert!(BondPrimitive::Aromatic.evaluate(&kekule_double));
        assert!(!BondPrimitive::Double.evaluate(&kekule_double));
        assert!(BondPrimitive::Single.evaluate(&single));
        assert!(!BondPrimitive::Single.evaluate(&aromatic));
        assert!(BondExpr::implicit().evaluate(&single));
        assert!(BondExpr::implicit().evaluate(&aromatic));
        assert!(!BondExpr::implicit().evaluate(&Bond::new(0, 1, BondOrder::Triple)));
    }

    #[test]
    fn ring_bond_primitive_reads_ring_flag() {
        let bond = Bond::new(0, 1, BondOrder::Single);
        assert!(!BondPrimitive::Ring.evaluate(&bond));
        assert!(BondPrimitive::Ring.evaluate(&bond.in_ring(true)));
    }
}
