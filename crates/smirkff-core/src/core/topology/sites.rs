use crate::core::forcefield::class::{InteractionClass, SiteTopology};
use crate::core::models::molecule::Molecule;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// An interaction site in canonical atom order for its class.
///
/// Bond-like sites read in whichever direction is lexicographically smaller; improper sites
/// put the center first and sort the three peripheral atoms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Site(Vec<usize>);

impl Site {
    /// Canonicalizes an atom tuple written in tag order under the symmetry of `class`.
    pub fn canonical(class: InteractionClass, atoms: &[usize]) -> Self {
        Self(class.symmetry().canonicalize(atoms))
    }

    pub fn atoms(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.iter().join(", "))
    }
}

/// Lists every candidate site of `class` in `molecule`, sorted in canonical order.
pub fn enumerate(class: InteractionClass, molecule: &Molecule) -> Vec<Site> {
    let mut sites = BTreeSet::new();
    let mut add = |atoms: &[usize]| {
        sites.insert(Site::canonical(class, atoms));
    };

    match class.site_topology() {
        SiteTopology::Atom => {
            for atom in 0..molecule.atom_count() {
                add(&[atom]);
            }
        }
        SiteTopology::Bond => {
            for bond in molecule.bonds() {
                add(&[bond.i, bond.j]);
            }
        }
        SiteTopology::Angle => {
            for center in 0..molecule.atom_count() {
                for (a, c) in molecule.neighbors(center).sorted().tuple_combinations() {
                    add(&[a, center, c]);
                }
            }
        }
        SiteTopology::ProperTorsion => {
            for bond in molecule.bonds() {
                let (b, c) = (bond.i, bond.j);
                for a in molecule.neighbors(b).filter(|&a| a != c) {
                    for d in molecule.neighbors(c).filter(|&d| d != b && d != a) {
                        add(&[a, b, c, d]);
                    }
                }
            }
        }
        SiteTopology::ImproperTorsion => {
            for center in 0..molecule.atom_count() {
                if molecule.degree(center) < 3 {
                    continue;
                }
                for (a, c, d) in molecule.neighbors(center).sorted().tuple_combinations() {
                    add(&[a, center, c, d]);
                }
            }
        }
    }

    sites.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::fixtures;

    fn count(class: InteractionClass, molecule: &Molecule) -> usize {
        enumerate(class, molecule).len()
    }

    #[test]
    fn ethane_site_counts() {
        let ethane = fixtures::ethane();
        assert_eq!(count(InteractionClass::Bond, &ethane), 7);
        assert_eq!(count(InteractionClass::Angle, &ethane), 12);
        assert_eq!(count(InteractionClass::ProperTorsion, &ethane), 9);
        assert_eq!(count(InteractionClass::ImproperTorsion, &ethane), 8);
        assert_eq!(count(InteractionClass::Vdw, &ethane), 8);
    }

    #[test]
    fn butane_torsions_include_backbone_dihedral() {
        let butane = fixtures::butane();
        let torsions = enumerate(InteractionClass::ProperTorsion, &butane);
        assert!(torsions.contains(&Site(vec![0, 1, 2, 3])));
        // three outer neighbors on each side of every C-C bond
        assert_eq!(torsions.len(), 3 * 9);
    }

    #[test]
    fn three_membered_paths_are_not_torsions() {
        let mut b = Molecule::builder("cyclopropane");
        let c: Vec<usize> = (0..3)
            .map(|_| b.add_atom(crate::core::models::atom::Atom::new(6)))
            .collect();
        b.bond(c[0], c[1], crate::core::models::bond::BondOrder::Single);
        b.bond(c[1], c[2], crate::core::models::bond::BondOrder::Single);
        b.bond(c[2], c[0], crate::core::models::bond::BondOrder::Single);
        let ring = b.build().unwrap();
        assert!(enumerate(InteractionClass::ProperTorsion, &ring).is_empty());
        assert_eq!(count(InteractionClass::Angle, &ring), 3);
    }

    #[test]
    fn sites_are_canonical_and_sorted() {
        let ethane = fixtures::ethane();
        let angles = enumerate(InteractionClass::Angle, &ethane);
        assert!(angles.windows(2).all(|w| w[0] < w[1]));
        assert!(angles.iter().all(|s| s.atoms()[0] < s.atoms()[2]));

        let impropers = enumerate(InteractionClass::ImproperTorsion, &fixtures::ammonia());
        assert_eq!(impropers, vec![Site(vec![0, 1, 2, 3])]);
    }

    #[test]
    fn canonical_site_ignores_orientation() {
        assert_eq!(
            Site::canonical(InteractionClass::ProperTorsion, &[7, 1, 0, 3]),
            Site::canonical(InteractionClass::ProperTorsion, &[3, 0, 1, 7])
        );
        assert_eq!(
            Site::canonical(InteractionClass::ImproperTorsion, &[3, 0, 1, 2]).atoms(),
            &[0, 1, 2, 3]
        );
        assert_eq!(Site::canonical(InteractionClass::Bond, &[4, 2]).to_string(), "(2, 4)");
    }
}
