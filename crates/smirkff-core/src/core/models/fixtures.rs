//! Small hand-built molecules shared by unit tests across the crate.

use super::atom::Atom;
use super::bond::{Bond, BondOrder};
use super::molecule::{Molecule, MoleculeBuilder};

fn add_hydrogens(builder: &mut MoleculeBuilder, heavy: usize, count: usize) {
    for _ in 0..count {
        let h = builder.add_atom(Atom::new(1));
        builder.bond(heavy, h, BondOrder::Single);
    }
}

/// C0-C1 with hydrogens 2..=4 on C0 and 5..=7 on C1.
pub fn ethane() -> Molecule {
    let mut b = Molecule::builder("ethane");
    let c0 = b.add_atom(Atom::new(6));
    let c1 = b.add_atom(Atom::new(6));
    b.bond(c0, c1, BondOrder::Single);
    add_hydrogens(&mut b, c0, 3);
    add_hydrogens(&mut b, c1, 3);
    b.build().unwrap()
}

/// C0=C1 with hydrogens 2, 3 on C0 and 4, 5 on C1.
pub fn ethylene() -> Molecule {
    let mut b = Molecule::builder("ethylene");
    let c0 = b.add_atom(Atom::new(6));
    let c1 = b.add_atom(Atom::new(6));
    b.bond(c0, c1, BondOrder::Double);
    add_hydrogens(&mut b, c0, 2);
    add_hydrogens(&mut b, c1, 2);
    b.build().unwrap()
}

/// C0-C1-C2-C3 with hydrogens 4..=13.
pub fn butane() -> Molecule {
    let mut b = Molecule::builder("butane");
    let c: Vec<usize> = (0..4).map(|_| b.add_atom(Atom::new(6))).collect();
    for w in c.windows(2) {
        b.bond(w[0], w[1], BondOrder::Single);
    }
    add_hydrogens(&mut b, c[0], 3);
    add_hydrogens(&mut b, c[1], 2);
    add_hydrogens(&mut b, c[2], 2);
    add_hydrogens(&mut b, c[3], 3);
    b.build().unwrap()
}

/// C0-O1 with hydrogens 2..=4 on C0 and 5 on O1.
pub fn methanol() -> Molecule {
    let mut b = Molecule::builder("methanol");
    let c = b.add_atom(Atom::new(6));
    let o = b.add_atom(Atom::new(8));
    b.bond(c, o, BondOrder::Single);
    add_hydrogens(&mut b, c, 3);
    add_hydrogens(&mut b, o, 1);
    b.build().unwrap()
}

/// Methanol with every hydrogen implicit.
pub fn methanol_implicit() -> Molecule {
    let mut b = Molecule::builder("methanol");
    let c = b.add_atom(Atom::new(6).with_implicit_hydrogens(3));
    let o = b.add_atom(Atom::new(8).with_implicit_hydrogens(1));
    b.bond(c, o, BondOrder::Single);
    b.build().unwrap()
}

/// Aromatic ring c0..c5 with hydrogen 6 + i on carbon i.
pub fn benzene() -> Molecule {
    let mut b = Molecule::builder("benzene");
    let ring: Vec<usize> = (0..6)
        .map(|_| b.add_atom(Atom::new(6).aromatic().with_ring_sizes([6])))
        .collect();
    for i in 0..6 {
        b.add_bond(Bond::new(ring[i], ring[(i + 1) % 6], BondOrder::Aromatic).in_ring(true));
    }
    for &c in &ring {
        add_hydrogens(&mut b, c, 1);
    }
    b.build().unwrap()
}

/// Saturated ring C0..C5 with hydrogens 6 + 2i and 7 + 2i on carbon i.
pub fn cyclohexane() -> Molecule {
    let mut b = Molecule::builder("cyclohexane");
    let ring: Vec<usize> = (0..6)
        .map(|_| b.add_atom(Atom::new(6).with_ring_sizes([6])))
        .collect();
    for i in 0..6 {
        b.add_bond(Bond::new(ring[i], ring[(i + 1) % 6], BondOrder::Single).in_ring(true));
    }
    for &c in &ring {
        add_hydrogens(&mut b, c, 2);
    }
    b.build().unwrap()
}

/// Central carbon 0 bonded to H1, Cl2, Br3, F4.
pub fn chclbrf() -> Molecule {
    let mut b = Molecule::builder("bromochlorofluoromethane");
    let c = b.add_atom(Atom::new(6));
    for z in [1, 17, 35, 9] {
        let x = b.add_atom(Atom::new(z));
        b.bond(c, x, BondOrder::Single);
    }
    b.build().unwrap()
}

/// N0 with hydrogens 1..=3.
pub fn ammonia() -> Molecule {
    let mut b = Molecule::builder("ammonia");
    let n = b.add_atom(Atom::new(7));
    add_hydrogens(&mut b, n, 3);
    b.build().unwrap()
}
