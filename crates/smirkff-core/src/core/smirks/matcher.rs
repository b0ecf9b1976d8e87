use super::pattern::Pattern;
use crate::core::models::molecule::Molecule;
use std::collections::{HashSet, VecDeque};

/// How two matches of the same pattern are recognised as the same interaction site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MatchSymmetry {
    /// Tuples are compared as written.
    #[default]
    Exact,
    /// A tuple and its reverse are the same site.
    Reversible,
    /// The second atom is a fixed center; the order of the others is irrelevant.
    CenterAnchored,
}

impl MatchSymmetry {
    /// Returns the canonical representative of `atoms` under this symmetry.
    pub fn canonicalize(self, atoms: &[usize]) -> Vec<usize> {
        match self {
            Self::Exact => atoms.to_vec(),
            Self::Reversible => {
                let reversed: Vec<usize> = atoms.iter().rev().copied().collect();
                if reversed.as_slice() < atoms {
                    reversed
                } else {
                    atoms.to_vec()
                }
            }
            Self::CenterAnchored => {
                if atoms.len() < 2 {
                    return atoms.to_vec();
                }
                let mut others: Vec<usize> = atoms
                    .iter()
                    .enumerate()
                    .filter(|&(i, _)| i != 1)
                    .map(|(_, &a)| a)
                    .collect();
                others.sort_unstable();
                let mut canonical = Vec::with_capacity(atoms.len());
                canonical.push(atoms[1]);
                canonical.extend(others);
                canonical
            }
        }
    }
}

/// Configures a substructure search of one pattern against one molecule.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'p, 'm> {
    pattern: &'p Pattern,
    molecule: &'m Molecule,
    symmetry: MatchSymmetry,
    anchor: Option<usize>,
}

impl<'p, 'm> Matcher<'p, 'm> {
    pub fn new(pattern: &'p Pattern, molecule: &'m Molecule) -> Self {
        Self {
            pattern,
            molecule,
            symmetry: MatchSymmetry::Exact,
            anchor: None,
        }
    }

    pub fn symmetry(mut self, symmetry: MatchSymmetry) -> Self {
        self.symmetry = symmetry;
        self
    }

    /// Restricts the search to mappings that place the first pattern atom on `atom`.
    pub fn anchored(mut self, atom: usize) -> Self {
        self.anchor = Some(atom);
        self
    }

    pub fn matches(self) -> Matches<'p, 'm> {
        Matches::new(self)
    }

    pub fn has_match(self) -> bool {
        self.matches().next().is_some()
    }
}

struct Frame {
    candidates: Vec<usize>,
    next: usize,
    current: Option<usize>,
}

/// Lazy sequence of matches, each the tagged atoms' images in tag order.
///
/// The search is a depth-first backtracking over pattern atoms in breadth-first order from the
/// first pattern atom. Every step extends the partial mapping by one atom that satisfies the
/// atom expression and, for every pattern bond back into the mapped set, has a molecule bond
/// satisfying the bond expression. The stack of [`Frame`]s replaces recursion, which lets the
/// search pause after each complete mapping.
///
/// Patterns without tags report the image of every pattern atom instead.
pub struct Matches<'p, 'm> {
    pattern: &'p Pattern,
    molecule: &'m Molecule,
    symmetry: MatchSymmetry,
    anchor: Option<usize>,
    order: Vec<usize>,
    parents: Vec<Option<usize>>,
    mapping: Vec<Option<usize>>,
    used: Vec<bool>,
    stack: Vec<Frame>,
    seen: HashSet<Vec<usize>>,
    started: bool,
}

impl<'p, 'm> Matches<'p, 'm> {
    fn new(matcher: Matcher<'p, 'm>) -> Self {
        let pattern = matcher.pattern;
        let (order, parents) = search_order(pattern);
        Self {
            pattern,
            molecule: matcher.molecule,
            symmetry: matcher.symmetry,
            anchor: matcher.anchor,
            order,
            parents,
            mapping: vec![None; pattern.atom_count()],
            used: vec![false; matcher.molecule.atom_count()],
            stack: Vec::new(),
            seen: HashSet::new(),
            started: false,
        }
    }

    fn candidates(&self, depth: usize) -> Vec<usize> {
        match self.parents[depth].and_then(|p| self.mapping[p]) {
            Some(image) => self
                .molecule
                .neighbors(image)
                .filter(|&n| !self.used[n])
                .collect(),
            None if depth == 0 => match self.anchor {
                Some(anchor) if anchor < self.molecule.atom_count() => vec![anchor],
                Some(_) => Vec::new(),
                None => (0..self.molecule.atom_count()).collect(),
            },
            None => (0..self.molecule.atom_count())
                .filter(|&n| !self.used[n])
                .collect(),
        }
    }

    fn is_feasible(&self, pattern_atom: usize, target: usize) -> bool {
        if self.used[target] {
            return false;
        }
        if !self.pattern.atoms()[pattern_atom]
            .expr
            .evaluate(self.molecule, target)
        {
            return false;
        }
        self.pattern
            .adjacency(pattern_atom)
            .iter()
            .all(|&(neighbor, bond)| match self.mapping[neighbor] {
                None => true,
                Some(image) => self
                    .molecule
                    .bond_between(target, image)
                    .is_some_and(|b| self.pattern.bonds()[bond].expr.evaluate(b)),
            })
    }

    fn projection(&self) -> Vec<usize> {
        let tagged = self.pattern.tagged_atoms();
        if tagged.is_empty() {
            self.mapping.iter().flatten().copied().collect()
        } else {
            tagged.iter().filter_map(|&p| self.mapping[p]).collect()
        }
    }
}

impl Iterator for Matches<'_, '_> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            if self.order.is_empty() || self.order.len() > self.molecule.atom_count() {
                return None;
            }
            let candidates = self.candidates(0);
            self.stack.push(Frame {
                candidates,
                next: 0,
                current: None,
            });
        }

        loop {
            let depth = self.stack.len();
            let frame = self.stack.last_mut()?;
            let pattern_atom = self.order[depth - 1];

            if let Some(previous) = frame.current.take() {
                self.used[previous] = false;
                self.mapping[pattern_atom] = None;
            }
            let Some(&target) = frame.candidates.get(frame.next) else {
                self.stack.pop();
                continue;
            };
            frame.next += 1;

            if !self.is_feasible(pattern_atom, target) {
                continue;
            }
            self.mapping[pattern_atom] = Some(target);
            self.used[target] = true;
            if let Some(frame) = self.stack.last_mut() {
                frame.current = Some(target);
            }

            if depth == self.order.len() {
                let tuple = self.projection();
                if self.seen.insert(self.symmetry.canonicalize(&tuple)) {
                    return Some(tuple);
                }
            } else {
                let candidates = self.candidates(depth);
                self.stack.push(Frame {
                    candidates,
                    next: 0,
                    current: None,
                });
            }
        }
    }
}

/// Breadth-first ordering of pattern atoms from atom 0, with each atom's already-ordered parent.
fn search_order(pattern: &Pattern) -> (Vec<usize>, Vec<Option<usize>>) {
    let n = pattern.atom_count();
    let mut order = Vec::with_capacity(n);
    let mut parents = Vec::with_capacity(n);
    let mut visited = vec![false; n];

    for root in 0..n {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        let mut queue = VecDeque::from([(root, None)]);
        while let Some((atom, parent)) = queue.pop_front() {
            order.push(atom);
            parents.push(parent);
            for &(neighbor, _) in pattern.adjacency(atom) {
                if !visited[neighbor] {
                    visited[neighbor] = true;
                    queue.push_back((neighbor, Some(atom)));
                }
            }
        }
    }
    (order, parents)
}
