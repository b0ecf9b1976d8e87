use super::expr::{AtomExpr, AtomPrimitive, BondExpr, BondPrimitive};
use super::pattern::{Pattern, PatternAtom, PatternBond};
use crate::core::models::element;
use std::collections::{BTreeMap, HashSet, VecDeque};
use thiserror::Error;

/// Named SMIRKS fragments that a pattern can reference as `$name`.
pub type Replacements = BTreeMap<String, String>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SmirksError {
    #[error("Pattern is empty")]
    Empty,
    #[error("Unexpected character '{ch}' at position {position}")]
    UnexpectedChar { ch: char, position: usize },
    #[error("Unexpected end of pattern at position {position}")]
    UnexpectedEnd { position: usize },
    #[error("Expected a number at position {position}")]
    ExpectedNumber { position: usize },
    #[error("Unknown element '{symbol}' at position {position}")]
    UnknownElement { symbol: String, position: usize },
    #[error("Unmatched parenthesis at position {position}")]
    UnmatchedParenthesis { position: usize },
    #[error("Bracket atom opened at position {position} is never closed")]
    UnclosedBracket { position: usize },
    #[error("Ring closure {ring} opened at position {position} is never closed")]
    UnclosedRing { ring: u32, position: usize },
    #[error(
        "Ring closure {ring} at position {position} would bond an atom to itself or duplicate a bond"
    )]
    InvalidRingClosure { ring: u32, position: usize },
    #[error("Branch at position {position} has no preceding atom")]
    BranchWithoutAtom { position: usize },
    #[error("Ring closure at position {position} has no preceding atom")]
    RingClosureWithoutAtom { position: usize },
    #[error("Bond at position {position} is not attached to two atoms")]
    DanglingBond { position: usize },
    #[error("Unknown replacement '${name}' at position {position}")]
    UnknownReplacement { name: String, position: usize },
    #[error("Replacement '${name}' refers to itself")]
    CyclicReplacement { name: String },
    #[error("{feature} is not supported (position {position})")]
    Unsupported {
        feature: &'static str,
        position: usize,
    },
    #[error("Invalid tag {tag} at position {position}; tags start at 1")]
    InvalidTag { tag: u32, position: usize },
    #[error("Tag {tag} is used more than once")]
    DuplicateTag { tag: u32 },
    #[error("Tags must be numbered 1 to {count} without gaps, found {tags:?}")]
    NonContiguousTags { tags: Vec<u32>, count: usize },
    #[error("Pattern is not a single connected fragment")]
    Disconnected,
    #[error("In recursive environment at position {position}: {source}")]
    InRecursive {
        position: usize,
        #[source]
        source: Box<SmirksError>,
    },
    #[error("In replacement '${name}': {source}")]
    InReplacement {
        name: String,
        #[source]
        source: Box<SmirksError>,
    },
}

/// Parses a SMIRKS pattern with no named replacements available.
pub fn parse_smirks(text: &str) -> Result<Pattern, SmirksError> {
    parse_smirks_with(text, &Replacements::new())
}

/// Parses a SMIRKS pattern, expanding `$name` references from `replacements`.
pub fn parse_smirks_with(text: &str, replacements: &Replacements) -> Result<Pattern, SmirksError> {
    let mut expanding = Vec::new();
    parse_pattern(text.trim(), replacements, &mut expanding, true)
}

fn parse_pattern(
    text: &str,
    replacements: &Replacements,
    expanding: &mut Vec<String>,
    keep_tags: bool,
) -> Result<Pattern, SmirksError> {
    if text.is_empty() {
        return Err(SmirksError::Empty);
    }
    Parser {
        text,
        input: text.as_bytes(),
        pos: 0,
        replacements,
        expanding,
        atoms: Vec::new(),
        bonds: Vec::new(),
        branches: Vec::new(),
        prev: None,
        pending: None,
        rings: BTreeMap::new(),
    }
    .parse(keep_tags)
}

fn is_bond_start(ch: u8) -> bool {
    matches!(ch, b'-' | b'=' | b'#' | b':' | b'~' | b'@' | b'/' | b'\\' | b'!')
}

struct Parser<'a, 'e> {
    text: &'a str,
    input: &'a [u8],
    pos: usize,
    replacements: &'a Replacements,
    expanding: &'e mut Vec<String>,
    atoms: Vec<PatternAtom>,
    bonds: Vec<PatternBond>,
    branches: Vec<(usize, usize)>, // (branch root atom, position of '(')
    prev: Option<usize>,
    pending: Option<(BondExpr, usize)>,
    rings: BTreeMap<u32, (usize, Option<BondExpr>, usize)>,
}

impl<'a, 'e> Parser<'a, 'e> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn unexpected(&self) -> SmirksError {
        match self.peek() {
            Some(ch) => SmirksError::UnexpectedChar {
                ch: ch as char,
                position: self.pos,
            },
            None => SmirksError::UnexpectedEnd { position: self.pos },
        }
    }

    fn number(&mut self) -> Option<u32> {
        let start = self.pos;
        let mut value: u32 = 0;
        while let Some(ch) = self.peek().filter(u8::is_ascii_digit) {
            value = value.saturating_mul(10).saturating_add((ch - b'0') as u32);
            self.pos += 1;
        }
        (self.pos > start).then_some(value)
    }

    fn small_number(&mut self) -> Result<Option<u8>, SmirksError> {
        let position = self.pos;
        match self.number() {
            None => Ok(None),
            Some(n) => u8::try_from(n)
                .map(Some)
                .map_err(|_| SmirksError::UnexpectedChar {
                    ch: self.input[position] as char,
                    position,
                }),
        }
    }

    fn parse(mut self, keep_tags: bool) -> Result<Pattern, SmirksError> {
        while let Some(ch) = self.peek() {
            match ch {
                b'(' => {
                    let prev = self
                        .prev
                        .ok_or(SmirksError::BranchWithoutAtom { position: self.pos })?;
                    if self.pending.is_some() {
                        return Err(self.unexpected());
                    }
                    self.branches.push((prev, self.pos));
                    self.pos += 1;
                }
                b')' => {
                    if let Some((_, position)) = self.pending {
                        return Err(SmirksError::DanglingBond { position });
                    }
                    let (root, _) = self
                        .branches
                        .pop()
                        .ok_or(SmirksError::UnmatchedParenthesis { position: self.pos })?;
                    self.prev = Some(root);
                    self.pos += 1;
                }
                b'[' => {
                    let atom = self.bracket_atom()?;
                    self.attach(atom)?;
                }
                b'*' => {
                    self.pos += 1;
                    self.attach(PatternAtom {
                        expr: AtomExpr::any(),
                        tag: None,
                    })?;
                }
                b'.' => return Err(SmirksError::Disconnected),
                b'%' | b'0'..=b'9' => self.ring_closure()?,
                c if is_bond_start(c) => {
                    if self.pending.is_some() {
                        return Err(self.unexpected());
                    }
                    let position = self.pos;
                    let expr = self.bond_low()?;
                    self.pending = Some((expr, position));
                }
                c if c.is_ascii_alphabetic() => {
                    let expr = self.organic_atom()?;
                    self.attach(PatternAtom { expr, tag: None })?;
                }
                _ => return Err(self.unexpected()),
            }
        }

        if let Some((_, position)) = self.pending {
            return Err(SmirksError::DanglingBond { position });
        }
        if let Some(&(_, position)) = self.branches.last() {
            return Err(SmirksError::UnmatchedParenthesis { position });
        }
        if let Some((&ring, &(_, _, position))) = self.rings.iter().next() {
            return Err(SmirksError::UnclosedRing { ring, position });
        }
        if self.atoms.is_empty() {
            return Err(SmirksError::Empty);
        }
        if !self.is_connected() {
            return Err(SmirksError::Disconnected);
        }

        let tagged = if keep_tags {
            self.validate_tags()?
        } else {
            self.atoms.iter_mut().for_each(|a| a.tag = None);
            Vec::new()
        };

        Ok(Pattern::from_parts(
            self.text.to_string(),
            self.atoms,
            self.bonds,
            tagged,
        ))
    }

    fn attach(&mut self, atom: PatternAtom) -> Result<(), SmirksError> {
        let index = self.atoms.len();
        match (self.prev, self.pending.take()) {
            (Some(prev), pending) => self.bonds.push(PatternBond {
                a: prev,
                b: index,
                expr: pending.map_or_else(BondExpr::implicit, |(expr, _)| expr),
            }),
            (None, Some((_, position))) => return Err(SmirksError::DanglingBond { position }),
            (None, None) => {}
        }
        self.atoms.push(atom);
        self.prev = Some(index);
        Ok(())
    }

    fn ring_closure(&mut self) -> Result<(), SmirksError> {
        let position = self.pos;
        let ring = if self.peek() == Some(b'%') {
            self.pos += 1;
            let (Some(d1), Some(d2)) = (self.peek(), self.peek_at(1)) else {
                return Err(SmirksError::ExpectedNumber { position: self.pos });
            };
            if !d1.is_ascii_digit() || !d2.is_ascii_digit() {
                return Err(SmirksError::ExpectedNumber { position: self.pos });
            }
            self.pos += 2;
            (d1 - b'0') as u32 * 10 + (d2 - b'0') as u32
        } else {
            let digit = self.input[self.pos] - b'0';
            self.pos += 1;
            digit as u32
        };

        let current = self
            .prev
            .ok_or(SmirksError::RingClosureWithoutAtom { position })?;
        let pending = self.pending.take().map(|(expr, _)| expr);

        match self.rings.remove(&ring) {
            Some((open, open_bond, _)) => {
                let duplicate = self
                    .bonds
                    .iter()
                    .any(|b| (b.a == open && b.b == current) || (b.a == current && b.b == open));
                if open == current || duplicate {
                    return Err(SmirksError::InvalidRingClosure { ring, position });
                }
                self.bonds.push(PatternBond {
                    a: open,
                    b: current,
                    expr: pending.or(open_bond).unwrap_or_else(BondExpr::implicit),
                });
            }
            None => {
                self.rings.insert(ring, (current, pending, position));
            }
        }
        Ok(())
    }

    fn organic_atom(&mut self) -> Result<AtomExpr, SmirksError> {
        let position = self.pos;
        let ch = self.input[self.pos];
        let two = match (ch, self.peek_at(1)) {
            (b'C', Some(b'l')) => Some(17),
            (b'B', Some(b'r')) => Some(35),
            _ => None,
        };
        if let Some(z) = two {
            self.pos += 2;
            return Ok(AtomExpr::element(z, false));
        }
        self.pos += 1;
        match ch {
            b'B' | b'C' | b'N' | b'O' | b'P' | b'S' | b'F' | b'I' => {
                let symbol = (ch as char).to_string();
                element::atomic_number(&symbol)
                    .map(|z| AtomExpr::element(z, false))
                    .ok_or(SmirksError::UnknownElement { symbol, position })
            }
            b'b' | b'c' | b'n' | b'o' | b'p' | b's' => {
                let symbol = (ch as char).to_string();
                element::aromatic_atomic_number(&symbol)
                    .map(|z| AtomExpr::element(z, true))
                    .ok_or(SmirksError::UnknownElement { symbol, position })
            }
            _ => Err(SmirksError::UnknownElement {
                symbol: (ch as char).to_string(),
                position,
            }),
        }
    }

    fn bracket_atom(&mut self) -> Result<PatternAtom, SmirksError> {
        let open = self.pos;
        self.pos += 1;
        if self.peek().is_some_and(|c| c.is_ascii_digit()) {
            return Err(SmirksError::Unsupported {
                feature: "Isotope labels",
                position: self.pos,
            });
        }

        let expr = self.atom_low()?;

        let tag = if self.peek() == Some(b':') {
            self.pos += 1;
            let position = self.pos;
            let tag = self
                .number()
                .ok_or(SmirksError::ExpectedNumber { position })?;
            if tag == 0 {
                return Err(SmirksError::InvalidTag { tag, position });
            }
            Some(tag)
        } else {
            None
        };

        match self.peek() {
            Some(b']') => {
                self.pos += 1;
                Ok(PatternAtom { expr, tag })
            }
            Some(_) => Err(self.unexpected()),
            None => Err(SmirksError::UnclosedBracket { position: open }),
        }
    }

    // Precedence, lowest first: ';' then ',' then '&' or juxtaposition, then '!'.

    fn atom_low(&mut self) -> Result<AtomExpr, SmirksError> {
        let mut terms = vec![self.atom_or()?];
        while self.peek() == Some(b';') {
            self.pos += 1;
            terms.push(self.atom_or()?);
        }
        Ok(AtomExpr::all(terms))
    }

    fn atom_or(&mut self) -> Result<AtomExpr, SmirksError> {
        let mut terms = vec![self.atom_high()?];
        while self.peek() == Some(b',') {
            self.pos += 1;
            terms.push(self.atom_high()?);
        }
        Ok(AtomExpr::any_of(terms))
    }

    fn atom_high(&mut self) -> Result<AtomExpr, SmirksError> {
        let mut terms = vec![self.atom_not()?];
        loop {
            match self.peek() {
                Some(b'&') => {
                    self.pos += 1;
                    terms.push(self.atom_not()?);
                }
                None | Some(b']' | b':' | b',' | b';') => break,
                Some(_) => terms.push(self.atom_not()?),
            }
        }
        Ok(AtomExpr::all(terms))
    }

    fn atom_not(&mut self) -> Result<AtomExpr, SmirksError> {
        if self.peek() == Some(b'!') {
            self.pos += 1;
            Ok(AtomExpr::Not(Box::new(self.atom_not()?)))
        } else {
            self.atom_primitive()
        }
    }

    fn atom_primitive(&mut self) -> Result<AtomExpr, SmirksError> {
        use AtomPrimitive as P;

        let position = self.pos;
        let Some(ch) = self.peek() else {
            return Err(self.unexpected());
        };
        let prim =
            |p: AtomPrimitive| -> Result<AtomExpr, SmirksError> { Ok(AtomExpr::Primitive(p)) };

        match ch {
            b'*' => {
                self.pos += 1;
                prim(P::Any)
            }
            b'#' => {
                self.pos += 1;
                let n = self
                    .number()
                    .ok_or(SmirksError::ExpectedNumber { position: self.pos })?;
                let z = u8::try_from(n).map_err(|_| SmirksError::UnknownElement {
                    symbol: format!("#{n}"),
                    position,
                })?;
                prim(P::AtomicNumber(z))
            }
            b'$' => self.recursive(),
            b'+' | b'-' => {
                self.pos += 1;
                let sign: i32 = if ch == b'+' { 1 } else { -1 };
                let magnitude = match self.number() {
                    Some(n) => n as i32,
                    None => {
                        let mut count = 1;
                        while self.peek() == Some(ch) {
                            self.pos += 1;
                            count += 1;
                        }
                        count
                    }
                };
                let charge =
                    i8::try_from(sign * magnitude).map_err(|_| SmirksError::UnexpectedChar {
                        ch: ch as char,
                        position,
                    })?;
                prim(P::Charge(charge))
            }
            b'@' => Err(SmirksError::Unsupported {
                feature: "Atom chirality",
                position,
            }),
            b'a' => {
                if self.peek_at(1) == Some(b's') {
                    self.pos += 2;
                    return Ok(AtomExpr::element(33, true));
                }
                self.pos += 1;
                prim(P::Aromatic)
            }
            b'h' => {
                self.pos += 1;
                match self.small_number()? {
                    Some(n) => prim(P::ImplicitHydrogens(n)),
                    None => Ok(AtomExpr::Not(Box::new(AtomExpr::Primitive(
                        P::ImplicitHydrogens(0),
                    )))),
                }
            }
            b'r' => {
                self.pos += 1;
                match self.small_number()? {
                    Some(n) => prim(P::RingSize(n)),
                    None => prim(P::InRing),
                }
            }
            b'x' => {
                self.pos += 1;
                match self.small_number()? {
                    Some(n) => prim(P::RingConnectivity(n)),
                    None => Ok(AtomExpr::Not(Box::new(AtomExpr::Primitive(
                        P::RingConnectivity(0),
                    )))),
                }
            }
            b'v' => {
                self.pos += 1;
                prim(P::Valence(self.small_number()?.unwrap_or(1)))
            }
            b'A' | b'D' | b'H' | b'R' | b'X' => {
                if let Some(z) = self.two_letter_element() {
                    return Ok(AtomExpr::element(z, false));
                }
                if ch == b'H' && self.is_bare_hydrogen() {
                    self.pos += 1;
                    return Ok(AtomExpr::element(1, false));
                }
                self.pos += 1;
                match ch {
                    b'A' => prim(P::Aliphatic),
                    b'D' => prim(P::Degree(self.small_number()?.unwrap_or(1))),
                    b'H' => prim(P::TotalHydrogens(self.small_number()?.unwrap_or(1))),
                    b'X' => prim(P::Connectivity(self.small_number()?.unwrap_or(1))),
                    _ => match self.small_number()? {
                        Some(n) => prim(P::RingCount(n)),
                        None => prim(P::InRing),
                    },
                }
            }
            c if c.is_ascii_uppercase() => {
                if let Some(z) = self.two_letter_element() {
                    return Ok(AtomExpr::element(z, false));
                }
                self.pos += 1;
                let symbol = (c as char).to_string();
                element::atomic_number(&symbol)
                    .map(|z| AtomExpr::element(z, false))
                    .ok_or(SmirksError::UnknownElement { symbol, position })
            }
            c if c.is_ascii_lowercase() => {
                if c == b's' && self.peek_at(1) == Some(b'e') {
                    self.pos += 2;
                    return Ok(AtomExpr::element(34, true));
                }
                self.pos += 1;
                let symbol = (c as char).to_string();
                element::aromatic_atomic_number(&symbol)
                    .map(|z| AtomExpr::element(z, true))
                    .ok_or(SmirksError::UnknownElement { symbol, position })
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Consumes an uppercase-lowercase element symbol such as `Cl` if one starts here.
    ///
    /// The match is greedy: any pair that spells an element is read as that element, even when
    /// the lowercase letter is also a primitive. `[Br]` is bromine, `[Sc]` scandium and `[Cr5]`
    /// chromium followed by a stray digit. Write `[C;r5]` or `[S&c]` for the primitive reading.
    fn two_letter_element(&mut self) -> Option<u8> {
        let (first, second) = (self.peek()?, self.peek_at(1)?);
        if !first.is_ascii_uppercase() || !second.is_ascii_lowercase() {
            return None;
        }
        let symbol = [first as char, second as char].iter().collect::<String>();
        let z = element::atomic_number(&symbol)?;
        self.pos += 2;
        Some(z)
    }

    /// `[H]`, `[H+]`, `[H:1]` denote a hydrogen atom rather than a hydrogen count.
    fn is_bare_hydrogen(&self) -> bool {
        self.pos > 0
            && self.input[self.pos - 1] == b'['
            && matches!(self.peek_at(1), Some(b']' | b':' | b'+' | b'-'))
    }

    fn recursive(&mut self) -> Result<AtomExpr, SmirksError> {
        let position = self.pos;
        self.pos += 1;
        let text = self.text;

        if self.peek() == Some(b'(') {
            let start = self.pos + 1;
            let mut depth = 0usize;
            let mut end = None;
            for (offset, &c) in self.input[self.pos..].iter().enumerate() {
                match c {
                    b'(' => depth += 1,
                    b')' => {
                        depth -= 1;
                        if depth == 0 {
                            end = Some(self.pos + offset);
                            break;
                        }
                    }
                    _ => {}
                }
            }
            let end = end.ok_or(SmirksError::UnmatchedParenthesis { position })?;
            let pattern = parse_pattern(&text[start..end], self.replacements, self.expanding, false)
                .map_err(|e| SmirksError::InRecursive {
                    position,
                    source: Box::new(e),
                })?;
            self.pos = end + 1;
            return Ok(AtomExpr::Primitive(AtomPrimitive::Recursive(Box::new(pattern))));
        }

        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
        {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.unexpected());
        }
        let name = &text[start..self.pos];
        let fragment = self
            .replacements
            .get(name)
            .ok_or_else(|| SmirksError::UnknownReplacement {
                name: name.to_string(),
                position,
            })?;
        if self.expanding.iter().any(|n| n == name) {
            return Err(SmirksError::CyclicReplacement {
                name: name.to_string(),
            });
        }

        self.expanding.push(name.to_string());
        let result = parse_pattern(fragment.trim(), self.replacements, self.expanding, false);
        self.expanding.pop();

        let pattern = result.map_err(|e| match e {
            cyclic @ SmirksError::CyclicReplacement { .. } => cyclic,
            other => SmirksError::InReplacement {
                name: name.to_string(),
                source: Box::new(other),
            },
        })?;
        Ok(AtomExpr::Primitive(AtomPrimitive::Recursive(Box::new(pattern))))
    }

    fn bond_low(&mut self) -> Result<BondExpr, SmirksError> {
        let mut terms = vec![self.bond_or()?];
        while self.peek() == Some(b';') {
            self.pos += 1;
            terms.push(self.bond_or()?);
        }
        Ok(BondExpr::all(terms))
    }

    fn bond_or(&mut self) -> Result<BondExpr, SmirksError> {
        let mut terms = vec![self.bond_high()?];
        while self.peek() == Some(b',') {
            self.pos += 1;
            terms.push(self.bond_high()?);
        }
        Ok(BondExpr::any_of(terms))
    }

    fn bond_high(&mut self) -> Result<BondExpr, SmirksError> {
        let mut terms = vec![self.bond_not()?];
        loop {
            match self.peek() {
                Some(b'&') => {
                    self.pos += 1;
                    terms.push(self.bond_not()?);
                }
                Some(c) if is_bond_start(c) => terms.push(self.bond_not()?),
                _ => break,
            }
        }
        Ok(BondExpr::all(terms))
    }

    fn bond_not(&mut self) -> Result<BondExpr, SmirksError> {
        if self.peek() == Some(b'!') {
            self.pos += 1;
            return Ok(BondExpr::Not(Box::new(self.bond_not()?)));
        }
        let prim = match self.peek() {
            Some(b'-') => BondPrimitive::Single,
            Some(b'=') => BondPrimitive::Double,
            Some(b'#') => BondPrimitive::Triple,
            Some(b':') => BondPrimitive::Aromatic,
            Some(b'~') => BondPrimitive::Any,
            Some(b'@') => BondPrimitive::Ring,
            Some(b'/' | b'\\') => BondPrimitive::Directional,
            _ => return Err(self.unexpected()),
        };
        self.pos += 1;
        Ok(BondExpr::Primitive(prim))
    }

    fn is_connected(&self) -> bool {
        let mut adjacency = vec![Vec::new(); self.atoms.len()];
        for bond in &self.bonds {
            adjacency[bond.a].push(bond.b);
            adjacency[bond.b].push(bond.a);
        }
        let mut visited = vec![false; self.atoms.len()];
        let mut queue = VecDeque::from([0]);
        visited[0] = true;
        while let Some(atom) = queue.pop_front() {
            for &n in &adjacency[atom] {
                if !visited[n] {
                    visited[n] = true;
                    queue.push_back(n);
                }
            }
        }
        visited.into_iter().all(|v| v)
    }

    fn validate_tags(&self) -> Result<Vec<usize>, SmirksError> {
        let mut tagged: Vec<(u32, usize)> = self
            .atoms
            .iter()
            .enumerate()
            .filter_map(|(i, a)| a.tag.map(|t| (t, i)))
            .collect();
        tagged.sort_unstable();

        let mut seen = HashSet::new();
        for &(tag, _) in &tagged {
            if !seen.insert(tag) {
                return Err(SmirksError::DuplicateTag { tag });
            }
        }
        let contiguous = tagged
            .iter()
            .enumerate()
            .all(|(i, &(tag, _))| tag as usize == i + 1);
        if !contiguous {
            return Err(SmirksError::NonContiguousTags {
                tags: tagged.iter().map(|&(t, _)| t).collect(),
                count: tagged.len(),
            });
        }
        Ok(tagged.into_iter().map(|(_, i)| i).collect())
    }
}
