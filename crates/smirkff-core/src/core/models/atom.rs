use super::element;

/// Represents an atom of a molecular graph together with its caller-perceived attributes.
///
/// Ring membership, aromaticity and implicit hydrogen counts are never perceived here;
/// they are supplied by whoever builds the molecule and only read by the pattern matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    /// Optional display name (e.g., "C1", "H3").
    pub name: Option<String>,
    /// The atomic number of the element.
    pub atomic_number: u8,
    /// The formal charge in elementary charge units.
    pub formal_charge: i8,
    /// Whether the atom is part of an aromatic system.
    pub is_aromatic: bool,
    /// Number of hydrogens that are not present as explicit graph atoms.
    pub implicit_hydrogens: u8,
    /// Sizes of the smallest set of smallest rings this atom belongs to; empty when acyclic.
    pub ring_sizes: Vec<u8>,
}

impl Atom {
    pub fn new(atomic_number: u8) -> Self {
        Self {
            name: None,
            atomic_number,
            formal_charge: 0,
            is_aromatic: false,
            implicit_hydrogens: 0,
            ring_sizes: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_charge(mut self, formal_charge: i8) -> Self {
        self.formal_charge = formal_charge;
        self
    }

    pub fn aromatic(mut self) -> Self {
        self.is_aromatic = true;
        self
    }

    pub fn with_implicit_hydrogens(mut self, count: u8) -> Self {
        self.implicit_hydrogens = count;
        self
    }

    pub fn with_ring_sizes(mut self, sizes: impl IntoIterator<Item = u8>) -> Self {
        self.ring_sizes = sizes.into_iter().collect();
        self
    }

    pub fn is_in_ring(&self) -> bool {
        !self.ring_sizes.is_empty()
    }

    /// Number of rings the atom participates in.
    pub fn ring_count(&self) -> usize {
        self.ring_sizes.len()
    }

    pub fn is_in_ring_of_size(&self, size: u8) -> bool {
        self.ring_sizes.contains(&size)
    }

    pub fn is_hydrogen(&self) -> bool {
        self.atomic_number == 1
    }

    pub fn symbol(&self) -> Option<&'static str> {
        element::symbol(self.atomic_number)
    }

    /// Returns the name if set, otherwise the element symbol, otherwise `"#<z>"`.
    pub fn label(&self) -> String {
        match (&self.name, self.symbol()) {
            (Some(name), _) => name.clone(),
            (None, Some(symbol)) => symbol.to_string(),
            (None, None) => format!("#{}", self.atomic_number),
        }
    }
}
