use phf::{Map, phf_map};

static SYMBOL_TO_ATOMIC_NUMBER: Map<&'static str, u8> = phf_map! {
    "H" => 1, "He" => 2, "Li" => 3, "Be" => 4, "B" => 5, "C" => 6, "N" => 7, "O" => 8,
    "F" => 9, "Ne" => 10, "Na" => 11, "Mg" => 12, "Al" => 13, "Si" => 14, "P" => 15,
    "S" => 16, "Cl" => 17, "Ar" => 18, "K" => 19, "Ca" => 20, "Sc" => 21, "Ti" => 22,
    "V" => 23, "Cr" => 24, "Mn" => 25, "Fe" => 26, "Co" => 27, "Ni" => 28, "Cu" => 29,
    "Zn" => 30, "Ga" => 31, "Ge" => 32, "As" => 33, "Se" => 34, "Br" => 35, "Kr" => 36,
    "Rb" => 37, "Sr" => 38, "Y" => 39, "Zr" => 40, "Nb" => 41, "Mo" => 42, "Tc" => 43,
    "Ru" => 44, "Rh" => 45, "Pd" => 46, "Ag" => 47, "Cd" => 48, "In" => 49, "Sn" => 50,
    "Sb" => 51, "Te" => 52, "I" => 53, "Xe" => 54, "Cs" => 55, "Ba" => 56, "Pt" => 78,
    "Au" => 79, "Hg" => 80, "Tl" => 81, "Pb" => 82, "Bi" => 83,
};

/// Symbols that may be written in lowercase (aromatic) form inside a pattern.
static AROMATIC_SYMBOLS: Map<&'static str, u8> = phf_map! {
    "b" => 5, "c" => 6, "n" => 7, "o" => 8, "p" => 15, "s" => 16, "se" => 34, "as" => 33,
};

/// Looks up the atomic number of an element symbol such as `"C"` or `"Cl"`.
pub fn atomic_number(symbol: &str) -> Option<u8> {
    SYMBOL_TO_ATOMIC_NUMBER.get(symbol).copied()
}

/// Looks up the atomic number of an aromatic lowercase symbol such as `"c"` or `"se"`.
pub fn aromatic_atomic_number(symbol: &str) -> Option<u8> {
    AROMATIC_SYMBOLS.get(symbol).copied()
}

/// Returns the element symbol for an atomic number, if it is in the table.
pub fn symbol(atomic_number: u8) -> Option<&'static str> {
    SYMBOL_TO_ATOMIC_NUMBER
        .entries()
        .find(|&(_, &z)| z == atomic_number)
        .map(|(&s, _)| s)
}
