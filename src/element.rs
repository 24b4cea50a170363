//! Compact periodic table for the elements a reaction graph normally holds.
//!
//! Covers hydrogen through xenon. Each entry carries the number of outer
//! shell electrons, the mass number of the most abundant natural isotope
//! and the default valences used for hydrogen counting.

use serde::{Deserialize, Serialize};

/// Chemical element, identified by atomic number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Element {
    H = 1,
    He = 2,
    Li = 3,
    Be = 4,
    B = 5,
    C = 6,
    N = 7,
    O = 8,
    F = 9,
    Ne = 10,
    Na = 11,
    Mg = 12,
    Al = 13,
    Si = 14,
    P = 15,
    S = 16,
    Cl = 17,
    Ar = 18,
    K = 19,
    Ca = 20,
    Sc = 21,
    Ti = 22,
    V = 23,
    Cr = 24,
    Mn = 25,
    Fe = 26,
    Co = 27,
    Ni = 28,
    Cu = 29,
    Zn = 30,
    Ga = 31,
    Ge = 32,
    As = 33,
    Se = 34,
    Br = 35,
    Kr = 36,
    Rb = 37,
    Sr = 38,
    Y = 39,
    Zr = 40,
    Nb = 41,
    Mo = 42,
    Tc = 43,
    Ru = 44,
    Rh = 45,
    Pd = 46,
    Ag = 47,
    Cd = 48,
    In = 49,
    Sn = 50,
    Sb = 51,
    Te = 52,
    I = 53,
    Xe = 54,
}

static ELEMENTS: [Element; 54] = [
    Element::H, Element::He, Element::Li, Element::Be, Element::B, Element::C,
    Element::N, Element::O, Element::F, Element::Ne, Element::Na, Element::Mg,
    Element::Al, Element::Si, Element::P, Element::S, Element::Cl, Element::Ar,
    Element::K, Element::Ca, Element::Sc, Element::Ti, Element::V, Element::Cr,
    Element::Mn, Element::Fe, Element::Co, Element::Ni, Element::Cu, Element::Zn,
    Element::Ga, Element::Ge, Element::As, Element::Se, Element::Br, Element::Kr,
    Element::Rb, Element::Sr, Element::Y, Element::Zr, Element::Nb, Element::Mo,
    Element::Tc, Element::Ru, Element::Rh, Element::Pd, Element::Ag, Element::Cd,
    Element::In, Element::Sn, Element::Sb, Element::Te, Element::I, Element::Xe,
];

static SYMBOLS: [&str; 54] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne",
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar", "K", "Ca",
    "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn",
    "Ga", "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr",
    "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn",
    "Sb", "Te", "I", "Xe",
];

static OUTER_ELECTRONS: [u8; 54] = [
    1, 2, // H  He
    1, 2, 3, 4, 5, 6, 7, 8, // Li..Ne
    1, 2, 3, 4, 5, 6, 7, 8, // Na..Ar
    1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 3, 4, 5, 6, 7, 8, // K ..Kr
    1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 3, 4, 5, 6, 7, 8, // Rb..Xe
];

// mass number of the most abundant natural isotope
static ABUNDANT_ISOTOPES: [u16; 54] = [
    1, 4, // H  He
    7, 9, 11, 12, 14, 16, 19, 20, // Li..Ne
    23, 24, 27, 28, 31, 32, 35, 40, // Na..Ar
    39, 40, 45, 48, 51, 52, 55, 56, 59, 58, 63, 64, 69, 74, 75, 80, 79, 84, // K ..Kr
    85, 88, 89, 90, 93, 98, 98, 102, 103, 106, 107, 114, 115, 120, 121, 130, 127, 132, // Rb..Xe
];

impl Element {
    pub fn from_atomic_num(n: u8) -> Option<Element> {
        ELEMENTS.get(usize::from(n).checked_sub(1)?).copied()
    }

    pub fn from_symbol(s: &str) -> Option<Element> {
        SYMBOLS
            .iter()
            .position(|&sym| sym == s)
            .map(|i| ELEMENTS[i])
    }

    pub fn symbol(self) -> &'static str {
        SYMBOLS[self as usize - 1]
    }

    /// Electrons in the outermost shell of the neutral atom.
    pub fn outer_shell_electrons(self) -> u8 {
        OUTER_ELECTRONS[self as usize - 1]
    }

    pub fn most_abundant_isotope(self) -> u16 {
        ABUNDANT_ISOTOPES[self as usize - 1]
    }

    pub fn atomic_num(self) -> u8 {
        self as u8
    }

    /// Valences an uncharged, non-radical atom of this element may take.
    ///
    /// Empty for metals and noble gases; hydrogen counting is undefined
    /// for those.
    pub fn default_valences(self) -> &'static [u8] {
        match self {
            Element::H => &[1],
            Element::B => &[3],
            Element::C => &[4],
            Element::N => &[3, 5],
            Element::O => &[2],
            Element::F | Element::Cl | Element::Br => &[1],
            Element::Si | Element::Ge => &[4],
            Element::P | Element::As | Element::Sb => &[3, 5],
            Element::S | Element::Se | Element::Te => &[2, 4, 6],
            Element::I => &[1, 3, 5, 7],
            _ => &[],
        }
    }

    /// Resolve a mass-difference isotope notation.
    ///
    /// File formats store isotopes as an offset from the most abundant
    /// isotope; `offset == 0` means the natural isotope itself.
    pub fn isotope_from_offset(self, offset: i16) -> Option<u16> {
        let mass = i32::from(self.most_abundant_isotope()) + i32::from(offset);
        u16::try_from(mass).ok().filter(|&m| m > 0)
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}
