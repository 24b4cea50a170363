//! Radical state codec.
//!
//! Files store a radical as a spin multiplicity (singlet, doublet,
//! triplet). Balancing needs an integer count of unpaired-electron
//! "levels" so it can add or remove one at a time. A doublet is one level.
//! Singlet and triplet carbenes are both two levels. Going up from two
//! levels is not representable.

use serde::{Deserialize, Serialize};

/// Radical multiplicity of an atom. `None` at the use sites means no
/// radical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Radical {
    /// Paired biradical.
    Singlet,
    /// One unpaired electron.
    Doublet,
    /// Two unpaired electrons.
    Triplet,
}

/// Highest level [`radical_from_level`] can map back.
pub const MAX_RADICAL_LEVEL: u8 = 2;

impl Radical {
    /// Multiplicity code used by MDL-style files (1, 2, 3).
    pub fn multiplicity(self) -> u8 {
        match self {
            Radical::Singlet => 1,
            Radical::Doublet => 2,
            Radical::Triplet => 3,
        }
    }

    pub fn from_multiplicity(code: u8) -> Option<Radical> {
        match code {
            1 => Some(Radical::Singlet),
            2 => Some(Radical::Doublet),
            3 => Some(Radical::Triplet),
            _ => None,
        }
    }
}

/// Integer level of an optional radical state.
pub fn radical_level(radical: Option<Radical>) -> u8 {
    match radical {
        None => 0,
        Some(Radical::Doublet) => 1,
        Some(Radical::Singlet) | Some(Radical::Triplet) => 2,
    }
}

/// Map a level back to a radical state. Returns `Err(level)` above
/// [`MAX_RADICAL_LEVEL`].
pub fn radical_from_level(level: u8) -> Result<Option<Radical>, u8> {
    match level {
        0 => Ok(None),
        1 => Ok(Some(Radical::Doublet)),
        2 => Ok(Some(Radical::Triplet)),
        _ => Err(level),
    }
}

/// Raise a radical state by one level.
pub fn increment_radical(radical: Option<Radical>) -> Result<Option<Radical>, u8> {
    radical_from_level(radical_level(radical) + 1)
}
