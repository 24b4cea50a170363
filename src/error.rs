use thiserror::Error;

use crate::graph::MapNum;

/// Error returned by union, compose and decompose.
///
/// Every variant carries the atom keys involved so a caller can point at
/// the offending part of the reaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CgrError {
    /// Two graphs that must be node-disjoint share atom keys.
    #[error("atom keys {atoms:?} are present in both graphs")]
    ConflictingIdentity { atoms: Vec<MapNum> },
    /// An atom key appears more than once within a single graph.
    #[error("map number {map} is assigned to more than one atom")]
    AmbiguousMapping { map: MapNum },
    /// The valence oracle could not resolve a value for an atom.
    #[error("cannot compute valence state of atom {atom}: {reason}")]
    Computation { atom: MapNum, reason: String },
    /// A bond or lookup references an atom key that is not in the graph.
    #[error("atom {atom} is not in the graph")]
    UnknownAtom { atom: MapNum },
}

impl CgrError {
    pub(crate) fn computation(atom: MapNum, reason: impl Into<String>) -> Self {
        Self::Computation {
            atom,
            reason: reason.into(),
        }
    }
}
