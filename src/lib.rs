pub mod attr;
pub mod cgr;
pub mod container;
pub mod element;
pub mod error;
pub mod graph;
pub mod radical;
pub mod reaction;
pub mod valence;

pub use attr::{
    Atom, AtomState, Bond, BondOrder, BondState, CombinedAtom, CombinedBond, Hybridization, Role,
    Stereo, Transition,
};
pub use cgr::{
    compose, compose_with, decompose, split, union, ComposeOptions, IdAllocator, Rule, RuleLog,
};
pub use container::{Container, GraphKind, Meta};
pub use element::Element;
pub use error::CgrError;
pub use graph::{MapNum, MolGraph};
pub use radical::Radical;
pub use reaction::Reaction;
pub use valence::{Assessment, StandardValence, ValenceOracle};
