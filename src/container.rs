use std::collections::{BTreeMap, BTreeSet};
use std::ops::{Deref, DerefMut};

use crate::attr::{Atom, Bond};
use crate::graph::{MapNum, MolGraph};

/// Free-form metadata attached to a graph or reaction.
pub type Meta = BTreeMap<String, Vec<String>>;

/// What a [`Container`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphKind {
    /// Single-state molecule graph. `s` is the current state and `p`
    /// mirrors it.
    Molecule,
    /// Condensed graph of reaction with independent `s` and `p` states.
    Cgr,
}

/// Molecule or CGR: a map-number-keyed graph of dual-state atoms and
/// bonds plus metadata.
///
/// Dereferences to [`MolGraph`] for atom and bond access.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    kind: GraphKind,
    graph: MolGraph<Atom, Bond>,
    pub meta: Meta,
}

impl Container {
    pub fn new(kind: GraphKind) -> Container {
        Container {
            kind,
            graph: MolGraph::new(),
            meta: Meta::new(),
        }
    }

    pub fn molecule() -> Container {
        Container::new(GraphKind::Molecule)
    }

    pub fn cgr() -> Container {
        Container::new(GraphKind::Cgr)
    }

    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    pub fn is_cgr(&self) -> bool {
        self.kind == GraphKind::Cgr
    }

    /// Largest atom key, `0` when empty.
    pub fn max_key(&self) -> MapNum {
        self.graph.last_key().unwrap_or(0)
    }

    /// Recompute the combined (`sp`) records of every atom and bond.
    ///
    /// For a molecule the `p` records are first reset to mirror `s`.
    /// Running it twice gives the same result as running it once.
    pub fn fix_data(&mut self) {
        let mirror = self.kind == GraphKind::Molecule;
        self.graph.for_each_atom_mut(|_, atom| {
            if mirror {
                atom.p = atom.s.clone();
            }
            atom.update_combined();
        });
        self.graph.for_each_bond_mut(|bond| {
            if mirror {
                bond.p = bond.s.clone();
            }
            bond.update_combined();
        });
    }

    /// Copy of this graph promoted to a CGR.
    ///
    /// A molecule is widened so that every `p` record mirrors its `s`
    /// record, coordinates included. A CGR is returned as is.
    pub fn to_cgr(&self) -> Container {
        let mut cgr = self.clone();
        if cgr.kind == GraphKind::Molecule {
            cgr.kind = GraphKind::Cgr;
            cgr.graph.for_each_atom_mut(|_, atom| {
                atom.p = atom.s.clone();
                atom.update_combined();
            });
            cgr.graph.for_each_bond_mut(|bond| {
                bond.p = bond.s.clone();
                bond.update_combined();
            });
        }
        cgr
    }

    /// Induced subgraph on `keys`, keeping the kind. Metadata is copied
    /// only when `meta` is set.
    pub fn substructure(&self, keys: &BTreeSet<MapNum>, meta: bool) -> Container {
        Container {
            kind: self.kind,
            graph: self.graph.subgraph(keys),
            meta: if meta { self.meta.clone() } else { Meta::new() },
        }
    }

    /// Same graph reinterpreted as `kind`, without touching any record.
    pub(crate) fn with_kind(mut self, kind: GraphKind) -> Container {
        self.kind = kind;
        self
    }
}

impl Deref for Container {
    type Target = MolGraph<Atom, Bond>;

    fn deref(&self) -> &Self::Target {
        &self.graph
    }
}

impl DerefMut for Container {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.graph
    }
}
