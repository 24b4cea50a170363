use std::collections::{BTreeMap, BTreeSet};

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableUnGraph};
use petgraph::visit::EdgeRef;

use crate::error::CgrError;

/// Atom key: the map number shared by the reagent and product sides.
pub type MapNum = u32;

#[derive(Debug, Clone)]
struct Node<A> {
    key: MapNum,
    data: A,
}

/// Undirected labeled graph keyed by map number.
///
/// Atoms are addressed by their [`MapNum`], never by storage index, so
/// two graphs describing the same reaction can be compared and merged
/// key by key. At most one bond joins a pair of atoms. Iteration over
/// atoms is in ascending key order.
pub struct MolGraph<A, B> {
    graph: StableUnGraph<Node<A>, B>,
    index: BTreeMap<MapNum, NodeIndex>,
}

impl<A, B> MolGraph<A, B> {
    pub fn new() -> Self {
        Self {
            graph: StableUnGraph::default(),
            index: BTreeMap::new(),
        }
    }

    pub fn add_atom(&mut self, key: MapNum, atom: A) -> Result<(), CgrError> {
        if self.index.contains_key(&key) {
            return Err(CgrError::AmbiguousMapping { map: key });
        }
        let idx = self.graph.add_node(Node { key, data: atom });
        self.index.insert(key, idx);
        Ok(())
    }

    /// Atom for `key`, inserting `init()` first when the key is new.
    pub fn atom_or_insert_with(&mut self, key: MapNum, init: impl FnOnce() -> A) -> &mut A {
        let idx = match self.index.get(&key) {
            Some(&idx) => idx,
            None => {
                let idx = self.graph.add_node(Node { key, data: init() });
                self.index.insert(key, idx);
                idx
            }
        };
        &mut self.graph[idx].data
    }

    pub fn remove_atom(&mut self, key: MapNum) -> Option<A> {
        let idx = self.index.remove(&key)?;
        self.graph.remove_node(idx).map(|node| node.data)
    }

    pub fn atom(&self, key: MapNum) -> Option<&A> {
        self.index.get(&key).map(|&idx| &self.graph[idx].data)
    }

    pub fn atom_mut(&mut self, key: MapNum) -> Option<&mut A> {
        let idx = *self.index.get(&key)?;
        Some(&mut self.graph[idx].data)
    }

    pub fn last_key(&self) -> Option<MapNum> {
        self.index.keys().next_back().copied()
    }

    pub fn contains(&self, key: MapNum) -> bool {
        self.index.contains_key(&key)
    }

    /// Insert or replace the bond between two existing atoms. Returns the
    /// replaced bond, if any.
    pub fn add_bond(&mut self, a: MapNum, b: MapNum, bond: B) -> Result<Option<B>, CgrError> {
        let (ia, ib) = (self.node(a)?, self.node(b)?);
        match self.graph.find_edge(ia, ib) {
            Some(e) => Ok(Some(std::mem::replace(&mut self.graph[e], bond))),
            None => {
                self.graph.add_edge(ia, ib, bond);
                Ok(None)
            }
        }
    }

    /// Bond between two existing atoms, inserting `init()` first when they
    /// are not bonded yet.
    pub fn bond_or_insert_with(
        &mut self,
        a: MapNum,
        b: MapNum,
        init: impl FnOnce() -> B,
    ) -> Result<&mut B, CgrError> {
        let (ia, ib) = (self.node(a)?, self.node(b)?);
        let e = match self.graph.find_edge(ia, ib) {
            Some(e) => e,
            None => self.graph.add_edge(ia, ib, init()),
        };
        Ok(&mut self.graph[e])
    }

    pub fn bond(&self, a: MapNum, b: MapNum) -> Option<&B> {
        self.edge(a, b).map(|e| &self.graph[e])
    }

    pub fn bond_mut(&mut self, a: MapNum, b: MapNum) -> Option<&mut B> {
        let e = self.edge(a, b)?;
        Some(&mut self.graph[e])
    }

    pub fn remove_bond(&mut self, a: MapNum, b: MapNum) -> Option<B> {
        let e = self.edge(a, b)?;
        self.graph.remove_edge(e)
    }

    pub fn atom_count(&self) -> usize {
        self.index.len()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn keys(&self) -> impl Iterator<Item = MapNum> + '_ {
        self.index.keys().copied()
    }

    pub fn atoms(&self) -> impl Iterator<Item = (MapNum, &A)> + '_ {
        self.index
            .iter()
            .map(move |(&key, &idx)| (key, &self.graph[idx].data))
    }

    pub fn for_each_atom_mut(&mut self, mut f: impl FnMut(MapNum, &mut A)) {
        for idx in self.index.values() {
            let node = &mut self.graph[*idx];
            f(node.key, &mut node.data);
        }
    }

    /// Bonds as `(a, b, bond)` with `a < b`, in insertion order.
    pub fn bonds(&self) -> impl Iterator<Item = (MapNum, MapNum, &B)> + '_ {
        self.graph.edge_indices().filter_map(move |e| {
            let (ia, ib) = self.graph.edge_endpoints(e)?;
            let (a, b) = (self.graph[ia].key, self.graph[ib].key);
            Some((a.min(b), a.max(b), &self.graph[e]))
        })
    }

    pub fn for_each_bond_mut(&mut self, mut f: impl FnMut(&mut B)) {
        let edges: Vec<EdgeIndex> = self.graph.edge_indices().collect();
        for e in edges {
            f(&mut self.graph[e]);
        }
    }

    pub fn neighbors(&self, key: MapNum) -> impl Iterator<Item = MapNum> + '_ {
        self.index
            .get(&key)
            .into_iter()
            .flat_map(move |&idx| self.graph.neighbors(idx))
            .map(move |n| self.graph[n].key)
    }

    pub fn bonds_of(&self, key: MapNum) -> impl Iterator<Item = (MapNum, &B)> + '_ {
        self.index
            .get(&key)
            .into_iter()
            .flat_map(move |&idx| self.graph.edges(idx))
            .map(move |e| {
                let other = if self.graph[e.source()].key == key {
                    e.target()
                } else {
                    e.source()
                };
                (self.graph[other].key, e.weight())
            })
    }

    pub fn degree(&self, key: MapNum) -> usize {
        self.neighbors(key).count()
    }

    /// Keys grouped by connected component. Each group is sorted, and
    /// groups are ordered by their smallest key.
    pub fn connected_components(&self) -> Vec<Vec<MapNum>> {
        let mut visited = BTreeSet::new();
        let mut components = Vec::new();
        for start in self.keys() {
            if visited.contains(&start) {
                continue;
            }
            let mut component = Vec::new();
            let mut stack = vec![start];
            while let Some(current) = stack.pop() {
                if !visited.insert(current) {
                    continue;
                }
                component.push(current);
                for neighbor in self.neighbors(current) {
                    if !visited.contains(&neighbor) {
                        stack.push(neighbor);
                    }
                }
            }
            component.sort_unstable();
            components.push(component);
        }
        components
    }

    fn node(&self, key: MapNum) -> Result<NodeIndex, CgrError> {
        self.index
            .get(&key)
            .copied()
            .ok_or(CgrError::UnknownAtom { atom: key })
    }

    fn edge(&self, a: MapNum, b: MapNum) -> Option<EdgeIndex> {
        let (ia, ib) = (*self.index.get(&a)?, *self.index.get(&b)?);
        self.graph.find_edge(ia, ib)
    }
}

impl<A: Clone, B: Clone> MolGraph<A, B> {
    /// Induced subgraph on `keys`. Unknown keys are ignored.
    pub fn subgraph(&self, keys: &BTreeSet<MapNum>) -> MolGraph<A, B> {
        let mut sub = MolGraph::new();
        for &key in keys {
            if let Some(atom) = self.atom(key) {
                let idx = sub.graph.add_node(Node {
                    key,
                    data: atom.clone(),
                });
                sub.index.insert(key, idx);
            }
        }
        for (a, b, bond) in self.bonds() {
            if let (Some(&ia), Some(&ib)) = (sub.index.get(&a), sub.index.get(&b)) {
                sub.graph.add_edge(ia, ib, bond.clone());
            }
        }
        sub
    }
}

impl<A: Clone, B: Clone> Clone for MolGraph<A, B> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            index: self.index.clone(),
        }
    }
}

impl<A, B> Default for MolGraph<A, B> {
    fn default() -> Self {
        Self::new()
    }
}

/// Key-wise equality: same atoms under the same keys and the same bonds
/// between the same key pairs, regardless of insertion order.
impl<A: PartialEq, B: PartialEq> PartialEq for MolGraph<A, B> {
    fn eq(&self, other: &Self) -> bool {
        if self.atom_count() != other.atom_count() || self.bond_count() != other.bond_count() {
            return false;
        }
        if !self.atoms().all(|(key, atom)| other.atom(key) == Some(atom)) {
            return false;
        }
        self.bonds()
            .all(|(a, b, bond)| other.bond(a, b) == Some(bond))
    }
}

impl<A: std::fmt::Debug, B: std::fmt::Debug> std::fmt::Debug for MolGraph<A, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MolGraph")
            .field("atoms", &self.atoms().collect::<Vec<_>>())
            .field("bonds", &self.bonds().collect::<Vec<_>>())
            .finish()
    }
}
