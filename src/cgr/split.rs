use crate::container::Container;

/// Connected components of a graph as separate graphs of the same kind,
/// ordered by their smallest atom key. Metadata is copied into every
/// fragment only when `meta` is set.
pub fn split(graph: &Container, meta: bool) -> Vec<Container> {
    graph
        .connected_components()
        .into_iter()
        .map(|component| graph.substructure(&component.into_iter().collect(), meta))
        .collect()
}
