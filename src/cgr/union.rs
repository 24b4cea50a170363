use crate::container::{Container, GraphKind};
use crate::error::CgrError;
use crate::graph::MapNum;

/// Disjoint union of two graphs.
///
/// The result is a CGR when either input is one, in which case a
/// molecule operand is widened first. Metadata is not carried over.
/// Fails with [`CgrError::ConflictingIdentity`] listing every shared key.
pub fn union(a: &Container, b: &Container) -> Result<Container, CgrError> {
    let shared: Vec<MapNum> = a.keys().filter(|&k| b.contains(k)).collect();
    if !shared.is_empty() {
        return Err(CgrError::ConflictingIdentity { atoms: shared });
    }

    let kind = if a.is_cgr() || b.is_cgr() {
        GraphKind::Cgr
    } else {
        GraphKind::Molecule
    };
    let mut merged = Container::new(kind);
    for operand in [a, b] {
        let widened;
        let operand = if kind == GraphKind::Cgr && !operand.is_cgr() {
            widened = operand.to_cgr();
            &widened
        } else {
            operand
        };
        for (key, atom) in operand.atoms() {
            merged.add_atom(key, atom.clone())?;
        }
        for (x, y, bond) in operand.bonds() {
            merged.add_bond(x, y, bond.clone())?;
        }
    }
    Ok(merged)
}
