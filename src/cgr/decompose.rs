use tracing::debug;

use super::split::split;
use crate::attr::Role;
use crate::container::{Container, GraphKind};
use crate::graph::MapNum;
use crate::reaction::Reaction;

/// Rebuild the reagent and product molecules of a CGR.
///
/// Each side keeps the bonds present on that side and is then split into
/// connected molecules. Atoms, synthetic ones included, appear on both
/// sides. The reaction inherits the CGR's metadata; the molecules carry
/// none.
pub fn decompose(cgr: &Container) -> Reaction {
    let reagents = side(cgr, Role::Before);
    let products = side(cgr, Role::After);
    debug!(
        reagents = reagents.len(),
        products = products.len(),
        "decomposed"
    );
    Reaction {
        reagents,
        products,
        meta: cgr.meta.clone(),
        rules: None,
    }
}

fn side(cgr: &Container, role: Role) -> Vec<Container> {
    let mut graph = cgr.clone().with_kind(GraphKind::Molecule);
    graph.meta.clear();

    let absent: Vec<(MapNum, MapNum)> = graph
        .bonds()
        .filter(|(_, _, bond)| bond.state(role).is_absent())
        .map(|(a, b, _)| (a, b))
        .collect();
    for (a, b) in absent {
        graph.remove_bond(a, b);
    }

    if role == Role::After {
        graph.for_each_atom_mut(|_, atom| atom.s = atom.p.clone());
        graph.for_each_bond_mut(|bond| bond.s = bond.p.clone());
    }

    split(&graph, false)
        .into_iter()
        .map(|mut molecule| {
            molecule.fix_data();
            molecule
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::{Atom, Bond, BondOrder};
    use crate::element::Element;

    /// C1-C2 broken into C1 and C2 while C2=O3 forms.
    fn cgr() -> Container {
        let mut g = Container::cgr();
        for (key, element) in [(1, Element::C), (2, Element::C), (3, Element::O)] {
            g.add_atom(key, Atom::new(element)).unwrap();
        }
        g.add_bond(1, 2, Bond::changed(Some(BondOrder::Single), None))
            .unwrap();
        g.add_bond(2, 3, Bond::changed(None, Some(BondOrder::Double)))
            .unwrap();
        g.atom_mut(3).unwrap().p.charge = Some(-1);
        g.meta.insert("id".into(), vec!["r1".into()]);
        g.fix_data();
        g
    }

    #[test]
    fn sides_follow_present_bonds() {
        let r = decompose(&cgr());
        let reagent_keys: Vec<Vec<MapNum>> =
            r.reagents.iter().map(|m| m.keys().collect()).collect();
        assert_eq!(reagent_keys, vec![vec![1, 2], vec![3]]);
        let product_keys: Vec<Vec<MapNum>> =
            r.products.iter().map(|m| m.keys().collect()).collect();
        assert_eq!(product_keys, vec![vec![1], vec![2, 3]]);
        assert_eq!(r.meta["id"], vec!["r1".to_string()]);
        assert!(r.reagents.iter().all(|m| m.meta.is_empty() && !m.is_cgr()));
    }

    #[test]
    fn product_state_becomes_molecule_state() {
        let r = decompose(&cgr());
        let co = &r.products[1];
        assert_eq!(co.bond(2, 3).unwrap().s.order, Some(BondOrder::Double));
        assert_eq!(co.atom(3).unwrap().s.charge, Some(-1));
        assert_eq!(co.atom(3).unwrap().p.charge, Some(-1));
        let o = &r.reagents[1];
        assert_eq!(o.atom(3).unwrap().s.charge, Some(0));
        assert_eq!(o.atom(3).unwrap().p.charge, Some(0));
    }

    #[test]
    fn empty_cgr() {
        let r = decompose(&Container::cgr());
        assert!(r.reagents.is_empty());
        assert!(r.products.is_empty());
    }
}
