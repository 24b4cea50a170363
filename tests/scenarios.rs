use cgrcrab::{
    compose, decompose, split, union, Atom, Bond, BondOrder, Container, Element, MapNum, Rule,
};

fn atom_graph(keys: &[MapNum], element: Element) -> Container {
    let mut m = Container::molecule();
    for &k in keys {
        m.add_atom(k, Atom::new(element)).unwrap();
    }
    m
}

fn keys(m: &Container) -> Vec<MapNum> {
    m.keys().collect()
}

// Two lone atoms: union and unbalanced compose
#[test]
fn scenario_lone_atoms() {
    let a = atom_graph(&[1], Element::C);
    let b = atom_graph(&[2], Element::O);

    let u = union(&a, &b).unwrap();
    assert_eq!(u.atom_count(), 2);
    assert_eq!(u.bond_count(), 0);

    let (cgr, log) = compose(&a, &b, false).unwrap();
    assert!(log.is_empty());
    for key in [1, 2] {
        let atom = cgr.atom(key).unwrap();
        assert_eq!(atom.s, atom.p, "atom {key}");
    }
}

// Bond broken, atom 2 leaves
#[test]
fn scenario_leaving_atom() {
    let mut r = atom_graph(&[1, 2], Element::C);
    r.add_bond(1, 2, Bond::new(BondOrder::Single)).unwrap();
    let p = atom_graph(&[1], Element::C);

    let (cgr, _) = compose(&r, &p, false).unwrap();
    let bond = cgr.bond(1, 2).unwrap();
    assert_eq!(bond.s.order, Some(BondOrder::Single));
    assert_eq!(bond.p.order, None);
    let leaving = cgr.atom(2).unwrap();
    assert_eq!(leaving.p.charge, leaving.s.charge);
    assert_eq!(leaving.p.radical, leaving.s.radical);

    let reaction = decompose(&cgr);
    assert_eq!(reaction.reagents.len(), 1);
    assert_eq!(reaction.reagents[0], r);
    let products: Vec<Vec<MapNum>> = reaction.products.iter().map(keys).collect();
    assert_eq!(products, vec![vec![1], vec![2]]);
    assert_eq!(reaction.products[0], p);
}

// Sulfur oxidized by two units with no radical change
#[test]
fn scenario_charge_neutralization() {
    let mut r = Container::molecule();
    r.add_atom(1, Atom::new(Element::S)).unwrap();
    r.add_atom(2, Atom::new(Element::C)).unwrap();
    r.add_bond(1, 2, Bond::new(BondOrder::Single)).unwrap();
    let mut p = Container::molecule();
    p.add_atom(1, Atom::new(Element::S).with_charge(2)).unwrap();

    let (cgr, log) = compose(&r, &p, true).unwrap();

    let hydroxides = log.get(Rule::HydroxideNeutralization);
    assert_eq!(hydroxides.len(), 2);
    for &(key, center) in hydroxides {
        assert_eq!(center, 1);
        let atom = cgr.atom(key).unwrap();
        assert_eq!(atom.element, Some(Element::O));
        assert_eq!(cgr.degree(key), 0);
        assert!(!r.contains(key));
    }
}

#[test]
fn split_two_triangles_any_insertion_order() {
    let orders: [[MapNum; 6]; 3] = [[1, 2, 3, 4, 5, 6], [6, 5, 4, 3, 2, 1], [4, 1, 6, 2, 5, 3]];
    for order in orders {
        let mut m = atom_graph(&order, Element::C);
        for (a, b) in [(1, 2), (2, 3), (3, 1), (4, 5), (5, 6), (6, 4)] {
            m.add_bond(a, b, Bond::new(BondOrder::Single)).unwrap();
        }
        let parts = split(&m, false);
        assert_eq!(parts.len(), 2);
        for part in &parts {
            assert_eq!(part.atom_count(), 3);
            assert_eq!(part.bond_count(), 3);
        }
        assert_eq!(keys(&parts[0]), vec![1, 2, 3]);
        assert_eq!(keys(&parts[1]), vec![4, 5, 6]);
    }
}
