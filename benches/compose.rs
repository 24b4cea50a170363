use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cgrcrab::{
    compose, decompose, split, union, Atom, Bond, BondOrder, Container, Element, MapNum,
};

fn chain(first: MapNum, len: MapNum, element: Element) -> Container {
    let mut m = Container::molecule();
    for k in first..first + len {
        m.add_atom(k, Atom::new(element)).unwrap();
        if k > first {
            m.add_bond(k - 1, k, Bond::new(BondOrder::Single)).unwrap();
        }
    }
    m
}

fn bench_substitution(c: &mut Criterion) {
    let mut r = chain(1, 2, Element::C);
    r.add_atom(3, Atom::new(Element::Br)).unwrap();
    r.add_bond(2, 3, Bond::new(BondOrder::Single)).unwrap();
    let mut p = chain(1, 2, Element::C);
    p.add_atom(4, Atom::new(Element::O)).unwrap();
    p.add_bond(2, 4, Bond::new(BondOrder::Single)).unwrap();

    c.bench_function("substitution_balanced", |b| {
        b.iter(|| black_box(compose(&r, &p, true).unwrap()))
    });
}

fn bench_redox(c: &mut Criterion) {
    let mut r = chain(1, 2, Element::C);
    r.add_atom(3, Atom::new(Element::S)).unwrap();
    r.add_bond(2, 3, Bond::new(BondOrder::Single)).unwrap();
    let mut p = Container::molecule();
    p.add_atom(3, Atom::new(Element::S).with_charge(2)).unwrap();

    c.bench_function("redox_synthetic_atoms", |b| {
        b.iter(|| black_box(compose(&r, &p, true).unwrap()))
    });
}

fn bench_long_chain(c: &mut Criterion) {
    // 200 carbons, every tenth bond becomes double
    let r = chain(1, 200, Element::C);
    let mut p = r.clone();
    for k in (1..200).step_by(10) {
        p.bond_mut(k, k + 1).unwrap().s.order = Some(BondOrder::Double);
    }
    p.fix_data();

    c.bench_function("compose_chain_200", |b| {
        b.iter(|| black_box(compose(&r, &p, true).unwrap()))
    });

    let (cgr, _) = compose(&r, &p, true).unwrap();
    c.bench_function("decompose_chain_200", |b| {
        b.iter(|| black_box(decompose(&cgr)))
    });
}

fn bench_union_split(c: &mut Criterion) {
    let parts: Vec<Container> = (0..20).map(|i| chain(i * 10 + 1, 10, Element::C)).collect();

    c.bench_function("union_20_fragments", |b| {
        b.iter(|| {
            black_box(
                parts
                    .iter()
                    .try_fold(Container::molecule(), |acc, m| union(&acc, m))
                    .unwrap(),
            )
        })
    });

    let merged = parts
        .iter()
        .try_fold(Container::molecule(), |acc, m| union(&acc, m))
        .unwrap();
    c.bench_function("split_20_fragments", |b| {
        b.iter(|| black_box(split(&merged, false)))
    });
}

criterion_group!(
    benches,
    bench_substitution,
    bench_redox,
    bench_long_chain,
    bench_union_split,
);
criterion_main!(benches);
