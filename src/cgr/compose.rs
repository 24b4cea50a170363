use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use super::balance::{Balancer, BoundaryGroup};
use super::rules::RuleLog;
use crate::attr::{Atom, Bond, Role};
use crate::container::Container;
use crate::error::CgrError;
use crate::graph::MapNum;
use crate::valence::{StandardValence, ValenceOracle};

/// Knobs for [`compose_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposeOptions {
    /// Run the balancing rules on boundary atoms. When off, boundary
    /// atoms simply keep the charge and radical they have on their own
    /// side.
    pub balance: bool,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        ComposeOptions { balance: true }
    }
}

/// Boundary atoms of one side mapped to the common atoms they bond to.
type Skin = BTreeMap<MapNum, BTreeSet<MapNum>>;

/// Overlay reagent and product graphs into one CGR using the standard
/// valence model.
///
/// # Examples
///
/// ```
/// use cgrcrab::{compose, Atom, Bond, BondOrder, Container, Element};
///
/// let mut reagents = Container::molecule();
/// reagents.add_atom(1, Atom::new(Element::C)).unwrap();
/// reagents.add_atom(2, Atom::new(Element::O)).unwrap();
/// reagents.add_bond(1, 2, Bond::new(BondOrder::Single)).unwrap();
///
/// let mut products = Container::molecule();
/// products.add_atom(1, Atom::new(Element::C)).unwrap();
/// products.add_atom(2, Atom::new(Element::O)).unwrap();
/// products.add_bond(1, 2, Bond::new(BondOrder::Double)).unwrap();
///
/// let (cgr, log) = compose(&reagents, &products, true).unwrap();
/// let bond = cgr.bond(1, 2).unwrap();
/// assert_eq!(bond.s.order, Some(BondOrder::Single));
/// assert_eq!(bond.p.order, Some(BondOrder::Double));
/// assert!(log.is_empty());
/// ```
pub fn compose(
    reagents: &Container,
    products: &Container,
    balance: bool,
) -> Result<(Container, RuleLog), CgrError> {
    compose_with(
        reagents,
        products,
        &ComposeOptions { balance },
        &StandardValence,
    )
}

/// Overlay reagent and product graphs into one CGR.
///
/// Atoms present on both sides keep their own state on each side. Atoms
/// present on one side only are copied with the other side mirrored,
/// except those bonded to a common atom (boundary atoms), whose missing
/// side is filled by balancing. Inputs are never modified.
pub fn compose_with<O: ValenceOracle>(
    reagents: &Container,
    products: &Container,
    options: &ComposeOptions,
    oracle: &O,
) -> Result<(Container, RuleLog), CgrError> {
    let common: BTreeSet<MapNum> = reagents
        .keys()
        .filter(|&k| products.contains(k))
        .collect();
    let reagent_skin = skin(reagents, &common);
    let product_skin = skin(products, &common);
    trace!(
        common = common.len(),
        lost = reagent_skin.len(),
        new = product_skin.len(),
        "classified atoms"
    );

    let mut cgr = Container::cgr();
    overlay(&mut cgr, reagents, Role::Before, &common, &reagent_skin)?;
    overlay(&mut cgr, products, Role::After, &common, &product_skin)?;

    let mut log = RuleLog::new();
    if options.balance {
        let groups = boundary_groups(&reagent_skin, &product_skin);
        Balancer::new(&mut cgr, &mut log, oracle).run(&groups)?;
    } else {
        for &m in reagent_skin.keys() {
            mirror_electronic(&mut cgr, m, Role::After);
        }
        for &m in product_skin.keys() {
            mirror_electronic(&mut cgr, m, Role::Before);
        }
    }

    // charges nothing else filled in
    for &m in reagent_skin.keys().chain(product_skin.keys()) {
        if let Some(atom) = cgr.atom_mut(m) {
            if atom.s.charge.is_none() {
                atom.s.charge = atom.p.charge;
            }
            if atom.p.charge.is_none() {
                atom.p.charge = atom.s.charge;
            }
        }
    }

    cgr.fix_data();
    debug!(
        atoms = cgr.atom_count(),
        bonds = cgr.bond_count(),
        rules = log.iter().count(),
        "composed"
    );
    Ok((cgr, log))
}

fn skin(graph: &Container, common: &BTreeSet<MapNum>) -> Skin {
    let mut skin = Skin::new();
    for (a, b, _) in graph.bonds() {
        match (common.contains(&a), common.contains(&b)) {
            (true, false) => {
                skin.entry(b).or_default().insert(a);
            }
            (false, true) => {
                skin.entry(a).or_default().insert(b);
            }
            _ => {}
        }
    }
    skin
}

fn boundary_groups(reagent_skin: &Skin, product_skin: &Skin) -> BTreeMap<MapNum, BoundaryGroup> {
    fn entry(groups: &mut BTreeMap<MapNum, BoundaryGroup>, n: MapNum) -> &mut BoundaryGroup {
        groups.entry(n).or_insert_with(|| BoundaryGroup {
            center: n,
            ..BoundaryGroup::default()
        })
    }

    // skin maps iterate in key order, so each list comes out sorted
    let mut groups = BTreeMap::new();
    for (&m, centers) in reagent_skin {
        for &n in centers {
            entry(&mut groups, n).reagents.push(m);
        }
    }
    for (&m, centers) in product_skin {
        for &n in centers {
            entry(&mut groups, n).products.push(m);
        }
    }
    groups
}

/// Copy one side's atoms and bonds into the CGR under way.
fn overlay(
    cgr: &mut Container,
    graph: &Container,
    side: Role,
    common: &BTreeSet<MapNum>,
    skin: &Skin,
) -> Result<(), CgrError> {
    // a CGR input contributes the matching side, a molecule its only one
    let source = if graph.is_cgr() { side } else { Role::Before };

    for (key, atom) in graph.atoms() {
        if common.contains(&key) {
            let merged = cgr.atom_or_insert_with(key, || atom.invariants());
            *merged.state_mut(side) = atom.state(source).clone();
        } else if skin.contains_key(&key) {
            let mut boundary = atom.invariants();
            *boundary.state_mut(side) = atom.state(source).clone();
            *boundary.state_mut(side.other()) = if graph.is_cgr() {
                atom.state(side.other()).positional()
            } else {
                atom.s.positional()
            };
            cgr.add_atom(key, boundary)?;
        } else {
            cgr.add_atom(key, unique_atom(atom, graph.is_cgr()))?;
        }
    }

    for (a, b, bond) in graph.bonds() {
        if common.contains(&a) || common.contains(&b) {
            let merged = cgr.bond_or_insert_with(a, b, Bond::default)?;
            *merged.state_mut(side) = bond.state(source).clone();
        } else if graph.is_cgr() {
            cgr.add_bond(a, b, bond.clone())?;
        } else {
            let mut copy = bond.clone();
            copy.p = copy.s.clone();
            cgr.add_bond(a, b, copy)?;
        }
    }
    Ok(())
}

/// Atom found on one side only and not bonded to any common atom.
/// Either side of a molecule atom is widened to both.
fn unique_atom(atom: &Atom, is_cgr: bool) -> Atom {
    if is_cgr {
        return atom.clone();
    }
    let mut unique = atom.invariants();
    unique.s = atom.s.clone();
    unique.p = atom.s.clone();
    unique
}

fn mirror_electronic(cgr: &mut Container, key: MapNum, into: Role) {
    if let Some(atom) = cgr.atom_mut(key) {
        let from = atom.state(into.other());
        let (charge, radical) = (from.charge, from.radical);
        let to = atom.state_mut(into);
        to.charge = charge;
        to.radical = radical;
    }
}
