//! Dual-state attribute records for atoms and bonds.
//!
//! Every atom and bond carries its state before the reaction (`s`), after
//! the reaction (`p`) and a combined view (`sp`) derived from the two.
//! A plain molecule uses `s` as its current state and keeps `p` as a
//! mirror of it.

use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::radical::Radical;

/// `Before` reads the `s` records, `After` the `p` records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Before,
    After,
}

impl Role {
    pub fn other(self) -> Role {
        match self {
            Role::Before => Role::After,
            Role::After => Role::Before,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// MDL bond type code.
    pub fn code(self) -> u8 {
        match self {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
            BondOrder::Aromatic => 4,
        }
    }

    pub fn from_code(code: u8) -> Option<BondOrder> {
        match code {
            1 => Some(BondOrder::Single),
            2 => Some(BondOrder::Double),
            3 => Some(BondOrder::Triple),
            4 => Some(BondOrder::Aromatic),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hybridization {
    SP3,
    SP2,
    SP,
    Aromatic,
}

/// Stereo mark carried through unchanged. Never inferred here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stereo {
    Cw,
    Ccw,
    Cis,
    Trans,
}

/// State of an atom on one side of the reaction.
///
/// Every field is optional: a boundary atom read from one side has no
/// local descriptors on the other side until balancing fills them in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AtomState {
    pub charge: Option<i8>,
    pub radical: Option<Radical>,
    pub position: Option<[f64; 3]>,
    pub neighbors: Option<u8>,
    pub hybridization: Option<Hybridization>,
    pub stereo: Option<Stereo>,
}

impl AtomState {
    pub fn positional(&self) -> AtomState {
        AtomState {
            position: self.position,
            ..AtomState::default()
        }
    }
}

/// State of a bond on one side of the reaction. `order == None` marks
/// the bond as absent on that side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondState {
    pub order: Option<BondOrder>,
    pub stereo: Option<Stereo>,
}

impl BondState {
    pub fn is_absent(&self) -> bool {
        self.order.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition<T> {
    Same(T),
    Changed { before: Option<T>, after: Option<T> },
}

impl<T: PartialEq + Copy> Transition<T> {
    /// `None` when the field is absent on both sides.
    pub fn between(before: Option<T>, after: Option<T>) -> Option<Transition<T>> {
        match (before, after) {
            (None, None) => None,
            (Some(b), Some(a)) if b == a => Some(Transition::Same(b)),
            (before, after) => Some(Transition::Changed { before, after }),
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, Transition::Changed { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedAtom {
    pub charge: Option<Transition<i8>>,
    pub radical: Option<Transition<Radical>>,
    pub neighbors: Option<Transition<u8>>,
    pub hybridization: Option<Transition<Hybridization>>,
    pub stereo: Option<Transition<Stereo>>,
}

impl CombinedAtom {
    pub fn derive(s: &AtomState, p: &AtomState) -> CombinedAtom {
        CombinedAtom {
            charge: Transition::between(s.charge, p.charge),
            radical: Transition::between(s.radical, p.radical),
            neighbors: Transition::between(s.neighbors, p.neighbors),
            hybridization: Transition::between(s.hybridization, p.hybridization),
            stereo: Transition::between(s.stereo, p.stereo),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedBond {
    pub order: Option<Transition<BondOrder>>,
    pub stereo: Option<Transition<Stereo>>,
}

impl CombinedBond {
    pub fn derive(s: &BondState, p: &BondState) -> CombinedBond {
        CombinedBond {
            order: Transition::between(s.order, p.order),
            stereo: Transition::between(s.stereo, p.stereo),
        }
    }
}

/// Atom record: invariant fields plus before/after/combined states.
///
/// # Examples
///
/// ```
/// use cgrcrab::{Atom, Element, Role};
///
/// let oxygen = Atom::new(Element::O).with_charge(-1);
/// assert_eq!(oxygen.state(Role::Before).charge, Some(-1));
/// assert_eq!(oxygen.state(Role::After).charge, Some(-1));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// `None` for query or "any" atoms.
    pub element: Option<Element>,
    pub mark: Option<String>,
    /// Map number as written in the source, `0` when unmapped.
    pub map: u32,
    /// Mass number; `None` means natural abundance.
    pub isotope: Option<u16>,
    pub s: AtomState,
    pub p: AtomState,
    pub sp: CombinedAtom,
}

impl Atom {
    /// Neutral, non-radical atom with identical before and after states.
    pub fn new(element: Element) -> Atom {
        let state = AtomState {
            charge: Some(0),
            ..AtomState::default()
        };
        Atom {
            element: Some(element),
            s: state.clone(),
            p: state,
            ..Atom::default()
        }
        .refreshed()
    }

    pub fn with_charge(mut self, charge: i8) -> Atom {
        self.s.charge = Some(charge);
        self.p.charge = Some(charge);
        self.refreshed()
    }

    pub fn with_radical(mut self, radical: Radical) -> Atom {
        self.s.radical = Some(radical);
        self.p.radical = Some(radical);
        self.refreshed()
    }

    pub fn with_position(mut self, position: [f64; 3]) -> Atom {
        self.s.position = Some(position);
        self.p.position = Some(position);
        self
    }

    pub fn with_map(mut self, map: u32) -> Atom {
        self.map = map;
        self
    }

    pub fn with_mark(mut self, mark: impl Into<String>) -> Atom {
        self.mark = Some(mark.into());
        self
    }

    pub fn with_isotope(mut self, isotope: u16) -> Atom {
        self.isotope = Some(isotope);
        self
    }

    /// Synthetic atom with distinct before and after states, as inserted
    /// by balancing.
    pub fn synthetic(element: Element, before: AtomState, after: AtomState) -> Atom {
        Atom {
            element: Some(element),
            s: before,
            p: after,
            ..Atom::default()
        }
        .refreshed()
    }

    pub fn state(&self, role: Role) -> &AtomState {
        match role {
            Role::Before => &self.s,
            Role::After => &self.p,
        }
    }

    pub fn state_mut(&mut self, role: Role) -> &mut AtomState {
        match role {
            Role::Before => &mut self.s,
            Role::After => &mut self.p,
        }
    }

    /// Copy of the invariant fields with both states empty.
    pub fn invariants(&self) -> Atom {
        Atom {
            element: self.element,
            mark: self.mark.clone(),
            map: self.map,
            isotope: self.isotope,
            ..Atom::default()
        }
    }

    pub fn is_hydrogen(&self) -> bool {
        self.element == Some(Element::H)
    }

    pub fn update_combined(&mut self) {
        self.sp = CombinedAtom::derive(&self.s, &self.p);
    }

    fn refreshed(mut self) -> Atom {
        self.update_combined();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bond {
    pub s: BondState,
    pub p: BondState,
    pub sp: CombinedBond,
}

impl Bond {
    pub fn new(order: BondOrder) -> Bond {
        Bond::changed(Some(order), Some(order))
    }

    /// Bond whose order differs between sides; `None` marks the side
    /// where it is absent.
    pub fn changed(before: Option<BondOrder>, after: Option<BondOrder>) -> Bond {
        let mut bond = Bond {
            s: BondState {
                order: before,
                stereo: None,
            },
            p: BondState {
                order: after,
                stereo: None,
            },
            sp: CombinedBond::default(),
        };
        bond.update_combined();
        bond
    }

    pub fn with_stereo(mut self, stereo: Stereo) -> Bond {
        self.s.stereo = Some(stereo);
        self.p.stereo = Some(stereo);
        self.update_combined();
        self
    }

    pub fn state(&self, role: Role) -> &BondState {
        match role {
            Role::Before => &self.s,
            Role::After => &self.p,
        }
    }

    pub fn state_mut(&mut self, role: Role) -> &mut BondState {
        match role {
            Role::Before => &mut self.s,
            Role::After => &mut self.p,
        }
    }

    pub fn update_combined(&mut self) {
        self.sp = CombinedBond::derive(&self.s, &self.p);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_same_and_changed() {
        assert_eq!(Transition::between(Some(1i8), Some(1)), Some(Transition::Same(1)));
        assert_eq!(
            Transition::between(Some(0i8), Some(-1)),
            Some(Transition::Changed {
                before: Some(0),
                after: Some(-1)
            })
        );
        assert_eq!(Transition::<i8>::between(None, None), None);
        assert!(Transition::between(None, Some(BondOrder::Single))
            .unwrap()
            .is_changed());
    }

    #[test]
    fn atom_builder_mirrors_states() {
        let atom = Atom::new(Element::N)
            .with_charge(1)
            .with_radical(Radical::Doublet)
            .with_position([1.0, 2.0, 0.0]);
        assert_eq!(atom.s, atom.p);
        assert_eq!(atom.sp.charge, Some(Transition::Same(1)));
        assert_eq!(atom.sp.radical, Some(Transition::Same(Radical::Doublet)));
    }

    #[test]
    fn invariants_drop_states() {
        let atom = Atom::new(Element::C).with_map(7).with_mark("a").with_isotope(13);
        let inv = atom.invariants();
        assert_eq!(inv.element, Some(Element::C));
        assert_eq!(inv.map, 7);
        assert_eq!(inv.mark.as_deref(), Some("a"));
        assert_eq!(inv.isotope, Some(13));
        assert_eq!(inv.s, AtomState::default());
        assert_eq!(inv.p, AtomState::default());
    }

    #[test]
    fn positional_view() {
        let state = AtomState {
            charge: Some(-1),
            radical: Some(Radical::Doublet),
            position: Some([0.5, 0.0, 0.0]),
            neighbors: Some(2),
            hybridization: Some(Hybridization::SP2),
            stereo: Some(Stereo::Cw),
        };
        let pos = state.positional();
        assert_eq!(pos.position, state.position);
        assert_eq!(pos.charge, None);
        assert_eq!(pos.neighbors, None);
        assert_eq!(pos.stereo, None);
    }

    #[test]
    fn changed_bond_combined() {
        let bond = Bond::changed(Some(BondOrder::Single), None);
        assert!(bond.p.is_absent());
        assert_eq!(
            bond.sp.order,
            Some(Transition::Changed {
                before: Some(BondOrder::Single),
                after: None
            })
        );
    }

    #[test]
    fn bond_order_codes() {
        for code in 1..=4 {
            assert_eq!(BondOrder::from_code(code).unwrap().code(), code);
        }
        assert_eq!(BondOrder::from_code(9), None);
    }

    #[test]
    fn role_other() {
        assert_eq!(Role::Before.other(), Role::After);
        assert_eq!(Role::After.other(), Role::Before);
    }
}
