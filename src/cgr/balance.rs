//! Balancing of boundary atoms.
//!
//! A boundary atom exists on one side only and is bonded to a common atom.
//! Composition leaves its state on the missing side empty. Balancing
//! fills it in, group by group around each common atom, and inserts
//! synthetic atoms where charge or hydrogen counts do not add up.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use super::rules::{self, Rule, RuleLog};
use crate::attr::{Atom, AtomState, Bond, BondOrder, Role};
use crate::container::Container;
use crate::element::Element;
use crate::error::CgrError;
use crate::graph::MapNum;
use crate::radical::{increment_radical, radical_level, Radical};
use crate::valence::{Assessment, ValenceOracle};

/// Hands out keys for synthetic atoms, above every key already in use.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: Option<MapNum>,
}

impl IdAllocator {
    /// Allocator whose first key is `max_key + 1`.
    pub fn after(max_key: MapNum) -> IdAllocator {
        IdAllocator {
            next: max_key.checked_add(1),
        }
    }

    /// Next free key, or `None` once the key space is used up.
    pub fn mint(&mut self) -> Option<MapNum> {
        let key = self.next?;
        self.next = key.checked_add(1);
        Some(key)
    }
}

/// A common atom with its reagent-only and product-only neighbors.
/// Both lists are sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundaryGroup {
    pub center: MapNum,
    pub reagents: Vec<MapNum>,
    pub products: Vec<MapNum>,
}

/// Product minus reagent changes of a common atom.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Chemistry {
    pub valence: i16,
    pub hydrogen: i16,
    pub charge: i16,
    pub before: Assessment,
    pub after: Assessment,
}

impl Chemistry {
    pub fn is_unchanged(&self) -> bool {
        self.valence == 0 && self.hydrogen == 0 && self.charge == 0
    }

    /// Valence, hydrogen count and charge all moved by the same amount:
    /// an explicit proton came or went.
    pub fn is_explicit_hydrogen(&self) -> bool {
        self.valence == self.hydrogen && self.hydrogen == self.charge
    }
}

/// Deltas that drive branch selection. The valence oracle is consulted
/// only when the radical level did not change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Deltas {
    pub radical: i16,
    pub chemistry: Option<Chemistry>,
}

pub(crate) struct Balancer<'a> {
    cgr: &'a mut Container,
    log: &'a mut RuleLog,
    oracle: &'a dyn ValenceOracle,
    ids: IdAllocator,
}

impl<'a> Balancer<'a> {
    pub fn new(
        cgr: &'a mut Container,
        log: &'a mut RuleLog,
        oracle: &'a dyn ValenceOracle,
    ) -> Balancer<'a> {
        let ids = IdAllocator::after(cgr.max_key());
        Balancer {
            cgr,
            log,
            oracle,
            ids,
        }
    }

    /// Balance every group, in ascending order of the common atom.
    pub fn run(&mut self, groups: &BTreeMap<MapNum, BoundaryGroup>) -> Result<(), CgrError> {
        for group in groups.values() {
            let deltas = self.deltas(group.center)?;
            let Some(branch) = rules::select(&deltas, group) else {
                continue;
            };
            debug!(
                center = group.center,
                branch = branch.name,
                radical = deltas.radical,
                reagents = group.reagents.len(),
                products = group.products.len(),
                "balancing boundary group"
            );
            (branch.apply)(self, group, &deltas)?;
        }
        Ok(())
    }

    fn deltas(&self, n: MapNum) -> Result<Deltas, CgrError> {
        let atom = self.atom(n)?;
        let radical =
            i16::from(radical_level(atom.p.radical)) - i16::from(radical_level(atom.s.radical));
        if radical != 0 {
            return Ok(Deltas {
                radical,
                chemistry: None,
            });
        }
        let charge = i16::from(atom.p.charge.unwrap_or(0)) - i16::from(atom.s.charge.unwrap_or(0));
        let before = self.assess(n, Role::Before)?;
        let after = self.assess(n, Role::After)?;
        Ok(Deltas {
            radical,
            chemistry: Some(Chemistry {
                valence: i16::from(after.valence) - i16::from(before.valence),
                hydrogen: i16::from(after.total_h) - i16::from(before.total_h),
                charge,
                before,
                after,
            }),
        })
    }

    fn assess(&self, key: MapNum, role: Role) -> Result<Assessment, CgrError> {
        self.oracle.assess(&*self.cgr, key, role)
    }

    fn atom(&self, key: MapNum) -> Result<&Atom, CgrError> {
        self.cgr.atom(key).ok_or(CgrError::UnknownAtom { atom: key })
    }

    fn atom_mut(&mut self, key: MapNum) -> Result<&mut Atom, CgrError> {
        self.cgr
            .atom_mut(key)
            .ok_or(CgrError::UnknownAtom { atom: key })
    }

    fn record(&mut self, rule: Rule, affected: MapNum, reference: MapNum) {
        trace!(rule = rule.number(), affected, reference, "rule applied");
        self.log.record(rule, affected, reference);
    }

    fn mirror_charge(&mut self, key: MapNum, into: Role) -> Result<(), CgrError> {
        let atom = self.atom_mut(key)?;
        atom.state_mut(into).charge = atom.state(into.other()).charge;
        Ok(())
    }

    fn mirror_radical(&mut self, key: MapNum, into: Role) -> Result<(), CgrError> {
        let atom = self.atom_mut(key)?;
        atom.state_mut(into).radical = atom.state(into.other()).radical;
        Ok(())
    }

    /// Raise the radical level of `key` on side `into` by one. An atom
    /// raised for the first time starts from its level on the other side.
    fn raise_radical(&mut self, key: MapNum, into: Role) -> Result<(), CgrError> {
        let atom = self.atom_mut(key)?;
        let current = atom
            .state(into)
            .radical
            .or(atom.state(into.other()).radical);
        let raised = increment_radical(current).map_err(|level| {
            CgrError::computation(key, format!("radical level {level} out of range"))
        })?;
        atom.state_mut(into).radical = raised;
        Ok(())
    }

    /// Fill side `into` of each boundary atom: charges are mirrored, the
    /// first `count` atoms (wrapping around) get an extra radical level
    /// and the rest keep the radical of the other side.
    fn distribute_radicals(
        &mut self,
        atoms: &[MapNum],
        into: Role,
        count: usize,
        raised: Rule,
        kept: Rule,
        n: MapNum,
    ) -> Result<(), CgrError> {
        for &m in atoms {
            self.mirror_charge(m, into)?;
        }
        for &m in atoms.iter().cycle().take(count) {
            self.raise_radical(m, into)?;
            self.record(raised, m, n);
        }
        for &m in atoms.iter().skip(count) {
            self.mirror_radical(m, into)?;
            self.record(kept, m, n);
        }
        Ok(())
    }

    /// Copy charge and radical from the known side onto side `into`.
    fn mirror_all(
        &mut self,
        atoms: &[MapNum],
        into: Role,
        rule: Rule,
        n: MapNum,
    ) -> Result<(), CgrError> {
        for &m in atoms {
            self.mirror_charge(m, into)?;
            self.mirror_radical(m, into)?;
            self.record(rule, m, n);
        }
        Ok(())
    }

    /// Insert a synthetic atom balancing common atom `n`.
    fn add_synthetic(
        &mut self,
        element: Element,
        before: AtomState,
        after: AtomState,
        n: MapNum,
    ) -> Result<MapNum, CgrError> {
        let key = self.ids.mint().ok_or_else(|| {
            CgrError::computation(n, "no map number left for a synthetic atom")
        })?;
        debug!(atom = key, element = %element, "inserting synthetic atom");
        self.cgr
            .add_atom(key, Atom::synthetic(element, before, after))?;
        Ok(key)
    }

    /// Bond absent before the reaction and single after it.
    fn add_formed_bond(&mut self, a: MapNum, b: MapNum) -> Result<(), CgrError> {
        self.cgr
            .add_bond(a, b, Bond::changed(None, Some(BondOrder::Single)))?;
        Ok(())
    }

    fn implicit_h_gain(&self, key: MapNum) -> Result<i16, CgrError> {
        let before = self.assess(key, Role::Before)?.implicit_h;
        let after = self.assess(key, Role::After)?.implicit_h;
        Ok(i16::from(after) - i16::from(before))
    }

    fn neutralize_charge(&mut self, dc: i16, n: MapNum) -> Result<(), CgrError> {
        if dc > 0 {
            for _ in 0..dc {
                let key = self.add_synthetic(
                    Element::O,
                    radical_state(0, Some(Radical::Doublet)),
                    radical_state(-1, None),
                    n,
                )?;
                self.record(Rule::HydroxideNeutralization, key, n);
            }
        } else {
            for _ in 0..-dc {
                let key = self.add_synthetic(
                    Element::H,
                    radical_state(0, Some(Radical::Doublet)),
                    radical_state(1, None),
                    n,
                )?;
                self.record(Rule::HydrogenNeutralization, key, n);
            }
        }
        Ok(())
    }

    fn balance_hydrogens(
        &mut self,
        group: &BoundaryGroup,
        chemistry: &Chemistry,
    ) -> Result<(), CgrError> {
        let n = group.center;
        let mut after_h = i16::from(chemistry.after.total_h);
        for &m in &group.reagents {
            after_h += i16::from(self.assess(m, Role::After)?.total_h);
        }
        let mut before_h = i16::from(chemistry.before.total_h);
        for &m in &group.products {
            before_h += i16::from(self.assess(m, Role::Before)?.total_h);
        }
        let dth = after_h - before_h;
        trace!(center = n, dth, "hydrogen imbalance");

        if dth > 0 {
            let mut explicit = 0i16;
            for &m in &group.products {
                if self.atom(m)?.is_hydrogen() {
                    self.atom_mut(m)?.s.radical = Some(Radical::Doublet);
                    explicit += 1;
                    self.record(Rule::ExplicitHydrogenRadical, m, n);
                }
            }
            let mut pool = Vec::new();
            for _ in 0..(dth - explicit).max(0) {
                let key = self.add_synthetic(
                    Element::H,
                    radical_state(0, Some(Radical::Doublet)),
                    radical_state(0, None),
                    n,
                )?;
                self.record(Rule::HydrogenRadicalAdded, key, n);
                pool.push(key);
            }
            let mut pool = pool.into_iter();

            let mut targets = vec![(n, self.implicit_h_gain(n)?)];
            for &m in &group.reagents {
                targets.push((m, self.implicit_h_gain(m)?));
            }
            'attach: for (target, gain) in targets {
                for _ in 0..gain.max(0) {
                    let Some(h) = pool.next() else {
                        break 'attach;
                    };
                    self.add_formed_bond(h, target)?;
                    self.record(Rule::ImplicitHydrogenAttached, h, target);
                }
            }
        } else if dth < 0 {
            let mut pool = Vec::new();
            for _ in 0..-dth {
                let key = self.add_synthetic(
                    Element::O,
                    radical_state(0, Some(Radical::Doublet)),
                    radical_state(0, None),
                    n,
                )?;
                self.record(Rule::HydroxideRadicalAdded, key, n);
                pool.push(key);
            }
            let mut pool = pool.into_iter();
            for &m in &group.reagents {
                if !self.atom(m)?.is_hydrogen() {
                    continue;
                }
                let Some(o) = pool.next() else {
                    break;
                };
                self.add_formed_bond(o, m)?;
                self.record(Rule::HydrogenAccepted, m, n);
            }
        }
        Ok(())
    }
}

fn radical_state(charge: i8, radical: Option<Radical>) -> AtomState {
    AtomState {
        charge: Some(charge),
        radical,
        ..AtomState::default()
    }
}

fn radical_count(deltas: &Deltas) -> usize {
    usize::from(deltas.radical.unsigned_abs())
}

pub(crate) fn homolysis(
    b: &mut Balancer<'_>,
    g: &BoundaryGroup,
    d: &Deltas,
) -> Result<(), CgrError> {
    b.distribute_radicals(
        &g.reagents,
        Role::After,
        radical_count(d),
        Rule::Homolysis,
        Rule::LostKeptOnRadicalGain,
        g.center,
    )?;
    b.mirror_all(&g.products, Role::Before, Rule::NewKeptOnRadicalGain, g.center)
}

pub(crate) fn radical_addition(
    b: &mut Balancer<'_>,
    g: &BoundaryGroup,
    d: &Deltas,
) -> Result<(), CgrError> {
    b.distribute_radicals(
        &g.products,
        Role::Before,
        radical_count(d),
        Rule::RadicalAddition,
        Rule::NewKeptOnRadicalGain,
        g.center,
    )
}

pub(crate) fn recombination(
    b: &mut Balancer<'_>,
    g: &BoundaryGroup,
    d: &Deltas,
) -> Result<(), CgrError> {
    b.distribute_radicals(
        &g.products,
        Role::Before,
        radical_count(d),
        Rule::Recombination,
        Rule::NewKeptOnRadicalLoss,
        g.center,
    )?;
    b.mirror_all(&g.reagents, Role::After, Rule::LostKeptOnRadicalLoss, g.center)
}

pub(crate) fn radical_elimination(
    b: &mut Balancer<'_>,
    g: &BoundaryGroup,
    d: &Deltas,
) -> Result<(), CgrError> {
    b.distribute_radicals(
        &g.reagents,
        Role::After,
        radical_count(d),
        Rule::RadicalElimination,
        Rule::LostKeptOnRadicalLoss,
        g.center,
    )
}

pub(crate) fn unchanged(
    b: &mut Balancer<'_>,
    g: &BoundaryGroup,
    _: &Deltas,
) -> Result<(), CgrError> {
    b.mirror_all(&g.reagents, Role::After, Rule::LostUnchanged, g.center)?;
    b.mirror_all(&g.products, Role::Before, Rule::NewUnchanged, g.center)
}

/// A proton appears (positive delta) or leaves (negative delta).
/// The other side's boundary atoms are left to the final charge fill.
pub(crate) fn explicit_hydrogen(
    b: &mut Balancer<'_>,
    g: &BoundaryGroup,
    d: &Deltas,
) -> Result<(), CgrError> {
    let gained = d.chemistry.is_some_and(|c| c.charge > 0);
    if gained {
        for &m in &g.products {
            b.atom_mut(m)?.s.charge = Some(1);
            b.record(Rule::Protonation, m, g.center);
        }
    } else {
        for &m in &g.reagents {
            b.atom_mut(m)?.p.charge = Some(1);
            b.record(Rule::Deprotonation, m, g.center);
        }
    }
    Ok(())
}

pub(crate) fn redox(b: &mut Balancer<'_>, g: &BoundaryGroup, d: &Deltas) -> Result<(), CgrError> {
    let Some(chemistry) = d.chemistry else {
        return Ok(());
    };
    b.mirror_all(&g.reagents, Role::After, Rule::LostRedox, g.center)?;
    b.mirror_all(&g.products, Role::Before, Rule::NewRedox, g.center)?;
    b.neutralize_charge(chemistry.charge, g.center)?;
    b.balance_hydrogens(g, &chemistry)
}
