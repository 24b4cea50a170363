use crate::attr::{BondOrder, Role};
use crate::container::Container;
use crate::error::CgrError;
use crate::graph::MapNum;
use crate::radical::radical_level;

/// Valence and hydrogen counts of one atom on one side of a reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Assessment {
    /// Valence the atom was resolved to.
    pub valence: u8,
    /// Hydrogens implied by the valence but not present as atoms.
    pub implicit_h: u8,
    /// Implicit hydrogens plus bonded hydrogen atoms.
    pub total_h: u8,
}

/// Source of valence and hydrogen counts for balancing.
///
/// Only the balancing step of compose consults the oracle. Errors must
/// be reported, not papered over with a default.
pub trait ValenceOracle {
    fn assess(&self, graph: &Container, atom: MapNum, role: Role) -> Result<Assessment, CgrError>;
}

/// Default oracle based on the element's default valences.
///
/// The valence list is shifted by the formal charge the way an
/// isoelectronic atom behaves (`N+` like carbon, `O-` like fluorine).
/// Radical electrons take up valence like bonds do. Only bonds present on
/// the requested side count.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardValence;

impl ValenceOracle for StandardValence {
    fn assess(&self, graph: &Container, key: MapNum, role: Role) -> Result<Assessment, CgrError> {
        let atom = graph.atom(key).ok_or(CgrError::UnknownAtom { atom: key })?;
        let element = atom
            .element
            .ok_or_else(|| CgrError::computation(key, "atom has no element"))?;
        let valences = element.default_valences();
        if valences.is_empty() {
            return Err(CgrError::computation(
                key,
                format!("no default valence for {element}"),
            ));
        }

        let state = atom.state(role);
        let charge = state.charge.unwrap_or(0);
        let occupied = bond_valence(graph, key, role) + u16::from(radical_level(state.radical));
        let occupied = u8::try_from(occupied).map_err(|_| {
            CgrError::computation(key, format!("bond valence {occupied} out of range"))
        })?;
        let explicit_h = graph
            .bonds_of(key)
            .filter(|(_, bond)| !bond.state(role).is_absent())
            .filter(|(other, _)| graph.atom(*other).is_some_and(|a| a.is_hydrogen()))
            .count();
        let explicit_h = u8::try_from(explicit_h).map_err(|_| {
            CgrError::computation(key, format!("{explicit_h} explicit hydrogens out of range"))
        })?;

        let valence = adjust_valences_for_charge(valences, element.outer_shell_electrons(), charge)
            .into_iter()
            .find(|&v| v >= occupied)
            .unwrap_or(occupied);
        let implicit_h = valence - occupied;

        Ok(Assessment {
            valence,
            implicit_h,
            total_h: implicit_h + explicit_h,
        })
    }
}

/// Sum of bond orders around `key` on one side.
///
/// An atom with two or more aromatic bonds gets one extra unit for the
/// delocalized double bond it shares.
pub fn bond_valence(graph: &Container, key: MapNum, role: Role) -> u16 {
    let mut sum = 0u16;
    let mut aromatic = 0u16;
    for (_, bond) in graph.bonds_of(key) {
        match bond.state(role).order {
            Some(BondOrder::Single) => sum += 1,
            Some(BondOrder::Double) => sum += 2,
            Some(BondOrder::Triple) => sum += 3,
            Some(BondOrder::Aromatic) => aromatic += 1,
            None => {}
        }
    }
    if aromatic >= 2 {
        sum + aromatic + 1
    } else {
        sum + aromatic
    }
}

fn adjust_valences_for_charge(valences: &[u8], outer: u8, charge: i8) -> Vec<u8> {
    let charge = i16::from(charge);
    valences
        .iter()
        .filter_map(|&v| {
            let v = i16::from(v);
            let shifted = match outer {
                o if o > 4 => v + charge,
                4 => v - charge.abs(),
                _ => v - charge,
            };
            u8::try_from(shifted).ok()
        })
        .collect()
}
