//! Balancing rule identifiers, the provenance log and the branch table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::balance::{self, Balancer, BoundaryGroup, Deltas};
use crate::error::CgrError;
use crate::graph::MapNum;

/// A balancing rule. The discriminant is the rule number used in logs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Rule {
    LostUnchanged = 1,
    NewUnchanged = 2,
    Protonation = 3,
    Deprotonation = 4,
    LostRedox = 5,
    NewRedox = 6,
    HydroxideNeutralization = 7,
    HydrogenNeutralization = 8,
    HydroxideRadicalAdded = 9,
    HydrogenRadicalAdded = 10,
    ExplicitHydrogenRadical = 11,
    ImplicitHydrogenAttached = 12,
    HydrogenAccepted = 13,
    Homolysis = 14,
    LostKeptOnRadicalGain = 15,
    NewKeptOnRadicalGain = 16,
    RadicalAddition = 17,
    Recombination = 18,
    NewKeptOnRadicalLoss = 19,
    LostKeptOnRadicalLoss = 20,
    RadicalElimination = 21,
}

impl Rule {
    pub const ALL: [Rule; 21] = [
        Rule::LostUnchanged,
        Rule::NewUnchanged,
        Rule::Protonation,
        Rule::Deprotonation,
        Rule::LostRedox,
        Rule::NewRedox,
        Rule::HydroxideNeutralization,
        Rule::HydrogenNeutralization,
        Rule::HydroxideRadicalAdded,
        Rule::HydrogenRadicalAdded,
        Rule::ExplicitHydrogenRadical,
        Rule::ImplicitHydrogenAttached,
        Rule::HydrogenAccepted,
        Rule::Homolysis,
        Rule::LostKeptOnRadicalGain,
        Rule::NewKeptOnRadicalGain,
        Rule::RadicalAddition,
        Rule::Recombination,
        Rule::NewKeptOnRadicalLoss,
        Rule::LostKeptOnRadicalLoss,
        Rule::RadicalElimination,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    /// Stable, human-readable identifier.
    pub fn id(self) -> &'static str {
        match self {
            Rule::LostUnchanged => "rule #1: lost atom; common atom unchanged (substitution, elimination, addition)",
            Rule::NewUnchanged => "rule #2: new atom; common atom unchanged (substitution, elimination, addition)",
            Rule::Protonation => "rule #3: new atom; common atom protonation",
            Rule::Deprotonation => "rule #4: lost atom; common atom deprotonation",
            Rule::LostRedox => "rule #5: lost atom; common atom changed (reduction or oxidation)",
            Rule::NewRedox => "rule #6: new atom; common atom changed (reduction or oxidation)",
            Rule::HydroxideNeutralization => "rule #7: charge neutralization; hydroxide radical added",
            Rule::HydrogenNeutralization => "rule #8: charge neutralization; hydrogen radical added",
            Rule::HydroxideRadicalAdded => "rule #9: deprotonation; hydroxide radical added",
            Rule::HydrogenRadicalAdded => "rule #10: protonation; hydrogen radical added",
            Rule::ExplicitHydrogenRadical => "rule #11: protonation; new explicit hydrogen becomes radical",
            Rule::ImplicitHydrogenAttached => "rule #12: protonation; hydrogen radical bonded where implicit hydrogens grew",
            Rule::HydrogenAccepted => "rule #13: hydrogen accepted by added hydroxide radical",
            Rule::Homolysis => "rule #14: lost atom; common atom radical increased; lost atom radical added",
            Rule::LostKeptOnRadicalGain => "rule #15: lost atom; common atom radical increased; lost atom radical unchanged",
            Rule::NewKeptOnRadicalGain => "rule #16: new atom; common atom radical increased; new atom radical unchanged",
            Rule::RadicalAddition => "rule #17: new atom; common atom radical increased; new atom radical added",
            Rule::Recombination => "rule #18: new atom; common atom radical decreased; new atom radical added",
            Rule::NewKeptOnRadicalLoss => "rule #19: new atom; common atom radical decreased; new atom radical unchanged",
            Rule::LostKeptOnRadicalLoss => "rule #20: lost atom; common atom radical decreased; lost atom radical unchanged",
            Rule::RadicalElimination => "rule #21: lost atom; common atom radical decreased; lost atom radical added",
        }
    }

    pub fn from_number(n: u8) -> Option<Rule> {
        Rule::ALL.get(usize::from(n).checked_sub(1)?).copied()
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Which rules fired during balancing and on which atoms.
///
/// Each entry is `(affected, reference)`. The reference is the common
/// atom whose boundary group triggered the rule, or, for
/// [`Rule::ImplicitHydrogenAttached`], the atom the synthetic hydrogen
/// was bonded to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleLog {
    entries: BTreeMap<Rule, Vec<(MapNum, MapNum)>>,
}

impl RuleLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, rule: Rule, affected: MapNum, reference: MapNum) {
        self.entries
            .entry(rule)
            .or_default()
            .push((affected, reference));
    }

    pub fn get(&self, rule: Rule) -> &[(MapNum, MapNum)] {
        self.entries.get(&rule).map_or(&[], Vec::as_slice)
    }

    pub fn count(&self, rule: Rule) -> usize {
        self.get(rule).len()
    }

    pub fn contains(&self, rule: Rule) -> bool {
        self.entries.contains_key(&rule)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rules in ascending rule number with their entries.
    pub fn iter(&self) -> impl Iterator<Item = (Rule, &[(MapNum, MapNum)])> + '_ {
        self.entries.iter().map(|(&rule, v)| (rule, v.as_slice()))
    }

    /// Atoms affected by any rule whose reference is `atom`.
    pub fn attributed_to(&self, atom: MapNum) -> impl Iterator<Item = (Rule, MapNum)> + '_ {
        self.iter().flat_map(move |(rule, pairs)| {
            pairs
                .iter()
                .filter(move |&&(_, reference)| reference == atom)
                .map(move |&(affected, _)| (rule, affected))
        })
    }

    /// Same log keyed by the readable rule identifiers.
    pub fn by_id(&self) -> BTreeMap<&'static str, Vec<(MapNum, MapNum)>> {
        self.entries
            .iter()
            .map(|(rule, v)| (rule.id(), v.clone()))
            .collect()
    }
}

type Predicate = fn(&Deltas, &BoundaryGroup) -> bool;
type Effect = fn(&mut Balancer<'_>, &BoundaryGroup, &Deltas) -> Result<(), CgrError>;

/// One entry of the balancing table: when it applies and what it does.
pub(crate) struct Branch {
    pub name: &'static str,
    pub applies: Predicate,
    pub apply: Effect,
}

/// Branches in priority order. The first one that applies fires.
pub(crate) const BRANCHES: &[Branch] = &[
    Branch {
        name: "homolysis",
        applies: |d, g| d.radical > 0 && !g.reagents.is_empty(),
        apply: balance::homolysis,
    },
    Branch {
        name: "radical addition",
        applies: |d, _| d.radical > 0,
        apply: balance::radical_addition,
    },
    Branch {
        name: "recombination",
        applies: |d, g| d.radical < 0 && !g.products.is_empty(),
        apply: balance::recombination,
    },
    Branch {
        name: "radical elimination",
        applies: |d, _| d.radical < 0,
        apply: balance::radical_elimination,
    },
    Branch {
        name: "unchanged",
        applies: |d, _| d.chemistry.is_some_and(|c| c.is_unchanged()),
        apply: balance::unchanged,
    },
    Branch {
        name: "explicit hydrogen",
        applies: |d, _| d.chemistry.is_some_and(|c| c.is_explicit_hydrogen()),
        apply: balance::explicit_hydrogen,
    },
    Branch {
        name: "redox",
        applies: |d, _| d.chemistry.is_some(),
        apply: balance::redox,
    },
];

/// First branch that applies to a group.
pub(crate) fn select(deltas: &Deltas, group: &BoundaryGroup) -> Option<&'static Branch> {
    BRANCHES.iter().find(|b| (b.applies)(deltas, group))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cgr::balance::Chemistry;

    fn group(reagents: &[MapNum], products: &[MapNum]) -> BoundaryGroup {
        BoundaryGroup {
            center: 1,
            reagents: reagents.to_vec(),
            products: products.to_vec(),
        }
    }

    fn radical(dr: i16) -> Deltas {
        Deltas {
            radical: dr,
            chemistry: None,
        }
    }

    fn chemistry(valence: i16, hydrogen: i16, charge: i16) -> Deltas {
        Deltas {
            radical: 0,
            chemistry: Some(Chemistry {
                valence,
                hydrogen,
                charge,
                ..Chemistry::default()
            }),
        }
    }

    fn selected(d: &Deltas, g: &BoundaryGroup) -> &'static str {
        select(d, g).map(|b| b.name).unwrap_or("none")
    }

    #[test]
    fn rule_numbers_are_dense() {
        for (i, rule) in Rule::ALL.iter().enumerate() {
            assert_eq!(usize::from(rule.number()), i + 1);
            assert_eq!(Rule::from_number(rule.number()), Some(*rule));
            assert!(rule.id().starts_with(&format!("rule #{}:", i + 1)));
        }
        assert_eq!(Rule::from_number(0), None);
        assert_eq!(Rule::from_number(22), None);
    }

    #[test]
    fn radical_gain_prefers_reagent_side() {
        assert_eq!(selected(&radical(1), &group(&[2], &[3])), "homolysis");
        assert_eq!(selected(&radical(2), &group(&[], &[3])), "radical addition");
    }

    #[test]
    fn radical_loss_prefers_product_side() {
        assert_eq!(selected(&radical(-1), &group(&[2], &[3])), "recombination");
        assert_eq!(selected(&radical(-1), &group(&[2], &[])), "radical elimination");
    }

    #[test]
    fn unchanged_wins_over_explicit_hydrogen() {
        assert_eq!(selected(&chemistry(0, 0, 0), &group(&[2], &[])), "unchanged");
    }

    #[test]
    fn equal_nonzero_deltas_are_explicit_hydrogen() {
        assert_eq!(selected(&chemistry(1, 1, 1), &group(&[], &[2])), "explicit hydrogen");
        assert_eq!(selected(&chemistry(-1, -1, -1), &group(&[2], &[])), "explicit hydrogen");
    }

    #[test]
    fn mixed_deltas_are_redox() {
        assert_eq!(selected(&chemistry(2, 3, 2), &group(&[2], &[])), "redox");
        assert_eq!(selected(&chemistry(0, 0, 1), &group(&[2], &[])), "redox");
    }

    #[test]
    fn log_record_and_query() {
        let mut log = RuleLog::new();
        assert!(log.is_empty());
        log.record(Rule::Homolysis, 2, 1);
        log.record(Rule::Homolysis, 3, 1);
        log.record(Rule::NewKeptOnRadicalGain, 4, 5);
        assert_eq!(log.count(Rule::Homolysis), 2);
        assert_eq!(log.get(Rule::Recombination), &[]);
        assert!(log.contains(Rule::NewKeptOnRadicalGain));
        let attributed: Vec<_> = log.attributed_to(1).collect();
        assert_eq!(attributed, vec![(Rule::Homolysis, 2), (Rule::Homolysis, 3)]);
        let rules: Vec<Rule> = log.iter().map(|(r, _)| r).collect();
        assert_eq!(rules, vec![Rule::Homolysis, Rule::NewKeptOnRadicalGain]);
    }

    #[test]
    fn log_by_id() {
        let mut log = RuleLog::new();
        log.record(Rule::LostUnchanged, 2, 1);
        let by_id = log.by_id();
        assert_eq!(by_id[Rule::LostUnchanged.id()], vec![(2, 1)]);
    }
}
