use crate::cgr::{compose_with, union, ComposeOptions, RuleLog};
use crate::container::{Container, Meta};
use crate::error::CgrError;
use crate::valence::{StandardValence, ValenceOracle};

/// Reagent and product molecules of one reaction.
///
/// `rules` is filled in when the reaction is composed into a CGR and
/// records which balancing rules fired.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reaction {
    pub reagents: Vec<Container>,
    pub products: Vec<Container>,
    pub meta: Meta,
    pub rules: Option<RuleLog>,
}

impl Reaction {
    pub fn new(reagents: Vec<Container>, products: Vec<Container>) -> Reaction {
        Reaction {
            reagents,
            products,
            ..Reaction::default()
        }
    }

    /// Compose this reaction into a CGR with the standard valence model.
    /// The rule log is stored on the reaction and the CGR takes the
    /// reaction's metadata.
    pub fn to_cgr(&mut self, balance: bool) -> Result<Container, CgrError> {
        self.to_cgr_with(&ComposeOptions { balance }, &StandardValence)
    }

    pub fn to_cgr_with<O: ValenceOracle>(
        &mut self,
        options: &ComposeOptions,
        oracle: &O,
    ) -> Result<Container, CgrError> {
        let reagents = merge(&self.reagents)?;
        let products = merge(&self.products)?;
        let (mut cgr, log) = compose_with(&reagents, &products, options, oracle)?;
        cgr.meta = self.meta.clone();
        self.rules = Some(log);
        Ok(cgr)
    }
}

/// All molecules of one side as a single disconnected graph.
fn merge(molecules: &[Container]) -> Result<Container, CgrError> {
    molecules
        .iter()
        .try_fold(Container::molecule(), |merged, m| union(&merged, m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::{Atom, Bond, BondOrder};
    use crate::cgr::Rule;
    use crate::element::Element;

    fn molecule(atoms: &[(u32, Element)], bonds: &[(u32, u32)]) -> Container {
        let mut m = Container::molecule();
        for &(key, element) in atoms {
            m.add_atom(key, Atom::new(element)).unwrap();
        }
        for &(a, b) in bonds {
            m.add_bond(a, b, Bond::new(BondOrder::Single)).unwrap();
        }
        m
    }

    #[test]
    fn reagents_merged_before_compose() {
        let mut reaction = Reaction::new(
            vec![
                molecule(&[(1, Element::C), (2, Element::Br)], &[(1, 2)]),
                molecule(&[(3, Element::O)], &[]),
            ],
            vec![
                molecule(&[(1, Element::C), (3, Element::O)], &[(1, 3)]),
                molecule(&[(2, Element::Br)], &[]),
            ],
        );
        reaction.meta.insert("id".into(), vec!["sn2".into()]);
        let cgr = reaction.to_cgr(true).unwrap();
        assert_eq!(cgr.atom_count(), 3);
        assert_eq!(cgr.bond(1, 2).unwrap().p.order, None);
        assert_eq!(cgr.bond(1, 3).unwrap().s.order, None);
        assert_eq!(cgr.meta["id"], vec!["sn2".to_string()]);
        assert!(reaction.rules.as_ref().is_some_and(RuleLog::is_empty));
    }

    #[test]
    fn overlapping_reagents_conflict() {
        let mut reaction = Reaction::new(
            vec![
                molecule(&[(1, Element::C)], &[]),
                molecule(&[(1, Element::O)], &[]),
            ],
            vec![],
        );
        assert_eq!(
            reaction.to_cgr(false),
            Err(CgrError::ConflictingIdentity { atoms: vec![1] })
        );
        assert!(reaction.rules.is_none());
    }

    #[test]
    fn lost_atom_logged() {
        let mut reaction = Reaction::new(
            vec![molecule(&[(1, Element::C), (2, Element::Br)], &[(1, 2)])],
            vec![molecule(&[(1, Element::C), (3, Element::Cl)], &[(1, 3)])],
        );
        reaction.to_cgr(true).unwrap();
        let rules = reaction.rules.unwrap();
        assert_eq!(rules.get(Rule::LostUnchanged), &[(2, 1)]);
        assert_eq!(rules.get(Rule::NewUnchanged), &[(3, 1)]);
    }
}
