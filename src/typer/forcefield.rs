//! Built-in force field catalogues.
//!
//! Catalogues ship as embedded TOML and are parsed once per process. Each
//! force field also provides the named predicates its rules reference.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use super::catalogue::RuleCatalogue;
use super::error::Error;
use super::guard::{AtomContext, PredicateSet};

const OPLSAA_RULES_TOML: &str = include_str!("../../resources/oplsaa.rules.toml");

static OPLSAA_RULES: OnceLock<RuleCatalogue> = OnceLock::new();

/// Force fields with a built-in rule catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ForceField {
    #[default]
    OplsAa,
}

impl ForceField {
    pub fn name(&self) -> &'static str {
        match self {
            ForceField::OplsAa => "OPLS-AA",
        }
    }

    pub fn catalogue(&self) -> &'static RuleCatalogue {
        match self {
            ForceField::OplsAa => OPLSAA_RULES.get_or_init(|| {
                RuleCatalogue::from_toml(OPLSAA_RULES_TOML)
                    .expect("Failed to parse embedded OPLS-AA rules. This is a library bug.")
            }),
        }
    }

    /// Named predicates referenced by this force field's rules.
    pub fn predicates(&self) -> PredicateSet {
        match self {
            ForceField::OplsAa => PredicateSet::new().with("benzene_ring", benzene_ring),
        }
    }
}

impl fmt::Display for ForceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ForceField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        match normalized.as_str() {
            "OPLSAA" => Ok(ForceField::OplsAa),
            _ => Err(Error::UnsupportedForceField(s.to_string())),
        }
    }
}

/// Loads the catalogue to type with: custom TOML if given, otherwise the
/// built-in catalogue of the named force field.
///
/// # Errors
///
/// Returns [`Error::UnsupportedForceField`] for an unknown force field name
/// (even when custom rules are given, since its predicates are still needed)
/// or any error of [`RuleCatalogue::from_toml`].
pub fn load_catalogue(
    forcefield: &str,
    custom_toml: Option<&str>,
) -> Result<(RuleCatalogue, PredicateSet), Error> {
    let forcefield: ForceField = forcefield.parse()?;
    let catalogue = match custom_toml {
        Some(toml) => RuleCatalogue::from_toml(toml)?,
        None => forcefield.catalogue().clone(),
    };
    Ok((catalogue, forcefield.predicates()))
}

/// Whether the atom lies on a six-membered ring of three-coordinate carbons.
fn benzene_ring(atom: &AtomContext<'_>) -> bool {
    let is_member = |i: usize| {
        atom.atoms[i].kind.symbol() == Some("C") && atom.adjacency[i].len() == 3
    };
    if !is_member(atom.index) {
        return false;
    }
    let mut path = vec![atom.index];
    closes_ring(atom.adjacency, &mut path, 6, &is_member)
}

fn closes_ring(
    adjacency: &[Vec<usize>],
    path: &mut Vec<usize>,
    size: usize,
    is_member: &dyn Fn(usize) -> bool,
) -> bool {
    let Some(&last) = path.last() else {
        return false;
    };
    for &next in &adjacency[last] {
        if !is_member(next) {
            continue;
        }
        if path.len() == size {
            if next == path[0] {
                return true;
            }
            continue;
        }
        if path.contains(&next) {
            continue;
        }
        path.push(next);
        if closes_ring(adjacency, path, size, is_member) {
            return true;
        }
        path.pop();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::structure::Structure;
    use crate::typer::store::EligibilityStore;
    use crate::typer::tally::NeighborTally;

    #[test]
    fn parses_forcefield_names_loosely() {
        assert_eq!("OPLS-AA".parse::<ForceField>().unwrap(), ForceField::OplsAa);
        assert_eq!("oplsaa".parse::<ForceField>().unwrap(), ForceField::OplsAa);
        assert_eq!("opls_aa".parse::<ForceField>().unwrap(), ForceField::OplsAa);
    }

    #[test]
    fn unknown_forcefield_is_unsupported() {
        let err = "GAFF".parse::<ForceField>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedForceField(name) if name == "GAFF"));
    }

    #[test]
    fn embedded_catalogue_parses() {
        let catalogue = ForceField::OplsAa.catalogue();
        assert_eq!(catalogue.name(), "OPLS-AA");
        assert!(catalogue.contains("135"));
        assert!(catalogue.contains("146"));
    }

    #[test]
    fn every_embedded_reference_resolves() {
        let catalogue = ForceField::OplsAa.catalogue();
        for rule in catalogue.iter() {
            for id in rule.referenced_ids() {
                assert!(catalogue.contains(id.as_str()), "{} -> {}", rule.id, id);
            }
        }
    }

    #[test]
    fn load_catalogue_prefers_custom_rules() {
        let custom = "name = \"custom\"\n[[rules]]\nid = 1\n";
        let (catalogue, predicates) = load_catalogue("OPLS-AA", Some(custom)).unwrap();
        assert_eq!(catalogue.name(), "custom");
        assert!(predicates.contains("benzene_ring"));

        assert!(matches!(
            load_catalogue("MMFF", None),
            Err(Error::UnsupportedForceField(_))
        ));
    }

    fn ring_context_check(s: &Structure, index: usize) -> bool {
        let adjacency = s.neighbors().unwrap();
        let tally = NeighborTally::from_neighbors(&s.atoms, &adjacency[index]);
        let store = EligibilityStore::prepare(s);
        let ctx = AtomContext {
            index,
            symbol: s.atoms[index].kind.symbol().unwrap(),
            neighbors: &adjacency[index],
            tally: &tally,
            atoms: &s.atoms,
            adjacency: &adjacency,
            store: &store,
        };
        benzene_ring(&ctx)
    }

    #[test]
    fn benzene_ring_detects_six_membered_carbon_rings() {
        let mut benzene = Structure::new();
        for _ in 0..6 {
            benzene.add_atom("C");
        }
        for i in 0..6 {
            let h = benzene.add_atom("H");
            benzene.add_bond(i, (i + 1) % 6);
            benzene.add_bond(i, h);
        }
        assert!((0..6).all(|i| ring_context_check(&benzene, i)));

        // 1,3,5-hexatriene: an open chain of sp2 carbons.
        let mut chain = Structure::new();
        for _ in 0..6 {
            chain.add_atom("C");
        }
        for i in 0..5 {
            chain.add_bond(i, i + 1);
        }
        for i in 0..6 {
            let needed = if i == 0 || i == 5 { 2 } else { 1 };
            for _ in 0..needed {
                let h = chain.add_atom("H");
                chain.add_bond(i, h);
            }
        }
        assert!(!(0..6).any(|i| ring_context_check(&chain, i)));
    }
}
