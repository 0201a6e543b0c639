use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::Deserialize;

use super::error::Error;
use super::rule::{Effect, Guard, Rule, RuleId};

/// Ordered collection of uniquely identified rules for one force field.
///
/// Declaration order is preserved; it is the order in which candidate rules
/// are applied to an atom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleCatalogue {
    name: String,
    rules: IndexMap<RuleId, Rule>,
}

#[derive(Debug, Deserialize)]
struct CatalogueFile {
    #[serde(default)]
    name: String,
    #[serde(default)]
    rules: Vec<RuleEntry>,
}

#[derive(Debug, Deserialize)]
struct RuleEntry {
    id: RuleId,
    #[serde(default)]
    guards: Vec<Guard>,
    #[serde(default)]
    whitelist: Vec<RuleId>,
    #[serde(default)]
    blacklist: Vec<RuleId>,
}

impl From<RuleEntry> for Rule {
    fn from(entry: RuleEntry) -> Self {
        let mut effects = Vec::new();
        if !entry.whitelist.is_empty() {
            effects.push(Effect::whitelist(entry.whitelist));
        }
        if !entry.blacklist.is_empty() {
            effects.push(Effect::blacklist(entry.blacklist));
        }
        Rule::new(entry.id, entry.guards, effects)
    }
}

impl RuleCatalogue {
    /// Builds a catalogue from rules in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateRuleId`] if two rules share an identifier.
    pub fn new(name: impl Into<String>, rules: impl IntoIterator<Item = Rule>) -> Result<Self, Error> {
        let mut map = IndexMap::new();
        for rule in rules {
            match map.entry(rule.id.clone()) {
                Entry::Occupied(_) => return Err(Error::DuplicateRuleId(rule.id.to_string())),
                Entry::Vacant(slot) => {
                    slot.insert(rule);
                }
            }
        }
        Ok(Self {
            name: name.into(),
            rules: map,
        })
    }

    /// Parses a catalogue from its TOML representation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RuleParse`] for malformed TOML or unknown guard forms,
    /// and [`Error::DuplicateRuleId`] for repeated identifiers.
    pub fn from_toml(toml: &str) -> Result<Self, Error> {
        let file: CatalogueFile = toml::from_str(toml)?;
        Self::new(file.name, file.rules.into_iter().map(Rule::from))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.rules.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> + '_ {
        self.rules.values()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typer::rule::CountOp;

    const SAMPLE: &str = r#"
name = "sample"

[[rules]]
id = 140
guards = [
  { element = "H" },
  { neighbor_count = 1 },
  { neighbors = { kind = "C", op = "exactly", count = 1 } },
]
whitelist = [140]

[[rules]]
id = "146"
guards = [
  { element = "H" },
  { neighbor_count = 1 },
  { neighbors_whitelisted = { rules = [145], op = "at_least", count = 1 } },
  { whitelisted = ["140"] },
  { predicate = "aromatic" },
]
whitelist = ["146"]
blacklist = [140, "140"]
"#;

    #[test]
    fn parses_every_guard_form() {
        let catalogue = RuleCatalogue::from_toml(SAMPLE).unwrap();
        assert_eq!(catalogue.name(), "sample");
        assert_eq!(catalogue.len(), 2);

        let aromatic = catalogue.get("146").unwrap();
        assert_eq!(
            aromatic.guards,
            vec![
                Guard::Element("H".into()),
                Guard::NeighborCount(1),
                Guard::NeighborsWhitelisted {
                    rules: vec![RuleId::from(145)],
                    op: CountOp::AtLeast,
                    count: 1,
                },
                Guard::Whitelisted(vec![RuleId::from(140)]),
                Guard::Predicate("aromatic".into()),
            ]
        );
        assert_eq!(
            aromatic.blacklist_ids().cloned().collect::<Vec<_>>(),
            vec![RuleId::from(140)]
        );
    }

    #[test]
    fn preserves_declaration_order() {
        let catalogue = RuleCatalogue::from_toml(SAMPLE).unwrap();
        let ids: Vec<&str> = catalogue.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["140", "146"]);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let toml = r#"
[[rules]]
id = 1
[[rules]]
id = "1"
"#;
        assert!(matches!(
            RuleCatalogue::from_toml(toml),
            Err(Error::DuplicateRuleId(id)) if id == "1"
        ));
    }

    #[test]
    fn rejects_unknown_guard_forms() {
        let toml = r#"
[[rules]]
id = 1
guards = [{ charge = 0 }]
"#;
        assert!(matches!(
            RuleCatalogue::from_toml(toml),
            Err(Error::RuleParse(_))
        ));
    }

    #[test]
    fn rules_without_effects_have_none() {
        let toml = r#"
[[rules]]
id = 1
guards = [{ element = "C" }, { neighbor_count = 4 }]
"#;
        let catalogue = RuleCatalogue::from_toml(toml).unwrap();
        assert!(catalogue.get("1").unwrap().effects.is_empty());
    }
}
