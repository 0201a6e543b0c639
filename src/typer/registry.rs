//! `(element, neighbor count) → rules` index over a catalogue.
//!
//! The engine only ever evaluates the rules of an atom's bucket instead of
//! the whole catalogue.

use std::collections::BTreeMap;

use super::catalogue::RuleCatalogue;
use super::diagnostics::{Diagnostic, Diagnostics};
use super::error::Error;
use super::rule::{Rule, RuleId};

/// Result of a registry lookup for one atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidates<'a> {
    /// No rule is declared for the element.
    NoRuleForKind,
    /// Rules exist for the element, but none for the neighbor count.
    NoRuleForNeighborCount,
    /// Candidate rules in declaration order.
    Rules(&'a [RuleId]),
}

#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    catalogue: RuleCatalogue,
    buckets: BTreeMap<String, BTreeMap<usize, Vec<RuleId>>>,
}

impl RuleRegistry {
    /// Indexes every well-formed rule of `catalogue`.
    ///
    /// Rules missing an element or neighbor-count guard, or repeating either,
    /// are reported into `diagnostics` and left out of the index. They stay
    /// resolvable through [`rule`](Self::rule) so effects naming them still
    /// work.
    pub fn build(catalogue: RuleCatalogue, diagnostics: &mut Diagnostics) -> Self {
        let mut buckets: BTreeMap<String, BTreeMap<usize, Vec<RuleId>>> = BTreeMap::new();

        for rule in catalogue.iter() {
            if let Some((element, neighbor_count)) = index_key(rule, diagnostics) {
                buckets
                    .entry(element.to_string())
                    .or_default()
                    .entry(neighbor_count)
                    .or_default()
                    .push(rule.id.clone());
            }
        }

        tracing::debug!(
            catalogue = catalogue.name(),
            rules = catalogue.len(),
            elements = buckets.len(),
            "built rule registry"
        );

        Self { catalogue, buckets }
    }

    pub fn catalogue(&self) -> &RuleCatalogue {
        &self.catalogue
    }

    pub fn candidates(&self, element: &str, neighbor_count: usize) -> Candidates<'_> {
        match self.buckets.get(element) {
            None => Candidates::NoRuleForKind,
            Some(by_count) => match by_count.get(&neighbor_count) {
                None => Candidates::NoRuleForNeighborCount,
                Some(rules) => Candidates::Rules(rules),
            },
        }
    }

    /// Resolves a rule identifier named by `referenced_by`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RuleReference`] if the catalogue has no such rule.
    pub fn rule(&self, id: &str, referenced_by: &str) -> Result<&Rule, Error> {
        self.catalogue
            .get(id)
            .ok_or_else(|| Error::rule_reference(id, referenced_by))
    }

    /// Element symbols with at least one indexed rule, sorted.
    pub fn elements(&self) -> impl Iterator<Item = &str> + '_ {
        self.buckets.keys().map(String::as_str)
    }

    /// Every bucket as `(element, neighbor count, rules)`, sorted by key.
    pub fn buckets(&self) -> impl Iterator<Item = (&str, usize, &[RuleId])> + '_ {
        self.buckets.iter().flat_map(|(element, by_count)| {
            by_count
                .iter()
                .map(move |(count, rules)| (element.as_str(), *count, rules.as_slice()))
        })
    }

    /// Number of indexed rules.
    pub fn len(&self) -> usize {
        self.buckets().map(|(_, _, rules)| rules.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

fn index_key<'r>(rule: &'r Rule, diagnostics: &mut Diagnostics) -> Option<(&'r str, usize)> {
    let duplicates = rule.duplicate_guards();
    for guard in &duplicates {
        diagnostics.push(Diagnostic::DuplicateGuard {
            rule: rule.id.clone(),
            guard: *guard,
        });
    }

    let element = rule.element();
    if element.is_none() {
        diagnostics.push(Diagnostic::MissingElementGuard {
            rule: rule.id.clone(),
        });
    }
    let neighbor_count = rule.neighbor_count();
    if neighbor_count.is_none() {
        diagnostics.push(Diagnostic::MissingNeighborCountGuard {
            rule: rule.id.clone(),
        });
    }

    if !duplicates.is_empty() {
        return None;
    }
    Some((element?, neighbor_count?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<RuleId> {
        raw.iter().map(|s| RuleId::from(*s)).collect()
    }

    fn catalogue(rules: Vec<Rule>) -> RuleCatalogue {
        RuleCatalogue::new("test", rules).unwrap()
    }

    #[test]
    fn buckets_preserve_declaration_order() {
        let rules = vec![
            Rule::builder(136).element("C").neighbor_count(4).build(),
            Rule::builder(135).element("C").neighbor_count(4).build(),
            Rule::builder(145).element("C").neighbor_count(3).build(),
            Rule::builder(140).element("H").neighbor_count(1).build(),
        ];
        let mut diagnostics = Diagnostics::new();
        let registry = RuleRegistry::build(catalogue(rules), &mut diagnostics);

        assert!(diagnostics.is_empty());
        assert_eq!(registry.len(), 4);
        assert_eq!(
            registry.candidates("C", 4),
            Candidates::Rules(&ids(&["136", "135"]))
        );
        assert_eq!(registry.candidates("C", 3), Candidates::Rules(&ids(&["145"])));
        assert_eq!(registry.candidates("C", 2), Candidates::NoRuleForNeighborCount);
        assert_eq!(registry.candidates("N", 3), Candidates::NoRuleForKind);
        assert_eq!(registry.elements().collect::<Vec<_>>(), vec!["C", "H"]);
    }

    #[test]
    fn rules_missing_guards_are_reported_and_excluded() {
        let rules = vec![
            Rule::builder(1).neighbor_count(4).build(),
            Rule::builder(2).element("C").build(),
            Rule::builder(3).element("C").neighbor_count(4).build(),
        ];
        let mut diagnostics = Diagnostics::new();
        let registry = RuleRegistry::build(catalogue(rules), &mut diagnostics);

        assert_eq!(
            diagnostics.into_vec(),
            vec![
                Diagnostic::MissingElementGuard { rule: "1".into() },
                Diagnostic::MissingNeighborCountGuard { rule: "2".into() },
            ]
        );
        assert_eq!(registry.candidates("C", 4), Candidates::Rules(&ids(&["3"])));
        assert!(registry.rule("1", "test").is_ok());
    }

    #[test]
    fn duplicate_guards_exclude_the_rule() {
        let rules = vec![
            Rule::builder(1)
                .element("C")
                .neighbor_count(4)
                .neighbor_count(3)
                .build(),
        ];
        let mut diagnostics = Diagnostics::new();
        let registry = RuleRegistry::build(catalogue(rules), &mut diagnostics);

        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(
            diagnostics.iter().next(),
            Some(Diagnostic::DuplicateGuard { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn unknown_reference_is_an_error() {
        let mut diagnostics = Diagnostics::new();
        let registry = RuleRegistry::build(RuleCatalogue::default(), &mut diagnostics);
        assert!(matches!(
            registry.rule("999", "135"),
            Err(Error::RuleReference { rule, referenced_by }) if rule == "999" && referenced_by == "135"
        ));
    }
}
