//! Guard evaluation against a single atom.
//!
//! Guards of a rule are combined with logical AND and evaluated left to
//! right; evaluation stops at the first guard that fails.

use std::collections::HashMap;
use std::fmt;

use super::error::Error;
use super::rule::{Guard, Rule};
use super::store::EligibilityStore;
use super::tally::NeighborTally;
use crate::model::atom::Atom;

/// Read-only view of one atom while its candidate rules are applied.
#[derive(Debug, Clone, Copy)]
pub struct AtomContext<'a> {
    pub index: usize,
    pub symbol: &'a str,
    pub neighbors: &'a [usize],
    pub tally: &'a NeighborTally,
    pub atoms: &'a [Atom],
    /// Adjacency of the whole structure, for predicates that look past the
    /// first shell.
    pub adjacency: &'a [Vec<usize>],
    pub store: &'a EligibilityStore,
}

impl AtomContext<'_> {
    #[inline]
    pub fn neighbor_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Element symbols of the bonded neighbors, in bond order.
    pub fn neighbor_symbols(&self) -> impl Iterator<Item = &str> + '_ {
        self.neighbors
            .iter()
            .filter_map(|&n| self.atoms[n].kind.symbol())
    }
}

/// A named condition supplied by the rule author, referenced from rules via
/// [`Guard::Predicate`].
pub trait Predicate: Send + Sync {
    fn test(&self, atom: &AtomContext<'_>) -> bool;
}

impl<F> Predicate for F
where
    F: Fn(&AtomContext<'_>) -> bool + Send + Sync,
{
    fn test(&self, atom: &AtomContext<'_>) -> bool {
        self(atom)
    }
}

/// Named predicates available to a typing session.
#[derive(Default)]
pub struct PredicateSet {
    predicates: HashMap<String, Box<dyn Predicate>>,
}

impl PredicateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `predicate` under `name`, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<String>, predicate: impl Predicate + 'static) {
        self.predicates.insert(name.into(), Box::new(predicate));
    }

    pub fn with(mut self, name: impl Into<String>, predicate: impl Predicate + 'static) -> Self {
        self.insert(name, predicate);
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn Predicate> {
        self.predicates.get(name).map(Box::as_ref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.predicates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl fmt::Debug for PredicateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateSet")
            .field("names", &self.names())
            .finish()
    }
}

/// Evaluates a single guard.
///
/// # Errors
///
/// Returns [`Error::UnknownPredicate`] for a predicate guard whose name is not
/// in `predicates`.
pub fn check(
    guard: &Guard,
    rule: &Rule,
    atom: &AtomContext<'_>,
    predicates: &PredicateSet,
) -> Result<bool, Error> {
    let ok = match guard {
        Guard::Element(symbol) => atom.symbol == symbol.as_str(),
        Guard::NeighborCount(n) => atom.neighbor_count() == *n,
        Guard::Neighbors { kind, op, count } => op.holds(atom.tally.count(kind), *count),
        Guard::Whitelisted(rules) => atom.store.is_whitelisted_any(atom.index, rules),
        Guard::NeighborsWhitelisted { rules, op, count } => {
            let matching = atom
                .neighbors
                .iter()
                .filter(|&&n| atom.store.is_whitelisted_any(n, rules))
                .count();
            op.holds(matching, *count)
        }
        Guard::Predicate(name) => predicates
            .get(name)
            .ok_or_else(|| Error::unknown_predicate(rule.id.as_str(), name.as_str()))?
            .test(atom),
    };
    Ok(ok)
}

/// Evaluates the full guard chain of `rule`, short-circuiting on failure.
pub fn matches(rule: &Rule, atom: &AtomContext<'_>, predicates: &PredicateSet) -> Result<bool, Error> {
    for guard in &rule.guards {
        if !check(guard, rule, atom, predicates)? {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::structure::Structure;
    use crate::typer::rule::{CountOp, RuleId};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Methyl carbon bonded to another carbon: C0-C1, C0-H2, C0-H3, C0-H4.
    fn methyl() -> (Structure, Vec<Vec<usize>>) {
        let mut s = Structure::new();
        let c0 = s.add_atom("C");
        let c1 = s.add_atom("C");
        for _ in 0..3 {
            let h = s.add_atom("H");
            s.add_bond(c0, h);
        }
        s.add_bond(c0, c1);
        let neighbors = s.neighbors().unwrap();
        (s, neighbors)
    }

    fn context<'a>(
        s: &'a Structure,
        neighbors: &'a [Vec<usize>],
        tally: &'a NeighborTally,
        store: &'a EligibilityStore,
        index: usize,
    ) -> AtomContext<'a> {
        AtomContext {
            index,
            symbol: s.atoms[index].kind.symbol().unwrap(),
            neighbors: &neighbors[index],
            tally,
            atoms: &s.atoms,
            adjacency: neighbors,
            store,
        }
    }

    #[test]
    fn element_count_and_composition_guards() {
        let (s, neighbors) = methyl();
        let tally = NeighborTally::from_neighbors(&s.atoms, &neighbors[0]);
        let store = EligibilityStore::prepare(&s);
        let atom = context(&s, &neighbors, &tally, &store, 0);
        let predicates = PredicateSet::new();

        let methyl = Rule::builder(135)
            .element("C")
            .neighbor_count(4)
            .neighbors_exactly("H", 3)
            .neighbors_at_least("C", 1)
            .neighbors_at_most("O", 0)
            .build();
        assert!(matches(&methyl, &atom, &predicates).unwrap());

        let methylene = Rule::builder(136)
            .element("C")
            .neighbor_count(4)
            .neighbors_exactly("H", 2)
            .build();
        assert!(!matches(&methylene, &atom, &predicates).unwrap());

        let hydrogen = Rule::builder(140).element("H").build();
        assert!(!matches(&hydrogen, &atom, &predicates).unwrap());
    }

    #[test]
    fn whitelist_guards_read_the_store() {
        let (s, neighbors) = methyl();
        let tally = NeighborTally::from_neighbors(&s.atoms, &neighbors[2]);
        let mut store = EligibilityStore::prepare(&s);
        let predicates = PredicateSet::new();
        let rule = Rule::builder(146)
            .element("H")
            .neighbors_whitelisted([135], CountOp::AtLeast, 1)
            .build();

        assert!(!matches(&rule, &context(&s, &neighbors, &tally, &store, 2), &predicates).unwrap());

        store.whitelist(0, &[RuleId::from(135)]);
        assert!(matches(&rule, &context(&s, &neighbors, &tally, &store, 2), &predicates).unwrap());

        let own = Rule::builder(1).whitelisted([135]).build();
        assert!(matches(&own, &context(&s, &neighbors, &tally, &store, 0), &predicates).unwrap());
    }

    #[test]
    fn chain_short_circuits_on_first_failure() {
        let (s, neighbors) = methyl();
        let tally = NeighborTally::from_neighbors(&s.atoms, &neighbors[0]);
        let store = EligibilityStore::prepare(&s);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let predicates = PredicateSet::new().with("count_calls", move |_: &AtomContext<'_>| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        let rule = Rule::builder(1).element("N").predicate("count_calls").build();
        let atom = context(&s, &neighbors, &tally, &store, 0);
        assert!(!matches(&rule, &atom, &predicates).unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let rule = Rule::builder(2).element("C").predicate("count_calls").build();
        assert!(matches(&rule, &atom, &predicates).unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn predicates_see_neighbor_symbols() {
        let (s, neighbors) = methyl();
        let tally = NeighborTally::from_neighbors(&s.atoms, &neighbors[0]);
        let store = EligibilityStore::prepare(&s);
        let predicates = PredicateSet::new().with("bonded_to_carbon", |atom: &AtomContext<'_>| {
            atom.neighbor_symbols().any(|sym| sym == "C")
        });
        let rule = Rule::builder(1).predicate("bonded_to_carbon").build();
        assert!(matches(&rule, &context(&s, &neighbors, &tally, &store, 0), &predicates).unwrap());
    }

    #[test]
    fn unknown_predicate_is_an_error() {
        let (s, neighbors) = methyl();
        let tally = NeighborTally::from_neighbors(&s.atoms, &neighbors[0]);
        let store = EligibilityStore::prepare(&s);
        let rule = Rule::builder(7).predicate("aromatic").build();
        let result = matches(
            &rule,
            &context(&s, &neighbors, &tally, &store, 0),
            &PredicateSet::new(),
        );
        assert!(matches!(result, Err(Error::UnknownPredicate { .. })));
    }
}
