//! Per-atom whitelist/blacklist state for a single typing run.
//!
//! Both sets are append-only and keep insertion order, so the final
//! `whitelist − blacklist` remainder is reproducible across runs.

use indexmap::IndexSet;

use super::rule::RuleId;
use crate::model::structure::Structure;

/// Eligible and excluded types of one atom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Eligibility {
    pub whitelist: IndexSet<RuleId>,
    pub blacklist: IndexSet<RuleId>,
}

impl Eligibility {
    #[inline]
    pub fn len(&self) -> usize {
        self.whitelist.len() + self.blacklist.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `whitelist − blacklist`, in whitelist insertion order.
    pub fn remaining(&self) -> Vec<RuleId> {
        self.whitelist
            .iter()
            .filter(|id| !self.blacklist.contains(*id))
            .cloned()
            .collect()
    }
}

/// Whitelist/blacklist sets for every typed atom of a structure.
///
/// Ports never receive state; every query about a port answers as if its
/// sets were empty.
#[derive(Debug, Clone, Default)]
pub struct EligibilityStore {
    entries: Vec<Option<Eligibility>>,
}

impl EligibilityStore {
    /// Allocates empty sets for every non-port atom of `structure`.
    pub fn prepare(structure: &Structure) -> Self {
        let entries = structure
            .atoms
            .iter()
            .map(|atom| (!atom.is_port()).then(Eligibility::default))
            .collect();
        Self { entries }
    }

    pub fn get(&self, atom: usize) -> Option<&Eligibility> {
        self.entries.get(atom).and_then(Option::as_ref)
    }

    /// Adds `ids` to the atom's whitelist; returns whether anything was new.
    pub fn whitelist<'a>(&mut self, atom: usize, ids: impl IntoIterator<Item = &'a RuleId>) -> bool {
        match self.entries.get_mut(atom).and_then(Option::as_mut) {
            Some(entry) => extend(&mut entry.whitelist, ids),
            None => false,
        }
    }

    /// Adds `ids` to the atom's blacklist; returns whether anything was new.
    pub fn blacklist<'a>(&mut self, atom: usize, ids: impl IntoIterator<Item = &'a RuleId>) -> bool {
        match self.entries.get_mut(atom).and_then(Option::as_mut) {
            Some(entry) => extend(&mut entry.blacklist, ids),
            None => false,
        }
    }

    pub fn is_whitelisted(&self, atom: usize, id: &str) -> bool {
        self.get(atom).is_some_and(|e| e.whitelist.contains(id))
    }

    /// Whether the atom was ever found eligible for any of `ids`.
    pub fn is_whitelisted_any(&self, atom: usize, ids: &[RuleId]) -> bool {
        self.get(atom)
            .is_some_and(|e| ids.iter().any(|id| e.whitelist.contains(id)))
    }

    pub fn is_blacklisted(&self, atom: usize, id: &str) -> bool {
        self.get(atom).is_some_and(|e| e.blacklist.contains(id))
    }

    /// Sum of whitelist and blacklist sizes over all atoms.
    pub fn total(&self) -> usize {
        self.entries.iter().flatten().map(Eligibility::len).sum()
    }

    pub fn remaining(&self, atom: usize) -> Vec<RuleId> {
        self.get(atom).map(Eligibility::remaining).unwrap_or_default()
    }
}

fn extend<'a>(set: &mut IndexSet<RuleId>, ids: impl IntoIterator<Item = &'a RuleId>) -> bool {
    let mut changed = false;
    for id in ids {
        changed |= set.insert(id.clone());
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<RuleId> {
        raw.iter().map(|s| RuleId::from(*s)).collect()
    }

    fn structure_with_port() -> Structure {
        let mut s = Structure::new();
        s.add_atom("C");
        s.add_port();
        s.add_atom("H");
        s
    }

    #[test]
    fn prepare_skips_ports() {
        let store = EligibilityStore::prepare(&structure_with_port());
        assert!(store.get(0).is_some());
        assert!(store.get(1).is_none());
        assert!(store.get(2).is_some());
        assert_eq!(store.total(), 0);
    }

    #[test]
    fn writes_to_ports_are_ignored() {
        let mut store = EligibilityStore::prepare(&structure_with_port());
        assert!(!store.whitelist(1, &ids(&["135"])));
        assert!(!store.is_whitelisted(1, "135"));
        assert_eq!(store.total(), 0);
    }

    #[test]
    fn re_adding_an_id_is_a_no_op() {
        let mut store = EligibilityStore::prepare(&structure_with_port());
        assert!(store.whitelist(0, &ids(&["135"])));
        assert!(!store.whitelist(0, &ids(&["135"])));
        assert_eq!(store.get(0).unwrap().whitelist.len(), 1);
        assert_eq!(store.total(), 1);
    }

    #[test]
    fn remaining_is_whitelist_minus_blacklist() {
        let mut store = EligibilityStore::prepare(&structure_with_port());
        store.whitelist(0, &ids(&["135", "145"]));
        store.blacklist(0, &ids(&["145"]));
        assert_eq!(store.remaining(0), ids(&["135"]));
        assert!(store.is_blacklisted(0, "145"));
        assert_eq!(store.total(), 3);
    }

    #[test]
    fn whitelisted_any_checks_membership() {
        let mut store = EligibilityStore::prepare(&structure_with_port());
        store.whitelist(2, &ids(&["146"]));
        assert!(store.is_whitelisted_any(2, &ids(&["140", "146"])));
        assert!(!store.is_whitelisted_any(2, &ids(&["140"])));
        assert!(!store.is_whitelisted_any(0, &ids(&["146"])));
    }
}
