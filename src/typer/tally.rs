use std::collections::{BTreeMap, HashMap};

use crate::model::atom::Atom;

/// Count of bonded neighbors grouped by element symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeighborTally {
    counts: BTreeMap<String, usize>,
}

impl NeighborTally {
    pub fn from_neighbors(atoms: &[Atom], neighbors: &[usize]) -> Self {
        let mut counts = BTreeMap::new();
        for &n in neighbors {
            if let Some(symbol) = atoms[n].kind.symbol() {
                *counts.entry(symbol.to_string()).or_insert(0) += 1;
            }
        }
        Self { counts }
    }

    /// Number of neighbors of `kind`; zero when absent.
    #[inline]
    pub fn count(&self, kind: &str) -> usize {
        self.counts.get(kind).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Lazily filled per-atom tally cache, scoped to one typing run.
///
/// The owner clears it whenever the bond graph it was computed from may have
/// changed.
#[derive(Debug, Default)]
pub struct TallyCache {
    entries: HashMap<usize, NeighborTally>,
}

impl TallyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute(
        &mut self,
        index: usize,
        atoms: &[Atom],
        neighbors: &[usize],
    ) -> &NeighborTally {
        self.entries
            .entry(index)
            .or_insert_with(|| NeighborTally::from_neighbors(atoms, neighbors))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atoms() -> Vec<Atom> {
        vec![
            Atom::new("C"),
            Atom::new("C"),
            Atom::new("H"),
            Atom::new("H"),
            Atom::port(),
        ]
    }

    #[test]
    fn tallies_neighbors_by_symbol() {
        let tally = NeighborTally::from_neighbors(&atoms(), &[1, 2, 3]);
        assert_eq!(tally.count("C"), 1);
        assert_eq!(tally.count("H"), 2);
        assert_eq!(tally.count("O"), 0);
        assert_eq!(tally.iter().collect::<Vec<_>>(), vec![("C", 1), ("H", 2)]);
    }

    #[test]
    fn ports_are_not_tallied() {
        let tally = NeighborTally::from_neighbors(&atoms(), &[1, 4]);
        assert_eq!(tally.iter().count(), 1);
    }

    #[test]
    fn cache_reuses_entries_until_cleared() {
        let atoms = atoms();
        let mut cache = TallyCache::new();

        assert_eq!(cache.get_or_compute(0, &atoms, &[2, 3]).count("H"), 2);
        // A stale neighbor list is ignored while the entry is cached.
        assert_eq!(cache.get_or_compute(0, &atoms, &[2]).count("H"), 2);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get_or_compute(0, &atoms, &[2]).count("H"), 1);
    }
}
