//! Fixed-point whitelist/blacklist propagation.
//!
//! Each round applies every candidate rule to every typed atom. Rule effects
//! only ever add to an atom's sets, so a round that leaves the total set size
//! unchanged is a true fixed point. The round cap turns mutually reinforcing
//! rules into a [`Diagnostic::ConvergenceFailure`] instead of a hang.

use std::collections::HashSet;

use super::catalogue::RuleCatalogue;
use super::diagnostics::{Diagnostic, Diagnostics};
use super::error::Error;
use super::guard::{self, AtomContext, PredicateSet};
use super::registry::{Candidates, RuleRegistry};
use super::rule::{Effect, Rule, RuleId};
use super::store::EligibilityStore;
use super::tally::TallyCache;
use crate::model::atom::{Atom, AtomTypeAssignment};
use crate::model::structure::Structure;

/// Default upper bound on propagation rounds.
pub const DEFAULT_MAX_ROUNDS: usize = 10;

/// Summary of one typing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingReport {
    /// Rounds executed, including the final unchanged one.
    pub rounds: usize,
    /// Whether a fixed point was reached within the round cap.
    pub converged: bool,
    /// Atoms that received exactly one type.
    pub resolved: usize,
    /// Non-port atoms considered for typing.
    pub typed_atoms: usize,
    pub diagnostics: Diagnostics,
}

impl TypingReport {
    /// Results are only guaranteed when the run converged.
    pub fn is_reliable(&self) -> bool {
        self.converged
    }

    /// Whether every non-port atom received exactly one type.
    pub fn is_complete(&self) -> bool {
        self.resolved == self.typed_atoms
    }
}

/// Owns everything a typing run needs, so independent sessions never share
/// state.
///
/// A run takes `&mut self`; one session cannot type two structures at once.
#[derive(Debug)]
pub struct TypingSession {
    registry: RuleRegistry,
    predicates: PredicateSet,
    tally: TallyCache,
    max_rounds: usize,
    registry_diagnostics: Diagnostics,
}

impl TypingSession {
    pub fn new(catalogue: RuleCatalogue, predicates: PredicateSet) -> Self {
        let mut registry_diagnostics = Diagnostics::new();
        let registry = RuleRegistry::build(catalogue, &mut registry_diagnostics);
        Self {
            registry,
            predicates,
            tally: TallyCache::new(),
            max_rounds: DEFAULT_MAX_ROUNDS,
            registry_diagnostics,
        }
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Configuration problems found while indexing the catalogue.
    pub fn registry_diagnostics(&self) -> &Diagnostics {
        &self.registry_diagnostics
    }

    pub fn predicates_mut(&mut self) -> &mut PredicateSet {
        &mut self.predicates
    }

    /// Drops cached neighbor tallies. Every run already starts from an empty
    /// cache; this only matters to callers inspecting memory between runs.
    pub fn invalidate_cache(&mut self) {
        self.tally.clear();
    }

    /// Types every non-port atom of `structure` in place.
    ///
    /// Each atom's [`atomtype`](Atom::atomtype) is overwritten: `Resolved` when
    /// exactly one type survives, `Unresolved` with the remainder otherwise,
    /// and `None` for ports and atoms no rule covers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBond`] for malformed bonds,
    /// [`Error::RuleReference`] when a fired rule names an unknown rule, and
    /// [`Error::UnknownPredicate`] for an unregistered predicate.
    pub fn run(&mut self, structure: &mut Structure) -> Result<TypingReport, Error> {
        let adjacency = typed_adjacency(structure)?;
        self.tally.clear();

        let mut store = EligibilityStore::prepare(structure);
        let mut diagnostics = self.registry_diagnostics.clone();
        let uncovered = coverage(&self.registry, &structure.atoms, &adjacency, &mut diagnostics);
        let mut verified = HashSet::new();

        let mut round = Round {
            registry: &self.registry,
            predicates: &self.predicates,
            tally: &mut self.tally,
            atoms: &structure.atoms,
            adjacency: &adjacency,
            verified: &mut verified,
        };

        let mut rounds = 0;
        let mut converged = false;
        while rounds < self.max_rounds {
            let before = store.total();
            round.apply(&mut store)?;
            rounds += 1;

            let after = store.total();
            tracing::debug!(round = rounds, before, after, "propagation round finished");
            if after == before {
                converged = true;
                break;
            }
        }

        if !converged {
            diagnostics.push(Diagnostic::ConvergenceFailure { rounds });
        }

        let (resolved, typed_atoms) = resolve(structure, &store, &uncovered, &mut diagnostics);

        tracing::info!(
            atoms = typed_atoms,
            resolved,
            rounds,
            converged,
            "atom typing finished"
        );

        Ok(TypingReport {
            rounds,
            converged,
            resolved,
            typed_atoms,
            diagnostics,
        })
    }
}

/// Bond adjacency restricted to non-port partners.
fn typed_adjacency(structure: &Structure) -> Result<Vec<Vec<usize>>, Error> {
    let adjacency = structure.neighbors()?;
    Ok(adjacency
        .into_iter()
        .map(|neighbors| {
            neighbors
                .into_iter()
                .filter(|&n| !structure.atoms[n].is_port())
                .collect()
        })
        .collect())
}

/// Borrowed state shared by all rounds of one run.
struct Round<'a> {
    registry: &'a RuleRegistry,
    predicates: &'a PredicateSet,
    tally: &'a mut TallyCache,
    atoms: &'a [Atom],
    adjacency: &'a [Vec<usize>],
    verified: &'a mut HashSet<RuleId>,
}

impl Round<'_> {
    /// Applies every candidate rule to every typed atom once. Atoms without
    /// candidates are skipped; [`coverage`] reports them.
    fn apply(&mut self, store: &mut EligibilityStore) -> Result<(), Error> {
        let registry = self.registry;
        for (index, atom) in self.atoms.iter().enumerate() {
            let Some(symbol) = atom.kind.symbol() else {
                continue;
            };
            let neighbors = &self.adjacency[index];

            let Candidates::Rules(rules) = registry.candidates(symbol, neighbors.len()) else {
                continue;
            };

            for id in rules {
                if store.is_whitelisted(index, id.as_str()) {
                    continue;
                }
                let rule = registry.rule(id.as_str(), id.as_str())?;
                self.verify_references(rule)?;

                let fired = {
                    let tally = self.tally.get_or_compute(index, self.atoms, neighbors);
                    let ctx = AtomContext {
                        index,
                        symbol,
                        neighbors,
                        tally,
                        atoms: self.atoms,
                        adjacency: self.adjacency,
                        store: &*store,
                    };
                    guard::matches(rule, &ctx, self.predicates)?
                };

                if fired {
                    tracing::trace!(atom = index, rule = %rule.id, "rule fired");
                    apply_effects(rule, index, store);
                }
            }
        }
        Ok(())
    }

    /// Fails fast on the first evaluation of a rule that names an unknown rule.
    fn verify_references(&mut self, rule: &Rule) -> Result<(), Error> {
        if self.verified.contains(&rule.id) {
            return Ok(());
        }
        for referenced in rule.referenced_ids() {
            self.registry.rule(referenced.as_str(), rule.id.as_str())?;
        }
        self.verified.insert(rule.id.clone());
        Ok(())
    }
}

/// Reports atoms with no candidate rules and flags them so they are never
/// classified. Lookups depend only on kind and typed neighbor count, so one
/// pass before propagation covers every round.
fn coverage(
    registry: &RuleRegistry,
    atoms: &[Atom],
    adjacency: &[Vec<usize>],
    diagnostics: &mut Diagnostics,
) -> Vec<bool> {
    let mut uncovered = vec![false; atoms.len()];
    for (atom, (entry, neighbors)) in atoms.iter().zip(adjacency).enumerate() {
        let Some(symbol) = entry.kind.symbol() else {
            continue;
        };
        let neighbor_count = neighbors.len();
        let diagnostic = match registry.candidates(symbol, neighbor_count) {
            Candidates::Rules(_) => continue,
            Candidates::NoRuleForKind => Diagnostic::NoRuleForKind {
                atom,
                kind: symbol.to_string(),
            },
            Candidates::NoRuleForNeighborCount => Diagnostic::NoRuleForNeighborCount {
                atom,
                kind: symbol.to_string(),
                neighbor_count,
            },
        };
        uncovered[atom] = true;
        diagnostics.push(diagnostic);
    }
    uncovered
}

fn apply_effects(rule: &Rule, atom: usize, store: &mut EligibilityStore) {
    for effect in &rule.effects {
        match effect {
            Effect::Whitelist(ids) => store.whitelist(atom, ids),
            Effect::Blacklist(ids) => store.blacklist(atom, ids),
        };
    }
}

/// Writes `whitelist − blacklist` onto each atom; returns `(resolved, typed)`.
fn resolve(
    structure: &mut Structure,
    store: &EligibilityStore,
    uncovered: &[bool],
    diagnostics: &mut Diagnostics,
) -> (usize, usize) {
    let mut resolved = 0;
    let mut typed = 0;

    for (index, atom) in structure.atoms.iter_mut().enumerate() {
        if atom.is_port() {
            atom.atomtype = None;
            continue;
        }
        typed += 1;
        if uncovered[index] {
            atom.atomtype = None;
            continue;
        }

        let kind = atom.kind.to_string();
        let mut remaining = store.remaining(index);
        atom.atomtype = Some(match remaining.len() {
            1 => {
                resolved += 1;
                AtomTypeAssignment::Resolved(remaining.remove(0))
            }
            0 => {
                diagnostics.push(Diagnostic::Untyped { atom: index, kind });
                AtomTypeAssignment::Unresolved(remaining)
            }
            _ => {
                diagnostics.push(Diagnostic::Ambiguous {
                    atom: index,
                    kind,
                    candidates: remaining.clone(),
                });
                AtomTypeAssignment::Unresolved(remaining)
            }
        });
    }

    (resolved, typed)
}
