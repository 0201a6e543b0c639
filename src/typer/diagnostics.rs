//! Structured, non-fatal findings of registry construction, typing runs and
//! rule-consistency analysis.
//!
//! Every diagnostic pushed into a [`Diagnostics`] collector is also emitted as
//! a `tracing` warning, so callers can either assert on the list or read the
//! log.

use std::fmt;
use std::path::PathBuf;

use super::rule::{GuardKind, RuleId};

/// Which rule-interaction graph property a group violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphIssue {
    /// The graph has more than one weakly connected component.
    Disconnected,
    /// The graph contains a directed cycle.
    Cyclic,
    /// More than one rule blacklists nothing inside the group.
    MultipleSinks,
}

impl GraphIssue {
    /// Short tag used in artifact file names.
    pub fn tag(self) -> &'static str {
        match self {
            GraphIssue::Disconnected => "unconnected",
            GraphIssue::Cyclic => "not_DAG",
            GraphIssue::MultipleSinks => "multiple_sinks",
        }
    }
}

impl fmt::Display for GraphIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phrase = match self {
            GraphIssue::Disconnected => "is not connected",
            GraphIssue::Cyclic => "is not a DAG",
            GraphIssue::MultipleSinks => "has multiple sinks",
        };
        f.write_str(phrase)
    }
}

/// A flagged `(element, neighbor pattern)` group of competing rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupFinding {
    pub issue: GraphIssue,
    pub element: String,
    /// Sorted neighbor element symbols.
    pub pattern: Vec<String>,
    /// All rules matching the pattern, sorted.
    pub rules: Vec<RuleId>,
    /// Rules with no outgoing blacklist edge; only set for
    /// [`GraphIssue::MultipleSinks`].
    pub sinks: Vec<RuleId>,
    /// Graphviz file written for this finding, if artifacts were requested.
    pub artifact: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A rule has no element guard and was left out of the registry.
    MissingElementGuard { rule: RuleId },
    /// A rule has no neighbor-count guard and was left out of the registry.
    MissingNeighborCountGuard { rule: RuleId },
    /// A rule carries the same single-valued guard kind more than once.
    DuplicateGuard { rule: RuleId, guard: GuardKind },
    /// No rule is registered for the atom's element.
    NoRuleForKind { atom: usize, kind: String },
    /// Rules exist for the element, but none for this neighbor count.
    NoRuleForNeighborCount {
        atom: usize,
        kind: String,
        neighbor_count: usize,
    },
    /// The round cap was reached before the store stopped changing.
    ConvergenceFailure { rounds: usize },
    /// Several candidate types survived for an atom.
    Ambiguous {
        atom: usize,
        kind: String,
        candidates: Vec<RuleId>,
    },
    /// No candidate type survived for an atom.
    Untyped { atom: usize, kind: String },
    /// A rule-interaction graph check failed.
    RuleGraph(GroupFinding),
}

impl Diagnostic {
    /// Atom index the diagnostic refers to, if it is atom-scoped.
    pub fn atom(&self) -> Option<usize> {
        match self {
            Diagnostic::NoRuleForKind { atom, .. }
            | Diagnostic::NoRuleForNeighborCount { atom, .. }
            | Diagnostic::Ambiguous { atom, .. }
            | Diagnostic::Untyped { atom, .. } => Some(*atom),
            _ => None,
        }
    }

    /// Whether this is a catalogue authoring problem rather than a property of
    /// the typed structure.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Diagnostic::MissingElementGuard { .. }
                | Diagnostic::MissingNeighborCountGuard { .. }
                | Diagnostic::DuplicateGuard { .. }
                | Diagnostic::RuleGraph(_)
        )
    }
}

fn join(ids: &[RuleId]) -> String {
    let parts: Vec<&str> = ids.iter().map(RuleId::as_str).collect();
    parts.join(", ")
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingElementGuard { rule } => {
                write!(f, "rule {} has no element type", rule)
            }
            Diagnostic::MissingNeighborCountGuard { rule } => {
                write!(f, "rule {} has no neighbor count", rule)
            }
            Diagnostic::DuplicateGuard { rule, guard } => {
                write!(f, "duplicate {} guards on rule {}", guard, rule)
            }
            Diagnostic::NoRuleForKind { kind, .. } => {
                write!(f, "no rule for atom kind '{}'", kind)
            }
            Diagnostic::NoRuleForNeighborCount {
                kind,
                neighbor_count,
                ..
            } => write!(f, "no rule for {}-neighbor '{}' atom", neighbor_count, kind),
            Diagnostic::ConvergenceFailure { rounds } => write!(
                f,
                "reached maximum of {} rounds without converging; atom types may be unreliable",
                rounds
            ),
            Diagnostic::Ambiguous {
                atom,
                kind,
                candidates,
            } => write!(
                f,
                "found multiple types for atom {} ({}): {}",
                atom,
                kind,
                join(candidates)
            ),
            Diagnostic::Untyped { atom, kind } => {
                write!(f, "found no type for atom {} ({})", atom, kind)
            }
            Diagnostic::RuleGraph(finding) => {
                write!(
                    f,
                    "{} connected to ({}) {}",
                    finding.element,
                    finding.pattern.join(", "),
                    finding.issue
                )?;
                if finding.issue == GraphIssue::MultipleSinks {
                    write!(f, ": {}", join(&finding.sinks))?;
                }
                if let Some(path) = &finding.artifact {
                    write!(f, ". See '{}'", path.display())?;
                }
                Ok(())
            }
        }
    }
}

/// Ordered collector of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(atom = ?diagnostic.atom(), "{}", diagnostic);
        self.entries.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    /// Keeps only the diagnostics for which `keep` returns true.
    pub fn retain(&mut self, keep: impl FnMut(&Diagnostic) -> bool) {
        self.entries.retain(keep);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Diagnostics that refer to atom `index`.
    pub fn for_atom(&self, index: usize) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.entries
            .iter()
            .filter(move |d| d.atom() == Some(index))
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
