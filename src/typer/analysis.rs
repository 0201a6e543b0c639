//! Static consistency checks over a rule catalogue.
//!
//! Rules that can match the same atom compete through their blacklists. For
//! every `(element, neighbor pattern)` that several rules can match, the
//! blacklist relation among those rules should form one connected, acyclic
//! graph with a single sink: the most specific rule. Anything else means some
//! atom can end up untyped or ambiguous.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use petgraph::Direction;
use petgraph::algo::{connected_components, is_cyclic_directed};
use petgraph::dot::Dot;
use petgraph::graph::DiGraph;
use petgraph::graphmap::DiGraphMap;

use super::catalogue::RuleCatalogue;
use super::diagnostics::{Diagnostic, Diagnostics, GraphIssue, GroupFinding};
use super::error::Error;
use super::rule::{Guard, Rule, RuleId};

/// Options of [`analyze`].
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    /// Where to write one Graphviz file per flagged group. Created if missing.
    pub artifact_dir: Option<PathBuf>,
}

/// Outcome of [`analyze`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisReport {
    pub diagnostics: Diagnostics,
    /// Number of groups with at least two competing rules.
    pub groups_checked: usize,
}

impl AnalysisReport {
    /// Rule-graph findings, in group order.
    pub fn findings(&self) -> impl Iterator<Item = &GroupFinding> + '_ {
        self.diagnostics.iter().filter_map(|d| match d {
            Diagnostic::RuleGraph(finding) => Some(finding),
            _ => None,
        })
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

type GroupKey<'c> = (&'c str, Vec<&'c str>);

/// Checks every group of competing rules in `catalogue`.
///
/// # Errors
///
/// Returns [`Error::Artifact`] if an artifact directory is configured and a
/// graph file cannot be written.
pub fn analyze(catalogue: &RuleCatalogue, options: &AnalysisOptions) -> Result<AnalysisReport, Error> {
    let mut diagnostics = Diagnostics::new();

    let supported: Vec<&str> = catalogue
        .iter()
        .flat_map(|rule| rule.guards.iter())
        .filter_map(|guard| match guard {
            Guard::Element(symbol) => Some(symbol.as_str()),
            _ => None,
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut groups: BTreeMap<GroupKey<'_>, Vec<&RuleId>> = BTreeMap::new();
    for rule in catalogue.iter() {
        for guard in rule.duplicate_guards() {
            diagnostics.push(Diagnostic::DuplicateGuard {
                rule: rule.id.clone(),
                guard,
            });
        }
        let (Some(element), Some(neighbor_count)) = (rule.element(), rule.neighbor_count()) else {
            if rule.element().is_none() {
                diagnostics.push(Diagnostic::MissingElementGuard {
                    rule: rule.id.clone(),
                });
            }
            if rule.neighbor_count().is_none() {
                diagnostics.push(Diagnostic::MissingNeighborCountGuard {
                    rule: rule.id.clone(),
                });
            }
            continue;
        };

        for pattern in multisets(&supported, neighbor_count) {
            if admits(rule, &pattern) {
                groups.entry((element, pattern)).or_default().push(&rule.id);
            }
        }
    }

    let mut groups_checked = 0;
    for ((element, pattern), mut rules) in groups {
        if rules.len() < 2 {
            continue;
        }
        groups_checked += 1;
        rules.sort();

        let graph = interaction_graph(catalogue, &rules);
        for (issue, sinks) in check_graph(&graph) {
            let pattern: Vec<String> = pattern.iter().map(|s| s.to_string()).collect();
            let artifact = match &options.artifact_dir {
                Some(dir) => Some(write_artifact(dir, issue, element, &pattern, &graph)?),
                None => None,
            };
            diagnostics.push(Diagnostic::RuleGraph(GroupFinding {
                issue,
                element: element.to_string(),
                pattern,
                rules: rules.iter().map(|id| (*id).clone()).collect(),
                sinks,
                artifact,
            }));
        }
    }

    tracing::info!(
        catalogue = catalogue.name(),
        groups = groups_checked,
        findings = diagnostics.len(),
        "rule consistency analysis finished"
    );

    Ok(AnalysisReport {
        diagnostics,
        groups_checked,
    })
}

/// All multisets of `size` symbols drawn from sorted `elements`, each sorted,
/// in lexicographic order.
fn multisets<'e>(elements: &[&'e str], size: usize) -> Vec<Vec<&'e str>> {
    fn extend<'e>(
        elements: &[&'e str],
        size: usize,
        start: usize,
        current: &mut Vec<&'e str>,
        out: &mut Vec<Vec<&'e str>>,
    ) {
        if current.len() == size {
            out.push(current.clone());
            return;
        }
        for i in start..elements.len() {
            current.push(elements[i]);
            extend(elements, size, i, current, out);
            current.pop();
        }
    }

    let mut out = Vec::new();
    extend(elements, size, 0, &mut Vec::with_capacity(size), &mut out);
    out
}

/// Whether the rule's neighbor-composition guards accept `pattern`.
fn admits(rule: &Rule, pattern: &[&str]) -> bool {
    rule.composition().all(|(kind, op, count)| {
        let actual = pattern.iter().filter(|s| **s == kind).count();
        op.holds(actual, count)
    })
}

/// Directed graph over `rules` with an edge `A → B` iff A blacklists B.
fn interaction_graph<'c>(catalogue: &'c RuleCatalogue, rules: &[&'c RuleId]) -> DiGraph<&'c str, &'static str> {
    let mut graph = DiGraphMap::new();
    for id in rules {
        graph.add_node(id.as_str());
    }
    for id in rules {
        let Some(rule) = catalogue.get(id.as_str()) else {
            continue;
        };
        for target in rule.blacklist_ids() {
            if rules.contains(&target) {
                graph.add_edge(id.as_str(), target.as_str(), "blacklists");
            }
        }
    }
    graph.into_graph()
}

/// Every property the graph violates, with sinks attached to
/// [`GraphIssue::MultipleSinks`].
fn check_graph(graph: &DiGraph<&str, &'static str>) -> Vec<(GraphIssue, Vec<RuleId>)> {
    let mut issues = Vec::new();

    if connected_components(graph) > 1 {
        issues.push((GraphIssue::Disconnected, Vec::new()));
    }
    if is_cyclic_directed(graph) {
        issues.push((GraphIssue::Cyclic, Vec::new()));
    }

    let mut sinks: Vec<RuleId> = graph
        .node_indices()
        .filter(|&n| graph.neighbors_directed(n, Direction::Outgoing).next().is_none())
        .map(|n| RuleId::from(graph[n]))
        .collect();
    if sinks.len() > 1 {
        sinks.sort();
        issues.push((GraphIssue::MultipleSinks, sinks));
    }

    issues
}

fn write_artifact(
    dir: &Path,
    issue: GraphIssue,
    element: &str,
    pattern: &[String],
    graph: &DiGraph<&str, &'static str>,
) -> Result<PathBuf, Error> {
    let path = dir.join(format!(
        "{}-element_{}-pattern_{}.dot",
        issue.tag(),
        element,
        pattern.concat()
    ));
    fs::create_dir_all(dir)
        .and_then(|()| fs::write(&path, Dot::new(graph).to_string()))
        .map_err(|source| Error::Artifact {
            path: path.clone(),
            source,
        })?;
    tracing::debug!(path = %path.display(), "wrote rule graph artifact");
    Ok(path)
}
