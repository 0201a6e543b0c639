//! Rule-based atom typing.
//!
//! A force field is described by a [`RuleCatalogue`] of declarative rules.
//! [`TypingSession`] applies them to a [`Structure`] until the per-atom
//! whitelist/blacklist state stops changing, and [`analyze`] checks a
//! catalogue for competing rules that cannot be told apart.

mod analysis;
mod catalogue;
mod config;
mod diagnostics;
mod engine;
mod error;
mod forcefield;
mod guard;
mod registry;
mod rule;
mod store;
mod tally;

pub use analysis::{AnalysisOptions, AnalysisReport, analyze};
pub use catalogue::RuleCatalogue;
pub use config::TyperConfig;
pub use diagnostics::{Diagnostic, Diagnostics, GraphIssue, GroupFinding};
pub use engine::{DEFAULT_MAX_ROUNDS, TypingReport, TypingSession};
pub use error::Error;
pub use forcefield::{ForceField, load_catalogue};
pub use guard::{AtomContext, Predicate, PredicateSet};
pub use registry::{Candidates, RuleRegistry};
pub use rule::{CountOp, Effect, Guard, GuardKind, Rule, RuleBuilder, RuleId};
pub use store::{Eligibility, EligibilityStore};
pub use tally::{NeighborTally, TallyCache};

use crate::model::structure::Structure;

/// Types every non-port atom of `structure` with the configured rules.
///
/// With [`sanitize`](TyperConfig::sanitize) set, the catalogue is analyzed
/// first and its rule-graph findings lead the returned diagnostics.
///
/// # Errors
///
/// Returns an [`Error`] if the force field is unknown, the custom rules fail
/// to parse, an artifact cannot be written, or typing itself fails.
pub fn find_atomtypes(structure: &mut Structure, config: &TyperConfig) -> Result<TypingReport, Error> {
    let (catalogue, predicates) = load_catalogue(&config.forcefield, config.rules.as_deref())?;

    let mut findings = Diagnostics::new();
    if config.sanitize {
        let options = AnalysisOptions {
            artifact_dir: config.artifact_dir.clone(),
        };
        findings = analyze(&catalogue, &options)?.diagnostics;
        // Guard problems are reported again by the registry.
        findings.retain(|d| matches!(d, Diagnostic::RuleGraph(_)));
    }

    let mut session = TypingSession::new(catalogue, predicates).with_max_rounds(config.max_rounds);
    let mut report = session.run(structure)?;

    findings.extend(report.diagnostics);
    report.diagnostics = findings;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Planar C6H6 with carbons first.
    fn benzene() -> Structure {
        let mut s = Structure::new();
        for _ in 0..6 {
            s.add_atom("C");
        }
        for i in 0..6 {
            s.add_bond(i, (i + 1) % 6);
            let h = s.add_atom("H");
            s.add_bond(i, h);
        }
        s
    }

    fn ethylene() -> Structure {
        let mut s = Structure::new();
        let c0 = s.add_atom("C");
        let c1 = s.add_atom("C");
        s.add_bond(c0, c1);
        for c in [c0, c1] {
            for _ in 0..2 {
                let h = s.add_atom("H");
                s.add_bond(c, h);
            }
        }
        s
    }

    fn methyl_cation_fragment() -> Structure {
        let mut s = Structure::new();
        let c = s.add_atom("C");
        for _ in 0..3 {
            let h = s.add_atom("H");
            s.add_bond(c, h);
        }
        let port = s.add_port();
        s.add_bond(c, port);
        s
    }

    fn types(s: &Structure) -> Vec<Option<&str>> {
        s.atoms
            .iter()
            .map(|a| a.resolved_type().map(RuleId::as_str))
            .collect()
    }

    #[test]
    fn types_benzene_with_builtin_rules() {
        let mut s = benzene();
        let report = find_atomtypes(&mut s, &TyperConfig::default()).unwrap();

        assert!(report.converged);
        assert!(report.is_complete());
        assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
        let t = types(&s);
        assert!(t[..6].iter().all(|t| *t == Some("145")));
        assert!(t[6..].iter().all(|t| *t == Some("146")));
    }

    #[test]
    fn types_ethylene_with_builtin_rules() {
        let mut s = ethylene();
        let report = find_atomtypes(&mut s, &TyperConfig::default()).unwrap();

        assert!(report.is_complete());
        let t = types(&s);
        assert_eq!(&t[..2], &[Some("143"), Some("143")]);
        assert!(t[2..].iter().all(|t| *t == Some("144")));
    }

    #[test]
    fn port_bonded_carbon_sees_only_real_neighbors() {
        let mut s = methyl_cation_fragment();
        let report = find_atomtypes(&mut s, &TyperConfig::default()).unwrap();

        // The port is not a neighbor, so the carbon looks like a CH3 radical
        // that no built-in rule describes.
        assert_eq!(report.typed_atoms, 4);
        assert!(matches!(
            report.diagnostics.for_atom(0).next(),
            Some(Diagnostic::Untyped { .. })
        ));
        assert!(s.atoms[4].atomtype.is_none());
        assert_eq!(types(&s)[1..4], [Some("140"); 3]);
    }

    #[test]
    fn custom_rules_and_sanitize_findings_are_combined() {
        let rules = r#"
name = "clash"

[[rules]]
id = 1
guards = [{ element = "C" }, { neighbor_count = 0 }]
whitelist = [1]

[[rules]]
id = 2
guards = [{ element = "C" }, { neighbor_count = 0 }]
whitelist = [2]
"#;
        let config = TyperConfig {
            rules: Some(rules.to_string()),
            ..Default::default()
        };
        let mut s = Structure::new();
        s.add_atom("C");
        let report = find_atomtypes(&mut s, &config).unwrap();

        let kinds: Vec<_> = report
            .diagnostics
            .iter()
            .map(|d| match d {
                Diagnostic::RuleGraph(f) => f.issue.tag(),
                Diagnostic::Ambiguous { .. } => "ambiguous",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["unconnected", "multiple_sinks", "ambiguous"]);
    }

    #[test]
    fn sanitize_can_be_disabled() {
        let rules = "[[rules]]\nid = 1\nguards = [{ element = \"C\" }, { neighbor_count = 0 }]\nwhitelist = [1]\n[[rules]]\nid = 2\nguards = [{ element = \"C\" }, { neighbor_count = 0 }]\nwhitelist = [2]\n";
        let config = TyperConfig {
            rules: Some(rules.to_string()),
            sanitize: false,
            ..Default::default()
        };
        let mut s = Structure::new();
        s.add_atom("C");
        let report = find_atomtypes(&mut s, &config).unwrap();
        assert_eq!(report.diagnostics.len(), 1);
    }

    #[test]
    fn unknown_forcefield_is_rejected() {
        let config = TyperConfig {
            forcefield: "UFF".to_string(),
            ..Default::default()
        };
        let mut s = benzene();
        assert!(matches!(
            find_atomtypes(&mut s, &config),
            Err(Error::UnsupportedForceField(_))
        ));
    }
}
