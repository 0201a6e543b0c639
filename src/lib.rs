//! A rule-based atom typing engine for classical force fields.
//! It assigns force-field atom types to the atoms of a bonded structure from declarative
//! rules, and statically checks rule catalogues for conflicts before they cause mistyping.
//!
//! # Features
//!
//! - **Declarative rules** — Guards on element, neighbor count, neighbor composition,
//!   previously assigned types and named predicates; effects that whitelist or blacklist types
//! - **Fixed-point propagation** — Rules are re-applied until no atom's eligibility changes,
//!   so rules may depend on the types of neighboring atoms
//! - **Consistency analysis** — Per-(element, neighbor pattern) rule-interaction graphs
//!   checked for disconnected, cyclic and multi-sink configurations, with Graphviz output
//! - **Rule catalogues in TOML** — A built-in OPLS-AA subset, or any custom catalogue
//!
//! # Quick Start
//!
//! The main entry point is the [`find_atomtypes`] function, which takes a [`Structure`] and
//! a [`TyperConfig`] and writes an [`AtomTypeAssignment`] onto every atom:
//!
//! ```
//! use atom_typer::{Structure, TyperConfig, TyperError, find_atomtypes};
//!
//! // Ethane (C₂H₆)
//! let mut structure = Structure::new();
//! let c1 = structure.add_atom("C");
//! let c2 = structure.add_atom("C");
//! structure.add_bond(c1, c2);
//! for carbon in [c1, c2] {
//!     for _ in 0..3 {
//!         let h = structure.add_atom("H");
//!         structure.add_bond(carbon, h);
//!     }
//! }
//!
//! // Built-in OPLS-AA rules, with the catalogue analyzed first
//! let report = find_atomtypes(&mut structure, &TyperConfig::default())?;
//!
//! assert!(report.converged);
//! assert!(report.diagnostics.is_empty());
//!
//! // opls_135: CH3 carbon, opls_140: alkane hydrogen
//! assert_eq!(structure.atoms[c1].resolved_type().unwrap().as_str(), "135");
//! assert_eq!(structure.atoms[2].resolved_type().unwrap().as_str(), "140");
//! # Ok::<(), TyperError>(())
//! ```
//!
//! # Module Organization
//!
//! - [`find_atomtypes`] — Load rules, analyze them and type a structure in one call
//! - [`TypingSession`] — Reusable engine owning a rule registry and predicates
//! - [`analyze`] — Static rule-consistency analysis
//!
//! # Data Types
//!
//! ## Input Structures
//!
//! - [`Structure`] — Atoms and unordered bonds
//! - [`Atom`] — Element or connection port, plus its typing result
//! - [`Bond`] — Bond between two atoms
//!
//! ## Rules
//!
//! - [`Rule`] / [`RuleBuilder`] — Identifier, guards and effects
//! - [`Guard`] / [`Effect`] — Declarative conditions and actions
//! - [`RuleCatalogue`] — Ordered, uniquely identified rules of one force field
//! - [`PredicateSet`] — Named custom checks referenced from rules
//!
//! ## Results
//!
//! - [`AtomTypeAssignment`] — A resolved type, or the remaining candidates
//! - [`TypingReport`] — Rounds, convergence and [`Diagnostics`]
//! - [`AnalysisReport`] — Rule-graph [`GroupFinding`]s

mod model;
mod typer;

pub use model::atom::{Atom, AtomKind, AtomTypeAssignment};
pub use model::structure::{Bond, Structure};

pub use typer::{
    AnalysisOptions, AnalysisReport, AtomContext, Candidates, CountOp, DEFAULT_MAX_ROUNDS,
    Diagnostic, Diagnostics, Effect, Eligibility, EligibilityStore, ForceField, GraphIssue,
    GroupFinding, Guard, GuardKind, NeighborTally, Predicate, PredicateSet, Rule, RuleBuilder,
    RuleCatalogue, RuleId, RuleRegistry, TallyCache, TyperConfig, TypingReport, TypingSession,
    analyze, find_atomtypes, load_catalogue,
};

pub use typer::Error as TyperError;
