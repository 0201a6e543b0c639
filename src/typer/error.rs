//! Error types for rule-based atom typing.
//!
//! Only conditions that indicate a broken catalogue, an unusable structure or a
//! failed artifact write are errors. Everything a rule author or structure
//! builder may want to inspect after a run is a
//! [`Diagnostic`](super::Diagnostic) instead.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors raised while loading rules, typing or analyzing.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested force field has no built-in catalogue.
    #[error("unsupported force field '{0}'")]
    UnsupportedForceField(String),

    /// Failed to parse a rule catalogue TOML document.
    #[error("failed to parse rule catalogue: {0}")]
    RuleParse(#[from] toml::de::Error),

    /// Two rules in one catalogue share an identifier.
    #[error("duplicate rule identifier '{0}' in catalogue")]
    DuplicateRuleId(String),

    /// A whitelist, blacklist or guard names a rule that does not exist.
    ///
    /// Raised at the point the reference is evaluated, since it indicates a
    /// catalogue authoring bug rather than a property of the structure.
    #[error("rule '{referenced_by}' references rule '{rule}', which is not implemented")]
    RuleReference {
        /// The missing rule identifier.
        rule: String,
        /// The rule whose guard or effect holds the reference.
        referenced_by: String,
    },

    /// A guard names a predicate that was never registered with the session.
    #[error("rule '{rule}' uses unknown predicate '{predicate}'")]
    UnknownPredicate {
        /// Rule carrying the guard.
        rule: String,
        /// Predicate name.
        predicate: String,
    },

    /// Invalid bond definition in the input structure.
    #[error("invalid bond between atoms {i} and {j}: {detail}")]
    InvalidBond {
        /// First atom index.
        i: usize,
        /// Second atom index.
        j: usize,
        /// Description of the problem.
        detail: String,
    },

    /// Writing a rule-interaction graph artifact failed.
    #[error("failed to write rule graph artifact '{}': {source}", path.display())]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Creates a [`RuleReference`](Error::RuleReference) error.
    pub fn rule_reference(rule: impl Into<String>, referenced_by: impl Into<String>) -> Self {
        Self::RuleReference {
            rule: rule.into(),
            referenced_by: referenced_by.into(),
        }
    }

    /// Creates an [`UnknownPredicate`](Error::UnknownPredicate) error.
    pub fn unknown_predicate(rule: impl Into<String>, predicate: impl Into<String>) -> Self {
        Self::UnknownPredicate {
            rule: rule.into(),
            predicate: predicate.into(),
        }
    }

    /// Creates an [`InvalidBond`](Error::InvalidBond) error.
    ///
    /// # Arguments
    ///
    /// * `i` — First atom index
    /// * `j` — Second atom index
    /// * `details` — Description of the bond problem
    pub fn invalid_bond(i: usize, j: usize, details: impl Into<String>) -> Self {
        Self::InvalidBond {
            i,
            j,
            detail: details.into(),
        }
    }
}
