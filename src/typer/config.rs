//! Configuration for [`find_atomtypes`](super::find_atomtypes).

use std::path::PathBuf;

use super::engine::DEFAULT_MAX_ROUNDS;

/// Settings of one atom typing invocation.
///
/// # Examples
///
/// ```
/// use atom_typer::TyperConfig;
///
/// // Built-in OPLS-AA rules, consistency analysis enabled
/// let default = TyperConfig::default();
/// assert_eq!(default.forcefield, "OPLS-AA");
///
/// // Custom rules, more rounds, no analysis
/// let custom = TyperConfig {
///     rules: Some("[[rules]]\nid = 1\n".to_string()),
///     max_rounds: 25,
///     sanitize: false,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct TyperConfig {
    /// Force field identifier, e.g. `"OPLS-AA"`.
    ///
    /// Selects the built-in catalogue and the named predicates available to
    /// rules.
    pub forcefield: String,

    /// Custom rule catalogue in TOML format.
    ///
    /// If `None`, uses the built-in catalogue of [`forcefield`](Self::forcefield).
    pub rules: Option<String>,

    /// Upper bound on propagation rounds before giving up on convergence.
    pub max_rounds: usize,

    /// Run the rule-consistency analyzer before typing.
    pub sanitize: bool,

    /// Directory for rule-interaction graph artifacts written by the analyzer.
    ///
    /// Only used when [`sanitize`](Self::sanitize) is set.
    pub artifact_dir: Option<PathBuf>,
}

impl Default for TyperConfig {
    fn default() -> Self {
        Self {
            forcefield: "OPLS-AA".to_string(),
            rules: None,
            max_rounds: DEFAULT_MAX_ROUNDS,
            sanitize: true,
            artifact_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = TyperConfig::default();
        assert_eq!(config.forcefield, "OPLS-AA");
        assert!(config.rules.is_none());
        assert_eq!(config.max_rounds, 10);
        assert!(config.sanitize);
        assert!(config.artifact_dir.is_none());
    }
}
