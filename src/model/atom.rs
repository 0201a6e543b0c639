use std::fmt;

use crate::typer::RuleId;

/// Coarse dispatch key of an atom.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AtomKind {
    /// A chemical element, identified by its symbol (e.g. `"C"`).
    Element(String),
    /// A structural connection point. Ports are never typed.
    Port,
}

impl AtomKind {
    /// Returns the element symbol, or `None` for ports.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            AtomKind::Element(symbol) => Some(symbol),
            AtomKind::Port => None,
        }
    }

    #[inline]
    pub fn is_port(&self) -> bool {
        matches!(self, AtomKind::Port)
    }
}

impl fmt::Display for AtomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtomKind::Element(symbol) => write!(f, "{}", symbol),
            AtomKind::Port => write!(f, "<port>"),
        }
    }
}

/// Outcome of typing for a single atom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtomTypeAssignment {
    /// Exactly one type survived `whitelist − blacklist`.
    Resolved(RuleId),
    /// Zero or several types survived; the remainder is kept for inspection.
    Unresolved(Vec<RuleId>),
}

impl AtomTypeAssignment {
    pub fn resolved(&self) -> Option<&RuleId> {
        match self {
            AtomTypeAssignment::Resolved(id) => Some(id),
            AtomTypeAssignment::Unresolved(_) => None,
        }
    }
}

impl fmt::Display for AtomTypeAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtomTypeAssignment::Resolved(id) => write!(f, "{}", id),
            AtomTypeAssignment::Unresolved(ids) => {
                let joined: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
                write!(f, "{}", joined.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub kind: AtomKind,
    pub atomtype: Option<AtomTypeAssignment>,
}

impl Atom {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            kind: AtomKind::Element(symbol.into()),
            atomtype: None,
        }
    }

    pub fn port() -> Self {
        Self {
            kind: AtomKind::Port,
            atomtype: None,
        }
    }

    #[inline]
    pub fn is_port(&self) -> bool {
        self.kind.is_port()
    }

    /// The resolved atom type, if typing produced exactly one candidate.
    pub fn resolved_type(&self) -> Option<&RuleId> {
        self.atomtype.as_ref().and_then(AtomTypeAssignment::resolved)
    }
}
