//! Declarative rule records.
//!
//! A [`Rule`] is plain data: an identifier, an ordered list of [`Guard`]
//! descriptors that are AND-ed together, and an ordered list of [`Effect`]s
//! that fire when every guard holds. Static analysis reads the descriptors
//! directly; evaluation lives in [`guard`](super::guard).

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Deserializer};

/// Identifier of a rule, which is also the atom type it assigns.
///
/// Integer and string spellings normalize to the same identifier, so
/// `RuleId::from(135)` equals `RuleId::from("135")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(String);

impl RuleId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RuleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RuleId {
    fn from(s: &str) -> Self {
        Self(s.trim().to_string())
    }
}

impl From<String> for RuleId {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<&RuleId> for RuleId {
    fn from(id: &RuleId) -> Self {
        id.clone()
    }
}

macro_rules! rule_id_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for RuleId {
            fn from(n: $t) -> Self {
                Self(n.to_string())
            }
        })*
    };
}

rule_id_from_int!(u16, u32, u64, usize, i32, i64);

impl<'de> Deserialize<'de> for RuleId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Int(i64),
            Str(String),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Int(n) => RuleId::from(n),
            Repr::Str(s) => RuleId::from(s),
        })
    }
}

/// Comparison applied by count-based guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountOp {
    Exactly,
    AtLeast,
    AtMost,
}

impl CountOp {
    #[inline]
    pub fn holds(self, actual: usize, expected: usize) -> bool {
        match self {
            CountOp::Exactly => actual == expected,
            CountOp::AtLeast => actual >= expected,
            CountOp::AtMost => actual <= expected,
        }
    }
}

impl fmt::Display for CountOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountOp::Exactly => write!(f, "=="),
            CountOp::AtLeast => write!(f, ">="),
            CountOp::AtMost => write!(f, "<="),
        }
    }
}

/// A single condition of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Guard {
    /// Atom kind equals the element symbol.
    Element(String),
    /// Number of bonded neighbors equals the count.
    NeighborCount(usize),
    /// Number of neighbors of `kind` compares against `count`.
    Neighbors {
        kind: String,
        op: CountOp,
        count: usize,
    },
    /// The atom itself was whitelisted for any of the rules.
    Whitelisted(Vec<RuleId>),
    /// Number of neighbors whitelisted for any of `rules` compares against `count`.
    NeighborsWhitelisted {
        rules: Vec<RuleId>,
        op: CountOp,
        count: usize,
    },
    /// A named predicate supplied by the caller.
    Predicate(String),
}

impl Guard {
    pub fn kind(&self) -> GuardKind {
        match self {
            Guard::Element(_) => GuardKind::Element,
            Guard::NeighborCount(_) => GuardKind::NeighborCount,
            Guard::Neighbors { .. } => GuardKind::Neighbors,
            Guard::Whitelisted(_) => GuardKind::Whitelisted,
            Guard::NeighborsWhitelisted { .. } => GuardKind::NeighborsWhitelisted,
            Guard::Predicate(_) => GuardKind::Predicate,
        }
    }

    fn referenced_ids(&self) -> &[RuleId] {
        match self {
            Guard::Whitelisted(rules) | Guard::NeighborsWhitelisted { rules, .. } => rules,
            _ => &[],
        }
    }
}

/// Discriminant of a [`Guard`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardKind {
    Element,
    NeighborCount,
    Neighbors,
    Whitelisted,
    NeighborsWhitelisted,
    Predicate,
}

impl GuardKind {
    /// Whether a rule may carry at most one guard of this kind.
    pub fn is_single_valued(self) -> bool {
        matches!(self, GuardKind::Element | GuardKind::NeighborCount)
    }
}

impl fmt::Display for GuardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GuardKind::Element => "element",
            GuardKind::NeighborCount => "neighbor count",
            GuardKind::Neighbors => "neighbor composition",
            GuardKind::Whitelisted => "whitelisted",
            GuardKind::NeighborsWhitelisted => "neighbors whitelisted",
            GuardKind::Predicate => "predicate",
        };
        f.write_str(name)
    }
}

/// What a rule does to an atom once all of its guards hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Whitelist(Vec<RuleId>),
    Blacklist(Vec<RuleId>),
}

impl Effect {
    pub fn whitelist<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RuleId>,
    {
        Effect::Whitelist(normalize(ids))
    }

    pub fn blacklist<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RuleId>,
    {
        Effect::Blacklist(normalize(ids))
    }

    pub fn ids(&self) -> &[RuleId] {
        match self {
            Effect::Whitelist(ids) | Effect::Blacklist(ids) => ids,
        }
    }
}

fn normalize<I, T>(ids: I) -> Vec<RuleId>
where
    I: IntoIterator<Item = T>,
    T: Into<RuleId>,
{
    let mut ids: Vec<RuleId> = ids.into_iter().map(Into::into).collect();
    ids.sort();
    ids.dedup();
    ids
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub id: RuleId,
    pub guards: Vec<Guard>,
    pub effects: Vec<Effect>,
}

impl Rule {
    pub fn new(id: impl Into<RuleId>, guards: Vec<Guard>, effects: Vec<Effect>) -> Self {
        Self {
            id: id.into(),
            guards,
            effects,
        }
    }

    pub fn builder(id: impl Into<RuleId>) -> RuleBuilder {
        RuleBuilder {
            rule: Rule::new(id, Vec::new(), Vec::new()),
        }
    }

    /// The first element guard, if any.
    pub fn element(&self) -> Option<&str> {
        self.guards.iter().find_map(|g| match g {
            Guard::Element(symbol) => Some(symbol.as_str()),
            _ => None,
        })
    }

    /// The first neighbor-count guard, if any.
    pub fn neighbor_count(&self) -> Option<usize> {
        self.guards.iter().find_map(|g| match g {
            Guard::NeighborCount(n) => Some(*n),
            _ => None,
        })
    }

    /// Neighbor-composition guards as `(kind, op, count)` triples.
    pub fn composition(&self) -> impl Iterator<Item = (&str, CountOp, usize)> + '_ {
        self.guards.iter().filter_map(|g| match g {
            Guard::Neighbors { kind, op, count } => Some((kind.as_str(), *op, *count)),
            _ => None,
        })
    }

    pub fn whitelist_ids(&self) -> impl Iterator<Item = &RuleId> + '_ {
        self.effects.iter().flat_map(|e| match e {
            Effect::Whitelist(ids) => ids.as_slice(),
            Effect::Blacklist(_) => &[],
        })
    }

    pub fn blacklist_ids(&self) -> impl Iterator<Item = &RuleId> + '_ {
        self.effects.iter().flat_map(|e| match e {
            Effect::Blacklist(ids) => ids.as_slice(),
            Effect::Whitelist(_) => &[],
        })
    }

    /// Every rule identifier named by a guard or an effect.
    pub fn referenced_ids(&self) -> impl Iterator<Item = &RuleId> + '_ {
        self.guards
            .iter()
            .flat_map(Guard::referenced_ids)
            .chain(self.effects.iter().flat_map(Effect::ids))
    }

    /// Single-valued guard kinds that appear more than once on this rule.
    pub fn duplicate_guards(&self) -> Vec<GuardKind> {
        let mut duplicates = Vec::new();
        for kind in [GuardKind::Element, GuardKind::NeighborCount] {
            if self.guards.iter().filter(|g| g.kind() == kind).count() > 1 {
                duplicates.push(kind);
            }
        }
        duplicates
    }
}

/// Fluent construction of a [`Rule`] in code.
///
/// ```
/// use atom_typer::Rule;
///
/// let rule = Rule::builder(140)
///     .element("H")
///     .neighbor_count(1)
///     .neighbors_exactly("C", 1)
///     .whitelist([140])
///     .build();
///
/// assert_eq!(rule.element(), Some("H"));
/// assert_eq!(rule.neighbor_count(), Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    rule: Rule,
}

impl RuleBuilder {
    pub fn guard(mut self, guard: Guard) -> Self {
        self.rule.guards.push(guard);
        self
    }

    pub fn element(self, symbol: impl Into<String>) -> Self {
        self.guard(Guard::Element(symbol.into()))
    }

    pub fn neighbor_count(self, count: usize) -> Self {
        self.guard(Guard::NeighborCount(count))
    }

    pub fn neighbors(self, kind: impl Into<String>, op: CountOp, count: usize) -> Self {
        self.guard(Guard::Neighbors {
            kind: kind.into(),
            op,
            count,
        })
    }

    pub fn neighbors_exactly(self, kind: impl Into<String>, count: usize) -> Self {
        self.neighbors(kind, CountOp::Exactly, count)
    }

    pub fn neighbors_at_least(self, kind: impl Into<String>, count: usize) -> Self {
        self.neighbors(kind, CountOp::AtLeast, count)
    }

    pub fn neighbors_at_most(self, kind: impl Into<String>, count: usize) -> Self {
        self.neighbors(kind, CountOp::AtMost, count)
    }

    pub fn whitelisted<I, T>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RuleId>,
    {
        self.guard(Guard::Whitelisted(normalize(ids)))
    }

    pub fn neighbors_whitelisted<I, T>(self, ids: I, op: CountOp, count: usize) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RuleId>,
    {
        self.guard(Guard::NeighborsWhitelisted {
            rules: normalize(ids),
            op,
            count,
        })
    }

    pub fn predicate(self, name: impl Into<String>) -> Self {
        self.guard(Guard::Predicate(name.into()))
    }

    pub fn whitelist<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RuleId>,
    {
        self.rule.effects.push(Effect::whitelist(ids));
        self
    }

    pub fn blacklist<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RuleId>,
    {
        self.rule.effects.push(Effect::blacklist(ids));
        self
    }

    pub fn build(self) -> Rule {
        self.rule
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_and_string_ids_normalize_to_same_value() {
        assert_eq!(RuleId::from(135), RuleId::from("135"));
        assert_eq!(RuleId::from(" 135 "), RuleId::from("135"));
    }

    #[test]
    fn effect_ids_are_sorted_and_deduplicated() {
        let effect = Effect::blacklist(["146", "140", "146"]);
        assert_eq!(effect.ids(), &[RuleId::from(140), RuleId::from(146)]);
    }

    #[test]
    fn count_op_comparisons() {
        assert!(CountOp::Exactly.holds(2, 2));
        assert!(!CountOp::Exactly.holds(1, 2));
        assert!(CountOp::AtLeast.holds(3, 2));
        assert!(!CountOp::AtLeast.holds(1, 2));
        assert!(CountOp::AtMost.holds(0, 2));
        assert!(!CountOp::AtMost.holds(3, 2));
    }

    #[test]
    fn builder_records_guards_in_order() {
        let rule = Rule::builder("145")
            .element("C")
            .neighbor_count(3)
            .neighbors_at_least("C", 2)
            .whitelist([145])
            .blacklist([143, 141])
            .build();

        assert_eq!(rule.element(), Some("C"));
        assert_eq!(rule.neighbor_count(), Some(3));
        assert_eq!(
            rule.composition().collect::<Vec<_>>(),
            vec![("C", CountOp::AtLeast, 2)]
        );
        assert_eq!(
            rule.blacklist_ids().cloned().collect::<Vec<_>>(),
            vec![RuleId::from(141), RuleId::from(143)]
        );
        assert_eq!(rule.whitelist_ids().count(), 1);
    }

    #[test]
    fn detects_duplicate_single_valued_guards() {
        let rule = Rule::builder("1")
            .element("C")
            .element("H")
            .neighbor_count(1)
            .neighbors_exactly("C", 1)
            .neighbors_at_most("H", 2)
            .build();

        assert_eq!(rule.duplicate_guards(), vec![GuardKind::Element]);
    }

    #[test]
    fn referenced_ids_cover_guards_and_effects() {
        let rule = Rule::builder("146")
            .element("H")
            .neighbors_whitelisted([145], CountOp::AtLeast, 1)
            .whitelist([146])
            .blacklist([140])
            .build();

        let ids: Vec<&str> = rule.referenced_ids().map(RuleId::as_str).collect();
        assert_eq!(ids, vec!["145", "146", "140"]);
    }
}
