// src/multiplicity.rs
//
// Multiplicity algebra: cardinality ranges ([1], [0..1], [*], parametric)
// with concretization, equality, and least-upper-bound computation.
// These are pure functions over immutable values; every other component
// depends on this one.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::span::Span;

/// A cardinality constraint: either a concrete `[lower..upper]` range
/// (upper `None` = unbounded) or a reference to a multiplicity parameter.
#[derive(Debug, Clone)]
pub struct Multiplicity {
    pub kind: MultiplicityKind,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MultiplicityKind {
    Concrete { lower: u64, upper: Option<u64> },
    Parameter(String),
}

impl PartialEq for Multiplicity {
    fn eq(&self, other: &Self) -> bool {
        // The span is where the multiplicity was written, not what it means;
        // it is not part of equality.
        self.kind == other.kind
    }
}

impl Eq for Multiplicity {}

impl std::hash::Hash for Multiplicity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // Matches PartialEq: span deliberately not hashed
        self.kind.hash(state);
    }
}

impl Multiplicity {
    pub fn concrete(lower: u64, upper: Option<u64>) -> Self {
        Self {
            kind: MultiplicityKind::Concrete { lower, upper },
            span: None,
        }
    }

    pub fn parameter(name: impl Into<String>) -> Self {
        Self {
            kind: MultiplicityKind::Parameter(name.into()),
            span: None,
        }
    }

    /// `[1]`
    pub fn one() -> Self {
        Self::concrete(1, Some(1))
    }

    /// `[0..1]`
    pub fn zero_one() -> Self {
        Self::concrete(0, Some(1))
    }

    /// `[*]`
    pub fn zero_many() -> Self {
        Self::concrete(0, None)
    }

    /// `[1..*]`
    pub fn one_many() -> Self {
        Self::concrete(1, None)
    }

    pub fn with_span(mut self, span: Option<Span>) -> Self {
        self.span = span;
        self
    }

    pub fn is_concrete(&self) -> bool {
        matches!(self.kind, MultiplicityKind::Concrete { .. })
    }

    pub fn parameter_name(&self) -> Option<&str> {
        match &self.kind {
            MultiplicityKind::Parameter(name) => Some(name),
            MultiplicityKind::Concrete { .. } => None,
        }
    }

    /// Concrete bounds, or None for a parameter reference.
    pub fn bounds(&self) -> Option<(u64, Option<u64>)> {
        match self.kind {
            MultiplicityKind::Concrete { lower, upper } => Some((lower, upper)),
            MultiplicityKind::Parameter(_) => None,
        }
    }

    /// True if the upper bound is exactly 1. With `strict`, the lower bound
    /// must also be 1 (i.e. `[1]` rather than `[0..1]`).
    pub fn is_to_one(&self, strict: bool) -> bool {
        match self.kind {
            MultiplicityKind::Concrete { lower, upper } => {
                upper == Some(1) && (!strict || lower == 1)
            }
            MultiplicityKind::Parameter(_) => false,
        }
    }

    /// Replace a parameter reference with its binding, if present.
    /// Concrete multiplicities and unbound parameters pass through unchanged.
    pub fn substitute(&self, env: &FxHashMap<String, Multiplicity>) -> Multiplicity {
        match &self.kind {
            MultiplicityKind::Parameter(name) => {
                env.get(name).cloned().unwrap_or_else(|| self.clone())
            }
            MultiplicityKind::Concrete { .. } => self.clone(),
        }
    }

    /// Copy, optionally relocating the source position. `None` keeps the
    /// original span; `Some(span)` replaces it (possibly with nothing).
    pub fn copy(&self, relocate: Option<Option<Span>>) -> Multiplicity {
        Multiplicity {
            kind: self.kind.clone(),
            span: match relocate {
                Some(new_span) => new_span,
                None => self.span,
            },
        }
    }
}

/// Compare two multiplicities. Concrete ranges always compare by exact
/// bounds. Parameters compare by name when `strict`; otherwise any two
/// parameters are considered equal (but a parameter never equals a
/// concrete range).
pub fn multiplicities_equal(m1: &Multiplicity, m2: &Multiplicity, strict: bool) -> bool {
    match (&m1.kind, &m2.kind) {
        (MultiplicityKind::Concrete { .. }, MultiplicityKind::Concrete { .. }) => {
            m1.kind == m2.kind
        }
        (MultiplicityKind::Parameter(a), MultiplicityKind::Parameter(b)) => !strict || a == b,
        _ => false,
    }
}

/// Smallest multiplicity range covering all inputs: lower bound is the min
/// of the lower bounds, upper bound the max of the upper bounds, with
/// "unbounded" dominating any finite bound.
///
/// Returns None when any input is absent or still parametric — callers
/// probing speculative inference paths get "unresolved", not an error.
pub fn min_subsuming_multiplicity<'a, I>(mults: I) -> Option<Multiplicity>
where
    I: IntoIterator<Item = Option<&'a Multiplicity>>,
{
    let mut any = false;
    let mut lower = u64::MAX;
    let mut upper = Some(0u64);
    for m in mults {
        let (l, u) = m?.bounds()?;
        any = true;
        lower = lower.min(l);
        upper = match (upper, u) {
            (Some(a), Some(b)) => Some(a.max(b)),
            _ => None,
        };
    }
    if !any {
        return Some(Multiplicity::concrete(0, Some(0)));
    }
    Some(Multiplicity::concrete(lower, upper))
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            MultiplicityKind::Parameter(name) => write!(f, "{name}"),
            MultiplicityKind::Concrete { lower, upper } => match upper {
                None if *lower == 0 => write!(f, "*"),
                None => write!(f, "{lower}..*"),
                Some(u) if u == lower => write!(f, "{u}"),
                Some(u) => write!(f, "{lower}..{u}"),
            },
        }
    }
}
