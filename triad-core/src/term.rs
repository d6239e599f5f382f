//! Term model: resources, variables, triples and triple patterns.
//!
//! All composite types are generic over the resource representation `R`,
//! which is either [`Resource`] (decoded strings) or [`Code`] (dictionary
//! codes). Pattern utilities and the query engine work uniformly over both
//! forms; only the store and join layers fix `R = Code`.

use std::fmt;
use std::sync::Arc;

/// A decoded RDF resource.
///
/// The payload is `Arc<str>` so clones are cheap and the dictionary's
/// forward and reverse structures can share one allocation per string.
///
/// The derived total order is by tag (literals before IRIs) then by string.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Resource {
    /// An opaque literal value, written `"..."`.
    Literal(Arc<str>),
    /// An opaque resource identifier, written `<...>`.
    Iri(Arc<str>),
}

impl Resource {
    pub fn literal(s: impl AsRef<str>) -> Self {
        Resource::Literal(Arc::from(s.as_ref()))
    }

    pub fn iri(s: impl AsRef<str>) -> Self {
        Resource::Iri(Arc::from(s.as_ref()))
    }

    /// The payload string, without delimiters.
    pub fn as_str(&self) -> &str {
        match self {
            Resource::Literal(s) | Resource::Iri(s) => s,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Literal(s) => write!(f, "\"{s}\""),
            Resource::Iri(s) => write!(f, "<{s}>"),
        }
    }
}

/// A query variable, ordered by name. The stored name excludes the
/// leading `?`; `Display` adds it back.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable(Arc<str>);

impl Variable {
    pub fn new(name: impl AsRef<str>) -> Self {
        Variable(Arc::from(name.as_ref()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.0)
    }
}

/// A dictionary-assigned dense resource code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Code(pub u64);

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A term in a triple pattern: a variable or a bound resource.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Term<R = Resource> {
    Var(Variable),
    Res(R),
}

impl<R> Term<R> {
    pub fn is_var(&self) -> bool {
        matches!(self, Term::Var(_))
    }

    /// Check if this term is bound (not a variable).
    pub fn is_bound(&self) -> bool {
        !self.is_var()
    }

    pub fn as_var(&self) -> Option<&Variable> {
        match self {
            Term::Var(v) => Some(v),
            Term::Res(_) => None,
        }
    }

    pub fn as_res(&self) -> Option<&R> {
        match self {
            Term::Res(r) => Some(r),
            Term::Var(_) => None,
        }
    }
}

impl<R: fmt::Display> fmt::Display for Term<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Var(v) => v.fmt(f),
            Term::Res(r) => r.fmt(f),
        }
    }
}

/// An asserted triple: three resources.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Triple<R = Resource> {
    pub s: R,
    pub p: R,
    pub o: R,
}

impl<R> Triple<R> {
    pub fn new(s: R, p: R, o: R) -> Self {
        Triple { s, p, o }
    }
}

impl<R: fmt::Display> fmt::Display for Triple<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.s, self.p, self.o)
    }
}

/// A triple pattern: three terms, each a variable or a resource.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TriplePattern<R = Resource> {
    pub s: Term<R>,
    pub p: Term<R>,
    pub o: Term<R>,
}

impl<R> TriplePattern<R> {
    pub fn new(s: Term<R>, p: Term<R>, o: Term<R>) -> Self {
        TriplePattern { s, p, o }
    }

    /// Which positions are bound: the pattern's [`Shape`].
    pub fn shape(&self) -> Shape {
        match (self.s.is_bound(), self.p.is_bound(), self.o.is_bound()) {
            (true, true, true) => Shape::Spo,
            (true, true, false) => Shape::Spv,
            (true, false, true) => Shape::Svo,
            (true, false, false) => Shape::Svv,
            (false, true, true) => Shape::Vpo,
            (false, true, false) => Shape::Vpv,
            (false, false, true) => Shape::Vvo,
            (false, false, false) => Shape::Vvv,
        }
    }
}

impl<R: fmt::Display> fmt::Display for TriplePattern<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.s, self.p, self.o)
    }
}

/// A pattern shape. `S`/`P`/`O` mark bound positions, `V` variables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    Spo,
    Spv,
    Svo,
    Svv,
    Vpo,
    Vpv,
    Vvo,
    Vvv,
}

impl Shape {
    /// Selectivity score, lower is better. The ordering follows the
    /// Tsialiamanis et al. heuristic table.
    pub fn score(self) -> u8 {
        match self {
            Shape::Spo => 0,
            Shape::Svo => 1,
            Shape::Vpo => 2,
            Shape::Spv => 3,
            Shape::Vvo => 4,
            Shape::Svv => 5,
            Shape::Vpv => 6,
            Shape::Vvv => 7,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Shape::Spo => "SPO",
            Shape::Spv => "SPV",
            Shape::Svo => "SVO",
            Shape::Svv => "SVV",
            Shape::Vpo => "VPO",
            Shape::Vpv => "VPV",
            Shape::Vvo => "VVO",
            Shape::Vvv => "VVV",
        };
        f.write_str(s)
    }
}

/// An ordered mapping from variables to resources (or codes).
///
/// Key order makes merging linear and deterministic.
pub type VarMap<R = Resource> = std::collections::BTreeMap<Variable, R>;

/// Coded aliases. The engine runs entirely on these.
pub type CodedTriple = Triple<Code>;
pub type CodedTriplePattern = TriplePattern<Code>;
pub type CodedTerm = Term<Code>;
pub type CodedVarMap = VarMap<Code>;
