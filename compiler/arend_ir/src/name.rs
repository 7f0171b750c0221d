//! Module paths and qualified names.

use std::fmt;

use smallvec::SmallVec;

/// Segments of a path; most names have one or two segments.
pub type Segments = SmallVec<[String; 2]>;

/// Ordered sequence of name segments identifying a module, e.g. `Data.Nat`.
///
/// Unique within a library and immutable once built.
#[derive(Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Default)]
pub struct ModulePath(Segments);

impl ModulePath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ModulePath(segments.into_iter().map(Into::into).collect())
    }

    /// Parse a dotted path such as `Data.Nat`. Empty segments are dropped.
    pub fn parse(dotted: &str) -> Self {
        ModulePath(
            dotted
                .split('.')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl fmt::Debug for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModulePath({self})")
    }
}

/// A possibly qualified reference as written in source: `x`, `Nat.suc`,
/// `Data.Nat.+`.
#[derive(Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Default)]
pub struct LongName(Segments);

impl LongName {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LongName(segments.into_iter().map(Into::into).collect())
    }

    /// A single-segment name.
    pub fn short(name: impl Into<String>) -> Self {
        let mut segments = Segments::new();
        segments.push(name.into());
        LongName(segments)
    }

    pub fn parse(dotted: &str) -> Self {
        LongName(
            dotted
                .split('.')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_qualified(&self) -> bool {
        self.0.len() > 1
    }

    /// Last segment, the name the entity is declared with.
    pub fn last(&self) -> &str {
        self.0.last().map_or("", String::as_str)
    }

    /// A new name with one more trailing segment.
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> LongName {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        LongName(segments)
    }
}

impl fmt::Display for LongName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl fmt::Debug for LongName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LongName({self})")
    }
}

/// Whether a name is written with symbol characters (`+`, `<=`, `::`).
///
/// Symbolic names sit in operator position inside a binary-operator
/// sequence; alphanumeric names only do when backquoted or declared infix.
pub fn is_symbolic(name: &str) -> bool {
    name.chars()
        .next()
        .is_some_and(|c| !(c.is_alphanumeric() || c == '_'))
}
