//! Discovery of the ordered, named parameter slots of an implementation.

mod extractor;
mod scanner;

pub use extractor::*;
pub use scanner::*;

use std::borrow::Cow;

/// The lexical conventions used to read signatures.
///
/// The declaration keyword starts the textual form of a constructor, and the
/// dependency sigil marks a parameter name as "resolve this type" rather than
/// "look up this literal value".
///
/// ```
/// use runtime_locator::Syntax;
///
/// let syntax = Syntax::default();
/// assert_eq!(Some("logger"), syntax.dependency_name("§logger"));
/// assert_eq!(None, syntax.dependency_name("level"));
/// assert_eq!(None, syntax.dependency_name("§"));
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Syntax {
    keyword: Cow<'static, str>,
    sigil: char,
}

impl Syntax {
    /// The keyword used by [`Syntax::default()`].
    pub const DEFAULT_KEYWORD: &'static str = "function";

    /// The sigil used by [`Syntax::default()`].
    pub const DEFAULT_SIGIL: char = '§';

    /// Creates a new syntax. The sigil should not be a word character,
    /// otherwise ordinary parameter names could be mistaken for dependencies.
    #[must_use]
    pub fn new(keyword: impl Into<Cow<'static, str>>, sigil: char) -> Self {
        Syntax {
            keyword: keyword.into(),
            sigil,
        }
    }

    /// The declaration keyword.
    #[must_use]
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// The dependency sigil.
    #[must_use]
    pub fn sigil(&self) -> char {
        self.sigil
    }

    /// Whether `c` can be part of a parameter name.
    #[must_use]
    pub fn is_identifier_char(&self, c: char) -> bool {
        c == self.sigil || is_word_char(c)
    }

    /// If `parameter` denotes a dependency, gets the type name it refers to.
    /// A dependency is the sigil followed by at least one identifier
    /// character. Everything after the sigil is the type name.
    #[must_use]
    pub fn dependency_name<'a>(&self, parameter: &'a str) -> Option<&'a str> {
        parameter.strip_prefix(self.sigil).filter(|rest| {
            rest.chars()
                .next()
                .map_or(false, |c| self.is_identifier_char(c))
        })
    }
}

impl Default for Syntax {
    fn default() -> Self {
        Syntax::new(Self::DEFAULT_KEYWORD, Self::DEFAULT_SIGIL)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// How an implementation declares its parameters.
///
/// An explicit list of names is always preferred. Source text is read with
/// [`parameter_names`] when the implementation is registered and is only as
/// reliable as that scan.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Signature {
    /// An explicit, ordered list of parameter names.
    Parameters(Vec<String>),
    /// The textual form of a constructor, e.g. `function (§db, retries) {}`.
    Source(Cow<'static, str>),
}

impl Signature {
    /// Creates a signature from an explicit list of parameter names.
    pub fn parameters<I>(names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Signature::Parameters(names.into_iter().map(Into::into).collect())
    }

    /// Creates a signature which will be scanned from source text.
    pub fn source(text: impl Into<Cow<'static, str>>) -> Self {
        Signature::Source(text.into())
    }

    /// A signature without parameters.
    #[must_use]
    pub fn empty() -> Self {
        Signature::Parameters(Vec::new())
    }

    /// Gets the ordered parameter names of this signature.
    #[must_use]
    pub fn parameter_names(&self, syntax: &Syntax) -> Vec<String> {
        match self {
            Signature::Parameters(names) => names.clone(),
            Signature::Source(text) => parameter_names(text, syntax),
        }
    }
}

impl Default for Signature {
    fn default() -> Self {
        Signature::empty()
    }
}
