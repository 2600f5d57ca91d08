use core::fmt;

use regex_solver_automata::ComplexityError;

/// An error that occurred while compiling a pattern for the solver.
///
/// Either the pattern is not valid syntax at all, or it is valid but cannot
/// be represented exactly as a finite automaton within the configured
/// limits.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// The pattern failed to parse. The parser's error is passed through
    /// unchanged.
    Parse(regex_solver_syntax::Error),
    /// The pattern uses a construct outside the regular subset, or compiling
    /// it crossed a resource ceiling.
    Complexity(ComplexityError),
}

impl Error {
    /// Returns the complexity error, if this is one.
    pub fn complexity(&self) -> Option<&ComplexityError> {
        match *self {
            Error::Complexity(ref err) => Some(err),
            Error::Parse(_) => None,
        }
    }

    /// Returns the parse error, if this is one.
    pub fn parse(&self) -> Option<&regex_solver_syntax::Error> {
        match *self {
            Error::Parse(ref err) => Some(err),
            Error::Complexity(_) => None,
        }
    }
}

impl From<regex_solver_syntax::Error> for Error {
    fn from(err: regex_solver_syntax::Error) -> Error {
        Error::Parse(err)
    }
}

impl From<ComplexityError> for Error {
    fn from(err: ComplexityError) -> Error {
        Error::Complexity(err)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::Parse(ref err) => Some(err),
            Error::Complexity(ref err) => Some(err),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::Parse(ref err) => err.fmt(f),
            Error::Complexity(ref err) => err.fmt(f),
        }
    }
}
