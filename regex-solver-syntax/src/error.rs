use core::fmt;

use crate::ast::Span;

/// An error that occurred while parsing a pattern.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    pattern: String,
    span: Span,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, pattern: &str, span: Span) -> Error {
        Error { kind, pattern: pattern.to_string(), span }
    }

    /// Return the type of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// The original pattern string in which this error occurred.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Return the span at which this error occurred.
    pub fn span(&self) -> &Span {
        &self.span
    }
}

/// The type of a parse error.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// A bracketed class was never closed.
    ClassUnclosed,
    /// A POSIX class inside a bracketed class was never closed.
    PosixClassUnclosed,
    /// A backslash appeared at the end of the pattern.
    EscapeUnexpectedEof,
    /// An escape sequence is not recognized.
    EscapeUnrecognized(char),
    /// A `\x{...}` or `\o{...}` escape is malformed or out of range.
    EscapeCodeInvalid,
    /// A `\p` escape is malformed.
    PropertyInvalid,
    /// A group name is missing or contains invalid characters.
    GroupNameInvalid,
    /// A group reference is malformed.
    GroupReferenceInvalid,
    /// An opening parenthesis was never closed.
    GroupUnclosed,
    /// A closing parenthesis has no matching opening parenthesis.
    GroupUnopened,
    /// An inline flag is not a letter.
    FlagUnrecognized(char),
    /// A `(*...)` construct was never closed.
    VerbUnclosed,
    /// A conditional group has a malformed condition.
    ConditionInvalid,
    /// A conditional group has more than two branches.
    ConditionBranchesTooMany,
    /// A quantifier has nothing to repeat.
    RepetitionMissing,
    /// A counted repetition has `min > max`.
    RepetitionRangeInvalid,
    /// A counted repetition bound does not fit in a `u32`.
    RepetitionCountOverflow,
    /// The nesting depth of the pattern exceeds the configured limit.
    NestLimitExceeded(u32),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "regex parse error at offset {}: {}",
            self.span.start, self.kind
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use self::ErrorKind::*;
        match *self {
            ClassUnclosed => write!(f, "unclosed character class"),
            PosixClassUnclosed => write!(f, "unclosed POSIX class"),
            EscapeUnexpectedEof => {
                write!(f, "incomplete escape sequence at end of pattern")
            }
            EscapeUnrecognized(c) => {
                write!(f, "unrecognized escape sequence '\\{}'", c)
            }
            EscapeCodeInvalid => write!(f, "invalid character code escape"),
            PropertyInvalid => write!(f, "invalid Unicode property escape"),
            GroupNameInvalid => write!(f, "invalid capture group name"),
            GroupReferenceInvalid => write!(f, "invalid group reference"),
            GroupUnclosed => write!(f, "unclosed group"),
            GroupUnopened => write!(f, "unopened group"),
            FlagUnrecognized(c) => write!(f, "unrecognized flag '{}'", c),
            VerbUnclosed => write!(f, "unclosed verb"),
            ConditionInvalid => write!(f, "invalid condition"),
            ConditionBranchesTooMany => {
                write!(f, "conditional group contains more than two branches")
            }
            RepetitionMissing => {
                write!(f, "repetition operator missing expression")
            }
            RepetitionRangeInvalid => write!(
                f,
                "invalid repetition range, the start must be <= the end"
            ),
            RepetitionCountOverflow => {
                write!(f, "repetition quantifier expects a valid decimal")
            }
            NestLimitExceeded(limit) => write!(
                f,
                "exceed the maximum number of nested groups ({})",
                limit
            ),
        }
    }
}
