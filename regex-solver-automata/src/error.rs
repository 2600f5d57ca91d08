use core::fmt;

/// A resource ceiling enforced while building automata.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Limit {
    /// States and edges allocated by Thompson construction.
    NfaStates,
    /// The number of DFA states materialized by subset construction.
    DfaStates,
    /// The number of (subset, alphabet range) transitions processed.
    Transitions,
}

impl Limit {
    /// A stable, machine-readable name for this limit.
    pub fn name(&self) -> &'static str {
        match *self {
            Limit::NfaStates => "nfa_states",
            Limit::DfaStates => "dfa_states",
            Limit::Transitions => "transitions",
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Structured detail attached to a [`ComplexityError`] caused by a resource
/// ceiling, so callers can decide whether to retry with relaxed limits.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Diagnostic {
    pub limit: Limit,
    pub observed: usize,
    pub configured: usize,
}

/// An error raised when a pattern cannot be represented exactly as a finite
/// automaton within the configured limits.
///
/// This covers constructs outside the supported regular subset, exceeded
/// resource ceilings and anchors placed where unanchored matching cannot
/// model them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ComplexityError {
    message: String,
    position: Option<usize>,
    pattern: Option<String>,
    diagnostic: Option<Diagnostic>,
}

impl ComplexityError {
    pub fn new<S: Into<String>>(message: S) -> ComplexityError {
        ComplexityError {
            message: message.into(),
            position: None,
            pattern: None,
            diagnostic: None,
        }
    }

    /// An error for a resource ceiling that was exceeded.
    pub fn limit_exceeded(
        limit: Limit,
        observed: usize,
        configured: usize,
    ) -> ComplexityError {
        let mut err = ComplexityError::new(format!(
            "{} limit exceeded: {} > {}",
            limit, observed, configured
        ));
        err.diagnostic = Some(Diagnostic { limit, observed, configured });
        err
    }

    /// Attach the byte offset into the pattern at which the problem lies.
    pub fn with_position(mut self, position: usize) -> ComplexityError {
        self.position = Some(position);
        self
    }

    /// Attach the pattern text, unless one is already attached.
    pub fn with_pattern(mut self, pattern: &str) -> ComplexityError {
        if self.pattern.is_none() {
            self.pattern = Some(pattern.to_string());
        }
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The byte offset into the pattern, if known.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    /// Present when the error was caused by a resource ceiling.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        self.diagnostic.as_ref()
    }

    /// Render the error with the pattern and a caret under the offending
    /// position, when both are known.
    ///
    /// ```text
    /// a(?=b)
    ///  ^
    /// lookaround assertions are not supported
    /// ```
    pub fn render(&self) -> String {
        match (self.pattern.as_deref(), self.position) {
            (Some(pattern), Some(position)) => {
                let column = pattern
                    .get(..position)
                    .map_or(position, |prefix| prefix.chars().count());
                format!(
                    "{}\n{}^\n{}",
                    pattern,
                    " ".repeat(column),
                    self.message
                )
            }
            (Some(pattern), None) => format!("{}\n{}", pattern, self.message),
            _ => self.message.clone(),
        }
    }
}

impl std::error::Error for ComplexityError {}

impl fmt::Display for ComplexityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(position) = self.position {
            write!(f, " at offset {}", position)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_places_caret_by_character() {
        let err = ComplexityError::new("nope")
            .with_position(3)
            .with_pattern("éa(");
        assert_eq!(err.render(), "éa(\n  ^\nnope");
    }

    #[test]
    fn with_pattern_keeps_first() {
        let err = ComplexityError::new("x").with_pattern("a").with_pattern("b");
        assert_eq!(err.pattern(), Some("a"));
    }

    #[test]
    fn limit_diagnostic() {
        let err = ComplexityError::limit_exceeded(Limit::DfaStates, 11, 10);
        let diag = err.diagnostic().unwrap();
        assert_eq!(diag.limit, Limit::DfaStates);
        assert_eq!((diag.observed, diag.configured), (11, 10));
        assert_eq!(err.to_string(), "dfa_states limit exceeded: 11 > 10");
    }
}
