use crate::charset::MAX_CODE_POINT;

/// Whether a pattern must match a whole string or may match anywhere in it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum MatchMode {
    /// The pattern describes entire strings.
    #[default]
    Full,
    /// The pattern matches a substring unless anchored, as a search would.
    Partial,
}

/// How epsilon-closures are computed during subset construction.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Determinization {
    /// Compute every NFA state's closure once, up front.
    #[default]
    PrecomputedClosures,
    /// Walk epsilon edges afresh for every subset. Slower, but never holds
    /// one closure per NFA state in memory.
    OnDemandClosures,
}

/// The partition-refinement algorithm used to minimize DFAs.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Minimization {
    #[default]
    Hopcroft,
    Moore,
    /// Reverse, determinize, reverse, determinize.
    Brzozowski,
}

/// The flags a pattern may request.
const SUPPORTED_FLAGS: &[char] = &['i', 's', 'u'];

/// The configuration for compiling patterns and answering queries.
///
/// Every field participates in `Hash` and `Eq`, so two configurations that
/// could produce different automata never share a cache entry.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct SolverOptions {
    match_mode: MatchMode,
    max_nfa_states: usize,
    max_dfa_states: usize,
    max_transitions: Option<usize>,
    minimize: bool,
    determinization: Determinization,
    minimization: Minimization,
    flags: String,
}

impl Default for SolverOptions {
    fn default() -> SolverOptions {
        SolverOptions::new()
    }
}

impl SolverOptions {
    /// Return a new default configuration.
    pub fn new() -> SolverOptions {
        SolverOptions {
            match_mode: MatchMode::Full,
            max_nfa_states: 10_000,
            max_dfa_states: 10_000,
            max_transitions: Some(1_000_000),
            minimize: true,
            determinization: Determinization::PrecomputedClosures,
            minimization: Minimization::Hopcroft,
            flags: String::new(),
        }
    }

    pub fn match_mode(mut self, mode: MatchMode) -> SolverOptions {
        self.match_mode = mode;
        self
    }

    /// Set the ceiling on allocations during Thompson construction. Every
    /// NFA state, epsilon edge and guarded transition counts as one.
    pub fn max_nfa_states(mut self, limit: usize) -> SolverOptions {
        self.max_nfa_states = limit;
        self
    }

    /// Set the ceiling on DFA states materialized during determinization.
    pub fn max_dfa_states(mut self, limit: usize) -> SolverOptions {
        self.max_dfa_states = limit;
        self
    }

    /// Set the ceiling on transitions processed during determinization.
    /// `None` disables the ceiling.
    pub fn max_transitions(mut self, limit: Option<usize>) -> SolverOptions {
        self.max_transitions = limit;
        self
    }

    pub fn minimize(mut self, yes: bool) -> SolverOptions {
        self.minimize = yes;
        self
    }

    pub fn determinization(mut self, algo: Determinization) -> SolverOptions {
        self.determinization = algo;
        self
    }

    pub fn minimization(mut self, algo: Minimization) -> SolverOptions {
        self.minimization = algo;
        self
    }

    /// Request pattern flags, e.g. `"i"` or `"su"`.
    ///
    /// Only `i` (ASCII case-insensitive), `s` (dot matches newline) and `u`
    /// (Unicode code points) are supported. Anything else is rejected when
    /// a pattern is compiled. Order and repetition do not matter: `"ui"`,
    /// `"iu"` and `"iiu"` are the same configuration.
    pub fn flags(mut self, flags: &str) -> SolverOptions {
        let mut chars: Vec<char> = flags.chars().collect();
        chars.sort_unstable();
        chars.dedup();
        self.flags = chars.into_iter().collect();
        self
    }

    pub fn get_match_mode(&self) -> MatchMode {
        self.match_mode
    }

    pub fn get_max_nfa_states(&self) -> usize {
        self.max_nfa_states
    }

    pub fn get_max_dfa_states(&self) -> usize {
        self.max_dfa_states
    }

    pub fn get_max_transitions(&self) -> Option<usize> {
        self.max_transitions
    }

    pub fn get_minimize(&self) -> bool {
        self.minimize
    }

    pub fn get_determinization(&self) -> Determinization {
        self.determinization
    }

    pub fn get_minimization(&self) -> Minimization {
        self.minimization
    }

    pub fn get_flags(&self) -> &str {
        &self.flags
    }

    /// Returns the first requested flag that is not supported.
    pub fn unsupported_flag(&self) -> Option<char> {
        self.flags.chars().find(|c| !SUPPORTED_FLAGS.contains(c))
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.flags.contains('i')
    }

    pub fn is_dot_all(&self) -> bool {
        self.flags.contains('s')
    }

    pub fn is_unicode(&self) -> bool {
        self.flags.contains('u')
    }

    /// The inclusive code-point bounds of the alphabet: all of Unicode with
    /// the `u` flag, bytes otherwise.
    pub fn code_point_bounds(&self) -> (u32, u32) {
        if self.is_unicode() {
            (0, MAX_CODE_POINT)
        } else {
            (0, 0xFF)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags() {
        let opts = SolverOptions::new().flags("iu");
        assert!(opts.is_case_insensitive());
        assert!(opts.is_unicode());
        assert!(!opts.is_dot_all());
        assert_eq!(opts.unsupported_flag(), None);
        assert_eq!(opts.code_point_bounds(), (0, MAX_CODE_POINT));
        assert_eq!(SolverOptions::new().flags("im").unsupported_flag(), Some('m'));
        assert_eq!(SolverOptions::new().code_point_bounds(), (0, 0xFF));
    }

    #[test]
    fn flags_are_normalized() {
        let iu = SolverOptions::new().flags("iu");
        assert_eq!(iu, SolverOptions::new().flags("ui"));
        assert_eq!(iu, SolverOptions::new().flags("uiiu"));
        assert_eq!(iu.get_flags(), "iu");
    }

    #[test]
    fn distinct_options_are_distinct() {
        let a = SolverOptions::new();
        let b = SolverOptions::new().minimization(Minimization::Moore);
        assert_ne!(a, b);
        assert_eq!(a, SolverOptions::default());
    }
}
