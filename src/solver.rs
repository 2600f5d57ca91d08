use std::sync::Arc;

use regex_solver_automata::{
    compiler::Compiler, dfa, validate, SolverOptions, DFA,
};

use crate::{
    cache::{CacheKey, DfaCache},
    error::Error,
    product,
    witness::Witness,
};

/// The answer to [`Solver::intersection`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IntersectionResult {
    /// True when no string matches both patterns.
    pub disjoint: bool,
    /// A shortest string matching both, present exactly when not disjoint.
    pub witness: Option<Witness>,
}

/// The answer to [`Solver::subset_of`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubsetResult {
    pub holds: bool,
    /// A shortest string matched by the left pattern but not the right.
    pub counterexample: Option<Witness>,
}

/// The answer to [`Solver::equivalent`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EquivalenceResult {
    pub holds: bool,
    /// A shortest string matched only by the left pattern.
    pub left_only: Option<Witness>,
    /// A shortest string matched only by the right pattern.
    pub right_only: Option<Witness>,
}

/// Answers questions about the languages of patterns.
///
/// Every pattern is compiled to a DFA under the solver's [`SolverOptions`].
/// With a [`DfaCache`] attached, compiled automata are reused across
/// queries and across solvers sharing the cache.
#[derive(Clone)]
pub struct Solver {
    options: SolverOptions,
    builder: dfa::Builder,
    cache: Option<Arc<dyn DfaCache>>,
}

impl core::fmt::Debug for Solver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Solver")
            .field("options", &self.options)
            .field("cache", &self.cache.is_some())
            .finish()
    }
}

impl Default for Solver {
    fn default() -> Solver {
        Solver::new(SolverOptions::default())
    }
}

impl Solver {
    pub fn new(options: SolverOptions) -> Solver {
        let builder = dfa::Builder::new(options.clone());
        Solver { options, builder, cache: None }
    }

    /// Attach a cache for compiled DFAs.
    pub fn with_cache(mut self, cache: Arc<dyn DfaCache>) -> Solver {
        self.cache = Some(cache);
        self
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Compile a pattern to a DFA.
    ///
    /// The pattern is parsed, checked for constructs outside the regular
    /// subset, compiled to an NFA and determinized (then minimized, if so
    /// configured). Each stage enforces the configured resource ceilings.
    pub fn compile(&self, pattern: &str) -> Result<Arc<DFA>, Error> {
        let key = CacheKey::new(pattern, &self.options);
        if let Some(ref cache) = self.cache {
            if let Some(dfa) = cache.get(&key) {
                debug!("DFA cache hit for {:?}", pattern);
                return Ok(dfa);
            }
        }

        let node = regex_solver_syntax::parse(pattern)?;
        validate(&node, pattern, &self.options)?;
        let nfa = Compiler::new(&self.options, pattern).compile(&node)?;
        let dfa = self
            .builder
            .build(&nfa)
            .map_err(|err| err.with_pattern(pattern))?;
        debug!(
            "compiled {:?}: {} NFA states, {} DFA states",
            pattern,
            nfa.len(),
            dfa.len()
        );

        let dfa = Arc::new(dfa);
        if let Some(ref cache) = self.cache {
            cache.set(key, Arc::clone(&dfa));
        }
        Ok(dfa)
    }

    /// Compile both patterns, compiling only once when they are the same.
    fn compile_pair(
        &self,
        left: &str,
        right: &str,
    ) -> Result<(Arc<DFA>, Arc<DFA>), Error> {
        let a = self.compile(left)?;
        let b = if left == right { Arc::clone(&a) } else { self.compile(right)? };
        Ok((a, b))
    }

    /// Decide whether some string matches both patterns.
    pub fn intersection(
        &self,
        left: &str,
        right: &str,
    ) -> Result<IntersectionResult, Error> {
        let (a, b) = self.compile_pair(left, right)?;
        let witness = product::search(&a, &b, |x, y| x && y);
        debug!(
            "intersection({:?}, {:?}): disjoint = {}",
            left,
            right,
            witness.is_none()
        );
        Ok(IntersectionResult { disjoint: witness.is_none(), witness })
    }

    /// Decide whether every string matching `left` also matches `right`.
    pub fn subset_of(
        &self,
        left: &str,
        right: &str,
    ) -> Result<SubsetResult, Error> {
        let (a, b) = self.compile_pair(left, right)?;
        let counterexample = product::search(&a, &b, |x, y| x && !y);
        debug!(
            "subset_of({:?}, {:?}): holds = {}",
            left,
            right,
            counterexample.is_none()
        );
        Ok(SubsetResult { holds: counterexample.is_none(), counterexample })
    }

    /// Decide whether the patterns match exactly the same strings.
    pub fn equivalent(
        &self,
        left: &str,
        right: &str,
    ) -> Result<EquivalenceResult, Error> {
        let (a, b) = self.compile_pair(left, right)?;
        let left_only = product::search(&a, &b, |x, y| x && !y);
        let right_only = product::search(&a, &b, |x, y| !x && y);
        let holds = left_only.is_none() && right_only.is_none();
        debug!("equivalent({:?}, {:?}): holds = {}", left, right, holds);
        Ok(EquivalenceResult { holds, left_only, right_only })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;

    #[test]
    fn identical_patterns_compile_once() {
        let cache = Arc::new(MemoryCache::new());
        let solver = Solver::default().with_cache(cache.clone());
        assert!(solver.equivalent("a*b", "a*b").unwrap().holds);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_hits_return_the_same_automaton() {
        let cache = Arc::new(MemoryCache::new());
        let solver = Solver::default().with_cache(cache.clone());
        let first = solver.compile("x|y").unwrap();
        let second = solver.compile("x|y").unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let other = Solver::new(SolverOptions::new().minimize(false))
            .with_cache(cache.clone());
        let third = other.compile("x|y").unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn cached_answers_match_uncached_ones() {
        let (a, b) = ("aaaaaaaaeaabaada", "alphaaaazATxLbYe");
        let cache = Arc::new(MemoryCache::new());
        let cached = Solver::default().with_cache(cache.clone());
        assert!(!Solver::default().equivalent(a, b).unwrap().holds);
        assert!(!cached.equivalent(a, b).unwrap().holds);
        assert!(!cached.equivalent(a, b).unwrap().holds);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn empty_witness_when_start_pair_matches() {
        let result = Solver::default().intersection("a*", "b*").unwrap();
        assert!(!result.disjoint);
        assert_eq!(result.witness, Some(Witness::new(vec![], false)));
    }
}
