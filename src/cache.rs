/*!
Pluggable storage for compiled DFAs.

Compilation is by far the most expensive part of answering a query, and a
compiled [`DFA`] is immutable, so it can be shared across queries and
threads. The solver consults a [`DfaCache`] when one is configured.
*/

use std::sync::Arc;

use parking_lot::RwLock;
use regex_solver_automata::{SolverOptions, DFA};
use rustc_hash::FxHashMap;

/// Identifies one compilation: a pattern under one configuration.
///
/// The key holds the pattern text and every field of [`SolverOptions`], and
/// compares them in full. Two keys are equal only when they describe the
/// same compilation, so a hash collision can never return the wrong DFA.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct CacheKey {
    pattern: String,
    options: SolverOptions,
}

impl CacheKey {
    pub fn new(pattern: &str, options: &SolverOptions) -> CacheKey {
        CacheKey { pattern: pattern.to_string(), options: options.clone() }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }
}

/// A store of compiled DFAs shared between solvers.
///
/// Implementations need no invalidation: an entry is valid forever for its
/// key.
pub trait DfaCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<Arc<DFA>>;

    fn set(&self, key: CacheKey, dfa: Arc<DFA>);
}

/// An unbounded in-process cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    map: RwLock<FxHashMap<CacheKey, Arc<DFA>>>,
}

impl MemoryCache {
    pub fn new() -> MemoryCache {
        MemoryCache::default()
    }

    /// The number of cached automata.
    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }

    pub fn clear(&self) {
        self.map.write().clear();
    }
}

impl DfaCache for MemoryCache {
    fn get(&self, key: &CacheKey) -> Option<Arc<DFA>> {
        self.map.read().get(key).cloned()
    }

    fn set(&self, key: CacheKey, dfa: Arc<DFA>) {
        self.map.write().insert(key, dfa);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex_solver_automata::MatchMode;

    #[test]
    fn keys_cover_every_option() {
        let base = SolverOptions::new();
        let key = CacheKey::new("a+", &base);
        assert_eq!(key, CacheKey::new("a+", &SolverOptions::new()));
        assert_ne!(key, CacheKey::new("a*", &base));
        assert_ne!(
            key,
            CacheKey::new("a+", &base.clone().match_mode(MatchMode::Partial))
        );
        assert_ne!(key, CacheKey::new("a+", &base.clone().max_dfa_states(5)));
        assert_ne!(key, CacheKey::new("a+", &base.clone().flags("i")));
        assert_ne!(key, CacheKey::new("a+", &base.clone().minimize(false)));
        assert_eq!(
            CacheKey::new("a+", &base.clone().flags("iu")),
            CacheKey::new("a+", &base.flags("ui"))
        );
    }

    #[test]
    fn equal_hashes_do_not_share_an_entry() {
        // These patterns collide under a 64-bit FxHash of the pattern and
        // options.
        let options = SolverOptions::new();
        let a = CacheKey::new("aaaaaaaaeaabaada", &options);
        let b = CacheKey::new("alphaaaazATxLbYe", &options);
        assert_ne!(a, b);

        let cache = MemoryCache::new();
        let dfa = crate::Solver::new(options).compile("x").unwrap();
        cache.set(a.clone(), dfa);
        assert!(cache.get(&a).is_some());
        assert!(cache.get(&b).is_none());
    }
}
