/*!
This crate decides questions about the *languages* of regular expressions:
whether two patterns can match a common string, whether one pattern's matches
are all matched by another, and whether two patterns match exactly the same
strings. When the answer is no (or, for intersection, yes), it produces a
shortest string demonstrating it.

Patterns use PCRE2 syntax, restricted to its regular subset. Constructs that
no finite automaton can model exactly (lookaround, backreferences, recursion,
conditionals, atomic groups, possessive quantifiers, backtracking verbs and
similar) are rejected with an [`Error::Complexity`] instead of being
approximated.

# Example

```
use regex_solver::{Solver, SolverOptions};

let solver = Solver::new(SolverOptions::new());

assert!(solver.equivalent("a|b", "[ab]")?.holds);

let result = solver.subset_of("[0-9]+", "[0-9]{1,3}")?;
assert!(!result.holds);
assert_eq!(result.counterexample.unwrap().len(), 4);

assert!(solver.intersection("a+", "b+")?.disjoint);
# Ok::<(), regex_solver::Error>(())
```

# Match mode

By default a pattern describes whole strings, as if it were wrapped in `^`
and `$`. With [`MatchMode::Partial`] a pattern describes every string that
*contains* a match, as a search would.

In either mode, `^` may only begin and `$` may only end a top-level
alternative. An anchor anywhere else, as in `a^b`, is rejected. In partial
mode every alternative must also be anchored alike.

# Alphabet

Without the `u` flag the alphabet is bytes (`0..=255`), and non-ASCII
characters written directly in a pattern stand for their UTF-8 encoding.
With the `u` flag the alphabet is every Unicode code point. Witnesses are
sequences of code points in the corresponding alphabet.

# Resource ceilings

Compilation can blow up exponentially. [`SolverOptions`] bounds the NFA
states and edges allocated, the DFA states materialized and the transitions
processed. Exceeding any of them fails with a [`ComplexityError`] carrying a
[`Diagnostic`].

# Crate features

* **logging** (enabled by default) - Emits messages through the `log`
crate for each compilation stage, cache hits, exceeded ceilings and
product-search outcomes.
*/

#![forbid(unsafe_code)]
#![deny(missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

#[macro_use]
mod macros;

pub use crate::{
    cache::{CacheKey, DfaCache, MemoryCache},
    error::Error,
    solver::{EquivalenceResult, IntersectionResult, Solver, SubsetResult},
    witness::Witness,
};

pub use regex_solver_automata::{
    ComplexityError, Determinization, Diagnostic, Limit, MatchMode,
    Minimization, SolverOptions, DFA,
};

mod cache;
mod error;
mod product;
mod solver;
mod witness;
