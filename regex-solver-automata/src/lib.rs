//! Finite automata for the regular subset of PCRE2 patterns.
//!
//! A pattern flows through three stages:
//!
//! 1. [`validate`] rejects constructs with no exact automaton equivalent.
//! 2. [`Compiler`] performs Thompson construction into an [`NFA`] whose
//!    transitions are guarded by symbolic [`CharSet`]s.
//! 3. [`dfa::Builder`] determinizes (and optionally minimizes) it into a
//!    [`DFA`] with range-labelled transitions.
//!
//! Every stage enforces the resource ceilings in [`SolverOptions`] as it
//! goes and fails with a [`ComplexityError`].

#![forbid(unsafe_code)]
#![deny(missing_debug_implementations)]

#[macro_use]
mod macros;

pub mod charset;
pub mod compiler;
pub mod determinize;
pub mod dfa;
pub mod error;
pub mod matcher;
pub mod minimize;
pub mod nfa;
pub mod options;
pub mod state;
pub mod validate;

pub use charset::{CharSet, CodeRange};
pub use compiler::Compiler;
pub use dfa::DFA;
pub use error::{ComplexityError, Diagnostic, Limit};
pub use matcher::Matcher;
pub use nfa::{Fragment, NFA};
pub use options::{Determinization, MatchMode, Minimization, SolverOptions};
pub use state::{StateId, StateSet};
pub use validate::validate;

/// The result of building an automaton
pub type CompileResult<T> = Result<T, ComplexityError>;
