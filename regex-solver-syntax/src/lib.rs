/*!
This crate provides a parser for PCRE2-flavoured regular expressions.

The parser produces a closed abstract syntax tree ([`ast::Node`]) that keeps
every construct of the surface syntax, including the ones that are not
regular in the formal-language sense (lookaround, backreferences,
conditionals, recursion, backtracking verbs). Deciding which constructs are
acceptable is left to consumers of the tree.

# Example

```
use regex_solver_syntax::{ast::Node, parse};

let node = parse("a|b").unwrap();
assert!(matches!(node, Node::Alternation(_)));
```
*/

#![forbid(unsafe_code)]
#![deny(missing_debug_implementations)]

pub use crate::{
    error::{Error, ErrorKind},
    parser::{Parser, ParserBuilder},
};

pub mod ast;
mod error;
mod parser;

/// Parse the given pattern with a default parser configuration.
///
/// To configure the parser, use a [`ParserBuilder`].
pub fn parse(pattern: &str) -> Result<ast::Node, Error> {
    Parser::new().parse(pattern)
}
