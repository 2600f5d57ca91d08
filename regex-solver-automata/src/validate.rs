/*!
Rejects syntax that has no exact finite-automaton equivalent.

Validation runs before any state is allocated, so unsupported constructs are
reported even in patterns whose regular parts would blow the state ceilings.
*/

use regex_solver_syntax::ast::{
    AnchorKind, CharType, Class, ClassItem, Condition, Greediness, GroupKind,
    Literal, LiteralKind, Node, Span,
};

use crate::{
    error::{ComplexityError, Limit},
    options::SolverOptions,
    CompileResult,
};

/// Check that `node`, parsed from `pattern`, lies in the regular subset that
/// the compiler can model under `options`.
pub fn validate(
    node: &Node,
    pattern: &str,
    options: &SolverOptions,
) -> CompileResult<()> {
    if let Some(flag) = options.unsupported_flag() {
        return Err(ComplexityError::new(format!(
            "flag '{}' is not supported",
            flag
        ))
        .with_pattern(pattern));
    }
    let validator = Validator {
        pattern,
        options,
        max_code_point: options.code_point_bounds().1,
    };
    validator.visit(node)
}

struct Validator<'a> {
    pattern: &'a str,
    options: &'a SolverOptions,
    max_code_point: u32,
}

impl<'a> Validator<'a> {
    fn reject(&self, span: Span, message: &str) -> ComplexityError {
        ComplexityError::new(message)
            .with_position(span.start)
            .with_pattern(self.pattern)
    }

    fn visit(&self, node: &Node) -> CompileResult<()> {
        match *node {
            Node::Empty(_) | Node::Dot(_) => Ok(()),
            Node::Literal(ref lit) => self.literal(lit, false),
            Node::CharType(ref ct) => self.char_type(ct),
            Node::Class(ref class) => self.class(class),
            Node::UnicodeProperty(ref prop) => Err(self.reject(
                prop.span,
                "Unicode property classes are not supported",
            )),
            Node::Anchor(ref anchor) => match anchor.kind {
                AnchorKind::WordBoundary | AnchorKind::NotWordBoundary => {
                    Err(self.reject(
                        anchor.span,
                        "word boundary assertions are not supported",
                    ))
                }
                AnchorKind::FirstMatchPosition => Err(self.reject(
                    anchor.span,
                    "\\G (first match position) is not supported",
                )),
                _ => Ok(()),
            },
            Node::Group(ref group) => {
                if group.kind == GroupKind::Atomic {
                    return Err(self
                        .reject(group.span, "atomic groups are not supported"));
                }
                self.visit(&group.node)
            }
            Node::Alternation(ref alt) => {
                alt.alternatives.iter().try_for_each(|n| self.visit(n))
            }
            Node::Sequence(ref seq) => {
                seq.nodes.iter().try_for_each(|n| self.visit(n))
            }
            Node::Repetition(ref rep) => {
                if rep.greediness == Greediness::Possessive {
                    return Err(self.reject(
                        rep.span,
                        "possessive quantifiers are not supported",
                    ));
                }
                // Every mandatory or optional copy costs at least one state,
                // so a bound above the NFA ceiling can never fit.
                let limit = self.options.get_max_nfa_states();
                let bound = rep.max.unwrap_or(rep.min).max(rep.min) as usize;
                if bound > limit {
                    return Err(ComplexityError::limit_exceeded(
                        Limit::NfaStates,
                        bound,
                        limit,
                    )
                    .with_position(rep.span.start)
                    .with_pattern(self.pattern));
                }
                self.visit(&rep.node)
            }
            Node::Lookaround(ref look) => Err(
                self.reject(look.span, "lookaround assertions are not supported")
            ),
            Node::InlineFlags(ref flags) => Err(self.reject(
                flags.span,
                "inline flag modifiers are not supported",
            )),
            Node::Backreference(ref backref) => Err(
                self.reject(backref.span, "backreferences are not supported")
            ),
            Node::Conditional(ref cond) => match cond.condition {
                Condition::Version { .. } => Err(self.reject(
                    cond.span,
                    "version conditions are not supported",
                )),
                _ => Err(self
                    .reject(cond.span, "conditional groups are not supported")),
            },
            Node::Define(ref define) => Err(
                self.reject(define.span, "DEFINE groups are not supported")
            ),
            Node::Subroutine(ref sub) => Err(self.reject(
                sub.span,
                "recursion and subroutine calls are not supported",
            )),
            Node::ScriptRun(ref run) => {
                Err(self.reject(run.span, "script runs are not supported"))
            }
            Node::Verb(ref verb) => Err(self.reject(
                verb.span,
                &format!(
                    "backtracking control verb (*{}) is not supported",
                    verb.name
                ),
            )),
            Node::Keep(span) => Err(
                self.reject(span, "\\K (match start reset) is not supported")
            ),
        }
    }

    /// `single` is set where exactly one code point is required, as in a
    /// class or a range endpoint.
    fn literal(&self, lit: &Literal, single: bool) -> CompileResult<()> {
        let cp = lit.c as u32;
        if lit.kind == LiteralKind::Code && cp > self.max_code_point {
            return Err(self.reject(
                lit.span,
                &format!(
                    "code point U+{:04X} is outside the alphabet (max U+{:04X}); \
                     set the 'u' flag for Unicode",
                    cp, self.max_code_point
                ),
            ));
        }
        if single
            && lit.kind != LiteralKind::Code
            && cp > 0x7F
            && !self.options.is_unicode()
        {
            return Err(self.reject(
                lit.span,
                &format!(
                    "'{}' encodes to several bytes where a single code point \
                     is required; set the 'u' flag for Unicode",
                    lit.c
                ),
            ));
        }
        Ok(())
    }

    fn char_type(&self, ct: &CharType) -> CompileResult<()> {
        match ct.code {
            'd' | 'D' | 'w' | 'W' | 's' | 'S' => Ok(()),
            code => Err(self.reject(
                ct.span,
                &format!("character type \\{} is not supported", code),
            )),
        }
    }

    fn class(&self, class: &Class) -> CompileResult<()> {
        for item in class.items.iter() {
            match *item {
                ClassItem::Literal(ref lit) => self.literal(lit, true)?,
                ClassItem::Range(ref range) => {
                    self.literal(&range.start, true)?;
                    self.literal(&range.end, true)?;
                    if range.start.c > range.end.c {
                        return Err(self.reject(
                            range.span,
                            "class range is out of order",
                        ));
                    }
                }
                ClassItem::CharType(ref ct) => self.char_type(ct)?,
                ClassItem::Posix(ref posix) => {
                    return Err(self.reject(
                        posix.span,
                        "POSIX character classes are not supported",
                    ))
                }
                ClassItem::UnicodeProperty(ref prop) => {
                    return Err(self.reject(
                        prop.span,
                        "Unicode property classes are not supported",
                    ))
                }
            }
        }
        Ok(())
    }
}
