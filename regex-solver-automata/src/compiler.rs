use regex_solver_syntax::ast::{
    Alternation, AnchorKind, Class, ClassItem, Greediness, GroupKind, Literal,
    LiteralKind, Node, Repetition, Sequence, Span,
};

use crate::{
    charset::{self, CharSet},
    error::ComplexityError,
    nfa::{Builder, Fragment, NFA},
    options::{MatchMode, SolverOptions},
    state::StateId,
    CompileResult,
};

/// Compiler that converts a validated syntax tree to a Thompson NFA
#[derive(Debug)]
pub struct Compiler<'a> {
    builder: Builder,
    pattern: &'a str,
    match_mode: MatchMode,
    case_insensitive: bool,
    dot_all: bool,
    unicode: bool,
    min_code_point: u32,
    max_code_point: u32,
}

impl<'a> Compiler<'a> {
    /// Create a new compiler for `pattern` under `options`
    pub fn new(options: &SolverOptions, pattern: &'a str) -> Self {
        let bounds = options.code_point_bounds();
        Self {
            builder: Builder::new(options.get_max_nfa_states(), bounds),
            pattern,
            match_mode: options.get_match_mode(),
            case_insensitive: options.is_case_insensitive(),
            dot_all: options.is_dot_all(),
            unicode: options.is_unicode(),
            min_code_point: bounds.0,
            max_code_point: bounds.1,
        }
    }

    /// Compile the syntax tree to a Thompson NFA
    pub fn compile(mut self, node: &Node) -> CompileResult<NFA> {
        let fragment = match self.match_mode {
            MatchMode::Full => self
                .anchoring(node)
                .and_then(|_| self.compile_node(node)),
            MatchMode::Partial => self.compile_unanchored(node),
        }
        .map_err(|err| err.with_pattern(self.pattern))?;

        debug!(
            "compiled {:?} to an NFA with {} states ({} allocations)",
            self.pattern,
            self.builder.len(),
            self.builder.allocations()
        );
        Ok(self.builder.build(fragment.start, &fragment.accepts))
    }

    fn error(&self, span: Span, message: &str) -> ComplexityError {
        ComplexityError::new(message)
            .with_position(span.start)
            .with_pattern(self.pattern)
    }

    /// Every code point of the alphabet
    fn any(&self) -> CharSet {
        CharSet::range(self.min_code_point, self.max_code_point)
    }

    /// Compile an AST node to an NFA fragment
    fn compile_node(&mut self, node: &Node) -> CompileResult<Fragment> {
        match *node {
            Node::Empty(_) => self.compile_empty(),
            Node::Literal(ref lit) => self.compile_literal(lit),
            Node::Dot(_) => {
                let mut set = self.any();
                if !self.dot_all {
                    set = set.subtract(&CharSet::single(u32::from(b'\n')));
                }
                self.compile_set(set)
            }
            Node::CharType(ref ct) => {
                match charset::char_type(
                    ct.code,
                    self.min_code_point,
                    self.max_code_point,
                ) {
                    Some(set) => self.compile_set(self.fold(set)),
                    None => Err(self.error(
                        ct.span,
                        &format!("character type \\{} is not supported", ct.code),
                    )),
                }
            }
            Node::Class(ref class) => {
                let set = self.class_set(class);
                if set.is_unknown() {
                    return Err(self.error(
                        class.span,
                        "character class cannot be represented symbolically",
                    ));
                }
                self.compile_set(set)
            }
            Node::Anchor(ref anchor) => {
                if anchor.kind.is_start() || anchor.kind.is_end() {
                    // Whole-string semantics already pin both ends.
                    self.compile_empty()
                } else {
                    Err(self.error(anchor.span, "assertion is not supported"))
                }
            }
            Node::Group(ref group) => {
                if group.kind == GroupKind::Atomic {
                    return Err(
                        self.error(group.span, "atomic groups are not supported")
                    );
                }
                self.compile_node(&group.node)
            }
            Node::Alternation(ref alt) => self.compile_alternation(alt),
            Node::Sequence(ref seq) => self.compile_sequence(seq),
            Node::Repetition(ref rep) => self.compile_repetition(rep),
            Node::UnicodeProperty(_)
            | Node::Lookaround(_)
            | Node::InlineFlags(_)
            | Node::Backreference(_)
            | Node::Conditional(_)
            | Node::Define(_)
            | Node::Subroutine(_)
            | Node::ScriptRun(_)
            | Node::Verb(_)
            | Node::Keep(_) => Err(self.error(
                node.span(),
                "construct has no finite automaton equivalent",
            )),
        }
    }

    /// Compile empty match
    fn compile_empty(&mut self) -> CompileResult<Fragment> {
        let start = self.builder.add_state()?;
        Ok(Fragment { start, accepts: vec![start] })
    }

    /// Compile a single transition consuming one member of `set`
    fn compile_set(&mut self, set: CharSet) -> CompileResult<Fragment> {
        let start = self.builder.add_state()?;
        let end = self.builder.add_state()?;
        self.builder.add_transition(start, set, end)?;
        Ok(Fragment { start, accepts: vec![end] })
    }

    /// Compile a literal as a chain of transitions, one per code point
    fn compile_literal(&mut self, lit: &Literal) -> CompileResult<Fragment> {
        let start = self.builder.add_state()?;
        let mut end = start;
        for cp in self.literal_code_points(lit)? {
            let next = self.builder.add_state()?;
            let set = self.fold(CharSet::single(cp));
            self.builder.add_transition(end, set, next)?;
            end = next;
        }
        Ok(Fragment { start, accepts: vec![end] })
    }

    /// Outside Unicode mode a non-ASCII character written verbatim stands
    /// for its UTF-8 bytes. Escaped code points are taken as given.
    fn literal_code_points(&self, lit: &Literal) -> CompileResult<Vec<u32>> {
        let cp = lit.c as u32;
        if self.unicode || lit.kind == LiteralKind::Code || cp <= 0x7F {
            if cp > self.max_code_point {
                return Err(
                    self.error(lit.span, "code point is outside the alphabet")
                );
            }
            return Ok(vec![cp]);
        }
        let mut buf = [0; 4];
        Ok(lit.c.encode_utf8(&mut buf).bytes().map(u32::from).collect())
    }

    /// The symbolic set of a bracket class. Unknown when an item cannot be
    /// modeled.
    fn class_set(&self, class: &Class) -> CharSet {
        let mut set = CharSet::empty();
        for item in class.items.iter() {
            let item_set = match *item {
                ClassItem::Literal(ref lit) => match self.single_code_point(lit) {
                    Some(cp) => CharSet::single(cp),
                    None => CharSet::unknown(),
                },
                ClassItem::Range(ref range) => match (
                    self.single_code_point(&range.start),
                    self.single_code_point(&range.end),
                ) {
                    (Some(start), Some(end)) => CharSet::range(start, end),
                    _ => CharSet::unknown(),
                },
                ClassItem::CharType(ref ct) => charset::char_type(
                    ct.code,
                    self.min_code_point,
                    self.max_code_point,
                )
                .unwrap_or_else(CharSet::unknown),
                ClassItem::Posix(_) | ClassItem::UnicodeProperty(_) => {
                    CharSet::unknown()
                }
            };
            set = set.union(&item_set);
        }
        let set = self.fold(set);
        let set = if class.negated {
            set.complement(self.min_code_point, self.max_code_point)
        } else {
            set
        };
        set.intersect(&self.any())
    }

    fn single_code_point(&self, lit: &Literal) -> Option<u32> {
        match self.literal_code_points(lit) {
            Ok(cps) if cps.len() == 1 => Some(cps[0]),
            _ => None,
        }
    }

    fn fold(&self, set: CharSet) -> CharSet {
        if self.case_insensitive {
            set.case_fold_ascii()
        } else {
            set
        }
    }

    /// Compile concatenation
    fn compile_sequence(&mut self, seq: &Sequence) -> CompileResult<Fragment> {
        let mut nodes = seq.nodes.iter();
        let mut current = match nodes.next() {
            Some(node) => self.compile_node(node)?,
            None => return self.compile_empty(),
        };
        for node in nodes {
            let next = self.compile_node(node)?;
            self.link(&current.accepts, next.start)?;
            current = Fragment { start: current.start, accepts: next.accepts };
        }
        Ok(current)
    }

    /// Compile alternation
    fn compile_alternation(
        &mut self,
        alt: &Alternation,
    ) -> CompileResult<Fragment> {
        let start = self.builder.add_state()?;
        let end = self.builder.add_state()?;
        for node in alt.alternatives.iter() {
            let branch = self.compile_node(node)?;
            self.builder.add_epsilon(start, branch.start)?;
            self.link(&branch.accepts, end)?;
        }
        Ok(Fragment { start, accepts: vec![end] })
    }

    /// Compile repetition
    fn compile_repetition(
        &mut self,
        rep: &Repetition,
    ) -> CompileResult<Fragment> {
        if rep.greediness == Greediness::Possessive {
            return Err(self
                .error(rep.span, "possessive quantifiers are not supported"));
        }
        // Laziness only affects which match a search reports, never the
        // language, so lazy and greedy compile alike.
        match rep.max {
            None => {
                if rep.min == 0 {
                    return self.compile_star(&rep.node);
                }
                let prefix = self.compile_copies(&rep.node, rep.min)?;
                let star = self.compile_star(&rep.node)?;
                self.link(&prefix.accepts, star.start)?;
                Ok(Fragment { start: prefix.start, accepts: star.accepts })
            }
            Some(max) if max < rep.min => {
                Err(self.error(rep.span, "repetition range is out of order"))
            }
            Some(max) => self.compile_bounded(&rep.node, rep.min, max),
        }
    }

    /// `count` copies of `node` in sequence
    fn compile_copies(
        &mut self,
        node: &Node,
        count: u32,
    ) -> CompileResult<Fragment> {
        let mut current = self.compile_node(node)?;
        for _ in 1..count {
            let next = self.compile_node(node)?;
            self.link(&current.accepts, next.start)?;
            current = Fragment { start: current.start, accepts: next.accepts };
        }
        Ok(current)
    }

    /// Kleene star
    fn compile_star(&mut self, node: &Node) -> CompileResult<Fragment> {
        let start = self.builder.add_state()?;
        let end = self.builder.add_state()?;
        let body = self.compile_node(node)?;
        self.builder.add_epsilon(start, end)?;
        self.builder.add_epsilon(start, body.start)?;
        for &accept in body.accepts.iter() {
            self.builder.add_epsilon(accept, body.start)?;
            self.builder.add_epsilon(accept, end)?;
        }
        Ok(Fragment { start, accepts: vec![end] })
    }

    /// `min` mandatory copies followed by `max - min` optional ones. Once
    /// the mandatory copies are done, each copy may skip to the exit.
    fn compile_bounded(
        &mut self,
        node: &Node,
        min: u32,
        max: u32,
    ) -> CompileResult<Fragment> {
        if max == 0 {
            return self.compile_empty();
        }
        let end = self.builder.add_state()?;
        let mut current = if min == 0 {
            let entry = self.builder.add_state()?;
            self.builder.add_epsilon(entry, end)?;
            Fragment { start: entry, accepts: vec![entry] }
        } else {
            let first = self.compile_node(node)?;
            if min == 1 {
                self.link(&first.accepts, end)?;
            }
            first
        };
        let already = if min == 0 { 0 } else { 1 };
        for i in (already + 1)..=max {
            let next = self.compile_node(node)?;
            self.link(&current.accepts, next.start)?;
            if i >= min {
                self.link(&next.accepts, end)?;
            }
            current = Fragment { start: current.start, accepts: next.accepts };
        }
        Ok(Fragment { start: current.start, accepts: vec![end] })
    }

    fn link(&mut self, from: &[StateId], to: StateId) -> CompileResult<()> {
        for &id in from {
            self.builder.add_epsilon(id, to)?;
        }
        Ok(())
    }

    /// Compile for substring matching: every side of the pattern that is not
    /// pinned by an anchor gets a self-looping state over the whole alphabet.
    fn compile_unanchored(&mut self, node: &Node) -> CompileResult<Fragment> {
        let (anchored_start, anchored_end) = self.anchoring(node)?;
        let inner = self.compile_node(node)?;

        let start = if anchored_start {
            inner.start
        } else {
            let prefix = self.builder.add_state()?;
            self.builder.add_transition(prefix, self.any(), prefix)?;
            self.builder.add_epsilon(prefix, inner.start)?;
            prefix
        };
        let accepts = if anchored_end {
            inner.accepts
        } else {
            let suffix = self.builder.add_state()?;
            self.builder.add_transition(suffix, self.any(), suffix)?;
            self.link(&inner.accepts, suffix)?;
            vec![suffix]
        };
        Ok(Fragment { start, accepts })
    }

    /// Determine which ends of the pattern are anchored. Anchors may only
    /// appear as the first or last element of a top-level alternative, and
    /// in partial match mode every alternative must agree.
    fn anchoring(&self, node: &Node) -> CompileResult<(bool, bool)> {
        let alternatives: Vec<&Node> = match *node {
            Node::Alternation(ref alt) => alt.alternatives.iter().collect(),
            ref other => vec![other],
        };
        let mut consensus: Option<(bool, bool)> = None;
        for alt in alternatives {
            let anchored = self.alternative_anchoring(alt)?;
            if self.match_mode == MatchMode::Full {
                continue;
            }
            match consensus {
                None => consensus = Some(anchored),
                Some(agreed) if agreed == anchored => {}
                Some(_) => {
                    return Err(self.error(
                        alt.span(),
                        "alternatives must be anchored alike in partial \
                         match mode",
                    ))
                }
            }
        }
        Ok(consensus.unwrap_or((false, false)))
    }

    /// Whether one top-level alternative starts with `^` and ends with `$`.
    /// An anchor anywhere else could only match the empty string around it,
    /// which a zero-width fragment cannot express.
    fn alternative_anchoring(&self, alt: &Node) -> CompileResult<(bool, bool)> {
        let elements: &[Node] = match *alt {
            Node::Sequence(ref seq) => &seq.nodes,
            ref other => core::slice::from_ref(other),
        };
        let starts = elements
            .first()
            .map_or(false, |n| anchor_kind(n).map_or(false, |k| k.is_start()));
        let ends = elements
            .last()
            .map_or(false, |n| anchor_kind(n).map_or(false, |k| k.is_end()));
        let last = elements.len().saturating_sub(1);
        for (i, element) in elements.iter().enumerate() {
            let allowed = (i == 0 && starts) || (i == last && ends);
            if allowed {
                continue;
            }
            if let Some(span) = find_anchor(element) {
                return Err(self.error(
                    span,
                    "anchors are only supported at the very start or end \
                     of a top-level alternative",
                ));
            }
        }
        Ok((starts, ends))
    }
}

fn anchor_kind(node: &Node) -> Option<AnchorKind> {
    match *node {
        Node::Anchor(ref anchor) => Some(anchor.kind),
        _ => None,
    }
}

/// The span of the first anchor anywhere within `node`.
fn find_anchor(node: &Node) -> Option<Span> {
    match *node {
        Node::Anchor(ref anchor) => Some(anchor.span),
        Node::Group(ref group) => find_anchor(&group.node),
        Node::Repetition(ref rep) => find_anchor(&rep.node),
        Node::Alternation(ref alt) => {
            alt.alternatives.iter().find_map(find_anchor)
        }
        Node::Sequence(ref seq) => seq.nodes.iter().find_map(find_anchor),
        _ => None,
    }
}
