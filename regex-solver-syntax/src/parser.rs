/*!
A recursive descent parser for PCRE2-flavoured patterns.
*/

use crate::{
    ast::{
        Alternation, Anchor, AnchorKind, Backreference, CharType, Class,
        ClassItem, ClassRange, Condition, Conditional, Define, Greediness,
        Group, GroupKind, GroupRef, InlineFlags, Literal, LiteralKind,
        Lookaround, LookaroundKind, Node, PosixClass, Repetition, ScriptRun,
        Sequence, Span, Subroutine, SubroutineTarget, UnicodeProperty, Verb,
    },
    error::{Error, ErrorKind},
};

type Result<T> = core::result::Result<T, Error>;

/// A builder for a pattern parser.
#[derive(Clone, Debug)]
pub struct ParserBuilder {
    nest_limit: u32,
}

impl Default for ParserBuilder {
    fn default() -> ParserBuilder {
        ParserBuilder::new()
    }
}

impl ParserBuilder {
    /// Create a new parser builder with a default configuration.
    pub fn new() -> ParserBuilder {
        ParserBuilder { nest_limit: 250 }
    }

    /// Build a parser from this configuration.
    pub fn build(&self) -> Parser {
        Parser { nest_limit: self.nest_limit }
    }

    /// Set the nesting limit for groups.
    ///
    /// Consumers of the syntax tree recurse over it, so bounding the depth
    /// here bounds their stack usage too.
    pub fn nest_limit(&mut self, limit: u32) -> &mut ParserBuilder {
        self.nest_limit = limit;
        self
    }
}

/// A pattern parser.
#[derive(Clone, Debug)]
pub struct Parser {
    nest_limit: u32,
}

impl Default for Parser {
    fn default() -> Parser {
        Parser::new()
    }
}

impl Parser {
    /// Create a new parser with a default configuration.
    pub fn new() -> Parser {
        ParserBuilder::new().build()
    }

    /// Parse the pattern into a syntax tree.
    pub fn parse(&self, pattern: &str) -> Result<Node> {
        ParserI::new(self, pattern).parse()
    }
}

/// The internal parser state for a single pattern.
struct ParserI<'p> {
    pattern: &'p str,
    chars: Vec<(usize, char)>,
    pos: usize,
    depth: u32,
    nest_limit: u32,
    capture_index: u32,
}

impl<'p> ParserI<'p> {
    fn new(parser: &Parser, pattern: &'p str) -> ParserI<'p> {
        ParserI {
            pattern,
            chars: pattern.char_indices().collect(),
            pos: 0,
            depth: 0,
            nest_limit: parser.nest_limit,
            capture_index: 0,
        }
    }

    fn parse(mut self) -> Result<Node> {
        let node = self.parse_alternation()?;
        if self.peek().is_some() {
            let start = self.offset();
            return Err(self.error(
                ErrorKind::GroupUnopened,
                Span::new(start, start + 1),
            ));
        }
        Ok(node)
    }

    fn error(&self, kind: ErrorKind, span: Span) -> Error {
        Error::new(kind, self.pattern, span)
    }

    fn offset(&self) -> usize {
        self.offset_at(self.pos)
    }

    fn offset_at(&self, pos: usize) -> usize {
        self.chars.get(pos).map_or(self.pattern.len(), |&(i, _)| i)
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.offset())
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).map(|&(_, c)| c)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn at_str(&self, s: &str) -> bool {
        s.chars().enumerate().all(|(i, c)| self.peek_at(i) == Some(c))
    }

    /// Consume characters up to (and including) `end`, returning the text
    /// in between.
    fn take_until(&mut self, end: char) -> Option<String> {
        let mut text = String::new();
        loop {
            let c = self.bump()?;
            if c == end {
                return Some(text);
            }
            text.push(c);
        }
    }

    fn parse_alternation(&mut self) -> Result<Node> {
        let start = self.offset();
        let mut alternatives = vec![self.parse_sequence()?];
        while self.eat('|') {
            alternatives.push(self.parse_sequence()?);
        }
        if alternatives.len() == 1 {
            if let Some(node) = alternatives.pop() {
                return Ok(node);
            }
        }
        Ok(Node::Alternation(Alternation {
            span: self.span_from(start),
            alternatives,
        }))
    }

    fn parse_sequence(&mut self) -> Result<Node> {
        let start = self.offset();
        let mut nodes: Vec<Node> = vec![];
        let mut quantified = false;
        loop {
            match self.peek() {
                None | Some('|') | Some(')') => break,
                _ => {}
            }
            if self.at_str("\\Q") {
                self.pos += 2;
                self.parse_quoted(|lit| nodes.push(Node::Literal(lit)));
                continue;
            }
            if self.at_str("\\E") {
                self.pos += 2;
                continue;
            }
            if self.at_quantifier() {
                let node = match nodes.pop().filter(|_| !quantified) {
                    Some(node) => node,
                    None => {
                        let at = self.offset();
                        return Err(self.error(
                            ErrorKind::RepetitionMissing,
                            Span::new(at, at + 1),
                        ));
                    }
                };
                let node = self.parse_quantifier(node)?;
                nodes.push(node);
                quantified = true;
                continue;
            }
            if let Some(node) = self.parse_atom()? {
                nodes.push(node);
                quantified = false;
            }
        }
        if nodes.len() <= 1 {
            return Ok(nodes
                .pop()
                .unwrap_or_else(|| Node::Empty(Span::splat(start))));
        }
        Ok(Node::Sequence(Sequence { span: self.span_from(start), nodes }))
    }

    /// Parse the body of `\Q...\E`. The opening `\Q` is already consumed.
    fn parse_quoted<F: FnMut(Literal)>(&mut self, mut push: F) {
        while self.peek().is_some() {
            if self.at_str("\\E") {
                self.pos += 2;
                return;
            }
            let start = self.offset();
            if let Some(c) = self.bump() {
                push(Literal {
                    span: self.span_from(start),
                    kind: LiteralKind::Verbatim,
                    c,
                });
            }
        }
    }

    fn at_quantifier(&self) -> bool {
        match self.peek() {
            Some('*') | Some('+') | Some('?') => true,
            Some('{') => self.scan_counted().is_some(),
            _ => false,
        }
    }

    /// Returns the length in characters of a counted repetition starting at
    /// the current position, if there is one.
    fn scan_counted(&self) -> Option<usize> {
        let mut i = 1;
        let mut digits = 0;
        while self.peek_at(i).map_or(false, |c| c.is_ascii_digit()) {
            i += 1;
            digits += 1;
        }
        if digits == 0 {
            return None;
        }
        if self.peek_at(i) == Some(',') {
            i += 1;
            while self.peek_at(i).map_or(false, |c| c.is_ascii_digit()) {
                i += 1;
            }
        }
        if self.peek_at(i) == Some('}') {
            Some(i + 1)
        } else {
            None
        }
    }

    fn parse_quantifier(&mut self, node: Node) -> Result<Node> {
        let start = node.span().start;
        let op_start = self.offset();
        let (min, max) = match self.bump() {
            Some('*') => (0, None),
            Some('+') => (1, None),
            Some('?') => (0, Some(1)),
            _ => self.parse_counted(op_start)?,
        };
        let greediness = if self.eat('?') {
            Greediness::Lazy
        } else if self.eat('+') {
            Greediness::Possessive
        } else {
            Greediness::Greedy
        };
        Ok(Node::Repetition(Box::new(Repetition {
            span: self.span_from(start),
            min,
            max,
            greediness,
            node,
        })))
    }

    /// Parse `{n}`, `{n,}` or `{n,m}`. The opening brace is consumed.
    fn parse_counted(&mut self, start: usize) -> Result<(u32, Option<u32>)> {
        let min = self.parse_decimal(start)?;
        let max = if self.eat(',') {
            if self.peek().map_or(false, |c| c.is_ascii_digit()) {
                Some(self.parse_decimal(start)?)
            } else {
                None
            }
        } else {
            Some(min)
        };
        // scan_counted guarantees the closing brace.
        self.eat('}');
        if max.map_or(false, |max| max < min) {
            return Err(self.error(
                ErrorKind::RepetitionRangeInvalid,
                self.span_from(start),
            ));
        }
        Ok((min, max))
    }

    fn parse_decimal(&mut self, start: usize) -> Result<u32> {
        let mut value: u32 = 0;
        while let Some(d) = self.peek().and_then(|c| c.to_digit(10)) {
            self.pos += 1;
            value = value.checked_mul(10).and_then(|v| v.checked_add(d)).ok_or_else(
                || {
                    self.error(
                        ErrorKind::RepetitionCountOverflow,
                        self.span_from(start),
                    )
                },
            )?;
        }
        Ok(value)
    }

    fn parse_atom(&mut self) -> Result<Option<Node>> {
        let start = self.offset();
        let c = match self.bump() {
            Some(c) => c,
            None => return Ok(None),
        };
        let node = match c {
            '(' => return self.parse_group(start),
            '[' => Node::Class(self.parse_class(start)?),
            '.' => Node::Dot(self.span_from(start)),
            '^' => self.anchor(start, AnchorKind::StartLine),
            '$' => self.anchor(start, AnchorKind::EndLine),
            '\\' => self.parse_escape(start)?,
            c => Node::Literal(Literal {
                span: self.span_from(start),
                kind: LiteralKind::Verbatim,
                c,
            }),
        };
        Ok(Some(node))
    }

    fn anchor(&self, start: usize, kind: AnchorKind) -> Node {
        Node::Anchor(Anchor { span: self.span_from(start), kind })
    }

    fn parse_group(&mut self, start: usize) -> Result<Option<Node>> {
        self.depth += 1;
        if self.depth > self.nest_limit {
            return Err(self.error(
                ErrorKind::NestLimitExceeded(self.nest_limit),
                Span::new(start, start + 1),
            ));
        }
        let result = self.parse_group_inner(start);
        self.depth -= 1;
        result
    }

    /// Parse a group body through its closing parenthesis.
    fn parse_group_body(&mut self, start: usize) -> Result<Node> {
        let node = self.parse_alternation()?;
        if !self.eat(')') {
            return Err(self
                .error(ErrorKind::GroupUnclosed, Span::new(start, start + 1)));
        }
        Ok(node)
    }

    fn group(&mut self, start: usize, kind: GroupKind) -> Result<Option<Node>> {
        let node = self.parse_group_body(start)?;
        Ok(Some(Node::Group(Box::new(Group {
            span: self.span_from(start),
            kind,
            node,
        }))))
    }

    fn lookaround(
        &mut self,
        start: usize,
        kind: LookaroundKind,
    ) -> Result<Lookaround> {
        let node = self.parse_group_body(start)?;
        Ok(Lookaround { span: self.span_from(start), kind, node })
    }

    fn parse_group_inner(&mut self, start: usize) -> Result<Option<Node>> {
        if self.eat('*') {
            return self.parse_verb(start);
        }
        if !self.eat('?') {
            self.capture_index += 1;
            let index = self.capture_index;
            return self.group(start, GroupKind::Capturing { index });
        }
        match self.peek() {
            Some('#') => {
                if self.take_until(')').is_none() {
                    return Err(self.error(
                        ErrorKind::GroupUnclosed,
                        Span::new(start, start + 1),
                    ));
                }
                Ok(None)
            }
            Some(':') => {
                self.pos += 1;
                self.group(start, GroupKind::NonCapturing)
            }
            Some('|') => {
                self.pos += 1;
                self.group(start, GroupKind::BranchReset)
            }
            Some('>') => {
                self.pos += 1;
                self.group(start, GroupKind::Atomic)
            }
            Some('=') | Some('!') => {
                let kind = if self.bump() == Some('=') {
                    LookaroundKind::PositiveLookahead
                } else {
                    LookaroundKind::NegativeLookahead
                };
                let look = self.lookaround(start, kind)?;
                Ok(Some(Node::Lookaround(Box::new(look))))
            }
            Some('<') if matches!(self.peek_at(1), Some('=') | Some('!')) => {
                self.pos += 1;
                let kind = if self.bump() == Some('=') {
                    LookaroundKind::PositiveLookbehind
                } else {
                    LookaroundKind::NegativeLookbehind
                };
                let look = self.lookaround(start, kind)?;
                Ok(Some(Node::Lookaround(Box::new(look))))
            }
            Some('<') => {
                self.pos += 1;
                self.named_group(start, '>')
            }
            Some('\'') => {
                self.pos += 1;
                self.named_group(start, '\'')
            }
            Some('P') => {
                self.pos += 1;
                match self.bump() {
                    Some('<') => self.named_group(start, '>'),
                    Some('=') => {
                        let name = self.parse_name(start, ')')?;
                        Ok(Some(Node::Backreference(Backreference {
                            span: self.span_from(start),
                            target: GroupRef::Named(name),
                        })))
                    }
                    Some('>') => {
                        let name = self.parse_name(start, ')')?;
                        Ok(Some(Node::Subroutine(Subroutine {
                            span: self.span_from(start),
                            target: SubroutineTarget::Group(GroupRef::Named(
                                name,
                            )),
                        })))
                    }
                    _ => Err(self.error(
                        ErrorKind::GroupNameInvalid,
                        self.span_from(start),
                    )),
                }
            }
            Some('R') if self.peek_at(1) == Some(')') => {
                self.pos += 2;
                Ok(Some(Node::Subroutine(Subroutine {
                    span: self.span_from(start),
                    target: SubroutineTarget::Whole,
                })))
            }
            Some('&') => {
                self.pos += 1;
                let name = self.parse_name(start, ')')?;
                Ok(Some(Node::Subroutine(Subroutine {
                    span: self.span_from(start),
                    target: SubroutineTarget::Group(GroupRef::Named(name)),
                })))
            }
            Some(c)
                if c.is_ascii_digit()
                    || (matches!(c, '+' | '-')
                        && self
                            .peek_at(1)
                            .map_or(false, |d| d.is_ascii_digit())) =>
            {
                let text = self.take_until(')').ok_or_else(|| {
                    self.error(
                        ErrorKind::GroupUnclosed,
                        Span::new(start, start + 1),
                    )
                })?;
                let target = match self.group_ref(&text, start)? {
                    GroupRef::Absolute(0) => SubroutineTarget::Whole,
                    other => SubroutineTarget::Group(other),
                };
                Ok(Some(Node::Subroutine(Subroutine {
                    span: self.span_from(start),
                    target,
                })))
            }
            Some('(') => {
                self.pos += 1;
                self.parse_conditional(start).map(Some)
            }
            _ => self.parse_flags(start),
        }
    }

    fn named_group(
        &mut self,
        start: usize,
        terminator: char,
    ) -> Result<Option<Node>> {
        let name = self.parse_name(start, terminator)?;
        self.capture_index += 1;
        let index = self.capture_index;
        self.group(start, GroupKind::Named { name, index })
    }

    /// Parse a group name through `terminator`.
    fn parse_name(&mut self, start: usize, terminator: char) -> Result<String> {
        let name = self.take_until(terminator).ok_or_else(|| {
            self.error(ErrorKind::GroupUnclosed, Span::new(start, start + 1))
        })?;
        if !is_valid_name(&name) {
            return Err(
                self.error(ErrorKind::GroupNameInvalid, self.span_from(start))
            );
        }
        Ok(name)
    }

    fn group_ref(&self, text: &str, start: usize) -> Result<GroupRef> {
        let invalid =
            || self.error(ErrorKind::GroupReferenceInvalid, self.span_from(start));
        if let Some(rest) = text.strip_prefix('+') {
            let n: i32 = rest.parse().map_err(|_| invalid())?;
            return Ok(GroupRef::Relative(n));
        }
        if let Some(rest) = text.strip_prefix('-') {
            let n: i32 = rest.parse().map_err(|_| invalid())?;
            return Ok(GroupRef::Relative(-n));
        }
        if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
            let n: u32 = text.parse().map_err(|_| invalid())?;
            return Ok(GroupRef::Absolute(n));
        }
        if is_valid_name(text) {
            return Ok(GroupRef::Named(text.to_string()));
        }
        Err(invalid())
    }

    fn parse_flags(&mut self, start: usize) -> Result<Option<Node>> {
        let mut enable = String::new();
        let mut disable = String::new();
        let mut negate = false;
        loop {
            let at = self.offset();
            match self.bump() {
                None => {
                    return Err(self.error(
                        ErrorKind::GroupUnclosed,
                        Span::new(start, start + 1),
                    ))
                }
                Some(')') => {
                    return Ok(Some(Node::InlineFlags(Box::new(InlineFlags {
                        span: self.span_from(start),
                        enable,
                        disable,
                        node: None,
                    }))));
                }
                Some(':') => {
                    let node = self.parse_group_body(start)?;
                    return Ok(Some(Node::InlineFlags(Box::new(InlineFlags {
                        span: self.span_from(start),
                        enable,
                        disable,
                        node: Some(node),
                    }))));
                }
                Some('-') if !negate => negate = true,
                Some(c) if c.is_ascii_alphabetic() || c == '^' => {
                    if negate {
                        disable.push(c);
                    } else {
                        enable.push(c);
                    }
                }
                Some(c) => {
                    return Err(self.error(
                        ErrorKind::FlagUnrecognized(c),
                        self.span_from(at),
                    ))
                }
            }
        }
    }

    /// Parse a conditional group. `(?(` is already consumed.
    fn parse_conditional(&mut self, start: usize) -> Result<Node> {
        let cond_start = self.offset();
        let condition = if self.peek() == Some('?')
            && (matches!(self.peek_at(1), Some('=') | Some('!'))
                || self.at_str("?<=")
                || self.at_str("?<!"))
        {
            self.pos += 1;
            let kind = match self.bump() {
                Some('=') => LookaroundKind::PositiveLookahead,
                Some('!') => LookaroundKind::NegativeLookahead,
                _ => {
                    if self.bump() == Some('=') {
                        LookaroundKind::PositiveLookbehind
                    } else {
                        LookaroundKind::NegativeLookbehind
                    }
                }
            };
            Some(Condition::Assertion(self.lookaround(cond_start, kind)?))
        } else {
            let text = self.take_until(')').ok_or_else(|| {
                self.error(ErrorKind::GroupUnclosed, Span::new(start, start + 1))
            })?;
            if text == "DEFINE" {
                None
            } else {
                Some(self.condition(&text, cond_start)?)
            }
        };
        let body = self.parse_group_body(start)?;
        let span = self.span_from(start);
        let condition = match condition {
            None => return Ok(Node::Define(Box::new(Define { span, node: body }))),
            Some(condition) => condition,
        };
        let (yes, no) = match body {
            Node::Alternation(mut alt) if alt.alternatives.len() == 2 => {
                let no = alt.alternatives.pop();
                match alt.alternatives.pop() {
                    Some(yes) => (yes, no),
                    None => (Node::Empty(Span::splat(cond_start)), no),
                }
            }
            Node::Alternation(alt) => {
                return Err(self
                    .error(ErrorKind::ConditionBranchesTooMany, alt.span));
            }
            body => (body, None),
        };
        Ok(Node::Conditional(Box::new(Conditional { span, condition, yes, no })))
    }

    fn condition(&self, text: &str, start: usize) -> Result<Condition> {
        if let Some(rest) = text.strip_prefix("VERSION") {
            let (operator, version) = if let Some(v) = rest.strip_prefix(">=")
            {
                (">=", v)
            } else if let Some(v) = rest.strip_prefix('=') {
                ("=", v)
            } else {
                return Err(self
                    .error(ErrorKind::ConditionInvalid, self.span_from(start)));
            };
            if version.is_empty()
                || !version.chars().all(|c| c.is_ascii_digit() || c == '.')
            {
                return Err(self
                    .error(ErrorKind::ConditionInvalid, self.span_from(start)));
            }
            return Ok(Condition::Version {
                operator: operator.to_string(),
                version: version.to_string(),
            });
        }
        if let Some(rest) = text.strip_prefix('R') {
            if rest.is_empty()
                || rest.starts_with('&')
                || rest.chars().all(|c| c.is_ascii_digit())
            {
                return Ok(Condition::Recursion(rest.to_string()));
            }
        }
        let inner = text
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .or_else(|| {
                text.strip_prefix('\'').and_then(|t| t.strip_suffix('\''))
            })
            .unwrap_or(text);
        self.group_ref(inner, start)
            .map(Condition::Group)
            .map_err(|_| self.error(ErrorKind::ConditionInvalid, self.span_from(start)))
    }

    /// Parse `(*VERB)`, `(*VERB:arg)` and the alphabetic group aliases such
    /// as `(*sr:...)`. `(*` is already consumed.
    fn parse_verb(&mut self, start: usize) -> Result<Option<Node>> {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                name.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.eat(':') {
            let look = match name.as_str() {
                "pla" | "positive_lookahead" => {
                    Some(LookaroundKind::PositiveLookahead)
                }
                "nla" | "negative_lookahead" => {
                    Some(LookaroundKind::NegativeLookahead)
                }
                "plb" | "positive_lookbehind" => {
                    Some(LookaroundKind::PositiveLookbehind)
                }
                "nlb" | "negative_lookbehind" => {
                    Some(LookaroundKind::NegativeLookbehind)
                }
                _ => None,
            };
            if let Some(kind) = look {
                let look = self.lookaround(start, kind)?;
                return Ok(Some(Node::Lookaround(Box::new(look))));
            }
            match name.as_str() {
                "sr" | "script_run" | "asr" | "atomic_script_run" => {
                    let node = self.parse_group_body(start)?;
                    return Ok(Some(Node::ScriptRun(Box::new(ScriptRun {
                        span: self.span_from(start),
                        atomic: name.starts_with('a'),
                        node,
                    }))));
                }
                "atomic" => return self.group(start, GroupKind::Atomic),
                _ => {}
            }
            let argument = self.take_until(')').ok_or_else(|| {
                self.error(ErrorKind::VerbUnclosed, Span::new(start, start + 2))
            })?;
            return Ok(Some(Node::Verb(Verb {
                span: self.span_from(start),
                name,
                argument: Some(argument),
            })));
        }
        if !self.eat(')') {
            return Err(
                self.error(ErrorKind::VerbUnclosed, Span::new(start, start + 2))
            );
        }
        Ok(Some(Node::Verb(Verb {
            span: self.span_from(start),
            name,
            argument: None,
        })))
    }

    /// Parse an escape outside of a class. The backslash is consumed.
    fn parse_escape(&mut self, start: usize) -> Result<Node> {
        let c = match self.bump() {
            Some(c) => c,
            None => {
                return Err(self.error(
                    ErrorKind::EscapeUnexpectedEof,
                    self.span_from(start),
                ))
            }
        };
        let kind = match c {
            'b' => Some(AnchorKind::WordBoundary),
            'B' => Some(AnchorKind::NotWordBoundary),
            'A' => Some(AnchorKind::StartText),
            'z' => Some(AnchorKind::EndText),
            'Z' => Some(AnchorKind::EndTextOptionalNewline),
            'G' => Some(AnchorKind::FirstMatchPosition),
            _ => None,
        };
        if let Some(kind) = kind {
            return Ok(self.anchor(start, kind));
        }
        match c {
            c if is_char_type(c) => Ok(Node::CharType(CharType {
                span: self.span_from(start),
                code: c,
            })),
            'K' => Ok(Node::Keep(self.span_from(start))),
            'p' | 'P' => {
                Ok(Node::UnicodeProperty(self.parse_property(start, c == 'P')?))
            }
            '1'..='9' => {
                let mut n = c.to_digit(10).unwrap_or(0);
                while let Some(d) = self.peek().and_then(|c| c.to_digit(10)) {
                    self.pos += 1;
                    n = n.saturating_mul(10).saturating_add(d);
                }
                Ok(Node::Backreference(Backreference {
                    span: self.span_from(start),
                    target: GroupRef::Absolute(n),
                }))
            }
            'g' => self.parse_g_escape(start),
            'k' => {
                let terminator = match self.bump() {
                    Some('<') => '>',
                    Some('\'') => '\'',
                    Some('{') => '}',
                    _ => {
                        return Err(self.error(
                            ErrorKind::GroupReferenceInvalid,
                            self.span_from(start),
                        ))
                    }
                };
                let name = self.parse_name(start, terminator)?;
                Ok(Node::Backreference(Backreference {
                    span: self.span_from(start),
                    target: GroupRef::Named(name),
                }))
            }
            c => Ok(Node::Literal(self.parse_literal_escape(start, c)?)),
        }
    }

    /// Parse the `\g` family: backreferences and subroutine calls.
    fn parse_g_escape(&mut self, start: usize) -> Result<Node> {
        let text = match self.peek() {
            Some('{') => {
                self.pos += 1;
                self.take_until('}')
            }
            Some(open @ ('<' | '\'')) => {
                self.pos += 1;
                let close = if open == '<' { '>' } else { '\'' };
                let text = self.take_until(close).ok_or_else(|| {
                    self.error(
                        ErrorKind::GroupReferenceInvalid,
                        self.span_from(start),
                    )
                })?;
                let target = match self.group_ref(&text, start)? {
                    GroupRef::Absolute(0) => SubroutineTarget::Whole,
                    other => SubroutineTarget::Group(other),
                };
                return Ok(Node::Subroutine(Subroutine {
                    span: self.span_from(start),
                    target,
                }));
            }
            _ => {
                let mut text = String::new();
                if self.eat('-') {
                    text.push('-');
                } else if self.eat('+') {
                    text.push('+');
                }
                while let Some(c) = self.peek().filter(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                    text.push(c);
                }
                Some(text)
            }
        };
        let text = text.ok_or_else(|| {
            self.error(ErrorKind::GroupReferenceInvalid, self.span_from(start))
        })?;
        let target = self.group_ref(&text, start)?;
        Ok(Node::Backreference(Backreference {
            span: self.span_from(start),
            target,
        }))
    }

    /// Parse `\p{..}`, `\p{^..}` or `\pL`. The `p` or `P` is consumed.
    fn parse_property(
        &mut self,
        start: usize,
        mut negated: bool,
    ) -> Result<UnicodeProperty> {
        let name = if self.eat('{') {
            if self.eat('^') {
                negated = !negated;
            }
            self.take_until('}')
        } else {
            self.bump().filter(|c| c.is_ascii_alphabetic()).map(String::from)
        };
        match name {
            Some(name) if !name.is_empty() => Ok(UnicodeProperty {
                span: self.span_from(start),
                name,
                negated,
            }),
            _ => Err(self.error(ErrorKind::PropertyInvalid, self.span_from(start))),
        }
    }

    /// Parse an escape that denotes a single character. The character after
    /// the backslash is consumed and given as `c`.
    fn parse_literal_escape(&mut self, start: usize, c: char) -> Result<Literal> {
        let (kind, value) = match c {
            'n' => (LiteralKind::Escaped, '\n'),
            'r' => (LiteralKind::Escaped, '\r'),
            't' => (LiteralKind::Escaped, '\t'),
            'f' => (LiteralKind::Escaped, '\x0C'),
            'e' => (LiteralKind::Escaped, '\x1B'),
            'a' => (LiteralKind::Escaped, '\x07'),
            'x' => (LiteralKind::Code, self.parse_hex(start)?),
            'o' => (LiteralKind::Code, self.parse_braced_octal(start)?),
            'c' => (LiteralKind::Code, self.parse_control(start)?),
            '0'..='7' => (LiteralKind::Code, self.parse_octal(start, c)?),
            c if c.is_ascii_alphanumeric() => {
                return Err(self.error(
                    ErrorKind::EscapeUnrecognized(c),
                    self.span_from(start),
                ))
            }
            c => (LiteralKind::Escaped, c),
        };
        Ok(Literal { span: self.span_from(start), kind, c: value })
    }

    fn code_point(&self, start: usize, value: Option<u32>) -> Result<char> {
        value.and_then(char::from_u32).ok_or_else(|| {
            self.error(ErrorKind::EscapeCodeInvalid, self.span_from(start))
        })
    }

    fn parse_hex(&mut self, start: usize) -> Result<char> {
        if self.eat('{') {
            let digits = self.take_until('}').unwrap_or_default();
            let value = if digits.is_empty() {
                None
            } else {
                u32::from_str_radix(&digits, 16).ok()
            };
            return self.code_point(start, value);
        }
        let mut value = 0;
        for _ in 0..2 {
            match self.peek().and_then(|c| c.to_digit(16)) {
                Some(d) => {
                    self.pos += 1;
                    value = value * 16 + d;
                }
                None => break,
            }
        }
        self.code_point(start, Some(value))
    }

    fn parse_braced_octal(&mut self, start: usize) -> Result<char> {
        if !self.eat('{') {
            return Err(
                self.error(ErrorKind::EscapeCodeInvalid, self.span_from(start))
            );
        }
        let digits = self.take_until('}').unwrap_or_default();
        let value = if digits.is_empty() {
            None
        } else {
            u32::from_str_radix(&digits, 8).ok()
        };
        self.code_point(start, value)
    }

    /// Parse up to three octal digits, the first of which is `first`.
    fn parse_octal(&mut self, start: usize, first: char) -> Result<char> {
        let mut value = first.to_digit(8).unwrap_or(0);
        for _ in 0..2 {
            match self.peek().and_then(|c| c.to_digit(8)) {
                Some(d) => {
                    self.pos += 1;
                    value = value * 8 + d;
                }
                None => break,
            }
        }
        self.code_point(start, Some(value))
    }

    fn parse_control(&mut self, start: usize) -> Result<char> {
        match self.bump() {
            Some(c) if c.is_ascii() && !c.is_ascii_control() => {
                let value = (c.to_ascii_uppercase() as u32) ^ 0x40;
                self.code_point(start, Some(value))
            }
            _ => {
                Err(self.error(ErrorKind::EscapeCodeInvalid, self.span_from(start)))
            }
        }
    }

    /// Parse a bracketed class. The opening bracket is consumed.
    fn parse_class(&mut self, start: usize) -> Result<Class> {
        let negated = self.eat('^');
        let mut items = vec![];
        let mut first = true;
        loop {
            let c = match self.peek() {
                Some(c) => c,
                None => {
                    return Err(self.error(
                        ErrorKind::ClassUnclosed,
                        Span::new(start, start + 1),
                    ))
                }
            };
            if c == ']' && !first {
                self.pos += 1;
                break;
            }
            first = false;
            if self.at_str("[:") {
                if let Some(posix) = self.parse_posix()? {
                    items.push(ClassItem::Posix(posix));
                    continue;
                }
            }
            if self.at_str("\\Q") {
                self.pos += 2;
                self.parse_quoted(|lit| items.push(ClassItem::Literal(lit)));
                continue;
            }
            if self.at_str("\\E") {
                self.pos += 2;
                continue;
            }
            let item = self.parse_class_atom(start)?;
            let lo = match item {
                ClassItem::Literal(lo) => lo,
                item => {
                    items.push(item);
                    continue;
                }
            };
            let is_range = self.peek() == Some('-')
                && self.peek_at(1).map_or(false, |c| c != ']');
            if !is_range {
                items.push(ClassItem::Literal(lo));
                continue;
            }
            let dash_start = self.offset();
            self.pos += 1;
            let dash = Literal {
                span: self.span_from(dash_start),
                kind: LiteralKind::Verbatim,
                c: '-',
            };
            match self.parse_class_atom(start)? {
                ClassItem::Literal(hi) => {
                    items.push(ClassItem::Range(ClassRange {
                        span: Span::new(lo.span.start, hi.span.end),
                        start: lo,
                        end: hi,
                    }));
                }
                other => {
                    items.push(ClassItem::Literal(lo));
                    items.push(ClassItem::Literal(dash));
                    items.push(other);
                }
            }
        }
        Ok(Class { span: self.span_from(start), negated, items })
    }

    /// Try to parse `[:name:]` or `[:^name:]`. Returns `None`, consuming
    /// nothing, if the text does not have that shape.
    fn parse_posix(&mut self) -> Result<Option<PosixClass>> {
        let saved = self.pos;
        let start = self.offset();
        self.pos += 2;
        let negated = self.eat('^');
        let mut name = String::new();
        while let Some(c) = self.peek().filter(|c| c.is_ascii_alphabetic()) {
            self.pos += 1;
            name.push(c);
        }
        if name.is_empty() || !self.at_str(":]") {
            self.pos = saved;
            return Ok(None);
        }
        self.pos += 2;
        Ok(Some(PosixClass { span: self.span_from(start), name, negated }))
    }

    fn parse_class_atom(&mut self, class_start: usize) -> Result<ClassItem> {
        let start = self.offset();
        let c = match self.bump() {
            Some(c) => c,
            None => {
                return Err(self.error(
                    ErrorKind::ClassUnclosed,
                    Span::new(class_start, class_start + 1),
                ))
            }
        };
        if c != '\\' {
            return Ok(ClassItem::Literal(Literal {
                span: self.span_from(start),
                kind: LiteralKind::Verbatim,
                c,
            }));
        }
        let c = match self.bump() {
            Some(c) => c,
            None => {
                return Err(self.error(
                    ErrorKind::EscapeUnexpectedEof,
                    self.span_from(start),
                ))
            }
        };
        match c {
            c if is_char_type(c) => Ok(ClassItem::CharType(CharType {
                span: self.span_from(start),
                code: c,
            })),
            'p' | 'P' => Ok(ClassItem::UnicodeProperty(
                self.parse_property(start, c == 'P')?,
            )),
            'b' => Ok(ClassItem::Literal(Literal {
                span: self.span_from(start),
                kind: LiteralKind::Escaped,
                c: '\x08',
            })),
            c => Ok(ClassItem::Literal(self.parse_literal_escape(start, c)?)),
        }
    }
}

fn is_char_type(c: char) -> bool {
    matches!(
        c,
        'd' | 'D'
            | 'w'
            | 'W'
            | 's'
            | 'S'
            | 'h'
            | 'H'
            | 'v'
            | 'V'
            | 'R'
            | 'N'
            | 'X'
            | 'C'
    )
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(pattern: &str) -> Node {
        match Parser::new().parse(pattern) {
            Ok(node) => node,
            Err(err) => panic!("failed to parse {:?}: {}", pattern, err),
        }
    }

    fn parse_err(pattern: &str) -> ErrorKind {
        match Parser::new().parse(pattern) {
            Ok(node) => panic!("expected error for {:?}, got {:?}", pattern, node),
            Err(err) => err.kind().clone(),
        }
    }

    #[test]
    fn literal_sequence() {
        match parse("ab") {
            Node::Sequence(seq) => {
                assert_eq!(seq.nodes.len(), 2);
                assert_eq!(seq.span, Span::new(0, 2));
            }
            node => panic!("unexpected {:?}", node),
        }
    }

    #[test]
    fn alternation_with_empty_branch() {
        match parse("a|") {
            Node::Alternation(alt) => {
                assert_eq!(alt.alternatives.len(), 2);
                assert!(matches!(alt.alternatives[1], Node::Empty(_)));
            }
            node => panic!("unexpected {:?}", node),
        }
    }

    #[test]
    fn repetitions() {
        let cases = [
            ("a*", 0, None),
            ("a+", 1, None),
            ("a?", 0, Some(1)),
            ("a{3}", 3, Some(3)),
            ("a{2,}", 2, None),
            ("a{1,5}", 1, Some(5)),
        ];
        for &(pattern, min, max) in cases.iter() {
            match parse(pattern) {
                Node::Repetition(rep) => {
                    assert_eq!((rep.min, rep.max), (min, max), "{}", pattern);
                    assert_eq!(rep.greediness, Greediness::Greedy);
                }
                node => panic!("unexpected {:?}", node),
            }
        }
    }

    #[test]
    fn repetition_greediness() {
        match parse("a*?") {
            Node::Repetition(rep) => assert_eq!(rep.greediness, Greediness::Lazy),
            node => panic!("unexpected {:?}", node),
        }
        match parse("a++") {
            Node::Repetition(rep) => {
                assert_eq!(rep.greediness, Greediness::Possessive)
            }
            node => panic!("unexpected {:?}", node),
        }
    }

    #[test]
    fn brace_without_count_is_literal() {
        match parse("a{x}") {
            Node::Sequence(seq) => assert_eq!(seq.nodes.len(), 4),
            node => panic!("unexpected {:?}", node),
        }
    }

    #[test]
    fn class_items() {
        match parse("[^a-c\\d[:alpha:]-]") {
            Node::Class(class) => {
                assert!(class.negated);
                assert_eq!(class.items.len(), 4);
                assert!(matches!(class.items[0], ClassItem::Range(_)));
                assert!(matches!(class.items[1], ClassItem::CharType(_)));
                assert!(matches!(class.items[2], ClassItem::Posix(_)));
                assert!(matches!(
                    class.items[3],
                    ClassItem::Literal(Literal { c: '-', .. })
                ));
            }
            node => panic!("unexpected {:?}", node),
        }
    }

    #[test]
    fn class_leading_bracket_is_literal() {
        match parse("[]a]") {
            Node::Class(class) => assert_eq!(class.items.len(), 2),
            node => panic!("unexpected {:?}", node),
        }
    }

    #[test]
    fn code_escapes() {
        for (pattern, expected) in
            [("\\x41", 'A'), ("\\x{263a}", '\u{263a}'), ("\\o{101}", 'A'), ("\\cA", '\x01'), ("\\012", '\n')]
        {
            match parse(pattern) {
                Node::Literal(lit) => {
                    assert_eq!(lit.c, expected, "{}", pattern);
                    assert_eq!(lit.kind, LiteralKind::Code);
                }
                node => panic!("unexpected {:?}", node),
            }
        }
    }

    #[test]
    fn quoted_literals() {
        match parse("\\Qa.b\\E+") {
            Node::Sequence(seq) => {
                assert_eq!(seq.nodes.len(), 3);
                assert!(matches!(seq.nodes[2], Node::Repetition(_)));
            }
            node => panic!("unexpected {:?}", node),
        }
    }

    #[test]
    fn non_regular_constructs_are_parsed() {
        assert!(matches!(parse("(?=a)"), Node::Lookaround(_)));
        assert!(matches!(parse("(?<!a)"), Node::Lookaround(_)));
        assert!(matches!(parse("(*pla:a)"), Node::Lookaround(_)));
        assert!(matches!(parse("\\1"), Node::Backreference(_)));
        assert!(matches!(parse("\\k<x>"), Node::Backreference(_)));
        assert!(matches!(parse("\\g{-1}"), Node::Backreference(_)));
        assert!(matches!(parse("(?P=x)"), Node::Backreference(_)));
        assert!(matches!(parse("(?R)"), Node::Subroutine(_)));
        assert!(matches!(parse("(?-1)"), Node::Subroutine(_)));
        assert!(matches!(parse("(?&x)"), Node::Subroutine(_)));
        assert!(matches!(parse("\\g<1>"), Node::Subroutine(_)));
        assert!(matches!(parse("(?(1)a|b)"), Node::Conditional(_)));
        assert!(matches!(parse("(?(?=a)a)"), Node::Conditional(_)));
        assert!(matches!(parse("(?(DEFINE)a)"), Node::Define(_)));
        assert!(matches!(parse("(*sr:a)"), Node::ScriptRun(_)));
        assert!(matches!(parse("(*FAIL)"), Node::Verb(_)));
        assert!(matches!(parse("(*MARK:x)"), Node::Verb(_)));
        assert!(matches!(parse("(?i)"), Node::InlineFlags(_)));
        assert!(matches!(parse("(?i-s:a)"), Node::InlineFlags(_)));
        assert!(matches!(parse("\\p{Lu}"), Node::UnicodeProperty(_)));
        assert!(matches!(parse("\\K"), Node::Keep(_)));
    }

    #[test]
    fn version_condition() {
        match parse("(?(VERSION>=10.4)a|b)") {
            Node::Conditional(cond) => match cond.condition {
                Condition::Version { ref operator, ref version } => {
                    assert_eq!(operator, ">=");
                    assert_eq!(version, "10.4");
                    assert!(cond.no.is_some());
                }
                ref other => panic!("unexpected {:?}", other),
            },
            node => panic!("unexpected {:?}", node),
        }
    }

    #[test]
    fn comments_are_dropped() {
        assert!(matches!(parse("a(?#comment)"), Node::Literal(_)));
    }

    #[test]
    fn capture_indices() {
        match parse("(a)(?<n>b)") {
            Node::Sequence(seq) => match (&seq.nodes[0], &seq.nodes[1]) {
                (Node::Group(g1), Node::Group(g2)) => {
                    assert_eq!(g1.kind, GroupKind::Capturing { index: 1 });
                    assert_eq!(
                        g2.kind,
                        GroupKind::Named { name: "n".to_string(), index: 2 }
                    );
                }
                other => panic!("unexpected {:?}", other),
            },
            node => panic!("unexpected {:?}", node),
        }
    }

    #[test]
    fn errors() {
        assert_eq!(parse_err("(a"), ErrorKind::GroupUnclosed);
        assert_eq!(parse_err("a)"), ErrorKind::GroupUnopened);
        assert_eq!(parse_err("[a"), ErrorKind::ClassUnclosed);
        assert_eq!(parse_err("*a"), ErrorKind::RepetitionMissing);
        assert_eq!(parse_err("a**"), ErrorKind::RepetitionMissing);
        assert_eq!(parse_err("a{2}{3}"), ErrorKind::RepetitionMissing);
        assert_eq!(parse_err("a{3,2}"), ErrorKind::RepetitionRangeInvalid);
        assert_eq!(
            parse_err("a{99999999999}"),
            ErrorKind::RepetitionCountOverflow
        );
        assert_eq!(parse_err("a\\"), ErrorKind::EscapeUnexpectedEof);
        assert_eq!(parse_err("\\i"), ErrorKind::EscapeUnrecognized('i'));
        assert_eq!(parse_err("(?<1a>x)"), ErrorKind::GroupNameInvalid);
        assert_eq!(parse_err("(?(1)a|b|c)"), ErrorKind::ConditionBranchesTooMany);
        assert_eq!(parse_err("(*FAIL"), ErrorKind::VerbUnclosed);
        assert_eq!(parse_err("(?i%)"), ErrorKind::FlagUnrecognized('%'));
    }

    #[test]
    fn nest_limit() {
        let parser = ParserBuilder::new().nest_limit(2).build();
        assert!(parser.parse("((a))").is_ok());
        let err = parser.parse("(((a)))").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::NestLimitExceeded(2));
    }

    #[test]
    fn spans_are_byte_offsets() {
        let err = Parser::new().parse("é(").unwrap_err();
        assert_eq!(err.span().start, 2);
    }
}
