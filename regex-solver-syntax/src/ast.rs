/*!
The abstract syntax tree produced by the parser.

The tree is deliberately faithful to the surface syntax: constructs that are
not regular (lookaround, backreferences, conditionals and so on) are still
represented here so that downstream consumers can reject them with a precise
position instead of failing at parse time.
*/

/// A half-open range of byte offsets into the pattern.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Span {
        Span { start, end }
    }

    pub fn splat(offset: usize) -> Span {
        Span::new(offset, offset)
    }
}

/// A single node of the syntax tree.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Node {
    /// The empty regex, e.g. `()` or an empty alternative.
    Empty(Span),
    Literal(Literal),
    /// `.`
    Dot(Span),
    /// A character type escape such as `\d` or `\h`.
    CharType(CharType),
    /// A bracketed class such as `[a-z]`.
    Class(Class),
    /// `\p{..}` or `\P{..}` outside of a class.
    UnicodeProperty(UnicodeProperty),
    Anchor(Anchor),
    Group(Box<Group>),
    Alternation(Alternation),
    Sequence(Sequence),
    Repetition(Box<Repetition>),
    Lookaround(Box<Lookaround>),
    /// `(?i)` or `(?i:...)`.
    InlineFlags(Box<InlineFlags>),
    Backreference(Backreference),
    Conditional(Box<Conditional>),
    /// `(?(DEFINE)...)`
    Define(Box<Define>),
    /// `(?R)`, `(?1)`, `(?&name)`, `\g<name>` and friends.
    Subroutine(Subroutine),
    /// `(*sr:...)` and `(*asr:...)`.
    ScriptRun(Box<ScriptRun>),
    /// Backtracking control verbs such as `(*FAIL)` or `(*SKIP)`.
    Verb(Verb),
    /// `\K`
    Keep(Span),
}

impl Node {
    /// Returns the span of this node.
    pub fn span(&self) -> Span {
        match *self {
            Node::Empty(span) | Node::Dot(span) | Node::Keep(span) => span,
            Node::Literal(ref x) => x.span,
            Node::CharType(ref x) => x.span,
            Node::Class(ref x) => x.span,
            Node::UnicodeProperty(ref x) => x.span,
            Node::Anchor(ref x) => x.span,
            Node::Group(ref x) => x.span,
            Node::Alternation(ref x) => x.span,
            Node::Sequence(ref x) => x.span,
            Node::Repetition(ref x) => x.span,
            Node::Lookaround(ref x) => x.span,
            Node::InlineFlags(ref x) => x.span,
            Node::Backreference(ref x) => x.span,
            Node::Conditional(ref x) => x.span,
            Node::Define(ref x) => x.span,
            Node::Subroutine(ref x) => x.span,
            Node::ScriptRun(ref x) => x.span,
            Node::Verb(ref x) => x.span,
        }
    }

    /// Returns true if this node is an anchor of any kind.
    pub fn is_anchor(&self) -> bool {
        matches!(*self, Node::Anchor(_))
    }
}

/// How a literal was written in the pattern.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LiteralKind {
    /// The character appeared as itself.
    Verbatim,
    /// A backslash escape such as `\.` or `\n`.
    Escaped,
    /// A numeric code such as `\x41`, `\x{263a}`, `\o{101}` or `\cA`.
    Code,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Literal {
    pub span: Span,
    pub kind: LiteralKind,
    pub c: char,
}

/// A character type escape. `code` is the letter following the backslash.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CharType {
    pub span: Span,
    pub code: char,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Class {
    pub span: Span,
    pub negated: bool,
    pub items: Vec<ClassItem>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ClassItem {
    Literal(Literal),
    Range(ClassRange),
    CharType(CharType),
    /// `[:alpha:]` and friends.
    Posix(PosixClass),
    UnicodeProperty(UnicodeProperty),
}

impl ClassItem {
    pub fn span(&self) -> Span {
        match *self {
            ClassItem::Literal(ref x) => x.span,
            ClassItem::Range(ref x) => x.span,
            ClassItem::CharType(ref x) => x.span,
            ClassItem::Posix(ref x) => x.span,
            ClassItem::UnicodeProperty(ref x) => x.span,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ClassRange {
    pub span: Span,
    pub start: Literal,
    pub end: Literal,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PosixClass {
    pub span: Span,
    pub name: String,
    pub negated: bool,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnicodeProperty {
    pub span: Span,
    pub name: String,
    pub negated: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AnchorKind {
    /// `^`
    StartLine,
    /// `$`
    EndLine,
    /// `\A`
    StartText,
    /// `\z`
    EndText,
    /// `\Z`
    EndTextOptionalNewline,
    /// `\b`
    WordBoundary,
    /// `\B`
    NotWordBoundary,
    /// `\G`
    FirstMatchPosition,
}

impl AnchorKind {
    /// True for anchors that pin a match to the start of the subject.
    pub fn is_start(&self) -> bool {
        matches!(*self, AnchorKind::StartLine | AnchorKind::StartText)
    }

    /// True for anchors that pin a match to the end of the subject.
    pub fn is_end(&self) -> bool {
        matches!(
            *self,
            AnchorKind::EndLine
                | AnchorKind::EndText
                | AnchorKind::EndTextOptionalNewline
        )
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Anchor {
    pub span: Span,
    pub kind: AnchorKind,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GroupKind {
    Capturing { index: u32 },
    Named { name: String, index: u32 },
    NonCapturing,
    /// `(?|...)`
    BranchReset,
    /// `(?>...)`
    Atomic,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Group {
    pub span: Span,
    pub kind: GroupKind,
    pub node: Node,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Alternation {
    pub span: Span,
    pub alternatives: Vec<Node>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Sequence {
    pub span: Span,
    pub nodes: Vec<Node>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Greediness {
    Greedy,
    Lazy,
    Possessive,
}

/// A repetition. `?`, `*` and `+` are desugared into counted form, so `a*`
/// has `min == 0` and `max == None`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Repetition {
    pub span: Span,
    pub min: u32,
    pub max: Option<u32>,
    pub greediness: Greediness,
    pub node: Node,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LookaroundKind {
    PositiveLookahead,
    NegativeLookahead,
    PositiveLookbehind,
    NegativeLookbehind,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Lookaround {
    pub span: Span,
    pub kind: LookaroundKind,
    pub node: Node,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InlineFlags {
    pub span: Span,
    pub enable: String,
    pub disable: String,
    /// `None` for `(?i)`, which applies to the rest of the enclosing group.
    pub node: Option<Node>,
}

/// A reference to a capturing group.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GroupRef {
    Absolute(u32),
    Relative(i32),
    Named(String),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Backreference {
    pub span: Span,
    pub target: GroupRef,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Condition {
    /// `(?(1)...)`, `(?(<name>)...)`
    Group(GroupRef),
    /// `(?(R)...)`, `(?(R2)...)`, `(?(R&name)...)`
    Recursion(String),
    /// `(?(?=...)...)`
    Assertion(Lookaround),
    /// `(?(VERSION>=10.4)...)`
    Version { operator: String, version: String },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Conditional {
    pub span: Span,
    pub condition: Condition,
    pub yes: Node,
    pub no: Option<Node>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Define {
    pub span: Span,
    pub node: Node,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SubroutineTarget {
    /// `(?R)` or `(?0)`
    Whole,
    Group(GroupRef),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Subroutine {
    pub span: Span,
    pub target: SubroutineTarget,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScriptRun {
    pub span: Span,
    pub atomic: bool,
    pub node: Node,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Verb {
    pub span: Span,
    pub name: String,
    pub argument: Option<String>,
}
