//! AST node types for the bindscript parser.
//!
//! Nodes are plain owned values built bottom-up by the parser. Nothing in the
//! tree is mutated after it is returned, and every node is `Send + Sync`.

use bindscript_lexer::Position;
use num_bigint::BigInt;
use std::fmt;

/// Source range covered by a node, from the start of its first token to the
/// end (exclusive) of its last token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Span from the start of `self` to the end of `other`.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start, other.end)
    }
}

/// Base trait for all AST nodes.
pub trait Node {
    fn span(&self) -> Span;

    fn pos(&self) -> Position {
        self.span().start
    }

    fn end(&self) -> Position {
        self.span().end
    }
}

macro_rules! impl_node {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Node for $ty {
                fn span(&self) -> Span {
                    self.span
                }
            }
        )*
    };
}

// ============================================================================
// Expressions
// ============================================================================

/// Expression node enumeration.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(Ident),
    Literal(Literal),
    Array(ArrayLit),
    Object(ObjectLit),
    Sequence(SequenceExpr),
    Conditional(Box<ConditionalExpr>),
    Assign(Box<AssignExpr>),
    Arrow(Box<ArrowExpr>),
    Spread(Box<SpreadExpr>),
    Binary(Box<BinaryExpr>),
    Unary(Box<UnaryExpr>),
    Update(Box<UpdateExpr>),
    Call(Box<CallExpr>),
    Member(Box<MemberExpr>),
    Index(Box<IndexExpr>),
    /// Empty parentheses `()` or an elided slot between commas.
    NoArg(NoArg),
    ArrayPattern(ArrayPattern),
    ObjectPattern(ObjectPattern),
}

impl Node for Expr {
    fn span(&self) -> Span {
        match self {
            Expr::Ident(e) => e.span,
            Expr::Literal(e) => e.span,
            Expr::Array(e) => e.span,
            Expr::Object(e) => e.span,
            Expr::Sequence(e) => e.span,
            Expr::Conditional(e) => e.span,
            Expr::Assign(e) => e.span,
            Expr::Arrow(e) => e.span,
            Expr::Spread(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Update(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::Member(e) => e.span,
            Expr::Index(e) => e.span,
            Expr::NoArg(e) => e.span,
            Expr::ArrayPattern(e) => e.span,
            Expr::ObjectPattern(e) => e.span,
        }
    }
}

impl Expr {
    /// How many pairs of parentheses directly enclose this expression.
    /// Only tracked for the node kinds that can become parameter lists.
    pub fn parens(&self) -> u32 {
        match self {
            Expr::Ident(e) => e.parens,
            Expr::Array(e) => e.parens,
            Expr::Object(e) => e.parens,
            Expr::Sequence(e) => e.parens,
            Expr::NoArg(e) => e.parens,
            Expr::ArrayPattern(e) => e.parens,
            Expr::ObjectPattern(e) => e.parens,
            _ => 0,
        }
    }

    /// Record one more enclosing pair of parentheses.
    pub(crate) fn add_parens(&mut self) {
        match self {
            Expr::Ident(e) => e.parens += 1,
            Expr::Array(e) => e.parens += 1,
            Expr::Object(e) => e.parens += 1,
            Expr::Sequence(e) => e.parens += 1,
            Expr::NoArg(e) => e.parens += 1,
            Expr::ArrayPattern(e) => e.parens += 1,
            Expr::ObjectPattern(e) => e.parens += 1,
            _ => {}
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident(e) => write!(f, "{}", e),
            Expr::Literal(e) => write!(f, "{}", e.value),
            Expr::Array(e) => write!(f, "[{}]", join(&e.elements)),
            Expr::Object(e) => {
                let props: Vec<String> = e.properties.iter().map(|p| p.to_string()).collect();
                write!(f, "{{{}}}", props.join(", "))
            }
            Expr::Sequence(e) => write!(f, "({})", join(&e.exprs)),
            Expr::Conditional(e) => {
                write!(f, "({} ? {} : {})", e.test, e.consequent, e.alternate)
            }
            Expr::Assign(e) => write!(f, "({} {} {})", e.target, e.op, e.value),
            Expr::Arrow(e) => write!(f, "(({}) => ...)", join(&e.params)),
            Expr::Spread(e) => write!(f, "...{}", e.argument),
            Expr::Binary(e) => write!(f, "({} {} {})", e.left, e.op, e.right),
            Expr::Unary(e) if e.op == "typeof" => write!(f, "(typeof {})", e.operand),
            Expr::Unary(e) => write!(f, "({}{})", e.op, e.operand),
            Expr::Update(e) if e.prefix => write!(f, "({}{})", e.op, e.operand),
            Expr::Update(e) => write!(f, "({}{})", e.operand, e.op),
            Expr::Call(e) => write!(f, "{}({})", e.callee, join(&e.args)),
            Expr::Member(e) if e.optional => write!(f, "{}?.{}", e.object, e.property),
            Expr::Member(e) => write!(f, "{}.{}", e.object, e.property),
            Expr::Index(e) if e.optional => write!(f, "{}?.[{}]", e.object, e.index),
            Expr::Index(e) => write!(f, "{}[{}]", e.object, e.index),
            Expr::NoArg(_) => Ok(()),
            Expr::ArrayPattern(e) => write!(f, "{}", e),
            Expr::ObjectPattern(e) => write!(f, "{}", e),
        }
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Identifiers and Literals
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub span: Span,
    pub name: String,
    /// Written as `global.name`.
    pub global: bool,
    pub parens: u32,
}

impl Ident {
    pub fn new(span: Span, name: impl Into<String>) -> Self {
        Self {
            span,
            name: name.into(),
            global: false,
            parens: 0,
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.global {
            write!(f, "global.{}", self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub span: Span,
    pub value: LiteralValue,
}

/// Decoded literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Bool(bool),
    Number(f64),
    /// Integer literal outside the exactly representable range of `f64`.
    BigInt(BigInt),
    String(String),
    Regex { pattern: String, flags: String },
    Null,
    Undefined,
    Infinity,
    NaN,
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Bool(b) => write!(f, "{}", b),
            LiteralValue::Number(n) => write!(f, "{}", n),
            LiteralValue::BigInt(n) => write!(f, "{}", n),
            LiteralValue::String(s) => write!(f, "{:?}", s),
            LiteralValue::Regex { pattern, flags } => write!(f, "/{}/{}", pattern, flags),
            LiteralValue::Null => write!(f, "null"),
            LiteralValue::Undefined => write!(f, "undefined"),
            LiteralValue::Infinity => write!(f, "Infinity"),
            LiteralValue::NaN => write!(f, "NaN"),
        }
    }
}

// ============================================================================
// Collection Literals
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLit {
    pub span: Span,
    pub elements: Vec<Expr>,
    pub parens: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectLit {
    pub span: Span,
    pub properties: Vec<Property>,
    pub parens: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Spread(Expr),
    Pair {
        /// An identifier, string or number literal, or the computed
        /// expression of `[key]: value`.
        key: Expr,
        value: Expr,
        computed: bool,
    },
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::Spread(e) => write!(f, "...{}", e),
            Property::Pair {
                key,
                value,
                computed: true,
            } => write!(f, "[{}]: {}", key, value),
            Property::Pair { key, value, .. } => write!(f, "{}: {}", key, value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoArg {
    pub span: Span,
    pub parens: u32,
}

// ============================================================================
// Operator Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct SequenceExpr {
    pub span: Span,
    pub exprs: Vec<Expr>,
    /// Contains an elided slot, as in `a, , b`.
    pub loose: bool,
    pub parens: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalExpr {
    pub span: Span,
    pub test: Expr,
    pub consequent: Expr,
    pub alternate: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignExpr {
    pub span: Span,
    pub op: String,
    /// An identifier, member or index expression, or a destructuring pattern.
    pub target: Expr,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrowExpr {
    pub span: Span,
    pub params: Vec<Pattern>,
    /// A block, or a `return` wrapping the expression body.
    pub body: Stmt,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpreadExpr {
    pub span: Span,
    pub argument: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub span: Span,
    pub op: String,
    pub left: Expr,
    pub right: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub span: Span,
    pub op: String,
    pub operand: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpr {
    pub span: Span,
    pub op: String,
    pub prefix: bool,
    pub operand: Expr,
}

// ============================================================================
// Access Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub span: Span,
    pub callee: Expr,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpr {
    pub span: Span,
    pub object: Expr,
    pub property: String,
    /// Accessed with `?.`.
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpr {
    pub span: Span,
    pub object: Expr,
    pub index: Expr,
    pub optional: bool,
}

// ============================================================================
// Patterns
// ============================================================================

/// A binding target: a plain name or a destructuring pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Ident(Ident),
    Array(ArrayPattern),
    Object(ObjectPattern),
}

impl Node for Pattern {
    fn span(&self) -> Span {
        match self {
            Pattern::Ident(p) => p.span,
            Pattern::Array(p) => p.span,
            Pattern::Object(p) => p.span,
        }
    }
}

impl Pattern {
    /// Names bound by this pattern, in source order.
    pub fn bound_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Pattern::Ident(id) => out.push(&id.name),
            Pattern::Array(arr) => {
                for elem in arr.elements.iter().flatten() {
                    elem.collect_names(out);
                }
            }
            Pattern::Object(obj) => {
                for prop in &obj.properties {
                    prop.value.collect_names(out);
                }
            }
        }
    }
}

impl From<Pattern> for Expr {
    fn from(p: Pattern) -> Self {
        match p {
            Pattern::Ident(id) => Expr::Ident(id),
            Pattern::Array(arr) => Expr::ArrayPattern(arr),
            Pattern::Object(obj) => Expr::ObjectPattern(obj),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Ident(p) => write!(f, "{}", p),
            Pattern::Array(p) => write!(f, "{}", p),
            Pattern::Object(p) => write!(f, "{}", p),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayPattern {
    pub span: Span,
    /// `None` marks an elided position.
    pub elements: Vec<Option<Pattern>>,
    pub parens: u32,
}

impl fmt::Display for ArrayPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let elems: Vec<String> = self
            .elements
            .iter()
            .map(|e| e.as_ref().map(|p| p.to_string()).unwrap_or_default())
            .collect();
        write!(f, "[{}]", elems.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPattern {
    pub span: Span,
    pub properties: Vec<PropertyPattern>,
    pub parens: u32,
}

impl fmt::Display for ObjectPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let props: Vec<String> = self.properties.iter().map(|p| p.to_string()).collect();
        write!(f, "{{{}}}", props.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyPattern {
    pub span: Span,
    pub key: String,
    pub value: Pattern,
}

impl PropertyPattern {
    /// The local name when the property is bound under a different name,
    /// as in `{ key: alias }`.
    pub fn alias(&self) -> Option<&str> {
        match &self.value {
            Pattern::Ident(id) if id.name != self.key => Some(&id.name),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Pattern::Ident(id) if id.name == self.key => write!(f, "{}", self.key),
            value => write!(f, "{}: {}", self.key, value),
        }
    }
}

// ============================================================================
// Statements
// ============================================================================

/// Statement node enumeration.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Empty(EmptyStmt),
    Expr(ExprStmt),
    Decl(DeclStmt),
    Block(BlockStmt),
    If(Box<IfStmt>),
    While(Box<WhileStmt>),
    DoWhile(Box<DoWhileStmt>),
    Return(ReturnStmt),
    Break(BreakStmt),
    Continue(ContinueStmt),
    For(Box<ForStmt>),
    ForIn(Box<ForEachStmt>),
    ForOf(Box<ForEachStmt>),
    Throw(ThrowStmt),
    Try(Box<TryStmt>),
    Switch(SwitchStmt),
    Function(FunctionDecl),
    Import(ImportStmt),
}

impl Node for Stmt {
    fn span(&self) -> Span {
        match self {
            Stmt::Empty(s) => s.span,
            Stmt::Expr(s) => s.span,
            Stmt::Decl(s) => s.span,
            Stmt::Block(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::DoWhile(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::Break(s) => s.span,
            Stmt::Continue(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::ForIn(s) => s.span,
            Stmt::ForOf(s) => s.span,
            Stmt::Throw(s) => s.span,
            Stmt::Try(s) => s.span,
            Stmt::Switch(s) => s.span,
            Stmt::Function(s) => s.span,
            Stmt::Import(s) => s.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmptyStmt {
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub span: Span,
    pub expr: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Let,
    Const,
    Var,
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclKind::Let => write!(f, "let"),
            DeclKind::Const => write!(f, "const"),
            DeclKind::Var => write!(f, "var"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeclStmt {
    pub span: Span,
    pub kind: DeclKind,
    pub declarators: Vec<Declarator>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub span: Span,
    pub target: Pattern,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    pub span: Span,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub span: Span,
    pub test: Expr,
    pub consequent: Stmt,
    pub alternate: Option<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub span: Span,
    pub test: Expr,
    pub body: Stmt,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoWhileStmt {
    pub span: Span,
    pub body: Stmt,
    pub test: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub span: Span,
    pub value: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakStmt {
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContinueStmt {
    pub span: Span,
}

/// Initializer clause of a classic `for (init; test; update)` loop.
#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    Decl(DeclStmt),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub span: Span,
    pub init: Option<ForInit>,
    pub test: Option<Expr>,
    pub update: Option<Expr>,
    pub body: Stmt,
}

/// How the loop variable of a `for ... in` / `for ... of` is introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForBinding {
    None,
    Let,
    Const,
}

/// Shared shape of `for (x in obj)` and `for (x of iter)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForEachStmt {
    pub span: Span,
    pub binding: ForBinding,
    pub name: Ident,
    pub object: Expr,
    pub body: Stmt,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThrowStmt {
    pub span: Span,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TryStmt {
    pub span: Span,
    pub block: BlockStmt,
    pub handler: Option<CatchClause>,
    pub finalizer: Option<BlockStmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub span: Span,
    pub param: Option<Ident>,
    pub body: BlockStmt,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStmt {
    pub span: Span,
    pub discriminant: Expr,
    pub cases: Vec<SwitchCase>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub span: Span,
    /// `None` for the `default` clause.
    pub test: Option<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub span: Span,
    pub name: Ident,
    pub params: Vec<Pattern>,
    pub body: BlockStmt,
    pub exported: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportStmt {
    pub span: Span,
    pub specifiers: Vec<ImportSpecifier>,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpecifier {
    pub span: Span,
    /// Name exported by the module.
    pub imported: Ident,
    /// Name bound in the importing scope.
    pub local: Ident,
}

impl_node!(
    Ident,
    Literal,
    ArrayLit,
    ObjectLit,
    NoArg,
    SequenceExpr,
    ConditionalExpr,
    AssignExpr,
    ArrowExpr,
    SpreadExpr,
    BinaryExpr,
    UnaryExpr,
    UpdateExpr,
    CallExpr,
    MemberExpr,
    IndexExpr,
    ArrayPattern,
    ObjectPattern,
    PropertyPattern,
    EmptyStmt,
    ExprStmt,
    DeclStmt,
    Declarator,
    BlockStmt,
    IfStmt,
    WhileStmt,
    DoWhileStmt,
    ReturnStmt,
    BreakStmt,
    ContinueStmt,
    ForStmt,
    ForEachStmt,
    ThrowStmt,
    TryStmt,
    CatchClause,
    SwitchStmt,
    SwitchCase,
    FunctionDecl,
    ImportStmt,
    ImportSpecifier,
);
