//! Input AST shapes for the assignment-and-access codegen core.
//!
//! The parser and full AST live upstream (out of scope for this core, per
//! the system overview); what's here is the minimal contract this core
//! consumes: assignment statements and the expression sub-grammar that can
//! appear as their left- and right-hand sides. A driver assembling a real
//! parse tree maps its own nodes into these shapes before calling into this
//! crate.

/// Source-level operator token, before translation to its C equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    ShlAssign,
    ShrAssign,
}

impl SourceOp {
    /// The fixed operator translation table from the wire contract.
    pub fn c_op(self) -> &'static str {
        match self {
            SourceOp::Assign => "=",
            SourceOp::AddAssign => "+=",
            SourceOp::SubAssign => "-=",
            SourceOp::MulAssign => "*=",
            SourceOp::DivAssign => "/=",
            SourceOp::ModAssign => "%=",
            SourceOp::AndAssign => "&=",
            SourceOp::OrAssign => "|=",
            SourceOp::XorAssign => "^=",
            SourceOp::ShlAssign => "<<=",
            SourceOp::ShrAssign => ">>=",
        }
    }

    /// `cOp == "=" iff isCompound == false`.
    pub fn is_compound(self) -> bool {
        !matches!(self, SourceOp::Assign)
    }

    /// The bare arithmetic/bitwise operator this compound form expands from,
    /// used by handlers that need to re-derive the non-compound op (e.g. the
    /// clamp helper suffix, or the `SIMPLE` fallback's widened re-expansion).
    pub fn base_op(self) -> Option<&'static str> {
        match self {
            SourceOp::Assign => None,
            SourceOp::AddAssign => Some("+"),
            SourceOp::SubAssign => Some("-"),
            SourceOp::MulAssign => Some("*"),
            SourceOp::DivAssign => Some("/"),
            SourceOp::ModAssign => Some("%"),
            SourceOp::AndAssign => Some("&"),
            SourceOp::OrAssign => Some("|"),
            SourceOp::XorAssign => Some("^"),
            SourceOp::ShlAssign => Some("<<"),
            SourceOp::ShrAssign => Some(">>"),
        }
    }
}

/// Binary operators in the expression sub-grammar, in the precedence order
/// spec'd by the wire contract: `||` binds loosest, `%` tightest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    BitOr,
    BitXor,
    BitAnd,
    Shl,
    Shr,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    /// Higher binds tighter. Mirrors standard C precedence, which is what
    /// the source language's binary chain is defined to match.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq | BinaryOp::Ne => 3,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 4,
            BinaryOp::BitOr => 5,
            BinaryOp::BitXor => 6,
            BinaryOp::BitAnd => 7,
            BinaryOp::Shl | BinaryOp::Shr => 8,
            BinaryOp::Add | BinaryOp::Sub => 9,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 10,
        }
    }

    pub fn c_symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::BitAnd => "&",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }

    /// Additive and multiplicative operators fold at compile time when both
    /// operands fold (§4.4); comparisons and shifts never do here.
    pub fn folds(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Neg,
    BitNot,
    AddrOf,
}

/// Integer literal suffix as written in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IntSuffix {
    #[default]
    None,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
}

/// Float literal suffix as written in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FloatSuffix {
    #[default]
    F64,
    F32,
}

/// Property pseudo-field accessed via `.capacity`, `.size`, etc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Capacity,
    Size,
    BitLength,
    ByteLength,
    ElementCount,
    CharCount,
    /// The deprecated `.length` name; always rejected by the emitter.
    LegacyLength,
}

/// One element of a postfix chain, in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum PostfixOp {
    /// `.member` or `.Enum_Value`-style member access.
    Member(String),
    /// `[i]` single-expression subscript.
    Index(Box<Expr>),
    /// `[start, width]` two-expression subscript (bit range or array slice).
    Slice(Box<Expr>, Box<Expr>),
    /// `(args...)` call.
    Call(Vec<Expr>),
    /// `.capacity`, `.char_count`, etc.
    Property(Property),
}

/// The expression sub-grammar: literals, unary/binary operators, and
/// arbitrary postfix chains rooted at an identifier or the `this`/`global`
/// keywords.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    IntLiteral(i64, IntSuffix),
    FloatLiteral(f64, FloatSuffix),
    BoolLiteral(bool),
    StringLiteral(String),
    Identifier(String),
    /// The `this` keyword, resolved against the current scope.
    This,
    /// The `global` keyword, prefixing a cross-scope or plain-global reference.
    Global,
    /// `args`, the reserved name carrying `argc`/`argv` in `main`.
    Args,
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// A primary expression followed by zero or more postfix operations.
    /// Context building and the expression emitter both fold over `ops`
    /// left to right.
    Postfix(Box<Expr>, Vec<PostfixOp>),
}

impl Expr {
    /// Split a (possibly bare) LHS/RHS expression into its primary root and
    /// postfix chain, so callers don't need to match on `Postfix` directly.
    pub fn decompose(&self) -> (&Expr, &[PostfixOp]) {
        match self {
            Expr::Postfix(base, ops) => (base.as_ref(), ops.as_slice()),
            other => (other, &[]),
        }
    }
}

/// One assignment statement, the sole statement shape this core handles.
/// Everything else (control flow, declarations) is emitted by external
/// collaborators.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentStmt {
    pub target: Expr,
    pub op: SourceOp,
    pub value: Expr,
    /// 1-indexed source line, when known, for diagnostics.
    pub line: Option<u32>,
    pub column: Option<u32>,
}
