//! The Nova abstract syntax tree.
//!
//! The statement and expression hierarchies are closed sets of variants —
//! tagged sums, not an open class hierarchy — matching the grammar in
//! the design: there is no extension point a user program can widen.

use nova_lex::Token;

/// The four-member primitive type alphabet. A non-primitive type name is
/// parsed as [`Type::Named`] and rejected later, during checking — the
/// parser itself never rejects a type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Bool,
    String,
    Void,
    Named(String),
}

impl Type {
    pub fn from_name(name: &str) -> Type {
        match name {
            "int" => Type::Int,
            "bool" => Type::Bool,
            "string" => Type::String,
            "void" => Type::Void,
            other => Type::Named(other.to_string()),
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Bool => write!(f, "bool"),
            Type::String => write!(f, "string"),
            Type::Void => write!(f, "void"),
            Type::Named(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Eq,
    NotEq,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub functions: Vec<FunctionDef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub type_name: Option<Type>,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Option<Type>,
    pub body: Block,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Let {
        name: String,
        declared_type: Option<Type>,
        value: Expr,
        line: u32,
    },
    Assign {
        name: String,
        value: Expr,
        line: u32,
    },
    If {
        cond: Expr,
        then_block: Block,
        else_block: Option<Block>,
    },
    While {
        cond: Expr,
        body: Block,
    },
    Return {
        value: Option<Expr>,
        line: u32,
    },
    ExprStmt(Expr),
}

/// An expression node. `inferred_type` starts `None` after parsing and is
/// written exactly once, by the type checker, before code generation reads
/// it — the mutable-field design the spec calls out explicitly, kept here
/// rather than as a parallel table since the whole tree is owned by a
/// single compiler invocation and never touched concurrently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: u32,
    pub column: u32,
    pub inferred_type: Option<Type>,
}

impl Expr {
    pub fn new(kind: ExprKind, line: u32, column: u32) -> Self {
        Self {
            kind,
            line,
            column,
            inferred_type: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    IntLiteral(i64),
    BoolLiteral(bool),
    StringLiteral(String),
    VarRef(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(Box<Expr>, BinaryOp, Box<Expr>),
    Call(String, Vec<Expr>),
}

/// Used by the parser to report "expected an identifier, found X" style
/// messages without re-deriving a display string per call site.
pub(crate) fn describe(token: &Token) -> String {
    format!("{:?}", token.kind)
}
