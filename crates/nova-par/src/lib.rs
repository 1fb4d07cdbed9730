//! Recursive-descent parsing of a Nova token stream into an abstract
//! syntax tree.
//!
//! The grammar is stratified by precedence level (logical-or down through
//! primary expressions) rather than table-driven, mirroring the explicit
//! per-level grammar this parser implements one rule at a time.

mod ast;
mod error;
mod parser;

pub use ast::{
    BinaryOp, Block, Expr, ExprKind, FunctionDef, Param, Program, Stmt, Type, UnaryOp,
};
pub use error::ParseError;
pub use parser::Parser;
