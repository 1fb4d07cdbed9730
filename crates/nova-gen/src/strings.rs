//! String-literal interning.
//!
//! A prepass over the whole program collects every distinct string
//! literal's label in first-appearance order — functions in source
//! order, statements in source order, expressions left to right — before
//! any assembly is emitted, so the `.rodata` section can be written in one
//! shot ahead of `.text`.

use indexmap::IndexMap;
use nova_par::{Block, Expr, ExprKind, Program, Stmt};

/// Maps literal text to its assigned `.Lstr<N>` label, in first-appearance
/// order. Two literals with identical text share a label.
pub fn intern_strings(program: &Program) -> IndexMap<String, String> {
    let mut labels = IndexMap::new();
    for function in &program.functions {
        walk_block(&function.body, &mut labels);
    }
    labels
}

fn walk_block(block: &Block, labels: &mut IndexMap<String, String>) {
    for stmt in &block.statements {
        walk_stmt(stmt, labels);
    }
}

fn walk_stmt(stmt: &Stmt, labels: &mut IndexMap<String, String>) {
    match stmt {
        Stmt::Let { value, .. } => walk_expr(value, labels),
        Stmt::Assign { value, .. } => walk_expr(value, labels),
        Stmt::If {
            cond,
            then_block,
            else_block,
        } => {
            walk_expr(cond, labels);
            walk_block(then_block, labels);
            if let Some(else_block) = else_block {
                walk_block(else_block, labels);
            }
        }
        Stmt::While { cond, body } => {
            walk_expr(cond, labels);
            walk_block(body, labels);
        }
        Stmt::Return { value: Some(v), .. } => walk_expr(v, labels),
        Stmt::Return { value: None, .. } => {}
        Stmt::ExprStmt(expr) => walk_expr(expr, labels),
    }
}

fn walk_expr(expr: &Expr, labels: &mut IndexMap<String, String>) {
    match &expr.kind {
        ExprKind::StringLiteral(s) => {
            if !labels.contains_key(s) {
                let label = format!(".Lstr{}", labels.len());
                labels.insert(s.clone(), label);
            }
        }
        ExprKind::Unary(_, operand) => walk_expr(operand, labels),
        ExprKind::Binary(left, _, right) => {
            walk_expr(left, labels);
            walk_expr(right, labels);
        }
        ExprKind::Call(_, args) => {
            for arg in args {
                walk_expr(arg, labels);
            }
        }
        ExprKind::IntLiteral(_) | ExprKind::BoolLiteral(_) | ExprKind::VarRef(_) => {}
    }
}

/// Escapes a string literal's bytes for a GNU-as `.asciz` directive:
/// backslash, double quote, newline, and tab are the only bytes Nova's
/// lexer can have produced via escapes that also need re-escaping here.
pub fn escape_asciz(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}
