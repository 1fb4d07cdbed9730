//! Flat per-function frame layout.
//!
//! One 8-byte slot per unique name introduced by a function: its
//! parameters, then every `let` encountered walking the body depth-first
//! in source order. A name reintroduced by a `let` in a sibling branch
//! (e.g. both arms of an `if`) is deliberately folded into the slot
//! already assigned to its first appearance — safe here because Nova has
//! no closures or escaping references, so nothing can observe two
//! "different" bindings of the same name aliasing one slot.

use nova_par::{Block, FunctionDef, Stmt};
use std::collections::HashMap;

pub struct Frame {
    pub offsets: HashMap<String, i64>,
    /// Total frame size in bytes, rounded up to a multiple of 16.
    pub size: i64,
}

pub fn layout(function: &FunctionDef) -> Frame {
    let mut names: Vec<String> = Vec::new();
    for param in &function.params {
        push_unique(&mut names, &param.name);
    }
    collect_locals(&function.body, &mut names);

    let mut offsets = HashMap::with_capacity(names.len());
    for (i, name) in names.iter().enumerate() {
        offsets.insert(name.clone(), ((i as i64) + 1) * 8);
    }
    let raw_size = (names.len() as i64) * 8;
    let size = (raw_size + 15) / 16 * 16;
    Frame { offsets, size }
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}

fn collect_locals(block: &Block, names: &mut Vec<String>) {
    for stmt in &block.statements {
        match stmt {
            Stmt::Let { name, .. } => push_unique(names, name),
            Stmt::If {
                then_block,
                else_block,
                ..
            } => {
                collect_locals(then_block, names);
                if let Some(else_block) = else_block {
                    collect_locals(else_block, names);
                }
            }
            Stmt::While { body, .. } => collect_locals(body, names),
            Stmt::Assign { .. } | Stmt::Return { .. } | Stmt::ExprStmt(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_lex::Lexer;
    use nova_par::Parser;

    fn layout_of(src: &str) -> Frame {
        let tokens = Lexer::tokenize(src).unwrap();
        let program = Parser::parse(tokens).unwrap();
        layout(&program.functions[0])
    }

    #[test]
    fn frame_size_is_16_byte_aligned() {
        let f = layout_of("fn f(a: int) { let b: int = 1; let c: int = 2; }");
        assert_eq!(f.size % 16, 0);
        assert_eq!(f.offsets.len(), 3);
    }

    #[test]
    fn sibling_branches_share_a_slot() {
        let f = layout_of(
            "fn f() { if (true) { let x: int = 1; } else { let x: int = 2; } }",
        );
        assert_eq!(f.offsets.len(), 1);
    }

    #[test]
    fn empty_function_has_zero_size() {
        let f = layout_of("fn f() {}");
        assert_eq!(f.size, 0);
    }
}
