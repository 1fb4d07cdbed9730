//! A single pass over the typed AST emitting GNU-as, Intel-syntax,
//! System V x86-64 assembly text.

use crate::frame::{self, Frame};
use crate::strings::{escape_asciz, intern_strings};
use indexmap::IndexMap;
use nova_par::{BinaryOp, Block, Expr, ExprKind, FunctionDef, Program, Stmt, Type, UnaryOp};

const PARAM_REGS: [&str; 6] = ["rdi", "rsi", "rdx", "rcx", "r8", "r9"];
const FMT_INT_LABEL: &str = ".LC_fmt_int";

pub struct Codegen {
    lines: Vec<String>,
    label_counter: u32,
    frame: Frame,
    string_labels: IndexMap<String, String>,
}

/// Generates the full assembly text for a checked program. The program
/// must already have passed [`nova_sem::check`] — every expression is
/// expected to carry an `inferred_type`.
pub fn generate(program: &Program) -> String {
    tracing::debug!(functions = program.functions.len(), "generating assembly");
    let string_labels = intern_strings(program);
    tracing::debug!(strings = string_labels.len(), "interned string literals");
    let mut gen = Codegen {
        lines: Vec::new(),
        label_counter: 0,
        frame: Frame {
            offsets: Default::default(),
            size: 0,
        },
        string_labels,
    };
    gen.emit_preamble();
    for function in &program.functions {
        gen.emit_function(function);
    }
    let mut text = gen.lines.join("\n");
    text.push('\n');
    tracing::debug!(lines = gen.lines.len(), "assembly generation finished");
    text
}

impl Codegen {
    fn emit(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn emit_indented(&mut self, line: impl std::fmt::Display) {
        self.lines.push(format!("    {line}"));
    }

    fn new_label(&mut self, prefix: &str) -> String {
        let label = format!(".L{prefix}{}", self.label_counter);
        self.label_counter += 1;
        label
    }

    fn emit_preamble(&mut self) {
        self.emit(".intel_syntax noprefix");
        self.emit(".section .rodata");
        self.emit(format!("{FMT_INT_LABEL}:"));
        self.emit_indented(".asciz \"%ld\\n\"");
        for (text, label) in self.string_labels.clone() {
            self.emit(format!("{label}:"));
            self.emit_indented(format!(".asciz \"{}\"", escape_asciz(&text)));
        }
        self.emit(".text");
        self.emit(".globl main");
        self.emit(".extern printf");
        self.emit(".extern puts");
    }

    fn emit_function(&mut self, function: &FunctionDef) {
        self.frame = frame::layout(function);
        self.emit(format!("{}:", function.name));
        self.emit_indented("push rbp");
        self.emit_indented("mov rbp, rsp");
        if self.frame.size > 0 {
            self.emit_indented(format!("sub rsp, {}", self.frame.size));
        }
        for (i, param) in function.params.iter().enumerate() {
            let offset = self.frame.offsets[&param.name];
            self.emit_indented(format!("mov [rbp-{offset}], {}", PARAM_REGS[i]));
        }
        self.emit_block(&function.body);
        self.emit_indented("mov rax, 0");
        self.emit_indented("leave");
        self.emit_indented("ret");
    }

    fn emit_block(&mut self, block: &Block) {
        for stmt in &block.statements {
            self.emit_stmt(stmt);
        }
    }

    fn emit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Let { name, value, .. } => {
                self.emit_expr(value);
                let offset = self.frame.offsets[name];
                self.emit_indented(format!("mov [rbp-{offset}], rax"));
            }
            Stmt::Assign { name, value, .. } => {
                self.emit_expr(value);
                let offset = self.frame.offsets[name];
                self.emit_indented(format!("mov [rbp-{offset}], rax"));
            }
            Stmt::If {
                cond,
                then_block,
                else_block,
            } => {
                let else_label = self.new_label("else");
                let end_label = self.new_label("endif");
                self.emit_expr(cond);
                self.emit_indented("cmp rax, 0");
                self.emit_indented(format!("je {else_label}"));
                self.emit_block(then_block);
                self.emit_indented(format!("jmp {end_label}"));
                self.emit(format!("{else_label}:"));
                if let Some(else_block) = else_block {
                    self.emit_block(else_block);
                }
                self.emit(format!("{end_label}:"));
            }
            Stmt::While { cond, body } => {
                let top_label = self.new_label("while");
                let end_label = self.new_label("endwhile");
                self.emit(format!("{top_label}:"));
                self.emit_expr(cond);
                self.emit_indented("cmp rax, 0");
                self.emit_indented(format!("je {end_label}"));
                self.emit_block(body);
                self.emit_indented(format!("jmp {top_label}"));
                self.emit(format!("{end_label}:"));
            }
            Stmt::Return { value, .. } => {
                match value {
                    Some(expr) => self.emit_expr(expr),
                    None => self.emit_indented("mov rax, 0"),
                }
                self.emit_indented("leave");
                self.emit_indented("ret");
            }
            Stmt::ExprStmt(expr) => self.emit_expr(expr),
        }
    }

    /// Emits code that leaves the expression's value in `rax`.
    fn emit_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::IntLiteral(value) => self.emit_indented(format!("mov rax, {value}")),
            ExprKind::BoolLiteral(value) => {
                self.emit_indented(format!("mov rax, {}", if *value { 1 } else { 0 }))
            }
            ExprKind::StringLiteral(text) => {
                let label = self.string_labels[text].clone();
                self.emit_indented(format!("lea rax, [rel {label}]"));
            }
            ExprKind::VarRef(name) => {
                let offset = self.frame.offsets[name];
                self.emit_indented(format!("mov rax, [rbp-{offset}]"));
            }
            ExprKind::Unary(op, operand) => self.emit_unary(*op, operand),
            ExprKind::Binary(left, op, right) => self.emit_binary(left, *op, right),
            ExprKind::Call(name, args) => self.emit_call(name, args),
        }
    }

    fn emit_unary(&mut self, op: UnaryOp, operand: &Expr) {
        self.emit_expr(operand);
        match op {
            UnaryOp::Neg => self.emit_indented("neg rax"),
            UnaryOp::Not => {
                self.emit_indented("cmp rax, 0");
                self.emit_indented("sete al");
                self.emit_indented("movzx rax, al");
            }
        }
    }

    fn emit_binary(&mut self, left: &Expr, op: BinaryOp, right: &Expr) {
        match op {
            BinaryOp::And => return self.emit_short_circuit_and(left, right),
            BinaryOp::Or => return self.emit_short_circuit_or(left, right),
            _ => {}
        }

        self.emit_expr(left);
        self.emit_indented("push rax");
        self.emit_expr(right);
        self.emit_indented("pop rbx");

        match op {
            BinaryOp::Add => self.emit_indented("add rax, rbx"),
            BinaryOp::Sub => {
                self.emit_indented("sub rbx, rax");
                self.emit_indented("mov rax, rbx");
            }
            BinaryOp::Mul => self.emit_indented("imul rax, rbx"),
            BinaryOp::Div => {
                self.emit_indented("mov rcx, rax");
                self.emit_indented("mov rax, rbx");
                self.emit_indented("mov rdx, 0");
                self.emit_indented("idiv rcx");
            }
            BinaryOp::Lt => self.emit_comparison("l"),
            BinaryOp::Gt => self.emit_comparison("g"),
            BinaryOp::LtEq => self.emit_comparison("le"),
            BinaryOp::GtEq => self.emit_comparison("ge"),
            BinaryOp::Eq => self.emit_comparison("e"),
            BinaryOp::NotEq => self.emit_comparison("ne"),
            BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
        }
    }

    fn emit_comparison(&mut self, cc: &str) {
        self.emit_indented("cmp rbx, rax");
        self.emit_indented(format!("set{cc} al"));
        self.emit_indented("movzx rax, al");
    }

    fn emit_short_circuit_and(&mut self, left: &Expr, right: &Expr) {
        let sink_label = self.new_label("andfalse");
        let end_label = self.new_label("andend");
        self.emit_expr(left);
        self.emit_indented("cmp rax, 0");
        self.emit_indented(format!("je {sink_label}"));
        self.emit_expr(right);
        self.emit_indented("cmp rax, 0");
        self.emit_indented("setne al");
        self.emit_indented("movzx rax, al");
        self.emit_indented(format!("jmp {end_label}"));
        self.emit(format!("{sink_label}:"));
        self.emit_indented("mov rax, 0");
        self.emit(format!("{end_label}:"));
    }

    fn emit_short_circuit_or(&mut self, left: &Expr, right: &Expr) {
        let sink_label = self.new_label("ortrue");
        let end_label = self.new_label("orend");
        self.emit_expr(left);
        self.emit_indented("cmp rax, 0");
        self.emit_indented(format!("jne {sink_label}"));
        self.emit_expr(right);
        self.emit_indented("cmp rax, 0");
        self.emit_indented("setne al");
        self.emit_indented("movzx rax, al");
        self.emit_indented(format!("jmp {end_label}"));
        self.emit(format!("{sink_label}:"));
        self.emit_indented("mov rax, 1");
        self.emit(format!("{end_label}:"));
    }

    fn emit_call(&mut self, name: &str, args: &[Expr]) {
        if name == "print" {
            let arg = &args[0];
            self.emit_expr(arg);
            match arg.inferred_type {
                Some(Type::String) => {
                    self.emit_indented("mov rdi, rax");
                    self.emit_indented("call puts");
                }
                _ => {
                    self.emit_indented("mov rsi, rax");
                    self.emit_indented(format!("lea rdi, [rel {FMT_INT_LABEL}]"));
                    self.emit_indented("xor eax, eax");
                    self.emit_indented("call printf");
                }
            }
            self.emit_indented("mov rax, 0");
            return;
        }

        for (i, arg) in args.iter().enumerate() {
            self.emit_expr(arg);
            self.emit_indented(format!("mov {}, rax", PARAM_REGS[i]));
        }
        self.emit_indented(format!("call {name}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_lex::Lexer;
    use nova_par::Parser;

    fn compile(src: &str) -> String {
        let tokens = Lexer::tokenize(src).unwrap();
        let mut program = Parser::parse(tokens).unwrap();
        nova_sem::check(&mut program).unwrap();
        generate(&program)
    }

    #[test]
    fn preamble_declares_externals_and_entry() {
        let asm = compile("fn main() {}");
        assert!(asm.contains(".globl main"));
        assert!(asm.contains(".extern printf"));
        assert!(asm.contains(".extern puts"));
    }

    #[test]
    fn identical_string_literals_share_one_label() {
        let asm = compile(r#"fn main() { print("hi"); print("hi"); }"#);
        assert_eq!(asm.matches(".Lstr0:").count(), 1);
        assert!(!asm.contains(".Lstr1:"));
    }

    #[test]
    fn print_int_uses_printf_print_string_uses_puts() {
        let asm = compile(r#"fn main() { print(1); print("x"); }"#);
        assert!(asm.contains("call printf"));
        assert!(asm.contains("call puts"));
    }

    #[test]
    fn frame_allocation_is_16_byte_aligned() {
        let asm = compile("fn f(a: int) { let b: int = 1; let c: int = 2; }");
        let sub_line = asm
            .lines()
            .find(|l| l.trim_start().starts_with("sub rsp"))
            .expect("expected a sub rsp line");
        let n: i64 = sub_line
            .trim()
            .trim_start_matches("sub rsp, ")
            .parse()
            .unwrap();
        assert_eq!(n % 16, 0);
    }

    #[test]
    fn subtraction_preserves_operand_order() {
        let asm = compile("fn main() { let x: int = 10 - 3; }");
        assert!(asm.contains("sub rbx, rax"));
        assert!(asm.contains("mov rax, rbx"));
    }

    #[test]
    fn division_moves_dividend_and_divisor_correctly() {
        let asm = compile("fn main() { let x: int = 10 / 3; }");
        assert!(asm.contains("idiv rcx"));
    }

    #[test]
    fn short_circuit_and_has_a_sink_label() {
        let asm = compile("fn f() -> bool { return true && false; }");
        assert!(asm.contains(".Landfalse0:"));
    }

    #[test]
    fn short_circuit_or_has_a_sink_label() {
        let asm = compile("fn f() -> bool { return true || false; }");
        assert!(asm.contains(".Lortrue0:"));
    }

    #[test]
    fn user_call_moves_args_into_sysv_registers() {
        let asm = compile(
            "fn add(a: int, b: int) -> int { return a + b; } fn main() { print(add(2, 3)); }",
        );
        assert!(asm.contains("mov rdi, rax"));
        assert!(asm.contains("mov rsi, rax"));
        assert!(asm.contains("call add"));
    }

    #[test]
    fn if_else_emits_matching_labels() {
        let asm = compile("fn main() { if (true) { print(1); } else { print(2); } }");
        assert!(asm.contains(".Lelse0:"));
        assert!(asm.contains(".Lendif0:"));
    }

    #[test]
    fn while_loop_emits_top_and_end_labels() {
        let asm = compile("fn main() { while (true) { print(1); } }");
        assert!(asm.contains(".Lwhile0:"));
        assert!(asm.contains(".Lendwhile0:"));
    }

    proptest::proptest! {
        #[test]
        fn frame_size_is_always_16_byte_aligned(n in 0usize..40) {
            let lets: String = (0..n).map(|i| format!("let v{i}: int = {i};")).collect::<Vec<_>>().join(" ");
            let src = format!("fn f() {{ {lets} }}");
            let asm = compile(&src);
            let sub = asm.lines().find(|l| l.trim_start().starts_with("sub rsp"));
            match sub {
                Some(line) => {
                    let size: i64 = line.trim().trim_start_matches("sub rsp, ").parse().unwrap();
                    proptest::prop_assert_eq!(size % 16, 0);
                }
                None => proptest::prop_assert_eq!(n, 0),
            }
        }
    }
}
