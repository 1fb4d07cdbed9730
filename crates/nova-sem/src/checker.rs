//! Two-phase type checking: collect every function signature first so
//! forward and mutually recursive calls resolve, then check each body
//! against its own signature.

use crate::error::TypeError;
use crate::sig::{builtin_signatures, FunctionSig, MAX_PARAMS};
use nova_par::{BinaryOp, Block, Expr, ExprKind, FunctionDef, Program, Stmt, Type, UnaryOp};
use rustc_hash::{FxHashMap, FxHashSet};

pub struct TypeChecker {
    functions: FxHashMap<String, FunctionSig>,
    builtins: FxHashMap<String, Vec<FunctionSig>>,
}

type Scope = FxHashMap<String, Type>;

pub fn check(program: &mut Program) -> Result<(), TypeError> {
    tracing::debug!(functions = program.functions.len(), "type checking");
    let mut checker = TypeChecker {
        functions: FxHashMap::default(),
        builtins: builtin_signatures(),
    };
    checker.collect_signatures(&program.functions)?;
    for function in &mut program.functions {
        checker.check_function(function)?;
    }
    tracing::debug!(functions = program.functions.len(), "type checking finished");
    Ok(())
}

fn normalize_type(ty: &Type, line: u32) -> Result<Type, TypeError> {
    match ty {
        Type::Named(name) => Err(TypeError::UnknownType {
            name: name.clone(),
            line,
        }),
        other => Ok(other.clone()),
    }
}

impl TypeChecker {
    fn collect_signatures(&mut self, functions: &[FunctionDef]) -> Result<(), TypeError> {
        for function in functions {
            if self.functions.contains_key(&function.name) {
                return Err(TypeError::DuplicateFunction {
                    name: function.name.clone(),
                    line: function.line,
                });
            }
            if function.params.len() > MAX_PARAMS {
                return Err(TypeError::TooManyParams {
                    name: function.name.clone(),
                    count: function.params.len(),
                    line: function.line,
                });
            }
            let mut seen_params: FxHashSet<&str> = FxHashSet::default();
            let mut params = Vec::with_capacity(function.params.len());
            for param in &function.params {
                if !seen_params.insert(param.name.as_str()) {
                    return Err(TypeError::DuplicateParam {
                        func: function.name.clone(),
                        name: param.name.clone(),
                        line: param.line,
                    });
                }
                let declared = param.type_name.as_ref().ok_or_else(|| TypeError::MissingParamType {
                    func: function.name.clone(),
                    name: param.name.clone(),
                    line: param.line,
                })?;
                params.push(normalize_type(declared, param.line)?);
            }
            let return_type = match &function.return_type {
                Some(ty) => normalize_type(ty, function.line)?,
                None => Type::Void,
            };
            self.functions.insert(
                function.name.clone(),
                FunctionSig {
                    params,
                    return_type,
                },
            );
        }
        Ok(())
    }

    fn check_function(&self, function: &mut FunctionDef) -> Result<(), TypeError> {
        let sig = self.functions.get(&function.name).expect("collected above");
        let mut scope: Scope = FxHashMap::default();
        for (param, ty) in function.params.iter().zip(sig.params.iter()) {
            scope.insert(param.name.clone(), ty.clone());
        }
        let return_type = sig.return_type.clone();
        self.check_block(&mut function.body, &scope, &return_type, &function.name)?;
        Ok(())
    }

    fn check_block(
        &self,
        block: &mut Block,
        outer: &Scope,
        return_type: &Type,
        func_name: &str,
    ) -> Result<(), TypeError> {
        let mut scope = outer.clone();
        for stmt in &mut block.statements {
            self.check_stmt(stmt, &mut scope, return_type, func_name)?;
        }
        Ok(())
    }

    fn check_stmt(
        &self,
        stmt: &mut Stmt,
        scope: &mut Scope,
        return_type: &Type,
        func_name: &str,
    ) -> Result<(), TypeError> {
        match stmt {
            Stmt::Let {
                name,
                declared_type,
                value,
                line,
            } => {
                let value_type = self.check_expr(value, scope)?;
                if let Some(declared) = declared_type {
                    let declared = normalize_type(declared, *line)?;
                    if declared != value_type {
                        return Err(TypeError::Mismatch {
                            expected: declared.to_string(),
                            found: value_type.to_string(),
                            line: *line,
                        });
                    }
                }
                scope.insert(name.clone(), value_type);
                Ok(())
            }
            Stmt::Assign { name, value, line } => {
                let value_type = self.check_expr(value, scope)?;
                let bound = scope.get(name).cloned().ok_or_else(|| TypeError::UnknownName {
                    name: name.clone(),
                    line: *line,
                })?;
                if bound != value_type {
                    return Err(TypeError::Mismatch {
                        expected: bound.to_string(),
                        found: value_type.to_string(),
                        line: *line,
                    });
                }
                Ok(())
            }
            Stmt::If {
                cond,
                then_block,
                else_block,
            } => {
                let cond_line = cond.line;
                let cond_type = self.check_expr(cond, scope)?;
                if cond_type != Type::Bool {
                    return Err(TypeError::OperandType {
                        op: "if".to_string(),
                        expected: Type::Bool.to_string(),
                        found: cond_type.to_string(),
                        line: cond_line,
                    });
                }
                self.check_block(then_block, scope, return_type, func_name)?;
                if let Some(else_block) = else_block {
                    self.check_block(else_block, scope, return_type, func_name)?;
                }
                Ok(())
            }
            Stmt::While { cond, body } => {
                let cond_line = cond.line;
                let cond_type = self.check_expr(cond, scope)?;
                if cond_type != Type::Bool {
                    return Err(TypeError::OperandType {
                        op: "while".to_string(),
                        expected: Type::Bool.to_string(),
                        found: cond_type.to_string(),
                        line: cond_line,
                    });
                }
                self.check_block(body, scope, return_type, func_name)
            }
            Stmt::Return { value, line } => match (return_type, value) {
                (Type::Void, None) => Ok(()),
                (Type::Void, Some(expr)) => {
                    let _ = self.check_expr(expr, scope)?;
                    Err(TypeError::VoidReturnsValue { line: *line })
                }
                (expected, None) => Err(TypeError::MissingReturnValue {
                    name: func_name.to_string(),
                    expected: expected.to_string(),
                    line: *line,
                }),
                (expected, Some(expr)) => {
                    let got = self.check_expr(expr, scope)?;
                    if &got != expected {
                        return Err(TypeError::Mismatch {
                            expected: expected.to_string(),
                            found: got.to_string(),
                            line: *line,
                        });
                    }
                    Ok(())
                }
            },
            Stmt::ExprStmt(expr) => {
                self.check_expr(expr, scope)?;
                Ok(())
            }
        }
    }

    fn check_expr(&self, expr: &mut Expr, scope: &Scope) -> Result<Type, TypeError> {
        let line = expr.line;
        let ty = match &mut expr.kind {
            ExprKind::IntLiteral(_) => Type::Int,
            ExprKind::BoolLiteral(_) => Type::Bool,
            ExprKind::StringLiteral(_) => Type::String,
            ExprKind::VarRef(name) => scope.get(name).cloned().ok_or_else(|| TypeError::UnknownName {
                name: name.clone(),
                line,
            })?,
            ExprKind::Unary(op, operand) => {
                let operand_type = self.check_expr(operand, scope)?;
                match op {
                    UnaryOp::Neg => {
                        require(&operand_type, &Type::Int, "-", line)?;
                        Type::Int
                    }
                    UnaryOp::Not => {
                        require(&operand_type, &Type::Bool, "!", line)?;
                        Type::Bool
                    }
                }
            }
            ExprKind::Binary(left, op, right) => {
                let left_type = self.check_expr(left, scope)?;
                let right_type = self.check_expr(right, scope)?;
                self.check_binary(*op, &left_type, &right_type, line)?
            }
            ExprKind::Call(name, args) => {
                let mut arg_types = Vec::with_capacity(args.len());
                for arg in args.iter_mut() {
                    arg_types.push(self.check_expr(arg, scope)?);
                }
                self.check_call(name, &arg_types, line)?
            }
        };
        expr.inferred_type = Some(ty.clone());
        Ok(ty)
    }

    fn check_binary(
        &self,
        op: BinaryOp,
        left: &Type,
        right: &Type,
        line: u32,
    ) -> Result<Type, TypeError> {
        use BinaryOp::*;
        match op {
            Add | Sub | Mul | Div => {
                require(left, &Type::Int, op_name(op), line)?;
                require(right, &Type::Int, op_name(op), line)?;
                Ok(Type::Int)
            }
            Lt | Gt | LtEq | GtEq => {
                require(left, &Type::Int, op_name(op), line)?;
                require(right, &Type::Int, op_name(op), line)?;
                Ok(Type::Bool)
            }
            Eq | NotEq => {
                if left != right {
                    return Err(TypeError::Mismatch {
                        expected: left.to_string(),
                        found: right.to_string(),
                        line,
                    });
                }
                Ok(Type::Bool)
            }
            And | Or => {
                require(left, &Type::Bool, op_name(op), line)?;
                require(right, &Type::Bool, op_name(op), line)?;
                Ok(Type::Bool)
            }
        }
    }

    fn check_call(&self, name: &str, arg_types: &[Type], line: u32) -> Result<Type, TypeError> {
        if let Some(overloads) = self.builtins.get(name) {
            for sig in overloads {
                if sig.params == arg_types {
                    return Ok(sig.return_type.clone());
                }
            }
            return Err(TypeError::ArityMismatch {
                name: name.to_string(),
                expected: overloads[0].params.len(),
                got: arg_types.len(),
                line,
            });
        }
        let sig = self
            .functions
            .get(name)
            .ok_or_else(|| TypeError::UnknownCallee {
                name: name.to_string(),
                line,
            })?;
        if sig.params.len() != arg_types.len() {
            return Err(TypeError::ArityMismatch {
                name: name.to_string(),
                expected: sig.params.len(),
                got: arg_types.len(),
                line,
            });
        }
        for (expected, got) in sig.params.iter().zip(arg_types.iter()) {
            if expected != got {
                return Err(TypeError::Mismatch {
                    expected: expected.to_string(),
                    found: got.to_string(),
                    line,
                });
            }
        }
        Ok(sig.return_type.clone())
    }
}

fn require(actual: &Type, expected: &Type, op: &str, line: u32) -> Result<(), TypeError> {
    if actual != expected {
        return Err(TypeError::OperandType {
            op: op.to_string(),
            expected: expected.to_string(),
            found: actual.to_string(),
            line,
        });
    }
    Ok(())
}

fn op_name(op: BinaryOp) -> &'static str {
    use BinaryOp::*;
    match op {
        Add => "+",
        Sub => "-",
        Mul => "*",
        Div => "/",
        Lt => "<",
        Gt => ">",
        LtEq => "<=",
        GtEq => ">=",
        Eq => "==",
        NotEq => "!=",
        And => "&&",
        Or => "||",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_lex::Lexer;
    use nova_par::Parser;

    fn check_source(src: &str) -> Result<Program, TypeError> {
        let tokens = Lexer::tokenize(src).unwrap();
        let mut program = Parser::parse(tokens).unwrap();
        check(&mut program)?;
        Ok(program)
    }

    #[test]
    fn annotates_every_expression() {
        let program = check_source("fn main() { let x: int = 1 + 2; print(x); }").unwrap();
        let stmts = &program.functions[0].body.statements;
        let Stmt::Let { value, .. } = &stmts[0] else {
            panic!()
        };
        assert_eq!(value.inferred_type, Some(Type::Int));
    }

    #[test]
    fn print_overload_resolves_by_argument_type() {
        assert!(check_source("fn main() { print(1); }").is_ok());
        assert!(check_source(r#"fn main() { print("x"); }"#).is_ok());
        assert!(check_source("fn main() { print(true); }").is_err());
    }

    #[test]
    fn forward_and_mutual_recursion_resolve() {
        let result = check_source(
            "fn is_even(n: int) -> bool { if (n == 0) { return true; } return is_odd(n - 1); } \
             fn is_odd(n: int) -> bool { if (n == 0) { return false; } return is_even(n - 1); } \
             fn main() { print(is_even(4)); }",
        );
        assert!(result.is_err(), "print(bool) should fail, proving both functions resolved and type-checked");
    }

    #[test]
    fn branch_scopes_do_not_leak() {
        let result = check_source(
            "fn main() { if (true) { let x: int = 1; } x = 2; }",
        );
        assert!(matches!(result, Err(TypeError::UnknownName { .. })));
    }

    #[test]
    fn duplicate_function_is_rejected() {
        let result = check_source("fn f() {} fn f() {}");
        assert!(matches!(result, Err(TypeError::DuplicateFunction { .. })));
    }

    #[test]
    fn duplicate_param_is_rejected() {
        let result = check_source("fn f(a: int, a: bool) {}");
        assert!(matches!(result, Err(TypeError::DuplicateParam { .. })));
    }

    #[test]
    fn too_many_params_is_rejected() {
        let result = check_source(
            "fn f(a: int, b: int, c: int, d: int, e: int, f: int, g: int) {}",
        );
        assert!(matches!(result, Err(TypeError::TooManyParams { .. })));
    }

    #[test]
    fn unknown_type_name_is_rejected() {
        let result = check_source("fn f(a: Widget) {}");
        assert!(matches!(result, Err(TypeError::UnknownType { .. })));
    }

    #[test]
    fn void_function_cannot_return_value() {
        let result = check_source("fn f() { return 1; }");
        assert!(matches!(result, Err(TypeError::VoidReturnsValue { .. })));
    }

    #[test]
    fn non_void_function_must_return_value() {
        let result = check_source("fn f() -> int { return; }");
        assert!(matches!(result, Err(TypeError::MissingReturnValue { .. })));
    }
}
