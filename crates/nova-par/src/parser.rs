//! Recursive-descent parsing with single-token lookahead (two tokens to
//! distinguish an assignment statement from an expression statement).

use crate::ast::*;
use crate::error::ParseError;
use nova_lex::{Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

type PResult<T> = Result<T, ParseError>;

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse(tokens: Vec<Token>) -> PResult<Program> {
        tracing::debug!(tokens = tokens.len(), "parsing");
        let mut parser = Parser::new(tokens);
        let program = parser.parse_program()?;
        tracing::debug!(functions = program.functions.len(), "parsing finished");
        Ok(program)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> PResult<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: describe(self.peek()),
                line: self.peek().line,
            })
        }
    }

    fn expect_ident(&mut self) -> PResult<(String, u32, u32)> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Ident(name) => {
                self.advance();
                Ok((name, token.line, token.column))
            }
            _ => Err(ParseError::UnexpectedToken {
                expected: "an identifier".to_string(),
                found: describe(&token),
                line: token.line,
            }),
        }
    }

    fn parse_program(&mut self) -> PResult<Program> {
        let mut functions = Vec::new();
        while !self.check(&TokenKind::Eof) {
            functions.push(self.parse_function()?);
        }
        Ok(Program { functions })
    }

    fn parse_function(&mut self) -> PResult<FunctionDef> {
        let fn_tok = self.expect(TokenKind::Fn, "'fn'")?;
        let (name, _, _) = self.expect_ident()?;
        self.expect(TokenKind::LParen, "'('")?;
        let params = if self.check(&TokenKind::RParen) {
            Vec::new()
        } else {
            self.parse_params()?
        };
        self.expect(TokenKind::RParen, "')'")?;
        let return_type = if self.match_kind(&TokenKind::Arrow) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let body = self.parse_block()?;
        Ok(FunctionDef {
            name,
            params,
            return_type,
            body,
            line: fn_tok.line,
            column: fn_tok.column,
        })
    }

    fn match_kind(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn parse_params(&mut self) -> PResult<Vec<Param>> {
        let mut params = vec![self.parse_param()?];
        while self.match_kind(&TokenKind::Comma) {
            params.push(self.parse_param()?);
        }
        Ok(params)
    }

    fn parse_param(&mut self) -> PResult<Param> {
        let (name, line, column) = self.expect_ident()?;
        let type_name = if self.match_kind(&TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        Ok(Param {
            name,
            type_name,
            line,
            column,
        })
    }

    fn parse_type(&mut self) -> PResult<Type> {
        let token = self.peek().clone();
        let name = match &token.kind {
            TokenKind::KwInt => "int",
            TokenKind::KwBool => "bool",
            TokenKind::KwString => "string",
            TokenKind::KwVoid => "void",
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                return Ok(Type::from_name(&name));
            }
            _ => {
                return Err(ParseError::UnexpectedToken {
                    expected: "a type".to_string(),
                    found: describe(&token),
                    line: token.line,
                })
            }
        };
        self.advance();
        Ok(Type::from_name(name))
    }

    fn parse_block(&mut self) -> PResult<Block> {
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            statements.push(self.parse_statement()?);
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(Block { statements })
    }

    fn parse_statement(&mut self) -> PResult<Stmt> {
        match &self.peek().kind {
            TokenKind::Let => self.parse_let(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Ident(_) if self.peek_at(1).kind == TokenKind::Eq => self.parse_assign(),
            _ => self.parse_expr_stmt(),
        }
    }

    fn parse_let(&mut self) -> PResult<Stmt> {
        let let_tok = self.expect(TokenKind::Let, "'let'")?;
        let (name, _, _) = self.expect_ident()?;
        let declared_type = if self.match_kind(&TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        self.expect(TokenKind::Eq, "'='")?;
        let value = self.parse_expr()?;
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(Stmt::Let {
            name,
            declared_type,
            value,
            line: let_tok.line,
        })
    }

    fn parse_assign(&mut self) -> PResult<Stmt> {
        let (name, line, _) = self.expect_ident()?;
        self.expect(TokenKind::Eq, "'='")?;
        let value = self.parse_expr()?;
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(Stmt::Assign { name, value, line })
    }

    fn parse_if(&mut self) -> PResult<Stmt> {
        self.expect(TokenKind::If, "'if'")?;
        self.expect(TokenKind::LParen, "'('")?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')'")?;
        let then_block = self.parse_block()?;
        let else_block = if self.match_kind(&TokenKind::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Stmt::If {
            cond,
            then_block,
            else_block,
        })
    }

    fn parse_while(&mut self) -> PResult<Stmt> {
        self.expect(TokenKind::While, "'while'")?;
        self.expect(TokenKind::LParen, "'('")?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')'")?;
        let body = self.parse_block()?;
        Ok(Stmt::While { cond, body })
    }

    fn parse_return(&mut self) -> PResult<Stmt> {
        let ret_tok = self.expect(TokenKind::Return, "'return'")?;
        let value = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(Stmt::Return {
            value,
            line: ret_tok.line,
        })
    }

    fn parse_expr_stmt(&mut self) -> PResult<Stmt> {
        let expr = self.parse_expr()?;
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(Stmt::ExprStmt(expr))
    }

    fn parse_expr(&mut self) -> PResult<Expr> {
        self.parse_logical_or()
    }

    fn parse_logical_or(&mut self) -> PResult<Expr> {
        let mut left = self.parse_logical_and()?;
        while self.check(&TokenKind::OrOr) {
            let op_tok = self.advance();
            let right = self.parse_logical_and()?;
            left = Expr::new(
                ExprKind::Binary(Box::new(left), BinaryOp::Or, Box::new(right)),
                op_tok.line,
                op_tok.column,
            );
        }
        Ok(left)
    }

    fn parse_logical_and(&mut self) -> PResult<Expr> {
        let mut left = self.parse_equality()?;
        while self.check(&TokenKind::AndAnd) {
            let op_tok = self.advance();
            let right = self.parse_equality()?;
            left = Expr::new(
                ExprKind::Binary(Box::new(left), BinaryOp::And, Box::new(right)),
                op_tok.line,
                op_tok.column,
            );
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> PResult<Expr> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match &self.peek().kind {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::NotEq,
                _ => break,
            };
            let op_tok = self.advance();
            let right = self.parse_comparison()?;
            left = Expr::new(
                ExprKind::Binary(Box::new(left), op, Box::new(right)),
                op_tok.line,
                op_tok.column,
            );
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> PResult<Expr> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match &self.peek().kind {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::LtEq => BinaryOp::LtEq,
                TokenKind::GtEq => BinaryOp::GtEq,
                _ => break,
            };
            let op_tok = self.advance();
            let right = self.parse_additive()?;
            left = Expr::new(
                ExprKind::Binary(Box::new(left), op, Box::new(right)),
                op_tok.line,
                op_tok.column,
            );
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> PResult<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match &self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            let op_tok = self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::new(
                ExprKind::Binary(Box::new(left), op, Box::new(right)),
                op_tok.line,
                op_tok.column,
            );
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> PResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match &self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => break,
            };
            let op_tok = self.advance();
            let right = self.parse_unary()?;
            left = Expr::new(
                ExprKind::Binary(Box::new(left), op, Box::new(right)),
                op_tok.line,
                op_tok.column,
            );
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        let op = match &self.peek().kind {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            let op_tok = self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::new(
                ExprKind::Unary(op, Box::new(operand)),
                op_tok.line,
                op_tok.column,
            ));
        }
        self.parse_call()
    }

    fn parse_call(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_primary()?;
        while self.check(&TokenKind::LParen) {
            let callee = match &expr.kind {
                ExprKind::VarRef(name) => name.clone(),
                _ => return Err(ParseError::NonIdentifierCallee { line: expr.line }),
            };
            let paren = self.advance();
            let args = if self.check(&TokenKind::RParen) {
                Vec::new()
            } else {
                self.parse_args()?
            };
            self.expect(TokenKind::RParen, "')'")?;
            expr = Expr::new(ExprKind::Call(callee, args), paren.line, paren.column);
        }
        Ok(expr)
    }

    fn parse_args(&mut self) -> PResult<Vec<Expr>> {
        let mut args = vec![self.parse_expr()?];
        while self.match_kind(&TokenKind::Comma) {
            args.push(self.parse_expr()?);
        }
        Ok(args)
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Int(value) => {
                self.advance();
                Ok(Expr::new(
                    ExprKind::IntLiteral(value),
                    token.line,
                    token.column,
                ))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::new(
                    ExprKind::BoolLiteral(true),
                    token.line,
                    token.column,
                ))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::new(
                    ExprKind::BoolLiteral(false),
                    token.line,
                    token.column,
                ))
            }
            TokenKind::Str(ref s) => {
                let s = s.clone();
                self.advance();
                Ok(Expr::new(
                    ExprKind::StringLiteral(s),
                    token.line,
                    token.column,
                ))
            }
            TokenKind::Ident(ref name) => {
                let name = name.clone();
                self.advance();
                Ok(Expr::new(ExprKind::VarRef(name), token.line, token.column))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(expr)
            }
            _ => Err(ParseError::UnexpectedToken {
                expected: "an expression".to_string(),
                found: describe(&token),
                line: token.line,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Program {
        let tokens = nova_lex::Lexer::tokenize(src).unwrap();
        Parser::parse(tokens).unwrap()
    }

    #[test]
    fn parses_empty_function() {
        let program = parse("fn main() {}");
        assert_eq!(program.functions.len(), 1);
        assert_eq!(program.functions[0].name, "main");
        assert!(program.functions[0].params.is_empty());
        assert_eq!(program.functions[0].return_type, None);
    }

    #[test]
    fn parses_params_and_return_type() {
        let program = parse("fn add(a: int, b: int) -> int { return a + b; }");
        let f = &program.functions[0];
        assert_eq!(f.params.len(), 2);
        assert_eq!(f.return_type, Some(Type::Int));
    }

    #[test]
    fn additive_is_left_associative() {
        let program = parse("fn f() { a - b - c; }");
        let stmt = &program.functions[0].body.statements[0];
        let Stmt::ExprStmt(expr) = stmt else {
            panic!("expected expr stmt")
        };
        let ExprKind::Binary(left, BinaryOp::Sub, _) = &expr.kind else {
            panic!("expected outer subtraction")
        };
        assert!(matches!(left.kind, ExprKind::Binary(_, BinaryOp::Sub, _)));
    }

    #[test]
    fn multiplicative_binds_tighter_than_additive() {
        let program = parse("fn f() { a + b * c; }");
        let Stmt::ExprStmt(expr) = &program.functions[0].body.statements[0] else {
            panic!("expected expr stmt")
        };
        let ExprKind::Binary(_, BinaryOp::Add, right) = &expr.kind else {
            panic!("expected outer addition")
        };
        assert!(matches!(right.kind, ExprKind::Binary(_, BinaryOp::Mul, _)));
    }

    #[test]
    fn logical_precedence_chain() {
        let program = parse("fn f() { !a && b || c; }");
        let Stmt::ExprStmt(expr) = &program.functions[0].body.statements[0] else {
            panic!("expected expr stmt")
        };
        assert!(matches!(expr.kind, ExprKind::Binary(_, BinaryOp::Or, _)));
        let ExprKind::Binary(left, BinaryOp::Or, _) = &expr.kind else {
            unreachable!()
        };
        assert!(matches!(left.kind, ExprKind::Binary(_, BinaryOp::And, _)));
    }

    #[test]
    fn assign_vs_expr_stmt_lookahead() {
        let program = parse("fn f() { x = 1; f(); }");
        let stmts = &program.functions[0].body.statements;
        assert!(matches!(stmts[0], Stmt::Assign { .. }));
        assert!(matches!(stmts[1], Stmt::ExprStmt(_)));
    }

    #[test]
    fn call_target_must_be_identifier() {
        let tokens = nova_lex::Lexer::tokenize("fn f() { (1)(2); }").unwrap();
        let err = Parser::parse(tokens).unwrap_err();
        assert!(matches!(err, ParseError::NonIdentifierCallee { .. }));
    }

    #[test]
    fn if_else_and_while_parse() {
        let program = parse("fn f() { if (true) { 1; } else { 2; } while (true) { 3; } }");
        let stmts = &program.functions[0].body.statements;
        assert!(matches!(stmts[0], Stmt::If { .. }));
        assert!(matches!(stmts[1], Stmt::While { .. }));
    }

    /// Counts the nodes in a left-leaning chain of `Binary(_, Add, _)`
    /// nodes, failing if the chain is not purely left-leaning.
    fn left_chain_len(expr: &Expr) -> usize {
        match &expr.kind {
            ExprKind::Binary(left, BinaryOp::Add, right) => {
                assert!(matches!(right.kind, ExprKind::IntLiteral(_)));
                1 + left_chain_len(left)
            }
            ExprKind::IntLiteral(_) => 0,
            other => panic!("unexpected node in chain: {other:?}"),
        }
    }

    proptest::proptest! {
        #[test]
        fn arbitrary_plus_chains_are_left_associative(n in 2usize..15) {
            let src = format!(
                "fn f() {{ {}; }}",
                (0..n).map(|i| i.to_string()).collect::<Vec<_>>().join(" + ")
            );
            let program = parse(&src);
            let Stmt::ExprStmt(expr) = &program.functions[0].body.statements[0] else {
                panic!("expected expr stmt")
            };
            proptest::prop_assert_eq!(left_chain_len(expr), n - 1);
        }
    }
}
