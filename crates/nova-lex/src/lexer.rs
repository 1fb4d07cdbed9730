//! Token scanning.

use crate::cursor::Cursor;
use crate::error::LexError;
use crate::token::{Token, TokenKind};

pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    token_start_line: u32,
    token_start_column: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            token_start_line: 1,
            token_start_column: 1,
        }
    }

    /// Scans the entire source into a token vector terminated by `Eof`,
    /// stopping at the first lexical error.
    pub fn tokenize(source: &'a str) -> Result<Vec<Token>, LexError> {
        tracing::debug!(bytes = source.len(), "lexing");
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tracing::debug!(tokens = tokens.len(), "lexing finished");
        Ok(tokens)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.cursor.current_char() {
                ' ' | '\t' | '\r' | '\n' => {
                    self.cursor.advance();
                }
                '/' if self.cursor.peek_char(1) == '/' => {
                    while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
                        self.cursor.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia();
        self.token_start_line = self.cursor.line();
        self.token_start_column = self.cursor.column();

        if self.cursor.is_at_end() {
            return Ok(self.make(TokenKind::Eof, String::new()));
        }

        let c = self.cursor.current_char();
        match c {
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            ',' => self.single(TokenKind::Comma),
            ';' => self.single(TokenKind::Semicolon),
            ':' => self.single(TokenKind::Colon),
            '+' => self.single(TokenKind::Plus),
            '*' => self.single(TokenKind::Star),
            '/' => self.single(TokenKind::Slash),
            '-' => Ok(self.two_or_one('>', TokenKind::Arrow, TokenKind::Minus)),
            '=' => Ok(self.two_or_one('=', TokenKind::EqEq, TokenKind::Eq)),
            '!' => Ok(self.two_or_one('=', TokenKind::NotEq, TokenKind::Bang)),
            '<' => Ok(self.two_or_one('=', TokenKind::LtEq, TokenKind::Lt)),
            '>' => Ok(self.two_or_one('=', TokenKind::GtEq, TokenKind::Gt)),
            '&' if self.cursor.peek_char(1) == '&' => {
                self.cursor.advance();
                self.single(TokenKind::AndAnd)
            }
            '|' if self.cursor.peek_char(1) == '|' => {
                self.cursor.advance();
                self.single(TokenKind::OrOr)
            }
            '"' | '\'' => self.lex_string(c),
            c if c.is_ascii_digit() => Ok(self.lex_number()),
            c if c == '_' || c.is_alphabetic() => Ok(self.lex_identifier()),
            other => Err(LexError::UnexpectedCharacter {
                character: other,
                line: self.token_start_line,
                column: self.token_start_column,
            }),
        }
    }

    fn make(&self, kind: TokenKind, lexeme: String) -> Token {
        Token::new(kind, lexeme, self.token_start_line, self.token_start_column)
    }

    fn single(&mut self, kind: TokenKind) -> Result<Token, LexError> {
        let lexeme = self.cursor.current_char().to_string();
        self.cursor.advance();
        Ok(self.make(kind, lexeme))
    }

    /// Maximal-munch helper: if `second` follows the current character,
    /// consume both and return `two`; otherwise consume one and return
    /// `one`.
    fn two_or_one(&mut self, second: char, two: TokenKind, one: TokenKind) -> Token {
        let first = self.cursor.current_char();
        self.cursor.advance();
        if self.cursor.current_char() == second {
            self.cursor.advance();
            self.make(two, format!("{first}{second}"))
        } else {
            self.make(one, first.to_string())
        }
    }

    fn lex_number(&mut self) -> Token {
        let start = self.cursor.position();
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }
        let lexeme = self.cursor.slice_from(start).to_string();
        let value: i64 = lexeme.parse().unwrap_or(0);
        self.make(TokenKind::Int(value), lexeme)
    }

    fn lex_identifier(&mut self) -> Token {
        let start = self.cursor.position();
        while {
            let c = self.cursor.current_char();
            c == '_' || c.is_alphanumeric()
        } {
            self.cursor.advance();
        }
        let lexeme = self.cursor.slice_from(start).to_string();
        let kind = TokenKind::keyword(&lexeme).unwrap_or_else(|| TokenKind::Ident(lexeme.clone()));
        self.make(kind, lexeme)
    }

    /// Lexes a string delimited by either `"` or `'`; the closing quote
    /// must match the opening one. `\n`, `\t`, `\\`, `\"`, `\'` are
    /// recognized escapes; any other `\x` passes `x` through literally.
    /// Only running off the end of input is an error — an embedded
    /// newline does not terminate the literal, matching the reference
    /// lexer this one is ported from.
    fn lex_string(&mut self, quote: char) -> Result<Token, LexError> {
        self.cursor.advance();
        let mut content = String::new();
        loop {
            if self.cursor.is_at_end() {
                return Err(LexError::UnterminatedString {
                    line: self.token_start_line,
                    column: self.token_start_column,
                });
            }
            let c = self.cursor.current_char();
            if c == quote {
                self.cursor.advance();
                break;
            }
            if c == '\\' {
                self.cursor.advance();
                let escaped = self.cursor.current_char();
                if self.cursor.is_at_end() {
                    return Err(LexError::UnterminatedString {
                        line: self.token_start_line,
                        column: self.token_start_column,
                    });
                }
                self.cursor.advance();
                content.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    '\\' => '\\',
                    '"' => '"',
                    '\'' => '\'',
                    other => other,
                });
            } else {
                content.push(c);
                self.cursor.advance();
            }
        }
        let lexeme = content.clone();
        Ok(self.make(TokenKind::Str(content), lexeme))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::tokenize(src)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn keywords_are_not_identifiers() {
        assert_eq!(kinds("fn"), vec![TokenKind::Fn, TokenKind::Eof]);
        assert_eq!(
            kinds("lets"),
            vec![TokenKind::Ident("lets".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn maximal_munch_on_operators() {
        assert_eq!(kinds("=="), vec![TokenKind::EqEq, TokenKind::Eof]);
        assert_eq!(kinds("!="), vec![TokenKind::NotEq, TokenKind::Eof]);
        assert_eq!(kinds("<="), vec![TokenKind::LtEq, TokenKind::Eof]);
        assert_eq!(kinds(">="), vec![TokenKind::GtEq, TokenKind::Eof]);
        assert_eq!(kinds("&&"), vec![TokenKind::AndAnd, TokenKind::Eof]);
        assert_eq!(kinds("||"), vec![TokenKind::OrOr, TokenKind::Eof]);
        assert_eq!(kinds("->"), vec![TokenKind::Arrow, TokenKind::Eof]);
        assert_eq!(
            kinds("="),
            vec![TokenKind::Eq, TokenKind::Eof],
            "single = must not be swallowed by == matching"
        );
    }

    #[test]
    fn comments_and_whitespace_are_skipped() {
        assert_eq!(
            kinds("  // a comment\n  42"),
            vec![TokenKind::Int(42), TokenKind::Eof]
        );
    }

    #[test]
    fn string_escapes() {
        let tokens = Lexer::tokenize(r#""a\nb\t\"\\end""#).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Str("a\nb\t\"\\end".into()));
    }

    #[test]
    fn string_unknown_escape_passes_through_literally() {
        let tokens = Lexer::tokenize(r#""\q""#).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Str("q".into()));
    }

    #[test]
    fn mismatched_quotes_do_not_close_the_string() {
        let tokens = Lexer::tokenize("\"a'b\"").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Str("a'b".into()));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = Lexer::tokenize("\"abc").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedString { .. }));
    }

    #[test]
    fn unexpected_character_is_an_error() {
        let err = Lexer::tokenize("@").unwrap_err();
        assert!(matches!(err, LexError::UnexpectedCharacter { character: '@', .. }));
    }

    #[test]
    fn positions_are_monotone() {
        let tokens = Lexer::tokenize("fn main\n  let x").unwrap();
        for pair in tokens.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(b.line > a.line || (b.line == a.line && b.column >= a.column));
        }
    }

    // ------------------------------------------------------------------------
    // Property-based tests over arbitrary inputs
    // ------------------------------------------------------------------------

    proptest::proptest! {
        #[test]
        fn arbitrary_identifiers_lex_as_a_single_ident_or_keyword(input in "[a-zA-Z_][a-zA-Z0-9_]{0,30}") {
            let tokens = Lexer::tokenize(&input).unwrap();
            proptest::prop_assert_eq!(tokens.len(), 2); // identifier/keyword + Eof
            let is_reserved = TokenKind::keyword(&input).is_some();
            match &tokens[0].kind {
                TokenKind::Ident(name) => proptest::prop_assert!(!is_reserved && name == &input),
                other => proptest::prop_assert!(is_reserved, "unexpected kind {other:?} for non-keyword input"),
            }
        }

        #[test]
        fn arbitrary_decimal_literals_lex_as_a_single_int(input in "[0-9]{1,18}") {
            let tokens = Lexer::tokenize(&input).unwrap();
            proptest::prop_assert_eq!(tokens.len(), 2);
            proptest::prop_assert!(matches!(tokens[0].kind, TokenKind::Int(_)));
        }

        #[test]
        fn token_positions_never_regress(src in "[ \\t\\na-zA-Z0-9_(){};:,+*/<>=!-]{0,60}") {
            if let Ok(tokens) = Lexer::tokenize(&src) {
                for pair in tokens.windows(2) {
                    let (a, b) = (&pair[0], &pair[1]);
                    proptest::prop_assert!(b.line > a.line || (b.line == a.line && b.column >= a.column));
                }
            }
        }
    }
}
