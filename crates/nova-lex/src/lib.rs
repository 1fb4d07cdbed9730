//! Lexical analysis for Nova source text.
//!
//! [`Lexer::tokenize`] is the sole entry point: it turns a source string
//! into a token vector terminated by [`TokenKind::Eof`], or the first
//! [`LexError`] encountered. The lexer is a pure function of its input; it
//! holds no state beyond the current scan position.

mod cursor;
mod error;
mod lexer;
mod token;

pub use error::LexError;
pub use lexer::Lexer;
pub use token::{Token, TokenKind};
