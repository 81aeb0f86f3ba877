//! Lexer for QScript source text.
//!
//! Produces a flat token vector terminated by [`TokenKind::Eof`]. Every token
//! records its 1-based line and whether a line break preceded it, which the
//! parser needs for automatic semicolon insertion.

mod escape;
mod lexer;
mod token;

pub use lexer::{lex, LexOutput};
pub use token::{Token, TokenKind};
