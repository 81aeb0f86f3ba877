//! Source to token conversion using logos.

use std::rc::Rc;

use logos::Logos;
use qs_diagnostic::{Diagnostic, ErrorCode};
use qs_ir::StringInterner;

use crate::escape::unescape;
use crate::{Token, TokenKind};

/// Raw token from logos (before interning and literal cooking).
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f\u{feff}]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
enum RawToken {
    #[token("/*")]
    UnterminatedComment,

    // === Keywords ===
    #[token("var")]
    Var,
    #[token("const")]
    Const,
    #[token("function")]
    Function,
    #[token("class")]
    Class,
    #[token("extends")]
    Extends,
    #[token("static")]
    Static,
    #[token("public")]
    Public,
    #[token("private")]
    Private,
    #[token("final")]
    Final,
    #[token("abstract")]
    Abstract,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("for")]
    For,
    #[token("in")]
    In,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("return")]
    Return,
    #[token("with")]
    With,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("throw")]
    Throw,
    #[token("try")]
    Try,
    #[token("catch")]
    Catch,
    #[token("finally")]
    Finally,
    #[token("new")]
    New,
    #[token("delete")]
    Delete,
    #[token("typeof")]
    TypeOf,
    #[token("void")]
    Void,
    #[token("instanceof")]
    InstanceOf,
    #[token("is")]
    Is,
    #[token("this")]
    This,
    #[token("null")]
    Null,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // === Punctuation ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,

    // === Operators ===
    #[token("=")]
    Assign,
    #[token("+=")]
    PlusAssign,
    #[token("-=")]
    MinusAssign,
    #[token("*=")]
    StarAssign,
    #[token("/=")]
    SlashAssign,
    #[token("%=")]
    PercentAssign,
    #[token("<<=")]
    ShlAssign,
    #[token(">>=")]
    ShrAssign,
    #[token(">>>=")]
    UShrAssign,
    #[token("&=")]
    AmpAssign,
    #[token("|=")]
    PipeAssign,
    #[token("^=")]
    CaretAssign,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("===")]
    EqEqEq,
    #[token("!==")]
    NotEqEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token(">>>")]
    UShr,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,

    // === Literals ===
    #[regex(r"0[xX][0-9a-fA-F]+")]
    HexNumber,
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?")]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?")]
    Number,
    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    #[regex(r"'([^'\\\n]|\\[^\n])*'")]
    Str,
    #[regex(r#""([^"\\\n]|\\[^\n])*"#)]
    #[regex(r"'([^'\\\n]|\\[^\n])*")]
    UnterminatedStr,
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*")]
    Ident,
}

/// Result of lexing one compilation unit.
#[derive(Debug, Default)]
pub struct LexOutput {
    /// Tokens, always terminated by [`TokenKind::Eof`].
    pub tokens: Vec<Token>,
    /// Lexical errors. A non-empty list fails the compilation.
    pub diagnostics: Vec<Diagnostic>,
}

/// Lex `source`, interning identifiers into `interner`.
pub fn lex(source: &str, interner: &StringInterner) -> LexOutput {
    let mut out = LexOutput::default();
    let mut raw = RawToken::lexer(source);
    let mut line: u32 = 1;
    let mut cursor = 0usize;
    let mut number_end: Option<usize> = None;

    while let Some(result) = raw.next() {
        let span = raw.span();
        let slice = raw.slice();
        let breaks = count_lines(&source[cursor..span.start]);
        line += breaks;
        let newline_before = breaks > 0;
        cursor = span.end;

        let kind = match result {
            Ok(RawToken::UnterminatedComment) => {
                out.diagnostics.push(
                    Diagnostic::error(ErrorCode::E1006)
                        .with_message("Unterminated comment")
                        .at_line(line),
                );
                TokenKind::Error
            }
            Ok(RawToken::UnterminatedStr) => {
                out.diagnostics.push(
                    Diagnostic::error(ErrorCode::E1002)
                        .with_message("Unterminated string literal")
                        .at_line(line),
                );
                TokenKind::Error
            }
            Ok(token) => {
                if number_end == Some(span.start) && starts_identifier(slice) {
                    out.diagnostics.push(
                        Diagnostic::error(ErrorCode::E1005)
                            .with_message(format!("Invalid number literal near '{slice}'"))
                            .at_line(line),
                    );
                    TokenKind::Error
                } else {
                    convert(token, slice, interner)
                }
            }
            Err(()) => {
                out.diagnostics.push(
                    Diagnostic::error(ErrorCode::E1001)
                        .with_message(format!("Invalid character '{slice}'"))
                        .at_line(line),
                );
                TokenKind::Error
            }
        };

        number_end = matches!(kind, TokenKind::Number(_)).then_some(span.end);
        out.tokens.push(Token::new(kind, line, newline_before));
    }

    let breaks = count_lines(&source[cursor..]);
    out.tokens
        .push(Token::new(TokenKind::Eof, line + breaks, breaks > 0));
    out
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "line counts are bounded by source size which stays below u32::MAX"
)]
fn count_lines(text: &str) -> u32 {
    text.bytes().filter(|&b| b == b'\n').count() as u32
}

fn starts_identifier(slice: &str) -> bool {
    slice
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
}

fn convert(raw: RawToken, slice: &str, interner: &StringInterner) -> TokenKind {
    match raw {
        RawToken::HexNumber => TokenKind::Number(parse_hex(&slice[2..])),
        RawToken::Number => TokenKind::Number(slice.parse::<f64>().unwrap_or(f64::NAN)),
        RawToken::Str => {
            let content = &slice[1..slice.len() - 1];
            TokenKind::Str(Rc::from(unescape(content)))
        }
        RawToken::Ident => TokenKind::Ident(interner.intern(slice)),

        // Filtered out by the caller
        RawToken::UnterminatedComment | RawToken::UnterminatedStr => TokenKind::Error,

        RawToken::Var => TokenKind::Var,
        RawToken::Const => TokenKind::Const,
        RawToken::Function => TokenKind::Function,
        RawToken::Class => TokenKind::Class,
        RawToken::Extends => TokenKind::Extends,
        RawToken::Static => TokenKind::Static,
        RawToken::Public => TokenKind::Public,
        RawToken::Private => TokenKind::Private,
        RawToken::Final => TokenKind::Final,
        RawToken::Abstract => TokenKind::Abstract,
        RawToken::If => TokenKind::If,
        RawToken::Else => TokenKind::Else,
        RawToken::While => TokenKind::While,
        RawToken::Do => TokenKind::Do,
        RawToken::For => TokenKind::For,
        RawToken::In => TokenKind::In,
        RawToken::Break => TokenKind::Break,
        RawToken::Continue => TokenKind::Continue,
        RawToken::Return => TokenKind::Return,
        RawToken::With => TokenKind::With,
        RawToken::Switch => TokenKind::Switch,
        RawToken::Case => TokenKind::Case,
        RawToken::Default => TokenKind::Default,
        RawToken::Throw => TokenKind::Throw,
        RawToken::Try => TokenKind::Try,
        RawToken::Catch => TokenKind::Catch,
        RawToken::Finally => TokenKind::Finally,
        RawToken::New => TokenKind::New,
        RawToken::Delete => TokenKind::Delete,
        RawToken::TypeOf => TokenKind::TypeOf,
        RawToken::Void => TokenKind::Void,
        RawToken::InstanceOf => TokenKind::InstanceOf,
        RawToken::Is => TokenKind::Is,
        RawToken::This => TokenKind::This,
        RawToken::Null => TokenKind::Null,
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,

        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Question => TokenKind::Question,

        RawToken::Assign => TokenKind::Assign,
        RawToken::PlusAssign => TokenKind::PlusAssign,
        RawToken::MinusAssign => TokenKind::MinusAssign,
        RawToken::StarAssign => TokenKind::StarAssign,
        RawToken::SlashAssign => TokenKind::SlashAssign,
        RawToken::PercentAssign => TokenKind::PercentAssign,
        RawToken::ShlAssign => TokenKind::ShlAssign,
        RawToken::ShrAssign => TokenKind::ShrAssign,
        RawToken::UShrAssign => TokenKind::UShrAssign,
        RawToken::AmpAssign => TokenKind::AmpAssign,
        RawToken::PipeAssign => TokenKind::PipeAssign,
        RawToken::CaretAssign => TokenKind::CaretAssign,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::EqEqEq => TokenKind::EqEqEq,
        RawToken::NotEqEq => TokenKind::NotEqEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Gt => TokenKind::Gt,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::Shl => TokenKind::Shl,
        RawToken::Shr => TokenKind::Shr,
        RawToken::UShr => TokenKind::UShr,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::PlusPlus => TokenKind::PlusPlus,
        RawToken::MinusMinus => TokenKind::MinusMinus,
        RawToken::Amp => TokenKind::Amp,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::Caret => TokenKind::Caret,
        RawToken::Bang => TokenKind::Bang,
        RawToken::Tilde => TokenKind::Tilde,
        RawToken::AmpAmp => TokenKind::AmpAmp,
        RawToken::PipePipe => TokenKind::PipePipe,
    }
}

/// Hex digits accumulate in floating point so long literals lose precision
/// instead of overflowing.
fn parse_hex(digits: &str) -> f64 {
    digits
        .chars()
        .filter_map(|c| c.to_digit(16))
        .fold(0.0, |acc, d| acc * 16.0 + f64::from(d))
}
