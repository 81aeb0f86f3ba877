//! Recursive descent parser for QScript.
//!
//! Builds the owned syntax tree of `qs_ir::ast`. Each compilation unit gets a
//! fresh [`Parser`]; there is no shared parser state between units.

mod cursor;
mod grammar;

use cursor::Cursor;

use qs_diagnostic::{Diagnostic, ErrorCode};
use qs_ir::{Program, StringInterner};
use tracing::debug;

pub(crate) type PResult<T> = Result<T, Diagnostic>;

/// Parsing failed; carries every syntax diagnostic collected.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{} syntax error(s), first: {}", diagnostics.len(), first_message(diagnostics))]
pub struct ParseFailure {
    pub diagnostics: Vec<Diagnostic>,
}

fn first_message(diagnostics: &[Diagnostic]) -> &str {
    diagnostics.first().map_or("", |d| d.message.as_str())
}

/// Parser state.
pub struct Parser<'a> {
    cursor: Cursor,
    interner: &'a StringInterner,
    diagnostics: Vec<Diagnostic>,
    /// `in` is a relational operator here; cleared inside `for (...)` heads.
    allow_in: bool,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<qs_lexer::Token>, interner: &'a StringInterner) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            interner,
            diagnostics: Vec::new(),
            allow_in: true,
        }
    }

    /// Parse a whole compilation unit.
    ///
    /// Statements that fail to parse are skipped up to the next statement
    /// boundary so that one run reports as many errors as possible.
    pub fn parse_program(mut self) -> Result<Program, ParseFailure> {
        let mut body = Vec::new();
        while !self.cursor.at_end() {
            match self.statement() {
                Ok(stmt) => body.push(stmt),
                Err(diag) => {
                    self.diagnostics.push(diag);
                    self.synchronize();
                }
            }
        }

        if self.diagnostics.is_empty() {
            Ok(Program { body })
        } else {
            Err(ParseFailure {
                diagnostics: self.diagnostics,
            })
        }
    }

    fn synchronize(&mut self) {
        use qs_lexer::TokenKind;

        self.cursor.advance();
        while !self.cursor.at_end() {
            if self.cursor.eat(&TokenKind::Semicolon) {
                break;
            }
            if self.cursor.current().newline_before || self.cursor.check(&TokenKind::RBrace) {
                break;
            }
            self.cursor.advance();
        }
    }

    #[cold]
    fn unexpected(&self) -> Diagnostic {
        Diagnostic::error(ErrorCode::E1003)
            .with_message(format!(
                "Unexpected token '{}'",
                self.cursor.current_kind()
            ))
            .at_line(self.cursor.line())
    }

    #[cold]
    fn expected(&self, what: &str) -> Diagnostic {
        Diagnostic::error(ErrorCode::E1004)
            .with_message(format!(
                "Expected {what}, found '{}'",
                self.cursor.current_kind()
            ))
            .at_line(self.cursor.line())
    }

    /// Run `f` with `in` accepted as an operator.
    fn with_in<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::replace(&mut self.allow_in, true);
        let result = f(self);
        self.allow_in = saved;
        result
    }

    /// Run `f` with `in` reserved for `for (x in y)`.
    fn without_in<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::replace(&mut self.allow_in, false);
        let result = f(self);
        self.allow_in = saved;
        result
    }
}

/// Lex and parse `source`.
pub fn parse(source: &str, interner: &StringInterner) -> Result<Program, ParseFailure> {
    let lexed = qs_lexer::lex(source, interner);
    if !lexed.diagnostics.is_empty() {
        return Err(ParseFailure {
            diagnostics: lexed.diagnostics,
        });
    }

    let result = Parser::new(lexed.tokens, interner).parse_program();
    match &result {
        Ok(program) => debug!(statements = program.body.len(), "parsed program"),
        Err(failure) => debug!(errors = failure.diagnostics.len(), "parse failed"),
    }
    result
}

#[cfg(test)]
mod tests;
