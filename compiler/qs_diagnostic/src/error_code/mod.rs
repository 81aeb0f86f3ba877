//! Error codes for all compile-time diagnostics.
//!
//! Each error code is a unique identifier (e.g., `E2003`) with the first digit
//! indicating the phase that produced it.

use std::fmt;

/// Error codes for all compile-time diagnostics.
///
/// Format: E#### / W#### where the first digit indicates phase:
/// - E1xxx: Lexer and parser errors
/// - E2xxx: Binding resolver errors
/// - W2xxx: Binding resolver warnings
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorCode {
    // Lexer / Parser Errors (E1xxx)
    /// Invalid character in source
    E1001,
    /// Unterminated string literal
    E1002,
    /// Unexpected token
    E1003,
    /// Expected a specific token
    E1004,
    /// Invalid number literal
    E1005,
    /// Unterminated block comment
    E1006,

    // Resolver Errors (E2xxx)
    /// `continue` outside of an iteration statement
    E2001,
    /// `break` outside of an iteration or switch statement
    E2002,
    /// Reference to a label that is not in scope
    E2003,
    /// Label reused inside its own statement
    E2004,
    /// `return` outside of a function
    E2005,
    /// `static` used outside of a class body
    E2006,
    /// Class declared in an illegal position
    E2007,
    /// Deriving from a class declared `final`
    E2008,
    /// Mutually exclusive attributes (`public` and `private`)
    E2009,
    /// Variable declared twice in the same class
    E2010,
    /// Parameter named `arguments`
    E2011,
    /// Parameter declared twice
    E2012,
    /// Variable declared inside a `with` block
    E2013,
    /// Statement at global level while global statements are forbidden
    E2014,

    // Resolver Warnings (W2xxx)
    /// Attribute repeated on one declaration
    W2001,
    /// Class declared without a body
    W2002,
}

impl ErrorCode {
    /// All error codes, for exhaustive lookups.
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E1006,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        ErrorCode::E2006,
        ErrorCode::E2007,
        ErrorCode::E2008,
        ErrorCode::E2009,
        ErrorCode::E2010,
        ErrorCode::E2011,
        ErrorCode::E2012,
        ErrorCode::E2013,
        ErrorCode::E2014,
        ErrorCode::W2001,
        ErrorCode::W2002,
    ];

    /// Get the code as a string (e.g., "E2003").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            ErrorCode::E2010 => "E2010",
            ErrorCode::E2011 => "E2011",
            ErrorCode::E2012 => "E2012",
            ErrorCode::E2013 => "E2013",
            ErrorCode::E2014 => "E2014",
            ErrorCode::W2001 => "W2001",
            ErrorCode::W2002 => "W2002",
        }
    }

    /// Check if this code is a warning (W-prefix).
    pub fn is_warning(&self) -> bool {
        matches!(self, ErrorCode::W2001 | ErrorCode::W2002)
    }

    /// Check if this code comes from the lexer or parser.
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            ErrorCode::E1001
                | ErrorCode::E1002
                | ErrorCode::E1003
                | ErrorCode::E1004
                | ErrorCode::E1005
                | ErrorCode::E1006
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"E2003"` or `"W2001"`.
///
/// Case-insensitive. Derived from [`ErrorCode::ALL`] and [`ErrorCode::as_str()`].
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

#[cfg(test)]
mod tests;
