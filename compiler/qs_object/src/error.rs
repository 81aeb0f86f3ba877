//! Run-time error kinds and the values that carry them.

use std::fmt;

use crate::Value;

/// Kind of a run-time Error value.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorKind {
    General,
    Eval,
    Range,
    Reference,
    Syntax,
    Type,
    Uri,
    /// A non-Error value passed to `throw`.
    Throw,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 8] = [
        ErrorKind::General,
        ErrorKind::Eval,
        ErrorKind::Range,
        ErrorKind::Reference,
        ErrorKind::Syntax,
        ErrorKind::Type,
        ErrorKind::Uri,
        ErrorKind::Throw,
    ];

    /// Name of the builtin class that instances of this kind belong to.
    pub fn class_name(self) -> &'static str {
        match self {
            ErrorKind::General | ErrorKind::Throw => "Error",
            ErrorKind::Eval => "EvalError",
            ErrorKind::Range => "RangeError",
            ErrorKind::Reference => "ReferenceError",
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Type => "TypeError",
            ErrorKind::Uri => "URIError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

/// An uncaught run-time error as seen by the host.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{kind}: {message} (line {line})")]
pub struct EvalError {
    pub kind: ErrorKind,
    pub message: String,
    pub line: u32,
}

/// A thrown script value travelling up through expression evaluation.
#[derive(Clone, Debug)]
pub struct Thrown(pub Value);

impl From<Value> for Thrown {
    fn from(value: Value) -> Self {
        Thrown(value)
    }
}
