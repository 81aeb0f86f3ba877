//! Engine errors and the runtime error messages the evaluator raises.
//!
//! Runtime messages are built here so the wording lives in one place; each
//! constructor returns the Error kind together with its text.

use qs_diagnostic::Diagnostic;
use qs_object::{ErrorKind, EvalError};

/// Failure reported across the engine boundary.
#[derive(Clone, Debug, thiserror::Error)]
pub enum EngineError {
    /// Parse or check errors; the unit was not executed.
    #[error("compilation failed: {}", first_message(.0))]
    Compile(Vec<Diagnostic>),
    /// An uncaught throw.
    #[error(transparent)]
    Runtime(#[from] EvalError),
    /// The environment was cleared and not re-initialized.
    #[error("the environment is not initialized")]
    NotInitialized,
}

fn first_message(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .find(|d| d.is_error())
        .map_or_else(String::new, ToString::to_string)
}

impl EngineError {
    /// Compile diagnostics, empty for other variants.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            EngineError::Compile(diagnostics) => diagnostics,
            _ => &[],
        }
    }

    pub fn as_runtime(&self) -> Option<&EvalError> {
        match self {
            EngineError::Runtime(error) => Some(error),
            _ => None,
        }
    }
}

pub(crate) type RuntimeMessage = (ErrorKind, String);

// Names and scopes

pub(crate) fn undefined_variable(name: &str) -> RuntimeMessage {
    (
        ErrorKind::Reference,
        format!("Use of undefined variable '{name}'"),
    )
}

pub(crate) fn not_writable() -> RuntimeMessage {
    (
        ErrorKind::Type,
        "Left hand side value is not writable".to_owned(),
    )
}

pub(crate) fn non_static_access() -> RuntimeMessage {
    (
        ErrorKind::Type,
        "Cannot access a non-static member without an object reference".to_owned(),
    )
}

pub(crate) fn property_of_nullish(name: &str, base: &str) -> RuntimeMessage {
    (
        ErrorKind::Type,
        format!("Cannot access property '{name}' of {base}"),
    )
}

pub(crate) fn cannot_add_property(name: &str, ty: &str) -> RuntimeMessage {
    (
        ErrorKind::Type,
        format!("Cannot add property '{name}' to object of type '{ty}'"),
    )
}

// Calls and construction

pub(crate) fn not_a_function(what: &str) -> RuntimeMessage {
    (
        ErrorKind::Type,
        format!("'{what}' undefined or not a function"),
    )
}

pub(crate) fn call_depth_exceeded(limit: usize) -> RuntimeMessage {
    (
        ErrorKind::Range,
        format!("Maximum call depth {limit} exceeded"),
    )
}

pub(crate) fn unchecked_function(name: &str) -> RuntimeMessage {
    (
        ErrorKind::General,
        format!("Function '{name}' has not been checked"),
    )
}

pub(crate) fn abstract_instantiation(class: &str) -> RuntimeMessage {
    (
        ErrorKind::Type,
        format!("Cannot instantiate abstract class '{class}'"),
    )
}

pub(crate) fn undefined_base(class: &str, base: &str, indirect: bool) -> RuntimeMessage {
    let how = if indirect { "indirectly derived" } else { "derived" };
    (
        ErrorKind::Type,
        format!("class '{class}' is {how} from undefined class '{base}'"),
    )
}

pub(crate) fn not_constructible(ty: &str) -> RuntimeMessage {
    (
        ErrorKind::Type,
        format!("Cannot instantiate object of type '{ty}'"),
    )
}

// Operators

pub(crate) fn requires_type(operator: &str) -> RuntimeMessage {
    (
        ErrorKind::Type,
        format!("Right hand side of '{operator}' must be a type"),
    )
}

pub(crate) fn in_requires_object() -> RuntimeMessage {
    (
        ErrorKind::Type,
        "Right hand side of 'in' must be an object".to_owned(),
    )
}

pub(crate) fn invalid_array_length() -> RuntimeMessage {
    (ErrorKind::Range, "Invalid array length".to_owned())
}

pub(crate) fn array_too_long(length: usize, limit: usize) -> RuntimeMessage {
    (
        ErrorKind::Range,
        format!("Array length {length} exceeds the limit of {limit} elements"),
    )
}

pub(crate) fn with_requires_object() -> RuntimeMessage {
    (
        ErrorKind::Type,
        "'with' requires an object".to_owned(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use qs_diagnostic::ErrorCode;

    #[test]
    fn compile_error_shows_first_error() {
        let error = EngineError::Compile(vec![
            Diagnostic::warning(ErrorCode::W2002).with_message("forward"),
            Diagnostic::error(ErrorCode::E2005)
                .with_message("Can only return from inside a function")
                .at_line(2),
        ]);
        let text = error.to_string();
        assert!(text.contains("E2005"));
        assert!(text.contains("line 2"));
        assert_eq!(error.diagnostics().len(), 2);
        assert!(error.as_runtime().is_none());
    }

    #[test]
    fn runtime_error_is_transparent() {
        let error = EngineError::from(EvalError {
            kind: ErrorKind::Reference,
            message: "Use of undefined variable 'x'".to_owned(),
            line: 4,
        });
        assert_eq!(
            error.to_string(),
            "ReferenceError: Use of undefined variable 'x' (line 4)"
        );
    }

    #[test]
    fn undefined_base_wording() {
        assert_eq!(
            undefined_base("Foo", "Bar", false).1,
            "class 'Foo' is derived from undefined class 'Bar'"
        );
        assert_eq!(
            undefined_base("Foo", "Bar", true).1,
            "class 'Foo' is indirectly derived from undefined class 'Bar'"
        );
    }
}
