//! Diagnostic system for the script compiler front end.
//!
//! - Error codes for searchability
//! - Line-anchored messages
//! - Accumulating lists so one check reports every problem

mod diagnostic;
mod error_code;
mod list;

pub use diagnostic::{Diagnostic, Severity};
pub use error_code::ErrorCode;
pub use list::DiagnosticList;
