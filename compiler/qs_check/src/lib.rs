//! Static binding resolver for QScript.
//!
//! One forward pass over a parsed program that:
//! - adds declared variables, functions and classes to Type member tables
//! - annotates identifiers with `(depth, slot)` addresses where possible
//! - creates activation, class and block Types and records them on the AST
//! - reports misplaced statements and declarations as diagnostics
//!
//! The pass never stops at the first problem; the caller decides whether the
//! collected diagnostics allow execution.

mod checker;

pub use checker::{check, CheckOptions, Checker};

#[cfg(test)]
mod tests;
