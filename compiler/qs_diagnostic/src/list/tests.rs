use super::*;
use crate::ErrorCode;
use pretty_assertions::assert_eq;

#[test]
fn test_warnings_do_not_fail() {
    let mut list = DiagnosticList::new();
    list.push(Diagnostic::warning(ErrorCode::W2001).with_message("duplicate"));

    assert!(!list.has_errors());
    assert_eq!(list.warnings().count(), 1);
    assert!(list.first_error().is_none());
}

#[test]
fn test_errors_accumulate_in_order() {
    let mut list = DiagnosticList::new();
    list.push(Diagnostic::error(ErrorCode::E2001).at_line(1));
    list.push(Diagnostic::warning(ErrorCode::W2002).at_line(2));
    list.push(Diagnostic::error(ErrorCode::E2005).at_line(3));

    assert!(list.has_errors());
    assert_eq!(list.len(), 3);
    let lines: Vec<u32> = list.errors().map(|d| d.line).collect();
    assert_eq!(lines, vec![1, 3]);
    assert_eq!(list.first_error().map(|d| d.code), Some(ErrorCode::E2001));
}
