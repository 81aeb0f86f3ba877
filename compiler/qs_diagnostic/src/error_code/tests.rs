use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_error_code_display() {
    assert_eq!(ErrorCode::E2003.to_string(), "E2003");
    assert_eq!(ErrorCode::W2001.as_str(), "W2001");
}

#[test]
fn test_warning_classification() {
    assert!(ErrorCode::W2001.is_warning());
    assert!(ErrorCode::W2002.is_warning());
    assert!(!ErrorCode::E2005.is_warning());
}

#[test]
fn test_syntax_classification() {
    assert!(ErrorCode::E1003.is_syntax());
    assert!(!ErrorCode::E2001.is_syntax());
}

#[test]
fn test_from_str_round_trips_every_code() {
    for code in ErrorCode::ALL {
        assert_eq!(code.as_str().parse::<ErrorCode>(), Ok(*code));
    }
    assert_eq!("e2004".parse::<ErrorCode>(), Ok(ErrorCode::E2004));
    assert_eq!("X9999".parse::<ErrorCode>(), Err(()));
}
