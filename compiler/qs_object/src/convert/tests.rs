use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_number_to_string() {
    assert_eq!(number_to_string(2.0), "2");
    assert_eq!(number_to_string(-0.0), "0");
    assert_eq!(number_to_string(0.5), "0.5");
    assert_eq!(number_to_string(f64::NAN), "NaN");
    assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
    assert_eq!(number_to_string(1e21), "1e+21");
    assert_eq!(number_to_string(1.5e-7), "1.5e-7");
}

#[test]
fn test_string_to_number() {
    assert_eq!(string_to_number("  42 "), 42.0);
    assert_eq!(string_to_number(""), 0.0);
    assert_eq!(string_to_number("0x1F"), 31.0);
    assert_eq!(string_to_number("-Infinity"), f64::NEG_INFINITY);
    assert_eq!(string_to_number("1e3"), 1000.0);
    assert!(string_to_number("inf").is_nan());
    assert!(string_to_number("12px").is_nan());
}

#[test]
fn test_truthiness() {
    assert!(!truthy(&Value::Number(f64::NAN)));
    assert!(!truthy(&Value::from("")));
    assert!(truthy(&Value::from("0")));
    assert!(!truthy(&Value::Null));
}

#[test]
fn test_int32_wraps() {
    assert_eq!(to_int32(4_294_967_295.0), -1);
    assert_eq!(to_int32(-1.5), -1);
    assert_eq!(to_uint32(-1.0), 4_294_967_295);
    assert_eq!(to_int32(f64::INFINITY), 0);
}

#[test]
fn test_parse_int_radix_rules() {
    assert_eq!(parse_int("  -17abc", None), -17.0);
    assert_eq!(parse_int("0x1f", None), 31.0);
    assert_eq!(parse_int("017", None), 15.0);
    assert_eq!(parse_int("0", None), 0.0);
    assert_eq!(parse_int("ff", Some(16)), 255.0);
    assert_eq!(parse_int("0xff", Some(16)), 255.0);
    assert_eq!(parse_int("101", Some(2)), 5.0);
    assert!(parse_int("10", Some(37)).is_nan());
    assert!(parse_int("10", Some(1)).is_nan());
    assert!(parse_int("xyz", None).is_nan());
}

#[test]
fn test_parse_float_prefix() {
    assert_eq!(parse_float("3.25abc"), 3.25);
    assert_eq!(parse_float("  -.5"), -0.5);
    assert_eq!(parse_float("1e2x"), 100.0);
    assert_eq!(parse_float("1e"), 1.0);
    assert_eq!(parse_float("Infinityx"), f64::INFINITY);
    assert!(parse_float(".").is_nan());
    assert!(parse_float("abc").is_nan());
}
