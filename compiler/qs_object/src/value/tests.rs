use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_default_is_undefined() {
    assert!(Value::default().is_undefined());
    assert!(Value::Null.is_nullish());
    assert!(!Value::Bool(false).is_nullish());
}

#[test]
fn test_storage_identity() {
    let obj = Value::Object(ObjectId::new(3, 1));
    let ty = Value::Type(TypeId::new(3, 1));

    assert_eq!(obj.storage(), Some(Storage::Instance(ObjectId::new(3, 1))));
    assert_eq!(ty.storage(), Some(Storage::Statics(TypeId::new(3, 1))));
    assert_eq!(Value::from(1.0).storage(), None);
    assert_ne!(obj.storage(), ty.storage());
}

#[test]
fn test_same_handle() {
    let a = Value::Object(ObjectId::new(1, 0));
    let b = Value::Object(ObjectId::new(1, 1));
    assert!(a.same_handle(&a.clone()));
    assert!(!a.same_handle(&b));
    assert!(!Value::from("x").same_handle(&Value::from("x")));
}

#[test]
fn test_native_function_identity_respects_receiver() {
    let native = NativeFunction::new("f", |_, _, _| Ok(Value::Undefined));
    let f = FunctionValue::native(Name::from_raw(1), native);
    let bound = f.clone().bound_to(Value::Object(ObjectId::new(0, 0)));

    assert!(f.same_function(&f.clone()));
    assert!(!f.same_function(&bound));
}
