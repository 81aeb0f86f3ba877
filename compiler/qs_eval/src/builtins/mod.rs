//! Builtin globals and the members of builtin classes.
//!
//! Everything here is a [`NativeFunction`] or a static value installed on
//! the global Type (or a builtin class Type) when an environment starts.
//! The set is fixed, so registration is a flat table.

mod array;
mod boolean;
mod error;
mod global;
mod math;
mod number;
mod string;

use qs_ir::{StringInterner, TypeId};
use qs_object::{
    BuiltinTypes, MemberAttrs, MemberKind, NativeContext, NativeFunction, NewMember, Thrown,
    TypeArena, Value,
};

use crate::interpreter::Interpreter;

type NativeFnPtr = fn(&mut dyn NativeContext, &Value, &[Value]) -> Result<Value, Thrown>;

const GLOBAL_FUNCTIONS: &[(&str, NativeFnPtr)] = &[
    ("eval", global::eval),
    ("parseInt", global::parse_int),
    ("parseFloat", global::parse_float),
    ("isNaN", global::is_nan),
    ("isFinite", global::is_finite),
];

const DEBUG_FUNCTIONS: &[(&str, NativeFnPtr)] =
    &[("print", global::print), ("debug", global::print)];

const ARRAY_METHODS: &[(&str, NativeFnPtr)] = &[
    ("push", array::push),
    ("pop", array::pop),
    ("join", array::join),
    ("toString", array::to_string),
];

const MATH_FUNCTIONS: &[(&str, NativeFnPtr)] = &[
    ("abs", math::abs),
    ("acos", math::acos),
    ("asin", math::asin),
    ("atan", math::atan),
    ("atan2", math::atan2),
    ("ceil", math::ceil),
    ("cos", math::cos),
    ("exp", math::exp),
    ("floor", math::floor),
    ("log", math::log),
    ("max", math::max),
    ("min", math::min),
    ("pow", math::pow),
    ("random", math::random),
    ("round", math::round),
    ("sin", math::sin),
    ("sqrt", math::sqrt),
    ("tan", math::tan),
];

const STRING_METHODS: &[(&str, NativeFnPtr)] = &[
    ("toString", string::value_of),
    ("valueOf", string::value_of),
    ("charAt", string::char_at),
    ("charCodeAt", string::char_code_at),
    ("indexOf", string::index_of),
    ("lastIndexOf", string::last_index_of),
    ("find", string::index_of),
    ("findRev", string::last_index_of),
    ("replace", string::replace),
    ("split", string::split),
    ("substring", string::substring),
    ("mid", string::mid),
    ("left", string::left),
    ("right", string::right),
    ("toLowerCase", string::to_lower_case),
    ("lower", string::to_lower_case),
    ("toUpperCase", string::to_upper_case),
    ("upper", string::to_upper_case),
    ("isEmpty", string::is_empty),
    ("startsWith", string::starts_with),
    ("endsWith", string::ends_with),
];

const NUMBER_METHODS: &[(&str, NativeFnPtr)] = &[
    ("toString", number::to_string),
    ("valueOf", number::value_of),
];

const BOOLEAN_METHODS: &[(&str, NativeFnPtr)] = &[
    ("toString", boolean::to_string),
    ("valueOf", boolean::value_of),
];

/// Populate a fresh environment.
pub(crate) fn install(interpreter: &mut Interpreter) {
    let global = interpreter.global_type;
    let builtins = interpreter.builtins;
    declare_classes(
        &mut interpreter.types,
        &builtins,
        global,
        &interpreter.interner,
    );

    let constants = [
        ("NaN", Value::Number(f64::NAN)),
        ("Infinity", Value::Number(f64::INFINITY)),
        ("undefined", Value::Undefined),
    ];
    for (name, value) in constants {
        declare_static(
            &mut interpreter.types,
            &interpreter.interner,
            global,
            name,
            MemberAttrs::READABLE | MemberAttrs::STATIC,
            value,
        );
    }

    let debug_functions: &[(&str, NativeFnPtr)] = if interpreter.config.debug_globals {
        DEBUG_FUNCTIONS
    } else {
        &[]
    };
    let types = &mut interpreter.types;
    let interner = &interpreter.interner;
    for &(name, func) in GLOBAL_FUNCTIONS.iter().chain(debug_functions) {
        declare_native(types, interner, global, name, func);
    }
    for &(name, func) in ARRAY_METHODS {
        declare_native(types, interner, builtins.array, name, func);
    }
    declare_native(types, interner, builtins.object, "toString", object_to_string);
    declare_native(types, interner, builtins.error, "toString", error::to_string);

    for &(name, func) in STRING_METHODS {
        declare_native(types, interner, builtins.string, name, func);
    }
    declare_static_native(types, interner, builtins.string, "fromCharCode", string::from_char_code);
    for &(name, func) in NUMBER_METHODS {
        declare_native(types, interner, builtins.number, name, func);
    }
    for &(name, func) in BOOLEAN_METHODS {
        declare_native(types, interner, builtins.boolean, name, func);
    }
    for &(name, func) in MATH_FUNCTIONS {
        declare_static_native(types, interner, builtins.math, name, func);
    }

    let constant = MemberAttrs::READABLE | MemberAttrs::STATIC;
    for &(name, value) in number::CONSTANTS {
        declare_static(types, interner, builtins.number, name, constant, Value::Number(value));
    }
    for &(name, value) in math::CONSTANTS {
        declare_static(types, interner, builtins.math, name, constant, Value::Number(value));
    }
}

/// Bind the builtin class values as static members of `global`, so that
/// `new Array()` and `extends Error` find them.
pub(crate) fn declare_classes(
    types: &mut TypeArena,
    builtins: &BuiltinTypes,
    global: TypeId,
    interner: &StringInterner,
) {
    for class in builtins.classes() {
        let name = types.name_of(class, interner);
        declare_static(types, interner, global, name, MemberAttrs::CLASS, Value::Type(class));
    }
}

fn declare_static(
    types: &mut TypeArena,
    interner: &StringInterner,
    ty: TypeId,
    name: &str,
    attrs: MemberAttrs,
    value: Value,
) {
    let member = types.add_member(ty, interner.intern(name), NewMember::Variable, attrs);
    if let (Some(MemberKind::Static { index }), Some(owner)) =
        (member.map(|m| m.kind), types.get_mut(ty))
    {
        owner.set_static(index, value);
    }
}

fn declare_native(
    types: &mut TypeArena,
    interner: &StringInterner,
    ty: TypeId,
    name: &str,
    func: NativeFnPtr,
) {
    types.add_member(
        ty,
        interner.intern(name),
        NewMember::Native(NativeFunction::new(name, func)),
        MemberAttrs::FUNCTION,
    );
}

fn declare_static_native(
    types: &mut TypeArena,
    interner: &StringInterner,
    ty: TypeId,
    name: &str,
    func: NativeFnPtr,
) {
    types.add_member(
        ty,
        interner.intern(name),
        NewMember::Native(NativeFunction::new(name, func)),
        MemberAttrs::FUNCTION | MemberAttrs::STATIC,
    );
}

fn object_to_string(
    _cx: &mut dyn NativeContext,
    _this: &Value,
    _args: &[Value],
) -> Result<Value, Thrown> {
    Ok(Value::from("[object Object]"))
}

/// Argument `index`, `undefined` when missing.
fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or_default()
}
