//! Types every environment starts with.

use qs_ir::{StringInterner, TypeId};

use super::{Type, TypeArena, TypeKind};
use crate::{ErrorKind, TypeQualifiers};

/// Handles of the builtin Types.
#[derive(Copy, Clone, Debug)]
pub struct BuiltinTypes {
    pub undefined: TypeId,
    pub null: TypeId,
    pub boolean: TypeId,
    pub number: TypeId,
    pub string: TypeId,
    pub object: TypeId,
    pub array: TypeId,
    pub func_ref: TypeId,
    pub type_type: TypeId,
    pub error: TypeId,
    pub eval_error: TypeId,
    pub range_error: TypeId,
    pub reference_error: TypeId,
    pub syntax_error: TypeId,
    pub type_error: TypeId,
    pub uri_error: TypeId,
    /// Abstract holder of the `Math` constants and functions.
    pub math: TypeId,
}

impl BuiltinTypes {
    pub fn install(types: &mut TypeArena, interner: &StringInterner) -> Self {
        let mut make = |name: &str, kind: TypeKind| types.alloc(Type::new(interner.intern(name), kind));

        let undefined = make("undefined", TypeKind::Undefined);
        let null = make("null", TypeKind::Null);
        let boolean = make("Boolean", TypeKind::Boolean);
        let number = make("Number", TypeKind::Number);
        let string = make("String", TypeKind::String);
        let object = make("Object", TypeKind::Object);
        let array = make("Array", TypeKind::Array);
        let func_ref = make("Function", TypeKind::FuncRef);
        let type_type = make("Type", TypeKind::TypeType);
        let error = make("Error", TypeKind::Error);
        let math = types.alloc(
            Type::new(interner.intern("Math"), TypeKind::Class)
                .with_qualifiers(TypeQualifiers::ABSTRACT),
        );

        let mut builtins = BuiltinTypes {
            undefined,
            null,
            boolean,
            number,
            string,
            object,
            array,
            func_ref,
            type_type,
            error,
            eval_error: error,
            range_error: error,
            reference_error: error,
            syntax_error: error,
            type_error: error,
            uri_error: error,
            math,
        };

        for kind in ErrorKind::ALL {
            if matches!(kind, ErrorKind::General | ErrorKind::Throw) {
                continue;
            }
            let mut ty = Type::new(interner.intern(kind.class_name()), TypeKind::Error);
            ty.base = Some(error);
            let id = types.alloc(ty);
            *builtins.error_slot(kind) = id;
        }
        builtins
    }

    fn error_slot(&mut self, kind: ErrorKind) -> &mut TypeId {
        match kind {
            ErrorKind::General | ErrorKind::Throw => &mut self.error,
            ErrorKind::Eval => &mut self.eval_error,
            ErrorKind::Range => &mut self.range_error,
            ErrorKind::Reference => &mut self.reference_error,
            ErrorKind::Syntax => &mut self.syntax_error,
            ErrorKind::Type => &mut self.type_error,
            ErrorKind::Uri => &mut self.uri_error,
        }
    }

    /// Class used for Error values of `kind`.
    pub fn error_type(&self, kind: ErrorKind) -> TypeId {
        match kind {
            ErrorKind::General | ErrorKind::Throw => self.error,
            ErrorKind::Eval => self.eval_error,
            ErrorKind::Range => self.range_error,
            ErrorKind::Reference => self.reference_error,
            ErrorKind::Syntax => self.syntax_error,
            ErrorKind::Type => self.type_error,
            ErrorKind::Uri => self.uri_error,
        }
    }

    /// Error kind constructed by `new T(...)` for a builtin error class.
    pub fn error_kind_of(&self, ty: TypeId) -> Option<ErrorKind> {
        ErrorKind::ALL
            .into_iter()
            .filter(|k| *k != ErrorKind::Throw)
            .find(|&k| self.error_type(k) == ty)
    }

    /// Builtin classes exposed as globals, with their script names.
    pub fn classes(&self) -> [TypeId; 13] {
        [
            self.object,
            self.array,
            self.boolean,
            self.number,
            self.string,
            self.math,
            self.error,
            self.eval_error,
            self.range_error,
            self.reference_error,
            self.syntax_error,
            self.type_error,
            self.uri_error,
        ]
    }
}
