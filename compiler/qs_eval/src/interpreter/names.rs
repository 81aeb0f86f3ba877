//! Names the evaluator compares against on hot paths, interned once per
//! environment.

use qs_ir::{Name, StringInterner};

#[derive(Clone, Copy)]
pub(crate) struct KnownNames {
    pub(crate) arguments: Name,
    pub(crate) length: Name,
    pub(crate) name: Name,
    pub(crate) message: Name,
    pub(crate) line_number: Name,
    pub(crate) value: Name,
    pub(crate) to_string: Name,
}

impl KnownNames {
    pub(crate) fn new(interner: &StringInterner) -> Self {
        KnownNames {
            arguments: interner.intern("arguments"),
            length: interner.intern("length"),
            name: interner.intern("name"),
            message: interner.intern("message"),
            line_number: interner.intern("lineNumber"),
            value: interner.intern("value"),
            to_string: interner.intern("toString"),
        }
    }
}
