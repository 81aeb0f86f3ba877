//! Dynamic `eval` of source text in the caller's scope.

use qs_check::CheckOptions;
use qs_ir::Name;
use qs_object::{ErrorKind, Frame, Payload, Thrown, Type, TypeKind, Value};
use tracing::debug;

use super::{completion_value, Interpreter};

impl Interpreter {
    /// Parse, check and run `source` on top of the current chain.
    ///
    /// The caller's frames form the resolver stack, so code inside `eval`
    /// sees the caller's variables. Its own declarations go to a fresh eval
    /// scope that lives until the environment is cleared.
    pub(crate) fn eval_dynamic(&mut self, source: &str) -> Result<Value, Thrown> {
        let program = match qs_parse::parse(source, &self.interner) {
            Ok(program) => program,
            Err(failure) => {
                let message = failure
                    .diagnostics
                    .first()
                    .map_or_else(String::new, |d| d.message.clone());
                return Err(self.throw((ErrorKind::Syntax, message)));
            }
        };

        let eval_scope = self.types.alloc(
            Type::new(Name::EMPTY, TypeKind::Eval)
                .with_enclosing(self.chain.last().map(|frame| frame.view)),
        );
        let mut scopes: Vec<_> = self.chain.iter().map(|frame| frame.view).collect();
        scopes.push(eval_scope);
        let options = CheckOptions {
            forbid_global_statements: false,
            allow_return: true,
            resolve_by_name: !self.chain_is_lexical(),
        };
        let diagnostics = qs_check::check(&program, &mut self.types, &self.interner, &scopes, options);
        self.heap.reset_recycled_slots(&mut self.types);
        if let Some(error) = diagnostics.first_error() {
            let message = error.message.clone();
            return Err(self.throw((ErrorKind::Eval, message)));
        }
        debug!(statements = program.body.len(), "eval");

        let storage = self.heap.alloc(&self.types, eval_scope, Payload::None);
        let completion = self.with_frame(Frame::new(eval_scope, Value::Object(storage)), |this| {
            this.exec_statements(&program.body)
        });
        completion_value(completion)
    }

    /// Every frame's view is enclosed by the view of the frame below it.
    /// Resolver addresses count enclosing links, so they only match the
    /// chain when this holds; a `with` frame breaks it.
    fn chain_is_lexical(&self) -> bool {
        self.chain.windows(2).all(|pair| {
            self.types.get(pair[1].view).and_then(|ty| ty.enclosing) == Some(pair[0].view)
        })
    }
}
