//! Host-facing engine.
//!
//! An [`Engine`] owns at most one live environment. Running code, calling
//! functions and touching globals all need one; after [`Engine::clear`] they
//! fail with [`EngineError::NotInitialized`] until [`Engine::init`] runs
//! again.

use std::fmt;
use std::ops::ControlFlow;
use std::rc::Rc;

use qs_diagnostic::Diagnostic;
use qs_ir::SharedInterner;
use qs_object::{ErrorKind, HostObject, NativeFunction, Value};

use crate::interpreter::{check_syntax, Interpreter};
use crate::{EngineError, EvalConfig, OutputSink};

/// Cooperative cancellation hook, polled on every loop iteration and call.
/// `Break(message)` raises a general Error carrying `message`.
pub type InterruptHook = Box<dyn FnMut() -> ControlFlow<String>>;

/// An embeddable QScript engine.
pub struct Engine {
    interner: SharedInterner,
    config: EvalConfig,
    env: Option<Interpreter>,
    /// Output sink and hook held while no environment is live.
    output: OutputSink,
    interrupt: Option<InterruptHook>,
}

impl Engine {
    /// Create an engine with a live environment.
    pub fn new(config: EvalConfig) -> Self {
        let mut engine = Engine {
            interner: SharedInterner::default(),
            config,
            env: None,
            output: OutputSink::default(),
            interrupt: None,
        };
        engine.init();
        engine
    }

    /// Create the builtins, the global Type and the global object. Does
    /// nothing when an environment is already live.
    pub fn init(&mut self) {
        if self.env.is_some() {
            return;
        }
        let env = Interpreter::new(
            self.interner.clone(),
            self.config.clone(),
            std::mem::take(&mut self.output),
            self.interrupt.take(),
        );
        self.env = Some(env);
    }

    /// Finalize and drop the environment: every declaration, global and
    /// instance is gone afterwards.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn clear(&mut self) {
        if let Some(env) = self.env.take() {
            let (output, interrupt) = env.teardown();
            self.output = output;
            self.interrupt = interrupt;
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.env.is_some()
    }

    fn env(&mut self) -> Result<&mut Interpreter, EngineError> {
        self.env.as_mut().ok_or(EngineError::NotInitialized)
    }

    /// Parse, check and run `source` in the global scope. Returns the value
    /// of the last statement that produced one.
    #[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
    pub fn evaluate(&mut self, source: &str) -> Result<Value, EngineError> {
        self.env()?.evaluate_program(source)
    }

    /// Parse and check `source` without running it or touching the global
    /// scope.
    pub fn check_syntax(&self, source: &str) -> Vec<Diagnostic> {
        check_syntax(source, &self.interner, &self.config)
    }

    /// Call the global function `name`.
    pub fn call(&mut self, name: &str, args: &[Value]) -> Result<Value, EngineError> {
        self.env()?.call_global(name, args)
    }

    /// Current value of the global `name`, if it exists.
    pub fn global(&mut self, name: &str) -> Option<Value> {
        self.env.as_mut()?.global(name)
    }

    pub fn set_global(&mut self, name: &str, value: Value) -> Result<(), EngineError> {
        self.env()?.set_global(name, value)
    }

    /// Expose a host function as a global. It is registered under its own
    /// name.
    pub fn register_function(&mut self, function: NativeFunction) -> Result<(), EngineError> {
        self.env()?.register_function(function);
        Ok(())
    }

    /// Expose a host object as the global `name`.
    pub fn register_object(
        &mut self,
        name: &str,
        object: Rc<dyn HostObject>,
    ) -> Result<(), EngineError> {
        self.env()?.register_object(name, object);
        Ok(())
    }

    pub fn set_interrupt_hook(&mut self, hook: impl FnMut() -> ControlFlow<String> + 'static) {
        let hook: InterruptHook = Box::new(hook);
        match self.env.as_mut() {
            Some(env) => env.interrupt = Some(hook),
            None => self.interrupt = Some(hook),
        }
    }

    /// Raise an exception at the next check point of running script code.
    pub fn raise(&mut self, kind: ErrorKind, message: impl Into<String>) -> Result<(), EngineError> {
        self.env()?.raise(kind, message.into());
        Ok(())
    }

    pub fn set_output(&mut self, output: OutputSink) {
        match self.env.as_mut() {
            Some(env) => env.output = output,
            None => self.output = output,
        }
    }

    /// Run a collection now. Returns the number of freed instances.
    pub fn collect_garbage(&mut self) -> Result<usize, EngineError> {
        Ok(self.env()?.collect_garbage(&[]))
    }

    /// Instances currently on the heap.
    pub fn live_objects(&self) -> usize {
        self.env.as_ref().map_or(0, Interpreter::live_objects)
    }

    /// Display form of a value, as `print` would show it.
    pub fn to_display_string(&mut self, value: &Value) -> Result<String, EngineError> {
        Ok(self.env()?.display(value))
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(EvalConfig::default())
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("initialized", &self.env.is_some())
            .finish_non_exhaustive()
    }
}
