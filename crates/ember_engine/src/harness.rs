//! Running compiled functions.

use crate::engine::Engine;
use crate::error::EngineError;
use ember_bytecode::FunctionDescriptor;
use ember_vm::Value;

impl Engine {
    /// Runs a top-level function in the current context and returns its
    /// completion value.
    pub fn run(&mut self, function: &FunctionDescriptor) -> Result<Value, EngineError> {
        let interpreter = self.interpreter;
        let result = interpreter.run(function, self.globals_mut());
        match &result {
            Ok(value) => tracing::debug!(
                function = function.display_name(),
                result = %value,
                "run finished"
            ),
            Err(err) => tracing::debug!(error = %err, "run failed"),
        }
        result.map_err(EngineError::from)
    }

    /// Compiles `source` fresh, bypassing the compilation cache, and runs it.
    pub fn eval(&mut self, source: &str) -> Result<Value, EngineError> {
        let function = self.compile_function(source)?;
        self.run(&function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_config::EngineConfig;
    use ember_vm::RuntimeError;

    #[test]
    fn eval_returns_completion_value() {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        assert_eq!(engine.eval("'a' + 1").unwrap(), Value::from("a1"));
    }

    #[test]
    fn contexts_have_separate_globals() {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        engine.eval("let shared = 1;").unwrap();
        assert_eq!(engine.eval("shared").unwrap(), Value::from(1.0));

        let other = engine.new_context();
        engine.enter(other).unwrap();
        assert!(matches!(
            engine.eval("shared"),
            Err(EngineError::Runtime(RuntimeError::ReferenceError { .. }))
        ));
    }

    #[test]
    fn call_depth_comes_from_config() {
        let mut config = EngineConfig::default();
        config.engine.max_call_depth = 16;
        let mut engine = Engine::new(config).unwrap();
        let err = engine
            .eval("function r(n) { return r(n + 1) } r(0)")
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Runtime(RuntimeError::StackOverflow { limit: 16 })
        ));
    }

    #[test]
    fn deeply_nested_source_is_a_compile_error() {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        let source = format!("{}1{}", "(".repeat(5000), ")".repeat(5000));
        let err = engine.eval(&source).unwrap_err();
        match err {
            EngineError::Compile { diagnostics, .. } => {
                assert!(diagnostics
                    .iter()
                    .any(|d| d.code == ember_diagnostics::DiagnosticCode::LIMIT));
            }
            other => panic!("expected compile error, got {other:?}"),
        }
    }
}
