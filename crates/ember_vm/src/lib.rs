//! Bytecode interpreter for compiled ember scripts.
//!
//! The interpreter runs a [`FunctionDescriptor`](ember_bytecode::FunctionDescriptor)
//! against the [`Globals`] of one context. It does not care whether the
//! function came from the compiler or was rebuilt from a cached artifact.

#![warn(missing_docs)]

pub mod error;
pub mod globals;
pub mod interpreter;
pub mod stubs;
pub mod value;

pub use error::RuntimeError;
pub use globals::Globals;
pub use interpreter::{Interpreter, DEFAULT_MAX_CALL_DEPTH};
pub use value::Value;

#[cfg(test)]
mod tests {
    use super::*;
    use ember_bytecode::{FunctionDescriptor, Script, StubCache};
    use ember_common::{Interner, LanguageMode};
    use ember_diagnostics::DiagnosticSink;
    use std::sync::Arc;

    const GREETING: &str = "function foo(){return 'Hello '} function bar(){return 'World: '} \
                            function baz(){let a=1;let b=2;let c=300;return a+b+c} foo()+bar()+baz()";

    fn compile(source: &str, mode: LanguageMode) -> FunctionDescriptor {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let mut stubs = StubCache::new();
        let program = ember_parser::parse_script(source, &interner, &sink);
        let function = ember_compiler::compile_program(
            &program,
            Arc::new(Script::new(source)),
            mode,
            &interner,
            &mut stubs,
            &sink,
        )
        .unwrap();
        assert!(!sink.has_errors(), "{:?}", sink.take_all());
        function
    }

    fn eval(source: &str) -> Result<Value, RuntimeError> {
        let function = compile(source, LanguageMode::Sloppy);
        Interpreter::default().run(&function, &mut Globals::new())
    }

    #[test]
    fn greeting_script() {
        assert_eq!(eval(GREETING).unwrap(), Value::from("Hello World: 303"));
    }

    #[test]
    fn completion_value_is_last_expression() {
        assert_eq!(eval("1; 2; 3").unwrap(), Value::from(3.0));
        assert_eq!(eval("let x = 5;").unwrap(), Value::Undefined);
        assert_eq!(eval("").unwrap(), Value::Undefined);
        assert_eq!(eval("let x = 1; x = x + 1; if (x > 1) { x * 10 }").unwrap(), Value::from(20.0));
    }

    #[test]
    fn loops_and_locals() {
        let source = "function sum(n) { let total = 0; let i = 1; \
                      while (i <= n) { total = total + i; i = i + 1; } return total; } sum(100)";
        assert_eq!(eval(source).unwrap(), Value::from(5050.0));
    }

    #[test]
    fn recursion_through_globals() {
        let source = "function fib(n) { if (n < 2) { return n; } return fib(n - 1) + fib(n - 2); } fib(15)";
        assert_eq!(eval(source).unwrap(), Value::from(610.0));
    }

    #[test]
    fn missing_and_extra_arguments() {
        assert_eq!(eval("function f(a, b) { return b; } f(1)").unwrap(), Value::Undefined);
        assert_eq!(eval("function f(a) { return a; } f(1, 2, 3)").unwrap(), Value::from(1.0));
    }

    #[test]
    fn short_circuit_operators() {
        assert_eq!(eval("0 || 'fallback'").unwrap(), Value::from("fallback"));
        assert_eq!(eval("'' && missing").unwrap(), Value::from(""));
        assert_eq!(eval("1 && 2").unwrap(), Value::from(2.0));
    }

    #[test]
    fn typeof_and_unary() {
        assert_eq!(eval("typeof 'a'").unwrap(), Value::from("string"));
        assert_eq!(eval("function f() {} typeof f").unwrap(), Value::from("function"));
        assert_eq!(eval("!0").unwrap(), Value::from(true));
        assert_eq!(eval("-'3'").unwrap(), Value::from(-3.0));
    }

    #[test]
    fn undefined_variable_is_reference_error() {
        let err = eval("nope + 1").unwrap_err();
        assert_eq!(err.to_string(), "ReferenceError: nope is not defined");
    }

    #[test]
    fn calling_non_function_is_type_error() {
        let err = eval("let x = 1; x()").unwrap_err();
        assert!(matches!(err, RuntimeError::TypeError { .. }));
        assert_eq!(err.to_string(), "TypeError: 1 is not a function");
    }

    #[test]
    fn throw_is_uncaught() {
        let err = eval("throw 'boom'").unwrap_err();
        assert!(matches!(&err, RuntimeError::Uncaught(v) if *v == Value::from("boom")));
    }

    #[test]
    fn const_global_assignment_fails() {
        let err = eval("const k = 1; k = 2").unwrap_err();
        assert!(matches!(err, RuntimeError::TypeError { .. }));
    }

    #[test]
    fn strict_mode_rejects_implicit_globals() {
        let function = compile("function f() { leak = 1; } f(); leak", LanguageMode::Strict);
        let err = Interpreter::default()
            .run(&function, &mut Globals::new())
            .unwrap_err();
        assert!(matches!(err, RuntimeError::ReferenceError { .. }));

        let function = compile("function f() { leak = 1; } f(); leak", LanguageMode::Sloppy);
        let value = Interpreter::default()
            .run(&function, &mut Globals::new())
            .unwrap();
        assert_eq!(value, Value::from(1.0));
    }

    #[test]
    fn stack_depth_is_limited() {
        let function = compile("function down(n) { return down(n + 1); } down(0)", LanguageMode::Sloppy);
        let err = Interpreter::new(64)
            .run(&function, &mut Globals::new())
            .unwrap_err();
        assert!(matches!(err, RuntimeError::StackOverflow { limit: 64 }));
    }

    #[test]
    fn globals_persist_across_runs() {
        let mut globals = Globals::new();
        let interpreter = Interpreter::default();
        let first = compile("let counter = 41;", LanguageMode::Sloppy);
        interpreter.run(&first, &mut globals).unwrap();
        let second = compile("counter + 1", LanguageMode::Sloppy);
        assert_eq!(interpreter.run(&second, &mut globals).unwrap(), Value::from(42.0));
        // Declarations replace, so the same script can run again.
        interpreter.run(&first, &mut globals).unwrap();
    }
}
