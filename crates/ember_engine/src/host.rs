//! The host-facing entry points, `compileScript` and `runScript`.
//!
//! Hosts pass loosely typed arguments; both entry points check arity and
//! type before touching the engine and report violations as `TypeError`s.

use crate::engine::Engine;
use crate::error::EngineError;
use crate::lifecycle::{ArtifactLifecycle, LifecycleState};
use ember_codec::{container, CachedData};
use ember_vm::Value;
use std::fmt;

const COMPILE_SCRIPT_ARGS: &str =
    "Wrong arguments: compileScript only accepts one argument of type String";
const RUN_SCRIPT_ARGS: &str =
    "Wrong arguments: runScript only accepts one argument of type Buffer";

/// A value crossing the host boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    /// `undefined`
    Undefined,
    /// `null`
    Null,
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(f64),
    /// A string.
    String(String),
    /// Raw bytes.
    Buffer(Vec<u8>),
    /// A script function, by name.
    Function(String),
}

impl From<Value> for HostValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Undefined => HostValue::Undefined,
            Value::Null => HostValue::Null,
            Value::Bool(b) => HostValue::Bool(b),
            Value::Number(n) => HostValue::Number(n),
            Value::String(s) => HostValue::String(s.to_string()),
            Value::Function(f) => HostValue::Function(f.display_name().to_string()),
        }
    }
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Undefined => f.write_str("undefined"),
            HostValue::Null => f.write_str("null"),
            HostValue::Bool(b) => write!(f, "{b}"),
            HostValue::Number(n) => f.write_str(&ember_vm::value::number_to_string(*n)),
            HostValue::String(s) => f.write_str(s),
            HostValue::Buffer(bytes) => write!(f, "<Buffer {} bytes>", bytes.len()),
            HostValue::Function(name) => write!(f, "[Function: {name}]"),
        }
    }
}

/// Errors raised to the host.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Bad arguments, or a script that does not compile.
    #[error("TypeError: {0}")]
    TypeError(String),

    /// Any other engine failure.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Compiles a script passed as a single string into container bytes.
pub fn compile_script(engine: &mut Engine, args: &[HostValue]) -> Result<HostValue, HostError> {
    let [HostValue::String(source)] = args else {
        return Err(HostError::TypeError(COMPILE_SCRIPT_ARGS.to_string()));
    };
    let mut lifecycle = ArtifactLifecycle::new();
    let bytes = compile_artifact(engine, source, &mut lifecycle).map_err(|err| {
        match lifecycle.fail(err) {
            EngineError::Compile { message, .. } => {
                HostError::TypeError(format!("Error compiling your script: {message}"))
            }
            other => HostError::Engine(other),
        }
    })?;
    Ok(HostValue::Buffer(bytes))
}

fn compile_artifact(
    engine: &mut Engine,
    source: &str,
    lifecycle: &mut ArtifactLifecycle,
) -> Result<Vec<u8>, EngineError> {
    let (fingerprint, artifact) = engine.compile(source)?;
    let bytes = engine.encode(fingerprint, &artifact);
    lifecycle.advance(LifecycleState::Encoded)?;
    Ok(bytes)
}

/// Runs container bytes passed as a single buffer and returns the result.
///
/// The fingerprint stored in the container is the one handed to the
/// decoder. The decoded function is registered under the configured
/// placeholder key and then obtained back through the compilation cache.
pub fn run_script(engine: &mut Engine, args: &[HostValue]) -> Result<HostValue, HostError> {
    let [HostValue::Buffer(bytes)] = args else {
        return Err(HostError::TypeError(RUN_SCRIPT_ARGS.to_string()));
    };
    let mut lifecycle = ArtifactLifecycle::externalized();
    let value = run_artifact(engine, bytes, &mut lifecycle).map_err(|err| lifecycle.fail(err))?;
    Ok(HostValue::from(value))
}

fn run_artifact(
    engine: &mut Engine,
    bytes: &[u8],
    lifecycle: &mut ArtifactLifecycle,
) -> Result<Value, EngineError> {
    let data = CachedData::new(bytes.to_vec());
    let Ok(fingerprint) = container::read_fingerprint(data.bytes()) else {
        data.reject();
        return Err(EngineError::CacheRejected);
    };
    let function = match engine.decode_cached(&data, fingerprint) {
        Ok(function) => function,
        Err(_) if data.rejected() => return Err(EngineError::CacheRejected),
        Err(err) => return Err(err),
    };
    lifecycle.advance(LifecycleState::Decoded)?;

    let placeholder = engine.config().artifact.placeholder_key.clone();
    let context = engine.current_context();
    let mode = engine.flags().language_mode;
    engine.register(&placeholder, context, mode, function);
    lifecycle.advance(LifecycleState::Registered)?;

    let function = engine.compile_with_cache(&placeholder, Some(&data))?;
    let value = engine.run(&function)?;
    lifecycle.advance(LifecycleState::Executed)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_config::EngineConfig;

    fn engine() -> Engine {
        Engine::new(EngineConfig::default()).unwrap()
    }

    #[test]
    fn compile_script_checks_arguments() {
        let mut engine = engine();
        for args in [
            vec![],
            vec![HostValue::Number(1.0)],
            vec![HostValue::String("1".into()), HostValue::String("2".into())],
        ] {
            let err = compile_script(&mut engine, &args).unwrap_err();
            assert_eq!(
                err.to_string(),
                "TypeError: Wrong arguments: compileScript only accepts one argument of type String"
            );
        }
    }

    #[test]
    fn run_script_checks_arguments() {
        let mut engine = engine();
        let err = run_script(&mut engine, &[HostValue::String("1".into())]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "TypeError: Wrong arguments: runScript only accepts one argument of type Buffer"
        );
    }

    #[test]
    fn compile_failure_is_type_error() {
        let mut engine = engine();
        let err = compile_script(&mut engine, &[HostValue::String("let 1".into())]).unwrap_err();
        assert!(matches!(&err, HostError::TypeError(m) if m.starts_with("Error compiling your script")));
    }

    #[test]
    fn compile_failure_ends_the_lifecycle() {
        let mut engine = engine();
        let mut lifecycle = ArtifactLifecycle::new();
        let err = compile_artifact(&mut engine, "let 1", &mut lifecycle)
            .map_err(|err| lifecycle.fail(err))
            .unwrap_err();
        assert!(matches!(err, EngineError::Compile { .. }));
        assert_eq!(
            lifecycle.state(),
            LifecycleState::Failed(crate::lifecycle::FailureKind::Compile)
        );
    }

    #[test]
    fn compiled_artifact_reaches_encoded() {
        let mut engine = engine();
        let mut lifecycle = ArtifactLifecycle::new();
        let bytes = compile_artifact(&mut engine, "1 + 1", &mut lifecycle).unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(lifecycle.state(), LifecycleState::Encoded);
    }

    #[test]
    fn compile_then_run() {
        let mut engine = engine();
        let buffer = compile_script(&mut engine, &[HostValue::String("'n=' + (40 + 2)".into())]).unwrap();
        assert!(matches!(buffer, HostValue::Buffer(_)));
        let result = run_script(&mut engine, &[buffer]).unwrap();
        assert_eq!(result, HostValue::String("n=42".to_string()));
    }

    #[test]
    fn short_buffer_is_cache_rejected() {
        let mut engine = engine();
        let err = run_script(&mut engine, &[HostValue::Buffer(vec![1, 2])]).unwrap_err();
        assert!(matches!(err, HostError::Engine(EngineError::CacheRejected)));
    }

    #[test]
    fn display() {
        assert_eq!(HostValue::Number(303.0).to_string(), "303");
        assert_eq!(HostValue::Buffer(vec![0; 3]).to_string(), "<Buffer 3 bytes>");
        assert_eq!(HostValue::from(Value::Null), HostValue::Null);
    }
}
