//! `ember run` executes an artifact file through the host entry point.

use ember_engine::{run_script, HostValue};

use crate::pipeline::load_engine;
use crate::{GlobalArgs, RunArgs};

/// Runs the `ember run` command and prints the script's result.
pub fn run(args: &RunArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let bytes = std::fs::read(&args.file)
        .map_err(|e| format!("cannot read {}: {e}", args.file.display()))?;
    let mut engine = load_engine(global)?;
    let result = run_script(&mut engine, &[HostValue::Buffer(bytes)])?;
    println!("{result}");
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compile, CompileArgs, ReportFormat};

    fn quiet() -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            config: None,
        }
    }

    #[test]
    fn compile_then_run() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("app.js");
        let out = dir.path().join("app.bin");
        std::fs::write(
            &input,
            "function foo(){return 'Hello '} function bar(){return 'World: '} \
             function baz(){let a=1;let b=2;let c=300;return a+b+c} foo()+bar()+baz()",
        )
        .unwrap();
        let compile_args = CompileArgs {
            input,
            out: out.clone(),
            format: ReportFormat::Text,
        };
        assert_eq!(compile::run(&compile_args, &quiet()).unwrap(), 0);
        assert_eq!(run(&RunArgs { file: out }, &quiet()).unwrap(), 0);
    }

    #[test]
    fn garbage_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("junk.bin");
        std::fs::write(&file, b"not an artifact at all").unwrap();
        let err = run(&RunArgs { file }, &quiet()).unwrap_err();
        assert_eq!(err.to_string(), "cache rejected");
    }

    #[test]
    fn missing_file_fails() {
        let file = std::path::PathBuf::from("/nonexistent/app.bin");
        assert!(run(&RunArgs { file }, &quiet()).is_err());
    }
}
