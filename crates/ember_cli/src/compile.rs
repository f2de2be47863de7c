//! `ember compile` writes a script's artifact container to a file.

use ember_engine::EngineError;

use crate::pipeline::{load_engine, read_source, report_diagnostics};
use crate::{CompileArgs, GlobalArgs};

/// Runs the `ember compile` command.
///
/// Returns exit code 1 if the script does not compile.
pub fn run(args: &CompileArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let source = read_source(&args.input)?;
    let mut engine = load_engine(global)?;

    let (fingerprint, artifact) = match engine.compile(&source) {
        Ok(compiled) => compiled,
        Err(EngineError::Compile { diagnostics, .. }) => {
            let name = args.input.display().to_string();
            report_diagnostics(&diagnostics, &name, &source, args.format);
            return Ok(1);
        }
        Err(e) => return Err(e.into()),
    };

    let bytes = engine.encode(fingerprint, &artifact);
    std::fs::write(&args.out, &bytes)
        .map_err(|e| format!("cannot write {}: {e}", args.out.display()))?;

    if !global.quiet {
        eprintln!(
            "   Compiled {} -> {} ({} bytes, fingerprint {fingerprint})",
            args.input.display(),
            args.out.display(),
            bytes.len()
        );
    }
    Ok(0)
}
