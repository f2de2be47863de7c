//! `ember eval` compiles and runs a script in one step.

use ember_engine::EngineError;

use crate::pipeline::{load_engine, read_source, report_diagnostics};
use crate::{EvalArgs, GlobalArgs};

/// Runs the `ember eval` command and prints the script's result.
pub fn run(args: &EvalArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let source = read_source(&args.file)?;
    let mut engine = load_engine(global)?;
    match engine.eval(&source) {
        Ok(value) => {
            println!("{value}");
            Ok(0)
        }
        Err(EngineError::Compile { diagnostics, .. }) => {
            let name = args.file.display().to_string();
            report_diagnostics(&diagnostics, &name, &source, args.format);
            Ok(1)
        }
        Err(e) => Err(e.into()),
    }
}
