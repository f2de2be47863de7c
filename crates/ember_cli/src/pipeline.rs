//! Helpers shared by the CLI commands: engine setup and diagnostic output.

use std::path::{Path, PathBuf};

use ember_config::{load_config, EngineConfig, CONFIG_FILE_NAME};
use ember_diagnostics::{Diagnostic, DiagnosticRenderer, JsonRenderer, TerminalRenderer};
use ember_engine::Engine;

use crate::{GlobalArgs, ReportFormat};

/// Picks the configuration file: `--config` if given, otherwise
/// `ember.toml` in the current directory if it exists.
pub fn resolve_config_path(global: &GlobalArgs) -> Option<PathBuf> {
    if let Some(path) = &global.config {
        return Some(path.clone());
    }
    let local = PathBuf::from(CONFIG_FILE_NAME);
    local.is_file().then_some(local)
}

/// Loads the configuration and creates an engine from it.
pub fn load_engine(global: &GlobalArgs) -> Result<Engine, Box<dyn std::error::Error>> {
    let config = match resolve_config_path(global) {
        Some(path) => {
            if global.verbose {
                eprintln!("  Using config {}", path.display());
            }
            load_config(&path)?
        }
        None => EngineConfig::default(),
    };
    Ok(Engine::new(config)?)
}

/// Reads a script file as UTF-8.
pub fn read_source(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()).into())
}

/// Renders compile diagnostics for `source` to stderr.
pub fn report_diagnostics(
    diagnostics: &[Diagnostic],
    name: &str,
    source: &str,
    format: ReportFormat,
) {
    let rendered = match format {
        ReportFormat::Text => TerminalRenderer.render_all(diagnostics, name, source),
        ReportFormat::Json => JsonRenderer.render_all(diagnostics, name, source),
    };
    eprint!("{rendered}");
}
