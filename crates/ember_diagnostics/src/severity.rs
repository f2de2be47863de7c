//! How serious a diagnostic is.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a diagnostic stops a script from being compiled.
///
/// Warnings are reported alongside a successful compile. A single error
/// means no function is produced and no artifact is encoded.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Severity {
    /// Reported, but the script still compiles.
    Warning,
    /// The script is rejected.
    Error,
}

impl Severity {
    /// Returns `true` if a diagnostic of this severity rejects the script.
    pub fn rejects_script(self) -> bool {
        matches!(self, Severity::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}
