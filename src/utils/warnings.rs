//! Non-fatal findings recorded while building in non-strict mode.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    /// An unknown command was kept as a literal symbol.
    UnknownCommand,
    /// An unknown environment was kept as a generic array.
    UnknownEnvironment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildWarning {
    pub kind: WarningKind,
    pub name: String,
    pub message: String,
}

impl BuildWarning {
    pub fn unknown_command(name: &str) -> Self {
        Self {
            kind: WarningKind::UnknownCommand,
            name: name.to_string(),
            message: format!("unknown command '{}' kept as a literal symbol", name),
        }
    }

    pub fn unknown_environment(name: &str) -> Self {
        Self {
            kind: WarningKind::UnknownEnvironment,
            name: name.to_string(),
            message: format!("unknown environment '{}' kept as a generic array", name),
        }
    }
}

/// The output of a build together with what was tolerated along the way.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport<T> {
    pub output: T,
    pub warnings: Vec<BuildWarning>,
}

impl<T> BuildReport<T> {
    pub fn new(output: T, warnings: Vec<BuildWarning>) -> Self {
        Self { output, warnings }
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}
