//! Error handling for formula tree construction and rendering
//!
//! Building a tree is the only hard failure; grouping and lookup report
//! "nothing found" through their return values instead.

use thiserror::Error;

/// Which script slot a [`TreeBuildError::DoubleScript`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptSlot {
    Subscript,
    Superscript,
}

impl ScriptSlot {
    /// The LaTeX token introducing this slot.
    pub fn token(self) -> &'static str {
        match self {
            ScriptSlot::Subscript => "_",
            ScriptSlot::Superscript => "^",
        }
    }
}

impl std::fmt::Display for ScriptSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptSlot::Subscript => write!(f, "subscript"),
            ScriptSlot::Superscript => write!(f, "superscript"),
        }
    }
}

/// A parse could not be turned into a formula tree.
///
/// Fatal for one build attempt. Callers either surface it or fall back to a
/// literal node, as the variable-pattern parser does.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeBuildError {
    /// The parser flagged the input as malformed.
    #[error("failed to build formula tree: parse error near `{0}`")]
    Parse(String),
    /// A construct the tree has no node variant for.
    #[error("failed to build formula tree: unsupported construct `{0}`")]
    Unsupported(String),
    #[error("failed to build formula tree: unknown command `{0}`")]
    UnknownCommand(String),
    #[error("failed to build formula tree: unknown environment `{0}`")]
    UnknownEnvironment(String),
    #[error("failed to build formula tree: `{0}` is missing a required argument")]
    MissingArgument(String),
    #[error("failed to build formula tree: double {0}")]
    DoubleScript(ScriptSlot),
    /// An id-wrapping command (`\cssId`, `\htmlClass`, ...) must wrap exactly
    /// one node.
    #[error("failed to build formula tree: `{command}` must wrap exactly one node, found {found}")]
    IdWrapperArity { command: String, found: usize },
    #[error("failed to build formula tree: unbalanced `{0}`")]
    UnbalancedDelimiter(String),
}

/// The render entry point was called before the typesetting backend was ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot render formula: the typesetting backend is not initialized")]
pub struct RenderPreconditionError;

/// Any failure surfaced by the public entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    #[error(transparent)]
    Build(#[from] TreeBuildError),
    #[error(transparent)]
    Render(#[from] RenderPreconditionError),
}

/// Result type for formula operations
pub type FormulaResult<T> = Result<T, FormulaError>;
