//! Utility modules
//!
//! - Error types and result types
//! - Build warnings collected in non-strict mode

pub mod error;
pub mod warnings;

pub use error::{
    FormulaError, FormulaResult, RenderPreconditionError, ScriptSlot, TreeBuildError,
};
pub use warnings::{BuildReport, BuildWarning, WarningKind};
