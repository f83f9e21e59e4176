//! Core functionality
//!
//! - Tree builder: LaTeX math to formula tree
//! - Variable grouping over built trees
//! - Expression lookup against annotated trees
//! - Render entry point

pub mod builder;
pub mod grouping;
pub mod lookup;
pub mod render;
