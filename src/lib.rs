//! # augtex
//!
//! Augmented formula trees for LaTeX math.
//!
//! A formula is parsed once into a tree whose every node has a stable,
//! path-based id. The tree serializes back to LaTeX in three modes (with
//! `\cssId` wrappers for a renderer, plain, or content-only) while recording
//! where each node landed in the output. On top of that sit two algorithms:
//!
//! - **Variable grouping**: wrap every occurrence of a named variable such as
//!   `x_i` in a [`NodeKind::Variable`] node.
//! - **Expression lookup**: find where an expression occurs in an annotated
//!   formula and report the display ids of the matched nodes.
//!
//! ```no_run
//! use augtex::{build_formula_with_variables, BuildOptions, LatexMode, ToLatex};
//!
//! let formula = build_formula_with_variables("x_i + y", &["x_i"], &BuildOptions::default())?;
//! assert_eq!(formula.latex(LatexMode::NoId), "x_{i}+y");
//! # Ok::<(), augtex::TreeBuildError>(())
//! ```

pub mod core;
pub mod utils;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use augtex_ir::{
    find_matching_subsequences, nodes_match, AugmentedFormula, Cell, ChildPath, FormulaBuilder,
    MatrixType, Node, NodeArena, NodeIndex, NodeKind, NodeRef, NodeTag,
};
pub use augtex_latex_backend::{
    consolidate, formulas_equal, IdRanges, LatexMode, LatexPart, RangeStyle, RangedLatex,
    StyledRange, ToLatex, ToStyledRanges,
};

pub use crate::core::builder::{
    build_formula, build_formula_with_variables, check_latex, is_valid_latex, BuildOptions,
    TreeBuilder,
};
pub use crate::core::grouping::{group_variables, VariablePattern};
pub use crate::core::lookup::{find_expression, find_expression_anywhere, ExpressionMatch};
pub use crate::core::render::{render_and_annotate, render_formula, RenderBackend, RenderedFormula};
pub use crate::utils::error::{
    FormulaError, FormulaResult, RenderPreconditionError, ScriptSlot, TreeBuildError,
};
pub use crate::utils::warnings::{BuildReport, BuildWarning, WarningKind};

/// Build `latex` with default options and group `variables`, then render it.
///
/// Convenience for hosts that keep no builder state between calls.
pub fn render_latex<B, S>(
    latex: &str,
    variables: &[S],
    backend: &B,
) -> FormulaResult<RenderedFormula>
where
    B: RenderBackend + ?Sized,
    S: AsRef<str>,
{
    let formula = build_formula_with_variables(latex, variables, &BuildOptions::default())?;
    Ok(render_formula(&formula, backend)?)
}
