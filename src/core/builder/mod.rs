//! Tree builder
//!
//! Turns LaTeX math into an [`AugmentedFormula`]. The input is parsed with
//! `mitex-parser`; the resulting syntax tree is walked once and every
//! construct is mapped onto a node variant with a structural id.

mod context;
mod environment;
mod markup;
mod math;
mod utils;

pub use context::{BuildOptions, TreeBuilder, MATH_SPEC};

use augtex_ir::AugmentedFormula;

use crate::core::grouping::{group_variables, VariablePattern};
use crate::utils::error::TreeBuildError;

impl TreeBuilder {
    /// Build a formula and group every occurrence of the given variables.
    ///
    /// `variables` are LaTeX snippets such as `x_i`; blank entries are
    /// ignored and unparsable ones are matched as literal symbols.
    pub fn build_with_variables<S: AsRef<str>>(
        &mut self,
        latex: &str,
        variables: &[S],
    ) -> Result<AugmentedFormula, TreeBuildError> {
        let formula = self.build(latex)?;
        let patterns = VariablePattern::parse_all(variables);
        Ok(group_variables(&formula, &patterns))
    }
}

/// Build the formula tree of a LaTeX math string
pub fn build_formula(
    latex: &str,
    options: &BuildOptions,
) -> Result<AugmentedFormula, TreeBuildError> {
    TreeBuilder::with_options(options.clone()).build(latex)
}

/// Build a formula tree with the given variables already grouped
pub fn build_formula_with_variables<S: AsRef<str>>(
    latex: &str,
    variables: &[S],
    options: &BuildOptions,
) -> Result<AugmentedFormula, TreeBuildError> {
    TreeBuilder::with_options(options.clone()).build_with_variables(latex, variables)
}

/// Whether `latex` builds without errors in strict mode
pub fn is_valid_latex(latex: &str) -> bool {
    check_latex(latex).is_ok()
}

/// Strict-mode build, reporting why the input was rejected
pub fn check_latex(latex: &str) -> Result<(), TreeBuildError> {
    TreeBuilder::with_options(BuildOptions::strict())
        .build(latex)
        .map(|_| ())
}
