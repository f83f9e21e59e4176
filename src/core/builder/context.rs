//! Builder state and options.

use augtex_ir::{AugmentedFormula, FormulaBuilder, NodeIndex, NodeKind};
use fxhash::FxHashMap;
use lazy_static::lazy_static;
use log::debug;
use mitex_parser::CommandSpec;
use mitex_spec_gen::DEFAULT_SPEC;

use crate::utils::error::TreeBuildError;
use crate::utils::warnings::{BuildReport, BuildWarning};

// =============================================================================
// Build options
// =============================================================================

/// Options for turning LaTeX math into a formula tree
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Prefix of every structural id. Root `i` gets `"{prefix}.{i}"`, or
    /// just `"{i}"` when the prefix is empty.
    /// Default: empty
    pub id_prefix: String,

    /// Non-strict mode: keep unknown commands and environments instead of
    /// failing the build
    /// Default: true
    pub non_strict: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            id_prefix: String::new(),
            non_strict: true,
        }
    }
}

impl BuildOptions {
    /// Create new options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict mode options (errors on unknown commands and environments)
    pub fn strict() -> Self {
        Self {
            non_strict: false,
            ..Self::default()
        }
    }

    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }
}

lazy_static! {
    /// Command specification handed to the parser
    pub static ref MATH_SPEC: CommandSpec = {
        let commands: FxHashMap<String, _> = DEFAULT_SPEC
            .items()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();

        CommandSpec::new(commands)
    };
}

// =============================================================================
// Tree builder
// =============================================================================

/// Walks the parser's syntax tree and assembles an [`AugmentedFormula`].
pub struct TreeBuilder {
    pub(super) options: BuildOptions,
    pub(super) arena: FormulaBuilder,
    pub(super) spec: CommandSpec,
    warnings: Vec<BuildWarning>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    /// Create a new builder with default options
    pub fn new() -> Self {
        Self::with_options(BuildOptions::default())
    }

    pub fn with_options(options: BuildOptions) -> Self {
        Self {
            options,
            arena: FormulaBuilder::new(),
            spec: MATH_SPEC.clone(),
            warnings: Vec::new(),
        }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut BuildOptions {
        &mut self.options
    }

    /// Build the formula tree of a LaTeX math string.
    ///
    /// Warnings from a previous build are discarded.
    pub fn build(&mut self, latex: &str) -> Result<AugmentedFormula, TreeBuildError> {
        self.warnings.clear();
        self.arena = FormulaBuilder::new();

        let tree = mitex_parser::parse(latex, self.spec.clone());
        let roots = self.build_sequence(tree.children_with_tokens());
        let arena = std::mem::take(&mut self.arena);
        let roots = roots?;

        let formula = arena.finish(roots, &self.options.id_prefix);
        debug!(
            "built formula with {} nodes and {} warnings",
            formula.len(),
            self.warnings.len()
        );
        Ok(formula)
    }

    /// Build and return the warnings collected along the way
    pub fn build_with_report(
        &mut self,
        latex: &str,
    ) -> Result<BuildReport<AugmentedFormula>, TreeBuildError> {
        let formula = self.build(latex)?;
        Ok(BuildReport::new(formula, self.take_warnings()))
    }

    /// Consume the warnings of the last build.
    pub fn take_warnings(&mut self) -> Vec<BuildWarning> {
        std::mem::take(&mut self.warnings)
    }

    pub(super) fn warn(&mut self, warning: BuildWarning) {
        debug!("{}", warning.message);
        self.warnings.push(warning);
    }

    pub(super) fn symbol(&mut self, text: impl Into<String>) -> NodeIndex {
        self.arena.alloc(NodeKind::symbol(text))
    }

    pub(super) fn space(&mut self, text: impl Into<String>) -> NodeIndex {
        self.arena.alloc(NodeKind::Space { text: text.into() })
    }

    /// A braced group, collapsed to its only child unless that child is a
    /// color switch (which needs the braces to stay scoped).
    pub(super) fn group(&mut self, body: Vec<NodeIndex>) -> NodeIndex {
        if let [only] = body.as_slice() {
            if !matches!(self.arena.kind(*only), NodeKind::Color { .. }) {
                return *only;
            }
        }
        self.arena.alloc(NodeKind::group(body))
    }
}
