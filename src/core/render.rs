//! Render entry point
//!
//! The typesetting engine is a collaborator behind [`RenderBackend`]; this
//! module only checks its precondition and hands it render-mode LaTeX.

use augtex_ir::AugmentedFormula;
use augtex_latex_backend::{LatexMode, RangedLatex, ToLatex};
use log::debug;

use crate::utils::error::RenderPreconditionError;

/// A typesetting engine that turns LaTeX into display output.
pub trait RenderBackend {
    /// Whether the engine has finished loading and can typeset.
    fn is_initialized(&self) -> bool;

    /// Typeset render-mode LaTeX.
    fn typeset(&self, latex: &str) -> String;
}

/// Output of [`render_formula`].
#[derive(Debug, Clone)]
pub struct RenderedFormula {
    /// The render-mode LaTeX handed to the backend, with id ranges.
    pub latex: RangedLatex,
    /// Whatever the backend produced.
    pub output: String,
}

impl RenderedFormula {
    /// Structural ids that were emitted as `\cssId` wrappers, in pre-order.
    pub fn rendered_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.latex.ranges.keys().map(String::as_str)
    }
}

/// Render `formula` through `backend`.
///
/// Fails with [`RenderPreconditionError`] when the backend is not ready yet.
pub fn render_formula<B>(
    formula: &AugmentedFormula,
    backend: &B,
) -> Result<RenderedFormula, RenderPreconditionError>
where
    B: RenderBackend + ?Sized,
{
    if !backend.is_initialized() {
        return Err(RenderPreconditionError);
    }
    let latex = formula.to_latex(LatexMode::Render, 0);
    debug!("rendering {} bytes of LaTeX", latex.latex.len());
    let output = backend.typeset(&latex.latex);
    Ok(RenderedFormula { latex, output })
}

/// Render and then stamp every rendered node with its display id.
pub fn render_and_annotate<B>(
    formula: &mut AugmentedFormula,
    backend: &B,
) -> Result<RenderedFormula, RenderPreconditionError>
where
    B: RenderBackend + ?Sized,
{
    let rendered = render_formula(formula, backend)?;
    formula.annotate_rendered(rendered.rendered_ids());
    Ok(rendered)
}
