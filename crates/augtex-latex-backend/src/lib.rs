//! Formula tree to LaTeX backend.
//!
//! Serializes an [`AugmentedFormula`] (or any node of it) in one of three
//! [`LatexMode`]s while tracking where every node landed in the output, and
//! derives editor decorations from the id-free serialization.

mod ranges;
mod styled;

pub use ranges::{consolidate, IdRanges, LatexPart, RangedLatex};
pub use styled::{RangeStyle, StyledRange, ToStyledRanges};

use augtex_ir::{AugmentedFormula, Cell, NodeIndex, NodeKind, NodeRef};
use lazy_static::lazy_static;
use regex::Regex;

/// How node identity shows up in the serialized LaTeX.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LatexMode {
    /// Every node is wrapped in `\cssId{<id>}{...}` for the renderer.
    Render,
    /// Plain LaTeX, used for editors and structural equality.
    #[default]
    NoId,
    /// Like [`LatexMode::NoId`], but the node's own decorative command is
    /// dropped as well.
    ContentOnly,
}

lazy_static! {
    static ref TRAILING_CONTROL_WORD: Regex =
        Regex::new(r"\\[a-zA-Z]+$").expect("control word regex");
}

/// Whether `next` must be separated from `prev` by a space so that a control
/// word at the end of `prev` does not absorb the letters of `next`.
pub fn needs_separator(prev: &str, next: &str) -> bool {
    next.starts_with(|c: char| c.is_ascii_alphabetic()) && TRAILING_CONTROL_WORD.is_match(prev)
}

/// Serialization with id ranges.
pub trait ToLatex {
    /// Serialize into a fragment that will sit at `offset` in the caller's
    /// output; every range is expressed in that coordinate space.
    fn to_latex(&self, mode: LatexMode, offset: usize) -> RangedLatex;

    fn latex(&self, mode: LatexMode) -> String {
        self.to_latex(mode, 0).latex
    }
}

impl ToLatex for AugmentedFormula {
    fn to_latex(&self, mode: LatexMode, offset: usize) -> RangedLatex {
        let mut parts = Parts::default();
        parts.sequence(self, self.root_indices(), mode);
        consolidate(parts.into_inner(), offset, None)
    }
}

impl ToLatex for NodeRef<'_> {
    fn to_latex(&self, mode: LatexMode, offset: usize) -> RangedLatex {
        let node = *self;
        let inner = match mode {
            LatexMode::ContentOnly => content_parts(node),
            _ => node_parts(node, mode),
        };

        match mode {
            LatexMode::Render => {
                let wrapped = vec![
                    LatexPart::Text(format!("\\cssId{{{}}}{{", node.id())),
                    consolidate(inner.into_inner(), 0, None).into(),
                    "}".into(),
                ];
                consolidate(wrapped, offset, Some(node.id()))
            }
            LatexMode::NoId | LatexMode::ContentOnly => {
                consolidate(inner.into_inner(), offset, Some(node.id()))
            }
        }
    }
}

/// Structural equality: two formulas are equal iff their id-free LaTeX is
/// identical.
pub fn formulas_equal(a: &AugmentedFormula, b: &AugmentedFormula) -> bool {
    a.latex(LatexMode::NoId) == b.latex(LatexMode::NoId)
}

// =============================================================================
// Fragment assembly
// =============================================================================

/// Accumulates fragments, inserting a space wherever a control word would
/// otherwise run into a following letter.
#[derive(Default)]
struct Parts {
    parts: Vec<LatexPart>,
    tail: String,
}

impl Parts {
    fn text(&mut self, text: impl Into<String>) {
        self.push(LatexPart::Text(text.into()));
    }

    fn push(&mut self, part: LatexPart) {
        let latex = part.latex();
        if latex.is_empty() {
            if let LatexPart::Ranged(_) = part {
                self.parts.push(part);
            }
            return;
        }
        if needs_separator(&self.tail, latex) {
            self.parts.push(LatexPart::Text(" ".to_string()));
        }
        self.tail = latex.to_string();
        self.parts.push(part);
    }

    fn node(&mut self, node: NodeRef<'_>, mode: LatexMode) {
        self.push(node.to_latex(mode, 0).into());
    }

    fn sequence(&mut self, formula: &AugmentedFormula, items: &[NodeIndex], mode: LatexMode) {
        for &item in items {
            self.node(formula.node(item), mode);
        }
    }

    /// A command argument: `{...}` unless the child already brings braces.
    fn braced(&mut self, node: NodeRef<'_>, mode: LatexMode) {
        let has_braces = mode != LatexMode::Render
            && matches!(
                printed(node, mode).kind(),
                NodeKind::Group {
                    synthetic: false,
                    ..
                }
            );
        if has_braces {
            self.node(node, mode);
        } else {
            self.text("{");
            self.node(node, mode);
            self.text("}");
        }
    }

    fn grid(&mut self, formula: &AugmentedFormula, rows: &[Vec<Cell>], mode: LatexMode) {
        for (r, row) in rows.iter().enumerate() {
            if r > 0 {
                self.text(" \\\\ ");
            }
            for (c, cell) in row.iter().enumerate() {
                if c > 0 {
                    self.text(" & ");
                }
                self.sequence(formula, cell, mode);
            }
        }
    }

    fn into_inner(self) -> Vec<LatexPart> {
        self.parts
    }
}

/// Own markup of `node` with children serialized in `mode`.
fn node_parts(node: NodeRef<'_>, mode: LatexMode) -> Parts {
    let formula = node.formula();
    let mut out = Parts::default();

    match node.kind() {
        NodeKind::Symbol { text } | NodeKind::Space { text } => out.text(text.as_str()),
        NodeKind::Group { body, synthetic } => {
            if *synthetic {
                out.sequence(formula, body, mode);
            } else {
                out.text("{");
                out.sequence(formula, body, mode);
                out.text("}");
            }
        }
        NodeKind::Fraction {
            command,
            numerator,
            denominator,
        } => {
            out.text(command.as_str());
            out.braced(formula.node(*numerator), mode);
            out.braced(formula.node(*denominator), mode);
        }
        NodeKind::Script { base, sub, sup } => {
            let base = formula.node(*base);
            // `x^{2}^{3}` is not valid LaTeX; a scripted base keeps its braces
            if matches!(printed(base, mode).kind(), NodeKind::Script { .. }) {
                out.braced(base, mode);
            } else {
                out.node(base, mode);
            }
            if let Some(sub) = sub {
                out.text("_");
                out.braced(formula.node(*sub), mode);
            }
            if let Some(sup) = sup {
                out.text("^");
                out.braced(formula.node(*sup), mode);
            }
        }
        NodeKind::Root { index, body } => {
            out.text("\\sqrt");
            if let Some(index) = index {
                out.text("[");
                out.node(formula.node(*index), mode);
                out.text("]");
            }
            out.braced(formula.node(*body), mode);
        }
        NodeKind::Color { color, body } => {
            out.text(format!("\\textcolor{{{}}}{{", color));
            out.sequence(formula, body, mode);
            out.text("}");
        }
        NodeKind::Text { command, body } => {
            out.text(format!("{}{{", command));
            out.sequence(formula, body, mode);
            out.text("}");
        }
        NodeKind::Font { command, body }
        | NodeKind::Accent { command, body }
        | NodeKind::Brace { command, body }
        | NodeKind::Box { command, body }
        | NodeKind::Strikethrough { command, body } => {
            out.text(command.as_str());
            out.braced(formula.node(*body), mode);
        }
        NodeKind::Delimited { left, right, body } => {
            out.text(format!("\\left{}", left));
            out.sequence(formula, body, mode);
            out.text(format!("\\right{}", right));
        }
        NodeKind::Array {
            environment,
            columns,
            rows,
        } => {
            out.text(format!("\\begin{{{}}}", environment));
            if let Some(columns) = columns {
                out.text(format!("{{{}}}", columns));
            }
            out.grid(formula, rows, mode);
            out.text(format!("\\end{{{}}}", environment));
        }
        NodeKind::Matrix { matrix_type, rows } => {
            out.text(format!("\\begin{{{}}}", matrix_type.env_name()));
            out.grid(formula, rows, mode);
            out.text(format!("\\end{{{}}}", matrix_type.env_name()));
        }
        NodeKind::Variable { body, .. } => {
            if mode == LatexMode::Render {
                out.text("\\htmlClass{variable}{");
                out.node(formula.node(*body), mode);
                out.text("}");
            } else {
                out.node(formula.node(*body), mode);
            }
        }
    }
    out
}

/// The node whose markup actually shows up for `node`: outside render mode a
/// `Variable` prints only its body.
fn printed(node: NodeRef<'_>, mode: LatexMode) -> NodeRef<'_> {
    let mut node = node;
    while mode != LatexMode::Render {
        match node.kind() {
            NodeKind::Variable { body, .. } => node = node.formula().node(*body),
            _ => break,
        }
    }
    node
}

/// Content-only markup: wrappers whose command is purely decorative give way
/// to their content, everything else serializes as in no-id mode.
fn content_parts(node: NodeRef<'_>) -> Parts {
    let formula = node.formula();
    let mode = LatexMode::NoId;
    let mut out = Parts::default();

    match node.kind() {
        NodeKind::Group { body, .. } | NodeKind::Color { body, .. } => {
            out.sequence(formula, body, mode)
        }
        NodeKind::Font { body, .. }
        | NodeKind::Box { body, .. }
        | NodeKind::Strikethrough { body, .. }
        | NodeKind::Variable { body, .. } => out.node(formula.node(*body), mode),
        _ => return node_parts(node, mode),
    }
    out
}
