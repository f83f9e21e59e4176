//! Editor decorations derived from the id-free serialization.

use std::ops::Range;

use augtex_ir::{AugmentedFormula, NodeKind, NodeRef};
use serde::Serialize;

use crate::{IdRanges, LatexMode, ToLatex};

/// Decoration payload of a styled range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RangeStyle {
    /// A grouped variable; the tooltip is the symbol it was declared with.
    Variable { tooltip: String },
    Color { color: String },
}

/// A slice of the no-id LaTeX, either undecorated or carrying a style and
/// its own nested decomposition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StyledRange {
    Plain {
        text: String,
        range: Range<usize>,
    },
    Styled {
        text: String,
        range: Range<usize>,
        style: RangeStyle,
        children: Vec<StyledRange>,
    },
}

impl StyledRange {
    pub fn text(&self) -> &str {
        match self {
            StyledRange::Plain { text, .. } | StyledRange::Styled { text, .. } => text,
        }
    }

    pub fn range(&self) -> Range<usize> {
        match self {
            StyledRange::Plain { range, .. } | StyledRange::Styled { range, .. } => range.clone(),
        }
    }
}

/// Decomposition into [`StyledRange`]s whose texts concatenate to the no-id
/// LaTeX.
pub trait ToStyledRanges {
    fn to_styled_ranges(&self) -> Vec<StyledRange>;
}

impl ToStyledRanges for AugmentedFormula {
    fn to_styled_ranges(&self) -> Vec<StyledRange> {
        let ranged = self.to_latex(LatexMode::NoId, 0);
        let ctx = Slicer {
            latex: &ranged.latex,
            ranges: &ranged.ranges,
        };
        ctx.decompose(self.roots().collect(), 0..ranged.latex.len())
    }
}

impl ToStyledRanges for NodeRef<'_> {
    fn to_styled_ranges(&self) -> Vec<StyledRange> {
        let ranged = self.to_latex(LatexMode::NoId, 0);
        let ctx = Slicer {
            latex: &ranged.latex,
            ranges: &ranged.ranges,
        };
        ctx.decompose(vec![*self], 0..ranged.latex.len())
    }
}

fn style_of(node: NodeRef<'_>) -> Option<RangeStyle> {
    match node.kind() {
        NodeKind::Variable { symbol, .. } => Some(RangeStyle::Variable {
            tooltip: symbol.clone(),
        }),
        NodeKind::Color { color, .. } => Some(RangeStyle::Color {
            color: color.clone(),
        }),
        _ => None,
    }
}

struct Slicer<'s> {
    latex: &'s str,
    ranges: &'s IdRanges,
}

impl Slicer<'_> {
    fn decompose(&self, nodes: Vec<NodeRef<'_>>, span: Range<usize>) -> Vec<StyledRange> {
        let mut out = Vec::new();
        let mut cursor = span.start;

        for node in outermost_styled(nodes) {
            let Some(range) = self.ranges.get(node.id()).cloned() else {
                continue;
            };
            let Some(style) = style_of(node) else {
                continue;
            };
            if range.start < cursor || range.end > span.end {
                continue;
            }
            if range.start > cursor {
                out.push(self.plain(cursor..range.start));
            }
            out.push(StyledRange::Styled {
                text: self.text(range.clone()),
                children: self.decompose(node.children().collect(), range.clone()),
                range: range.clone(),
                style,
            });
            cursor = range.end;
        }

        if cursor < span.end {
            out.push(self.plain(cursor..span.end));
        }
        out
    }

    fn plain(&self, range: Range<usize>) -> StyledRange {
        StyledRange::Plain {
            text: self.text(range.clone()),
            range,
        }
    }

    fn text(&self, range: Range<usize>) -> String {
        self.latex.get(range).unwrap_or_default().to_string()
    }
}

/// Styled nodes among `nodes` and their descendants, not descending into a
/// styled node, in pre-order.
fn outermost_styled(nodes: Vec<NodeRef<'_>>) -> Vec<NodeRef<'_>> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeRef<'_>> = nodes.into_iter().rev().collect();
    while let Some(node) = stack.pop() {
        if style_of(node).is_some() {
            out.push(node);
        } else {
            let children: Vec<_> = node.children().collect();
            stack.extend(children.into_iter().rev());
        }
    }
    out
}
