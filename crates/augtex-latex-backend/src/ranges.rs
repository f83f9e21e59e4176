//! Merging of LaTeX fragments that carry id → offset ranges.

use std::ops::Range;

use indexmap::IndexMap;
use serde::Serialize;

/// Id → `[start, end)` byte offsets, in pre-order of the serialized nodes.
pub type IdRanges = IndexMap<String, Range<usize>>;

/// A LaTeX fragment together with the span of every node it contains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RangedLatex {
    pub latex: String,
    pub ranges: IdRanges,
}

impl RangedLatex {
    pub fn new(latex: impl Into<String>) -> Self {
        Self {
            latex: latex.into(),
            ranges: IdRanges::new(),
        }
    }

    /// The substring covered by `id`, if it was serialized.
    pub fn slice(&self, id: &str) -> Option<&str> {
        self.ranges
            .get(id)
            .and_then(|range| self.latex.get(range.clone()))
    }
}

/// One element handed to [`consolidate`].
#[derive(Debug, Clone)]
pub enum LatexPart {
    Text(String),
    Ranged(RangedLatex),
}

impl LatexPart {
    pub fn latex(&self) -> &str {
        match self {
            LatexPart::Text(text) => text,
            LatexPart::Ranged(ranged) => &ranged.latex,
        }
    }
}

impl From<&str> for LatexPart {
    fn from(text: &str) -> Self {
        LatexPart::Text(text.to_string())
    }
}

impl From<String> for LatexPart {
    fn from(text: String) -> Self {
        LatexPart::Text(text)
    }
}

impl From<RangedLatex> for LatexPart {
    fn from(ranged: RangedLatex) -> Self {
        LatexPart::Ranged(ranged)
    }
}

/// Concatenate `parts` into one fragment that starts at `offset` in the
/// caller's output.
///
/// Ranges of nested fragments are shifted by `offset` plus their position in
/// the concatenation. When `id` is given, the whole consolidated span is
/// recorded under it, ahead of the nested ids.
pub fn consolidate<I>(parts: I, offset: usize, id: Option<&str>) -> RangedLatex
where
    I: IntoIterator<Item = LatexPart>,
{
    let mut out = RangedLatex::default();
    if let Some(id) = id {
        out.ranges.insert(id.to_string(), offset..offset);
    }

    for part in parts {
        match part {
            LatexPart::Text(text) => out.latex.push_str(&text),
            LatexPart::Ranged(ranged) => {
                let shift = offset + out.latex.len();
                for (key, range) in ranged.ranges {
                    out.ranges
                        .insert(key, (range.start + shift)..(range.end + shift));
                }
                out.latex.push_str(&ranged.latex);
            }
        }
    }

    if let Some(id) = id {
        let end = offset + out.latex.len();
        out.ranges.insert(id.to_string(), offset..end);
    }
    out
}
