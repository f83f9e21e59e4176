//! Expression lookup
//!
//! Locates an expression inside an annotated formula by structural matching
//! and reports the display ids of the matched nodes, so a host can highlight
//! them on screen.

use augtex_ir::{find_matching_subsequences, AugmentedFormula, NodeIndex, NodeRef};
use indexmap::IndexSet;
use log::trace;
use serde::Serialize;

use super::builder::TreeBuilder;

/// Where an expression was found.
#[derive(Debug, Clone, Serialize)]
pub struct ExpressionMatch<'a> {
    /// Matched nodes of the searched formula, in order.
    #[serde(skip)]
    pub nodes: Vec<NodeRef<'a>>,
    /// Structural ids of the matched nodes.
    pub node_ids: Vec<String>,
    /// Display ids found anywhere in the matched subtrees, deduplicated in
    /// first-seen order.
    pub css_ids: Vec<String>,
}

/// Find `expression` as a contiguous run of the formula's top-level nodes.
///
/// `variables` should be the list the formula was built with, so both sides
/// are grouped the same way. Returns `None` when the expression is empty or
/// does not build, when it does not occur, or when the matched nodes carry no
/// display ids (the formula was never annotated).
pub fn find_expression<'a, S: AsRef<str>>(
    formula: &'a AugmentedFormula,
    expression: &str,
    variables: &[S],
) -> Option<ExpressionMatch<'a>> {
    let needle = build_needle(expression, variables)?;
    match_in(formula, formula.root_indices(), &needle)
}

/// Like [`find_expression`], but also searches nested lists (group bodies,
/// scripts, cells, ...) in pre-order once the top level has no match.
pub fn find_expression_anywhere<'a, S: AsRef<str>>(
    formula: &'a AugmentedFormula,
    expression: &str,
    variables: &[S],
) -> Option<ExpressionMatch<'a>> {
    let needle = build_needle(expression, variables)?;
    if let Some(found) = match_in(formula, formula.root_indices(), &needle) {
        return Some(found);
    }
    formula.iter().find_map(|node| {
        node.kind()
            .child_lists()
            .into_iter()
            .find_map(|list| match_in(formula, list, &needle))
    })
}

fn build_needle<S: AsRef<str>>(expression: &str, variables: &[S]) -> Option<AugmentedFormula> {
    let needle = TreeBuilder::new()
        .build_with_variables(expression, variables)
        .map_err(|err| trace!("lookup expression does not build: {}", err))
        .ok()?;
    (!needle.is_empty()).then_some(needle)
}

fn match_in<'a>(
    formula: &'a AugmentedFormula,
    items: &[NodeIndex],
    needle: &AugmentedFormula,
) -> Option<ExpressionMatch<'a>> {
    let range = find_matching_subsequences(formula, items, needle, needle.root_indices())
        .into_iter()
        .next()?;
    trace!("expression matched items {:?}", range);

    let nodes: Vec<NodeRef<'a>> = items[range].iter().map(|&i| formula.node(i)).collect();
    let css_ids: IndexSet<String> = nodes
        .iter()
        .flat_map(|node| node.descendants())
        .filter_map(|node| node.css_id().map(str::to_string))
        .collect();
    if css_ids.is_empty() {
        return None;
    }

    Some(ExpressionMatch {
        node_ids: nodes.iter().map(|node| node.id().to_string()).collect(),
        css_ids: css_ids.into_iter().collect(),
        nodes,
    })
}
