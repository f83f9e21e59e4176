//! Variable grouping
//!
//! Wraps every occurrence of a variable pattern (a small formula such as
//! `x_i`) in a [`NodeKind::Variable`] node. Patterns are applied one at a
//! time, most complex first, each pass producing a fresh tree; nodes that
//! survive a pass keep their ids.

use std::cmp::Reverse;

use augtex_ir::{
    find_matching_subsequences, nodes_match, AugmentedFormula, Cell, FormulaBuilder, NodeIndex,
    NodeKind, NodeRef,
};
use augtex_latex_backend::{LatexMode, ToLatex};
use fxhash::FxHashSet;
use log::{debug, trace};

use super::builder::TreeBuilder;

/// A named variable and the tree it is recognized by.
#[derive(Debug, Clone)]
pub struct VariablePattern {
    symbol: String,
    tree: AugmentedFormula,
    latex: String,
    complexity: usize,
}

impl VariablePattern {
    /// Parse a variable declared as LaTeX.
    ///
    /// Returns `None` for blank input. Input that does not build is matched
    /// as one literal symbol.
    pub fn parse(symbol: &str) -> Option<Self> {
        let trimmed = symbol.trim();
        if trimmed.is_empty() {
            return None;
        }
        let tree = match TreeBuilder::new().build(trimmed) {
            Ok(tree) if !tree.is_empty() => tree,
            Ok(_) => return None,
            Err(err) => {
                debug!("variable '{}' kept as a literal symbol: {}", trimmed, err);
                literal(trimmed)
            }
        };
        Some(Self::from_tree(trimmed, tree))
    }

    /// Use an already built tree as the pattern for `symbol`.
    pub fn from_tree(symbol: impl Into<String>, tree: AugmentedFormula) -> Self {
        let latex = tree.latex(LatexMode::NoId);
        let complexity = tree.roots().map(complexity).sum();
        Self {
            symbol: symbol.into(),
            tree,
            latex,
            complexity,
        }
    }

    /// Parse every non-blank entry, most complex first.
    pub fn parse_all<S: AsRef<str>>(symbols: &[S]) -> Vec<Self> {
        let mut patterns: Vec<Self> = symbols
            .iter()
            .filter_map(|symbol| Self::parse(symbol.as_ref()))
            .collect();
        patterns.sort_by_key(|pattern| Reverse(pattern.complexity));
        patterns
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn tree(&self) -> &AugmentedFormula {
        &self.tree
    }

    /// Canonical id-free LaTeX of the pattern.
    pub fn latex(&self) -> &str {
        &self.latex
    }

    /// Ordering score: one per node, plus extra weight for structure that
    /// makes a pattern more specific.
    pub fn complexity(&self) -> usize {
        self.complexity
    }
}

fn literal(text: &str) -> AugmentedFormula {
    let mut builder = FormulaBuilder::new();
    let root = builder.alloc(NodeKind::symbol(text));
    builder.finish(vec![root], "")
}

fn complexity(node: NodeRef<'_>) -> usize {
    node.descendants()
        .into_iter()
        .map(|n| {
            1 + match n.kind() {
                NodeKind::Script { .. } => 2,
                NodeKind::Fraction { .. } => 3,
                NodeKind::Matrix { .. } => 4,
                NodeKind::Delimited { .. } => 2,
                _ => 0,
            }
        })
        .sum()
}

/// Group every occurrence of `patterns` in `formula`.
///
/// Patterns are applied most complex first regardless of the order given, so
/// `x_i` is grouped before `x` can claim its base. A pattern that matches
/// nothing leaves the tree unchanged.
pub fn group_variables(
    formula: &AugmentedFormula,
    patterns: &[VariablePattern],
) -> AugmentedFormula {
    let mut ordered: Vec<&VariablePattern> = patterns.iter().collect();
    ordered.sort_by_key(|pattern| Reverse(pattern.complexity));

    let mut ids = IdGenerator::new(formula);
    let mut current = formula.clone();
    for pattern in ordered {
        current = Rewriter {
            source: &current,
            pattern,
            out: FormulaBuilder::new(),
            ids: &mut ids,
        }
        .run();
    }
    current
}

/// Fresh ids for synthesized nodes: `v0`, `v1`, ... skipping ids the formula
/// already uses.
#[derive(Debug)]
struct IdGenerator {
    next: usize,
    taken: FxHashSet<String>,
}

impl IdGenerator {
    fn new(formula: &AugmentedFormula) -> Self {
        Self {
            next: 0,
            taken: formula.ids().map(str::to_string).collect(),
        }
    }

    fn next_id(&mut self) -> String {
        loop {
            let id = format!("v{}", self.next);
            self.next += 1;
            if !self.taken.contains(&id) {
                return id;
            }
        }
    }
}

/// Whether a list sits at the top level of the formula or below a script,
/// fraction, root, accent or cell. Binders (`i` in `i=1`) only exist in the
/// latter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    TopLevel,
    Nested,
}

/// One pass of one pattern over one tree.
struct Rewriter<'a> {
    source: &'a AugmentedFormula,
    pattern: &'a VariablePattern,
    out: FormulaBuilder,
    ids: &'a mut IdGenerator,
}

impl<'a> Rewriter<'a> {
    fn run(mut self) -> AugmentedFormula {
        let source = self.source;
        let roots = self.list(source.root_indices(), Context::TopLevel);
        self.out.finish(roots, "")
    }

    fn node(&mut self, node: NodeRef<'a>, context: Context) -> NodeIndex {
        if node.is_variable() {
            return self.out.import(node);
        }

        let kind = match node.kind() {
            NodeKind::Group { body, synthetic } => NodeKind::Group {
                body: self.list(body, context),
                synthetic: *synthetic,
            },
            NodeKind::Color { color, body } => NodeKind::Color {
                color: color.clone(),
                body: self.list(body, context),
            },
            NodeKind::Text { command, body } => NodeKind::Text {
                command: command.clone(),
                body: self.list(body, context),
            },
            NodeKind::Delimited { left, right, body } => NodeKind::Delimited {
                left: left.clone(),
                right: right.clone(),
                body: self.list(body, context),
            },
            NodeKind::Array {
                environment,
                columns,
                rows,
            } => NodeKind::Array {
                environment: environment.clone(),
                columns: columns.clone(),
                rows: self.grid(rows),
            },
            NodeKind::Matrix { matrix_type, rows } => NodeKind::Matrix {
                matrix_type: *matrix_type,
                rows: self.grid(rows),
            },
            other => {
                let source = self.source;
                other.map_children(|child| self.slot(source.node(child)))
            }
        };
        self.out.alloc_like(kind, node)
    }

    /// A fixed slot: wrapped whole when it matches a single-node pattern.
    fn slot(&mut self, child: NodeRef<'a>) -> NodeIndex {
        let rebuilt = self.node(child, Context::Nested);
        let pattern = self.pattern;
        if let [root] = pattern.tree.root_indices() {
            if !self.out.kind(rebuilt).is_variable()
                && nodes_match(&self.out, rebuilt, &pattern.tree, *root)
            {
                return self.wrap(&[rebuilt]);
            }
        }
        rebuilt
    }

    fn grid(&mut self, rows: &[Vec<Cell>]) -> Vec<Vec<Cell>> {
        rows.iter()
            .map(|row| {
                row.iter()
                    .map(|cell| self.list(cell, Context::Nested))
                    .collect()
            })
            .collect()
    }

    /// Rebuild a list, then wrap every run matching the pattern.
    fn list(&mut self, body: &[NodeIndex], context: Context) -> Vec<NodeIndex> {
        let source = self.source;
        let pattern = self.pattern;
        let mut items: Vec<NodeIndex> = body
            .iter()
            .map(|&child| self.node(source.node(child), context))
            .collect();

        let matches = find_matching_subsequences(
            &self.out,
            &items,
            &pattern.tree,
            pattern.tree.root_indices(),
        );
        // Back to front so splices keep earlier ranges valid
        for range in matches.into_iter().rev() {
            if context == Context::Nested {
                if let Some(equals) = self.equals_after(&items, range.end) {
                    self.wrap_operand(&mut items, equals + 1);
                    continue;
                }
            }
            let wrapped = self.wrap(&items[range.clone()]);
            items.splice(range, std::iter::once(wrapped));
        }
        items
    }

    fn is_space(&self, index: NodeIndex) -> bool {
        matches!(self.out.kind(index), NodeKind::Space { .. })
    }

    /// Index of an `=` following `end`, skipping spaces.
    fn equals_after(&self, items: &[NodeIndex], end: usize) -> Option<usize> {
        let next = (end..items.len()).find(|&i| !self.is_space(items[i]))?;
        (self.out.kind(items[next]).symbol_text() == Some("=")).then_some(next)
    }

    /// Wrap the right-hand operand of a binder (`1` in `i=1`) as a value of
    /// the pattern's variable.
    fn wrap_operand(&mut self, items: &mut Vec<NodeIndex>, from: usize) {
        let Some(start) = (from..items.len()).find(|&i| !self.is_space(items[i])) else {
            return;
        };
        let end = (start..items.len())
            .find(|&i| matches!(self.out.kind(items[i]).symbol_text(), Some("," | ";" | "=")))
            .unwrap_or(items.len());
        if start == end || (end - start == 1 && self.out.kind(items[start]).is_variable()) {
            return;
        }
        let operand: Vec<NodeIndex> = items[start..end].to_vec();
        let wrapped = self.wrap(&operand);
        items.splice(start..end, std::iter::once(wrapped));
    }

    /// A variable node around `run`, through a synthetic group when the run
    /// has more than one node.
    fn wrap(&mut self, run: &[NodeIndex]) -> NodeIndex {
        let body = match run {
            [only] => *only,
            _ => {
                let id = self.ids.next_id();
                self.out.alloc_with_id(
                    NodeKind::Group {
                        body: run.to_vec(),
                        synthetic: true,
                    },
                    id,
                )
            }
        };
        let id = self.ids.next_id();
        trace!("grouping {} as variable '{}'", id, self.pattern.symbol);
        self.out.alloc_with_id(
            NodeKind::Variable {
                body,
                latex: self.pattern.latex.clone(),
                symbol: self.pattern.symbol.clone(),
            },
            id,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_patterns_are_skipped() {
        assert!(VariablePattern::parse("  ").is_none());
        assert_eq!(VariablePattern::parse_all(&["", "x"]).len(), 1);
    }

    #[test]
    fn complexity_weighs_structure() {
        let x = VariablePattern::parse("x").unwrap();
        let x_i = VariablePattern::parse("x_i").unwrap();
        let frac = VariablePattern::parse("\\frac{a}{b}").unwrap();
        assert_eq!(x.complexity(), 1);
        assert_eq!(x_i.complexity(), 5);
        assert_eq!(frac.complexity(), 6);
    }

    #[test]
    fn patterns_sort_most_complex_first() {
        let patterns = VariablePattern::parse_all(&["x", "x_i", "y"]);
        let symbols: Vec<&str> = patterns.iter().map(VariablePattern::symbol).collect();
        assert_eq!(symbols, vec!["x_i", "x", "y"]);
    }

    #[test]
    fn generated_ids_skip_taken_ones() {
        let mut builder = FormulaBuilder::new();
        let root = builder.alloc_with_id(NodeKind::symbol("a"), "v0");
        let formula = builder.finish(vec![root], "");
        let mut ids = IdGenerator::new(&formula);
        assert_eq!(ids.next_id(), "v1");
        assert_eq!(ids.next_id(), "v2");
    }
}
