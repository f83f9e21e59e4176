//! `\begin{...} ... \end{...}` environments: arrays, matrices, cases and
//! alignment blocks.

use augtex_ir::{Cell, MatrixType, NodeIndex, NodeKind};
use mitex_parser::syntax::{EnvItem, SyntaxElement, SyntaxKind, SyntaxNode};
use phf::{phf_set, Set};
use rowan::ast::AstNode;

use super::context::TreeBuilder;
use super::utils::{
    children, clause_shape, command_name, element_text, is_trivia, joined_text, Clause,
};
use crate::utils::error::TreeBuildError;
use crate::utils::warnings::BuildWarning;

type Result<T> = std::result::Result<T, TreeBuildError>;

/// Grid environments kept as generic arrays (names without a trailing `*`).
const ARRAY_ENVIRONMENTS: Set<&str> = phf_set!(
    "matrix",
    "smallmatrix",
    "array",
    "subarray",
    "cases",
    "rcases",
    "dcases",
    "aligned",
    "alignedat",
    "align",
    "alignat",
    "gathered",
    "gather",
    "split",
    "eqnarray",
);

/// Environments whose first braced argument is a column spec.
const COLUMN_ENVIRONMENTS: Set<&str> = phf_set!("array", "subarray", "alignat", "alignedat");

impl TreeBuilder {
    pub(super) fn environment(&mut self, elem: &SyntaxElement) -> Result<NodeIndex> {
        let SyntaxElement::Node(node) = elem else {
            return Err(TreeBuildError::Parse(element_text(elem)));
        };
        let name = EnvItem::cast(node.clone())
            .and_then(|env| env.name_tok())
            .map(|tok| tok.text().trim().to_string())
            .unwrap_or_default();
        let base = name.trim_end_matches('*');

        let matrix_type = MatrixType::from_env_name(base);
        if matrix_type.is_none() && !ARRAY_ENVIRONMENTS.contains(base) {
            if !self.options.non_strict {
                return Err(TreeBuildError::UnknownEnvironment(name));
            }
            self.warn(BuildWarning::unknown_environment(&name));
        }

        let mut content: Vec<SyntaxElement> = node
            .children_with_tokens()
            .filter(|c| !matches!(c.kind(), SyntaxKind::ItemBegin | SyntaxKind::ItemEnd))
            .collect();

        let mut columns = begin_argument(node);
        if columns.is_none() && COLUMN_ENVIRONMENTS.contains(base) {
            columns = take_leading_argument(&mut content);
        }
        // Arguments the parser attached to the environment itself are not cells
        content.retain(|c| c.kind() != SyntaxKind::ClauseArgument);

        let rows = self.split_rows(content)?;
        Ok(match matrix_type {
            Some(matrix_type) => self.arena.alloc(NodeKind::Matrix { matrix_type, rows }),
            None => self.arena.alloc(NodeKind::Array {
                environment: name,
                columns,
                rows,
            }),
        })
    }

    /// Split environment content on `&` and `\\` and build every cell.
    fn split_rows(&mut self, content: Vec<SyntaxElement>) -> Result<Vec<Vec<Cell>>> {
        let mut rows: Vec<Vec<Vec<SyntaxElement>>> = Vec::new();
        let mut row: Vec<Vec<SyntaxElement>> = Vec::new();
        let mut cell: Vec<SyntaxElement> = Vec::new();

        let mut stack: Vec<SyntaxElement> = content.into_iter().rev().collect();
        while let Some(elem) = stack.pop() {
            match elem.kind() {
                SyntaxKind::TokenAmpersand => row.push(std::mem::take(&mut cell)),
                SyntaxKind::ItemNewLine => {
                    row.push(std::mem::take(&mut cell));
                    rows.push(std::mem::take(&mut row));
                }
                SyntaxKind::TokenCommandSym if element_text(&elem).trim() == "\\\\" => {
                    row.push(std::mem::take(&mut cell));
                    rows.push(std::mem::take(&mut row));
                }
                SyntaxKind::ItemCmd if command_name(&elem).as_deref() == Some("\\\\") => {
                    row.push(std::mem::take(&mut cell));
                    rows.push(std::mem::take(&mut row));
                }
                SyntaxKind::ItemText | SyntaxKind::ScopeRoot => {
                    stack.extend(children(&elem).into_iter().rev());
                }
                _ => cell.push(elem),
            }
        }
        row.push(cell);
        rows.push(row);

        // A trailing `\\` does not open another row
        if rows.len() > 1 {
            if let Some([last]) = rows.last().map(Vec::as_slice) {
                if last.iter().all(|e| is_trivia(e.kind())) {
                    rows.pop();
                }
            }
        }

        rows.into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| self.build_sequence(cell))
                    .collect::<Result<Vec<Cell>>>()
            })
            .collect()
    }
}

/// Braced argument attached to `\begin{name}`, if any.
fn begin_argument(node: &SyntaxNode) -> Option<String> {
    node.children()
        .filter(|child| child.kind() == SyntaxKind::ItemBegin)
        .flat_map(|begin| begin.children_with_tokens())
        .chain(node.children_with_tokens())
        .filter(|child| child.kind() == SyntaxKind::ClauseArgument)
        .find_map(|arg| match clause_shape(&arg) {
            Clause::Braced(inner) => Some(joined_text(&inner).trim().to_string()),
            Clause::Bracketed(_) | Clause::Bare => None,
        })
}

/// Remove and return a leading `{...}` from the environment body.
fn take_leading_argument(content: &mut Vec<SyntaxElement>) -> Option<String> {
    let position = content.iter().position(|c| !is_trivia(c.kind()))?;
    if content[position].kind() != SyntaxKind::ItemCurly {
        return None;
    }
    let curly = content.remove(position);
    match clause_shape(&curly) {
        Clause::Braced(inner) => Some(joined_text(&inner).trim().to_string()),
        Clause::Bracketed(_) | Clause::Bare => None,
    }
}
