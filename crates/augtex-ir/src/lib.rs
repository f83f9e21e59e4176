//! Arena-backed formula tree shared by the tree builder, the grouping engine
//! and the LaTeX backend.
//!
//! Nodes live in a flat `Vec` owned by an [`AugmentedFormula`] and refer to
//! each other through [`NodeIndex`]. Parent and sibling links are plain
//! indices wired once by [`FormulaBuilder::finish`]; they never own anything.

mod builder;
mod formula;
mod matching;

pub use builder::FormulaBuilder;
pub use formula::{AugmentedFormula, NodeRef};
pub use matching::{find_matching_subsequences, nodes_match, sequences_match};

use std::fmt;

/// Position of a node inside the arena of the formula (or builder) that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(u32);

impl NodeIndex {
    pub fn new(index: usize) -> Self {
        NodeIndex(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One cell of an array or matrix: a sequence of nodes.
pub type Cell = Vec<NodeIndex>;

/// Bracket style of a [`NodeKind::Matrix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixType {
    /// `( )`
    Paren,
    /// `[ ]`
    Bracket,
    /// `\{ \}`
    Brace,
    /// `| |`
    Bar,
    /// `\| \|`
    DoubleBar,
}

impl MatrixType {
    /// Name of the amsmath environment rendering this bracket style.
    pub fn env_name(self) -> &'static str {
        match self {
            MatrixType::Paren => "pmatrix",
            MatrixType::Bracket => "bmatrix",
            MatrixType::Brace => "Bmatrix",
            MatrixType::Bar => "vmatrix",
            MatrixType::DoubleBar => "Vmatrix",
        }
    }

    pub fn from_env_name(name: &str) -> Option<Self> {
        match name {
            "pmatrix" => Some(MatrixType::Paren),
            "bmatrix" => Some(MatrixType::Bracket),
            "Bmatrix" => Some(MatrixType::Brace),
            "vmatrix" => Some(MatrixType::Bar),
            "Vmatrix" => Some(MatrixType::DoubleBar),
            _ => None,
        }
    }
}

impl fmt::Display for MatrixType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.env_name())
    }
}

/// The closed set of node variants.
///
/// Every variant carries exactly the fields its kind needs; children are
/// arena indices owned by the enclosing formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A single atom: a character or a control word such as `\alpha`.
    Symbol { text: String },
    /// Explicit spacing (`\,`, `\quad`, `~`).
    Space { text: String },
    /// A braced group. `synthetic` groups are created by the grouping engine
    /// around a matched run and have no braces in the source.
    Group { body: Vec<NodeIndex>, synthetic: bool },
    Fraction {
        command: String,
        numerator: NodeIndex,
        denominator: NodeIndex,
    },
    Script {
        base: NodeIndex,
        sub: Option<NodeIndex>,
        sup: Option<NodeIndex>,
    },
    Root {
        index: Option<NodeIndex>,
        body: NodeIndex,
    },
    Color { color: String, body: Vec<NodeIndex> },
    /// Text-mode content (`\text{...}`), one symbol per character.
    Text { command: String, body: Vec<NodeIndex> },
    /// Font switch such as `\mathbf{...}`.
    Font { command: String, body: NodeIndex },
    Accent { command: String, body: NodeIndex },
    /// `\overbrace` / `\underbrace`.
    Brace { command: String, body: NodeIndex },
    /// Framed content (`\boxed`, `\fbox`).
    Box { command: String, body: NodeIndex },
    /// `\cancel` and friends.
    Strikethrough { command: String, body: NodeIndex },
    /// `\left ... \right` with arbitrary delimiters.
    Delimited {
        left: String,
        right: String,
        body: Vec<NodeIndex>,
    },
    /// A generic tabular environment (`matrix`, `array`, `cases`, `aligned`, ...).
    Array {
        environment: String,
        columns: Option<String>,
        rows: Vec<Vec<Cell>>,
    },
    Matrix {
        matrix_type: MatrixType,
        rows: Vec<Vec<Cell>>,
    },
    /// A grouped occurrence of a named variable.
    Variable {
        body: NodeIndex,
        /// Canonical (id-free) LaTeX of the variable pattern.
        latex: String,
        /// The symbol text the variable was declared with.
        symbol: String,
    },
}

/// Discriminant of [`NodeKind`], handy for logging and quick checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeTag {
    Symbol,
    Space,
    Group,
    Fraction,
    Script,
    Root,
    Color,
    Text,
    Font,
    Accent,
    Brace,
    Box,
    Strikethrough,
    Delimited,
    Array,
    Matrix,
    Variable,
}

/// Where a child sits inside its parent; drives structural id generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildPath {
    /// Position in a list body.
    Item(usize),
    /// A named fixed slot (`sub`, `numer`, `body`, ...).
    Slot(&'static str),
    /// Position inside an array cell.
    Cell { row: usize, col: usize, item: usize },
}

impl ChildPath {
    /// Structural id of a child with this path under `parent_id`.
    pub fn child_id(self, parent_id: &str) -> String {
        match self {
            ChildPath::Item(i) => format!("{}.{}", parent_id, i),
            ChildPath::Slot(slot) => format!("{}.{}", parent_id, slot),
            ChildPath::Cell { row, col, item } => {
                format!("{}.{}.{}.{}", parent_id, row, col, item)
            }
        }
    }
}

impl NodeKind {
    pub fn symbol(text: impl Into<String>) -> Self {
        NodeKind::Symbol { text: text.into() }
    }

    pub fn group(body: Vec<NodeIndex>) -> Self {
        NodeKind::Group {
            body,
            synthetic: false,
        }
    }

    pub fn tag(&self) -> NodeTag {
        match self {
            NodeKind::Symbol { .. } => NodeTag::Symbol,
            NodeKind::Space { .. } => NodeTag::Space,
            NodeKind::Group { .. } => NodeTag::Group,
            NodeKind::Fraction { .. } => NodeTag::Fraction,
            NodeKind::Script { .. } => NodeTag::Script,
            NodeKind::Root { .. } => NodeTag::Root,
            NodeKind::Color { .. } => NodeTag::Color,
            NodeKind::Text { .. } => NodeTag::Text,
            NodeKind::Font { .. } => NodeTag::Font,
            NodeKind::Accent { .. } => NodeTag::Accent,
            NodeKind::Brace { .. } => NodeTag::Brace,
            NodeKind::Box { .. } => NodeTag::Box,
            NodeKind::Strikethrough { .. } => NodeTag::Strikethrough,
            NodeKind::Delimited { .. } => NodeTag::Delimited,
            NodeKind::Array { .. } => NodeTag::Array,
            NodeKind::Matrix { .. } => NodeTag::Matrix,
            NodeKind::Variable { .. } => NodeTag::Variable,
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, NodeKind::Variable { .. })
    }

    /// Text of a `Symbol`, `None` for every other variant.
    pub fn symbol_text(&self) -> Option<&str> {
        match self {
            NodeKind::Symbol { text } => Some(text),
            _ => None,
        }
    }

    /// Direct children paired with their path, in serialization order.
    pub fn child_entries(&self) -> Vec<(ChildPath, NodeIndex)> {
        fn items(body: &[NodeIndex]) -> Vec<(ChildPath, NodeIndex)> {
            body.iter()
                .enumerate()
                .map(|(i, &n)| (ChildPath::Item(i), n))
                .collect()
        }
        fn cells(rows: &[Vec<Cell>]) -> Vec<(ChildPath, NodeIndex)> {
            let mut out = Vec::new();
            for (row, cells) in rows.iter().enumerate() {
                for (col, cell) in cells.iter().enumerate() {
                    for (item, &n) in cell.iter().enumerate() {
                        out.push((ChildPath::Cell { row, col, item }, n));
                    }
                }
            }
            out
        }

        match self {
            NodeKind::Symbol { .. } | NodeKind::Space { .. } => Vec::new(),
            NodeKind::Group { body, .. }
            | NodeKind::Color { body, .. }
            | NodeKind::Text { body, .. }
            | NodeKind::Delimited { body, .. } => items(body),
            NodeKind::Fraction {
                numerator,
                denominator,
                ..
            } => vec![
                (ChildPath::Slot("numer"), *numerator),
                (ChildPath::Slot("denom"), *denominator),
            ],
            NodeKind::Script { base, sub, sup } => {
                let mut out = vec![(ChildPath::Slot("base"), *base)];
                if let Some(sub) = sub {
                    out.push((ChildPath::Slot("sub"), *sub));
                }
                if let Some(sup) = sup {
                    out.push((ChildPath::Slot("sup"), *sup));
                }
                out
            }
            NodeKind::Root { index, body } => {
                let mut out = Vec::with_capacity(2);
                if let Some(index) = index {
                    out.push((ChildPath::Slot("index"), *index));
                }
                out.push((ChildPath::Slot("body"), *body));
                out
            }
            NodeKind::Font { body, .. }
            | NodeKind::Accent { body, .. }
            | NodeKind::Brace { body, .. }
            | NodeKind::Box { body, .. }
            | NodeKind::Strikethrough { body, .. }
            | NodeKind::Variable { body, .. } => vec![(ChildPath::Slot("body"), *body)],
            NodeKind::Array { rows, .. } | NodeKind::Matrix { rows, .. } => cells(rows),
        }
    }

    /// Direct children in serialization order.
    pub fn children(&self) -> Vec<NodeIndex> {
        self.child_entries().into_iter().map(|(_, n)| n).collect()
    }

    /// Sibling scopes: every list body or cell, and each fixed slot on its own.
    pub fn child_lists(&self) -> Vec<&[NodeIndex]> {
        match self {
            NodeKind::Symbol { .. } | NodeKind::Space { .. } => Vec::new(),
            NodeKind::Group { body, .. }
            | NodeKind::Color { body, .. }
            | NodeKind::Text { body, .. }
            | NodeKind::Delimited { body, .. } => vec![body.as_slice()],
            NodeKind::Fraction {
                numerator,
                denominator,
                ..
            } => vec![
                std::slice::from_ref(numerator),
                std::slice::from_ref(denominator),
            ],
            NodeKind::Script { base, sub, sup } => {
                let mut out = vec![std::slice::from_ref(base)];
                if let Some(sub) = sub {
                    out.push(std::slice::from_ref(sub));
                }
                if let Some(sup) = sup {
                    out.push(std::slice::from_ref(sup));
                }
                out
            }
            NodeKind::Root { index, body } => {
                let mut out = Vec::with_capacity(2);
                if let Some(index) = index {
                    out.push(std::slice::from_ref(index));
                }
                out.push(std::slice::from_ref(body));
                out
            }
            NodeKind::Font { body, .. }
            | NodeKind::Accent { body, .. }
            | NodeKind::Brace { body, .. }
            | NodeKind::Box { body, .. }
            | NodeKind::Strikethrough { body, .. }
            | NodeKind::Variable { body, .. } => vec![std::slice::from_ref(body)],
            NodeKind::Array { rows, .. } | NodeKind::Matrix { rows, .. } => rows
                .iter()
                .flat_map(|row| row.iter().map(|cell| cell.as_slice()))
                .collect(),
        }
    }

    /// Copy of this kind with every child index replaced by `f`, called in
    /// the same order as [`NodeKind::children`].
    pub fn map_children<F>(&self, mut f: F) -> NodeKind
    where
        F: FnMut(NodeIndex) -> NodeIndex,
    {
        match self {
            NodeKind::Symbol { .. } | NodeKind::Space { .. } => self.clone(),
            NodeKind::Group { body, synthetic } => NodeKind::Group {
                body: map_list(body, &mut f),
                synthetic: *synthetic,
            },
            NodeKind::Color { color, body } => NodeKind::Color {
                color: color.clone(),
                body: map_list(body, &mut f),
            },
            NodeKind::Text { command, body } => NodeKind::Text {
                command: command.clone(),
                body: map_list(body, &mut f),
            },
            NodeKind::Delimited { left, right, body } => NodeKind::Delimited {
                left: left.clone(),
                right: right.clone(),
                body: map_list(body, &mut f),
            },
            NodeKind::Fraction {
                command,
                numerator,
                denominator,
            } => {
                let numerator = f(*numerator);
                let denominator = f(*denominator);
                NodeKind::Fraction {
                    command: command.clone(),
                    numerator,
                    denominator,
                }
            }
            NodeKind::Script { base, sub, sup } => {
                let base = f(*base);
                let sub = sub.map(&mut f);
                let sup = sup.map(&mut f);
                NodeKind::Script { base, sub, sup }
            }
            NodeKind::Root { index, body } => {
                let index = index.map(&mut f);
                let body = f(*body);
                NodeKind::Root { index, body }
            }
            NodeKind::Font { command, body } => NodeKind::Font {
                command: command.clone(),
                body: f(*body),
            },
            NodeKind::Accent { command, body } => NodeKind::Accent {
                command: command.clone(),
                body: f(*body),
            },
            NodeKind::Brace { command, body } => NodeKind::Brace {
                command: command.clone(),
                body: f(*body),
            },
            NodeKind::Box { command, body } => NodeKind::Box {
                command: command.clone(),
                body: f(*body),
            },
            NodeKind::Strikethrough { command, body } => NodeKind::Strikethrough {
                command: command.clone(),
                body: f(*body),
            },
            NodeKind::Variable {
                body,
                latex,
                symbol,
            } => NodeKind::Variable {
                body: f(*body),
                latex: latex.clone(),
                symbol: symbol.clone(),
            },
            NodeKind::Array {
                environment,
                columns,
                rows,
            } => NodeKind::Array {
                environment: environment.clone(),
                columns: columns.clone(),
                rows: map_rows(rows, &mut f),
            },
            NodeKind::Matrix { matrix_type, rows } => NodeKind::Matrix {
                matrix_type: *matrix_type,
                rows: map_rows(rows, &mut f),
            },
        }
    }
}

fn map_list<F>(body: &[NodeIndex], f: &mut F) -> Vec<NodeIndex>
where
    F: FnMut(NodeIndex) -> NodeIndex,
{
    body.iter().map(|&n| f(n)).collect()
}

fn map_rows<F>(rows: &[Vec<Cell>], f: &mut F) -> Vec<Vec<Cell>>
where
    F: FnMut(NodeIndex) -> NodeIndex,
{
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|cell| cell.iter().map(|&n| f(n)).collect())
                .collect()
        })
        .collect()
}

/// Read access to node kinds by index, shared by finished formulas and
/// formulas still under construction.
pub trait NodeArena {
    fn node_kind(&self, index: NodeIndex) -> &NodeKind;
}

/// A node stored in an [`AugmentedFormula`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: String,
    css_id: Option<String>,
    parent: Option<NodeIndex>,
    left_sibling: Option<NodeIndex>,
    right_sibling: Option<NodeIndex>,
    kind: NodeKind,
}

impl Node {
    /// Structural id, unique within one formula.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display id assigned by the rendering collaborator, if any.
    pub fn css_id(&self) -> Option<&str> {
        self.css_id.as_deref()
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    pub fn left_sibling(&self) -> Option<NodeIndex> {
        self.left_sibling
    }

    pub fn right_sibling(&self) -> Option<NodeIndex> {
        self.right_sibling
    }
}
