use std::fmt;
use std::ptr;

use fxhash::FxHashMap;

use crate::matching::nodes_match;
use crate::{ChildPath, Node, NodeArena, NodeIndex, NodeKind, NodeTag};

/// Root container of a formula tree.
///
/// Owns every node reachable from its top-level list and indexes them by
/// structural id. Formulas are built once and replaced wholesale; the only
/// in-place change is the display-id annotation pass.
#[derive(Debug, Clone, Default)]
pub struct AugmentedFormula {
    nodes: Vec<Node>,
    roots: Vec<NodeIndex>,
    index: FxHashMap<String, NodeIndex>,
}

impl AugmentedFormula {
    pub(crate) fn from_parts(nodes: Vec<Node>, roots: Vec<NodeIndex>) -> Self {
        let mut index = FxHashMap::default();
        for (i, node) in nodes.iter().enumerate() {
            // Ids are unique by construction; keep the first one if a caller
            // imported the same subtree twice.
            index
                .entry(node.id.clone())
                .or_insert_with(|| NodeIndex::new(i));
        }
        Self {
            nodes,
            roots,
            index,
        }
    }

    /// Top-level nodes in order.
    pub fn roots(&self) -> impl Iterator<Item = NodeRef<'_>> + '_ {
        self.roots.iter().map(move |&index| self.node(index))
    }

    pub fn root_indices(&self) -> &[NodeIndex] {
        &self.roots
    }

    /// Cursor for `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not belong to this formula.
    pub fn node(&self, index: NodeIndex) -> NodeRef<'_> {
        assert!(index.index() < self.nodes.len(), "node index out of range");
        NodeRef {
            formula: self,
            index,
        }
    }

    /// Look a node up by structural id.
    pub fn get(&self, id: &str) -> Option<NodeRef<'_>> {
        self.index.get(id).map(|&index| self.node(index))
    }

    /// Number of nodes in the whole tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Every node in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = NodeRef<'_>> + '_ {
        (0..self.nodes.len()).map(move |i| self.node(NodeIndex::new(i)))
    }

    /// Every structural id in pre-order.
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.nodes.iter().map(|node| node.id.as_str())
    }

    /// Record the display id of the node with structural id `id`.
    ///
    /// Returns `false` when no such node exists.
    pub fn set_css_id(&mut self, id: &str, css_id: impl Into<String>) -> bool {
        match self.index.get(id) {
            Some(&index) => {
                self.nodes[index.index()].css_id = Some(css_id.into());
                true
            }
            None => false,
        }
    }

    /// Assign display ids from a callback invoked once per node in pre-order.
    pub fn annotate_with<F>(&mut self, mut f: F)
    where
        F: FnMut(NodeRef<'_>) -> Option<String>,
    {
        let assigned: Vec<Option<String>> = self.iter().map(&mut f).collect();
        for (node, css_id) in self.nodes.iter_mut().zip(assigned) {
            node.css_id = css_id;
        }
    }

    /// Stamp each node whose structural id appears in `rendered` with that id
    /// as its display id, which is what the renderer does for `\cssId`.
    pub fn annotate_rendered<I, S>(&mut self, rendered: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in rendered {
            let id = id.as_ref();
            self.set_css_id(id, id);
        }
    }

    pub fn clear_css_ids(&mut self) {
        for node in &mut self.nodes {
            node.css_id = None;
        }
    }
}

impl NodeArena for AugmentedFormula {
    fn node_kind(&self, index: NodeIndex) -> &NodeKind {
        &self.nodes[index.index()].kind
    }
}

/// Borrowed cursor over one node of an [`AugmentedFormula`].
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    formula: &'a AugmentedFormula,
    index: NodeIndex,
}

impl<'a> NodeRef<'a> {
    pub fn formula(self) -> &'a AugmentedFormula {
        self.formula
    }

    pub fn index(self) -> NodeIndex {
        self.index
    }

    fn data(self) -> &'a Node {
        &self.formula.nodes[self.index.index()]
    }

    pub fn id(self) -> &'a str {
        &self.data().id
    }

    pub fn css_id(self) -> Option<&'a str> {
        self.data().css_id.as_deref()
    }

    pub fn kind(self) -> &'a NodeKind {
        &self.data().kind
    }

    pub fn tag(self) -> NodeTag {
        self.kind().tag()
    }

    pub fn is_variable(self) -> bool {
        self.kind().is_variable()
    }

    pub fn children(self) -> impl Iterator<Item = NodeRef<'a>> {
        let formula = self.formula;
        self.kind()
            .children()
            .into_iter()
            .map(move |index| formula.node(index))
    }

    pub fn parent(self) -> Option<NodeRef<'a>> {
        self.data().parent.map(|index| self.formula.node(index))
    }

    pub fn left_sibling(self) -> Option<NodeRef<'a>> {
        self.data().left_sibling.map(|index| self.formula.node(index))
    }

    pub fn right_sibling(self) -> Option<NodeRef<'a>> {
        self.data().right_sibling.map(|index| self.formula.node(index))
    }

    pub fn ancestors(self) -> impl Iterator<Item = NodeRef<'a>> {
        std::iter::successors(self.parent(), |node| node.parent())
    }

    /// This node and everything below it, in pre-order.
    pub fn descendants(self) -> Vec<NodeRef<'a>> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            let children: Vec<_> = node.children().collect();
            stack.extend(children.into_iter().rev());
        }
        out
    }

    pub fn node_count(self) -> usize {
        self.descendants().len()
    }

    /// Position of this node inside its parent, `None` for roots.
    pub fn path_in_parent(self) -> Option<ChildPath> {
        let parent = self.parent()?;
        parent
            .kind()
            .child_entries()
            .into_iter()
            .find(|(_, child)| *child == self.index)
            .map(|(path, _)| path)
    }

    /// Whether the node sits (at any depth) inside a subscript or superscript.
    pub fn is_in_script(self) -> bool {
        std::iter::once(self)
            .chain(self.ancestors())
            .any(|node| {
                matches!(
                    node.path_in_parent(),
                    Some(ChildPath::Slot("sub")) | Some(ChildPath::Slot("sup"))
                )
            })
    }

    /// Structural match against a node of any formula.
    pub fn matches(self, other: NodeRef<'_>) -> bool {
        nodes_match(self.formula, self.index, other.formula, other.index)
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.formula, other.formula) && self.index == other.index
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id())
            .field("tag", &self.tag())
            .finish()
    }
}
