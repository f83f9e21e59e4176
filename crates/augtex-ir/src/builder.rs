use crate::formula::AugmentedFormula;
use crate::{Node, NodeArena, NodeIndex, NodeKind, NodeRef};

#[derive(Debug, Clone)]
struct PendingNode {
    id: Option<String>,
    css_id: Option<String>,
    kind: NodeKind,
}

/// Scratch arena used while a formula is being assembled.
///
/// Children are allocated before their parents. Nodes without an explicit id
/// receive a structural id in [`FormulaBuilder::finish`], which also compacts
/// the arena into pre-order and wires parent/sibling links. Nodes that end up
/// unreachable from the roots are dropped.
#[derive(Debug, Clone, Default)]
pub struct FormulaBuilder {
    pending: Vec<PendingNode>,
}

impl FormulaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node whose id is derived from its position at finish time.
    pub fn alloc(&mut self, kind: NodeKind) -> NodeIndex {
        self.push(PendingNode {
            id: None,
            css_id: None,
            kind,
        })
    }

    /// Allocate a node that keeps `id` regardless of where it ends up.
    pub fn alloc_with_id(&mut self, kind: NodeKind, id: impl Into<String>) -> NodeIndex {
        self.push(PendingNode {
            id: Some(id.into()),
            css_id: None,
            kind,
        })
    }

    /// Allocate a rebuilt version of `like`, keeping its id and display id.
    pub fn alloc_like(&mut self, kind: NodeKind, like: NodeRef<'_>) -> NodeIndex {
        self.push(PendingNode {
            id: Some(like.id().to_string()),
            css_id: like.css_id().map(str::to_string),
            kind,
        })
    }

    /// Deep-copy a subtree of another formula, keeping its ids and display ids.
    pub fn import(&mut self, node: NodeRef<'_>) -> NodeIndex {
        let formula = node.formula();
        let kind = node
            .kind()
            .map_children(|child| self.import(formula.node(child)));
        self.push(PendingNode {
            id: Some(node.id().to_string()),
            css_id: node.css_id().map(str::to_string),
            kind,
        })
    }

    pub fn kind(&self, index: NodeIndex) -> &NodeKind {
        &self.pending[index.index()].kind
    }

    pub fn kind_mut(&mut self, index: NodeIndex) -> &mut NodeKind {
        &mut self.pending[index.index()].kind
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Seal the arena into an [`AugmentedFormula`] rooted at `roots`.
    ///
    /// Root `i` gets the id `"{id_prefix}.{i}"`, or just `"{i}"` when the
    /// prefix is empty; descendants extend their parent's id by their
    /// [`ChildPath`](crate::ChildPath).
    pub fn finish(self, roots: Vec<NodeIndex>, id_prefix: &str) -> AugmentedFormula {
        let mut emitter = Emitter {
            pending: self.pending,
            nodes: Vec::new(),
        };
        let roots: Vec<NodeIndex> = roots
            .into_iter()
            .enumerate()
            .map(|(i, root)| {
                let id = if id_prefix.is_empty() {
                    i.to_string()
                } else {
                    format!("{}.{}", id_prefix, i)
                };
                emitter.emit(root, id, None)
            })
            .collect();

        let mut nodes = emitter.nodes;
        link_siblings(&mut nodes, &roots);
        for i in 0..nodes.len() {
            let lists: Vec<Vec<NodeIndex>> = nodes[i]
                .kind
                .child_lists()
                .into_iter()
                .map(<[NodeIndex]>::to_vec)
                .collect();
            for list in lists {
                link_siblings(&mut nodes, &list);
            }
        }

        AugmentedFormula::from_parts(nodes, roots)
    }

    fn push(&mut self, node: PendingNode) -> NodeIndex {
        self.pending.push(node);
        NodeIndex::new(self.pending.len() - 1)
    }
}

impl NodeArena for FormulaBuilder {
    fn node_kind(&self, index: NodeIndex) -> &NodeKind {
        self.kind(index)
    }
}

struct Emitter {
    pending: Vec<PendingNode>,
    nodes: Vec<Node>,
}

impl Emitter {
    fn emit(&mut self, old: NodeIndex, default_id: String, parent: Option<NodeIndex>) -> NodeIndex {
        let pending = &self.pending[old.index()];
        let id = pending.id.clone().unwrap_or(default_id);
        let css_id = pending.css_id.clone();
        let kind = pending.kind.clone();

        let new = NodeIndex::new(self.nodes.len());
        self.nodes.push(Node {
            id: id.clone(),
            css_id,
            parent,
            left_sibling: None,
            right_sibling: None,
            kind: NodeKind::group(Vec::new()),
        });

        let mut emitted = Vec::new();
        for (path, child) in kind.child_entries() {
            emitted.push(self.emit(child, path.child_id(&id), Some(new)));
        }
        let mut emitted = emitted.into_iter();
        self.nodes[new.index()].kind = kind.map_children(|old| emitted.next().unwrap_or(old));
        new
    }
}

fn link_siblings(nodes: &mut [Node], list: &[NodeIndex]) {
    for pair in list.windows(2) {
        nodes[pair[0].index()].right_sibling = Some(pair[1]);
        nodes[pair[1].index()].left_sibling = Some(pair[0]);
    }
}
