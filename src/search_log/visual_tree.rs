//! In-memory record of explored nodes, for visualising a finished search.

use rustc_hash::FxHashMap;

#[derive(Clone, Debug, PartialEq)]
pub enum NodeValue {
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

macro_rules! impl_from_integer {
    ($($t:ty),+ $(,)?) => {
        $(
            impl From<$t> for NodeValue {
                fn from(value: $t) -> Self {
                    NodeValue::Integer(value as i64)
                }
            }
        )+
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl From<f64> for NodeValue {
    fn from(value: f64) -> Self {
        NodeValue::Float(value)
    }
}

impl From<bool> for NodeValue {
    fn from(value: bool) -> Self {
        NodeValue::Bool(value)
    }
}

impl From<String> for NodeValue {
    fn from(value: String) -> Self {
        NodeValue::Text(value)
    }
}

impl From<&str> for NodeValue {
    fn from(value: &str) -> Self {
        NodeValue::Text(value.to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VisualId(usize);

#[derive(Clone, Debug, Default)]
pub struct VisualNode {
    parent: Option<VisualId>,
    depth: usize,
    children: Vec<VisualId>,
    values: FxHashMap<String, NodeValue>,
}

impl VisualNode {
    pub fn parent(&self) -> Option<VisualId> {
        self.parent
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn children(&self) -> &[VisualId] {
        &self.children
    }

    pub fn value(&self, key: &str) -> Option<&NodeValue> {
        self.values.get(key)
    }

    pub fn values(&self) -> &FxHashMap<String, NodeValue> {
        &self.values
    }
}

/// A tree of key/value records. Node 0 is always the root.
#[derive(Clone, Debug)]
pub struct VisualTree {
    nodes: Vec<VisualNode>,
}

impl Default for VisualTree {
    fn default() -> Self {
        Self::new()
    }
}

impl VisualTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![VisualNode::default()],
        }
    }

    pub fn root(&self) -> VisualId {
        VisualId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree keeps its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: VisualId) -> &VisualNode {
        &self.nodes[id.0]
    }

    pub fn create_child(&mut self, parent: VisualId) -> VisualId {
        let id = VisualId(self.nodes.len());
        let depth = self.nodes[parent.0].depth + 1;
        self.nodes.push(VisualNode {
            parent: Some(parent),
            depth,
            ..VisualNode::default()
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn add_value(&mut self, id: VisualId, key: &str, value: impl Into<NodeValue>) {
        self.nodes[id.0].values.insert(key.to_string(), value.into());
    }

    pub fn value(&self, id: VisualId, key: &str) -> Option<&NodeValue> {
        self.nodes[id.0].value(key)
    }

    /// Copies `subtree` below `parent`; returns the id its root received.
    pub fn graft(&mut self, parent: VisualId, subtree: VisualTree) -> VisualId {
        let offset = self.nodes.len();
        let base_depth = self.nodes[parent.0].depth + 1;

        for (index, mut node) in subtree.nodes.into_iter().enumerate() {
            node.depth += base_depth;
            node.parent = match node.parent {
                Some(VisualId(p)) => Some(VisualId(p + offset)),
                None => Some(parent),
            };
            for child in node.children.iter_mut() {
                child.0 += offset;
            }
            if index == 0 {
                self.nodes[parent.0].children.push(VisualId(offset));
            }
            self.nodes.push(node);
        }

        VisualId(offset)
    }

    /// Depth-first, pre-order walk over every node.
    pub fn traverse<F>(&self, mut visit: F)
    where
        F: FnMut(VisualId, &VisualNode),
    {
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            visit(id, node);
            stack.extend(node.children.iter().rev().copied());
        }
    }
}
