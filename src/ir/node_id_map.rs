//! Node-id index over a parse tree
//!
//! [`NodeIdMap`] is the only way the engines move around a tree: parent,
//! children, nth child by attribute index, previous sibling, leaves in
//! document order and the right-most leaf. It is immutable once built, so one
//! `Arc<NodeIdMap>` can serve concurrent requests.
//!
//! Trees enter the crate either through [`NodeIdMapBuilder`] or as a
//! serialized [`TreeSnapshot`].

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::grammar::{recursive_primary_expression, wrapped};
use super::node::{AstNode, GrammarNode, NodeId, NodeKind, Position};
use crate::error::{InspectionError, InspectionResult, TreeError};

/// A leaf visited in document order, with the span used for cursor lookup.
///
/// Resolved leaves span their tokens. A pending leaf is zero-width and starts
/// at its recorded token start, or at the end of the leaf before it.
#[derive(Debug, Clone)]
pub struct LeafSpan {
    pub node: Arc<GrammarNode>,
    pub start: Position,
    pub end: Position,
}

/// Immutable index of a parse tree keyed by [`NodeId`].
#[derive(Debug, Clone, Default)]
pub struct NodeIdMap {
    nodes: FxHashMap<NodeId, Arc<GrammarNode>>,
    parent_by_id: FxHashMap<NodeId, NodeId>,
    /// Children sorted by attribute index.
    children_by_id: FxHashMap<NodeId, Vec<NodeId>>,
    root: Option<NodeId>,
}

impl NodeIdMap {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    pub fn root(&self) -> Option<&Arc<GrammarNode>> {
        self.root.and_then(|id| self.nodes.get(&id))
    }

    pub fn get(&self, id: NodeId) -> Option<&Arc<GrammarNode>> {
        self.nodes.get(&id)
    }

    /// Looks up a node that the caller knows must exist.
    pub fn expect_node(&self, id: NodeId) -> InspectionResult<&Arc<GrammarNode>> {
        self.nodes.get(&id).ok_or(InspectionError::UnknownNode(id))
    }

    pub fn parent_id(&self, id: NodeId) -> Option<NodeId> {
        self.parent_by_id.get(&id).copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<&Arc<GrammarNode>> {
        self.parent_id(id).and_then(|parent| self.nodes.get(&parent))
    }

    pub fn child_ids(&self, id: NodeId) -> &[NodeId] {
        self.children_by_id
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &Arc<GrammarNode>> + '_ {
        self.child_ids(id)
            .iter()
            .filter_map(move |child| self.nodes.get(child))
    }

    /// The child occupying the given attribute slot, if the parser got that far.
    pub fn nth_child(&self, id: NodeId, attribute_index: u32) -> Option<&Arc<GrammarNode>> {
        self.children(id)
            .find(|child| child.attribute_index() == Some(attribute_index))
    }

    /// Like [`nth_child`](Self::nth_child), but a child of another kind is a
    /// broken tree rather than a miss.
    pub fn nth_child_checked(
        &self,
        id: NodeId,
        attribute_index: u32,
        kind: NodeKind,
    ) -> InspectionResult<Option<&Arc<GrammarNode>>> {
        match self.nth_child(id, attribute_index) {
            Some(child) if child.kind() != kind => Err(InspectionError::invariant(
                child.id(),
                format!(
                    "expected {kind} at attribute index {attribute_index} of {id}, found {}",
                    child.kind()
                ),
            )),
            other => Ok(other),
        }
    }

    /// The child at the slot, only if it is resolved and of the given kind.
    pub fn nth_child_if_resolved_of_kind(
        &self,
        id: NodeId,
        attribute_index: u32,
        kind: NodeKind,
    ) -> Option<&AstNode> {
        self.nth_child(id, attribute_index)
            .and_then(|child| child.as_resolved_of_kind(kind))
    }

    /// The sibling immediately before `id` in its parent's slot order.
    pub fn previous_sibling(&self, id: NodeId) -> Option<&Arc<GrammarNode>> {
        let parent = self.parent_id(id)?;
        let siblings = self.child_ids(parent);
        let index = siblings.iter().position(|sibling| *sibling == id)?;
        let previous = siblings.get(index.checked_sub(1)?)?;
        self.nodes.get(previous)
    }

    /// The node itself followed by its ancestors up to the root.
    pub fn ancestry(&self, id: NodeId) -> Vec<Arc<GrammarNode>> {
        let mut ancestry = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.nodes.get(&node_id) else {
                break;
            };
            ancestry.push(Arc::clone(node));
            current = self.parent_id(node_id);
        }
        ancestry
    }

    /// Leaves of the subtree rooted at `id`, in document order.
    ///
    /// Pending leaves without a recorded token start are anchored at the end of
    /// the previous leaf, so spans are meaningful when `id` is the root.
    pub fn leaves(&self, id: NodeId) -> Vec<LeafSpan> {
        let mut leaves = Vec::new();
        let mut previous_end: Option<Position> = None;
        let mut stack = vec![id];

        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            let children = self.child_ids(current);
            if !children.is_empty() {
                stack.extend(children.iter().rev().copied());
                continue;
            }

            let (start, end) = match node.as_ref() {
                GrammarNode::Resolved(ast) => (ast.token_range.start, ast.token_range.end),
                GrammarNode::Pending(context) => {
                    let start = context.token_start.or(previous_end).unwrap_or_default();
                    (start, start)
                }
            };
            trace!(
                "Leaf {} ({}) spans ({}, {})..({}, {})",
                node.id(),
                node.kind(),
                start.line,
                start.character,
                end.line,
                end.character
            );
            previous_end = Some(end);
            leaves.push(LeafSpan {
                node: Arc::clone(node),
                start,
                end,
            });
        }

        leaves
    }

    /// The last resolved leaf of the subtree rooted at `id`.
    pub fn right_most_leaf(&self, id: NodeId) -> Option<&AstNode> {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let children = self.child_ids(current);
            if children.is_empty() {
                if let Some(ast) = self.nodes.get(&current).and_then(|node| node.as_resolved()) {
                    return Some(ast);
                }
            } else {
                // Last child is popped first.
                stack.extend(children.iter().copied());
            }
        }
        None
    }

    /// The operand a recursive-expression element applies to.
    ///
    /// For `head[a][[b]]` the element `[[b]]` applies to `[a]`, and `[a]`
    /// applies to `head`.
    pub fn recursive_expression_previous_sibling(
        &self,
        id: NodeId,
    ) -> InspectionResult<&Arc<GrammarNode>> {
        let node = self.expect_node(id)?;
        let wrapper = self
            .parent(id)
            .filter(|parent| parent.is_kind(NodeKind::ArrayWrapper))
            .ok_or_else(|| {
                InspectionError::invariant(id, "recursive expression is not inside an array wrapper")
            })?;
        let primary = self
            .parent(wrapper.id())
            .filter(|grandparent| grandparent.is_kind(NodeKind::RecursivePrimaryExpression))
            .ok_or_else(|| {
                InspectionError::invariant(
                    id,
                    "recursive expression is not part of a recursive primary expression",
                )
            })?;

        let previous = match node.attribute_index() {
            Some(0) => self.nth_child(primary.id(), recursive_primary_expression::HEAD),
            Some(index) => self.nth_child(wrapper.id(), index - 1),
            None => None,
        };
        previous.ok_or_else(|| {
            InspectionError::invariant(id, "recursive expression has no previous sibling")
        })
    }

    /// Text of the field selected by a `FieldSelector` node, if parsed.
    pub fn field_selector_name(&self, id: NodeId) -> Option<&str> {
        self.nth_child_if_resolved_of_kind(id, wrapped::CONTENT, NodeKind::GeneralizedIdentifier)
            .and_then(AstNode::identifier_text)
    }

    /// Names of the fields selected by a `FieldProjection`, in source order.
    ///
    /// Selectors whose name has not been parsed yet are skipped.
    pub fn field_projection_names(&self, id: NodeId) -> Vec<String> {
        let Some(content) = self.nth_child(id, wrapped::CONTENT) else {
            return Vec::new();
        };

        let names: Vec<String> = self
            .children(content.id())
            .filter(|csv| csv.is_kind(NodeKind::Csv))
            .filter_map(|csv| self.nth_child(csv.id(), super::grammar::csv::NODE))
            .filter(|selector| selector.is_kind(NodeKind::FieldSelector))
            .filter_map(|selector| self.field_selector_name(selector.id()))
            .map(str::to_string)
            .collect();

        debug!("Field projection {} selects {:?}", id, names);
        names
    }

    /// Serializes the tree as a flat record list, parents before children.
    pub fn to_snapshot(&self) -> TreeSnapshot {
        let mut nodes = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(&id) {
                nodes.push(NodeRecord {
                    parent: self.parent_id(id),
                    node: GrammarNode::clone(node),
                });
            }
            stack.extend(self.child_ids(id).iter().rev().copied());
        }
        TreeSnapshot { nodes }
    }
}

/// Incremental construction of a [`NodeIdMap`].
///
/// Parents must be inserted before their children.
#[derive(Debug, Default)]
pub struct NodeIdMapBuilder {
    map: NodeIdMap,
}

impl NodeIdMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node under `parent`, or as the root when `parent` is `None`.
    pub fn insert(
        &mut self,
        parent: Option<NodeId>,
        node: impl Into<GrammarNode>,
    ) -> Result<NodeId, TreeError> {
        let node: GrammarNode = node.into();
        let id = node.id();
        if self.map.nodes.contains_key(&id) {
            return Err(TreeError::DuplicateId(id));
        }

        match parent {
            None => {
                if let Some(existing) = self.map.root {
                    return Err(TreeError::MultipleRoots { id, existing });
                }
                self.map.root = Some(id);
            }
            Some(parent) => {
                let parent_node = self
                    .map
                    .nodes
                    .get(&parent)
                    .ok_or(TreeError::UnknownParent { id, parent })?;
                if parent_node.is_resolved() && !node.is_resolved() {
                    return Err(TreeError::PendingUnderResolved { parent, child: id });
                }

                let nodes = &self.map.nodes;
                let siblings = self.map.children_by_id.entry(parent).or_default();
                let slot_of = |sibling: &NodeId| {
                    nodes
                        .get(sibling)
                        .and_then(|sibling| sibling.attribute_index())
                        .unwrap_or(u32::MAX)
                };
                if let Some(attribute_index) = node.attribute_index() {
                    if siblings.iter().any(|sibling| slot_of(sibling) == attribute_index) {
                        return Err(TreeError::DuplicateAttributeIndex {
                            parent,
                            attribute_index,
                        });
                    }
                }
                let slot = node.attribute_index().unwrap_or(u32::MAX);
                let at = siblings.partition_point(|sibling| slot_of(sibling) <= slot);
                siblings.insert(at, id);
                self.map.parent_by_id.insert(id, parent);
            }
        }

        self.map.nodes.insert(id, Arc::new(node));
        Ok(id)
    }

    pub fn build(self) -> NodeIdMap {
        debug!(
            "Built node id map with {} nodes, root {:?}",
            self.map.nodes.len(),
            self.map.root
        );
        self.map
    }
}

/// One node of a [`TreeSnapshot`] with its parent link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(default)]
    pub parent: Option<NodeId>,
    pub node: GrammarNode,
}

/// Flat, serializable form of a parse tree, as produced by an external parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    pub nodes: Vec<NodeRecord>,
}

impl TreeSnapshot {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

impl TryFrom<TreeSnapshot> for NodeIdMap {
    type Error = TreeError;

    fn try_from(snapshot: TreeSnapshot) -> Result<Self, Self::Error> {
        let mut builder = NodeIdMapBuilder::new();
        for record in snapshot.nodes {
            builder.insert(record.parent, record.node)?;
        }
        Ok(builder.build())
    }
}
