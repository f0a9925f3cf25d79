//! Cursor-to-ancestry resolution
//!
//! Both autocomplete engines start from an [`ActiveNode`]: the chain of grammar
//! nodes from the leaf under the cursor up to the document root, plus a flag
//! telling whether the cursor sits in a fresh expression hole right behind a
//! delimiter.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace};

use crate::ir::grammar::is_hole_opening_delimiter;
use crate::ir::node::{GrammarNode, NodeKind, Position};
use crate::ir::node_id_map::{LeafSpan, NodeIdMap};

/// How the cursor relates to the active leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActiveNodeLeafKind {
    Normal,
    /// The cursor is right behind a delimiter such as the `=` in `[x=|1]`,
    /// so the leaf it touches is the start of a new expression.
    ShiftedRight,
}

/// Cursor-relative view of the tree.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveNode {
    pub position: Position,
    /// Nearest node first, root last. Never empty.
    pub ancestry: Vec<Arc<GrammarNode>>,
    pub leaf_kind: ActiveNodeLeafKind,
}

impl ActiveNode {
    /// The node nearest the cursor.
    pub fn leaf(&self) -> Option<&Arc<GrammarNode>> {
        self.ancestry.first()
    }

    pub fn root(&self) -> Option<&Arc<GrammarNode>> {
        self.ancestry.last()
    }
}

/// Find the active node for a cursor position
///
/// # Arguments
/// * `map` - Node-id index of the (possibly incomplete) parse
/// * `position` - Cursor position
///
/// # Returns
/// `None` when the tree is empty or the cursor lies outside its span: before
/// the first leaf, or after the end of a fully resolved root.
///
/// # Algorithm
/// 1. Visit leaves in document order
/// 2. Take the last leaf starting at or before the cursor
/// 3. Mark `ShiftedRight` when that leaf starts at the cursor and the leaf
///    before it is a delimiter ending at the cursor
/// 4. Otherwise, when the leaf before it ends at the cursor, keep the deeper
///    of the two; on a tie the leaf ending at the cursor wins
/// 5. Walk parents from the leaf to the root
pub fn find_active_node(map: &NodeIdMap, position: Position) -> Option<ActiveNode> {
    let root = map.root()?;
    if let GrammarNode::Resolved(ast) = root.as_ref() {
        if position > ast.token_range.end {
            debug!(
                "Position ({}, {}) is past the end of the resolved root",
                position.line, position.character
            );
            return None;
        }
    }

    let leaves = map.leaves(root.id());
    let Some(index) = leaves.iter().rposition(|leaf| leaf.start <= position) else {
        debug!(
            "Position ({}, {}) is before the first leaf",
            position.line, position.character
        );
        return None;
    };

    let (leaf, leaf_kind, ancestry) = match index.checked_sub(1).map(|previous| &leaves[previous]) {
        Some(previous) if leaves[index].start == position && is_delimiter_ending_at(previous, position) => {
            let leaf = &leaves[index];
            (leaf, ActiveNodeLeafKind::ShiftedRight, map.ancestry(leaf.node.id()))
        }
        Some(previous) if leaves[index].start == position && previous.end == position => {
            // `[x=1|]`: the literal is nested deeper than the closing bracket
            let next = &leaves[index];
            let previous_ancestry = map.ancestry(previous.node.id());
            let next_ancestry = map.ancestry(next.node.id());
            if next_ancestry.len() > previous_ancestry.len() {
                (next, ActiveNodeLeafKind::Normal, next_ancestry)
            } else {
                (previous, ActiveNodeLeafKind::Normal, previous_ancestry)
            }
        }
        _ => {
            let leaf = &leaves[index];
            (leaf, ActiveNodeLeafKind::Normal, map.ancestry(leaf.node.id()))
        }
    };

    trace!(
        "Active leaf {} ({}) with {} ancestors, {:?}",
        leaf.node.id(),
        leaf.node.kind(),
        ancestry.len(),
        leaf_kind
    );

    Some(ActiveNode {
        position,
        ancestry,
        leaf_kind,
    })
}

fn is_delimiter_ending_at(leaf: &LeafSpan, position: Position) -> bool {
    leaf.end == position
        && leaf
            .node
            .as_resolved_of_kind(NodeKind::Constant)
            .and_then(|ast| ast.constant_text())
            .is_some_and(is_hole_opening_delimiter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ancestry::is_linked;
    use crate::ir::node::{AstNode, ContextNode, LeafValue, NodeId, TokenRange};
    use crate::ir::node_id_map::NodeIdMapBuilder;

    fn constant(id: u32, slot: u32, start: u32, text: &str) -> AstNode {
        AstNode {
            id: NodeId(id),
            kind: NodeKind::Constant,
            attribute_index: Some(slot),
            token_range: TokenRange::new(
                Position::new(0, start),
                Position::new(0, start + text.len() as u32),
            ),
            value: Some(LeafValue::Constant(text.to_string())),
        }
    }

    fn pending(id: u32, kind: NodeKind, slot: Option<u32>, start: Option<u32>) -> ContextNode {
        ContextNode {
            id: NodeId(id),
            kind,
            attribute_index: slot,
            token_start: start.map(|character| Position::new(0, character)),
        }
    }

    /// `[x=` followed by end of input.
    fn record_hole() -> NodeIdMap {
        let mut builder = NodeIdMapBuilder::new();
        builder.insert(None, pending(1, NodeKind::RecordExpression, None, Some(0))).unwrap();
        builder.insert(Some(NodeId(1)), constant(2, 0, 0, "[")).unwrap();
        builder
            .insert(Some(NodeId(1)), pending(3, NodeKind::ArrayWrapper, Some(1), Some(1)))
            .unwrap();
        builder.insert(Some(NodeId(3)), pending(4, NodeKind::Csv, Some(0), Some(1))).unwrap();
        builder
            .insert(
                Some(NodeId(4)),
                pending(5, NodeKind::GeneralizedIdentifierPairedExpression, Some(0), Some(1)),
            )
            .unwrap();
        builder
            .insert(
                Some(NodeId(5)),
                AstNode {
                    id: NodeId(6),
                    kind: NodeKind::GeneralizedIdentifier,
                    attribute_index: Some(0),
                    token_range: TokenRange::new(Position::new(0, 1), Position::new(0, 2)),
                    value: Some(LeafValue::GeneralizedIdentifier("x".to_string())),
                },
            )
            .unwrap();
        builder.insert(Some(NodeId(5)), constant(7, 1, 2, "=")).unwrap();
        builder
            .insert(Some(NodeId(5)), pending(8, NodeKind::LiteralExpression, Some(2), None))
            .unwrap();
        builder.build()
    }

    #[test]
    fn test_cursor_after_equals_is_shifted_right() {
        let map = record_hole();
        let active = find_active_node(&map, Position::new(0, 3)).unwrap();
        assert_eq!(active.leaf_kind, ActiveNodeLeafKind::ShiftedRight);
        assert_eq!(active.leaf().map(|n| n.id()), Some(NodeId(8)));
        assert_eq!(active.root().map(|n| n.id()), Some(NodeId(1)));
        assert!(is_linked(&map, &active.ancestry));
    }

    #[test]
    fn test_cursor_inside_identifier_is_normal() {
        let map = record_hole();
        let active = find_active_node(&map, Position::new(0, 2)).unwrap();
        assert_eq!(active.leaf_kind, ActiveNodeLeafKind::Normal);
        assert_eq!(active.leaf().map(|n| n.id()), Some(NodeId(7)));
    }

    #[test]
    fn test_shared_boundary_prefers_token_before_cursor() {
        // `if x then`, pending true branch anchored right after `then`
        let mut builder = NodeIdMapBuilder::new();
        builder.insert(None, pending(1, NodeKind::IfExpression, None, Some(0))).unwrap();
        builder.insert(Some(NodeId(1)), constant(2, 0, 0, "if")).unwrap();
        builder.insert(Some(NodeId(1)), constant(3, 2, 5, "then")).unwrap();
        builder
            .insert(Some(NodeId(1)), pending(4, NodeKind::LiteralExpression, Some(3), None))
            .unwrap();
        let map = builder.build();

        let active = find_active_node(&map, Position::new(0, 9)).unwrap();
        assert_eq!(active.leaf_kind, ActiveNodeLeafKind::Normal);
        assert_eq!(active.leaf().map(|n| n.id()), Some(NodeId(3)));

        let past = find_active_node(&map, Position::new(0, 10)).unwrap();
        assert_eq!(past.leaf().map(|n| n.id()), Some(NodeId(4)));
    }

    #[test]
    fn test_cursor_outside_resolved_root() {
        let mut builder = NodeIdMapBuilder::new();
        builder
            .insert(
                None,
                AstNode {
                    id: NodeId(1),
                    kind: NodeKind::LiteralExpression,
                    attribute_index: None,
                    token_range: TokenRange::new(Position::new(0, 2), Position::new(0, 3)),
                    value: Some(LeafValue::Literal {
                        kind: crate::ir::node::LiteralKind::Numeric,
                        text: "1".to_string(),
                    }),
                },
            )
            .unwrap();
        let map = builder.build();
        assert!(find_active_node(&map, Position::new(0, 1)).is_none());
        assert!(find_active_node(&map, Position::new(0, 4)).is_none());
        assert!(find_active_node(&map, Position::new(0, 3)).is_some());
    }

    #[test]
    fn test_empty_map_has_no_active_node() {
        assert!(find_active_node(&NodeIdMap::default(), Position::new(0, 0)).is_none());
    }
}
