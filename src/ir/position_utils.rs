//! Cursor-versus-node comparisons
//!
//! Resolved nodes are compared by their token range. Pending nodes only know
//! where their first token started, and a pending node with no token start is
//! never "after" the cursor.

use super::node::{AstNode, GrammarNode, Position};

/// Whether `position` comes before `target`, optionally counting equality.
pub fn is_before_position(position: Position, target: Position, bound_included: bool) -> bool {
    position < target || (bound_included && position == target)
}

/// Whether the cursor sits before the start of `node`.
///
/// # Arguments
/// * `position` - Cursor position
/// * `node` - Node to compare against
/// * `bound_included` - Treat a cursor exactly at the node's start as before it
pub fn is_before_node(position: Position, node: &GrammarNode, bound_included: bool) -> bool {
    match node {
        GrammarNode::Resolved(ast) => {
            is_before_position(position, ast.token_range.start, bound_included)
        }
        GrammarNode::Pending(context) => context
            .token_start
            .is_some_and(|start| is_before_position(position, start, bound_included)),
    }
}

/// Whether the cursor is past the node's end, optionally counting the end itself.
pub fn is_after_ast(position: Position, ast: &AstNode, bound_included: bool) -> bool {
    position > ast.token_range.end || (bound_included && position == ast.token_range.end)
}

/// Whether the cursor lies within the node's span, with configurable bounds.
pub fn is_in_ast(position: Position, ast: &AstNode, start_included: bool, end_included: bool) -> bool {
    let start = ast.token_range.start;
    let end = ast.token_range.end;
    let after_start = position > start || (start_included && position == start);
    let before_end = position < end || (end_included && position == end);
    after_start && before_end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::node::{ContextNode, NodeId, NodeKind, TokenRange};

    fn word(start: u32, end: u32) -> AstNode {
        AstNode {
            id: NodeId(1),
            kind: NodeKind::Identifier,
            attribute_index: None,
            token_range: TokenRange::new(Position::new(0, start), Position::new(0, end)),
            value: None,
        }
    }

    #[test]
    fn test_is_before_node_resolved() {
        let node = GrammarNode::Resolved(word(4, 7));
        assert!(is_before_node(Position::new(0, 3), &node, false));
        assert!(!is_before_node(Position::new(0, 4), &node, false));
        assert!(is_before_node(Position::new(0, 4), &node, true));
    }

    #[test]
    fn test_is_before_node_pending_without_start() {
        let node = GrammarNode::Pending(ContextNode {
            id: NodeId(2),
            kind: NodeKind::Identifier,
            attribute_index: None,
            token_start: None,
        });
        assert!(!is_before_node(Position::new(0, 0), &node, true));
    }

    #[test]
    fn test_span_checks() {
        let ast = word(4, 7);
        assert!(is_after_ast(Position::new(0, 8), &ast, false));
        assert!(!is_after_ast(Position::new(0, 7), &ast, false));
        assert!(is_after_ast(Position::new(0, 7), &ast, true));
        assert!(is_in_ast(Position::new(0, 5), &ast, false, false));
        assert!(!is_in_ast(Position::new(0, 4), &ast, false, true));
        assert!(is_in_ast(Position::new(0, 7), &ast, false, true));
    }
}
