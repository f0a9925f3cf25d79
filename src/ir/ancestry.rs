//! Positional helpers over an ancestry
//!
//! An ancestry lists the node nearest the cursor first and the root last, so
//! "previous" means one step closer to the cursor.

use std::sync::Arc;

use super::node::{GrammarNode, NodeKind};
use super::node_id_map::NodeIdMap;

/// The entry one step nearer the cursor than `index`.
pub fn previous(ancestry: &[Arc<GrammarNode>], index: usize) -> Option<&Arc<GrammarNode>> {
    nth_previous(ancestry, index, 1)
}

/// The entry `n` steps nearer the cursor than `index`.
pub fn nth_previous(ancestry: &[Arc<GrammarNode>], index: usize, n: usize) -> Option<&Arc<GrammarNode>> {
    ancestry.get(index.checked_sub(n)?)
}

/// Like [`nth_previous`], but only when the entry is of `kind`.
pub fn nth_previous_checked(
    ancestry: &[Arc<GrammarNode>],
    index: usize,
    n: usize,
    kind: NodeKind,
) -> Option<&Arc<GrammarNode>> {
    nth_previous(ancestry, index, n).filter(|node| node.is_kind(kind))
}

/// Index of the nearest entry of `kind`.
pub fn first_index_of_kind(ancestry: &[Arc<GrammarNode>], kind: NodeKind) -> Option<usize> {
    ancestry.iter().position(|node| node.is_kind(kind))
}

/// Whether every entry's parent in `map` is the following entry.
pub fn is_linked(map: &NodeIdMap, ancestry: &[Arc<GrammarNode>]) -> bool {
    ancestry
        .windows(2)
        .all(|pair| map.parent_id(pair[0].id()) == Some(pair[1].id()))
}
