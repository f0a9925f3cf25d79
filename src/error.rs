//! Error types shared by the inspection engines and the tree builder

use thiserror::Error;

use crate::ir::node::NodeId;

/// Failure of a single inspection request.
///
/// Heuristic misses are not errors: they surface as empty suggestions or as
/// the `None` type. Only cancellation, broken tree invariants and runaway
/// nesting end up here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InspectionError {
    #[error("inspection was cancelled")]
    Cancelled,

    #[error("node {0} is not present in the node id map")]
    UnknownNode(NodeId),

    #[error("invariant violation at node {node_id}: {message}")]
    InvariantViolation { node_id: NodeId, message: String },

    #[error("node {node_id} is nested deeper than {max_depth} levels")]
    DepthExceeded { node_id: NodeId, max_depth: usize },
}

impl InspectionError {
    pub fn invariant(node_id: NodeId, message: impl Into<String>) -> Self {
        InspectionError::InvariantViolation {
            node_id,
            message: message.into(),
        }
    }
}

pub type InspectionResult<T> = Result<T, InspectionError>;

/// Failure while assembling a [`NodeIdMap`](crate::ir::node_id_map::NodeIdMap).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node id {0} was inserted twice")]
    DuplicateId(NodeId),

    #[error("node {id} names parent {parent}, which has not been inserted")]
    UnknownParent { id: NodeId, parent: NodeId },

    #[error("node {id} has no parent but {existing} is already the root")]
    MultipleRoots { id: NodeId, existing: NodeId },

    #[error("parent {parent} already has a child at attribute index {attribute_index}")]
    DuplicateAttributeIndex { parent: NodeId, attribute_index: u32 },

    #[error("pending node {child} cannot be a child of resolved node {parent}")]
    PendingUnderResolved { parent: NodeId, child: NodeId },
}
