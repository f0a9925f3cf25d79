//! Structural type inference
//!
//! [`inspect_type`] computes the [`Type`] of any node by dispatching on its
//! kind and recursing into the operands it depends on. Types of nodes seen
//! during one request are memoized in the [`InspectTypeState`], and the caller
//! can seed types it already knows (for example identifiers resolved by a
//! scope layer).
//!
//! Every node visit checks the request's cancellation handle first, so a
//! cancelled request fails fast with
//! [`InspectionError::Cancelled`](crate::error::InspectionError::Cancelled) instead of
//! returning a partial type. Recursion is bounded by
//! [`InspectionSettings::max_depth`].

pub mod field_projection;
pub mod field_selector;
mod primary;

pub use field_projection::project_fields;
pub use field_selector::select_field;

use rustc_hash::FxHashMap;
use tracing::{trace, warn};

use crate::error::{InspectionError, InspectionResult};
use crate::ir::node::{AstNode, GrammarNode, NodeId, NodeKind};
use crate::ir::node_id_map::NodeIdMap;
use crate::ir::types::Type;
use crate::settings::InspectionSettings;

/// State threaded through one type-inspection request.
#[derive(Debug)]
pub struct InspectTypeState<'a> {
    pub settings: &'a InspectionSettings,
    pub map: &'a NodeIdMap,
    given_types: FxHashMap<NodeId, Type>,
    cache: FxHashMap<NodeId, Type>,
    /// Nodes currently being inspected on the call stack.
    depth: usize,
}

impl<'a> InspectTypeState<'a> {
    pub fn new(settings: &'a InspectionSettings, map: &'a NodeIdMap) -> Self {
        Self {
            settings,
            map,
            given_types: FxHashMap::default(),
            cache: FxHashMap::default(),
            depth: 0,
        }
    }

    /// Seed a type known from outside the tree.
    pub fn with_given_type(mut self, id: NodeId, given: Type) -> Self {
        self.given_types.insert(id, given);
        self
    }

    /// Type already computed for `id` in this request, if any.
    pub fn cached_type(&self, id: NodeId) -> Option<&Type> {
        self.given_types.get(&id).or_else(|| self.cache.get(&id))
    }
}

/// Infer the type of a node by id.
pub fn inspect_type(state: &mut InspectTypeState<'_>, node_id: NodeId) -> InspectionResult<Type> {
    let map = state.map;
    let node = map.expect_node(node_id)?;
    inspect_node(state, node.as_ref())
}

/// One-shot inference with a fresh state.
pub fn try_inspect_type(
    settings: &InspectionSettings,
    map: &NodeIdMap,
    node_id: NodeId,
) -> InspectionResult<Type> {
    inspect_type(&mut InspectTypeState::new(settings, map), node_id)
}

pub(crate) fn inspect_node<'a>(
    state: &mut InspectTypeState<'a>,
    node: &'a GrammarNode,
) -> InspectionResult<Type> {
    state.settings.check_cancelled()?;

    let id = node.id();
    if let Some(known) = state.cached_type(id) {
        return Ok(known.clone());
    }

    if state.depth >= state.settings.max_depth {
        warn!(
            "Maximum depth {} reached at node {} ({})",
            state.settings.max_depth,
            id,
            node.kind()
        );
        return Err(InspectionError::DepthExceeded {
            node_id: id,
            max_depth: state.settings.max_depth,
        });
    }

    state.depth += 1;
    let inspected = match node {
        GrammarNode::Pending(_) => Ok(Type::UNKNOWN),
        GrammarNode::Resolved(ast) => inspect_ast(state, ast),
    };
    state.depth -= 1;
    let inspected = inspected?;
    trace!("Node {} ({}) has type {}", id, node.kind(), inspected);

    state.cache.insert(id, inspected.clone());
    Ok(inspected)
}

fn inspect_ast<'a>(state: &mut InspectTypeState<'a>, ast: &'a AstNode) -> InspectionResult<Type> {
    match ast.kind {
        NodeKind::LiteralExpression => Ok(primary::inspect_literal(ast)),
        NodeKind::ParenthesizedExpression => primary::inspect_parenthesized(state, ast),
        NodeKind::RecordExpression => primary::inspect_record_expression(state, ast),
        NodeKind::ListExpression => Ok(Type::LIST),
        NodeKind::FunctionExpression => Ok(Type::FUNCTION),
        NodeKind::IfExpression => primary::inspect_if(state, ast),
        NodeKind::LetExpression => primary::inspect_let(state, ast),
        NodeKind::RecursivePrimaryExpression => primary::inspect_recursive_primary(state, ast),
        NodeKind::FieldProjection => field_projection::inspect_field_projection(state, ast),
        NodeKind::FieldSelector => field_selector::inspect_field_selector(state, ast),
        NodeKind::ErrorRaisingExpression => Ok(Type::ANY),
        NodeKind::NotImplementedExpression => Ok(Type::NONE),
        _ => Ok(Type::UNKNOWN),
    }
}

/// Infer the type of the child at `attribute_index`, `Unknown` when absent.
fn inspect_child<'a>(
    state: &mut InspectTypeState<'a>,
    parent: &'a AstNode,
    attribute_index: u32,
) -> InspectionResult<Type> {
    let map = state.map;
    match map.nth_child(parent.id, attribute_index) {
        Some(child) => inspect_node(state, child.as_ref()),
        None => Ok(Type::UNKNOWN),
    }
}

