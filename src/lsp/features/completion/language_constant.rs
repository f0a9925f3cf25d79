//! Autocomplete for the contextual constants `nullable` and `optional`
//!
//! Neither word is reserved: `nullable` only means something inside a type
//! assertion (`x as nullable number`) and `optional` only at the start of a
//! function parameter (`(optional x) => x`). Both are recognised by matching
//! fixed shapes on the ancestry.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::item::AutocompleteItem;
use crate::ir::ancestry::{first_index_of_kind, nth_previous, nth_previous_checked, previous};
use crate::ir::grammar::{paired_constant, parameter};
use crate::ir::node::{GrammarNode, NodeKind};
use crate::ir::position_utils::{is_before_node, is_in_ast};
use crate::lsp::features::active_node::ActiveNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageConstantKind {
    Nullable,
    Optional,
}

impl LanguageConstantKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageConstantKind::Nullable => "nullable",
            LanguageConstantKind::Optional => "optional",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            LanguageConstantKind::Nullable => "Allow null in addition to the primitive type",
            LanguageConstantKind::Optional => "Parameter that may be omitted by the caller",
        }
    }
}

/// Offer `nullable` or `optional` at the active node, nullable first.
pub fn autocomplete_language_constant(active_node: &ActiveNode) -> Option<AutocompleteItem> {
    let constant = if is_nullable_allowed(active_node) {
        LanguageConstantKind::Nullable
    } else if is_optional_allowed(active_node) {
        LanguageConstantKind::Optional
    } else {
        return None;
    };

    debug!("Offering language constant {}", constant.as_str());
    Some(AutocompleteItem::from_language_constant(constant))
}

/// Whether `nullable` fits at the cursor.
///
/// Scans the ancestry outward and stops at the first `AsNullablePrimitiveType`
/// or `PrimitiveType` ancestor that allows it.
pub fn is_nullable_allowed(active_node: &ActiveNode) -> bool {
    active_node
        .ancestry
        .iter()
        .enumerate()
        .any(|(index, node)| match node.kind() {
            NodeKind::AsNullablePrimitiveType => {
                is_nullable_allowed_for_as_nullable_primitive_type(active_node, index)
            }
            NodeKind::PrimitiveType => is_nullable_allowed_for_primitive_type(node),
            _ => false,
        })
}

/// `as |number`, `as |nullable number` and `as nullable|` (before the type).
fn is_nullable_allowed_for_as_nullable_primitive_type(active_node: &ActiveNode, index: usize) -> bool {
    let ancestry = &active_node.ancestry;
    let Some(paired) = previous(ancestry, index) else {
        return false;
    };
    if paired.attribute_index() != Some(paired_constant::PAIRED) {
        return false;
    }
    let position = active_node.position;

    match paired.kind() {
        NodeKind::PrimitiveType if is_before_node(position, paired, false) => true,
        NodeKind::NullablePrimitiveType => {
            let Some(grandchild) = nth_previous(ancestry, index, 2) else {
                return false;
            };
            grandchild.is_kind(NodeKind::Constant) || is_before_node(position, grandchild, false)
        }
        NodeKind::PrimitiveType => is_nullable_allowed_for_primitive_type(paired),
        _ => false,
    }
}

/// A primitive type still being typed can become `nullable`.
fn is_nullable_allowed_for_primitive_type(primitive_type: &GrammarNode) -> bool {
    !primitive_type.is_resolved()
}

/// The `Parameter` the cursor is in, reached from the function expression at
/// `function_index` via ParameterList, ArrayWrapper and Csv.
fn function_parameter(ancestry: &[Arc<GrammarNode>], function_index: usize) -> Option<&Arc<GrammarNode>> {
    const PATH: [NodeKind; 4] = [
        NodeKind::ParameterList,
        NodeKind::ArrayWrapper,
        NodeKind::Csv,
        NodeKind::Parameter,
    ];

    let mut found = None;
    for (step, kind) in PATH.into_iter().enumerate() {
        found = Some(nth_previous_checked(ancestry, function_index, step + 1, kind)?);
    }
    found
}

/// Whether `optional` fits at the cursor.
///
/// Only at the start of a parameter: on its optional marker, or while typing
/// a name that is still a prefix of `optional`.
pub fn is_optional_allowed(active_node: &ActiveNode) -> bool {
    let ancestry = &active_node.ancestry;
    let Some(function_index) = first_index_of_kind(ancestry, NodeKind::FunctionExpression) else {
        return false;
    };
    if function_parameter(ancestry, function_index).is_none() {
        return false;
    }
    let Some(child) = nth_previous(ancestry, function_index, 5) else {
        return false;
    };

    match child.attribute_index() {
        Some(parameter::OPTIONAL_CONSTANT) => true,
        Some(parameter::NAME) => match child.as_ref() {
            GrammarNode::Resolved(name) => {
                let optional = LanguageConstantKind::Optional.as_str();
                name.identifier_text().is_some_and(|text| {
                    !text.is_empty()
                        && text != optional
                        && optional.starts_with(text)
                        && is_in_ast(active_node.position, name, false, true)
                })
            }
            GrammarNode::Pending(_) => true,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::node::{AstNode, ContextNode, LeafValue, NodeId, Position, PrimitiveTypeKind, TokenRange};
    use crate::lsp::features::active_node::ActiveNodeLeafKind;

    fn resolved(id: u32, kind: NodeKind, slot: u32, start: u32, end: u32, value: Option<LeafValue>) -> GrammarNode {
        GrammarNode::Resolved(AstNode {
            id: NodeId(id),
            kind,
            attribute_index: Some(slot),
            token_range: TokenRange::new(Position::new(0, start), Position::new(0, end)),
            value,
        })
    }

    fn pending(id: u32, kind: NodeKind, slot: Option<u32>) -> GrammarNode {
        GrammarNode::Pending(ContextNode {
            id: NodeId(id),
            kind,
            attribute_index: slot,
            token_start: None,
        })
    }

    fn active(character: u32, ancestry: Vec<GrammarNode>) -> ActiveNode {
        ActiveNode {
            position: Position::new(0, character),
            ancestry: ancestry.into_iter().map(Arc::new).collect(),
            leaf_kind: ActiveNodeLeafKind::Normal,
        }
    }

    /// `(<name>` with the ancestry running from the name up to the function.
    fn parameter_name(name: GrammarNode) -> Vec<GrammarNode> {
        vec![
            name,
            pending(5, NodeKind::Parameter, Some(0)),
            pending(4, NodeKind::Csv, Some(0)),
            pending(3, NodeKind::ArrayWrapper, Some(1)),
            pending(2, NodeKind::ParameterList, Some(0)),
            pending(1, NodeKind::FunctionExpression, None),
        ]
    }

    fn identifier(text: &str) -> GrammarNode {
        resolved(
            6,
            NodeKind::Identifier,
            parameter::NAME,
            1,
            1 + text.len() as u32,
            Some(LeafValue::Identifier(text.to_string())),
        )
    }

    #[test]
    fn test_optional_for_partial_name() {
        assert!(is_optional_allowed(&active(4, parameter_name(identifier("opt")))));
        assert!(is_optional_allowed(&active(2, parameter_name(identifier("opt")))));
        // Cursor at the start of the name is not inside it.
        assert!(!is_optional_allowed(&active(1, parameter_name(identifier("opt")))));
        assert!(!is_optional_allowed(&active(9, parameter_name(identifier("optional")))));
        assert!(!is_optional_allowed(&active(3, parameter_name(identifier("xy")))));
    }

    #[test]
    fn test_optional_for_pending_name_and_marker() {
        assert!(is_optional_allowed(&active(1, parameter_name(pending(6, NodeKind::Identifier, Some(parameter::NAME))))));
        let marker = resolved(
            6,
            NodeKind::Constant,
            parameter::OPTIONAL_CONSTANT,
            1,
            9,
            Some(LeafValue::Constant("optional".to_string())),
        );
        assert!(is_optional_allowed(&active(5, parameter_name(marker))));
    }

    #[test]
    fn test_optional_requires_full_parameter_path() {
        let mut ancestry = parameter_name(identifier("opt"));
        ancestry[3] = pending(3, NodeKind::ListExpression, Some(1));
        assert!(!is_optional_allowed(&active(4, ancestry)));

        // No node below the parameter.
        let ancestry = parameter_name(identifier("opt")).split_off(1);
        assert!(!is_optional_allowed(&active(4, ancestry)));
    }

    #[test]
    fn test_nullable_before_primitive_type() {
        // `x as|`: the cursor is on the `as` keyword itself
        let ancestry = vec![
            resolved(3, NodeKind::Constant, paired_constant::CONSTANT, 2, 4, Some(LeafValue::Constant("as".to_string()))),
            pending(2, NodeKind::AsNullablePrimitiveType, Some(1)),
        ];
        assert!(!is_nullable_allowed(&active(4, ancestry)));

        let ancestry = vec![
            resolved(
                4,
                NodeKind::PrimitiveType,
                paired_constant::PAIRED,
                6,
                12,
                Some(LeafValue::PrimitiveType(PrimitiveTypeKind::Number)),
            ),
            pending(2, NodeKind::AsNullablePrimitiveType, Some(1)),
        ];
        // `x as |number`
        assert!(is_nullable_allowed(&active(5, ancestry.clone())));
        assert!(!is_nullable_allowed(&active(8, ancestry)));
    }

    #[test]
    fn test_nullable_while_primitive_type_pending() {
        let ancestry = vec![
            pending(4, NodeKind::PrimitiveType, Some(paired_constant::PAIRED)),
            pending(2, NodeKind::AsNullablePrimitiveType, Some(1)),
        ];
        assert!(is_nullable_allowed(&active(5, ancestry)));
    }

    #[test]
    fn test_nothing_offered_outside_types_and_parameters() {
        let ancestry = vec![pending(1, NodeKind::LiteralExpression, None)];
        assert!(autocomplete_language_constant(&active(0, ancestry)).is_none());
    }
}
