//! Rules for literals, wrappers and the structural expressions that feed
//! field access.

use crate::error::InspectionResult;
use crate::ir::grammar::{csv, if_expression, let_expression, paired_expression, recursive_primary_expression, wrapped};
use crate::ir::node::{AstNode, LiteralKind, NodeKind};
use crate::ir::types::{RecordFields, Type};

use super::{InspectTypeState, inspect_child, inspect_node};

pub(super) fn inspect_literal(ast: &AstNode) -> Type {
    match ast.literal_kind() {
        Some(LiteralKind::Numeric) => Type::NUMBER,
        Some(LiteralKind::Text) => Type::TEXT,
        Some(LiteralKind::Logical) => Type::LOGICAL,
        Some(LiteralKind::Null) => Type::NULL,
        Some(LiteralKind::List) => Type::LIST,
        Some(LiteralKind::Record) => Type::RECORD,
        None => Type::UNKNOWN,
    }
}

pub(super) fn inspect_parenthesized<'a>(
    state: &mut InspectTypeState<'a>,
    ast: &'a AstNode,
) -> InspectionResult<Type> {
    inspect_child(state, ast, wrapped::CONTENT)
}

/// `[a = 1, b = "x"]` is the closed record `[a: number, b: text]`.
pub(super) fn inspect_record_expression<'a>(
    state: &mut InspectTypeState<'a>,
    ast: &'a AstNode,
) -> InspectionResult<Type> {
    let map = state.map;
    let mut fields = RecordFields::new();

    if let Some(content) = map.nth_child(ast.id, wrapped::CONTENT) {
        for element in map.children(content.id()) {
            let Some(pair) = map.nth_child_checked(
                element.id(),
                csv::NODE,
                NodeKind::GeneralizedIdentifierPairedExpression,
            )?
            else {
                continue;
            };
            let Some(key) = map
                .nth_child_if_resolved_of_kind(pair.id(), paired_expression::KEY, NodeKind::GeneralizedIdentifier)
                .and_then(AstNode::identifier_text)
            else {
                continue;
            };
            let value = match map.nth_child(pair.id(), paired_expression::VALUE) {
                Some(value) => inspect_node(state, value.as_ref())?,
                None => Type::UNKNOWN,
            };
            fields.insert(key.to_string(), value);
        }
    }

    Ok(Type::defined_record(false, fields, false))
}

/// Equal branches give that type, differing branches an Any-Union of both.
pub(super) fn inspect_if<'a>(state: &mut InspectTypeState<'a>, ast: &'a AstNode) -> InspectionResult<Type> {
    let when_true = inspect_child(state, ast, if_expression::TRUE_EXPRESSION)?;
    let when_false = inspect_child(state, ast, if_expression::FALSE_EXPRESSION)?;
    if when_true == when_false {
        Ok(when_true)
    } else {
        Ok(Type::any_union(false, [when_true, when_false]))
    }
}

pub(super) fn inspect_let<'a>(state: &mut InspectTypeState<'a>, ast: &'a AstNode) -> InspectionResult<Type> {
    inspect_child(state, ast, let_expression::EXPRESSION)
}

/// `head[a][[b]]` has the type of its last element, `head` when there is none.
pub(super) fn inspect_recursive_primary<'a>(
    state: &mut InspectTypeState<'a>,
    ast: &'a AstNode,
) -> InspectionResult<Type> {
    let map = state.map;
    let last_element = map
        .nth_child(ast.id, recursive_primary_expression::RECURSIVE_EXPRESSIONS)
        .and_then(|elements| map.children(elements.id()).last());

    match last_element {
        Some(element) => inspect_node(state, element.as_ref()),
        None => inspect_child(state, ast, recursive_primary_expression::HEAD),
    }
}
