//! Canned parse trees of small M documents, complete and partial.

use pq_language_services::ir::grammar::{
    csv, function_expression, if_expression, paired_constant, paired_expression, parameter,
    recursive_primary_expression, wrapped,
};
use pq_language_services::ir::node::{LiteralKind, NodeId, NodeKind, PrimitiveTypeKind};

use super::fixture::{Document, Fixture};

/// `if 1`, parse stopped before `then`. Mark `end` after the literal.
pub fn if_numeric() -> Document {
    let mut f = Fixture::new();
    let root = f.pending(None, None, NodeKind::IfExpression);
    f.constant(root, if_expression::IF_CONSTANT, "if");
    f.space();
    f.numeric(root, if_expression::CONDITION, "1");
    f.mark("end");
    f.finish()
}

/// `if x then`, optionally with a pending true branch after `then`.
///
/// Marks: `condition_end`, `then_start`, `then_end` and `after` (one space
/// past `then`).
pub fn if_then(with_hole: bool) -> Document {
    let mut f = Fixture::new();
    let root = f.pending(None, None, NodeKind::IfExpression);
    f.constant(root, if_expression::IF_CONSTANT, "if");
    f.space();
    f.identifier_expression(root, if_expression::CONDITION, "x");
    f.mark("condition_end");
    f.space();
    f.mark("then_start");
    f.constant(root, if_expression::THEN_CONSTANT, "then");
    f.mark("then_end");
    if with_hole {
        f.pending_at_end(Some(root), Some(if_expression::TRUE_EXPRESSION), NodeKind::LiteralExpression);
    }
    f.space();
    f.mark("after");
    f.finish()
}

/// `if true then 1 else <else_text>` with the else branch a literal.
pub fn if_else(else_kind: LiteralKind, else_text: &str) -> Document {
    let mut f = Fixture::new();
    let root = f.node(None, None, NodeKind::IfExpression);
    f.constant(root, if_expression::IF_CONSTANT, "if");
    f.space();
    f.literal(root, if_expression::CONDITION, LiteralKind::Logical, "true");
    f.space();
    f.constant(root, if_expression::THEN_CONSTANT, "then");
    f.space();
    f.numeric(root, if_expression::TRUE_EXPRESSION, "1");
    f.space();
    f.constant(root, if_expression::ELSE_CONSTANT, "else");
    f.space();
    f.literal(root, if_expression::FALSE_EXPRESSION, else_kind, else_text);
    f.finish()
}

/// `[x=` followed by end of input. Mark `hole` right after `=`.
pub fn record_hole() -> Document {
    let mut f = Fixture::new();
    let root = f.pending(None, None, NodeKind::RecordExpression);
    f.constant(root, wrapped::OPEN_WRAPPER, "[");
    let content = f.pending(Some(root), Some(wrapped::CONTENT), NodeKind::ArrayWrapper);
    let element = f.pending(Some(content), Some(0), NodeKind::Csv);
    let pair = f.pending(
        Some(element),
        Some(csv::NODE),
        NodeKind::GeneralizedIdentifierPairedExpression,
    );
    f.generalized_identifier(pair, paired_expression::KEY, "x");
    f.constant(pair, paired_expression::EQUAL_CONSTANT, "=");
    f.mark("hole");
    let value = f.pending_at_end(Some(pair), Some(paired_expression::VALUE), NodeKind::LiteralExpression);
    f.label(value, "value");
    f.finish()
}

/// Opens a record literal `[k=v,...]` under `parent`; values are numeric
/// unless they start with a quote.
fn record_expression(
    f: &mut Fixture,
    parent: Option<NodeId>,
    attribute_index: Option<u32>,
    fields: &[(&str, &str)],
) -> NodeId {
    let record = f.node(parent, attribute_index, NodeKind::RecordExpression);
    f.constant(record, wrapped::OPEN_WRAPPER, "[");
    let content = f.node(Some(record), Some(wrapped::CONTENT), NodeKind::ArrayWrapper);
    for (index, (key, value)) in fields.iter().enumerate() {
        let element = f.node(Some(content), Some(index as u32), NodeKind::Csv);
        let pair = f.node(
            Some(element),
            Some(csv::NODE),
            NodeKind::GeneralizedIdentifierPairedExpression,
        );
        f.generalized_identifier(pair, paired_expression::KEY, key);
        f.constant(pair, paired_expression::EQUAL_CONSTANT, "=");
        if value.starts_with('"') {
            f.literal(pair, paired_expression::VALUE, LiteralKind::Text, value);
        } else {
            f.numeric(pair, paired_expression::VALUE, value);
        }
        if index + 1 < fields.len() {
            f.constant(element, csv::COMMA, ",");
        }
    }
    f.constant(record, wrapped::CLOSE_WRAPPER, "]");
    record
}

/// `[x=1]`, fully parsed. Marks `value_start` and `value_end` around `1`.
pub fn record_literal() -> Document {
    let mut f = Fixture::new();
    let root = f.node(None, None, NodeKind::RecordExpression);
    f.constant(root, wrapped::OPEN_WRAPPER, "[");
    let content = f.node(Some(root), Some(wrapped::CONTENT), NodeKind::ArrayWrapper);
    let element = f.node(Some(content), Some(0), NodeKind::Csv);
    let pair = f.node(
        Some(element),
        Some(csv::NODE),
        NodeKind::GeneralizedIdentifierPairedExpression,
    );
    f.generalized_identifier(pair, paired_expression::KEY, "x");
    f.constant(pair, paired_expression::EQUAL_CONSTANT, "=");
    f.mark("value_start");
    f.numeric(pair, paired_expression::VALUE, "1");
    f.mark("value_end");
    f.constant(root, wrapped::CLOSE_WRAPPER, "]");
    f.mark("end");
    f.finish()
}

/// Appends `[[n1],[n2],...]` (and `?`) as the first element of `elements`.
fn field_projection(f: &mut Fixture, elements: NodeId, names: &[&str], is_optional: bool) -> NodeId {
    let projection = f.node(Some(elements), Some(0), NodeKind::FieldProjection);
    f.constant(projection, wrapped::OPEN_WRAPPER, "[");
    let content = f.node(Some(projection), Some(wrapped::CONTENT), NodeKind::ArrayWrapper);
    for (index, name) in names.iter().enumerate() {
        let element = f.node(Some(content), Some(index as u32), NodeKind::Csv);
        let selector = f.node(Some(element), Some(csv::NODE), NodeKind::FieldSelector);
        f.constant(selector, wrapped::OPEN_WRAPPER, "[");
        f.generalized_identifier(selector, wrapped::CONTENT, name);
        f.constant(selector, wrapped::CLOSE_WRAPPER, "]");
        if index + 1 < names.len() {
            f.constant(element, csv::COMMA, ",");
        }
    }
    f.constant(projection, wrapped::CLOSE_WRAPPER, "]");
    if is_optional {
        f.constant(projection, wrapped::OPTIONAL_CONSTANT, "?");
    }
    projection
}

/// `[a=1,b="t"][[n1],...]`, optionally followed by `?`.
///
/// Labels: `head` (the record) and `projection`.
pub fn record_projection(names: &[&str], is_optional: bool) -> Document {
    let mut f = Fixture::new();
    let root = f.node(None, None, NodeKind::RecursivePrimaryExpression);
    let head = record_expression(
        &mut f,
        Some(root),
        Some(recursive_primary_expression::HEAD),
        &[("a", "1"), ("b", "\"t\"")],
    );
    f.label(head, "head");
    let elements = f.node(
        Some(root),
        Some(recursive_primary_expression::RECURSIVE_EXPRESSIONS),
        NodeKind::ArrayWrapper,
    );
    let projection = field_projection(&mut f, elements, names, is_optional);
    f.label(projection, "projection");
    f.finish()
}

/// `x[[n1],...]`. The head's type is whatever the test seeds for label `head`.
pub fn identifier_projection(names: &[&str], is_optional: bool) -> Document {
    let mut f = Fixture::new();
    let root = f.node(None, None, NodeKind::RecursivePrimaryExpression);
    let head = f.identifier_expression(root, recursive_primary_expression::HEAD, "x");
    f.label(head, "head");
    let elements = f.node(
        Some(root),
        Some(recursive_primary_expression::RECURSIVE_EXPRESSIONS),
        NodeKind::ArrayWrapper,
    );
    let projection = field_projection(&mut f, elements, names, is_optional);
    f.label(projection, "projection");
    f.finish()
}

/// `x[a]`, with the head labelled `head` and the selector `selector`.
pub fn identifier_selector(name: &str, is_optional: bool) -> Document {
    let mut f = Fixture::new();
    let root = f.node(None, None, NodeKind::RecursivePrimaryExpression);
    let head = f.identifier_expression(root, recursive_primary_expression::HEAD, "x");
    f.label(head, "head");
    let elements = f.node(
        Some(root),
        Some(recursive_primary_expression::RECURSIVE_EXPRESSIONS),
        NodeKind::ArrayWrapper,
    );
    let selector = f.node(Some(elements), Some(0), NodeKind::FieldSelector);
    f.constant(selector, wrapped::OPEN_WRAPPER, "[");
    f.generalized_identifier(selector, wrapped::CONTENT, name);
    f.constant(selector, wrapped::CLOSE_WRAPPER, "]");
    if is_optional {
        f.constant(selector, wrapped::OPTIONAL_CONSTANT, "?");
    }
    f.label(selector, "selector");
    f.finish()
}

/// `[a]` as the only element of a recursive primary expression whose head is
/// missing from the tree.
pub fn headless_selector() -> Document {
    let mut f = Fixture::new();
    let root = f.node(None, None, NodeKind::RecursivePrimaryExpression);
    let elements = f.node(
        Some(root),
        Some(recursive_primary_expression::RECURSIVE_EXPRESSIONS),
        NodeKind::ArrayWrapper,
    );
    let selector = f.node(Some(elements), Some(0), NodeKind::FieldSelector);
    f.constant(selector, wrapped::OPEN_WRAPPER, "[");
    f.generalized_identifier(selector, wrapped::CONTENT, "a");
    f.constant(selector, wrapped::CLOSE_WRAPPER, "]");
    f.label(selector, "selector");
    f.finish()
}

/// Opens `(` of a function's parameter list and returns the pending parameter.
fn open_parameter(f: &mut Fixture, function: NodeId) -> NodeId {
    let parameters = f.pending(
        Some(function),
        Some(function_expression::PARAMETERS),
        NodeKind::ParameterList,
    );
    f.constant(parameters, wrapped::OPEN_WRAPPER, "(");
    let content = f.pending(Some(parameters), Some(wrapped::CONTENT), NodeKind::ArrayWrapper);
    let element = f.pending(Some(content), Some(0), NodeKind::Csv);
    f.pending(Some(element), Some(csv::NODE), NodeKind::Parameter)
}

/// `(<name>` at the start of a function, or `(` with the name still pending.
/// Mark `end` after the name.
pub fn function_parameter(name: Option<&str>) -> Document {
    let mut f = Fixture::new();
    let root = f.pending(None, None, NodeKind::FunctionExpression);
    let param = open_parameter(&mut f, root);
    f.mark("name_start");
    match name {
        Some(name) => {
            f.identifier(param, parameter::NAME, name);
        }
        None => {
            f.pending_at_end(Some(param), Some(parameter::NAME), NodeKind::Identifier);
        }
    }
    f.mark("end");
    f.finish()
}

/// `(optional x` at the start of a function. Marks `optional_start`.
pub fn optional_parameter() -> Document {
    let mut f = Fixture::new();
    let root = f.pending(None, None, NodeKind::FunctionExpression);
    let param = open_parameter(&mut f, root);
    f.mark("optional_start");
    f.constant(param, parameter::OPTIONAL_CONSTANT, "optional");
    f.space();
    f.identifier(param, parameter::NAME, "x");
    f.finish()
}

/// `(x as nullable text) => x`, fully parsed.
///
/// Marks: `as_start`, `nullable_start`, `type_start`, `body_start`.
pub fn nullable_parameter() -> Document {
    let mut f = Fixture::new();
    let root = f.node(None, None, NodeKind::FunctionExpression);
    let parameters = f.node(
        Some(root),
        Some(function_expression::PARAMETERS),
        NodeKind::ParameterList,
    );
    f.constant(parameters, wrapped::OPEN_WRAPPER, "(");
    let content = f.node(Some(parameters), Some(wrapped::CONTENT), NodeKind::ArrayWrapper);
    let element = f.node(Some(content), Some(0), NodeKind::Csv);
    let param = f.node(Some(element), Some(csv::NODE), NodeKind::Parameter);
    f.identifier(param, parameter::NAME, "x");
    f.space();
    let as_type = f.node(
        Some(param),
        Some(parameter::PARAMETER_TYPE),
        NodeKind::AsNullablePrimitiveType,
    );
    f.mark("as_start");
    f.constant(as_type, paired_constant::CONSTANT, "as");
    f.space();
    let nullable = f.node(
        Some(as_type),
        Some(paired_constant::PAIRED),
        NodeKind::NullablePrimitiveType,
    );
    f.mark("nullable_start");
    f.constant(nullable, paired_constant::CONSTANT, "nullable");
    f.space();
    f.mark("type_start");
    f.primitive_type(nullable, paired_constant::PAIRED, PrimitiveTypeKind::Text, "text");
    f.constant(parameters, wrapped::CLOSE_WRAPPER, ")");
    f.space();
    f.constant(root, function_expression::FAT_ARROW, "=>");
    f.space();
    f.mark("body_start");
    f.identifier_expression(root, function_expression::EXPRESSION, "x");
    f.finish()
}

/// `(x as ` with the parameter's primitive type still pending. Mark `hole`.
pub fn as_type_hole() -> Document {
    let mut f = Fixture::new();
    let root = f.pending(None, None, NodeKind::FunctionExpression);
    let param = open_parameter(&mut f, root);
    f.identifier(param, parameter::NAME, "x");
    f.space();
    let as_type = f.pending(
        Some(param),
        Some(parameter::PARAMETER_TYPE),
        NodeKind::AsNullablePrimitiveType,
    );
    f.constant(as_type, paired_constant::CONSTANT, "as");
    f.space();
    f.mark("hole");
    f.pending(Some(as_type), Some(paired_constant::PAIRED), NodeKind::PrimitiveType);
    f.finish()
}

/// `depth` nested parentheses around the numeric literal `1`.
pub fn nested_parentheses(depth: usize) -> Document {
    assert!(depth > 0, "nested_parentheses needs at least one level");
    let mut f = Fixture::new();
    let mut wrappers = Vec::with_capacity(depth);
    let mut parent: Option<NodeId> = None;
    for _ in 0..depth {
        let attribute_index = parent.map(|_| wrapped::CONTENT);
        let wrapper = f.node(parent, attribute_index, NodeKind::ParenthesizedExpression);
        f.constant(wrapper, wrapped::OPEN_WRAPPER, "(");
        wrappers.push(wrapper);
        parent = Some(wrapper);
    }
    if let Some(innermost) = parent {
        f.numeric(innermost, wrapped::CONTENT, "1");
    }
    for wrapper in wrappers.into_iter().rev() {
        f.constant(wrapper, wrapped::CLOSE_WRAPPER, ")");
    }
    f.finish()
}
