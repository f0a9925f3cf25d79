//! `value[field]` and `value[field]?`

use tracing::debug;

use crate::error::InspectionResult;
use crate::ir::grammar::wrapped;
use crate::ir::node::{AstNode, NodeKind};
use crate::ir::types::{Type, TypeKind};

use super::{InspectTypeState, inspect_node};

pub(super) fn inspect_field_selector<'a>(
    state: &mut InspectTypeState<'a>,
    selector: &'a AstNode,
) -> InspectionResult<Type> {
    let map = state.map;
    let Some(name) = map.field_selector_name(selector.id) else {
        return Ok(Type::UNKNOWN);
    };

    // Outside a recursive primary expression the selector applies to the
    // implicit `_` of an `each`, whose type is not known here.
    let is_recursive_element = map
        .parent(selector.id)
        .filter(|parent| parent.is_kind(NodeKind::ArrayWrapper))
        .and_then(|wrapper| map.parent(wrapper.id()))
        .is_some_and(|primary| primary.is_kind(NodeKind::RecursivePrimaryExpression));
    if !is_recursive_element {
        debug!("Field selector {} has no explicit operand", selector.id);
        return Ok(Type::ANY);
    }

    let operand = map.recursive_expression_previous_sibling(selector.id)?;
    let operand_type = inspect_node(state, operand.as_ref())?;
    let is_optional = map
        .nth_child_if_resolved_of_kind(selector.id, wrapped::OPTIONAL_CONSTANT, NodeKind::Constant)
        .is_some();

    Ok(select_field(&operand_type, name, is_optional))
}

/// Type of one field selected from `operand`.
///
/// A table column selects as a list. A field missing from a closed shape is
/// `None`, or `Null` when the selection is optional.
pub fn select_field(operand: &Type, name: &str, is_optional: bool) -> Type {
    let missing = || if is_optional { Type::NULL } else { Type::NONE };

    match operand {
        Type::DefinedRecord { fields, is_open, .. } => match fields.get(name) {
            Some(field) => field.clone(),
            None if *is_open => Type::ANY,
            None => missing(),
        },
        Type::DefinedTable { fields, is_open, .. } => {
            if fields.contains_key(name) || *is_open {
                Type::LIST
            } else {
                missing()
            }
        }
        Type::AnyUnion { is_nullable, .. } => Type::primitive(TypeKind::Any, *is_nullable),
        Type::Primitive { kind, is_nullable } => match kind {
            TypeKind::Any => Type::primitive(TypeKind::Any, *is_nullable),
            TypeKind::Record => Type::ANY,
            TypeKind::Table => Type::LIST,
            TypeKind::Unknown => Type::UNKNOWN,
            _ => Type::NONE,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::types::{RecordFields, TableFields};

    #[test]
    fn test_select_from_closed_record() {
        let mut fields = RecordFields::new();
        fields.insert("a".to_string(), Type::NUMBER);
        let record = Type::defined_record(false, fields, false);
        assert_eq!(select_field(&record, "a", false), Type::NUMBER);
        assert_eq!(select_field(&record, "b", false), Type::NONE);
        assert_eq!(select_field(&record, "b", true), Type::NULL);
    }

    #[test]
    fn test_select_from_table_is_list() {
        let mut columns = TableFields::new();
        columns.insert("a".to_string(), Type::TEXT);
        let table = Type::defined_table(false, columns, true);
        assert_eq!(select_field(&table, "a", false), Type::LIST);
        assert_eq!(select_field(&table, "zzz", false), Type::LIST);
    }

    #[test]
    fn test_select_from_primitives() {
        assert_eq!(select_field(&Type::ANY, "a", false), Type::ANY);
        assert_eq!(select_field(&Type::RECORD, "a", false), Type::ANY);
        assert_eq!(select_field(&Type::TABLE, "a", false), Type::LIST);
        assert_eq!(select_field(&Type::NUMBER, "a", true), Type::NONE);
    }
}
