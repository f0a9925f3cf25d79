//! `value[[a], [b]]` and `value[[a], [b]]?`
//!
//! A projection keeps only the named fields of a record or table. The result
//! is always closed.

use tracing::debug;

use crate::error::InspectionResult;
use crate::ir::grammar::wrapped;
use crate::ir::node::{AstNode, NodeKind};
use crate::ir::types::{RecordFields, TableFields, Type, TypeKind};

use super::{InspectTypeState, inspect_node};

/// Infer the type of a field projection
///
/// # Arguments
/// * `state` - Request state (settings, node index, memo)
/// * `projection` - A resolved `FieldProjection` node
///
/// # Returns
/// The projected type, or an invariant violation when the projection is not
/// an element of a recursive primary expression.
pub(super) fn inspect_field_projection<'a>(
    state: &mut InspectTypeState<'a>,
    projection: &'a AstNode,
) -> InspectionResult<Type> {
    let map = state.map;
    let names = map.field_projection_names(projection.id);
    let operand = map.recursive_expression_previous_sibling(projection.id)?;
    let operand_type = inspect_node(state, operand.as_ref())?;
    let is_optional = map
        .nth_child_if_resolved_of_kind(projection.id, wrapped::OPTIONAL_CONSTANT, NodeKind::Constant)
        .is_some();

    debug!(
        "Projecting {:?} (optional: {}) out of {}",
        names, is_optional, operand_type
    );
    Ok(project_fields(&operand_type, &names, is_optional))
}

/// Project `names` out of `operand`.
pub fn project_fields(operand: &Type, names: &[String], is_optional: bool) -> Type {
    match operand {
        Type::Primitive {
            kind: TypeKind::Any,
            is_nullable,
        }
        | Type::AnyUnion { is_nullable, .. } => {
            let record = Type::defined_record(*is_nullable, any_record_fields(names), false);
            let table = Type::defined_table(*is_nullable, any_table_fields(names), false);
            Type::any_union(*is_nullable, [record, table])
        }
        Type::DefinedRecord {
            is_nullable,
            fields,
            is_open,
        } => {
            if !*is_open && names.iter().any(|name| !fields.contains_key(name)) {
                return missing_field(is_optional);
            }
            let picked: RecordFields = fields
                .iter()
                .filter(|(name, _)| names.contains(*name))
                .map(|(name, field)| (name.clone(), field.clone()))
                .collect();
            Type::defined_record(*is_nullable, picked, false)
        }
        Type::DefinedTable {
            is_nullable,
            fields,
            is_open,
        } => {
            if !*is_open && names.iter().any(|name| !fields.contains_key(name)) {
                return missing_field(is_optional);
            }
            let picked: TableFields = fields
                .iter()
                .filter(|(name, _)| names.contains(*name))
                .map(|(name, field)| (name.clone(), field.clone()))
                .collect();
            Type::defined_table(*is_nullable, picked, false)
        }
        Type::Primitive {
            kind: TypeKind::Record,
            ..
        } => Type::defined_record(false, any_record_fields(names), false),
        Type::Primitive {
            kind: TypeKind::Table,
            ..
        } => Type::defined_table(false, any_table_fields(names), false),
        Type::Primitive { .. } => Type::NONE,
    }
}

fn missing_field(is_optional: bool) -> Type {
    if is_optional { Type::NULL } else { Type::NONE }
}

fn any_record_fields(names: &[String]) -> RecordFields {
    names.iter().map(|name| (name.clone(), Type::ANY)).collect()
}

fn any_table_fields(names: &[String]) -> TableFields {
    names.iter().map(|name| (name.clone(), Type::ANY)).collect()
}
