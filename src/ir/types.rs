//! Structural types inferred for M expressions
//!
//! A [`Type`] is either a primitive kind, an Any annotated with plausible
//! concrete shapes ([`Type::AnyUnion`]), or a record/table with a known field
//! set. Types are plain values: computed per request and never mutated.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Kind tag of a structural type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Any,
    AnyNonNull,
    Binary,
    Date,
    DateTime,
    DateTimeZone,
    Duration,
    Function,
    List,
    Logical,
    None,
    Null,
    Number,
    Record,
    Table,
    Text,
    Time,
    Type,
    Unknown,
}

impl TypeKind {
    /// The name M uses for this kind in type expressions.
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Any => "any",
            TypeKind::AnyNonNull => "anynonnull",
            TypeKind::Binary => "binary",
            TypeKind::Date => "date",
            TypeKind::DateTime => "datetime",
            TypeKind::DateTimeZone => "datetimezone",
            TypeKind::Duration => "duration",
            TypeKind::Function => "function",
            TypeKind::List => "list",
            TypeKind::Logical => "logical",
            TypeKind::None => "none",
            TypeKind::Null => "null",
            TypeKind::Number => "number",
            TypeKind::Record => "record",
            TypeKind::Table => "table",
            TypeKind::Text => "text",
            TypeKind::Time => "time",
            TypeKind::Type => "type",
            TypeKind::Unknown => "unknown",
        }
    }

    /// Kinds whose display already implies nullability.
    fn is_implicitly_nullable(&self) -> bool {
        matches!(
            self,
            TypeKind::Any | TypeKind::Null | TypeKind::Unknown | TypeKind::None
        )
    }
}

/// Record fields; order is not significant.
pub type RecordFields = BTreeMap<String, Type>;

/// Table columns in declaration order.
pub type TableFields = IndexMap<String, Type>;

/// Structural type of an expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "camelCase")]
pub enum Type {
    Primitive {
        kind: TypeKind,
        is_nullable: bool,
    },
    /// An Any known to be one of a few concrete shapes.
    AnyUnion {
        is_nullable: bool,
        alternatives: Vec<Type>,
    },
    DefinedRecord {
        is_nullable: bool,
        fields: RecordFields,
        is_open: bool,
    },
    DefinedTable {
        is_nullable: bool,
        fields: TableFields,
        is_open: bool,
    },
}

impl Type {
    pub const ANY: Type = Type::primitive(TypeKind::Any, true);
    pub const ANY_NON_NULL: Type = Type::primitive(TypeKind::AnyNonNull, false);
    pub const FUNCTION: Type = Type::primitive(TypeKind::Function, false);
    pub const LIST: Type = Type::primitive(TypeKind::List, false);
    pub const LOGICAL: Type = Type::primitive(TypeKind::Logical, false);
    /// The type of an expression that cannot produce a value.
    pub const NONE: Type = Type::primitive(TypeKind::None, false);
    pub const NULL: Type = Type::primitive(TypeKind::Null, true);
    pub const NUMBER: Type = Type::primitive(TypeKind::Number, false);
    pub const RECORD: Type = Type::primitive(TypeKind::Record, false);
    pub const TABLE: Type = Type::primitive(TypeKind::Table, false);
    pub const TEXT: Type = Type::primitive(TypeKind::Text, false);
    pub const UNKNOWN: Type = Type::primitive(TypeKind::Unknown, true);

    pub const fn primitive(kind: TypeKind, is_nullable: bool) -> Self {
        Type::Primitive { kind, is_nullable }
    }

    pub fn defined_record(is_nullable: bool, fields: RecordFields, is_open: bool) -> Self {
        Type::DefinedRecord {
            is_nullable,
            fields,
            is_open,
        }
    }

    pub fn defined_table(is_nullable: bool, fields: TableFields, is_open: bool) -> Self {
        Type::DefinedTable {
            is_nullable,
            fields,
            is_open,
        }
    }

    /// Builds an Any-Union, flattening nested unions and dropping duplicates.
    ///
    /// Fewer than two distinct alternatives collapse: none gives `Any`, one
    /// gives that alternative. The union is nullable if requested or if any
    /// alternative is.
    pub fn any_union(is_nullable: bool, alternatives: impl IntoIterator<Item = Type>) -> Self {
        let mut flattened: Vec<Type> = Vec::new();
        let mut pending: Vec<Type> = alternatives.into_iter().collect();
        pending.reverse();
        while let Some(alternative) = pending.pop() {
            match alternative {
                Type::AnyUnion { alternatives, .. } => {
                    pending.extend(alternatives.into_iter().rev());
                }
                other => {
                    if !flattened.contains(&other) {
                        flattened.push(other);
                    }
                }
            }
        }

        let is_nullable = is_nullable || flattened.iter().any(Type::is_nullable);
        match flattened.len() {
            0 => Type::primitive(TypeKind::Any, is_nullable),
            1 => flattened.remove(0),
            _ => Type::AnyUnion {
                is_nullable,
                alternatives: flattened,
            },
        }
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            Type::Primitive { kind, .. } => *kind,
            Type::AnyUnion { .. } => TypeKind::Any,
            Type::DefinedRecord { .. } => TypeKind::Record,
            Type::DefinedTable { .. } => TypeKind::Table,
        }
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            Type::Primitive { is_nullable, .. }
            | Type::AnyUnion { is_nullable, .. }
            | Type::DefinedRecord { is_nullable, .. }
            | Type::DefinedTable { is_nullable, .. } => *is_nullable,
        }
    }

    /// Whether the field set is open; `None` for types without one.
    pub fn is_open(&self) -> Option<bool> {
        match self {
            Type::DefinedRecord { is_open, .. } | Type::DefinedTable { is_open, .. } => {
                Some(*is_open)
            }
            _ => None,
        }
    }

    /// Field names of a defined record (sorted) or table (declared order).
    pub fn field_names(&self) -> Option<Vec<&str>> {
        match self {
            Type::DefinedRecord { fields, .. } => Some(fields.keys().map(String::as_str).collect()),
            Type::DefinedTable { fields, .. } => Some(fields.keys().map(String::as_str).collect()),
            _ => None,
        }
    }

    /// Type of a named field of a defined record or table.
    pub fn field(&self, name: &str) -> Option<&Type> {
        match self {
            Type::DefinedRecord { fields, .. } => fields.get(name),
            Type::DefinedTable { fields, .. } => fields.get(name),
            _ => None,
        }
    }
}

fn write_fields<'a>(
    f: &mut fmt::Formatter<'_>,
    fields: impl Iterator<Item = (&'a String, &'a Type)>,
    is_open: bool,
) -> fmt::Result {
    write!(f, "[")?;
    let mut first = true;
    for (name, field_type) in fields {
        if !first {
            write!(f, ", ")?;
        }
        first = false;
        write!(f, "{name}: {field_type}")?;
    }
    if is_open {
        if !first {
            write!(f, ", ")?;
        }
        write!(f, "...")?;
    }
    write!(f, "]")
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind();
        if self.is_nullable() && !kind.is_implicitly_nullable() {
            write!(f, "nullable ")?;
        }
        match self {
            Type::Primitive { kind, .. } => write!(f, "{}", kind.as_str()),
            Type::AnyUnion { alternatives, .. } => {
                for (index, alternative) in alternatives.iter().enumerate() {
                    if index > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{alternative}")?;
                }
                Ok(())
            }
            Type::DefinedRecord { fields, is_open, .. } => write_fields(f, fields.iter(), *is_open),
            Type::DefinedTable { fields, is_open, .. } => {
                write!(f, "table ")?;
                write_fields(f, fields.iter(), *is_open)
            }
        }
    }
}
