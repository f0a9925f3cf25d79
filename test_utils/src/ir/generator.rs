//! Random field projections for property-based tests.
//!
//! Field names are drawn from a four-letter alphabet so that generated
//! projections regularly hit, miss and repeat fields of the generated operand.

use quickcheck::{Arbitrary, Gen};

use pq_language_services::ir::types::{RecordFields, TableFields, Type, TypeKind};

const FIELD_NAMES: &[&str] = &["a", "b", "c", "d"];

/// Operand, projected names and the `?` flag of one projection.
#[derive(Clone, Debug)]
pub struct ProjectionCase {
    pub operand: Type,
    pub names: Vec<String>,
    pub is_optional: bool,
}

impl ProjectionCase {
    /// The `Some(fields)` of a defined record or table operand.
    pub fn operand_field_names(&self) -> Option<Vec<&str>> {
        self.operand.field_names()
    }
}

impl Arbitrary for ProjectionCase {
    fn arbitrary(g: &mut Gen) -> Self {
        let count = gen_range(g, 1, 3);
        ProjectionCase {
            operand: gen_operand(g),
            names: (0..count).map(|_| gen_field_name(g)).collect(),
            is_optional: bool::arbitrary(g),
        }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        if self.names.len() <= 1 {
            return Box::new(std::iter::empty());
        }
        let shorter = ProjectionCase {
            names: self.names[..self.names.len() - 1].to_vec(),
            ..self.clone()
        };
        Box::new(std::iter::once(shorter))
    }
}

fn gen_range(g: &mut Gen, min: u32, max: u32) -> u32 {
    min + (u32::arbitrary(g) % (max - min + 1))
}

fn gen_field_name(g: &mut Gen) -> String {
    g.choose(FIELD_NAMES).unwrap().to_string()
}

fn gen_field_type(g: &mut Gen) -> Type {
    match gen_range(g, 0, 4) {
        0 => Type::NUMBER,
        1 => Type::TEXT,
        2 => Type::LOGICAL,
        3 => Type::LIST,
        _ => Type::ANY,
    }
}

fn gen_operand(g: &mut Gen) -> Type {
    const CHOICES: &[u8] = &[0, 1, 2, 3, 4, 5];
    match *g.choose(CHOICES).unwrap() {
        0 => Type::primitive(TypeKind::Any, bool::arbitrary(g)),
        1 => Type::RECORD,
        2 => Type::TABLE,
        3 => Type::NUMBER,
        4 => {
            let fields: RecordFields = (0..gen_range(g, 0, 4))
                .map(|_| (gen_field_name(g), gen_field_type(g)))
                .collect();
            Type::defined_record(bool::arbitrary(g), fields, bool::arbitrary(g))
        }
        _ => {
            let fields: TableFields = (0..gen_range(g, 0, 4))
                .map(|_| (gen_field_name(g), gen_field_type(g)))
                .collect();
            Type::defined_table(bool::arbitrary(g), fields, bool::arbitrary(g))
        }
    }
}
