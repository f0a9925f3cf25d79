//! Fixed attribute indexes of the M grammar productions
//!
//! A child's attribute index is its ordinal slot among the children its
//! parent rule expects. The engines match on these slots, so every offset they
//! rely on is named here once.

/// `if <condition> then <true> else <false>`
pub mod if_expression {
    pub const IF_CONSTANT: u32 = 0;
    pub const CONDITION: u32 = 1;
    pub const THEN_CONSTANT: u32 = 2;
    pub const TRUE_EXPRESSION: u32 = 3;
    pub const ELSE_CONSTANT: u32 = 4;
    pub const FALSE_EXPRESSION: u32 = 5;
}

/// `let <variables> in <expression>`
pub mod let_expression {
    pub const LET_CONSTANT: u32 = 0;
    pub const VARIABLE_LIST: u32 = 1;
    pub const IN_CONSTANT: u32 = 2;
    pub const EXPRESSION: u32 = 3;
}

/// Keyword followed by one paired node: `error x`, `otherwise x`, `as number`,
/// `nullable text`.
pub mod paired_constant {
    pub const CONSTANT: u32 = 0;
    pub const PAIRED: u32 = 1;
}

/// Bracketed content: lists, invocations, parentheses, parameter lists,
/// records, selectors and projections.
pub mod wrapped {
    pub const OPEN_WRAPPER: u32 = 0;
    pub const CONTENT: u32 = 1;
    pub const CLOSE_WRAPPER: u32 = 2;
    /// Trailing `?` of a field selector or projection.
    pub const OPTIONAL_CONSTANT: u32 = 3;
}

/// `(parameters) as type => body`
pub mod function_expression {
    pub const PARAMETERS: u32 = 0;
    pub const RETURN_TYPE: u32 = 1;
    pub const FAT_ARROW: u32 = 2;
    pub const EXPRESSION: u32 = 3;
}

/// `optional name as type`
pub mod parameter {
    pub const OPTIONAL_CONSTANT: u32 = 0;
    pub const NAME: u32 = 1;
    pub const PARAMETER_TYPE: u32 = 2;
}

/// One element of a comma separated list, with its trailing comma.
pub mod csv {
    pub const NODE: u32 = 0;
    pub const COMMA: u32 = 1;
}

/// `key = value`
pub mod paired_expression {
    pub const KEY: u32 = 0;
    pub const EQUAL_CONSTANT: u32 = 1;
    pub const VALUE: u32 = 2;
}

/// `head` followed by selectors, projections, invocations and item accesses.
pub mod recursive_primary_expression {
    pub const HEAD: u32 = 0;
    pub const RECURSIVE_EXPRESSIONS: u32 = 1;
}

/// `[attributes] section name; members`
pub mod section {
    pub const LITERAL_ATTRIBUTES: u32 = 0;
    pub const SECTION_CONSTANT: u32 = 1;
    pub const NAME: u32 = 2;
    pub const SEMICOLON_CONSTANT: u32 = 3;
    pub const MEMBERS: u32 = 4;
}

/// Constants after which the cursor sits in a fresh expression hole.
pub const HOLE_OPENING_DELIMITERS: [&str; 6] = [",", "=", "=>", "(", "[", "{"];

pub fn is_hole_opening_delimiter(text: &str) -> bool {
    HOLE_OPENING_DELIMITERS.contains(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hole_opening_delimiters() {
        assert!(is_hole_opening_delimiter("="));
        assert!(is_hole_opening_delimiter("=>"));
        assert!(!is_hole_opening_delimiter("]"));
        assert!(!is_hole_opening_delimiter("then"));
    }
}
