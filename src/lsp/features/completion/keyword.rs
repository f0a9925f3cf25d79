//! Keyword autocomplete
//!
//! Decides which reserved words may be typed at the cursor by looking at the
//! grammar slot the cursor occupies. Every `(parent kind, attribute index)`
//! pair is either an expression slot (any expression keyword fits), a slot
//! holding one fixed keyword (`then`, `in`, ...), or neither.

use once_cell::sync::Lazy;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::ir::grammar::{
    function_expression, if_expression, let_expression, paired_constant, paired_expression,
    section, wrapped,
};
use crate::ir::node::{GrammarNode, LiteralKind, NodeKind};
use crate::ir::position_utils::{is_after_ast, is_before_node};
use crate::lsp::features::active_node::{ActiveNode, ActiveNodeLeafKind};

/// Reserved words of the M language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KeywordKind {
    And,
    As,
    Each,
    Else,
    Error,
    False,
    If,
    In,
    Is,
    Let,
    Meta,
    Not,
    Null,
    Or,
    Otherwise,
    Section,
    Shared,
    Then,
    True,
    Try,
    Type,
    HashBinary,
    HashDate,
    HashDateTime,
    HashDateTimeZone,
    HashDuration,
    HashInfinity,
    HashNan,
    HashSections,
    HashShared,
    HashTable,
    HashTime,
}

impl KeywordKind {
    pub const ALL: [KeywordKind; 32] = [
        KeywordKind::And,
        KeywordKind::As,
        KeywordKind::Each,
        KeywordKind::Else,
        KeywordKind::Error,
        KeywordKind::False,
        KeywordKind::If,
        KeywordKind::In,
        KeywordKind::Is,
        KeywordKind::Let,
        KeywordKind::Meta,
        KeywordKind::Not,
        KeywordKind::Null,
        KeywordKind::Or,
        KeywordKind::Otherwise,
        KeywordKind::Section,
        KeywordKind::Shared,
        KeywordKind::Then,
        KeywordKind::True,
        KeywordKind::Try,
        KeywordKind::Type,
        KeywordKind::HashBinary,
        KeywordKind::HashDate,
        KeywordKind::HashDateTime,
        KeywordKind::HashDateTimeZone,
        KeywordKind::HashDuration,
        KeywordKind::HashInfinity,
        KeywordKind::HashNan,
        KeywordKind::HashSections,
        KeywordKind::HashShared,
        KeywordKind::HashTable,
        KeywordKind::HashTime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KeywordKind::And => "and",
            KeywordKind::As => "as",
            KeywordKind::Each => "each",
            KeywordKind::Else => "else",
            KeywordKind::Error => "error",
            KeywordKind::False => "false",
            KeywordKind::If => "if",
            KeywordKind::In => "in",
            KeywordKind::Is => "is",
            KeywordKind::Let => "let",
            KeywordKind::Meta => "meta",
            KeywordKind::Not => "not",
            KeywordKind::Null => "null",
            KeywordKind::Or => "or",
            KeywordKind::Otherwise => "otherwise",
            KeywordKind::Section => "section",
            KeywordKind::Shared => "shared",
            KeywordKind::Then => "then",
            KeywordKind::True => "true",
            KeywordKind::Try => "try",
            KeywordKind::Type => "type",
            KeywordKind::HashBinary => "#binary",
            KeywordKind::HashDate => "#date",
            KeywordKind::HashDateTime => "#datetime",
            KeywordKind::HashDateTimeZone => "#datetimezone",
            KeywordKind::HashDuration => "#duration",
            KeywordKind::HashInfinity => "#infinity",
            KeywordKind::HashNan => "#nan",
            KeywordKind::HashSections => "#sections",
            KeywordKind::HashShared => "#shared",
            KeywordKind::HashTable => "#table",
            KeywordKind::HashTime => "#time",
        }
    }

    pub fn from_text(text: &str) -> Option<Self> {
        KeywordKind::ALL
            .iter()
            .copied()
            .find(|keyword| keyword.as_str() == text)
    }

    /// One-line hover/completion documentation.
    pub fn description(&self) -> &'static str {
        match self {
            KeywordKind::And => "Logical conjunction",
            KeywordKind::As => "Type assertion",
            KeywordKind::Each => "Single-parameter function over `_`",
            KeywordKind::Else => "Alternative branch of a conditional",
            KeywordKind::Error => "Raise an error",
            KeywordKind::False => "Logical false literal",
            KeywordKind::If => "Conditional expression",
            KeywordKind::In => "Body of a let expression",
            KeywordKind::Is => "Type compatibility test",
            KeywordKind::Let => "Local variable bindings",
            KeywordKind::Meta => "Attach metadata to a value",
            KeywordKind::Not => "Logical negation",
            KeywordKind::Null => "Null literal",
            KeywordKind::Or => "Logical disjunction",
            KeywordKind::Otherwise => "Fallback value when an error is raised",
            KeywordKind::Section => "Section document declaration",
            KeywordKind::Shared => "Section member visible to other sections",
            KeywordKind::Then => "Branch taken when the condition is true",
            KeywordKind::True => "Logical true literal",
            KeywordKind::Try => "Catch errors raised by an expression",
            KeywordKind::Type => "Type value expression",
            KeywordKind::HashBinary => "Binary value constructor",
            KeywordKind::HashDate => "Date value constructor",
            KeywordKind::HashDateTime => "DateTime value constructor",
            KeywordKind::HashDateTimeZone => "DateTimeZone value constructor",
            KeywordKind::HashDuration => "Duration value constructor",
            KeywordKind::HashInfinity => "Positive infinity",
            KeywordKind::HashNan => "Not a number",
            KeywordKind::HashSections => "Record of all sections",
            KeywordKind::HashShared => "Record of shared members",
            KeywordKind::HashTable => "Table value constructor",
            KeywordKind::HashTime => "Time value constructor",
        }
    }
}

/// Keywords that can start an expression.
pub const EXPRESSION_KEYWORDS: [KeywordKind; 9] = [
    KeywordKind::Each,
    KeywordKind::Error,
    KeywordKind::False,
    KeywordKind::If,
    KeywordKind::Let,
    KeywordKind::Not,
    KeywordKind::True,
    KeywordKind::Try,
    KeywordKind::Type,
];

/// A grammar slot: parent production and the child's attribute index.
pub type SlotKey = (NodeKind, u32);

/// Slots that hold an arbitrary expression.
static EXPRESSION_SLOTS: Lazy<FxHashSet<SlotKey>> = Lazy::new(|| {
    [
        (NodeKind::ErrorRaisingExpression, paired_constant::PAIRED),
        (NodeKind::GeneralizedIdentifierPairedExpression, paired_expression::VALUE),
        (NodeKind::FunctionExpression, function_expression::EXPRESSION),
        (NodeKind::IdentifierPairedExpression, paired_expression::VALUE),
        (NodeKind::IfExpression, if_expression::CONDITION),
        (NodeKind::IfExpression, if_expression::TRUE_EXPRESSION),
        (NodeKind::IfExpression, if_expression::FALSE_EXPRESSION),
        (NodeKind::InvokeExpression, wrapped::CONTENT),
        (NodeKind::LetExpression, let_expression::EXPRESSION),
        (NodeKind::ListExpression, wrapped::CONTENT),
        (NodeKind::OtherwiseExpression, paired_constant::PAIRED),
        (NodeKind::ParenthesizedExpression, wrapped::CONTENT),
    ]
    .into_iter()
    .collect()
});

/// Slots that hold exactly one keyword.
static CONSTANT_SLOTS: Lazy<FxHashMap<SlotKey, KeywordKind>> = Lazy::new(|| {
    [
        ((NodeKind::ErrorRaisingExpression, paired_constant::CONSTANT), KeywordKind::Error),
        ((NodeKind::IfExpression, if_expression::IF_CONSTANT), KeywordKind::If),
        ((NodeKind::IfExpression, if_expression::THEN_CONSTANT), KeywordKind::Then),
        ((NodeKind::IfExpression, if_expression::ELSE_CONSTANT), KeywordKind::Else),
        ((NodeKind::LetExpression, let_expression::IN_CONSTANT), KeywordKind::In),
        ((NodeKind::OtherwiseExpression, paired_constant::CONSTANT), KeywordKind::Otherwise),
        ((NodeKind::Section, section::SECTION_CONSTANT), KeywordKind::Section),
    ]
    .into_iter()
    .collect()
});

/// Answer of one keyword heuristic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum KeywordSuggestion {
    /// The heuristic applies; the list may be empty.
    Keywords(Vec<KeywordKind>),
    /// The heuristic has nothing to say about this slot.
    NotApplicable,
}

/// The two ancestry entries a keyword heuristic looks at.
#[derive(Debug, Clone, Copy)]
pub struct KeywordAutocompleteState<'a> {
    pub active_node: &'a ActiveNode,
    pub parent: &'a GrammarNode,
    pub child: &'a GrammarNode,
}

/// Apply the slot-table heuristic to one `(parent, child)` pair
///
/// # Returns
/// The keywords valid in the child's slot, or `NotApplicable` when the slot is
/// in neither table or the cursor has not reached it yet.
pub fn autocomplete_keyword_default(state: &KeywordAutocompleteState<'_>) -> KeywordSuggestion {
    let Some(attribute_index) = state.child.attribute_index() else {
        return KeywordSuggestion::NotApplicable;
    };
    let key: SlotKey = (state.parent.kind(), attribute_index);

    if EXPRESSION_SLOTS.contains(&key) {
        trace!("Slot {:?} holds an expression", key);
        return autocomplete_expression(state);
    }

    if let Some(keyword) = CONSTANT_SLOTS.get(&key) {
        trace!("Slot {:?} holds the keyword {}", key, keyword.as_str());
        return autocomplete_constant(state, *keyword);
    }

    KeywordSuggestion::NotApplicable
}

fn autocomplete_expression(state: &KeywordAutocompleteState<'_>) -> KeywordSuggestion {
    if state.active_node.leaf_kind == ActiveNodeLeafKind::ShiftedRight {
        return KeywordSuggestion::Keywords(EXPRESSION_KEYWORDS.to_vec());
    }

    // `if 1|` cannot continue with a keyword
    let is_numeric_literal = state
        .child
        .as_resolved_of_kind(NodeKind::LiteralExpression)
        .and_then(|ast| ast.literal_kind())
        == Some(LiteralKind::Numeric);
    if is_numeric_literal {
        return KeywordSuggestion::Keywords(Vec::new());
    }

    KeywordSuggestion::Keywords(EXPRESSION_KEYWORDS.to_vec())
}

fn autocomplete_constant(state: &KeywordAutocompleteState<'_>, keyword: KeywordKind) -> KeywordSuggestion {
    let position = state.active_node.position;
    if is_before_node(position, state.child, false) {
        return KeywordSuggestion::NotApplicable;
    }

    match state.child {
        GrammarNode::Resolved(ast) => {
            if is_after_ast(position, ast, true) {
                KeywordSuggestion::Keywords(Vec::new())
            } else {
                KeywordSuggestion::Keywords(vec![keyword])
            }
        }
        GrammarNode::Pending(_) => KeywordSuggestion::Keywords(vec![keyword]),
    }
}

/// Keywords valid at the active node
///
/// Walks the ancestry outward, asking the slot heuristic about each
/// `(ancestry[i], ancestry[i - 1])` pair. The first applicable answer wins;
/// when none applies the cursor is at expression level and every expression
/// keyword is offered.
pub fn autocomplete_keywords(active_node: &ActiveNode) -> Vec<KeywordKind> {
    let ancestry = &active_node.ancestry;
    for index in 1..ancestry.len() {
        let state = KeywordAutocompleteState {
            active_node,
            parent: &ancestry[index],
            child: &ancestry[index - 1],
        };
        if let KeywordSuggestion::Keywords(keywords) = autocomplete_keyword_default(&state) {
            debug!(
                "Keyword heuristic matched at {} ({}): {:?}",
                state.parent.id(),
                state.parent.kind(),
                keywords
            );
            return keywords;
        }
    }

    debug!("No keyword heuristic applied, offering expression keywords");
    EXPRESSION_KEYWORDS.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::ir::node::{AstNode, ContextNode, LeafValue, NodeId, Position, TokenRange};

    fn resolved_constant(slot: u32, start: u32, text: &str) -> GrammarNode {
        GrammarNode::Resolved(AstNode {
            id: NodeId(2),
            kind: NodeKind::Constant,
            attribute_index: Some(slot),
            token_range: TokenRange::new(
                Position::new(0, start),
                Position::new(0, start + text.len() as u32),
            ),
            value: Some(LeafValue::Constant(text.to_string())),
        })
    }

    fn pending(id: u32, kind: NodeKind, slot: Option<u32>, start: Option<u32>) -> GrammarNode {
        GrammarNode::Pending(ContextNode {
            id: NodeId(id),
            kind,
            attribute_index: slot,
            token_start: start.map(|character| Position::new(0, character)),
        })
    }

    fn active(character: u32, ancestry: Vec<GrammarNode>, leaf_kind: ActiveNodeLeafKind) -> ActiveNode {
        ActiveNode {
            position: Position::new(0, character),
            ancestry: ancestry.into_iter().map(Arc::new).collect(),
            leaf_kind,
        }
    }

    fn suggest(active_node: &ActiveNode) -> KeywordSuggestion {
        autocomplete_keyword_default(&KeywordAutocompleteState {
            active_node,
            parent: &active_node.ancestry[1],
            child: &active_node.ancestry[0],
        })
    }

    #[test]
    fn test_keyword_text_round_trips() {
        for keyword in KeywordKind::ALL {
            assert_eq!(KeywordKind::from_text(keyword.as_str()), Some(keyword));
        }
        assert_eq!(KeywordKind::from_text("contract"), None);
    }

    #[test]
    fn test_constant_slot_relative_to_cursor() {
        // `if x then` with `then` at columns 5..9
        let if_expression = pending(1, NodeKind::IfExpression, None, Some(0));
        let then = resolved_constant(2, 5, "then");

        let before = active(4, vec![then.clone(), if_expression.clone()], ActiveNodeLeafKind::Normal);
        assert_eq!(suggest(&before), KeywordSuggestion::NotApplicable);

        let inside = active(7, vec![then.clone(), if_expression.clone()], ActiveNodeLeafKind::Normal);
        assert_eq!(suggest(&inside), KeywordSuggestion::Keywords(vec![KeywordKind::Then]));

        let at_end = active(9, vec![then.clone(), if_expression.clone()], ActiveNodeLeafKind::Normal);
        assert_eq!(suggest(&at_end), KeywordSuggestion::Keywords(vec![]));

        let after = active(11, vec![then, if_expression], ActiveNodeLeafKind::Normal);
        assert_eq!(suggest(&after), KeywordSuggestion::Keywords(vec![]));
    }

    #[test]
    fn test_pending_constant_slot_offers_keyword() {
        let ancestry = vec![
            pending(2, NodeKind::Constant, Some(let_expression::IN_CONSTANT), None),
            pending(1, NodeKind::LetExpression, None, Some(0)),
        ];
        let active_node = active(12, ancestry, ActiveNodeLeafKind::Normal);
        assert_eq!(suggest(&active_node), KeywordSuggestion::Keywords(vec![KeywordKind::In]));
    }

    #[test]
    fn test_shifted_right_expression_slot_offers_all() {
        let ancestry = vec![
            pending(3, NodeKind::LiteralExpression, Some(paired_expression::VALUE), None),
            pending(2, NodeKind::GeneralizedIdentifierPairedExpression, Some(0), Some(1)),
        ];
        let active_node = active(3, ancestry, ActiveNodeLeafKind::ShiftedRight);
        assert_eq!(
            suggest(&active_node),
            KeywordSuggestion::Keywords(EXPRESSION_KEYWORDS.to_vec())
        );
    }

    #[test]
    fn test_unlisted_slot_is_not_applicable() {
        let ancestry = vec![
            pending(2, NodeKind::Identifier, Some(0), Some(3)),
            pending(1, NodeKind::RecordExpression, None, Some(0)),
        ];
        let active_node = active(3, ancestry, ActiveNodeLeafKind::Normal);
        assert_eq!(suggest(&active_node), KeywordSuggestion::NotApplicable);
    }

    #[test]
    fn test_single_node_ancestry_offers_expression_keywords() {
        let active_node = active(
            0,
            vec![pending(1, NodeKind::LiteralExpression, None, None)],
            ActiveNodeLeafKind::Normal,
        );
        assert_eq!(autocomplete_keywords(&active_node), EXPRESSION_KEYWORDS.to_vec());
    }

    #[test]
    fn test_chain_falls_through_not_applicable_pairs() {
        // Cursor before `then`: the constant slot is not reached yet, and the
        // enclosing document offers expression keywords.
        let ancestry = vec![
            resolved_constant(if_expression::THEN_CONSTANT, 5, "then"),
            pending(1, NodeKind::IfExpression, None, Some(0)),
        ];
        let active_node = active(4, ancestry, ActiveNodeLeafKind::Normal);
        assert_eq!(autocomplete_keywords(&active_node), EXPRESSION_KEYWORDS.to_vec());
    }
}
