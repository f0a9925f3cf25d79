//! Grammar nodes of a (possibly incomplete) Power Query parse tree
//!
//! A parse of an M document yields a tree in which every node is either fully
//! parsed ([`AstNode`], wrapped as [`GrammarNode::Resolved`]) or still being
//! matched by the parser when it stopped ([`ContextNode`], wrapped as
//! [`GrammarNode::Pending`]). Nodes never point at each other; all structural
//! lookups go through [`NodeIdMap`](super::node_id_map::NodeIdMap).

use std::fmt;

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::{Position as LspPosition, Range as LspRange};

/// Stable identifier of a grammar node within one parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Zero-based line/character position in a document.
///
/// Ordering is line first, then character, which is the document order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

impl From<LspPosition> for Position {
    fn from(position: LspPosition) -> Self {
        Self::new(position.line, position.character)
    }
}

impl From<Position> for LspPosition {
    fn from(position: Position) -> Self {
        LspPosition::new(position.line, position.character)
    }
}

/// Half-open span `[start, end)` covered by a resolved node's tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenRange {
    pub start: Position,
    pub end: Position,
}

impl TokenRange {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Converts to an LSP range (both use zero-based line/character).
    pub fn to_lsp_range(&self) -> LspRange {
        LspRange::new(self.start.into(), self.end.into())
    }
}

/// Grammar production a node was parsed as.
///
/// The enumeration is closed: every rule of the M grammar that can appear in a
/// tree has exactly one tag here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    ArithmeticExpression,
    ArrayWrapper,
    AsExpression,
    AsNullablePrimitiveType,
    AsType,
    Constant,
    Csv,
    EachExpression,
    EqualityExpression,
    ErrorHandlingExpression,
    ErrorRaisingExpression,
    FieldProjection,
    FieldSelector,
    FieldSpecification,
    FieldSpecificationList,
    FieldTypeSpecification,
    FunctionExpression,
    FunctionType,
    GeneralizedIdentifier,
    GeneralizedIdentifierPairedAnyLiteral,
    GeneralizedIdentifierPairedExpression,
    Identifier,
    IdentifierExpression,
    IdentifierPairedExpression,
    IfExpression,
    InvokeExpression,
    IsExpression,
    IsNullablePrimitiveType,
    ItemAccessExpression,
    LetExpression,
    ListExpression,
    ListLiteral,
    ListType,
    LiteralExpression,
    LogicalExpression,
    MetadataExpression,
    NotImplementedExpression,
    NullablePrimitiveType,
    NullableType,
    NullCoalescingExpression,
    OtherwiseExpression,
    Parameter,
    ParameterList,
    ParenthesizedExpression,
    PrimitiveType,
    RangeExpression,
    RecordExpression,
    RecordLiteral,
    RecordType,
    RecursivePrimaryExpression,
    RelationalExpression,
    Section,
    SectionMember,
    TableType,
    TypePrimaryType,
    UnaryExpression,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Kind of a literal token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiteralKind {
    List,
    Logical,
    Null,
    Numeric,
    Record,
    Text,
}

/// Primitive type names usable after `as` / `is` and inside type expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveTypeKind {
    Action,
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
}

/// Payload of a resolved leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeafValue {
    Constant(String),
    Identifier(String),
    GeneralizedIdentifier(String),
    Literal { kind: LiteralKind, text: String },
    PrimitiveType(PrimitiveTypeKind),
}

/// A fully parsed node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub attribute_index: Option<u32>,
    pub token_range: TokenRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<LeafValue>,
}

impl AstNode {
    /// Literal kind, when this is a `LiteralExpression` leaf.
    pub fn literal_kind(&self) -> Option<LiteralKind> {
        match &self.value {
            Some(LeafValue::Literal { kind, .. }) => Some(*kind),
            _ => None,
        }
    }

    /// Text of an identifier or generalized identifier leaf.
    pub fn identifier_text(&self) -> Option<&str> {
        match &self.value {
            Some(LeafValue::Identifier(text)) | Some(LeafValue::GeneralizedIdentifier(text)) => {
                Some(text)
            }
            _ => None,
        }
    }

    /// Text of a constant (keyword or punctuator) leaf.
    pub fn constant_text(&self) -> Option<&str> {
        match &self.value {
            Some(LeafValue::Constant(text)) => Some(text),
            _ => None,
        }
    }

    pub fn primitive_type_kind(&self) -> Option<PrimitiveTypeKind> {
        match &self.value {
            Some(LeafValue::PrimitiveType(kind)) => Some(*kind),
            _ => None,
        }
    }
}

/// A node the parser was still matching when the parse stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub attribute_index: Option<u32>,
    /// Start of the first token this rule was matched against, if any token
    /// was left in the stream.
    #[serde(default)]
    pub token_start: Option<Position>,
}

/// Either a resolved or a pending grammar node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state")]
pub enum GrammarNode {
    Resolved(AstNode),
    Pending(ContextNode),
}

impl GrammarNode {
    pub fn id(&self) -> NodeId {
        match self {
            GrammarNode::Resolved(ast) => ast.id,
            GrammarNode::Pending(context) => context.id,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            GrammarNode::Resolved(ast) => ast.kind,
            GrammarNode::Pending(context) => context.kind,
        }
    }

    pub fn attribute_index(&self) -> Option<u32> {
        match self {
            GrammarNode::Resolved(ast) => ast.attribute_index,
            GrammarNode::Pending(context) => context.attribute_index,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, GrammarNode::Resolved(_))
    }

    pub fn as_resolved(&self) -> Option<&AstNode> {
        match self {
            GrammarNode::Resolved(ast) => Some(ast),
            GrammarNode::Pending(_) => None,
        }
    }

    pub fn is_kind(&self, kind: NodeKind) -> bool {
        self.kind() == kind
    }

    /// The resolved node, if this is resolved and of the given kind.
    pub fn as_resolved_of_kind(&self, kind: NodeKind) -> Option<&AstNode> {
        self.as_resolved().filter(|ast| ast.kind == kind)
    }
}

impl From<AstNode> for GrammarNode {
    fn from(ast: AstNode) -> Self {
        GrammarNode::Resolved(ast)
    }
}

impl From<ContextNode> for GrammarNode {
    fn from(context: ContextNode) -> Self {
        GrammarNode::Pending(context)
    }
}
