//! Single-line document builder for parse-tree fixtures.
//!
//! Tokens are laid out left to right on line 0 in the order they are added,
//! so a fixture reads like the source it stands for. Inner resolved nodes get
//! their token range from their descendants when the fixture is finished.
//!
//! ```rust,ignore
//! let mut f = Fixture::new();
//! let root = f.pending(None, None, NodeKind::IfExpression);
//! f.constant(root, 0, "if");
//! f.space();
//! f.numeric(root, 1, "1");
//! let document = f.finish();
//! assert_eq!(document.source, "if 1");
//! ```

use std::collections::HashMap;

use pq_language_services::ir::node::{
    AstNode, ContextNode, GrammarNode, LeafValue, LiteralKind, NodeId, NodeKind, Position,
    PrimitiveTypeKind, TokenRange,
};
use pq_language_services::ir::node_id_map::{NodeIdMap, NodeIdMapBuilder};
use tracing::debug;

#[derive(Debug)]
enum Shape {
    Leaf { start: u32, end: u32, value: LeafValue },
    Inner { created_at: u32 },
    Pending { token_start: Option<u32> },
}

#[derive(Debug)]
struct Record {
    id: NodeId,
    parent: Option<NodeId>,
    attribute_index: Option<u32>,
    kind: NodeKind,
    shape: Shape,
}

/// Builder for a one-line parse tree and its source text.
#[derive(Debug, Default)]
pub struct Fixture {
    records: Vec<Record>,
    source: String,
    marks: HashMap<String, Position>,
    labels: HashMap<String, NodeId>,
}

/// A finished fixture.
#[derive(Debug)]
pub struct Document {
    pub map: NodeIdMap,
    pub source: String,
    marks: HashMap<String, Position>,
    labels: HashMap<String, NodeId>,
}

impl Document {
    /// Position recorded with [`Fixture::mark`].
    pub fn mark(&self, name: &str) -> Position {
        *self
            .marks
            .get(name)
            .unwrap_or_else(|| panic!("no mark named {name:?} in {:?}", self.source))
    }

    /// Node recorded with [`Fixture::label`].
    pub fn id(&self, label: &str) -> NodeId {
        *self
            .labels
            .get(label)
            .unwrap_or_else(|| panic!("no node labelled {label:?} in {:?}", self.source))
    }

    /// The tree as the JSON snapshot an external parser would hand over.
    pub fn snapshot_json(&self) -> String {
        serde_json::to_string_pretty(&self.map.to_snapshot()).expect("snapshot serializes")
    }
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(&self) -> u32 {
        self.source.len() as u32
    }

    pub fn cursor(&self) -> Position {
        Position::new(0, self.column())
    }

    /// Remember the current column under `name`.
    pub fn mark(&mut self, name: &str) -> &mut Self {
        let cursor = self.cursor();
        self.marks.insert(name.to_string(), cursor);
        self
    }

    /// Remember a node under `label`.
    pub fn label(&mut self, id: NodeId, label: &str) -> NodeId {
        self.labels.insert(label.to_string(), id);
        id
    }

    pub fn space(&mut self) -> &mut Self {
        self.source.push(' ');
        self
    }

    /// Source text the parser did not consume into any node.
    pub fn raw(&mut self, text: &str) -> &mut Self {
        self.source.push_str(text);
        self
    }

    fn push(&mut self, parent: Option<NodeId>, attribute_index: Option<u32>, kind: NodeKind, shape: Shape) -> NodeId {
        let id = NodeId(self.records.len() as u32 + 1);
        self.records.push(Record {
            id,
            parent,
            attribute_index,
            kind,
            shape,
        });
        id
    }

    /// A resolved node whose range is derived from its children.
    pub fn node(&mut self, parent: Option<NodeId>, attribute_index: Option<u32>, kind: NodeKind) -> NodeId {
        let created_at = self.column();
        self.push(parent, attribute_index, kind, Shape::Inner { created_at })
    }

    /// A pending node whose first token starts at the current column.
    pub fn pending(&mut self, parent: Option<NodeId>, attribute_index: Option<u32>, kind: NodeKind) -> NodeId {
        let token_start = Some(self.column());
        self.push(parent, attribute_index, kind, Shape::Pending { token_start })
    }

    /// A pending node opened after the last token of the document.
    pub fn pending_at_end(&mut self, parent: Option<NodeId>, attribute_index: Option<u32>, kind: NodeKind) -> NodeId {
        self.push(parent, attribute_index, kind, Shape::Pending { token_start: None })
    }

    fn leaf(&mut self, parent: NodeId, attribute_index: u32, kind: NodeKind, text: &str, value: LeafValue) -> NodeId {
        let start = self.column();
        self.source.push_str(text);
        let end = self.column();
        self.push(
            Some(parent),
            Some(attribute_index),
            kind,
            Shape::Leaf { start, end, value },
        )
    }

    pub fn constant(&mut self, parent: NodeId, attribute_index: u32, text: &str) -> NodeId {
        self.leaf(parent, attribute_index, NodeKind::Constant, text, LeafValue::Constant(text.to_string()))
    }

    pub fn identifier(&mut self, parent: NodeId, attribute_index: u32, text: &str) -> NodeId {
        self.leaf(parent, attribute_index, NodeKind::Identifier, text, LeafValue::Identifier(text.to_string()))
    }

    pub fn generalized_identifier(&mut self, parent: NodeId, attribute_index: u32, text: &str) -> NodeId {
        self.leaf(
            parent,
            attribute_index,
            NodeKind::GeneralizedIdentifier,
            text,
            LeafValue::GeneralizedIdentifier(text.to_string()),
        )
    }

    pub fn literal(&mut self, parent: NodeId, attribute_index: u32, kind: LiteralKind, text: &str) -> NodeId {
        self.leaf(
            parent,
            attribute_index,
            NodeKind::LiteralExpression,
            text,
            LeafValue::Literal {
                kind,
                text: text.to_string(),
            },
        )
    }

    pub fn numeric(&mut self, parent: NodeId, attribute_index: u32, text: &str) -> NodeId {
        self.literal(parent, attribute_index, LiteralKind::Numeric, text)
    }

    pub fn primitive_type(&mut self, parent: NodeId, attribute_index: u32, kind: PrimitiveTypeKind, text: &str) -> NodeId {
        self.leaf(parent, attribute_index, NodeKind::PrimitiveType, text, LeafValue::PrimitiveType(kind))
    }

    /// `name` as an identifier expression (no `@` prefix).
    pub fn identifier_expression(&mut self, parent: NodeId, attribute_index: u32, name: &str) -> NodeId {
        let expression = self.node(Some(parent), Some(attribute_index), NodeKind::IdentifierExpression);
        self.identifier(expression, 1, name);
        expression
    }

    /// Computes inner ranges and builds the node index.
    pub fn finish(self) -> Document {
        let mut spans: HashMap<NodeId, (u32, u32)> = HashMap::new();
        for record in self.records.iter().rev() {
            let span = match &record.shape {
                Shape::Leaf { start, end, .. } => Some((*start, *end)),
                Shape::Inner { created_at } => Some(spans.get(&record.id).copied().unwrap_or((*created_at, *created_at))),
                Shape::Pending { .. } => spans.get(&record.id).copied(),
            };
            if let (Some((start, end)), Some(parent)) = (span, record.parent) {
                spans
                    .entry(parent)
                    .and_modify(|(parent_start, parent_end)| {
                        *parent_start = (*parent_start).min(start);
                        *parent_end = (*parent_end).max(end);
                    })
                    .or_insert((start, end));
            }
        }

        let node_count = self.records.len();
        let mut builder = NodeIdMapBuilder::new();
        for record in self.records {
            let node = match record.shape {
                Shape::Leaf { start, end, value } => GrammarNode::Resolved(AstNode {
                    id: record.id,
                    kind: record.kind,
                    attribute_index: record.attribute_index,
                    token_range: range(start, end),
                    value: Some(value),
                }),
                Shape::Inner { created_at } => {
                    let (start, end) = spans.get(&record.id).copied().unwrap_or((created_at, created_at));
                    GrammarNode::Resolved(AstNode {
                        id: record.id,
                        kind: record.kind,
                        attribute_index: record.attribute_index,
                        token_range: range(start, end),
                        value: None,
                    })
                }
                Shape::Pending { token_start } => GrammarNode::Pending(ContextNode {
                    id: record.id,
                    kind: record.kind,
                    attribute_index: record.attribute_index,
                    token_start: token_start.map(|character| Position::new(0, character)),
                }),
            };
            builder
                .insert(record.parent, node)
                .unwrap_or_else(|e| panic!("fixture for {:?} is not a valid tree: {e}", self.source));
        }

        debug!("Fixture {:?} has {} nodes", self.source, node_count);
        Document {
            map: builder.build(),
            source: self.source,
            marks: self.marks,
            labels: self.labels,
        }
    }
}

fn range(start: u32, end: u32) -> TokenRange {
    TokenRange::new(Position::new(0, start), Position::new(0, end))
}
