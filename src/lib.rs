//! Smart-editing core for the Power Query (M) language
//!
//! Given a possibly incomplete parse tree and a cursor position, the crate
//! resolves the active node, suggests keywords and the contextual constants
//! `nullable`/`optional`, infers structural types and turns lex/parse failures
//! into LSP diagnostics.

pub mod error;
pub mod ir;
pub mod logging;
pub mod lsp;
pub mod settings;

pub use error::{InspectionError, InspectionResult, TreeError};
pub use ir::node::{GrammarNode, NodeId, NodeKind, Position};
pub use ir::node_id_map::{NodeIdMap, NodeIdMapBuilder, TreeSnapshot};
pub use ir::types::{Type, TypeKind};
pub use settings::{Cancellation, CancellationToken, InspectionSettings};
