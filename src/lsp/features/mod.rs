//! Editing features computed from a parse tree and a cursor position
//!
//! # Architecture Overview
//!
//! - `active_node` - Resolves the cursor to an ancestry of grammar nodes
//! - `completion` - Keyword and language-constant autocomplete over that ancestry
//! - `inspect_type` - Structural type inference for any node
//!
//! Every feature reads the tree through [`NodeIdMap`](crate::ir::node_id_map::NodeIdMap)
//! only, and none of them keeps state between requests.

pub mod active_node;
pub mod completion;
pub mod inspect_type;
