//! Autocomplete for M documents
//!
//! This module provides:
//! - Keyword suggestions driven by the grammar slot under the cursor
//! - The contextual constants `nullable` and `optional`
//! - A combined entry point resolving the active node once for both

pub mod item;
pub mod keyword;
pub mod language_constant;

pub use item::AutocompleteItem;
pub use keyword::{
    EXPRESSION_KEYWORDS, KeywordAutocompleteState, KeywordKind, KeywordSuggestion,
    autocomplete_keyword_default, autocomplete_keywords,
};
pub use language_constant::{LanguageConstantKind, autocomplete_language_constant};

use serde::Serialize;
use tower_lsp::lsp_types::CompletionItem;
use tracing::debug;

use crate::error::InspectionResult;
use crate::ir::node::Position;
use crate::ir::node_id_map::NodeIdMap;
use crate::lsp::features::active_node::find_active_node;
use crate::settings::InspectionSettings;

/// Everything autocomplete offers at one position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Autocomplete {
    pub keywords: Vec<KeywordKind>,
    pub language_constant: Option<AutocompleteItem>,
}

impl Autocomplete {
    /// Items in presentation order: the language constant, then keywords.
    pub fn items(&self) -> Vec<AutocompleteItem> {
        self.language_constant
            .iter()
            .cloned()
            .chain(self.keywords.iter().copied().map(AutocompleteItem::from_keyword))
            .collect()
    }

    /// [`Autocomplete::items`] as LSP completion items, sorted in that order.
    pub fn completion_items(&self) -> Vec<CompletionItem> {
        self.items()
            .iter()
            .enumerate()
            .map(|(sort_order, item)| item.to_completion_item(sort_order))
            .collect()
    }
}

/// Resolve the active node and run both autocomplete engines
///
/// # Returns
/// `Ok(None)` when the position is outside the tree, otherwise the
/// suggestions. Fails only when the request was cancelled.
pub fn autocomplete(
    settings: &InspectionSettings,
    map: &NodeIdMap,
    position: Position,
) -> InspectionResult<Option<Autocomplete>> {
    settings.check_cancelled()?;

    let Some(active_node) = find_active_node(map, position) else {
        debug!(
            "No active node at ({}, {}), nothing to autocomplete",
            position.line, position.character
        );
        return Ok(None);
    };

    let keywords = autocomplete_keywords(&active_node);
    let language_constant = autocomplete_language_constant(&active_node);
    debug!(
        "Autocomplete ({}) at ({}, {}): {} keywords, constant {:?}",
        settings.locale,
        position.line,
        position.character,
        keywords.len(),
        language_constant.as_ref().map(|item| item.label.as_str())
    );

    Ok(Some(Autocomplete {
        keywords,
        language_constant,
    }))
}
