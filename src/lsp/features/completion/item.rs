//! Completion items produced by the autocomplete engines

use serde::Serialize;
use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind, Documentation, MarkupContent, MarkupKind};

use super::keyword::KeywordKind;
use super::language_constant::LanguageConstantKind;

/// A single suggestion, independent of the editor protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutocompleteItem {
    /// Display label
    pub label: String,
    /// Text inserted when the item is accepted
    pub insert_text: String,
    pub kind: CompletionItemKind,
    pub documentation: Option<String>,
}

impl AutocompleteItem {
    pub fn from_keyword(keyword: KeywordKind) -> Self {
        Self {
            label: keyword.as_str().to_string(),
            insert_text: keyword.as_str().to_string(),
            kind: CompletionItemKind::KEYWORD,
            documentation: Some(keyword.description().to_string()),
        }
    }

    pub fn from_language_constant(constant: LanguageConstantKind) -> Self {
        Self {
            label: constant.as_str().to_string(),
            insert_text: constant.as_str().to_string(),
            kind: CompletionItemKind::KEYWORD,
            documentation: Some(constant.description().to_string()),
        }
    }

    /// Convert to LSP CompletionItem
    pub fn to_completion_item(&self, sort_order: usize) -> CompletionItem {
        let mut item = CompletionItem {
            label: self.label.clone(),
            kind: Some(self.kind),
            insert_text: Some(self.insert_text.clone()),
            ..Default::default()
        };

        if let Some(ref doc) = self.documentation {
            item.documentation = Some(Documentation::MarkupContent(MarkupContent {
                kind: MarkupKind::Markdown,
                value: doc.clone(),
            }));
        }

        // Sort text ensures proper ordering (lower numbers first)
        item.sort_text = Some(format!("{:04}", sort_order));

        item
    }
}
