use pq_language_services::ir::node::Position;
use pq_language_services::lsp::features::active_node::find_active_node;
use pq_language_services::lsp::features::completion::language_constant::{
    is_nullable_allowed, is_optional_allowed,
};
use pq_language_services::lsp::features::completion::{
    AutocompleteItem, LanguageConstantKind, autocomplete_language_constant,
};
use test_utils::ir::documents;
use test_utils::ir::fixture::Document;

fn constant_at(document: &Document, position: Position) -> Option<AutocompleteItem> {
    let active_node = find_active_node(&document.map, position)
        .unwrap_or_else(|| panic!("no active node at {position:?} in {:?}", document.source));
    autocomplete_language_constant(&active_node)
}

#[test]
fn test_optional_while_typing_a_prefix() {
    for prefix in ["o", "opt", "optiona"] {
        let document = documents::function_parameter(Some(prefix));
        let item = constant_at(&document, document.mark("end"));
        assert_eq!(
            item,
            Some(AutocompleteItem::from_language_constant(LanguageConstantKind::Optional)),
            "prefix {prefix:?}"
        );
    }
}

#[test]
fn test_no_optional_once_fully_typed() {
    let document = documents::function_parameter(Some("optional"));
    assert_eq!(document.source, "(optional");
    assert_eq!(constant_at(&document, document.mark("end")), None);
}

#[test]
fn test_no_optional_for_other_names() {
    let document = documents::function_parameter(Some("x"));
    assert_eq!(constant_at(&document, document.mark("end")), None);
}

#[test]
fn test_no_optional_before_the_name() {
    let document = documents::function_parameter(Some("opt"));
    let active_node = find_active_node(&document.map, document.mark("name_start")).unwrap();
    assert!(!is_optional_allowed(&active_node));
}

#[test]
fn test_optional_for_pending_name() {
    let document = documents::function_parameter(None);
    assert_eq!(document.source, "(");
    let active_node = find_active_node(&document.map, document.mark("end")).unwrap();
    assert!(is_optional_allowed(&active_node));
}

#[test]
fn test_optional_on_existing_marker() {
    let document = documents::optional_parameter();
    let active_node = find_active_node(&document.map, document.mark("optional_start")).unwrap();
    assert!(is_optional_allowed(&active_node));
    assert!(!is_nullable_allowed(&active_node));
}

#[test]
fn test_nullable_before_nullable_constant() {
    let document = documents::nullable_parameter();
    assert_eq!(document.source, "(x as nullable text) => x");
    let item = constant_at(&document, document.mark("nullable_start"));
    assert_eq!(
        item.map(|item| item.label),
        Some(LanguageConstantKind::Nullable.as_str().to_string())
    );
}

#[test]
fn test_no_nullable_on_resolved_type() {
    let document = documents::nullable_parameter();
    assert_eq!(constant_at(&document, document.mark("type_start")), None);
}

#[test]
fn test_no_nullable_on_as_keyword() {
    let document = documents::nullable_parameter();
    let active_node = find_active_node(&document.map, document.mark("as_start")).unwrap();
    assert!(!is_nullable_allowed(&active_node));
}

#[test]
fn test_nullable_for_pending_primitive_type() {
    let document = documents::as_type_hole();
    assert_eq!(document.source, "(x as ");
    let item = constant_at(&document, document.mark("hole"));
    assert_eq!(
        item,
        Some(AutocompleteItem::from_language_constant(LanguageConstantKind::Nullable))
    );
}
