use std::io::Write;
use std::process::{Command, Output};

use indoc::indoc;
use tempfile::NamedTempFile;

use pq_language_services::ir::node_id_map::TreeSnapshot;
use test_utils::ir::documents;
use test_utils::ir::fixture::Document;

const NUMERIC_LITERAL: &str = indoc! {r#"
    {
      "nodes": [
        {
          "node": {
            "state": "Resolved",
            "id": 1,
            "kind": "LiteralExpression",
            "attribute_index": null,
            "token_range": {
              "start": { "line": 0, "character": 0 },
              "end": { "line": 0, "character": 1 }
            },
            "value": { "Literal": { "kind": "Numeric", "text": "1" } }
          }
        }
      ]
    }
"#};

fn write_tree(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(json.as_bytes()).expect("write tree");
    file
}

fn write_document(document: &Document) -> NamedTempFile {
    write_tree(&document.snapshot_json())
}

fn pq_inspect(tree: &NamedTempFile, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pq-inspect"))
        .arg("--tree")
        .arg(tree.path())
        .args(["--log-level", "error", "--no-color"])
        .args(args)
        .output()
        .expect("run pq-inspect")
}

#[test]
fn test_snapshot_round_trips_through_json() {
    let document = documents::record_projection(&["a"], true);
    let json = document.snapshot_json();
    let snapshot = TreeSnapshot::from_json(&json).unwrap();
    assert_eq!(snapshot, document.map.to_snapshot());
}

#[test]
fn test_type_of_hand_written_snapshot() {
    let tree = write_tree(NUMERIC_LITERAL);
    let output = pq_inspect(&tree, &["type", "--node", "1"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "number");
}

#[test]
fn test_keywords_in_hole() {
    let document = documents::if_then(true);
    let tree = write_document(&document);
    let after = document.mark("after");
    let output = pq_inspect(
        &tree,
        &[
            "--line",
            &after.line.to_string(),
            "--character",
            &after.character.to_string(),
            "keywords",
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let keywords: Vec<String> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(keywords.len(), 9);
    assert!(keywords.iter().any(|keyword| keyword == "let"));
}

#[test]
fn test_language_constant_is_null_when_not_applicable() {
    let tree = write_tree(NUMERIC_LITERAL);
    let output = pq_inspect(&tree, &["language-constant"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "null");
}

#[test]
fn test_complete_prints_sorted_completion_items() {
    let document = documents::function_parameter(Some("opt"));
    let tree = write_document(&document);
    let end = document.mark("end");
    let output = pq_inspect(
        &tree,
        &[
            "--line",
            &end.line.to_string(),
            "--character",
            &end.character.to_string(),
            "complete",
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let items: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert!(!items.is_empty());
    assert_eq!(items[0]["label"], "optional");
    assert_eq!(items[0]["sortText"], "0000");
    assert_eq!(items[0]["insertText"], "optional");
}

#[test]
fn test_type_fails_past_max_depth() {
    let document = documents::nested_parentheses(8);
    let tree = write_document(&document);
    let root = document.map.root_id().unwrap();
    let output = pq_inspect(&tree, &["--max-depth", "4", "type", "--node", &root.0.to_string()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("nested deeper than 4 levels"));
}

#[test]
fn test_malformed_tree_fails() {
    let tree = write_tree("{ \"nodes\": [ { \"node\": 42 } ] }");
    let output = pq_inspect(&tree, &["active-node"]);
    assert!(!output.status.success());
}
