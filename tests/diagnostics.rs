use std::sync::Arc;

use tower_lsp::lsp_types::{DiagnosticSeverity, NumberOrString};

use pq_language_services::ir::node::{Position, TokenRange};
use pq_language_services::lsp::diagnostics::{
    InnerParseError, LexError, LexLineError, LexParseOutcome, ParseError, Token, ValidationOptions,
    validate_lex_and_parse,
};
use test_utils::ir::documents;

fn options() -> ValidationOptions {
    ValidationOptions {
        source: Some("powerquery".to_string()),
    }
}

#[test]
fn test_missing_token_points_at_right_most_leaf() {
    let document = documents::if_then(true);
    let outcome = LexParseOutcome::ParseFailure(ParseError {
        message: "Expected an expression".to_string(),
        inner: InnerParseError::ExpectedTokenKind {
            expected: "Identifier".to_string(),
            found: None,
        },
        context: Arc::new(document.map),
    });

    let diagnostics = validate_lex_and_parse(&outcome, &options());
    assert_eq!(diagnostics.len(), 1);
    let diagnostic = &diagnostics[0];
    assert_eq!(diagnostic.message, "Expected an expression");
    assert_eq!(diagnostic.severity, Some(DiagnosticSeverity::ERROR));
    assert_eq!(
        diagnostic.code,
        Some(NumberOrString::String("Error.Parse".to_string()))
    );
    // `then` is the last resolved token of `if x then`.
    assert_eq!(diagnostic.range.start.character, 5);
    assert_eq!(diagnostic.range.end.character, 9);
}

#[test]
fn test_unused_tokens_span_first_unused_token() {
    let document = documents::record_literal();
    let first_unused = Token {
        kind: "Identifier".to_string(),
        data: "y".to_string(),
        range: TokenRange::new(Position::new(0, 6), Position::new(0, 7)),
    };
    let outcome = LexParseOutcome::ParseFailure(ParseError {
        message: "Unused tokens remain".to_string(),
        inner: InnerParseError::UnusedTokensRemain {
            first_unused: first_unused.clone(),
        },
        context: Arc::new(document.map),
    });

    let diagnostics = validate_lex_and_parse(&outcome, &options());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].range, first_unused.range.to_lsp_range());
    assert_eq!(diagnostics[0].source.as_deref(), Some("powerquery"));
}

#[test]
fn test_csv_continuation_without_token_uses_tree() {
    let document = documents::record_hole();
    let outcome = LexParseOutcome::ParseFailure(ParseError {
        message: "Expected another element".to_string(),
        inner: InnerParseError::ExpectedCsvContinuation {
            message: "dangling comma".to_string(),
        },
        context: Arc::new(document.map),
    });

    let diagnostics = validate_lex_and_parse(&outcome, &options());
    assert_eq!(diagnostics.len(), 1);
    // The pending value is skipped; `=` is the last resolved leaf.
    assert_eq!(diagnostics[0].range.start.character, 2);
    assert_eq!(diagnostics[0].range.end.character, 3);
}

#[test]
fn test_one_diagnostic_per_positioned_lex_line() {
    let outcome = LexParseOutcome::LexFailure(LexError::ErrorLines(vec![
        LexLineError {
            message: "unterminated text".to_string(),
            position: Some(Position::new(0, 3)),
        },
        LexLineError {
            message: "unexpected character".to_string(),
            position: Some(Position::new(4, 0)),
        },
    ]));

    let diagnostics = validate_lex_and_parse(&outcome, &options());
    let lines: Vec<u32> = diagnostics.iter().map(|d| d.range.start.line).collect();
    assert_eq!(lines, vec![0, 4]);
    assert!(diagnostics.iter().all(|d| d.code == Some(NumberOrString::String("Error.Lex".to_string()))));
}
