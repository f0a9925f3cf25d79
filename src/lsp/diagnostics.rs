//! Lex and parse failures translated into LSP diagnostics
//!
//! The lexer and parser live outside this crate; their outcome arrives as a
//! [`LexParseOutcome`]. Translation never fails: shapes it cannot anchor to a
//! position are dropped.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString, Range};
use tracing::{debug, warn};

use crate::ir::node::{Position, TokenRange};
use crate::ir::node_id_map::NodeIdMap;

/// Diagnostic codes attached to lex/parse diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticErrorCode {
    LexError,
    ParseError,
}

impl DiagnosticErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticErrorCode::LexError => "Error.Lex",
            DiagnosticErrorCode::ParseError => "Error.Parse",
        }
    }
}

/// A token as reported by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: String,
    pub data: String,
    pub range: TokenRange,
}

/// An error on one line of the lexed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexLineError {
    pub message: String,
    /// Where the lexer gave up, when it knows.
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LexError {
    /// Errors keyed by line.
    ErrorLines(Vec<LexLineError>),
    /// The lexer state itself was unusable.
    BadState { message: String },
}

/// Why the parser stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InnerParseError {
    ExpectedTokenKind { expected: String, found: Option<Token> },
    ExpectedAnyTokenKind { expected: Vec<String>, found: Option<Token> },
    ExpectedCsvContinuation { message: String },
    InvalidPrimitiveType { token: Token },
    RequiredParameterAfterOptional { message: String },
    UnterminatedSequence { start_token: Token },
    UnusedTokensRemain { first_unused: Token },
}

impl InnerParseError {
    /// The token the error points at, if it names one.
    pub fn error_token(&self) -> Option<&Token> {
        match self {
            InnerParseError::ExpectedTokenKind { found, .. }
            | InnerParseError::ExpectedAnyTokenKind { found, .. } => found.as_ref(),
            InnerParseError::InvalidPrimitiveType { token } => Some(token),
            InnerParseError::UnterminatedSequence { start_token } => Some(start_token),
            InnerParseError::UnusedTokensRemain { first_unused } => Some(first_unused),
            InnerParseError::ExpectedCsvContinuation { .. }
            | InnerParseError::RequiredParameterAfterOptional { .. } => None,
        }
    }
}

/// A parse failure with the partial tree the parser had built.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub inner: InnerParseError,
    pub context: Arc<NodeIdMap>,
}

/// Result of lexing and parsing a document.
#[derive(Debug, Clone)]
pub enum LexParseOutcome {
    Ok,
    LexFailure(LexError),
    ParseFailure(ParseError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Value of each diagnostic's `source` field.
    pub source: Option<String>,
}

/// Translate a lex/parse outcome into diagnostics
///
/// # Returns
/// One diagnostic per positioned lex line error, at most one diagnostic for a
/// parse failure, nothing for a successful parse.
pub fn validate_lex_and_parse(outcome: &LexParseOutcome, options: &ValidationOptions) -> Vec<Diagnostic> {
    match outcome {
        LexParseOutcome::Ok => Vec::new(),
        LexParseOutcome::LexFailure(error) => lex_diagnostics(error, options),
        LexParseOutcome::ParseFailure(error) => parse_diagnostic(error, options).into_iter().collect(),
    }
}

fn lex_diagnostics(error: &LexError, options: &ValidationOptions) -> Vec<Diagnostic> {
    let LexError::ErrorLines(lines) = error else {
        debug!("Lex error without line information, no diagnostics");
        return Vec::new();
    };

    lines
        .iter()
        .filter_map(|line| {
            let position = line.position?;
            Some(diagnostic(
                DiagnosticErrorCode::LexError,
                line.message.clone(),
                TokenRange::new(position, position).to_lsp_range(),
                options,
            ))
        })
        .collect()
}

fn parse_diagnostic(error: &ParseError, options: &ValidationOptions) -> Option<Diagnostic> {
    let range = match error.inner.error_token() {
        Some(token) => token.range.to_lsp_range(),
        None => right_most_leaf_range(&error.context)?,
    };
    Some(diagnostic(
        DiagnosticErrorCode::ParseError,
        error.message.clone(),
        range,
        options,
    ))
}

fn right_most_leaf_range(context: &NodeIdMap) -> Option<Range> {
    let Some(root) = context.root_id() else {
        warn!("Parse failed before any node was created");
        return None;
    };
    let leaf = context.right_most_leaf(root)?;
    Some(leaf.token_range.to_lsp_range())
}

fn diagnostic(code: DiagnosticErrorCode, message: String, range: Range, options: &ValidationOptions) -> Diagnostic {
    Diagnostic {
        range,
        severity: Some(DiagnosticSeverity::ERROR),
        code: Some(NumberOrString::String(code.as_str().to_string())),
        source: options.source.clone(),
        message,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(start: u32, end: u32) -> Token {
        Token {
            kind: "Identifier".to_string(),
            data: "x".to_string(),
            range: TokenRange::new(Position::new(1, start), Position::new(1, end)),
        }
    }

    #[test]
    fn test_ok_outcome_has_no_diagnostics() {
        assert!(validate_lex_and_parse(&LexParseOutcome::Ok, &ValidationOptions::default()).is_empty());
    }

    #[test]
    fn test_lex_lines_without_position_are_skipped() {
        let outcome = LexParseOutcome::LexFailure(LexError::ErrorLines(vec![
            LexLineError {
                message: "unterminated string".to_string(),
                position: Some(Position::new(2, 4)),
            },
            LexLineError {
                message: "lost".to_string(),
                position: None,
            },
        ]));
        let diagnostics = validate_lex_and_parse(&outcome, &ValidationOptions::default());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].range.start, diagnostics[0].range.end);
        assert_eq!(
            diagnostics[0].code,
            Some(NumberOrString::String("Error.Lex".to_string()))
        );
    }

    #[test]
    fn test_bad_lex_state_has_no_diagnostics() {
        let outcome = LexParseOutcome::LexFailure(LexError::BadState {
            message: "bad".to_string(),
        });
        assert!(validate_lex_and_parse(&outcome, &ValidationOptions::default()).is_empty());
    }

    #[test]
    fn test_parse_error_spans_found_token() {
        let outcome = LexParseOutcome::ParseFailure(ParseError {
            message: "Expected `then`".to_string(),
            inner: InnerParseError::ExpectedTokenKind {
                expected: "KeywordThen".to_string(),
                found: Some(token(5, 6)),
            },
            context: Arc::new(NodeIdMap::default()),
        });
        let options = ValidationOptions {
            source: Some("powerquery".to_string()),
        };
        let diagnostics = validate_lex_and_parse(&outcome, &options);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].range, token(5, 6).range.to_lsp_range());
        assert_eq!(diagnostics[0].source.as_deref(), Some("powerquery"));
        assert_eq!(diagnostics[0].severity, Some(DiagnosticSeverity::ERROR));
    }

    #[test]
    fn test_parse_error_without_tree_has_no_diagnostics() {
        let outcome = LexParseOutcome::ParseFailure(ParseError {
            message: "Expected an expression".to_string(),
            inner: InnerParseError::ExpectedTokenKind {
                expected: "Identifier".to_string(),
                found: None,
            },
            context: Arc::new(NodeIdMap::default()),
        });
        assert!(validate_lex_and_parse(&outcome, &ValidationOptions::default()).is_empty());
    }
}
