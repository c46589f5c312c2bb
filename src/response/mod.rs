//! Extraction of suggestion records from raw oracle text
//!
//! Strategies are tried in order and the first one that yields a JSON array
//! of objects wins:
//!
//! 1. the whole trimmed response
//! 2. the first fenced block whose contents are an array
//! 3. the text from the first `[` through the last `]`
//!
//! Anything else is a [`ParseError`]; there is no partial recovery.

pub mod lexer;

use std::fmt;

use log::{debug, info};

use crate::error::{ParseError, Span};
use crate::layout::SuggestionRecord;

/// Which extraction strategy produced the records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Whole,
    Fenced,
    Bracketed,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Whole => write!(f, "whole response"),
            Strategy::Fenced => write!(f, "fenced block"),
            Strategy::Bracketed => write!(f, "outer brackets"),
        }
    }
}

/// Parse the oracle's answer into raw suggestion records
pub fn extract(response: &str) -> Result<Vec<SuggestionRecord>, ParseError> {
    extract_with_strategy(response).map(|(_, records)| records)
}

/// Like [`extract`], also reporting which strategy succeeded
pub fn extract_with_strategy(
    response: &str,
) -> Result<(Strategy, Vec<SuggestionRecord>), ParseError> {
    let trimmed = response.trim();
    let mut last_error: (Span, String) = match parse_array(trimmed) {
        Ok(records) => return Ok(found(Strategy::Whole, records)),
        Err(e) => {
            let start = response.len() - response.trim_start().len();
            (start..start + trimmed.len(), e)
        }
    };

    let fenced = lexer::fenced_blocks(response).into_iter().find(|span| {
        let body = response[span.clone()].trim();
        body.starts_with('[') && body.ends_with(']')
    });
    if let Some(span) = fenced {
        match parse_array(response[span.clone()].trim()) {
            Ok(records) => return Ok(found(Strategy::Fenced, records)),
            Err(e) => last_error = (span, e),
        }
    }

    if let Some(span) = lexer::outer_brackets(response) {
        match parse_array(&response[span.clone()]) {
            Ok(records) => return Ok(found(Strategy::Bracketed, records)),
            Err(e) => last_error = (span, e),
        }
    } else {
        last_error = (0..response.len(), "no JSON array found".to_string());
    }

    let (span, message) = last_error;
    debug!("unparseable oracle response ({} bytes)", response.len());
    Err(ParseError::unparseable(response, span, message))
}

fn found(strategy: Strategy, records: Vec<SuggestionRecord>) -> (Strategy, Vec<SuggestionRecord>) {
    info!(
        "extracted {} suggestions from the {}",
        records.len(),
        strategy
    );
    (strategy, records)
}

fn parse_array(text: &str) -> Result<Vec<SuggestionRecord>, String> {
    serde_json::from_str::<Vec<SuggestionRecord>>(text).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAYLOAD: &str = r#"[{"id":"a","new_coords":{"left":0,"top":0,"right":50,"bottom":50}}]"#;

    #[test]
    fn test_bare_array() {
        let (strategy, records) = extract_with_strategy(&format!("  {}\n", PAYLOAD)).unwrap();
        assert_eq!(strategy, Strategy::Whole);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id().as_deref(), Some("a"));
    }

    #[test]
    fn test_fenced_array() {
        let response = format!("Here is the layout:\n```json\n{}\n```\nLet me know!", PAYLOAD);
        let (strategy, records) = extract_with_strategy(&response).unwrap();
        assert_eq!(strategy, Strategy::Fenced);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_untagged_fence() {
        let response = format!("```\n{}\n```", PAYLOAD);
        let (strategy, _) = extract_with_strategy(&response).unwrap();
        assert_eq!(strategy, Strategy::Fenced);
    }

    #[test]
    fn test_prose_wrapped_array() {
        let response = format!("Sure! The arrangement is {} as requested.", PAYLOAD);
        let (strategy, records) = extract_with_strategy(&response).unwrap();
        assert_eq!(strategy, Strategy::Bracketed);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_all_strategies_agree() {
        let bare = extract(PAYLOAD).unwrap();
        let fenced = extract(&format!("Result:\n```json\n{}\n```", PAYLOAD)).unwrap();
        let wrapped = extract(&format!("Result: {} -- done", PAYLOAD)).unwrap();
        assert_eq!(bare, fenced);
        assert_eq!(bare, wrapped);
    }

    #[test]
    fn test_broken_fence_and_brackets_fail() {
        // Neither the fenced block nor the bracketed span is valid JSON.
        let response = "```json\n[{\"id\": \"a\",]\n```";
        assert!(extract(response).is_err());
    }

    #[test]
    fn test_no_brackets_is_an_error() {
        let err = extract("I am unable to help with that layout.").unwrap_err();
        let ParseError::Unparseable { message, span, .. } = &err;
        assert_eq!(message, "no JSON array found");
        assert_eq!(*span, 0.."I am unable to help with that layout.".len());
    }

    #[test]
    fn test_object_is_not_an_array() {
        assert!(extract(r#"{"id": "a"}"#).is_err());
    }

    #[test]
    fn test_array_of_scalars_is_rejected() {
        assert!(extract("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_empty_array_is_accepted() {
        assert_eq!(extract("[]").unwrap(), Vec::<SuggestionRecord>::new());
    }

    #[test]
    fn test_empty_response() {
        assert!(extract("").is_err());
    }
}
