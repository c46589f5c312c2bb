//! Reconciliation of oracle suggestions with the original elements
//!
//! Every element is paired with at most one suggestion and every suggestion
//! is consumed at most once. Suggested ids are trimmed; element ids are
//! compared as given.
//!
//! Matching runs in two passes instead of trying exact then substring per
//! element: exact id matches are resolved for all elements first, so a
//! loose match on an earlier element can never take a suggestion that names
//! a later element exactly.

use log::{info, warn};

use super::types::{Element, SuggestionRecord};

/// How an element found its suggestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    /// Substring containment in either direction; holds the oracle's id
    Fuzzy { suggested_id: String },
    Unmatched,
}

/// One element and the suggestion reconciled to it, if any
#[derive(Debug, Clone)]
pub struct ElementMatch<'a> {
    pub element: &'a Element,
    pub suggestion: Option<&'a SuggestionRecord>,
    pub kind: MatchKind,
}

/// Pair each element with a suggestion, preserving element order
pub fn match_suggestions<'a>(
    elements: &'a [Element],
    suggestions: &'a [SuggestionRecord],
) -> Vec<ElementMatch<'a>> {
    let ids: Vec<Option<String>> = suggestions.iter().map(SuggestionRecord::id).collect();
    let mut consumed = vec![false; suggestions.len()];
    let mut chosen: Vec<Option<(usize, MatchKind)>> = vec![None; elements.len()];

    for (slot, element) in chosen.iter_mut().zip(elements) {
        let hit = ids.iter().enumerate().position(|(i, id)| {
            !consumed[i] && id.as_deref() == Some(element.id.as_str())
        });
        if let Some(i) = hit {
            consumed[i] = true;
            *slot = Some((i, MatchKind::Exact));
        }
    }

    for (slot, element) in chosen.iter_mut().zip(elements) {
        if slot.is_some() {
            continue;
        }
        let hit = ids.iter().enumerate().position(|(i, id)| {
            !consumed[i] && id.as_deref().is_some_and(|id| ids_overlap(&element.id, id))
        });
        if let Some(i) = hit {
            consumed[i] = true;
            let suggested_id = ids[i].clone().unwrap_or_default();
            info!(
                "matched suggestion '{}' to element '{}' by partial id",
                suggested_id, element.id
            );
            *slot = Some((i, MatchKind::Fuzzy { suggested_id }));
        }
    }

    let unused: Vec<String> = consumed
        .iter()
        .zip(&ids)
        .filter(|(used, _)| !**used)
        .map(|(_, id)| id.clone().unwrap_or_else(|| "<missing>".to_string()))
        .collect();
    if !unused.is_empty() {
        warn!("ignoring suggestions with unknown ids: {:?}", unused);
    }

    elements
        .iter()
        .zip(chosen)
        .map(|(element, slot)| match slot {
            Some((i, kind)) => ElementMatch {
                element,
                suggestion: Some(&suggestions[i]),
                kind,
            },
            None => ElementMatch {
                element,
                suggestion: None,
                kind: MatchKind::Unmatched,
            },
        })
        .collect()
}

/// Substring containment in either direction; empty ids never overlap
fn ids_overlap(element_id: &str, suggested_id: &str) -> bool {
    if element_id.is_empty() || suggested_id.is_empty() {
        return false;
    }
    element_id.contains(suggested_id) || suggested_id.contains(element_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn element(id: &str) -> Element {
        Element::new(id, "shape", 0.0, 0.0, 10.0, 10.0)
    }

    fn suggestion(id: &str) -> SuggestionRecord {
        SuggestionRecord::from(json!({ "id": id }))
    }

    fn matched_ids(matches: &[ElementMatch<'_>]) -> Vec<Option<String>> {
        matches
            .iter()
            .map(|m| m.suggestion.and_then(SuggestionRecord::id))
            .collect()
    }

    #[test]
    fn test_exact_match_any_order() {
        let elements = vec![element("a"), element("b")];
        let suggestions = vec![suggestion("b"), suggestion(" a ")];
        let matches = match_suggestions(&elements, &suggestions);

        assert_eq!(matched_ids(&matches), vec![Some("a".to_string()), Some("b".to_string())]);
        assert!(matches.iter().all(|m| m.kind == MatchKind::Exact));
    }

    #[test]
    fn test_element_id_is_not_trimmed() {
        let elements = vec![element(" a")];
        let suggestions = vec![suggestion("a")];
        let matches = match_suggestions(&elements, &suggestions);

        assert_eq!(
            matches[0].kind,
            MatchKind::Fuzzy {
                suggested_id: "a".into()
            }
        );
    }

    #[test]
    fn test_fuzzy_match_on_truncated_id() {
        let elements = vec![element("layer_42")];
        let suggestions = vec![suggestion("42")];
        let matches = match_suggestions(&elements, &suggestions);

        assert_eq!(
            matches[0].kind,
            MatchKind::Fuzzy {
                suggested_id: "42".into()
            }
        );
    }

    #[test]
    fn test_fuzzy_match_on_prefixed_id() {
        let elements = vec![element("hero")];
        let suggestions = vec![suggestion("layer-hero")];
        let matches = match_suggestions(&elements, &suggestions);
        assert!(matches!(matches[0].kind, MatchKind::Fuzzy { .. }));
    }

    #[test]
    fn test_suggestion_consumed_once() {
        let elements = vec![element("item_1"), element("item_10")];
        let suggestions = vec![suggestion("item")];
        let matches = match_suggestions(&elements, &suggestions);

        assert!(matches[0].suggestion.is_some());
        assert_eq!(matches[1].kind, MatchKind::Unmatched);
        assert!(matches[1].suggestion.is_none());
    }

    #[test]
    fn test_exact_wins_over_earlier_fuzzy_candidate() {
        // "title" is a substring of "title_bg", but belongs to element "title".
        let elements = vec![element("title_bg"), element("title")];
        let suggestions = vec![suggestion("title")];
        let matches = match_suggestions(&elements, &suggestions);

        assert_eq!(matches[0].kind, MatchKind::Unmatched);
        assert_eq!(matches[1].kind, MatchKind::Exact);
    }

    #[test]
    fn test_fuzzy_prefers_first_in_response_order() {
        let elements = vec![element("layer_1")];
        let suggestions = vec![suggestion("1"), suggestion("layer")];
        let matches = match_suggestions(&elements, &suggestions);
        assert_eq!(
            matches[0].kind,
            MatchKind::Fuzzy {
                suggested_id: "1".into()
            }
        );
    }

    #[test]
    fn test_missing_and_empty_ids_never_match() {
        let elements = vec![element("a")];
        let suggestions = vec![
            SuggestionRecord::from(json!({"type": "text"})),
            suggestion("   "),
        ];
        let matches = match_suggestions(&elements, &suggestions);
        assert_eq!(matches[0].kind, MatchKind::Unmatched);
    }

    #[test]
    fn test_unknown_suggestion_is_ignored() {
        let elements = vec![element("a")];
        let suggestions = vec![suggestion("zzz")];
        let matches = match_suggestions(&elements, &suggestions);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].kind, MatchKind::Unmatched);
    }
}
