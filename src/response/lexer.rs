//! Token scanner for oracle responses using logos
//!
//! Only the structure needed to locate a JSON array is tokenized: code
//! fences and square brackets. Everything else is prose and is dropped.

use logos::Logos;

use crate::error::Span;

#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token {
    /// Triple-backtick fence with an optional language tag (```json)
    #[regex(r"```[A-Za-z0-9_+-]*")]
    Fence,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,
}

/// Lex input string into tokens with spans
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input)
        .spanned()
        .filter_map(|(tok, span)| tok.ok().map(|t| (t, span)))
}

/// Byte spans of the contents of each fenced block, in order.
///
/// Fences pair up as open/close; a trailing unpaired fence is ignored.
pub fn fenced_blocks(input: &str) -> Vec<Span> {
    let fences: Vec<Span> = lex(input)
        .filter(|(tok, _)| *tok == Token::Fence)
        .map(|(_, span)| span)
        .collect();

    fences
        .chunks_exact(2)
        .map(|pair| pair[0].end..pair[1].start)
        .collect()
}

/// Span from the first `[` through the last `]`, inclusive
pub fn outer_brackets(input: &str) -> Option<Span> {
    let mut start = None;
    let mut end = None;
    for (tok, span) in lex(input) {
        match tok {
            Token::BracketOpen if start.is_none() => start = Some(span.start),
            Token::BracketClose => end = Some(span.end),
            _ => {}
        }
    }
    match (start, end) {
        (Some(start), Some(end)) if end > start => Some(start..end),
        _ => None,
    }
}
