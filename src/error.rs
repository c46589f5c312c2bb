//! Error type for oracle response extraction

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in the raw response text
pub type Span = std::ops::Range<usize>;

/// Longest prefix of the raw response kept for diagnostics, in characters
pub const EXCERPT_LIMIT: usize = 500;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("could not extract a suggestion array from the oracle response: {message} (response began: {excerpt:?})")]
    Unparseable {
        span: Span,
        message: String,
        excerpt: String,
    },
}

impl ParseError {
    pub fn unparseable(source: &str, span: Span, message: impl Into<String>) -> Self {
        ParseError::Unparseable {
            span,
            message: message.into(),
            excerpt: excerpt(source),
        }
    }

    /// The truncated response prefix carried for diagnostics
    pub fn excerpt(&self) -> &str {
        match self {
            ParseError::Unparseable { excerpt, .. } => excerpt,
        }
    }

    /// Format the error over the raw response using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        match self {
            ParseError::Unparseable { span, message, .. } => {
                // ariadne labels count characters, not bytes
                let start = char_offset(source, span.start);
                let end = char_offset(source, span.end).max(start);

                let written = Report::build(ReportKind::Error, filename, start)
                    .with_message("unusable oracle response")
                    .with_label(
                        Label::new((filename, start..end))
                            .with_message(message)
                            .with_color(Color::Red),
                    )
                    .finish()
                    .write((filename, Source::from(source)), &mut buf);
                if written.is_err() {
                    return self.to_string();
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

fn excerpt(source: &str) -> String {
    source.chars().take(EXCERPT_LIMIT).collect()
}

fn char_offset(source: &str, byte: usize) -> usize {
    let byte = byte.min(source.len());
    source
        .char_indices()
        .take_while(|(i, _)| *i < byte)
        .count()
}
