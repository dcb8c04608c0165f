//! Chunk splitter
//!
//! Splitting is deterministic and order-preserving: chunk `i` always precedes
//! chunk `i + 1` in the source text, and joining the chunks with
//! [`SplitMethod::separator`] reproduces the text up to whitespace trimmed at
//! chunk boundaries.

use lazy_static::lazy_static;
use regex::Regex;

use crate::{Error, Result, SplitMethod};

lazy_static! {
    static ref BLANK_LINE: Regex = Regex::new(r"\n\s*\n").unwrap();
}

/// Divide `text` into ordered chunks using `method`
///
/// `delimiter` is only consulted for [`SplitMethod::Custom`], where it must be
/// present and non-empty.
pub fn split(text: &str, method: SplitMethod, delimiter: Option<&str>) -> Result<Vec<String>> {
    if method == SplitMethod::Custom {
        match delimiter {
            Some(d) if !d.is_empty() => {}
            _ => {
                return Err(Error::InvalidConfiguration(
                    "Custom split requires a non-empty delimiter".to_string(),
                ));
            }
        }
    }

    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let chunks = match method {
        SplitMethod::Paragraph => collect_trimmed(BLANK_LINE.split(text)),
        SplitMethod::Sentence => split_sentences(text),
        SplitMethod::Custom => collect_trimmed(text.split(delimiter.unwrap_or_default())),
    };

    Ok(chunks)
}

/// Rebuild text from chunks produced by [`split`]
pub fn join(chunks: &[String], method: SplitMethod, delimiter: Option<&str>) -> String {
    chunks.join(method.separator(delimiter))
}

fn collect_trimmed<'a>(segments: impl Iterator<Item = &'a str>) -> Vec<String> {
    segments
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn is_closer(c: char) -> bool {
    matches!(c, '"' | '\'' | '”' | '’' | ')' | ']')
}

fn split_sentences(text: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if !is_terminal(c) {
            continue;
        }

        // Absorb "?!", "..." and closing quotes into the same sentence
        while let Some(&(_, next)) = chars.peek() {
            if is_terminal(next) || is_closer(next) {
                chars.next();
            } else {
                break;
            }
        }

        if let Some(&(idx, next)) = chars.peek()
            && next.is_whitespace()
        {
            segments.push(&text[start..idx]);
            start = idx;
        }
    }
    segments.push(&text[start..]);

    collect_trimmed(segments.into_iter())
}
