//! Placeholder rewriting: swap `![id](id)` image references for
//! materialized file paths.
//!
//! ## Why tokenise instead of string-replace?
//!
//! A naive `str::replace` of `![id](id)` breaks when the id text happens
//! to appear verbatim elsewhere on the page, or when a rewritten target
//! itself contains another id as a substring (double rewrite). Parsing the
//! page into a sequence of text spans and image-reference tokens, then
//! rewriting only the tokens, makes each reference rewritten at most once
//! and leaves all surrounding text byte-for-byte intact.

use crate::model::MaterializedImage;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static RE_IMAGE_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]*)\)").unwrap());

/// One lexical segment of a page's markdown.
#[derive(Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Verbatim text between image references.
    Text(&'a str),
    /// An inline image reference `![alt](target)`.
    ImageRef {
        alt: &'a str,
        target: &'a str,
        raw: &'a str,
    },
}

/// Split a page's markdown into text spans and image-reference tokens.
///
/// Concatenating the segments' raw text reproduces the input exactly.
pub fn parse_segments(markdown: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for caps in RE_IMAGE_REF.captures_iter(markdown) {
        let whole = caps.get(0).unwrap();
        if whole.start() > cursor {
            segments.push(Segment::Text(&markdown[cursor..whole.start()]));
        }
        segments.push(Segment::ImageRef {
            alt: caps.get(1).unwrap().as_str(),
            target: caps.get(2).unwrap().as_str(),
            raw: whole.as_str(),
        });
        cursor = whole.end();
    }
    if cursor < markdown.len() {
        segments.push(Segment::Text(&markdown[cursor..]));
    }
    segments
}

/// Rewrite a page's self-referential placeholders to materialized paths.
///
/// Only tokens of the form `![id](id)` whose id has a materialized image
/// in `replacements` are rewritten, becoming
/// `![file_name](relative_path)`. Every other token — unmatched ids,
/// references that already point elsewhere — is reproduced verbatim.
pub fn rewrite_page(markdown: &str, replacements: &HashMap<&str, &MaterializedImage>) -> String {
    let mut out = String::with_capacity(markdown.len());
    for segment in parse_segments(markdown) {
        match segment {
            Segment::Text(t) => out.push_str(t),
            Segment::ImageRef { alt, target, raw } => {
                match replacements.get(target) {
                    Some(img) if alt == target => {
                        out.push_str(&format!("![{}]({})", img.file_name, img.relative_path));
                    }
                    _ => out.push_str(raw),
                }
            }
        }
    }
    out
}
