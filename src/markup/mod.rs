//! Link rewriting for composed markup files.
//!
//! Hugo renders every page of the composed tree with pretty URLs, so
//! `docs/page.md` ends up at `docs/page/index.html`. Relative references in
//! the page therefore need one more parent segment to keep resolving against
//! the directory the page was written in.

mod asciidoc;
mod markdown;

use std::sync::LazyLock;

use regex::Regex;

use crate::common::Format;

pub use asciidoc::rewrite_asciidoc;
pub use markdown::rewrite_markdown;

/// The segment inserted in front of every relative reference.
pub const PARENT_SEGMENT: &str = "../";

static SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").unwrap());

/// True when the target is resolved against the page location, i.e. it has
/// no scheme, is not rooted and is not a bare fragment.
pub fn is_relative_target(target: &str) -> bool {
    !(target.is_empty()
        || target.starts_with('/')
        || target.starts_with('#')
        || SCHEME.is_match(target))
}

/// A piece of a single line: either a code span kept verbatim or prose the
/// link rewriters may touch.
#[derive(Debug, PartialEq)]
pub(crate) struct Span<'a> {
    pub text: &'a str,
    pub code: bool,
}

/// Split a line into code spans and prose.
///
/// A span opens with a run of one of the `delimiters` and closes at the next
/// run of the same character with the same length. A run without a closing
/// partner is plain text. When `constrained` is set, single-character
/// delimiters must not touch a word character on their outer side.
pub(crate) fn split_code_spans<'a>(
    line: &'a str,
    delimiters: &[u8],
    constrained: bool,
) -> Vec<Span<'a>> {
    let bytes = line.as_bytes();
    let mut spans = Vec::new();
    let mut prose_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let delimiter = bytes[i];
        if !delimiters.contains(&delimiter) {
            i += 1;
            continue;
        }
        let run = run_length(bytes, i);
        let guarded = constrained && run == 1;
        let opens = !guarded || i == 0 || !is_word_byte(bytes[i - 1]);

        let close = if opens {
            closing_run(bytes, i + run, delimiter, run, guarded)
        } else {
            None
        };
        match close {
            Some(close) => {
                let end = close + run;
                if prose_start < i {
                    spans.push(Span {
                        text: &line[prose_start..i],
                        code: false,
                    });
                }
                spans.push(Span {
                    text: &line[i..end],
                    code: true,
                });
                prose_start = end;
                i = end;
            }
            None => i += run,
        }
    }

    if prose_start < line.len() {
        spans.push(Span {
            text: &line[prose_start..],
            code: false,
        });
    }
    spans
}

fn run_length(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .take_while(|b| **b == bytes[start])
        .count()
}

fn closing_run(
    bytes: &[u8],
    from: usize,
    delimiter: u8,
    run: usize,
    guarded: bool,
) -> Option<usize> {
    let mut j = from;
    while j < bytes.len() {
        if bytes[j] != delimiter {
            j += 1;
            continue;
        }
        let len = run_length(bytes, j);
        let end = j + len;
        if len == run && (!guarded || end == bytes.len() || !is_word_byte(bytes[end])) {
            return Some(j);
        }
        j = end;
    }
    None
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Rewrite markup content for its format. Non-markup content is returned as is.
pub fn postprocess(format: Format, content: &str) -> String {
    match format {
        Format::Markdown => rewrite_markdown(content),
        Format::Asciidoc => rewrite_asciidoc(content),
        Format::Other => content.to_string(),
    }
}
