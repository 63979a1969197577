use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{is_relative_target, split_code_spans, PARENT_SEGMENT};

// Inline link or image destination: `](target` with optional `<` wrapping.
static INLINE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\]\((?P<open>[ \t]*<?)(?P<target>[^)\s>]*)").unwrap());

/// An opening or closing code fence line.
struct Fence {
    ch: char,
    len: usize,
    /// Nothing but whitespace follows the run, so the line may close a fence.
    bare: bool,
}

/// Prefix relative inline link and image destinations with `../`.
///
/// Fenced code blocks and inline code spans are copied verbatim, and so are
/// destinations that directly follow `]]`.
pub fn rewrite_markdown(content: &str) -> String {
    let mut out = String::with_capacity(content.len() + 64);
    let mut fence: Option<(char, usize)> = None;

    for line in content.split_inclusive('\n') {
        match (fence, fence_marker(line)) {
            (None, Some(marker)) => {
                fence = Some((marker.ch, marker.len));
                out.push_str(line);
            }
            (Some((ch, len)), Some(marker))
                if marker.bare && marker.ch == ch && marker.len >= len =>
            {
                fence = None;
                out.push_str(line);
            }
            (Some(_), _) => out.push_str(line),
            (None, None) => {
                for span in split_code_spans(line, b"`", false) {
                    if span.code {
                        out.push_str(span.text);
                    } else {
                        out.push_str(&rewrite_text(span.text));
                    }
                }
            }
        }
    }

    out
}

fn rewrite_text(text: &str) -> String {
    INLINE_LINK
        .replace_all(text, |caps: &Captures| {
            let whole = &caps[0];
            let target = &caps["target"];
            let start = caps.get(0).map_or(0, |m| m.start());
            let double_bracket = start > 0 && text.as_bytes()[start - 1] == b']';

            if double_bracket || !is_relative_target(target) {
                whole.to_string()
            } else {
                format!("]({}{PARENT_SEGMENT}{target}", &caps["open"])
            }
        })
        .into_owned()
}

/// Parse a fence line: up to three spaces of indent and a run of at least
/// three backticks or tildes. A backtick run followed by more backticks on
/// the same line is inline code, not a fence.
fn fence_marker(line: &str) -> Option<Fence> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    let ch = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|c| *c == ch).count();
    if len < 3 {
        return None;
    }
    let rest = &trimmed[len..];
    if ch == '`' && rest.contains('`') {
        return None;
    }
    Some(Fence {
        ch,
        len,
        bare: rest.trim().is_empty(),
    })
}
