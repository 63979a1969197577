use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{is_relative_target, split_code_spans, PARENT_SEGMENT};

// Inline `image:` and block `image::` macros up to their attribute list.
static IMAGE_MACRO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?P<macro>image::?)(?P<target>[^\[\s]+)\[").unwrap());

/// Prefix relative `image:` and `image::` targets with `../`.
///
/// Listing (`----`) and literal (`....`) blocks are copied verbatim, as are
/// inline `` `monospace` `` and `+passthrough+` spans.
pub fn rewrite_asciidoc(content: &str) -> String {
    let mut out = String::with_capacity(content.len() + 64);
    let mut delimiter: Option<&str> = None;

    for line in content.split_inclusive('\n') {
        let bare = line.trim_end();
        if is_verbatim_delimiter(bare) {
            match delimiter {
                None => delimiter = Some(bare),
                Some(open) if open == bare => delimiter = None,
                Some(_) => {}
            }
            out.push_str(line);
            continue;
        }
        if delimiter.is_some() {
            out.push_str(line);
            continue;
        }
        for span in split_code_spans(line, b"`+", true) {
            if span.code {
                out.push_str(span.text);
            } else {
                out.push_str(&rewrite_text(span.text));
            }
        }
    }

    out
}

fn rewrite_text(text: &str) -> String {
    IMAGE_MACRO
        .replace_all(text, |caps: &Captures| {
            let target = &caps["target"];
            if is_relative_target(target) {
                format!("{}{PARENT_SEGMENT}{target}[", &caps["macro"])
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

fn is_verbatim_delimiter(line: &str) -> bool {
    line.len() >= 4 && (line.bytes().all(|b| b == b'-') || line.bytes().all(|b| b == b'.'))
}
