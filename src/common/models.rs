use std::path::Path;

pub const MARKDOWN_SUFFIXES: &[&str] = &[".md"];
pub const ASCIIDOC_SUFFIXES: &[&str] = &[".adoc", ".asciidoc", ".asc"];

pub const DEFAULT_WHITELIST: &[&str] = &[
    ".md",
    ".adoc",
    ".asciidoc",
    ".asc",
    ".png",
    ".jpg",
    ".jpeg",
    ".gif",
    ".svg",
];

/// Content format of a composed file, decides whether it is postprocessed
/// or copied byte for byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Markdown,
    Asciidoc,
    Other,
}

impl Format {
    pub fn detect(path: impl AsRef<Path>) -> Self {
        let name = path.as_ref().to_string_lossy().to_lowercase();
        if MARKDOWN_SUFFIXES.iter().any(|s| name.ends_with(s)) {
            Format::Markdown
        } else if ASCIIDOC_SUFFIXES.iter().any(|s| name.ends_with(s)) {
            Format::Asciidoc
        } else {
            Format::Other
        }
    }

    pub fn is_markup(&self) -> bool {
        !matches!(self, Format::Other)
    }
}

/// Case-insensitive suffix match of a file name against a whitelist.
pub fn is_whitelisted(file_name: &str, whitelist: &[String]) -> bool {
    let name = file_name.to_lowercase();
    whitelist
        .iter()
        .any(|suffix| name.ends_with(&suffix.to_lowercase()))
}
