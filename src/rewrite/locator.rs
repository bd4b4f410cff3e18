use crate::domain::VersionPattern;

/// A version occurrence found in a text, with what is needed to rewrite its line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located<'t> {
    /// Zero-based index of the matching line
    pub line_index: usize,
    pub indent: &'t str,
    pub version_text: &'t str,
    /// `"\r\n"`, `"\n"`, or `""` for a last line without newline
    pub terminator: &'t str,
}

/// One line split from its terminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'t> {
    pub content: &'t str,
    pub terminator: &'t str,
}

impl<'t> Line<'t> {
    fn split(raw: &'t str) -> Self {
        let (content, terminator) = if let Some(content) = raw.strip_suffix("\r\n") {
            (content, "\r\n")
        } else if let Some(content) = raw.strip_suffix('\n') {
            (content, "\n")
        } else {
            (raw, "")
        };
        Line {
            content,
            terminator,
        }
    }
}

/// Lines of `text` in order; concatenating content and terminators gives back `text`
pub fn lines(text: &str) -> impl Iterator<Item = Line<'_>> {
    text.split_inclusive('\n').map(Line::split)
}

/// Find the first line matching `pattern`
pub fn locate<'t>(text: &'t str, pattern: &VersionPattern) -> Option<Located<'t>> {
    lines(text).enumerate().find_map(|(line_index, line)| {
        pattern.match_line(line.content).map(|m| Located {
            line_index,
            indent: m.indent,
            version_text: m.version,
            terminator: line.terminator,
        })
    })
}
