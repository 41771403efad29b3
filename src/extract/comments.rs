//! HTML comment handling for pull request templates.
//!
//! Templates ship with `<!-- ... -->` guidance for the author. These blocks
//! are not content and get dropped before a description reaches the report.

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";

/// Whether the line scanner is currently inside a multi-line comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum CommentState {
    #[default]
    Outside,
    Inside,
}

impl CommentState {
    /// Feed one line through the scanner.
    ///
    /// Returns the state for the next line and whether this line belongs to
    /// a comment block.
    fn advance(self, line: &str) -> (Self, bool) {
        let trimmed = line.trim();

        match self {
            Self::Inside if trimmed.ends_with(COMMENT_CLOSE) => (Self::Outside, true),
            Self::Inside => (Self::Inside, true),
            Self::Outside if trimmed.starts_with(COMMENT_OPEN) => {
                if trimmed.ends_with(COMMENT_CLOSE) {
                    (Self::Outside, true)
                } else {
                    (Self::Inside, true)
                }
            }
            Self::Outside => (Self::Outside, false),
        }
    }
}

/// Remove HTML comment blocks from `text`, line by line.
///
/// A comment is recognised only when its opening `<!--` starts a line
/// (ignoring indentation) and its closing `-->` ends a line. Every other
/// line is kept verbatim and the kept lines are re-joined with `\n`. The
/// result is not trimmed.
pub fn strip_html_comments(text: &str) -> String {
    let mut state = CommentState::default();
    let mut kept = Vec::new();

    for line in text.split('\n') {
        let (next, is_comment) = state.advance(line);
        state = next;

        if !is_comment {
            kept.push(line);
        }
    }

    kept.join("\n")
}

/// Skip blank lines and comment blocks that precede the first line of content.
///
/// Everything from the first content line onward is returned untouched,
/// including comments that appear later.
pub fn trim_leading_comments_and_blanks<'a, 'b>(lines: &'b [&'a str]) -> &'b [&'a str] {
    let mut state = CommentState::default();

    for (index, line) in lines.iter().enumerate() {
        let (next, is_comment) = state.advance(line);
        state = next;

        if !is_comment && !line.trim().is_empty() {
            return &lines[index..];
        }
    }

    &[]
}
