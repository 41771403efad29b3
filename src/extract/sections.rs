use crate::extract::comments::{strip_html_comments, trim_leading_comments_and_blanks};

/// Header opening the "what" section of the standard PR template
pub const ACCOMPLISH_MARKER: &str = "### What are you trying to accomplish?";

/// Header opening the "how" section of the dotcom PR template
pub const APPROACH_MARKER: &str = "### What approach did you choose and why?";

/// Any line starting with this ends a section.
///
/// `####` sub-headers match too, so a nested heading ends the section.
const SECTION_PREFIX: &str = "###";

fn is_section_header(line: &str) -> bool {
    line.trim().starts_with(SECTION_PREFIX)
}

/// Extract the first section of a PR that follows the standard template.
///
/// Returns the trimmed content between the first line starting with
/// [`ACCOMPLISH_MARKER`] and the next `###` header (or the end of input).
/// When that yields nothing, the original description is returned unchanged.
pub fn extract_first_section(description: &str) -> String {
    let mut lines = description.split('\n');

    if !lines
        .by_ref()
        .any(|line| line.trim().starts_with(ACCOMPLISH_MARKER))
    {
        return description.to_string();
    }

    let section: Vec<&str> = lines.take_while(|line| !is_section_header(line)).collect();
    let content = section.join("\n");
    let content = content.trim();

    if content.is_empty() {
        description.to_string()
    } else {
        content.to_string()
    }
}

/// Extract the description of a PR written against the dotcom template.
///
/// Prefers the content of the [`ACCOMPLISH_MARKER`] section, with leading
/// blank lines and template comments removed. If that section is missing or
/// empty, everything before [`APPROACH_MARKER`] (or the whole description)
/// is used instead, with all comments removed. The result may be empty.
pub fn extract_description_primary(description: &str) -> String {
    if let Some(section) = accomplish_section(description) {
        return section;
    }

    let head = match description.find(APPROACH_MARKER) {
        Some(index) => &description[..index],
        None => description,
    };

    strip_html_comments(head).trim().to_string()
}

/// Content of the accomplish section, if present and non-empty
fn accomplish_section(description: &str) -> Option<String> {
    let start = description.find(ACCOMPLISH_MARKER)? + ACCOMPLISH_MARKER.len();

    let section: Vec<&str> = description[start..]
        .split('\n')
        .take_while(|line| !is_section_header(line))
        .collect();

    let content = trim_leading_comments_and_blanks(&section).join("\n");
    let content = content.trim();

    if content.is_empty() {
        None
    } else {
        Some(content.to_string())
    }
}
