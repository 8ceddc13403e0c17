/// Line that opens and closes a frontmatter block
pub const DELIMITER: &str = "---";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrontmatterError {
    #[error("frontmatter is missing its closing `---` delimiter")]
    MissingClosingDelimiter,
}

/// Split a markdown document into its frontmatter block and body.
///
/// The document is trimmed first. Without a leading `---` there is no
/// frontmatter and the whole (untrimmed) document is the body. The closing
/// delimiter is a `\n---` followed by end of input or a newline; the text
/// between the delimiters is returned trimmed, and the body starts after the
/// closing delimiter's newline.
///
/// Carriage returns are left alone: callers pass LF-normalized text.
pub fn split_frontmatter(content: &str) -> Result<(&str, &str), FrontmatterError> {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix(DELIMITER) else {
        return Ok(("", content));
    };

    let close = find_closing(rest).ok_or(FrontmatterError::MissingClosingDelimiter)?;
    let frontmatter = rest[..close].trim();
    let after = &rest[close + 1 + DELIMITER.len()..];
    let body = after.strip_prefix('\n').unwrap_or(after);
    Ok((frontmatter, body))
}

/// Byte offset of the `\n` that starts the closing delimiter line
fn find_closing(rest: &str) -> Option<usize> {
    let needle = "\n---";
    let mut from = 0;
    while let Some(pos) = rest[from..].find(needle) {
        let start = from + pos;
        let end = start + needle.len();
        match rest[end..].chars().next() {
            None | Some('\n') => return Some(start),
            Some(_) => from = end,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_frontmatter_returns_whole_document() {
        let doc = "\n# Just markdown\n\nbody\n";
        assert_eq!(split_frontmatter(doc), Ok(("", doc)));
    }

    #[test]
    fn test_basic_split() {
        let doc = "---\nid: T-001\ntitle: Example\n---\nBody text\n";
        let (fm, body) = split_frontmatter(doc).unwrap();
        assert_eq!(fm, "id: T-001\ntitle: Example");
        assert_eq!(body, "Body text");
    }

    #[test]
    fn test_leading_whitespace_before_opening_delimiter() {
        let doc = "\n\n  ---\nid: T-001\n---\nbody";
        let (fm, body) = split_frontmatter(doc).unwrap();
        assert_eq!(fm, "id: T-001");
        assert_eq!(body, "body");
    }

    #[test]
    fn test_empty_frontmatter() {
        let (fm, body) = split_frontmatter("---\n---\nbody\n").unwrap();
        assert_eq!(fm, "");
        assert_eq!(body, "body");
    }

    #[test]
    fn test_closing_delimiter_at_eof() {
        let (fm, body) = split_frontmatter("---\nid: T-001\n---").unwrap();
        assert_eq!(fm, "id: T-001");
        assert_eq!(body, "");
    }

    #[test]
    fn test_missing_closing_delimiter() {
        assert_eq!(
            split_frontmatter("---\nid: T-001\ntitle: x\n"),
            Err(FrontmatterError::MissingClosingDelimiter)
        );
    }

    #[test]
    fn test_longer_dash_run_is_not_a_delimiter() {
        let doc = "---\nid: T-001\n-----\nstill frontmatter: yes\n---\nbody";
        let (fm, body) = split_frontmatter(doc).unwrap();
        assert_eq!(fm, "id: T-001\n-----\nstill frontmatter: yes");
        assert_eq!(body, "body");
    }

    #[test]
    fn test_body_keeps_inner_rules_and_blank_lines() {
        let doc = "---\nid: T-001\n---\n\nIntro\n\n---\n\nMore\n";
        let (_, body) = split_frontmatter(doc).unwrap();
        assert_eq!(body, "\nIntro\n\n---\n\nMore");
    }

    #[test]
    fn test_carriage_returns_are_not_stripped() {
        let doc = "---\r\nid: T-001\r\n---\r\nbody";
        // `\n---\r` does not close the block
        assert_eq!(
            split_frontmatter(doc),
            Err(FrontmatterError::MissingClosingDelimiter)
        );
    }
}
