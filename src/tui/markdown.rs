use crate::model::config::MarkdownStyle;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("code fence opened on line {0} is never closed")]
    UnterminatedFence(usize),
}

/// Turns a task description into the text the detail view shows
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, text: &str) -> Result<String, RenderError>;
}

/// Shows the markdown source as written
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainRenderer;

impl MarkdownRenderer for PlainRenderer {
    fn render(&self, text: &str) -> Result<String, RenderError> {
        Ok(text.to_string())
    }
}

/// Strips markup for reading in a terminal.
///
/// Heading markers, emphasis and inline code ticks are removed, list bullets
/// become `•`, and fenced code is indented by two spaces with the fence
/// lines dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextRenderer;

impl MarkdownRenderer for TextRenderer {
    fn render(&self, text: &str) -> Result<String, RenderError> {
        let mut out: Vec<String> = Vec::new();
        let mut fence_start: Option<usize> = None;

        for (i, line) in text.lines().enumerate() {
            let trimmed = line.trim_start();
            if trimmed.starts_with("```") {
                fence_start = match fence_start {
                    Some(_) => None,
                    None => Some(i + 1),
                };
                continue;
            }
            if fence_start.is_some() {
                out.push(format!("  {}", line));
                continue;
            }
            out.push(render_line(line));
        }

        match fence_start {
            Some(line) => Err(RenderError::UnterminatedFence(line)),
            None => Ok(out.join("\n")),
        }
    }
}

/// Renderer selected by `[ui] markdown`
pub fn renderer_for(style: MarkdownStyle) -> Box<dyn MarkdownRenderer> {
    match style {
        MarkdownStyle::Plain => Box::new(PlainRenderer),
        MarkdownStyle::Text => Box::new(TextRenderer),
    }
}

fn render_line(line: &str) -> String {
    let indent_len = line.len() - line.trim_start().len();
    let (indent, rest) = line.split_at(indent_len);

    // # Heading
    let hashes = rest.chars().take_while(|c| *c == '#').count();
    if (1..=6).contains(&hashes) && rest[hashes..].starts_with(' ') {
        return strip_inline(rest[hashes..].trim());
    }

    // - item / * item / + item
    for bullet in ["- ", "* ", "+ "] {
        if let Some(item) = rest.strip_prefix(bullet) {
            return format!("{}• {}", indent, strip_inline(item));
        }
    }

    // > quote
    if let Some(quoted) = rest.strip_prefix('>') {
        return format!("{}│ {}", indent, strip_inline(quoted.trim_start()));
    }

    format!("{}{}", indent, strip_inline(rest))
}

/// Drop `**`, `__`, `*`, `_` and backtick markers. Underscores inside words
/// (snake_case) are kept.
fn strip_inline(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    for (i, &c) in chars.iter().enumerate() {
        match c {
            '*' | '`' => {}
            '_' => {
                let prev = i.checked_sub(1).map(|j| chars[j]);
                let next = chars.get(i + 1).copied();
                let inside_word = prev.is_some_and(char::is_alphanumeric)
                    && next.is_some_and(char::is_alphanumeric);
                if inside_word {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_is_verbatim() {
        let text = "# Title\n\n**bold** `code`";
        assert_eq!(PlainRenderer.render(text).unwrap(), text);
    }

    #[test]
    fn test_text_strips_markup() {
        let text = "\
## Steps
1. Open **login** page
- click `submit`
  * nested _item_
> quoted
keep snake_case_names";
        assert_eq!(
            TextRenderer.render(text).unwrap(),
            "\
Steps
1. Open login page
• click submit
  • nested item
│ quoted
keep snake_case_names"
        );
    }

    #[test]
    fn test_text_indents_fenced_code() {
        let text = "Run:\n```sh\ncargo run -- **x**\n```\ndone";
        assert_eq!(
            TextRenderer.render(text).unwrap(),
            "Run:\n  cargo run -- **x**\ndone"
        );
    }

    #[test]
    fn test_unterminated_fence_is_an_error() {
        let text = "intro\n```\nnever closed";
        assert_eq!(
            TextRenderer.render(text),
            Err(RenderError::UnterminatedFence(2))
        );
    }

    #[test]
    fn test_hash_without_space_is_not_a_heading() {
        assert_eq!(TextRenderer.render("#hashtag").unwrap(), "#hashtag");
    }

    #[test]
    fn test_renderer_for_style() {
        let text = "**x**";
        assert_eq!(renderer_for(MarkdownStyle::Plain).render(text).unwrap(), "**x**");
        assert_eq!(renderer_for(MarkdownStyle::Text).render(text).unwrap(), "x");
    }
}
