use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells. Tabs count as 4 cells.
pub fn display_width(s: &str) -> usize {
    s.graphemes(true).map(grapheme_display_width).sum()
}

/// Truncate a string to fit within `max_cells` terminal cells, appending `…` if truncated.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if max_cells == 0 {
        return String::new();
    }
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells == 1 {
        return "\u{2026}".to_string();
    }
    let budget = max_cells - 1; // reserve 1 cell for '…'
    let mut width = 0;
    let mut result = String::new();
    for grapheme in s.graphemes(true) {
        let gw = grapheme_display_width(grapheme);
        if width + gw > budget {
            break;
        }
        width += gw;
        result.push_str(grapheme);
    }
    result.push('\u{2026}');
    result
}

/// Pad with spaces on the right up to `cells`. Longer strings are returned unchanged.
pub fn pad_to_width(s: &str, cells: usize) -> String {
    let w = display_width(s);
    if w >= cells {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(cells - w))
    }
}

/// Greedy word wrap of a single line to `width` cells.
///
/// Breaks at word boundaries; a word wider than the line is split by
/// grapheme. Whitespace at a break is dropped. An empty input gives one
/// empty line so blank lines survive wrapping.
pub fn wrap_to_width(line: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![line.to_string()];
    }
    let mut rows = Vec::new();
    let mut current = String::new();
    let mut current_w = 0;

    for word in line.split_word_bounds() {
        let ww = display_width(word);
        let is_space = word.chars().all(char::is_whitespace);

        if current_w + ww <= width {
            current.push_str(word);
            current_w += ww;
            continue;
        }
        if is_space {
            // Break here and swallow the gap
            rows.push(std::mem::take(&mut current).trim_end().to_string());
            current_w = 0;
            continue;
        }
        if !current.is_empty() {
            rows.push(std::mem::take(&mut current).trim_end().to_string());
            current_w = 0;
        }
        for grapheme in word.graphemes(true) {
            let gw = grapheme_display_width(grapheme);
            if current_w + gw > width && !current.is_empty() {
                rows.push(std::mem::take(&mut current));
                current_w = 0;
            }
            current.push_str(grapheme);
            current_w += gw;
        }
    }
    if !current.is_empty() || rows.is_empty() {
        rows.push(current.trim_end().to_string());
    }
    rows
}

/// Display width of a grapheme cluster.
fn grapheme_display_width(g: &str) -> usize {
    if g == "\t" {
        return 4;
    }
    UnicodeWidthStr::width(g)
}
