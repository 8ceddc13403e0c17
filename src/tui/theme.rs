use ratatui::style::Color;

use crate::model::{Priority, Status, UiConfig};

/// Colors used by the board and detail views, named by role
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub accent: Color,
    pub muted: Color,
    pub danger: Color,
    pub warning: Color,
    pub success: Color,
    pub info: Color,
    pub selection_bg: Color,
    pub selection_border: Color,
    pub column_border: Color,
}

const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: rgb(0x0C001B),
            text: rgb(0xB0AAFF),
            text_bright: rgb(0xFFFFFF),
            accent: rgb(0xFB4196),
            muted: rgb(0x7D78BF),
            danger: rgb(0xFF4444),
            warning: rgb(0xFFD700),
            success: rgb(0x44FF88),
            info: rgb(0x44DDFF),
            selection_bg: rgb(0x3D1438),
            selection_border: rgb(0xFB4196),
            column_border: rgb(0x3A3566),
        }
    }
}

/// `#RRGGBB`, case-insensitive
fn parse_hex_color(value: &str) -> Option<Color> {
    let digits = value.strip_prefix('#')?;
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok().map(rgb)
}

impl Theme {
    /// Defaults with the `[ui.colors]` overrides applied.
    /// Unknown slots and malformed colors are skipped with a warning.
    pub fn from_config(ui: &UiConfig) -> Self {
        let mut theme = Theme::default();
        for (slot, value) in &ui.colors {
            let Some(target) = theme.slot_mut(slot) else {
                tracing::warn!(%slot, "ignoring unknown color slot");
                continue;
            };
            match parse_hex_color(value) {
                Some(color) => *target = color,
                None => tracing::warn!(%slot, %value, "ignoring invalid color"),
            }
        }
        theme
    }

    fn slot_mut(&mut self, slot: &str) -> Option<&mut Color> {
        let color = match slot {
            "background" => &mut self.background,
            "text" => &mut self.text,
            "text_bright" => &mut self.text_bright,
            "accent" => &mut self.accent,
            "muted" => &mut self.muted,
            "danger" => &mut self.danger,
            "warning" => &mut self.warning,
            "success" => &mut self.success,
            "info" => &mut self.info,
            "selection_bg" => &mut self.selection_bg,
            "selection_border" => &mut self.selection_border,
            "column_border" => &mut self.column_border,
            _ => return None,
        };
        Some(color)
    }

    /// Column header color
    pub fn status_color(&self, status: Status) -> Color {
        match status {
            Status::Backlog => self.muted,
            Status::Todo => self.text,
            Status::InProgress => self.accent,
            Status::Review => self.info,
            Status::Done => self.success,
        }
    }

    pub fn priority_color(&self, priority: Priority) -> Color {
        match priority {
            Priority::Low => self.muted,
            Priority::Medium => self.text,
            Priority::High => self.warning,
            Priority::Critical => self.danger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff4444"), Some(Color::Rgb(0xFF, 0x44, 0x44)));
        assert_eq!(parse_hex_color("#0C001B"), Some(Color::Rgb(0x0C, 0x00, 0x1B)));
        assert_eq!(parse_hex_color("FF4444"), None);
        assert_eq!(parse_hex_color("#FF44"), None);
        assert_eq!(parse_hex_color("#+FFFFF"), None);
        assert_eq!(parse_hex_color("#ZZZZZZ"), None);
    }

    #[test]
    fn test_from_config_overrides() {
        let mut ui = UiConfig::default();
        ui.colors.insert("background".into(), "#000000".into());
        ui.colors.insert("accent".into(), "not a color".into());
        ui.colors.insert("nonsense".into(), "#112233".into());

        let theme = Theme::from_config(&ui);
        assert_eq!(theme.background, Color::Rgb(0, 0, 0));
        assert_eq!(theme.accent, Theme::default().accent);
        assert_eq!(theme.text, Color::Rgb(0xB0, 0xAA, 0xFF));
    }

    #[test]
    fn test_status_and_priority_colors() {
        let theme = Theme::default();
        assert_eq!(theme.status_color(Status::InProgress), theme.accent);
        assert_eq!(theme.status_color(Status::Done), theme.success);
        assert_eq!(theme.priority_color(Priority::Critical), theme.danger);
        assert_eq!(theme.priority_color(Priority::Low), theme.muted);
    }
}
