use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::App;

pub(super) fn handle_detail(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('h') | KeyCode::Backspace => app.exit_detail(),
        KeyCode::Char('j') | KeyCode::Down => {
            app.detail_scroll = app.detail_scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.detail_scroll = app.detail_scroll.saturating_sub(1);
        }
        KeyCode::Char('g') => app.detail_scroll = 0,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::press;
    use crate::tui::render::test_helpers::app_with_tasks;
    use crate::model::Status;
    use crate::tui::app::View;
    use crossterm::event::KeyCode;

    #[test]
    fn test_enter_and_leave_detail() {
        let (_tmp, mut app) = app_with_tasks(&[("A", Status::Backlog)]);
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.view, View::Detail { .. }));
        assert!(app.is_detail_subscribed());

        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.detail_scroll, 1);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.view, View::Board);
        assert!(!app.is_detail_subscribed());
    }
}
