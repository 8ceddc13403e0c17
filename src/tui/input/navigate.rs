use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::App;

pub(super) fn handle_board(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => app.move_column(-1),
        KeyCode::Char('l') | KeyCode::Right => app.move_column(1),
        KeyCode::Char('j') | KeyCode::Down => app.move_row(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_row(-1),
        KeyCode::Char('g') | KeyCode::Home => app.move_row(isize::MIN),
        KeyCode::Char('G') | KeyCode::End => app.move_row(isize::MAX),
        KeyCode::Char('>') => app.shift_selected(true),
        KeyCode::Char('<') => app.shift_selected(false),
        KeyCode::Enter => app.enter_detail(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::press;
    use crate::tui::render::test_helpers::app_with_tasks;
    use crate::model::Status;
    use crossterm::event::KeyCode;

    #[test]
    fn test_navigation_keys() {
        let (_tmp, mut app) =
            app_with_tasks(&[("A", Status::Todo), ("B", Status::Todo), ("C", Status::Todo)]);
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.column, 1);
        press(&mut app, KeyCode::Char('G'));
        assert_eq!(app.rows[1], 2);
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.rows[1], 1);
        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.rows[1], 0);
        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.column, 0);
    }

    #[test]
    fn test_shift_keys_move_task_between_columns() {
        let (_tmp, mut app) = app_with_tasks(&[("A", Status::Todo)]);
        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Char('>'));
        assert_eq!(app.selected_task().unwrap().status, Status::InProgress);
        press(&mut app, KeyCode::Char('<'));
        press(&mut app, KeyCode::Char('<'));
        assert_eq!(app.selected_task().unwrap().status, Status::Backlog);
        assert_eq!(app.column, 0);
    }

    #[test]
    fn test_enter_on_empty_column_does_nothing() {
        let (_tmp, mut app) = app_with_tasks(&[]);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.view, crate::tui::app::View::Board);
    }
}
