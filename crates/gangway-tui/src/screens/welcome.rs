use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Text};

use gangway_core::step::{StepId, step};

use super::StepSignal;
use crate::keymap;
use crate::theme;
use crate::ui::text::{focus_line, hint_paragraph, wrapped_paragraph};

#[derive(Debug, Default)]
pub(crate) struct WelcomeScreen;

impl WelcomeScreen {
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) fn on_key(&mut self, key: KeyEvent) -> StepSignal {
        if keymap::is_confirm(key) {
            return StepSignal::Next;
        }
        if keymap::is_back(key) || keymap::is_quit(key) {
            return StepSignal::Quit;
        }
        StepSignal::Continue
    }

    pub(crate) fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let meta = step(StepId::Welcome);
        let block = theme::card(focus_line(meta.title));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [body, hint] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .areas(inner);

        let text = Text::from(vec![
            Line::from(""),
            Line::from(meta.description),
            Line::from(""),
            Line::from("This wizard connects your GitHub repository, issues a"),
            Line::from("deploy-agent key, and leaves you with a project ready"),
            Line::from("to ship. Progress is saved, so you can leave anytime."),
        ]);
        frame.render_widget(wrapped_paragraph(text), body);
        frame.render_widget(hint_paragraph("Enter: begin    Esc/q: quit"), hint);
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn enter_advances_and_escape_quits() {
        let mut screen = WelcomeScreen::new();
        assert_eq!(screen.on_key(key(KeyCode::Enter)), StepSignal::Next);
        assert_eq!(screen.on_key(key(KeyCode::Esc)), StepSignal::Quit);
        assert_eq!(screen.on_key(key(KeyCode::Char('q'))), StepSignal::Quit);
        assert_eq!(screen.on_key(key(KeyCode::Char('x'))), StepSignal::Continue);
    }
}
