use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Text};

use gangway_core::step::{StepId, step};

use super::StepSignal;
use crate::keymap;
use crate::theme;
use crate::ui::text::{focus_line, hint_paragraph, wrapped_paragraph};

#[derive(Debug, Default)]
pub(crate) struct GithubAppScreen;

impl GithubAppScreen {
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) fn on_key(&mut self, key: KeyEvent) -> StepSignal {
        if keymap::is_confirm(key) {
            return StepSignal::LeaveForBrowser;
        }
        if matches!(key.code, KeyCode::Char('c')) {
            // Already installed in a previous session.
            return StepSignal::Next;
        }
        if keymap::is_back(key) {
            return StepSignal::Back;
        }
        StepSignal::Continue
    }

    pub(crate) fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let meta = step(StepId::GithubApp);
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
            Line::from("Pressing Enter opens the install page in your browser"),
            Line::from("and closes the wizard. Run gangway again after the"),
            Line::from("install finishes; it picks up right here."),
        ]);
        frame.render_widget(wrapped_paragraph(text), body);
        frame.render_widget(
            hint_paragraph("Enter: open install page    c: already installed    Esc: back"),
            hint,
        );
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
    fn enter_leaves_for_the_browser() {
        let mut screen = GithubAppScreen::new();
        assert_eq!(screen.on_key(key(KeyCode::Enter)), StepSignal::LeaveForBrowser);
    }

    #[test]
    fn already_installed_shortcut_advances() {
        let mut screen = GithubAppScreen::new();
        assert_eq!(screen.on_key(key(KeyCode::Char('c'))), StepSignal::Next);
        assert_eq!(screen.on_key(key(KeyCode::Esc)), StepSignal::Back);
    }
}
