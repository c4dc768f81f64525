use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span, Text};

use gangway_core::step::{StepId, step};

use super::StepSignal;
use crate::keymap;
use crate::theme;
use crate::ui::text::{hint_paragraph, wrapped_paragraph};

#[derive(Debug, Default)]
pub(crate) struct CompleteScreen;

impl CompleteScreen {
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) fn on_key(&mut self, key: KeyEvent) -> StepSignal {
        if keymap::is_confirm(key) {
            return StepSignal::Complete;
        }
        if matches!(key.code, KeyCode::Char('e')) {
            // Jump back to swap the connected repository before finishing.
            return StepSignal::Goto(StepId::GithubRepo);
        }
        if keymap::is_quit(key) {
            return StepSignal::Quit;
        }
        StepSignal::Continue
    }

    pub(crate) fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let meta = step(StepId::Complete);
        let block = theme::card(Line::from(Span::styled(
            meta.title,
            theme::success_prompt(),
        )));
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
            Line::from("Pushes to your connected repository now deploy"),
            Line::from("automatically. Manage the project from the dashboard."),
        ]);
        frame.render_widget(wrapped_paragraph(text), body);
        frame.render_widget(
            hint_paragraph("Enter: finish    e: change repository    q: quit"),
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
    fn enter_completes_the_flow() {
        let mut screen = CompleteScreen::new();
        assert_eq!(screen.on_key(key(KeyCode::Enter)), StepSignal::Complete);
        assert_eq!(screen.on_key(key(KeyCode::Char('q'))), StepSignal::Quit);
        assert_eq!(screen.on_key(key(KeyCode::Char('x'))), StepSignal::Continue);
    }

    #[test]
    fn change_repository_jumps_back_to_the_picker() {
        let mut screen = CompleteScreen::new();
        assert_eq!(
            screen.on_key(key(KeyCode::Char('e'))),
            StepSignal::Goto(StepId::GithubRepo)
        );
    }
}
