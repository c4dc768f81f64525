use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::{List, ListItem, ListState};

use gangway_core::step::{StepId, step};

use super::StepSignal;
use crate::keymap;
use crate::theme;
use crate::ui::text::{focus_line, hint_paragraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OnboardingMode {
    DeployRepository,
    StartFromTemplate,
}

impl OnboardingMode {
    fn title(self) -> &'static str {
        match self {
            Self::DeployRepository => "Deploy an existing repository",
            Self::StartFromTemplate => "Start from a template",
        }
    }
}

const MODES: [OnboardingMode; 2] = [
    OnboardingMode::DeployRepository,
    OnboardingMode::StartFromTemplate,
];

#[derive(Debug)]
pub(crate) struct ModeSelectScreen {
    selected: usize,
}

impl ModeSelectScreen {
    pub(crate) fn new() -> Self {
        Self { selected: 0 }
    }

    #[cfg(test)]
    pub(crate) fn selected_mode(&self) -> OnboardingMode {
        MODES[self.selected]
    }

    pub(crate) fn on_key(&mut self, key: KeyEvent) -> StepSignal {
        if keymap::is_back(key) {
            return StepSignal::Back;
        }
        if keymap::is_up(key) {
            self.selected = self.selected.saturating_sub(1);
            return StepSignal::Continue;
        }
        if keymap::is_down(key) {
            if self.selected + 1 < MODES.len() {
                self.selected += 1;
            }
            return StepSignal::Continue;
        }
        if keymap::is_confirm(key) {
            return StepSignal::Next;
        }
        StepSignal::Continue
    }

    pub(crate) fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let meta = step(StepId::ModeSelect);
        let block = theme::card(focus_line(meta.title));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [body, hint] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .areas(inner);

        let items: Vec<ListItem<'_>> = MODES
            .iter()
            .map(|mode| ListItem::new(mode.title()))
            .collect();
        let list = List::new(items).highlight_style(theme::list_highlight());
        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, body, &mut state);

        frame.render_widget(
            hint_paragraph("Enter: continue    j/k: move    Esc: back"),
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
    fn movement_is_bounded_and_enter_confirms() {
        let mut screen = ModeSelectScreen::new();
        assert_eq!(screen.selected_mode(), OnboardingMode::DeployRepository);

        screen.on_key(key(KeyCode::Char('j')));
        screen.on_key(key(KeyCode::Char('j')));
        assert_eq!(screen.selected_mode(), OnboardingMode::StartFromTemplate);

        screen.on_key(key(KeyCode::Char('k')));
        screen.on_key(key(KeyCode::Char('k')));
        assert_eq!(screen.selected_mode(), OnboardingMode::DeployRepository);

        assert_eq!(screen.on_key(key(KeyCode::Enter)), StepSignal::Next);
        assert_eq!(screen.on_key(key(KeyCode::Esc)), StepSignal::Back);
    }
}
