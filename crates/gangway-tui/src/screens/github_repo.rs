use std::sync::Arc;
use std::sync::mpsc::Receiver;

use crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{List, ListItem, ListState};
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;

use gangway_app::platform::Repository;
use gangway_core::step::{StepId, step};

use super::StepSignal;
use crate::keymap;
use crate::theme;
use crate::ui::spinner::SpinnerState;
use crate::ui::text::{focus_line, hint_paragraph, wrapped_paragraph};
use crate::worker::{PlatformEvent, PlatformWorker};

#[derive(Debug)]
enum RepoPhase {
    Loading,
    Picking,
    Connecting,
    Failed(String),
}

pub(crate) struct GithubRepoScreen {
    worker: Arc<dyn PlatformWorker>,
    phase: RepoPhase,
    receiver: Option<Receiver<PlatformEvent>>,
    token: u64,
    next_token: u64,
    repositories: Vec<Repository>,
    selected: usize,
    filter: Input,
    filter_focused: bool,
    spinner: SpinnerState,
}

impl GithubRepoScreen {
    pub(crate) fn new(worker: Arc<dyn PlatformWorker>) -> Self {
        let mut screen = Self {
            worker,
            phase: RepoPhase::Loading,
            receiver: None,
            token: 0,
            next_token: 1,
            repositories: Vec::new(),
            selected: 0,
            filter: Input::default(),
            filter_focused: false,
            spinner: SpinnerState::default(),
        };
        screen.start_load();
        screen
    }

    fn claim_token(&mut self) -> u64 {
        let token = self.next_token;
        self.next_token = self.next_token.saturating_add(1);
        self.token = token;
        token
    }

    fn start_load(&mut self) {
        let token = self.claim_token();
        self.receiver = Some(self.worker.spawn_list_repositories(token));
        self.phase = RepoPhase::Loading;
    }

    fn start_connect(&mut self, full_name: String) {
        let token = self.claim_token();
        self.receiver = Some(self.worker.spawn_connect_repository(full_name, token));
        self.phase = RepoPhase::Connecting;
    }

    fn filtered(&self) -> Vec<usize> {
        let needle = self.filter.value().to_lowercase();
        self.repositories
            .iter()
            .enumerate()
            .filter(|(_, repo)| {
                needle.is_empty() || repo.full_name.to_lowercase().contains(&needle)
            })
            .map(|(index, _)| index)
            .collect()
    }

    pub(crate) fn on_key(&mut self, key: KeyEvent) -> StepSignal {
        match &self.phase {
            RepoPhase::Loading | RepoPhase::Connecting => {
                if keymap::is_back(key) {
                    return StepSignal::Back;
                }
                StepSignal::Continue
            }
            RepoPhase::Failed(_) => {
                if keymap::is_retry(key) {
                    self.start_load();
                    return StepSignal::Continue;
                }
                if keymap::is_back(key) {
                    return StepSignal::Back;
                }
                StepSignal::Continue
            }
            RepoPhase::Picking => self.on_picker_key(key),
        }
    }

    fn on_picker_key(&mut self, key: KeyEvent) -> StepSignal {
        if keymap::is_back(key) {
            return StepSignal::Back;
        }

        if matches!(key.code, KeyCode::Tab) {
            self.filter_focused = !self.filter_focused;
            return StepSignal::Continue;
        }

        if self.filter_focused && !keymap::is_confirm(key) {
            self.filter.handle_event(&Event::Key(key));
            self.selected = 0;
            return StepSignal::Continue;
        }

        if keymap::is_up(key) {
            self.selected = self.selected.saturating_sub(1);
            return StepSignal::Continue;
        }

        if keymap::is_down(key) {
            if self.selected + 1 < self.filtered().len() {
                self.selected += 1;
            }
            return StepSignal::Continue;
        }

        if keymap::is_confirm(key) {
            let filtered = self.filtered();
            if let Some(&index) = filtered.get(self.selected) {
                let full_name = self.repositories[index].full_name.clone();
                self.start_connect(full_name);
            }
            return StepSignal::Continue;
        }

        StepSignal::Continue
    }

    pub(crate) fn on_tick(&mut self) -> StepSignal {
        if matches!(self.phase, RepoPhase::Loading | RepoPhase::Connecting) {
            self.spinner.next_frame();
        }

        let Some(receiver) = &self.receiver else {
            return StepSignal::Continue;
        };

        while let Ok(event) = receiver.try_recv() {
            match event {
                PlatformEvent::Repositories { token, result } if token == self.token => {
                    self.receiver = None;
                    match result {
                        Ok(repositories) => {
                            self.repositories = repositories;
                            self.selected = 0;
                            self.phase = RepoPhase::Picking;
                        }
                        Err(message) => self.phase = RepoPhase::Failed(message),
                    }
                    return StepSignal::Continue;
                }
                PlatformEvent::Connected { token, result } if token == self.token => {
                    self.receiver = None;
                    match result {
                        Ok(()) => return StepSignal::Next,
                        Err(message) => self.phase = RepoPhase::Failed(message),
                    }
                    return StepSignal::Continue;
                }
                // Stale or foreign event from a superseded request.
                _ => {}
            }
        }

        StepSignal::Continue
    }

    pub(crate) fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let meta = step(StepId::GithubRepo);
        let block = theme::card(focus_line(meta.title));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        match &self.phase {
            RepoPhase::Loading => self.render_wait(frame, inner, "Fetching repositories..."),
            RepoPhase::Connecting => self.render_wait(frame, inner, "Connecting repository..."),
            RepoPhase::Failed(message) => render_failure(frame, inner, message),
            RepoPhase::Picking => self.render_picker(frame, inner),
        }
    }

    fn render_wait(&self, frame: &mut Frame<'_>, area: Rect, message: &str) {
        let text = Text::from(vec![
            Line::from(""),
            Line::from(format!("{} {message}", self.spinner.current_frame())),
        ]);
        frame.render_widget(wrapped_paragraph(text), area);
    }

    fn render_picker(&self, frame: &mut Frame<'_>, area: Rect) {
        let [filter_area, list_area, hint] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .areas(area);

        let filter_style = if self.filter_focused {
            theme::focus_prompt()
        } else {
            theme::secondary_text()
        };
        frame.render_widget(
            wrapped_paragraph(Line::from(vec![
                Span::styled("Filter: ", filter_style),
                Span::raw(self.filter.value().to_string()),
            ])),
            filter_area,
        );

        let filtered = self.filtered();
        let items: Vec<ListItem<'_>> = filtered
            .iter()
            .map(|&index| {
                let repo = &self.repositories[index];
                let marker = if repo.private { "private" } else { "public" };
                ListItem::new(format!("{}  ({marker})", repo.full_name))
            })
            .collect();
        let list = List::new(items).highlight_style(theme::list_highlight());
        let mut state = ListState::default();
        state.select((!filtered.is_empty()).then(|| self.selected.min(filtered.len() - 1)));
        frame.render_stateful_widget(list, list_area, &mut state);

        frame.render_widget(
            hint_paragraph("Enter: connect    Tab: filter    j/k: move    Esc: back"),
            hint,
        );
    }

    #[cfg(test)]
    fn is_loading(&self) -> bool {
        matches!(self.phase, RepoPhase::Loading)
    }

    #[cfg(test)]
    fn is_picking(&self) -> bool {
        matches!(self.phase, RepoPhase::Picking)
    }

    #[cfg(test)]
    fn is_failed(&self) -> bool {
        matches!(self.phase, RepoPhase::Failed(_))
    }
}

fn render_failure(frame: &mut Frame<'_>, area: Rect, message: &str) {
    let [body, hint] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(2), Constraint::Length(1)])
        .areas(area);

    let text = Text::from(vec![
        Line::from(Span::styled("Request failed.", theme::error_prompt())),
        Line::from(""),
        Line::from(message.to_string()),
    ]);
    frame.render_widget(wrapped_paragraph(text), body);
    frame.render_widget(hint_paragraph("r: retry    Esc: back"), hint);
}
