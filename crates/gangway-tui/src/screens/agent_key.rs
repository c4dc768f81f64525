use std::sync::Arc;
use std::sync::mpsc::Receiver;

use crossterm::event::{Event, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span, Text};
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;

use gangway_app::platform::AgentKey;
use gangway_core::step::{StepId, step};

use super::StepSignal;
use crate::keymap;
use crate::theme;
use crate::ui::spinner::SpinnerState;
use crate::ui::text::{focus_line, hint_paragraph, label_value_line, wrapped_paragraph};
use crate::worker::{PlatformEvent, PlatformWorker};

#[derive(Debug)]
enum KeyPhase {
    Editing,
    Creating,
    Created(AgentKey),
    Failed(String),
}

pub(crate) struct AgentKeyScreen {
    worker: Arc<dyn PlatformWorker>,
    phase: KeyPhase,
    receiver: Option<Receiver<PlatformEvent>>,
    token: u64,
    next_token: u64,
    label: Input,
    spinner: SpinnerState,
}

impl AgentKeyScreen {
    pub(crate) fn new(worker: Arc<dyn PlatformWorker>) -> Self {
        Self {
            worker,
            phase: KeyPhase::Editing,
            receiver: None,
            token: 0,
            next_token: 1,
            label: Input::new("deploy-agent".to_string()),
            spinner: SpinnerState::default(),
        }
    }

    fn start_create(&mut self) {
        let token = self.next_token;
        self.next_token = self.next_token.saturating_add(1);
        self.token = token;
        self.receiver = Some(
            self.worker
                .spawn_create_agent_key(self.label.value().to_string(), token),
        );
        self.phase = KeyPhase::Creating;
    }

    pub(crate) fn on_key(&mut self, key: KeyEvent) -> StepSignal {
        match &self.phase {
            KeyPhase::Editing => {
                if keymap::is_back(key) {
                    return StepSignal::Back;
                }
                if keymap::is_confirm(key) {
                    if !self.label.value().trim().is_empty() {
                        self.start_create();
                    }
                    return StepSignal::Continue;
                }
                self.label.handle_event(&Event::Key(key));
                StepSignal::Continue
            }
            KeyPhase::Creating => {
                if keymap::is_back(key) {
                    return StepSignal::Back;
                }
                StepSignal::Continue
            }
            KeyPhase::Created(_) => {
                if keymap::is_confirm(key) {
                    return StepSignal::Next;
                }
                StepSignal::Continue
            }
            KeyPhase::Failed(_) => {
                if keymap::is_retry(key) {
                    self.phase = KeyPhase::Editing;
                    return StepSignal::Continue;
                }
                if keymap::is_back(key) {
                    return StepSignal::Back;
                }
                StepSignal::Continue
            }
        }
    }

    pub(crate) fn on_tick(&mut self) -> StepSignal {
        if matches!(self.phase, KeyPhase::Creating) {
            self.spinner.next_frame();
        }

        let Some(receiver) = &self.receiver else {
            return StepSignal::Continue;
        };

        while let Ok(event) = receiver.try_recv() {
            if let PlatformEvent::KeyCreated { token, result } = event
                && token == self.token
            {
                self.receiver = None;
                match result {
                    Ok(agent_key) => self.phase = KeyPhase::Created(agent_key),
                    Err(message) => self.phase = KeyPhase::Failed(message),
                }
                break;
            }
        }

        StepSignal::Continue
    }

    pub(crate) fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let meta = step(StepId::AgentKey);
        let block = theme::card(focus_line(meta.title));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [body, hint] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .areas(inner);

        match &self.phase {
            KeyPhase::Editing => {
                let text = Text::from(vec![
                    Line::from(meta.description),
                    Line::from(""),
                    Line::from(vec![
                        Span::styled("Label: ", theme::focus_prompt()),
                        Span::raw(self.label.value().to_string()),
                    ]),
                ]);
                frame.render_widget(wrapped_paragraph(text), body);
                frame.render_widget(hint_paragraph("Enter: create key    Esc: back"), hint);
            }
            KeyPhase::Creating => {
                let text = Text::from(vec![
                    Line::from(""),
                    Line::from(format!("{} Creating agent key...", self.spinner.current_frame())),
                ]);
                frame.render_widget(wrapped_paragraph(text), body);
            }
            KeyPhase::Created(agent_key) => {
                let text = Text::from(vec![
                    label_value_line("Key id", agent_key.id.clone()),
                    label_value_line("Label", agent_key.label.clone()),
                    label_value_line("Created", agent_key.created_at.clone()),
                    Line::from(""),
                    Line::from(Span::styled(
                        agent_key.token.clone(),
                        theme::token_reveal(),
                    )),
                    Line::from(""),
                    Line::from("Copy the token now. It is shown exactly once and"),
                    Line::from("never stored by gangway."),
                ]);
                frame.render_widget(wrapped_paragraph(text), body);
                frame.render_widget(hint_paragraph("Enter: continue"), hint);
            }
            KeyPhase::Failed(message) => {
                let text = Text::from(vec![
                    Line::from(Span::styled("Key creation failed.", theme::error_prompt())),
                    Line::from(""),
                    Line::from(message.to_string()),
                ]);
                frame.render_widget(wrapped_paragraph(text), body);
                frame.render_widget(hint_paragraph("r: retry    Esc: back"), hint);
            }
        }
    }

    #[cfg(test)]
    fn is_created(&self) -> bool {
        matches!(self.phase, KeyPhase::Created(_))
    }

    #[cfg(test)]
    fn is_failed(&self) -> bool {
        matches!(self.phase, KeyPhase::Failed(_))
    }
}
