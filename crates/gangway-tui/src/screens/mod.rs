mod agent_key;
mod complete;
mod github_app;
mod github_repo;
mod mode_select;
mod welcome;

use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

use gangway_core::step::StepId;

pub(crate) use agent_key::AgentKeyScreen;
pub(crate) use complete::CompleteScreen;
pub(crate) use github_app::GithubAppScreen;
pub(crate) use github_repo::GithubRepoScreen;
pub(crate) use mode_select::ModeSelectScreen;
pub(crate) use welcome::WelcomeScreen;

use crate::worker::PlatformWorker;

/// What a step card wants the host to do after handling input or a
/// background event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StepSignal {
    Continue,
    Next,
    Back,
    Goto(StepId),
    Complete,
    /// Hand the user to the browser for the GitHub App install and exit
    /// so the next launch resumes past this step.
    LeaveForBrowser,
    Quit,
}

pub(crate) enum StepScreen {
    Welcome(WelcomeScreen),
    ModeSelect(ModeSelectScreen),
    GithubApp(GithubAppScreen),
    GithubRepo(Box<GithubRepoScreen>),
    AgentKey(Box<AgentKeyScreen>),
    Complete(CompleteScreen),
}

impl StepScreen {
    pub(crate) fn mount(id: StepId, worker: &Arc<dyn PlatformWorker>) -> Self {
        match id {
            StepId::Welcome => Self::Welcome(WelcomeScreen::new()),
            StepId::ModeSelect => Self::ModeSelect(ModeSelectScreen::new()),
            StepId::GithubApp => Self::GithubApp(GithubAppScreen::new()),
            StepId::GithubRepo => {
                Self::GithubRepo(Box::new(GithubRepoScreen::new(Arc::clone(worker))))
            }
            StepId::AgentKey => Self::AgentKey(Box::new(AgentKeyScreen::new(Arc::clone(worker)))),
            StepId::Complete => Self::Complete(CompleteScreen::new()),
        }
    }

    pub(crate) fn on_key(&mut self, key: KeyEvent) -> StepSignal {
        match self {
            Self::Welcome(screen) => screen.on_key(key),
            Self::ModeSelect(screen) => screen.on_key(key),
            Self::GithubApp(screen) => screen.on_key(key),
            Self::GithubRepo(screen) => screen.on_key(key),
            Self::AgentKey(screen) => screen.on_key(key),
            Self::Complete(screen) => screen.on_key(key),
        }
    }

    pub(crate) fn on_tick(&mut self) -> StepSignal {
        match self {
            Self::GithubRepo(screen) => screen.on_tick(),
            Self::AgentKey(screen) => screen.on_tick(),
            _ => StepSignal::Continue,
        }
    }

    pub(crate) fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        match self {
            Self::Welcome(screen) => screen.render(frame, area),
            Self::ModeSelect(screen) => screen.render(frame, area),
            Self::GithubApp(screen) => screen.render(frame, area),
            Self::GithubRepo(screen) => screen.render(frame, area),
            Self::AgentKey(screen) => screen.render(frame, area),
            Self::Complete(screen) => screen.render(frame, area),
        }
    }
}
