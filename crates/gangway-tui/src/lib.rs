mod director;
mod fx;
mod keymap;
mod route;
mod screens;
mod theme;
mod ui;
mod worker;

use std::io::{Stdout, stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use tracing::warn;

use gangway_app::{App, EXIT_PATH};
use gangway_core::step::{StepId, step};

use crate::director::{Card, NavIntent, RequestOutcome, TransitionDirector};
use crate::fx::backdrop::Backdrop;
use crate::fx::raster::{BufferRasterizer, Rasterizer};
use crate::fx::rng::{RandomSource, ThreadRandom};
use crate::route::TuiRouter;
use crate::screens::{StepScreen, StepSignal};
use crate::worker::{HttpPlatformWorker, PlatformWorker};

const TICK_RATE: Duration = Duration::from_millis(33);

/// How the wizard session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiExit {
    /// The flow reached its exit route; persisted progress is cleared.
    Completed,
    /// The user was handed to the browser; the next launch resumes.
    LeftForBrowser,
    Canceled,
}

pub(crate) struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    pub(crate) fn enter() -> Result<Self> {
        let terminal = enter_with_ops(
            || enable_raw_mode().context("failed to enable raw mode"),
            || {
                let mut out = stdout();
                execute!(out, EnterAlternateScreen, Hide)
                    .context("failed to enter alternate screen")
            },
            || {
                let backend = CrosstermBackend::new(stdout());
                Terminal::new(backend).context("failed to create terminal backend")
            },
            || {
                let mut out = stdout();
                execute!(out, Show, LeaveAlternateScreen)
                    .context("failed to restore terminal screen during rollback")
            },
            || disable_raw_mode().context("failed to disable raw mode during rollback"),
        )?;
        Ok(Self { terminal })
    }

    pub(crate) fn draw<F>(&mut self, draw_fn: F) -> Result<()>
    where
        F: FnOnce(&mut ratatui::Frame<'_>),
    {
        self.terminal
            .draw(draw_fn)
            .context("failed to render terminal")?;
        Ok(())
    }

    pub(crate) fn autoresize(&mut self) -> Result<()> {
        self.terminal
            .autoresize()
            .context("failed to autoresize terminal")?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(self.terminal.backend_mut(), Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

/// Terminal setup with rollback: a failure partway through undoes the
/// steps that already succeeded before surfacing the error.
fn enter_with_ops<T, EnableRawMode, EnterAltScreen, CreateTerminal, LeaveAltScreen, DisableRawMode>(
    mut enable_raw_mode_op: EnableRawMode,
    mut enter_alt_screen_op: EnterAltScreen,
    mut create_terminal_op: CreateTerminal,
    mut leave_alt_screen_op: LeaveAltScreen,
    mut disable_raw_mode_op: DisableRawMode,
) -> Result<T>
where
    EnableRawMode: FnMut() -> Result<()>,
    EnterAltScreen: FnMut() -> Result<()>,
    CreateTerminal: FnMut() -> Result<T>,
    LeaveAltScreen: FnMut() -> Result<()>,
    DisableRawMode: FnMut() -> Result<()>,
{
    enable_raw_mode_op()?;

    if let Err(error) = enter_alt_screen_op() {
        return Err(rollback(error, false, &mut leave_alt_screen_op, &mut disable_raw_mode_op));
    }

    match create_terminal_op() {
        Ok(terminal) => Ok(terminal),
        Err(error) => Err(rollback(
            error,
            true,
            &mut leave_alt_screen_op,
            &mut disable_raw_mode_op,
        )),
    }
}

fn rollback<LeaveAltScreen, DisableRawMode>(
    setup_error: anyhow::Error,
    alt_screen_entered: bool,
    leave_alt_screen_op: &mut LeaveAltScreen,
    disable_raw_mode_op: &mut DisableRawMode,
) -> anyhow::Error
where
    LeaveAltScreen: FnMut() -> Result<()>,
    DisableRawMode: FnMut() -> Result<()>,
{
    let mut cleanup_failures = Vec::<String>::new();

    if alt_screen_entered && let Err(error) = leave_alt_screen_op() {
        cleanup_failures.push(format!(
            "failed to restore alternate screen during rollback: {error:#}"
        ));
    }

    if let Err(error) = disable_raw_mode_op() {
        cleanup_failures.push(format!(
            "failed to disable raw mode during rollback: {error:#}"
        ));
    }

    if cleanup_failures.is_empty() {
        setup_error
    } else {
        anyhow!(
            "{setup_error:#}\nterminal rollback cleanup failed: {}",
            cleanup_failures.join("\n")
        )
    }
}

pub(crate) fn is_ctrl_c(key: KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

/// Centered card region the active step renders into; the dissolve
/// effect captures and scatters exactly this rectangle.
pub(crate) fn card_rect(area: Rect) -> Rect {
    let width = area.width.saturating_sub(8).clamp(area.width.min(24), 68);
    let height = area.height.saturating_sub(6).clamp(area.height.min(10), 16);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Runs the onboarding wizard until the flow completes, the user leaves
/// for the browser, or cancels.
pub fn run_onboarding(app: &mut App) -> Result<UiExit> {
    let effects = app.config().effects.clone();
    let install_url = app.config().platform.github_install_url.clone();
    let worker: Arc<dyn PlatformWorker> =
        Arc::new(HttpPlatformWorker::new(&app.config().platform.api_base_url));

    let mut session = TerminalSession::enter()?;
    let mut rng = ThreadRandom::new();

    let start = app.resume_step();
    let mut router = TuiRouter::starting_at(step(start).path);
    let mut current = app.on_route_arrived(step(start).path);
    let mut backdrop = Backdrop::new(&effects, current, &mut rng);
    let mut director = TransitionDirector::new(&effects);
    let mut screen = StepScreen::mount(current, &worker);
    let mut last_frame = Instant::now();

    loop {
        let now = Instant::now();
        let dt = now.duration_since(last_frame);
        last_frame = now;

        backdrop.tick(dt);
        if let Some(intent) = director.tick(dt, &mut rng) {
            apply_intent(app, &mut router, intent);
        }

        let tick_signal = screen.on_tick();
        if let Some(exit) = handle_signal(
            tick_signal,
            app,
            &mut director,
            &mut router,
            &mut rng,
            &install_url,
        ) {
            return Ok(exit);
        }

        if let Some(path) = router.take_pending() {
            if path == EXIT_PATH {
                return Ok(UiExit::Completed);
            }
            let next = app.on_route_arrived(&path);
            if next != current {
                backdrop.on_step_changed(next);
                director.clear_card();
                screen = StepScreen::mount(next, &worker);
                current = next;
            }
        }

        session.draw(|frame| {
            let area = frame.area();
            backdrop.paint(frame.buffer_mut(), area);

            let card_area = card_rect(area);
            if director.is_running() {
                // The card stays unmounted-looking while it scatters;
                // only its fragments are drawn.
                director.render_effect(frame.buffer_mut());
            } else {
                screen.render(frame, card_area);
                if let Some(raster) = BufferRasterizer.capture(frame.buffer_mut(), card_area) {
                    director.set_card(Card {
                        area: card_area,
                        raster,
                    });
                }
            }
        })?;

        if !event::poll(TICK_RATE).context("failed to poll terminal event")? {
            continue;
        }

        let key = match event::read().context("failed to read terminal event")? {
            Event::Resize(_, _) => {
                session.autoresize()?;
                continue;
            }
            Event::Key(key) if matches!(key.kind, KeyEventKind::Press) => key,
            _ => continue,
        };

        if is_ctrl_c(key) {
            return Ok(UiExit::Canceled);
        }

        let signal = screen.on_key(key);
        if let Some(exit) = handle_signal(
            signal,
            app,
            &mut director,
            &mut router,
            &mut rng,
            &install_url,
        ) {
            return Ok(exit);
        }
    }
}

fn handle_signal(
    signal: StepSignal,
    app: &mut App,
    director: &mut TransitionDirector,
    router: &mut TuiRouter,
    rng: &mut dyn RandomSource,
    install_url: &str,
) -> Option<UiExit> {
    match signal {
        StepSignal::Continue => None,
        StepSignal::Next => {
            request_transition(NavIntent::Next, app, director, router, rng);
            None
        }
        StepSignal::Back => {
            request_transition(NavIntent::Previous, app, director, router, rng);
            None
        }
        StepSignal::Goto(id) => {
            request_transition(NavIntent::Goto(id), app, director, router, rng);
            None
        }
        StepSignal::Complete => {
            request_transition(NavIntent::Complete, app, director, router, rng);
            None
        }
        StepSignal::LeaveForBrowser => {
            app.set_return_step(StepId::GithubRepo);
            if let Err(error) = open::that(install_url) {
                warn!(%error, url = install_url, "could not open the install page");
            }
            Some(UiExit::LeftForBrowser)
        }
        StepSignal::Quit => Some(UiExit::Canceled),
    }
}

fn request_transition(
    intent: NavIntent,
    app: &mut App,
    director: &mut TransitionDirector,
    router: &mut TuiRouter,
    rng: &mut dyn RandomSource,
) {
    if let RequestOutcome::ApplyNow(intent) = director.request(intent, rng) {
        apply_intent(app, router, intent);
    }
}

fn apply_intent(app: &mut App, router: &mut TuiRouter, intent: NavIntent) {
    match intent {
        NavIntent::Next => app.go_to_next(router),
        NavIntent::Previous => app.go_to_previous(router),
        NavIntent::Goto(id) => app.go_to_step(id, router),
        NavIntent::Complete => app.complete_onboarding(router),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use anyhow::anyhow;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::layout::Rect;

    use super::{card_rect, enter_with_ops, is_ctrl_c};

    #[test]
    fn ctrl_c_detection_requires_the_modifier() {
        let plain = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
        let chorded = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(!is_ctrl_c(plain));
        assert!(is_ctrl_c(chorded));
    }

    #[test]
    fn card_rect_is_centered_and_bounded() {
        let area = Rect::new(0, 0, 100, 40);
        let card = card_rect(area);
        assert_eq!(card.width, 68);
        assert_eq!(card.height, 16);
        assert_eq!(card.x, 16);
        assert_eq!(card.y, 12);
    }

    #[test]
    fn card_rect_fits_tiny_terminals() {
        let area = Rect::new(0, 0, 20, 8);
        let card = card_rect(area);
        assert!(card.width <= 20);
        assert!(card.height <= 8);
        assert!(card.right() <= area.right());
        assert!(card.bottom() <= area.bottom());
    }

    #[test]
    fn enter_with_ops_rolls_back_raw_mode_when_alt_screen_fails() {
        let calls = RefCell::new(Vec::<&'static str>::new());

        let error = enter_with_ops(
            || {
                calls.borrow_mut().push("enable_raw_mode");
                Ok(())
            },
            || {
                calls.borrow_mut().push("enter_alt_screen");
                Err(anyhow!("enter alt failed"))
            },
            || {
                calls.borrow_mut().push("create_terminal");
                Ok(())
            },
            || {
                calls.borrow_mut().push("leave_alt_screen");
                Ok(())
            },
            || {
                calls.borrow_mut().push("disable_raw_mode");
                Ok(())
            },
        )
        .expect_err("enter should fail");

        assert_eq!(
            calls.into_inner(),
            vec!["enable_raw_mode", "enter_alt_screen", "disable_raw_mode"]
        );
        assert!(format!("{error:#}").contains("enter alt failed"));
    }

    #[test]
    fn enter_with_ops_unwinds_alt_screen_when_terminal_creation_fails() {
        let calls = RefCell::new(Vec::<&'static str>::new());

        let error = enter_with_ops(
            || {
                calls.borrow_mut().push("enable_raw_mode");
                Ok(())
            },
            || {
                calls.borrow_mut().push("enter_alt_screen");
                Ok(())
            },
            || {
                calls.borrow_mut().push("create_terminal");
                Err::<(), _>(anyhow!("create terminal failed"))
            },
            || {
                calls.borrow_mut().push("leave_alt_screen");
                Ok(())
            },
            || {
                calls.borrow_mut().push("disable_raw_mode");
                Ok(())
            },
        )
        .expect_err("enter should fail");

        assert_eq!(
            calls.into_inner(),
            vec![
                "enable_raw_mode",
                "enter_alt_screen",
                "create_terminal",
                "leave_alt_screen",
                "disable_raw_mode",
            ]
        );
        assert!(format!("{error:#}").contains("create terminal failed"));
    }

    #[test]
    fn enter_with_ops_reports_cleanup_failures_alongside_the_cause() {
        let error = enter_with_ops(
            || Ok(()),
            || Ok(()),
            || Err::<(), _>(anyhow!("create terminal failed")),
            || Err(anyhow!("leave alt failed")),
            || Err(anyhow!("disable raw failed")),
        )
        .expect_err("enter should fail");

        let message = format!("{error:#}");
        assert!(message.contains("create terminal failed"));
        assert!(message.contains("leave alt failed"));
        assert!(message.contains("disable raw failed"));
    }
}
