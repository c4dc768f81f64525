use std::time::Duration;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use tracing::debug;

use gangway_core::config::EffectsConfig;
use gangway_core::step::StepId;

use crate::fx::dissolve::{DissolveConfig, DissolveRun};
use crate::fx::raster::Raster;
use crate::fx::rng::RandomSource;

/// Breathing room after the dissolve completes so the next card has a
/// frame to mount before input-driven transitions resume.
const SETTLE: Duration = Duration::from_millis(50);

/// A navigation request expressed as data; applied by the host once the
/// director releases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NavIntent {
    Next,
    Previous,
    Goto(StepId),
    Complete,
}

/// The mounted card as the director sees it: where it sits on screen
/// and what it looked like at the last idle frame.
#[derive(Debug, Clone)]
pub(crate) struct Card {
    pub(crate) area: Rect,
    pub(crate) raster: Raster,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RequestOutcome {
    /// Nothing to animate; the host applies the navigation immediately.
    ApplyNow(NavIntent),
    /// A dissolve run started; the intent fires when it completes.
    Started,
    /// A transition is in flight; the intent replaced any queued one.
    Queued,
}

enum DirectorState {
    Idle,
    Running {
        run: DissolveRun,
        elapsed: Duration,
        intent: NavIntent,
    },
    Settling {
        remaining: Duration,
        pending: Option<NavIntent>,
    },
}

/// Serializes card transitions: at most one dissolve runs at a time,
/// and when requests pile up the most recent intent is the one that
/// ultimately navigates. Earlier intents are discarded, not queued.
pub(crate) struct TransitionDirector {
    config: DissolveConfig,
    reduced_motion: bool,
    card: Option<Card>,
    state: DirectorState,
}

impl TransitionDirector {
    pub(crate) fn new(effects: &EffectsConfig) -> Self {
        Self {
            config: DissolveConfig::from_effects(effects),
            reduced_motion: effects.reduced_motion,
            card: None,
            state: DirectorState::Idle,
        }
    }

    /// Refreshed every idle frame so a transition always dissolves the
    /// card exactly as last drawn.
    pub(crate) fn set_card(&mut self, card: Card) {
        if matches!(self.state, DirectorState::Idle) {
            self.card = Some(card);
        }
    }

    pub(crate) fn clear_card(&mut self) {
        self.card = None;
    }

    #[cfg(test)]
    pub(crate) fn is_transitioning(&self) -> bool {
        !matches!(self.state, DirectorState::Idle)
    }

    pub(crate) fn is_running(&self) -> bool {
        matches!(self.state, DirectorState::Running { .. })
    }

    pub(crate) fn request(
        &mut self,
        intent: NavIntent,
        rng: &mut dyn RandomSource,
    ) -> RequestOutcome {
        match &mut self.state {
            DirectorState::Running {
                intent: armed_intent,
                ..
            } => {
                debug!(?intent, "replacing in-flight transition intent");
                *armed_intent = intent;
                RequestOutcome::Queued
            }
            DirectorState::Settling { pending, .. } => {
                *pending = Some(intent);
                RequestOutcome::Queued
            }
            DirectorState::Idle => {
                if self.reduced_motion {
                    return RequestOutcome::ApplyNow(intent);
                }

                match self.card.take() {
                    None => RequestOutcome::ApplyNow(intent),
                    Some(card) if card.raster.is_blank() => RequestOutcome::ApplyNow(intent),
                    Some(card) => {
                        // Starting a new run drops any residual one.
                        self.state = DirectorState::Running {
                            run: DissolveRun::new(
                                card.raster,
                                card.area,
                                self.config.clone(),
                                rng,
                            ),
                            elapsed: Duration::ZERO,
                            intent,
                        };
                        RequestOutcome::Started
                    }
                }
            }
        }
    }

    /// Advances the transition clock. Returns a navigation intent the
    /// host must apply now: either the armed intent of a run that just
    /// completed, or a queued intent released after the settle window
    /// when re-requesting found nothing to animate.
    pub(crate) fn tick(&mut self, dt: Duration, rng: &mut dyn RandomSource) -> Option<NavIntent> {
        match &mut self.state {
            DirectorState::Idle => None,
            DirectorState::Running {
                run,
                elapsed,
                intent,
            } => {
                *elapsed += dt;
                if !run.is_complete(*elapsed) {
                    return None;
                }

                let fired = *intent;
                self.state = DirectorState::Settling {
                    remaining: SETTLE,
                    pending: None,
                };
                Some(fired)
            }
            DirectorState::Settling { remaining, pending } => {
                *remaining = remaining.saturating_sub(dt);
                if !remaining.is_zero() {
                    return None;
                }

                let pending = pending.take();
                self.state = DirectorState::Idle;
                match pending {
                    None => None,
                    Some(intent) => match self.request(intent, rng) {
                        RequestOutcome::ApplyNow(intent) => Some(intent),
                        RequestOutcome::Started | RequestOutcome::Queued => None,
                    },
                }
            }
        }
    }

    /// Paints the in-flight dissolve. The host skips drawing the card
    /// while a run is live, which is what hides the original.
    pub(crate) fn render_effect(&self, buffer: &mut Buffer) {
        if let DirectorState::Running { run, elapsed, .. } = &self.state {
            run.render(*elapsed, buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use ratatui::style::Style;

    use super::*;
    use crate::fx::raster::CellPixel;
    use crate::fx::rng::XorShiftRandom;

    fn effects() -> EffectsConfig {
        EffectsConfig::default()
    }

    fn card() -> Card {
        let mut raster = Raster::new(6, 3);
        for y in 0..3 {
            for x in 0..6 {
                raster.set(
                    x,
                    y,
                    CellPixel {
                        symbol: '#',
                        style: Style::default(),
                    },
                );
            }
        }
        Card {
            area: Rect::new(2, 2, 6, 3),
            raster,
        }
    }

    #[test]
    fn request_without_a_card_applies_immediately() {
        let mut rng = XorShiftRandom::seeded(1);
        let mut director = TransitionDirector::new(&effects());

        let outcome = director.request(NavIntent::Next, &mut rng);

        assert_eq!(outcome, RequestOutcome::ApplyNow(NavIntent::Next));
        assert!(!director.is_transitioning());
    }

    #[test]
    fn request_with_a_blank_card_applies_immediately() {
        let mut rng = XorShiftRandom::seeded(1);
        let mut director = TransitionDirector::new(&effects());
        director.set_card(Card {
            area: Rect::new(0, 0, 4, 2),
            raster: Raster::new(4, 2),
        });

        let outcome = director.request(NavIntent::Next, &mut rng);
        assert_eq!(outcome, RequestOutcome::ApplyNow(NavIntent::Next));
    }

    #[test]
    fn reduced_motion_skips_the_run_entirely() {
        let mut rng = XorShiftRandom::seeded(1);
        let mut director = TransitionDirector::new(&EffectsConfig {
            reduced_motion: true,
            ..EffectsConfig::default()
        });
        director.set_card(card());

        let outcome = director.request(NavIntent::Complete, &mut rng);
        assert_eq!(outcome, RequestOutcome::ApplyNow(NavIntent::Complete));
    }

    #[test]
    fn a_second_request_replaces_the_armed_intent_without_a_second_run() {
        let mut rng = XorShiftRandom::seeded(2);
        let mut director = TransitionDirector::new(&effects());
        director.set_card(card());

        assert_eq!(
            director.request(NavIntent::Next, &mut rng),
            RequestOutcome::Started
        );
        assert_eq!(
            director.request(NavIntent::Goto(StepId::AgentKey), &mut rng),
            RequestOutcome::Queued
        );

        // Drive the single run to completion: only the later intent fires.
        let fired = director.tick(Duration::from_millis(900), &mut rng);
        assert_eq!(fired, Some(NavIntent::Goto(StepId::AgentKey)));

        // Nothing else is released afterwards.
        let after_settle = director.tick(Duration::from_millis(50), &mut rng);
        assert_eq!(after_settle, None);
        assert!(!director.is_transitioning());
    }

    #[test]
    fn run_completion_is_followed_by_a_settle_window() {
        let mut rng = XorShiftRandom::seeded(3);
        let mut director = TransitionDirector::new(&effects());
        director.set_card(card());
        director.request(NavIntent::Next, &mut rng);

        assert!(director.tick(Duration::from_millis(900), &mut rng).is_some());
        assert!(director.is_transitioning());
        assert!(!director.is_running());

        assert_eq!(director.tick(Duration::from_millis(49), &mut rng), None);
        assert!(director.is_transitioning());
        assert_eq!(director.tick(Duration::from_millis(1), &mut rng), None);
        assert!(!director.is_transitioning());
    }

    #[test]
    fn request_during_settle_is_released_after_the_window() {
        let mut rng = XorShiftRandom::seeded(4);
        let mut director = TransitionDirector::new(&effects());
        director.set_card(card());
        director.request(NavIntent::Next, &mut rng);
        director.tick(Duration::from_millis(900), &mut rng);

        // Mid-settle request; no card is mounted yet, so releasing it
        // applies immediately instead of starting a run.
        director.request(NavIntent::Previous, &mut rng);
        let released = director.tick(Duration::from_millis(50), &mut rng);
        assert_eq!(released, Some(NavIntent::Previous));
    }

    #[test]
    fn director_cycles_cleanly_into_a_second_transition() {
        let mut rng = XorShiftRandom::seeded(5);
        let mut director = TransitionDirector::new(&effects());
        director.set_card(card());
        director.request(NavIntent::Next, &mut rng);
        director.tick(Duration::from_millis(900), &mut rng);
        director.tick(Duration::from_millis(50), &mut rng);
        assert!(!director.is_transitioning());

        // The next card mounts once idle; a fresh request runs again.
        director.set_card(card());
        assert_eq!(
            director.request(NavIntent::Next, &mut rng),
            RequestOutcome::Started
        );
        assert!(director.is_running());
    }

    #[test]
    fn set_card_is_ignored_while_a_transition_is_in_flight() {
        let mut rng = XorShiftRandom::seeded(6);
        let mut director = TransitionDirector::new(&effects());
        director.set_card(card());
        director.request(NavIntent::Next, &mut rng);

        director.set_card(card());
        // Completing the run still fires exactly once.
        assert!(director.tick(Duration::from_millis(900), &mut rng).is_some());
    }

    #[test]
    fn partial_ticks_accumulate_toward_completion() {
        let mut rng = XorShiftRandom::seeded(7);
        let mut director = TransitionDirector::new(&effects());
        director.set_card(card());
        director.request(NavIntent::Next, &mut rng);

        for _ in 0..8 {
            assert_eq!(director.tick(Duration::from_millis(100), &mut rng), None);
        }
        assert_eq!(
            director.tick(Duration::from_millis(100), &mut rng),
            Some(NavIntent::Next)
        );
    }
}
