use gangway_core::step::{StepId, next_step, previous_step, step, step_for_path};
use tracing::debug;

use crate::App;
use crate::router::Router;

/// Where the wizard hands off once onboarding is complete.
pub const EXIT_PATH: &str = "/dashboard";

impl App {
    /// Advances to the step after the one the router is currently on.
    /// At the last step this is a silent no-op so a stray keypress never
    /// routes anywhere undefined.
    pub fn go_to_next(&mut self, router: &mut dyn Router) {
        let current = step_for_path(router.current_path());
        match next_step(current) {
            Some(target) => router.navigate(target.path),
            None => debug!(step = %current, "ignoring next-step request at the last step"),
        }
    }

    pub fn go_to_previous(&mut self, router: &mut dyn Router) {
        let current = step_for_path(router.current_path());
        match previous_step(current) {
            Some(target) => router.navigate(target.path),
            None => debug!(step = %current, "ignoring previous-step request at the first step"),
        }
    }

    pub fn go_to_step(&mut self, id: StepId, router: &mut dyn Router) {
        router.navigate(step(id).path);
    }

    /// Clears persisted progress and routes to the post-onboarding exit.
    pub fn complete_onboarding(&mut self, router: &mut dyn Router) {
        self.progress.clear();
        router.navigate(EXIT_PATH);
    }

    /// Written immediately before handing the user to an external origin
    /// (the GitHub App install page); consumed by [`App::resume_step`] on
    /// the next launch.
    pub fn set_return_step(&mut self, id: StepId) {
        self.progress.set_return_step(id);
    }

    /// Cold-start resume: a pending return step wins over the last step
    /// seen, and an empty store starts the flow from the beginning.
    pub fn resume_step(&mut self) -> StepId {
        self.progress
            .take_return_step()
            .or_else(|| self.progress.current_step())
            .unwrap_or(StepId::Welcome)
    }

    /// Route arrival is the single writer of the persisted current step:
    /// every path change funnels through here, so the store always
    /// reflects the step the user actually reached.
    pub fn on_route_arrived(&mut self, path: &str) -> StepId {
        let id = step_for_path(path);
        self.progress.set_current_step(id);
        id
    }

    pub fn reset_progress(&mut self) {
        self.progress.clear();
    }
}

#[cfg(test)]
mod tests {
    use gangway_core::config::GangwayConfig;
    use gangway_core::progress::{MemoryKeyValue, Progress};
    use gangway_core::step::{STEPS, StepId, step};

    use super::EXIT_PATH;
    use crate::App;
    use crate::router::{RecordingRouter, Router};

    fn app() -> App {
        App::new(
            GangwayConfig::default(),
            Progress::new(Box::new(MemoryKeyValue::new())),
        )
    }

    fn arrive(app: &mut App, router: &RecordingRouter) -> StepId {
        app.on_route_arrived(router.current_path())
    }

    #[test]
    fn five_next_steps_walk_the_whole_flow_in_order() {
        let mut app = app();
        let mut router = RecordingRouter::starting_at(step(StepId::Welcome).path);
        arrive(&mut app, &router);

        for _ in 0..5 {
            app.go_to_next(&mut router);
            arrive(&mut app, &router);
        }

        let visited: Vec<&str> = router.visited.iter().map(String::as_str).collect();
        assert_eq!(
            visited,
            vec![
                "/onboarding/mode-select",
                "/onboarding/github-app",
                "/onboarding/github-repo",
                "/onboarding/agent-key",
                "/onboarding/complete",
            ]
        );
        assert_eq!(app.progress().current_step(), Some(StepId::Complete));
    }

    #[test]
    fn complete_onboarding_clears_storage_and_exits() {
        let mut app = app();
        let mut router = RecordingRouter::starting_at(step(StepId::Complete).path);
        arrive(&mut app, &router);

        app.complete_onboarding(&mut router);

        assert_eq!(router.current_path(), EXIT_PATH);
        assert_eq!(app.progress().current_step(), None);
    }

    #[test]
    fn next_at_last_step_and_previous_at_first_step_are_no_ops() {
        let mut app = app();
        let mut router = RecordingRouter::starting_at(step(StepId::Complete).path);

        app.go_to_next(&mut router);
        assert!(router.visited.is_empty());

        let mut router = RecordingRouter::starting_at(step(StepId::Welcome).path);
        app.go_to_previous(&mut router);
        assert!(router.visited.is_empty());
    }

    #[test]
    fn go_to_step_routes_directly() {
        let mut app = app();
        let mut router = RecordingRouter::starting_at(step(StepId::Welcome).path);

        app.go_to_step(StepId::AgentKey, &mut router);

        assert_eq!(router.current_path(), "/onboarding/agent-key");
    }

    #[test]
    fn resume_prefers_return_step_over_current_step() {
        let mut app = app();
        app.progress_mut().set_current_step(StepId::GithubApp);
        app.set_return_step(StepId::GithubRepo);

        assert_eq!(app.resume_step(), StepId::GithubRepo);
        // The return step is consumed; the next launch resumes normally.
        assert_eq!(app.resume_step(), StepId::GithubApp);
    }

    #[test]
    fn resume_with_empty_storage_starts_at_welcome() {
        let mut app = app();
        assert_eq!(app.resume_step(), StepId::Welcome);
    }

    #[test]
    fn arriving_on_an_unknown_route_lands_on_welcome() {
        let mut app = app();
        assert_eq!(app.on_route_arrived("/totally/elsewhere"), StepId::Welcome);
        assert_eq!(app.progress().current_step(), Some(StepId::Welcome));
    }

    #[test]
    fn every_step_path_round_trips_through_route_arrival() {
        let mut app = app();
        for step in &STEPS {
            assert_eq!(app.on_route_arrived(step.path), step.id);
        }
    }
}
