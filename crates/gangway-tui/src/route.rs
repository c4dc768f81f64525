use gangway_app::router::Router;

/// The wizard's client-side router: navigation controllers write paths
/// here, and the event loop applies at most one pending route change
/// per frame by mounting the derived step's screen.
#[derive(Debug)]
pub(crate) struct TuiRouter {
    current: String,
    pending: Option<String>,
}

impl TuiRouter {
    pub(crate) fn starting_at(path: &str) -> Self {
        Self {
            current: path.to_string(),
            pending: None,
        }
    }

    pub(crate) fn take_pending(&mut self) -> Option<String> {
        self.pending.take()
    }
}

impl Router for TuiRouter {
    fn navigate(&mut self, path: &str) {
        self.current = path.to_string();
        self.pending = Some(path.to_string());
    }

    fn current_path(&self) -> &str {
        &self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigate_updates_current_and_queues_the_change() {
        let mut router = TuiRouter::starting_at("/onboarding/welcome");
        router.navigate("/onboarding/mode-select");

        assert_eq!(router.current_path(), "/onboarding/mode-select");
        assert_eq!(
            router.take_pending().as_deref(),
            Some("/onboarding/mode-select")
        );
        assert_eq!(router.take_pending(), None);
    }

    #[test]
    fn later_navigation_wins_when_applied_in_one_frame() {
        let mut router = TuiRouter::starting_at("/onboarding/welcome");
        router.navigate("/onboarding/mode-select");
        router.navigate("/onboarding/github-app");

        assert_eq!(
            router.take_pending().as_deref(),
            Some("/onboarding/github-app")
        );
    }
}
