use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepId {
    Welcome,
    ModeSelect,
    GithubApp,
    GithubRepo,
    AgentKey,
    Complete,
}

impl StepId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::ModeSelect => "mode-select",
            Self::GithubApp => "github-app",
            Self::GithubRepo => "github-repo",
            Self::AgentKey => "agent-key",
            Self::Complete => "complete",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        STEPS
            .iter()
            .map(|step| step.id)
            .find(|id| id.as_str() == value)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub id: StepId,
    pub title: &'static str,
    pub description: &'static str,
    pub path: &'static str,
}

pub const STEPS: [Step; 6] = [
    Step {
        id: StepId::Welcome,
        title: "Welcome",
        description: "What gangway sets up and why",
        path: "/onboarding/welcome",
    },
    Step {
        id: StepId::ModeSelect,
        title: "Choose a mode",
        description: "Deploy an existing repository or start from a template",
        path: "/onboarding/mode-select",
    },
    Step {
        id: StepId::GithubApp,
        title: "Install the GitHub App",
        description: "Grant the platform access to your repositories",
        path: "/onboarding/github-app",
    },
    Step {
        id: StepId::GithubRepo,
        title: "Pick a repository",
        description: "Select the repository to deploy",
        path: "/onboarding/github-repo",
    },
    Step {
        id: StepId::AgentKey,
        title: "Create an agent key",
        description: "Issue the key your deploy agent authenticates with",
        path: "/onboarding/agent-key",
    },
    Step {
        id: StepId::Complete,
        title: "All set",
        description: "Your project is ready to deploy",
        path: "/onboarding/complete",
    },
];

pub fn step(id: StepId) -> &'static Step {
    &STEPS[step_index(id)]
}

pub fn step_index(id: StepId) -> usize {
    STEPS
        .iter()
        .position(|step| step.id == id)
        .expect("every StepId appears in STEPS")
}

pub fn first_step() -> &'static Step {
    &STEPS[0]
}

pub fn next_step(id: StepId) -> Option<&'static Step> {
    STEPS.get(step_index(id) + 1)
}

pub fn previous_step(id: StepId) -> Option<&'static Step> {
    step_index(id).checked_sub(1).map(|index| &STEPS[index])
}

pub fn is_last_step(id: StepId) -> bool {
    step_index(id) == STEPS.len() - 1
}

/// Derives the active step from a route path by matching each step's
/// final path segment as a substring. Unknown routes resolve to the
/// first step so a stale or malformed route never strands the wizard.
pub fn step_for_path(path: &str) -> StepId {
    STEPS
        .iter()
        .find(|step| {
            let segment = step
                .path
                .rsplit('/')
                .next()
                .expect("step paths are non-empty");
            path.contains(segment)
        })
        .map(|step| step.id)
        .unwrap_or(first_step().id)
}
