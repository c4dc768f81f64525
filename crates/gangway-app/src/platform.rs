use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Repository visible to the installed GitHub App.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Repository {
    pub full_name: String,
    pub default_branch: String,
    pub private: bool,
}

/// Credential issued for the deploy agent. The token is shown once on
/// the agent-key step and never persisted by gangway.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgentKey {
    pub id: String,
    pub label: String,
    pub token: String,
    pub created_at: String,
}

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("platform request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: Box<ureq::Error>,
    },
    #[error("platform returned status {status} for {endpoint}")]
    Status { endpoint: String, status: u16 },
    #[error("malformed platform response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },
}

/// The deployment platform as the wizard sees it. Failures surface as
/// step-local error states; nothing here touches the transition or
/// backdrop machinery.
pub trait PlatformClient {
    fn list_repositories(&self) -> Result<Vec<Repository>, PlatformError>;
    fn connect_repository(&self, full_name: &str) -> Result<(), PlatformError>;
    fn create_agent_key(&self, label: &str) -> Result<AgentKey, PlatformError>;
}

pub struct HttpPlatform {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpPlatform {
    pub fn new(base_url: &str) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout(Duration::from_secs(15))
                .build(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }
}

#[derive(Debug, Deserialize)]
struct RepositoryList {
    repositories: Vec<Repository>,
}

fn call_error(endpoint: &str, error: ureq::Error) -> PlatformError {
    match error {
        ureq::Error::Status(status, _) => PlatformError::Status {
            endpoint: endpoint.to_string(),
            status,
        },
        other => PlatformError::Transport {
            endpoint: endpoint.to_string(),
            source: Box::new(other),
        },
    }
}

impl PlatformClient for HttpPlatform {
    fn list_repositories(&self) -> Result<Vec<Repository>, PlatformError> {
        let endpoint = "/v1/repositories";
        let response = self
            .agent
            .get(&self.url(endpoint))
            .call()
            .map_err(|error| call_error(endpoint, error))?;

        let parsed: RepositoryList =
            response
                .into_json()
                .map_err(|source| PlatformError::Decode {
                    endpoint: endpoint.to_string(),
                    source,
                })?;
        Ok(parsed.repositories)
    }

    fn connect_repository(&self, full_name: &str) -> Result<(), PlatformError> {
        let endpoint = "/v1/projects";
        self.agent
            .post(&self.url(endpoint))
            .send_json(ureq::json!({ "repository": full_name }))
            .map_err(|error| call_error(endpoint, error))?;
        Ok(())
    }

    fn create_agent_key(&self, label: &str) -> Result<AgentKey, PlatformError> {
        let endpoint = "/v1/agent-keys";
        let response = self
            .agent
            .post(&self.url(endpoint))
            .send_json(ureq::json!({ "label": label }))
            .map_err(|error| call_error(endpoint, error))?;

        response
            .into_json()
            .map_err(|source| PlatformError::Decode {
                endpoint: endpoint.to_string(),
                source,
            })
    }
}
