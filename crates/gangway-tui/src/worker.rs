use std::sync::mpsc::{self, Receiver};
use std::thread;

use gangway_app::platform::{AgentKey, HttpPlatform, PlatformClient, Repository};

/// Result of a platform call, tagged with the request token so stale
/// responses from a superseded request can be discarded.
#[derive(Debug)]
pub(crate) enum PlatformEvent {
    Repositories {
        token: u64,
        result: Result<Vec<Repository>, String>,
    },
    Connected {
        token: u64,
        result: Result<(), String>,
    },
    KeyCreated {
        token: u64,
        result: Result<AgentKey, String>,
    },
}

/// Runs platform calls off the UI thread and reports back over a
/// channel the event loop drains between frames.
pub(crate) trait PlatformWorker: Send + Sync {
    fn spawn_list_repositories(&self, token: u64) -> Receiver<PlatformEvent>;
    fn spawn_connect_repository(&self, full_name: String, token: u64) -> Receiver<PlatformEvent>;
    fn spawn_create_agent_key(&self, label: String, token: u64) -> Receiver<PlatformEvent>;
}

pub(crate) struct HttpPlatformWorker {
    api_base_url: String,
}

impl HttpPlatformWorker {
    pub(crate) fn new(api_base_url: &str) -> Self {
        Self {
            api_base_url: api_base_url.to_string(),
        }
    }
}

impl PlatformWorker for HttpPlatformWorker {
    fn spawn_list_repositories(&self, token: u64) -> Receiver<PlatformEvent> {
        let base_url = self.api_base_url.clone();
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let platform = HttpPlatform::new(&base_url);
            let result = platform
                .list_repositories()
                .map_err(|error| error.to_string());
            let _ = sender.send(PlatformEvent::Repositories { token, result });
        });
        receiver
    }

    fn spawn_connect_repository(&self, full_name: String, token: u64) -> Receiver<PlatformEvent> {
        let base_url = self.api_base_url.clone();
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let platform = HttpPlatform::new(&base_url);
            let result = platform
                .connect_repository(&full_name)
                .map_err(|error| error.to_string());
            let _ = sender.send(PlatformEvent::Connected { token, result });
        });
        receiver
    }

    fn spawn_create_agent_key(&self, label: String, token: u64) -> Receiver<PlatformEvent> {
        let base_url = self.api_base_url.clone();
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let platform = HttpPlatform::new(&base_url);
            let result = platform
                .create_agent_key(&label)
                .map_err(|error| error.to_string());
            let _ = sender.send(PlatformEvent::KeyCreated { token, result });
        });
        receiver
    }
}
