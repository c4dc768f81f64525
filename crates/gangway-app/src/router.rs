/// Client-side route port. The host owns the actual screen switch; the
/// navigation controller only issues path changes and reads the current
/// path back.
pub trait Router {
    fn navigate(&mut self, path: &str);
    fn current_path(&self) -> &str;
}

/// In-memory router for tests and headless runs: applies every
/// navigation immediately and remembers the order they arrived in.
#[derive(Debug, Default)]
pub struct RecordingRouter {
    current: String,
    pub visited: Vec<String>,
}

impl RecordingRouter {
    pub fn starting_at(path: &str) -> Self {
        Self {
            current: path.to_string(),
            visited: Vec::new(),
        }
    }
}

impl Router for RecordingRouter {
    fn navigate(&mut self, path: &str) {
        self.current = path.to_string();
        self.visited.push(path.to_string());
    }

    fn current_path(&self) -> &str {
        &self.current
    }
}
