use parking_lot::Mutex;
use tracing::info;

/// Where forced navigations (login redirects, post-login targets) go
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: &str);
}

/// Only logs the target
#[derive(Debug, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, target: &str) {
        info!("Navigate to {}", target);
    }
}

/// Records every navigation, for tests and embedding hosts that poll
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<String> {
        self.history.lock().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.history.lock().last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: &str) {
        self.history.lock().push(target.to_string());
    }
}
