//! Location changes requested by the library (the 401 redirect, the post-login
//! landing). The embedding application decides what "navigating" means.

use std::sync::Mutex;

use tracing::info;

pub const LOGIN_ROUTE: &str = "/login";
pub const HOME_ROUTE: &str = "/";

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Keeps every requested route in order. Used by the CLI to report where the
/// user would have been sent, and by tests to observe redirects.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<String> {
        self.lock().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.lock().last().cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        info!(event_name = "navigation", route, "navigating");
        self.lock().push(route.to_string());
    }
}
