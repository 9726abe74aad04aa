//! The seam between the request pipeline and whoever is showing results
//! to the user.

use std::sync::{Mutex, PoisonError};

use tracing::{info, warn};

/// Answer to "you lack permission, log in again?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReauthDecision {
    Confirm,
    Cancel,
}

pub trait Feedback: Send + Sync {
    /// Show an error notification
    fn notify_error(&self, message: &str);

    /// Ask whether to drop the session and log in again
    fn confirm_reauthenticate(&self, message: &str) -> ReauthDecision;

    /// Send the user to the login entry point
    fn redirect_to_login(&self, location: &str);
}

/// Feedback that only logs. Never confirms a forced re-login.
#[derive(Debug, Default)]
pub struct LogFeedback;

impl Feedback for LogFeedback {
    fn notify_error(&self, message: &str) {
        warn!(message, "Request failed");
    }

    fn confirm_reauthenticate(&self, _message: &str) -> ReauthDecision {
        ReauthDecision::Cancel
    }

    fn redirect_to_login(&self, location: &str) {
        info!(location, "Re-authentication required");
    }
}

/// Feedback that records everything it is asked to show.
#[derive(Debug)]
pub struct RecordingFeedback {
    decision: ReauthDecision,
    notifications: Mutex<Vec<String>>,
    confirmations: Mutex<Vec<String>>,
    redirects: Mutex<Vec<String>>,
}

impl RecordingFeedback {
    pub fn new(decision: ReauthDecision) -> Self {
        Self {
            decision,
            notifications: Mutex::new(Vec::new()),
            confirmations: Mutex::new(Vec::new()),
            redirects: Mutex::new(Vec::new()),
        }
    }

    pub fn notifications(&self) -> Vec<String> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn confirmations(&self) -> Vec<String> {
        self.confirmations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn redirects(&self) -> Vec<String> {
        self.redirects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for RecordingFeedback {
    fn default() -> Self {
        Self::new(ReauthDecision::Cancel)
    }
}

impl Feedback for RecordingFeedback {
    fn notify_error(&self, message: &str) {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }

    fn confirm_reauthenticate(&self, message: &str) -> ReauthDecision {
        self.confirmations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
        self.decision
    }

    fn redirect_to_login(&self, location: &str) {
        self.redirects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(location.to_string());
    }
}
