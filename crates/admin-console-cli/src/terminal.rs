//! Terminal prompts and the `Feedback` implementation for the CLI.

use std::io::{self, Write};

use anyhow::{bail, Result};
use tracing::debug;

use admin_console_core::{Feedback, ReauthDecision};

/// Shortest password the server accepts
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Reports pipeline errors on stderr and asks questions on the terminal.
pub struct TerminalFeedback;

impl Feedback for TerminalFeedback {
    fn notify_error(&self, message: &str) {
        eprintln!("Error: {}", message);
    }

    fn confirm_reauthenticate(&self, message: &str) -> ReauthDecision {
        match confirm(message) {
            Ok(true) => ReauthDecision::Confirm,
            Ok(false) => ReauthDecision::Cancel,
            Err(e) => {
                debug!(error = %e, "Could not read confirmation");
                ReauthDecision::Cancel
            }
        }
    }

    fn redirect_to_login(&self, location: &str) {
        debug!(location, "Login required");
        eprintln!("Run `admin-console login` to start a new session.");
    }
}

/// Ask a yes/no question; anything but "y" or "yes" is a no
pub fn confirm(question: &str) -> io::Result<bool> {
    let answer = prompt_line(&format!("{} [y/N] ", question))?;
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
}

pub fn prompt_line(prompt: &str) -> io::Result<String> {
    eprint!("{}", prompt);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

pub fn prompt_password(prompt: &str) -> io::Result<String> {
    rpassword::prompt_password(prompt)
}

/// Prompt for a new password twice and check it before it reaches the server
pub fn prompt_new_password(prompt: &str) -> Result<String> {
    let password = prompt_password(prompt)?;
    validate_password(&password)?;
    let again = prompt_password("Repeat password: ")?;
    if password != again {
        bail!("Passwords do not match");
    }
    Ok(password)
}

fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        bail!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        );
    }
    Ok(())
}
