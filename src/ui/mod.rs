//! Progress reporting for one-shot (`--once`) runs.
//!
//! The supervised watch loop runs unattended and logs through `tracing`
//! instead; this reporter is only wired into `Controller::run_once`, where
//! a human is typically watching the terminal.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

pub struct PassReporter {
    spinner: ProgressBar,
}

impl PassReporter {
    pub fn start(task_name: &str) -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.enable_steady_tick(std::time::Duration::from_millis(120));
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
        }
        spinner.set_message(format!("syncing {task_name}..."));
        Self { spinner }
    }

    pub fn finish(self, copies: u64, deletions: u64, failures: u64) {
        let summary = format!(
            "{} copies, {} deletions, {}",
            copies,
            deletions,
            if failures == 0 {
                style("0 failures".to_string()).green().to_string()
            } else {
                style(format!("{failures} failures")).red().to_string()
            }
        );
        self.spinner.finish_with_message(summary);
    }

    pub fn finish_error(self, message: &str) {
        self.spinner
            .finish_with_message(style(message.to_string()).red().to_string());
    }
}
