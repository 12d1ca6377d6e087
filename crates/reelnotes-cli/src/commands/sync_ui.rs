use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

/// Spinner shown while a sync runs; falls back to structured logging off a terminal
pub struct SyncUI {
    spinner: ProgressBar,
    interactive: bool,
}

impl SyncUI {
    pub fn new(enabled: bool) -> Self {
        let interactive = enabled && is_interactive();

        let spinner = if interactive {
            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
            {
                spinner.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
            }
            spinner.enable_steady_tick(Duration::from_millis(100));
            spinner
        } else {
            tracing::info!(
                operation = "ui_init",
                mode = "non_interactive",
                "Running in non-interactive mode - spinner disabled, using structured logging"
            );
            ProgressBar::hidden()
        };

        Self { spinner, interactive }
    }

    pub fn set_message(&self, msg: impl Into<String>) {
        let msg = msg.into();
        if self.interactive {
            self.spinner.set_message(msg);
        } else {
            tracing::info!(operation = "progress", message = %msg, "Progress update");
        }
    }

    pub fn finish(&self) {
        if self.interactive {
            self.spinner.finish_and_clear();
        }
    }
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}
