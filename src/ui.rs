//! Terminal front end — progress bar and colored output.
//!
//! Uses `indicatif` for the determinate progress bar and `console` for
//! styling. [`JobProgress`] renders the pipeline's advisory progress
//! events and the final outcome.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::pipeline::{Stage, TerminalEvent};

/// Visual progress indicator for one job run in the terminal.
pub struct JobProgress {
    pb: ProgressBar,
    green: Style,
    red: Style,
}

impl JobProgress {
    /// Start the bar for the given input image.
    pub fn start(image: &str) -> Self {
        let pb = ProgressBar::new(100);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{bar:40.cyan/blue} {pos:>3}% {msg}")
                .expect("invalid template"),
        );
        pb.set_message(format!("queued: {image}"));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
        }
    }

    /// Reflect a stage-entry progress event.
    pub fn update(&self, stage: Stage, percent: u8, message: &str) {
        self.pb.set_position(u64::from(percent));
        self.pb.set_message(format!("{stage}: {message}"));
    }

    /// Finish the bar and print the terminal outcome.
    pub fn complete(&self, event: &TerminalEvent) {
        self.pb.finish_and_clear();
        match event {
            TerminalEvent::Success { output } => {
                println!(
                    "  {} video ready: {}",
                    self.green.apply_to("✓"),
                    output.display()
                );
            }
            TerminalEvent::Failure { kind, message } => {
                println!(
                    "  {} job failed ({kind}): {message}",
                    self.red.apply_to("✗")
                );
            }
        }
    }
}
