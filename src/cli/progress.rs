//! Progress reporting for long-running commands.
//!
//! Spinners are drawn on stderr and only in human mode; machine output and
//! `--quiet` get a hidden bar so callers never branch.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

#[must_use]
pub fn spinner(message: impl Into<String>, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"]),
    );
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_spinner_is_hidden() {
        assert!(spinner("building", false).is_hidden());
    }
}
