//! Progress reporting: a count-style bar for the annotation pass.

use indicatif::{ProgressBar, ProgressStyle};

/// Count-style progress bar (items processed out of total), with an optional label.
/// Draws to stderr so it never mixes with the summary on stdout.
pub fn make_count_progress(total: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::with_template(
        "{spinner:.green} {msg} {pos}/{len} [{bar:.cyan/blue}] {percent:>3}%  \
         elapsed: {elapsed_precise}  eta: {eta_precise}"
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("█▉▊▋▌▍▎▏  ");
    pb.set_style(style);
    if !label.is_empty() {
        pb.set_message(label.to_string());
    }
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Optional bar: `None` when progress is off, so callers can `if let Some(pb)`.
pub fn maybe_count_progress(enabled: bool, total: u64, label: &str) -> Option<ProgressBar> {
    if enabled && total > 0 {
        Some(make_count_progress(total, label))
    } else {
        None
    }
}
