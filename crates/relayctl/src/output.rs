//! Terminal presentation for relayctl commands
//!
//! Results go to stdout, problems to stderr, so `relayctl binaries list`
//! stays pipeable while warnings are still visible.

use console::{style, StyledObject};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

#[derive(Clone, Copy)]
enum Status {
    Done,
    Failed,
    Attention,
    Note,
}

impl Status {
    fn glyph(self) -> StyledObject<&'static str> {
        match self {
            Self::Done => style("✓").green().bold(),
            Self::Failed => style("✗").red().bold(),
            Self::Attention => style("!").yellow().bold(),
            Self::Note => style("·").cyan(),
        }
    }

    fn emit(self, msg: &str) {
        match self {
            Self::Done | Self::Note => println!("{} {}", self.glyph(), msg),
            Self::Failed | Self::Attention => eprintln!("{} {}", self.glyph(), msg),
        }
    }
}

pub fn success(msg: &str) {
    Status::Done.emit(msg);
}

pub fn error(msg: &str) {
    Status::Failed.emit(msg);
}

pub fn warning(msg: &str) {
    Status::Attention.emit(msg);
}

pub fn info(msg: &str) {
    Status::Note.emit(msg);
}

/// Section title, separated from the previous output by a blank line
pub fn header(title: &str) {
    println!("\n{}", style(title).bold());
}

/// Indented detail line under the current section
pub fn kv(key: &str, value: &str) {
    println!("    {:<16} {}", style(key).dim(), value);
}

/// `binary old -> new`, with a placeholder for a binary never installed
pub fn version_change(binary: &str, from: Option<&str>, to: &str) -> String {
    format!(
        "{} {} -> {}",
        binary,
        style(from.unwrap_or("(none)")).dim(),
        style(to).bold()
    )
}

/// Spinner for calls without byte-level progress (release checks, service control)
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg} {elapsed:.dim}")
            .expect("Invalid spinner template")
            .tick_strings(&["-", "\\", "|", "/", " "]),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
