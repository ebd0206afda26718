//! Console report
//!
//! Every check prints one line per message line:
//!
//! ```text
//!   OK     : basic-route                    Successfully verified ...
//!   Failed : basic-route                    Status code unexpected ...
//!   ...    : basic-route                    Deploying ... kubectl ...
//!   ->     : basic-route                    Testing basic-route
//! ```

use colored::{ColoredString, Colorize};

/// Width of the name column
const NAME_WIDTH: usize = 30;

/// Kind of status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Failed,
    Progress,
    Note,
}

impl Status {
    fn label(self) -> ColoredString {
        match self {
            Status::Ok => "OK    ".green().bold(),
            Status::Failed => "Failed".magenta().bold(),
            Status::Progress => "...   ".bright_black().bold(),
            Status::Note => "->    ".normal(),
        }
    }
}

/// Format the status lines for `msg`, one per line of the message
pub fn format_lines(status: Status, name: &str, msg: &str) -> Vec<String> {
    let label = status.label();
    msg.split('\n')
        .map(|line| format!("  {} : {:<width$} {}", label, name, line, width = NAME_WIDTH))
        .collect()
}

fn emit(status: Status, name: &str, msg: &str) {
    for line in format_lines(status, name, msg) {
        println!("{}", line);
    }
}

/// A check passed
pub fn ok(name: &str, msg: &str) {
    emit(Status::Ok, name, msg);
}

/// A check failed
pub fn fail(name: &str, msg: &str) {
    emit(Status::Failed, name, msg);
}

/// Work in progress
pub fn warn(name: &str, msg: &str) {
    emit(Status::Progress, name, msg);
}

/// Informational
pub fn note(name: &str, msg: &str) {
    emit(Status::Note, name, msg);
}
