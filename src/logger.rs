//! Terminal logging for pipeline tasks.
//!
//! Every task reports through `log!("task"; ...)`, which prints a colored
//! `[task]` prefix and keeps single-line messages inside the terminal
//! width. Multi-line messages (error chains from a failed task) are
//! printed whole so nothing is cut out of a backtrace.

use colored::Colorize;
use crossterm::terminal;
use std::{
    io::{Write, stdout},
    sync::OnceLock,
};

/// Fallback width when the terminal size cannot be queried (pipes, CI).
const FALLBACK_WIDTH: usize = 120;

static WIDTH: OnceLock<usize> = OnceLock::new();

#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

pub fn log(module: &str, message: &str) {
    let prefix = format!("[{module}]");
    let prefix = match module {
        "serve" => prefix.bright_blue().bold(),
        "watch" | "reload" => prefix.bright_green().bold(),
        "error" | "lint" => prefix.bright_red().bold(),
        _ => prefix.bright_yellow().bold(),
    };

    let message = if message.contains('\n') {
        message
    } else {
        // "[module] " takes module + 3 columns of the line
        let budget = terminal_width().saturating_sub(module.len() + 3);
        clip(message, budget)
    };

    let mut out = stdout().lock();
    writeln!(out, "{prefix} {message}").ok();
    out.flush().ok();
}

fn terminal_width() -> usize {
    *WIDTH.get_or_init(|| {
        terminal::size()
            .map(|(cols, _)| cols as usize)
            .unwrap_or(FALLBACK_WIDTH)
    })
}

/// Cut `s` down to at most `max` bytes without splitting a character.
fn clip(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
