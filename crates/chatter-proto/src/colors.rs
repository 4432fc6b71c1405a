//! ANSI color helpers for server replies.
//!
//! Replies carry plain ANSI escape sequences; clients that do not render
//! them still see the text. Every colored line is reset at the end so a
//! misbehaving terminal never bleeds color into the next line.

/// Red - error replies.
pub const RED: &str = "\u{1b}[31m";
/// Green - confirmations and acknowledgments.
pub const GREEN: &str = "\u{1b}[32m";
/// Yellow - join/rename notices.
pub const YELLOW: &str = "\u{1b}[33m";
/// Blue - query replies.
pub const BLUE: &str = "\u{1b}[34m";
/// Purple - identity changes addressed to the user themselves.
pub const PURPLE: &str = "\u{1b}[35m";
/// Cyan - server information.
pub const CYAN: &str = "\u{1b}[36m";
/// Orange - transfer notices.
pub const ORANGE: &str = "\u{1b}[38;5;208m";
/// Reset.
pub const RESET: &str = "\u{1b}[0m";

/// Wrap `text` in a color code and a trailing reset.
pub fn paint(color: &str, text: &str) -> String {
    format!("{color}{text}{RESET}")
}
