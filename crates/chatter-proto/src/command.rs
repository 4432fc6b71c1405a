//! The client command grammar.
//!
//! One decoded text line maps to exactly one [`Command`] variant. Command
//! keywords are case-sensitive and whitespace-delimited; anything that is
//! not a recognized command is [`Command::Say`] and gets broadcast
//! verbatim, so `/MSG` or `/unknown` fall through to chat rather than
//! erroring.

use crate::error::CommandError;

/// A decoded client command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/msg <user> <text...>` - private message to one user.
    Msg {
        /// Target username.
        to: String,
        /// Message body, internal whitespace preserved.
        text: String,
    },
    /// `/who` - list registered usernames.
    Who,
    /// `/nick <name>` - change username.
    Nick {
        /// Desired new username.
        name: String,
    },
    /// `/quit` - leave the chat.
    Quit,
    /// `/help` - command summary.
    Help,
    /// `/sendfile <user> <filename> <size>` - start a file transfer.
    SendFile {
        /// Recipient username.
        to: String,
        /// Declared filename.
        filename: String,
        /// Declared payload size in bytes (always > 0).
        size: u64,
    },
    /// Any other non-empty line: broadcast verbatim.
    Say {
        /// The chat text.
        text: String,
    },
}

const MSG_USAGE: &str = "/msg <user> <message>";
const NICK_USAGE: &str = "/nick <name>";
const SENDFILE_USAGE: &str = "/sendfile <user> <filename> <size>";

impl Command {
    /// Decode one line into a command.
    ///
    /// The line may still carry its `\r\n` terminator; it is stripped
    /// before matching.
    pub fn parse(line: &str) -> Result<Command, CommandError> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Err(CommandError::Empty);
        }

        match line {
            "/who" => return Ok(Command::Who),
            "/quit" => return Ok(Command::Quit),
            "/help" => return Ok(Command::Help),
            _ => {}
        }

        if line == "/msg" || line.starts_with("/msg ") {
            return parse_msg(line);
        }
        if line == "/nick" || line.starts_with("/nick ") {
            return parse_nick(line);
        }
        if line == "/sendfile" || line.starts_with("/sendfile ") {
            return parse_sendfile(line);
        }

        Ok(Command::Say {
            text: line.to_string(),
        })
    }

    /// Short keyword for logging.
    pub fn keyword(&self) -> &'static str {
        match self {
            Command::Msg { .. } => "msg",
            Command::Who => "who",
            Command::Nick { .. } => "nick",
            Command::Quit => "quit",
            Command::Help => "help",
            Command::SendFile { .. } => "sendfile",
            Command::Say { .. } => "say",
        }
    }
}

fn parse_msg(line: &str) -> Result<Command, CommandError> {
    let mut parts = line.splitn(3, ' ');
    let _keyword = parts.next();
    let to = parts.next().unwrap_or("");
    let text = parts.next().unwrap_or("");
    if to.is_empty() || text.trim().is_empty() {
        return Err(CommandError::Usage(MSG_USAGE));
    }
    Ok(Command::Msg {
        to: to.to_string(),
        text: text.to_string(),
    })
}

fn parse_nick(line: &str) -> Result<Command, CommandError> {
    let mut parts = line.splitn(2, ' ');
    let _keyword = parts.next();
    let name = parts.next().unwrap_or("").trim();
    if name.is_empty() {
        return Err(CommandError::Usage(NICK_USAGE));
    }
    Ok(Command::Nick {
        name: name.to_string(),
    })
}

fn parse_sendfile(line: &str) -> Result<Command, CommandError> {
    let mut parts = line.split_whitespace();
    let _keyword = parts.next();
    let (Some(to), Some(filename), Some(size)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(CommandError::Usage(SENDFILE_USAGE));
    };
    // A negative size fails the u64 parse; zero is rejected explicitly.
    let size: u64 = size
        .parse()
        .map_err(|_| CommandError::InvalidSize(size.to_string()))?;
    if size == 0 {
        return Err(CommandError::InvalidSize("0".to_string()));
    }
    Ok(Command::SendFile {
        to: to.to_string(),
        filename: filename.to_string(),
        size,
    })
}
