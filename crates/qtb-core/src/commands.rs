//! Raw message text -> normalized command token.
//!
//! Mention handling is what lets several bots share a group chat: a slash
//! command addressed to a different bot must be dropped before any state is
//! read. Free text is never mention-stripped; an `@` inside free text (an
//! e-mail address used as an identifier, say) is payload, not addressing.

/// Normalized command for one inbound message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Cancel,
    Add,
    Remove,
    Check,
    /// A `/`-prefixed token that is not a recognized command.
    Unknown(String),
    /// Anything else; payload for whatever status is awaiting input.
    Text(String),
}

/// Route raw text to a command, or `None` when the message is addressed to a
/// different bot and must be ignored entirely.
pub fn route(raw: &str, bot_name: &str) -> Option<Command> {
    let text = raw.trim();
    if !text.starts_with('/') {
        return Some(Command::Text(text.to_string()));
    }

    // Telegram sends group-chat commands as `/cmd@botname`.
    let token = text.split_whitespace().next().unwrap_or(text);
    let (token, mention) = match token.split_once('@') {
        Some((t, m)) => (t, Some(m)),
        None => (token, None),
    };
    if let Some(m) = mention {
        if !m.eq_ignore_ascii_case(bot_name) {
            return None;
        }
    }

    Some(match token {
        "/start" => Command::Start,
        "/cancel" => Command::Cancel,
        "/add" => Command::Add,
        "/remove" => Command::Remove,
        "/check" => Command::Check,
        _ => Command::Unknown(text.to_string()),
    })
}
