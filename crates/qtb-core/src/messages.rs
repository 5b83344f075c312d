//! User-visible replies, kept in one place so handlers and tests agree.

pub const WELCOME: &str = "Welcome! This bot keeps an eye on your place in the waiting queue.\n\n\
/add - watch a new identifier\n\
/remove - stop watching an identifier\n\
/check - check the current positions\n\
/cancel - cancel the current command";

pub const ADD_IDENTIFIER: &str = "Please, enter the identifier to watch:";
pub const IDENTIFIER_ADDED: &str = "Ok, I will keep an eye on it";
pub const IDENTIFIER_ALREADY_PRESENT: &str = "Identifier already present";

pub const REMOVE_IDENTIFIER: &str = "Please, choose the identifier to remove:";
pub const IDENTIFIER_REMOVED: &str = "Ok, removed";
pub const IDENTIFIER_NOT_FOUND: &str = "Identifier not found, please try again:";

pub const NO_IDENTIFIERS: &str = "No identifiers to watch. Use /add to add one.";

pub const COMMAND_CANCELLED: &str = "Command cancelled";
pub const NO_ACTIVE_COMMAND: &str = "No active command to cancel. I go back sleeping...";
pub const UNKNOWN_COMMAND: &str = "Unknown command";

pub const UNKNOWN_ERROR: &str = "Unknown error, probably the queue service has changed something...";
