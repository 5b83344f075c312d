//! The conversation state machine.
//!
//! One inbound message = one turn: route the text, read the conversation's
//! status, apply the transition table, commit the next status, send at most
//! one reply. The dispatcher never caches conversation state across turns;
//! every turn re-reads the store.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{error, warn};

use crate::{
    commands::{route, Command},
    domain::{ConversationId, Status},
    lookup::{Lookup, LookupClient},
    messages,
    messaging::{
        port::MessagingPort,
        types::{ReplyMarkup, SelectList},
    },
    session::SessionStore,
    Result,
};

pub struct Dispatcher {
    store: Arc<dyn SessionStore>,
    lookup: Arc<dyn LookupClient>,
    messenger: Arc<dyn MessagingPort>,
}

/// What one turn decided: at most one reply, at most one status to commit.
struct Turn {
    reply: Option<(String, ReplyMarkup)>,
    next_status: Option<Status>,
}

impl Turn {
    fn silent() -> Self {
        Self {
            reply: None,
            next_status: None,
        }
    }

    fn reply(text: impl Into<String>) -> Self {
        Self::reply_with(text, ReplyMarkup::None)
    }

    fn reply_with(text: impl Into<String>, markup: ReplyMarkup) -> Self {
        Self {
            reply: Some((text.into(), markup)),
            next_status: None,
        }
    }

    fn with_status(mut self, status: Status) -> Self {
        self.next_status = Some(status);
        self
    }
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn SessionStore>,
        lookup: Arc<dyn LookupClient>,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        Self {
            store,
            lookup,
            messenger,
        }
    }

    /// Entry point for the transport: handle one inbound message.
    ///
    /// Never propagates an error back to the transport; a failed turn becomes
    /// one generic failure reply and a log line.
    pub async fn on_message(&self, chat: ConversationId, raw_text: &str, bot_name: &str) {
        let Some(command) = route(raw_text, bot_name) else {
            return; // addressed to another bot
        };

        if let Err(e) = self.run_turn(chat, command).await {
            error!(chat = chat.0, "turn failed: {e}");
            if let Err(e) = self
                .messenger
                .reply(chat, messages::UNKNOWN_ERROR, ReplyMarkup::None)
                .await
            {
                error!(chat = chat.0, "failure reply not delivered: {e}");
            }
        }
    }

    async fn run_turn(&self, chat: ConversationId, command: Command) -> Result<()> {
        let status = self.store.status(chat).await?;
        let turn = self.transition(chat, status, command).await?;

        if let Some(next) = turn.next_status {
            if next != status {
                self.store.set_status(chat, next).await?;
            }
        }
        if let Some((text, markup)) = turn.reply {
            self.messenger.reply(chat, &text, markup).await?;
        }
        Ok(())
    }

    /// The transition table: one arm per (command, status) row.
    async fn transition(
        &self,
        chat: ConversationId,
        status: Status,
        command: Command,
    ) -> Result<Turn> {
        match command {
            Command::Start => Ok(Turn::reply(messages::WELCOME)),
            Command::Cancel => Ok(cancel(status)),
            Command::Add => {
                Ok(Turn::reply(messages::ADD_IDENTIFIER).with_status(Status::AwaitingNewIdentifier))
            }
            Command::Remove => self.begin_removal(chat).await,
            Command::Check => self.check(chat).await,
            // A pending prompt consumes any unrecognized input, slash or not;
            // only in the default status do the two kinds diverge.
            Command::Unknown(text) => match status {
                Status::AwaitingNewIdentifier => self.add_identifier(chat, &text).await,
                Status::AwaitingRemovalSelection => self.remove_identifier(chat, &text).await,
                Status::Default => Ok(Turn::reply(messages::UNKNOWN_COMMAND)),
            },
            Command::Text(text) => match status {
                Status::AwaitingNewIdentifier => self.add_identifier(chat, &text).await,
                Status::AwaitingRemovalSelection => self.remove_identifier(chat, &text).await,
                Status::Default => Ok(Turn::silent()),
            },
        }
    }

    async fn begin_removal(&self, chat: ConversationId) -> Result<Turn> {
        let identifiers = self.store.identifiers(chat).await?;
        if identifiers.is_empty() {
            return Ok(Turn::reply(messages::NO_IDENTIFIERS));
        }
        Ok(Turn::reply_with(
            messages::REMOVE_IDENTIFIER,
            ReplyMarkup::Select(SelectList::new(identifiers)),
        )
        .with_status(Status::AwaitingRemovalSelection))
    }

    async fn check(&self, chat: ConversationId) -> Result<Turn> {
        let identifiers = self.store.identifiers(chat).await?;
        if identifiers.is_empty() {
            return Ok(Turn::reply(messages::NO_IDENTIFIERS));
        }

        let outcomes = join_all(identifiers.iter().map(|id| self.lookup.lookup(id))).await;

        // A failure for any identifier voids the whole turn: one generic
        // message, no partial snapshot.
        let mut lines = Vec::with_capacity(outcomes.len());
        for (identifier, outcome) in identifiers.iter().zip(outcomes) {
            match outcome {
                Lookup::Found { position, total } => {
                    lines.push(format!("{identifier} -> #{position} of #{total}"));
                }
                Lookup::NotFound => lines.push(format!("{identifier} -> not found")),
                Lookup::Failure(reason) => {
                    warn!(chat = chat.0, %identifier, "lookup failed: {reason}");
                    return Ok(Turn::reply(messages::UNKNOWN_ERROR));
                }
            }
        }
        Ok(Turn::reply(lines.join("\n")))
    }

    async fn add_identifier(&self, chat: ConversationId, input: &str) -> Result<Turn> {
        let identifier = input.trim();
        if identifier.is_empty() {
            // Empty input re-prompts without a status change.
            return Ok(Turn::reply(messages::ADD_IDENTIFIER));
        }

        let added = self.store.add_identifier(chat, identifier).await?;
        let text = if added {
            messages::IDENTIFIER_ADDED
        } else {
            messages::IDENTIFIER_ALREADY_PRESENT
        };
        Ok(Turn::reply(text).with_status(Status::Default))
    }

    async fn remove_identifier(&self, chat: ConversationId, input: &str) -> Result<Turn> {
        let identifier = input.trim();
        let removed = if identifier.is_empty() {
            false
        } else {
            self.store.remove_identifier(chat, identifier).await?
        };

        if removed {
            Ok(
                Turn::reply_with(messages::IDENTIFIER_REMOVED, ReplyMarkup::Clear)
                    .with_status(Status::Default),
            )
        } else {
            Ok(Turn::reply(messages::IDENTIFIER_NOT_FOUND))
        }
    }
}

fn cancel(status: Status) -> Turn {
    match status {
        Status::Default => Turn::reply(messages::NO_ACTIVE_COMMAND),
        // Leaving the removal prompt also takes its selection list down.
        Status::AwaitingRemovalSelection => {
            Turn::reply_with(messages::COMMAND_CANCELLED, ReplyMarkup::Clear)
                .with_status(Status::Default)
        }
        Status::AwaitingNewIdentifier => {
            Turn::reply(messages::COMMAND_CANCELLED).with_status(Status::Default)
        }
    }
}
