use serde::{Deserialize, Serialize};

/// Chat/conversation id (numeric, one per chat).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConversationId(pub i64);

/// Per-conversation dispatcher status.
///
/// The stored status is the one piece of state that makes the dispatcher a
/// state machine: exactly one per conversation, and a conversation that was
/// never written reads as `Default`. The serialized (snake_case) forms are the
/// stable on-disk representation used by persistent stores.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Default,
    AwaitingNewIdentifier,
    AwaitingRemovalSelection,
}
