use std::{
    collections::{BTreeSet, HashMap},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{
    domain::{ConversationId, Status},
    errors::Error,
    Result,
};

/// Port for the per-conversation session store.
///
/// Absence and `Status::Default` are interchangeable by contract: reading a
/// conversation that was never written yields `Default`, and implementations
/// may drop records that are back in the default state.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn status(&self, chat: ConversationId) -> Result<Status>;
    async fn set_status(&self, chat: ConversationId, status: Status) -> Result<()>;

    /// Returns `true` when the identifier was newly added.
    async fn add_identifier(&self, chat: ConversationId, identifier: &str) -> Result<bool>;

    /// Returns `true` when the identifier was present and has been removed.
    async fn remove_identifier(&self, chat: ConversationId, identifier: &str) -> Result<bool>;

    async fn identifiers(&self, chat: ConversationId) -> Result<BTreeSet<String>>;

    /// Administrative: drop every conversation. Environment reset only.
    async fn reset(&self) -> Result<()>;
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct Conversation {
    #[serde(default)]
    status: Status,
    #[serde(default)]
    identifiers: BTreeSet<String>,
}

impl Conversation {
    fn is_default(&self) -> bool {
        self.status == Status::Default && self.identifiers.is_empty()
    }
}

fn prune_default(map: &mut HashMap<ConversationId, Conversation>, chat: ConversationId) {
    if map.get(&chat).is_some_and(Conversation::is_default) {
        map.remove(&chat);
    }
}

/// In-memory store: test isolation and the zero-configuration default.
#[derive(Default)]
pub struct MemorySessionStore {
    conversations: Mutex<HashMap<ConversationId, Conversation>>,
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn status(&self, chat: ConversationId) -> Result<Status> {
        let map = self.conversations.lock().await;
        Ok(map.get(&chat).map(|c| c.status).unwrap_or_default())
    }

    async fn set_status(&self, chat: ConversationId, status: Status) -> Result<()> {
        let mut map = self.conversations.lock().await;
        map.entry(chat).or_default().status = status;
        prune_default(&mut map, chat);
        Ok(())
    }

    async fn add_identifier(&self, chat: ConversationId, identifier: &str) -> Result<bool> {
        let mut map = self.conversations.lock().await;
        Ok(map
            .entry(chat)
            .or_default()
            .identifiers
            .insert(identifier.to_string()))
    }

    async fn remove_identifier(&self, chat: ConversationId, identifier: &str) -> Result<bool> {
        let mut map = self.conversations.lock().await;
        let Some(conversation) = map.get_mut(&chat) else {
            return Ok(false);
        };
        let removed = conversation.identifiers.remove(identifier);
        prune_default(&mut map, chat);
        Ok(removed)
    }

    async fn identifiers(&self, chat: ConversationId) -> Result<BTreeSet<String>> {
        let map = self.conversations.lock().await;
        Ok(map.get(&chat).map(|c| c.identifiers.clone()).unwrap_or_default())
    }

    async fn reset(&self) -> Result<()> {
        self.conversations.lock().await.clear();
        Ok(())
    }
}

/// JSON-file-backed store: the whole conversation map is rewritten after each
/// mutation. Good enough for a single-process bot; a networked store slots in
/// behind the same port.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    conversations: Mutex<HashMap<ConversationId, Conversation>>,
}

#[derive(Serialize, Deserialize)]
struct StoreFile {
    saved_at: String,
    conversations: HashMap<i64, Conversation>,
}

impl FileSessionStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let conversations = match load_store_file(&path)? {
            Some(data) => data
                .conversations
                .into_iter()
                .map(|(k, v)| (ConversationId(k), v))
                .collect(),
            None => HashMap::new(),
        };
        Ok(Self {
            path,
            conversations: Mutex::new(conversations),
        })
    }

    fn persist(&self, map: &HashMap<ConversationId, Conversation>) -> Result<()> {
        let data = StoreFile {
            saved_at: iso_timestamp_utc(),
            conversations: map.iter().map(|(k, v)| (k.0, v.clone())).collect(),
        };
        let txt = serde_json::to_string(&data)?;
        std::fs::write(&self.path, txt)?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn status(&self, chat: ConversationId) -> Result<Status> {
        let map = self.conversations.lock().await;
        Ok(map.get(&chat).map(|c| c.status).unwrap_or_default())
    }

    async fn set_status(&self, chat: ConversationId, status: Status) -> Result<()> {
        let mut map = self.conversations.lock().await;
        map.entry(chat).or_default().status = status;
        prune_default(&mut map, chat);
        self.persist(&map)
    }

    async fn add_identifier(&self, chat: ConversationId, identifier: &str) -> Result<bool> {
        let mut map = self.conversations.lock().await;
        let added = map
            .entry(chat)
            .or_default()
            .identifiers
            .insert(identifier.to_string());
        if added {
            self.persist(&map)?;
        }
        Ok(added)
    }

    async fn remove_identifier(&self, chat: ConversationId, identifier: &str) -> Result<bool> {
        let mut map = self.conversations.lock().await;
        let Some(conversation) = map.get_mut(&chat) else {
            return Ok(false);
        };
        let removed = conversation.identifiers.remove(identifier);
        if removed {
            prune_default(&mut map, chat);
            self.persist(&map)?;
        }
        Ok(removed)
    }

    async fn identifiers(&self, chat: ConversationId) -> Result<BTreeSet<String>> {
        let map = self.conversations.lock().await;
        Ok(map.get(&chat).map(|c| c.identifiers.clone()).unwrap_or_default())
    }

    async fn reset(&self) -> Result<()> {
        let mut map = self.conversations.lock().await;
        map.clear();
        self.persist(&map)
    }
}

fn load_store_file(path: &Path) -> Result<Option<StoreFile>> {
    if !path.exists() {
        return Ok(None);
    }
    let txt = std::fs::read_to_string(path)?;
    if txt.trim().is_empty() {
        return Ok(None);
    }
    let data: StoreFile = serde_json::from_str(&txt)
        .map_err(|e| Error::Store(format!("corrupt session file {}: {e}", path.display())))?;
    Ok(Some(data))
}

fn iso_timestamp_utc() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAT: ConversationId = ConversationId(111_111);

    fn tmp_file(prefix: &str) -> PathBuf {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let pid = std::process::id();
        PathBuf::from(format!("/tmp/{prefix}-{pid}-{ts}.json"))
    }

    #[tokio::test]
    async fn status_defaults_when_unset() {
        let store = MemorySessionStore::default();
        assert_eq!(store.status(CHAT).await.unwrap(), Status::Default);
    }

    #[tokio::test]
    async fn status_roundtrips() {
        let store = MemorySessionStore::default();
        store
            .set_status(CHAT, Status::AwaitingNewIdentifier)
            .await
            .unwrap();
        assert_eq!(
            store.status(CHAT).await.unwrap(),
            Status::AwaitingNewIdentifier
        );

        store.set_status(CHAT, Status::Default).await.unwrap();
        assert_eq!(store.status(CHAT).await.unwrap(), Status::Default);
    }

    #[tokio::test]
    async fn add_is_idempotent() {
        let store = MemorySessionStore::default();
        assert!(store.add_identifier(CHAT, "existing@example.com").await.unwrap());
        assert!(!store.add_identifier(CHAT, "existing@example.com").await.unwrap());

        let ids = store.identifiers(CHAT).await.unwrap();
        assert_eq!(ids.len(), 1);
        assert!(ids.contains("existing@example.com"));
    }

    #[tokio::test]
    async fn remove_absent_is_false_and_leaves_set_unchanged() {
        let store = MemorySessionStore::default();
        store.add_identifier(CHAT, "first@example.com").await.unwrap();

        assert!(!store.remove_identifier(CHAT, "other@example.com").await.unwrap());
        assert_eq!(store.identifiers(CHAT).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn holds_more_than_one_identifier() {
        let store = MemorySessionStore::default();
        for id in ["first@example.com", "second@example.com", "third@example.com"] {
            store.add_identifier(CHAT, id).await.unwrap();
        }
        let ids = store.identifiers(CHAT).await.unwrap();
        assert_eq!(ids.len(), 3);
    }

    #[tokio::test]
    async fn reset_clears_everything() {
        let store = MemorySessionStore::default();
        store.add_identifier(CHAT, "first@example.com").await.unwrap();
        store
            .set_status(CHAT, Status::AwaitingRemovalSelection)
            .await
            .unwrap();

        store.reset().await.unwrap();

        assert_eq!(store.status(CHAT).await.unwrap(), Status::Default);
        assert!(store.identifiers(CHAT).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let path = tmp_file("qtb-session-reopen");

        {
            let store = FileSessionStore::open(&path).unwrap();
            store.add_identifier(CHAT, "kept@example.com").await.unwrap();
            store
                .set_status(CHAT, Status::AwaitingRemovalSelection)
                .await
                .unwrap();
        }

        let store = FileSessionStore::open(&path).unwrap();
        assert_eq!(
            store.status(CHAT).await.unwrap(),
            Status::AwaitingRemovalSelection
        );
        assert!(store
            .identifiers(CHAT)
            .await
            .unwrap()
            .contains("kept@example.com"));

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn file_store_missing_file_is_empty() {
        let path = tmp_file("qtb-session-missing");
        let store = FileSessionStore::open(&path).unwrap();
        assert_eq!(store.status(CHAT).await.unwrap(), Status::Default);
        assert!(store.identifiers(CHAT).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn file_store_rejects_corrupt_file() {
        let path = tmp_file("qtb-session-corrupt");
        std::fs::write(&path, "{ not json").unwrap();

        let err = FileSessionStore::open(&path).unwrap_err();
        assert!(matches!(err, Error::Store(_)));

        let _ = std::fs::remove_file(&path);
    }
}
