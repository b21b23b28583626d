//! Conversation state store
//!
//! Keeps per-conversation history in memory. Turns on one conversation are
//! serialized by a per-session `tokio::sync::Mutex`: a request takes a
//! [`TurnGuard`] for the whole turn and commits both messages at once, so a
//! failed or cancelled turn leaves the history untouched.

use crate::error::{Error, Result};
use crate::orchestrator::StateSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Speaker of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The assistant
    Assistant,
}

impl Role {
    /// Prefix used when rendering context lines
    #[must_use]
    pub fn prefix(&self) -> &'static str {
        match self {
            Role::User => "用户",
            Role::Assistant => "助手",
        }
    }
}

/// One message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Speaker
    pub role: Role,
    /// Message text
    pub text: String,
    /// When it was recorded
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// History of one conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSession {
    /// Conversation id
    pub conversation_id: Uuid,
    /// Messages in order
    pub turns: Vec<Turn>,
    /// Summary of the last completed orchestration
    pub last_state: Option<StateSnapshot>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last read or write
    pub last_accessed_at: DateTime<Utc>,
}

impl ConversationSession {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            conversation_id: Uuid::new_v4(),
            turns: Vec::new(),
            last_state: None,
            created_at: now,
            last_accessed_at: now,
        }
    }

    fn touch(&mut self) {
        self.last_accessed_at = Utc::now();
    }

    /// Last `n` messages as `用户: ...` / `助手: ...` lines
    #[must_use]
    pub fn context(&self, n: usize) -> String {
        let skip = self.turns.len().saturating_sub(n);
        self.turns[skip..]
            .iter()
            .map(|t| format!("{}: {}", t.role.prefix(), t.text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn snapshot(&self, recent: usize) -> ConversationSnapshot {
        let skip = self.turns.len().saturating_sub(recent);
        ConversationSnapshot {
            conversation_id: self.conversation_id,
            turn_count: self.turns.len(),
            recent_turns: self.turns[skip..].to_vec(),
            last_state: self.last_state.clone(),
            created_at: self.created_at,
            last_accessed_at: self.last_accessed_at,
        }
    }
}

/// Serializable summary of a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSnapshot {
    /// Conversation id
    pub conversation_id: Uuid,
    /// Total number of messages
    pub turn_count: usize,
    /// Most recent messages
    pub recent_turns: Vec<Turn>,
    /// Summary of the last completed orchestration
    pub last_state: Option<StateSnapshot>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last read or write
    pub last_accessed_at: DateTime<Utc>,
}

/// Store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Idle time after which a conversation expires
    pub ttl: Duration,
    /// Maximum live conversations
    pub max_sessions: usize,
    /// Messages rendered into turn context
    pub context_window: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(2 * 60 * 60),
            max_sessions: 1000,
            context_window: 5,
        }
    }
}

type SharedSession = Arc<Mutex<ConversationSession>>;

/// In-memory conversation store
pub struct ConversationStore {
    sessions: RwLock<HashMap<Uuid, SharedSession>>,
    config: StoreConfig,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl ConversationStore {
    /// Create a store
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Store configuration
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Return the session for `id`, or a fresh one when `id` is `None`.
    ///
    /// An unknown id is an error, never a silently new session.
    pub async fn get_or_create(&self, id: Option<Uuid>) -> Result<ConversationSession> {
        match id {
            Some(id) => {
                let shared = self.shared(id).await?;
                let mut session = shared.lock().await;
                session.touch();
                Ok(session.clone())
            }
            None => Ok(self.create().await),
        }
    }

    async fn create(&self) -> ConversationSession {
        let session = ConversationSession::new();
        let mut sessions = self.sessions.write().await;

        if sessions.len() >= self.config.max_sessions {
            evict_idle_lru(&mut sessions);
        }

        let entry = Arc::new(Mutex::new(session.clone()));
        sessions.insert(session.conversation_id, entry);
        info!(
            conversation_id = %session.conversation_id,
            live = sessions.len(),
            "Conversation created"
        );
        session
    }

    async fn shared(&self, id: Uuid) -> Result<SharedSession> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::SessionNotFound(id.to_string()))
    }

    /// Append one message
    pub async fn append_turn(&self, id: Uuid, role: Role, text: impl Into<String>) -> Result<()> {
        let shared = self.shared(id).await?;
        let mut session = shared.lock().await;
        session.turns.push(Turn::new(role, text));
        session.touch();
        Ok(())
    }

    /// Serializable summary with the most recent messages
    pub async fn snapshot_state(&self, id: Uuid) -> Result<ConversationSnapshot> {
        let shared = self.shared(id).await?;
        let session = shared.lock().await;
        Ok(session.snapshot(self.config.context_window))
    }

    /// Last `n` messages rendered as context lines
    pub async fn context(&self, id: Uuid, n: usize) -> Result<String> {
        let shared = self.shared(id).await?;
        let session = shared.lock().await;
        Ok(session.context(n))
    }

    /// Lock the conversation for one turn.
    ///
    /// Waits while another turn on the same id is in flight.
    pub async fn begin_turn(&self, id: Uuid) -> Result<TurnGuard> {
        let shared = self.shared(id).await?;
        let mut guard = shared.lock_owned().await;
        guard.touch();
        debug!(conversation_id = %id, "Turn started");
        Ok(TurnGuard {
            session: guard,
            context_window: self.config.context_window,
        })
    }

    /// Remove a conversation
    pub async fn delete(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!(conversation_id = %id, "Conversation deleted");
        }
        removed
    }

    /// Number of live conversations
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether the store holds no conversations
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drop conversations idle for longer than the TTL.
    ///
    /// Conversations with a turn in flight are kept.
    pub async fn cleanup_expired(&self) -> usize {
        let ttl = self.config.ttl;
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|_, shared| match shared.try_lock() {
            Ok(session) => (now - session.last_accessed_at).to_std().unwrap_or_default() <= ttl,
            Err(_) => true,
        });

        let removed = before - sessions.len();
        if removed > 0 {
            info!(removed, live = sessions.len(), "Expired conversations removed");
        }
        removed
    }
}

fn evict_idle_lru(sessions: &mut HashMap<Uuid, SharedSession>) {
    let oldest = sessions
        .iter()
        .filter_map(|(id, shared)| {
            shared
                .try_lock()
                .ok()
                .map(|session| (*id, session.last_accessed_at))
        })
        .min_by_key(|(_, accessed)| *accessed)
        .map(|(id, _)| id);

    match oldest {
        Some(id) => {
            sessions.remove(&id);
            info!(conversation_id = %id, "Evicted least recently used conversation");
        }
        None => warn!(
            live = sessions.len(),
            "Session limit reached but every conversation is busy"
        ),
    }
}

/// Exclusive access to one conversation for the duration of a turn
pub struct TurnGuard {
    session: OwnedMutexGuard<ConversationSession>,
    context_window: usize,
}

impl TurnGuard {
    /// Conversation id
    #[must_use]
    pub fn conversation_id(&self) -> Uuid {
        self.session.conversation_id
    }

    /// Messages committed so far
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.session.turns.len()
    }

    /// Context lines over the configured window
    #[must_use]
    pub fn context(&self) -> String {
        self.session.context(self.context_window)
    }

    /// Append the user message, the reply and the orchestration summary
    pub fn commit(
        mut self,
        user: impl Into<String>,
        assistant: impl Into<String>,
        state: Option<StateSnapshot>,
    ) {
        let turns = &mut self.session.turns;
        turns.push(Turn::new(Role::User, user));
        turns.push(Turn::new(Role::Assistant, assistant));
        if state.is_some() {
            self.session.last_state = state;
        }
        self.session.touch();
        debug!(
            conversation_id = %self.session.conversation_id,
            turns = self.session.turns.len(),
            "Turn committed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::Scenario;
    use crate::orchestrator::Phase;
    use std::collections::BTreeMap;

    fn snapshot() -> StateSnapshot {
        StateSnapshot {
            scenario: Scenario::RoutePlanning,
            confidence: 0.9,
            entities: BTreeMap::new(),
            tools_used: vec!["maps_geo".to_string()],
            iterations: 1,
            phase: Phase::Done,
        }
    }

    #[tokio::test]
    async fn test_create_fresh_ids() {
        let store = ConversationStore::default();
        let a = store.get_or_create(None).await.unwrap();
        let b = store.get_or_create(None).await.unwrap();

        assert_ne!(a.conversation_id, b.conversation_id);
        assert!(!a.conversation_id.is_nil());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_unknown_id_not_found() {
        let store = ConversationStore::default();
        let result = store.get_or_create(Some(Uuid::new_v4())).await;

        assert!(matches!(result, Err(Error::SessionNotFound(_))));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_turns_read_back_in_order() {
        let store = ConversationStore::default();
        let id = store.get_or_create(None).await.unwrap().conversation_id;

        for i in 0..6 {
            let role = if i % 2 == 0 {
                Role::User
            } else {
                Role::Assistant
            };
            let text = format!("消息{i}");
            store.append_turn(id, role, text).await.unwrap();
        }

        let session = store.get_or_create(Some(id)).await.unwrap();
        let texts: Vec<_> = session.turns.iter().map(|t| t.text.as_str()).collect();
        let expected = ["消息0", "消息1", "消息2", "消息3", "消息4", "消息5"];
        assert_eq!(texts, expected);

        let context = store.context(id, 5).await.unwrap();
        assert_eq!(context.lines().count(), 5);
        assert!(context.starts_with("助手: 消息1"));
        assert!(context.ends_with("助手: 消息5"));

        let snap = store.snapshot_state(id).await.unwrap();
        assert_eq!(snap.turn_count, 6);
        assert_eq!(snap.recent_turns.len(), 5);
    }

    #[tokio::test]
    async fn test_guard_commit() {
        let store = ConversationStore::default();
        let id = store.get_or_create(None).await.unwrap().conversation_id;

        let guard = store.begin_turn(id).await.unwrap();
        assert_eq!(guard.conversation_id(), id);
        assert_eq!(guard.context(), "");
        guard.commit("从上海到杭州怎么走", "建议乘坐高铁", Some(snapshot()));

        let snap = store.snapshot_state(id).await.unwrap();
        assert_eq!(snap.turn_count, 2);
        assert_eq!(snap.recent_turns[0].role, Role::User);
        assert_eq!(snap.recent_turns[1].text, "建议乘坐高铁");
        assert_eq!(snap.last_state, Some(snapshot()));
        assert!(serde_json::to_value(&snap).is_ok());
    }

    #[tokio::test]
    async fn test_dropped_guard_leaves_history() {
        let store = ConversationStore::default();
        let id = store.get_or_create(None).await.unwrap().conversation_id;
        store.append_turn(id, Role::User, "你好").await.unwrap();

        {
            let guard = store.begin_turn(id).await.unwrap();
            assert_eq!(guard.history_len(), 1);
        }

        assert_eq!(store.snapshot_state(id).await.unwrap().turn_count, 1);
    }

    #[tokio::test]
    async fn test_turns_serialized_per_conversation() {
        let store = ConversationStore::default();
        let id = store.get_or_create(None).await.unwrap().conversation_id;
        let other = store.get_or_create(None).await.unwrap().conversation_id;

        let first = store.begin_turn(id).await.unwrap();

        let blocked = tokio::time::timeout(Duration::from_millis(50), store.begin_turn(id)).await;
        assert!(blocked.is_err());

        // other conversations are unaffected
        let independent =
            tokio::time::timeout(Duration::from_millis(50), store.begin_turn(other)).await;
        assert!(independent.is_ok());

        drop(first);
        let second = tokio::time::timeout(Duration::from_millis(50), store.begin_turn(id)).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_evicts_least_recently_used() {
        let store = ConversationStore::new(StoreConfig {
            max_sessions: 2,
            ..StoreConfig::default()
        });
        let a = store.get_or_create(None).await.unwrap().conversation_id;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let b = store.get_or_create(None).await.unwrap().conversation_id;
        tokio::time::sleep(Duration::from_millis(5)).await;
        store.append_turn(a, Role::User, "还在").await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        let c = store.get_or_create(None).await.unwrap().conversation_id;

        assert_eq!(store.len().await, 2);
        assert!(store.get_or_create(Some(a)).await.is_ok());
        assert!(store.get_or_create(Some(c)).await.is_ok());
        assert!(matches!(
            store.get_or_create(Some(b)).await,
            Err(Error::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_cleanup_expired_skips_busy() {
        let store = ConversationStore::new(StoreConfig {
            ttl: Duration::from_millis(10),
            ..StoreConfig::default()
        });
        let idle = store.get_or_create(None).await.unwrap().conversation_id;
        let busy = store.get_or_create(None).await.unwrap().conversation_id;
        let guard = store.begin_turn(busy).await.unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(store.cleanup_expired().await, 1);
        assert!(store.get_or_create(Some(idle)).await.is_err());
        drop(guard);
        assert!(store.get_or_create(Some(busy)).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = ConversationStore::default();
        let id = store.get_or_create(None).await.unwrap().conversation_id;

        assert!(store.delete(id).await);
        assert!(!store.delete(id).await);
        assert!(store.is_empty().await);
    }
}
