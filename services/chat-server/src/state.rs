use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use sqlx::PgPool;
use tokio::sync::{mpsc, RwLock};

use crate::auth::CredentialVerifier;
use crate::cache::ConversationCache;
use crate::config::Config;

pub enum OutboundMsg {
    Frame(String),
    Close,
}

/// The per-connection server-side object: socket state, auth, and the
/// ordered outbound queue with its byte budget (spec §3, §4.2).
///
/// `sessions` in [`SessionRegistry`] holds the only strong reference; every
/// other table (`sessions_by_user`) holds a [`Weak`] so a session can always
/// be dropped the moment its connection ends without a second owner keeping
/// it alive.
pub struct Session {
    pub id: u64,
    user_id: AtomicI64,
    display_name: RwLock<String>,
    outbound_tx: mpsc::UnboundedSender<OutboundMsg>,
    outbound_bytes: AtomicUsize,
    closing: std::sync::atomic::AtomicBool,
}

impl Session {
    pub fn new(id: u64, outbound_tx: mpsc::UnboundedSender<OutboundMsg>) -> Arc<Self> {
        Arc::new(Self {
            id,
            user_id: AtomicI64::new(0),
            display_name: RwLock::new(String::new()),
            outbound_tx,
            outbound_bytes: AtomicUsize::new(0),
            closing: std::sync::atomic::AtomicBool::new(false),
        })
    }

    pub fn user_id(&self) -> i64 {
        self.user_id.load(Ordering::Relaxed)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id() != 0
    }

    pub async fn set_authenticated(&self, user_id: i64, display_name: &str) {
        self.user_id.store(user_id, Ordering::Relaxed);
        *self.display_name.write().await = display_name.to_owned();
    }

    pub async fn set_display_name(&self, display_name: &str) {
        *self.display_name.write().await = display_name.to_owned();
    }

    pub async fn display_name(&self) -> String {
        self.display_name.read().await.clone()
    }

    /// Enqueues an already-encoded frame. Returns `false` and closes the
    /// socket when the backpressure budget (spec §4.2) would be exceeded; the
    /// frame is dropped in that case, never buffered.
    pub fn push_frame(&self, frame: String, max_outbound_bytes: usize) -> bool {
        if self.closing.load(Ordering::Relaxed) {
            return false;
        }
        let len = frame.len();
        let projected = self.outbound_bytes.load(Ordering::Relaxed) + len;
        if projected > max_outbound_bytes {
            self.closing.store(true, Ordering::Relaxed);
            let _ = self.outbound_tx.send(OutboundMsg::Close);
            return false;
        }
        self.outbound_bytes.fetch_add(len, Ordering::Relaxed);
        let _ = self.outbound_tx.send(OutboundMsg::Frame(frame));
        true
    }

    /// Called by the writer task once a frame has actually been written, so
    /// the byte budget reflects only what's still queued.
    pub fn note_frame_written(&self, len: usize) {
        self.outbound_bytes.fetch_sub(len, Ordering::Relaxed);
    }

    pub fn mark_closing(&self) {
        self.closing.store(true, Ordering::Relaxed);
    }
}

/// Owns the acceptor's live sessions and the fan-out index (spec §4.3). All
/// mutation happens through this type's async methods, each of which takes
/// the relevant `RwLock` for the duration of the mutation -- the "single
/// logical lock / strand" the spec calls for.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<u64, Arc<Session>>>,
    sessions_by_user: RwLock<HashMap<i64, Vec<Weak<Session>>>>,
    next_id: AtomicU64,
}

impl SessionRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sessions: RwLock::new(HashMap::new()),
            sessions_by_user: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    pub async fn register(&self, session: Arc<Session>) {
        self.sessions.write().await.insert(session.id, session);
    }

    /// Removes the session from the primary table. A dead `Weak` left behind
    /// in the user index is harmless -- it is pruned on the next broadcast
    /// that touches that user's bucket.
    pub async fn remove(&self, session_id: u64) {
        self.sessions.write().await.remove(&session_id);
    }

    /// Indexes a session by user id after a successful LOGIN.
    pub async fn index_by_user(&self, user_id: i64, session: &Arc<Session>) {
        self.sessions_by_user
            .write()
            .await
            .entry(user_id)
            .or_default()
            .push(Arc::downgrade(session));
    }

    /// Pushes `frame` to every live session of `user_id`, pruning expired
    /// weak refs as it goes.
    pub async fn push_to_user(&self, user_id: i64, frame: &str, max_outbound_bytes: usize) {
        let mut table = self.sessions_by_user.write().await;
        let Some(sessions) = table.get_mut(&user_id) else {
            return;
        };
        sessions.retain(|weak| {
            if let Some(session) = weak.upgrade() {
                session.push_frame(frame.to_owned(), max_outbound_bytes);
                true
            } else {
                false
            }
        });
    }

    pub async fn push_to_users(&self, user_ids: &[i64], frame: &str, max_outbound_bytes: usize) {
        for user_id in user_ids {
            self.push_to_user(*user_id, frame, max_outbound_bytes).await;
        }
    }

    /// Fallback fan-out used when the conversation cache has no entry: push
    /// to every authenticated session. Documented operational degradation,
    /// not the default path (spec §4.3).
    pub async fn push_to_all_authenticated(&self, frame: &str, max_outbound_bytes: usize) {
        let sessions = self.sessions.read().await;
        for session in sessions.values() {
            if session.is_authenticated() {
                session.push_frame(frame.to_owned(), max_outbound_bytes);
            }
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub registry: Arc<SessionRegistry>,
    pub cache: Arc<ConversationCache>,
    pub credentials: Arc<dyn CredentialVerifier>,
    pub world_conversation_id: i64,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        config: Arc<Config>,
        credentials: Arc<dyn CredentialVerifier>,
        world_conversation_id: i64,
    ) -> Self {
        let cache = ConversationCache::new(config.cache_ttl);
        crate::cache::spawn_eviction_task(cache.clone(), config.cache_ttl);
        Self {
            pool,
            registry: SessionRegistry::new(),
            cache,
            credentials,
            world_conversation_id,
            config,
        }
    }

    /// Broadcasts to every member of `conversation_id` via the cache; falls
    /// back to an all-authenticated-sessions push on a cache miss (spec §4.3).
    pub async fn broadcast_to_conversation(&self, conversation_id: i64, frame: &str) {
        match self.cache.member_ids(conversation_id).await {
            Some(member_ids) => {
                self.registry
                    .push_to_users(&member_ids, frame, self.config.max_outbound_bytes)
                    .await;
            }
            None => {
                self.registry
                    .push_to_all_authenticated(frame, self.config.max_outbound_bytes)
                    .await;
            }
        }
    }
}
