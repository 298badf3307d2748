//! Process-local conversation/member cache (spec §4.4). Cache misses never
//! auto-populate from persistence; callers fall back to a full registry
//! broadcast when the cache has nothing, and populate it as a side effect
//! once they've already paid for the DB round trip. Eviction is a pure
//! memory bound — correctness relies entirely on the explicit `invalidate`
//! calls at every membership-changing write path.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::repo::conversations::MemberRow;

#[derive(Clone)]
struct ConvEntry {
    conv_type: String,
    member_ids: Vec<i64>,
    last_access: Instant,
}

#[derive(Clone)]
pub struct MemberSummary {
    pub user_id: i64,
    pub display_name: String,
    pub role: String,
    pub muted_until_ms: i64,
}

struct MemberListEntry {
    members: Vec<MemberSummary>,
    last_access: Instant,
}

pub struct ConversationCache {
    conv_cache: RwLock<HashMap<i64, ConvEntry>>,
    member_list_cache: RwLock<HashMap<i64, MemberListEntry>>,
    ttl: Duration,
}

impl ConversationCache {
    pub fn new(ttl: Duration) -> Arc<Self> {
        Arc::new(Self {
            conv_cache: RwLock::new(HashMap::new()),
            member_list_cache: RwLock::new(HashMap::new()),
            ttl,
        })
    }

    pub async fn member_ids(&self, conversation_id: i64) -> Option<Vec<i64>> {
        let mut cache = self.conv_cache.write().await;
        let entry = cache.get_mut(&conversation_id)?;
        entry.last_access = Instant::now();
        Some(entry.member_ids.clone())
    }

    pub async fn conv_type(&self, conversation_id: i64) -> Option<String> {
        let mut cache = self.conv_cache.write().await;
        let entry = cache.get_mut(&conversation_id)?;
        entry.last_access = Instant::now();
        Some(entry.conv_type.clone())
    }

    pub async fn populate(&self, conversation_id: i64, conv_type: &str, member_ids: Vec<i64>) {
        self.conv_cache.write().await.insert(
            conversation_id,
            ConvEntry {
                conv_type: conv_type.to_owned(),
                member_ids,
                last_access: Instant::now(),
            },
        );
    }

    pub async fn members(&self, conversation_id: i64) -> Option<Vec<MemberSummary>> {
        let mut cache = self.member_list_cache.write().await;
        let entry = cache.get_mut(&conversation_id)?;
        entry.last_access = Instant::now();
        Some(entry.members.clone())
    }

    pub async fn populate_members(&self, conversation_id: i64, rows: &[MemberRow], names: &HashMap<i64, String>) {
        let members = rows
            .iter()
            .map(|r| MemberSummary {
                user_id: r.user_id,
                display_name: names.get(&r.user_id).cloned().unwrap_or_default(),
                role: r.role.clone(),
                muted_until_ms: r.muted_until_ms,
            })
            .collect();
        self.member_list_cache.write().await.insert(
            conversation_id,
            MemberListEntry {
                members,
                last_access: Instant::now(),
            },
        );
    }

    /// Drops both cache entries for a conversation. Called at every
    /// membership-changing operation: create-group, open-single, add/remove
    /// member, role change, mute/unmute, leave/dissolve, accept flows.
    pub async fn invalidate(&self, conversation_id: i64) {
        self.conv_cache.write().await.remove(&conversation_id);
        self.member_list_cache.write().await.remove(&conversation_id);
    }

    pub async fn evict_expired(&self) {
        let now = Instant::now();
        self.conv_cache
            .write()
            .await
            .retain(|_, entry| now.duration_since(entry.last_access) < self.ttl);
        self.member_list_cache
            .write()
            .await
            .retain(|_, entry| now.duration_since(entry.last_access) < self.ttl);
    }
}

/// Background eviction loop; ticks at half the TTL so stale entries never
/// linger more than 1.5x the configured bound.
pub fn spawn_eviction_task(cache: Arc<ConversationCache>, ttl: Duration) {
    let interval = (ttl / 2).max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            cache.evict_expired().await;
        }
    });
}
