use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::debug;
use uuid::Uuid;

use crate::interview::machine::SessionSnapshot;
use crate::store::{SnapshotStore, StoreError};

pub fn snapshot_key(session_id: Uuid) -> String {
    format!("interview:session:{session_id}")
}

/// Session snapshots as JSON strings in Redis, expiring after `ttl_secs`.
/// All sessions share one reconnecting connection.
#[derive(Clone)]
pub struct RedisSnapshotStore {
    connection: ConnectionManager,
    ttl_secs: u64,
}

impl RedisSnapshotStore {
    pub async fn connect(client: redis::Client, ttl_secs: u64) -> Result<Self, StoreError> {
        let connection = ConnectionManager::new(client).await?;
        Ok(Self {
            connection,
            ttl_secs,
        })
    }
}

#[async_trait]
impl SnapshotStore for RedisSnapshotStore {
    async fn save(&self, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        let payload = serde_json::to_string(snapshot)?;
        let mut conn = self.connection.clone();
        redis::cmd("SET")
            .arg(snapshot_key(snapshot.session_id))
            .arg(payload)
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async::<_, ()>(&mut conn)
            .await?;
        debug!("Saved snapshot for session {}", snapshot.session_id);
        Ok(())
    }

    async fn load(&self, session_id: Uuid) -> Result<Option<SessionSnapshot>, StoreError> {
        let mut conn = self.connection.clone();
        let payload: Option<String> = redis::cmd("GET")
            .arg(snapshot_key(session_id))
            .query_async(&mut conn)
            .await?;
        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn clear(&self, session_id: Uuid) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        redis::cmd("DEL")
            .arg(snapshot_key(session_id))
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }
}
