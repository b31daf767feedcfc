//! Redis-backed job store.
//!
//! Each job is stored as a JSON value under `{prefix}:{job_id}`. The
//! guarded transition write runs as a Lua script so the state check and
//! the overwrite are atomic on the server.

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;

use arthur_models::{Job, JobId, JobState};

use crate::error::{StoreError, StoreResult};
use crate::{CasOutcome, JobStore};

/// Compare-and-swap script: replaces the stored record only when its
/// `state` field still matches ARGV[1].
///
/// Returns nil when the key is missing, an empty string when the write
/// was applied, and the current record when the state check failed.
const CAS_SCRIPT: &str = r#"
local cur = redis.call('GET', KEYS[1])
if not cur then
  return nil
end
local obj = cjson.decode(cur)
if obj.state ~= ARGV[1] then
  return cur
end
redis.call('SET', KEYS[1], ARGV[2])
return ''
"#;

/// Redis store configuration.
#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
    /// Redis URL
    pub redis_url: String,
    /// Key prefix for job records
    pub key_prefix: String,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379".to_string(),
            key_prefix: "arthur:jobs".to_string(),
        }
    }
}

impl RedisStoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            key_prefix: std::env::var("JOB_STORE_KEY_PREFIX")
                .unwrap_or_else(|_| "arthur:jobs".to_string()),
        }
    }
}

/// Job store backed by Redis.
pub struct RedisJobStore {
    client: redis::Client,
    config: RedisStoreConfig,
    cas: redis::Script,
}

impl RedisJobStore {
    /// Create a new Redis job store.
    pub fn new(config: RedisStoreConfig) -> StoreResult<Self> {
        let client = redis::Client::open(config.redis_url.as_str())?;
        Ok(Self {
            client,
            config,
            cas: redis::Script::new(CAS_SCRIPT),
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> StoreResult<Self> {
        Self::new(RedisStoreConfig::from_env())
    }

    fn key(&self, id: &JobId) -> String {
        format!("{}:{}", self.config.key_prefix, id)
    }

    /// Collect all job keys under the configured prefix.
    async fn scan_keys(
        &self,
        conn: &mut redis::aio::MultiplexedConnection,
    ) -> StoreResult<Vec<String>> {
        let pattern = format!("{}:*", self.config.key_prefix);
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(conn)
                .await?;

            keys.extend(batch);
            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        Ok(keys)
    }
}

#[async_trait]
impl JobStore for RedisJobStore {
    async fn get(&self, id: &JobId) -> StoreResult<Option<Job>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let raw: Option<String> = conn.get(self.key(id)).await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, job: &Job) -> StoreResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let payload = serde_json::to_string(job)?;
        conn.set::<_, _, ()>(self.key(&job.id), payload).await?;

        debug!("Stored job {}", job.id);
        Ok(())
    }

    async fn list(&self, state: Option<JobState>) -> StoreResult<Vec<Job>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let keys = self.scan_keys(&mut conn).await?;
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let values: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut conn)
            .await?;

        let mut jobs = Vec::new();
        for value in values.into_iter().flatten() {
            let job: Job = serde_json::from_str(&value)?;
            if state.map_or(true, |s| job.state == s) {
                jobs.push(job);
            }
        }

        Ok(jobs)
    }

    async fn compare_and_swap(&self, expected: JobState, job: &Job) -> StoreResult<CasOutcome> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let payload = serde_json::to_string(job)?;
        let result: Option<String> = self
            .cas
            .key(self.key(&job.id))
            .arg(expected.as_str())
            .arg(payload)
            .invoke_async(&mut conn)
            .await?;

        match result {
            None => Err(StoreError::NotFound(job.id.to_string())),
            Some(s) if s.is_empty() => Ok(CasOutcome::Applied),
            Some(current) => Ok(CasOutcome::Conflict(serde_json::from_str(&current)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arthur_models::{GenerationInput, JobKind, JobResult};

    fn test_store() -> RedisJobStore {
        RedisJobStore::new(RedisStoreConfig {
            key_prefix: "arthur:test:jobs".to_string(),
            ..Default::default()
        })
        .expect("Failed to create store")
    }

    fn pending_job() -> Job {
        Job::new(
            JobId::new(),
            JobKind::Video,
            GenerationInput {
                prompt: Some("test".to_string()),
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn test_redis_roundtrip() {
        let store = test_store();
        let job = pending_job();

        store.put(&job).await.expect("put failed");
        let fetched = store.get(&job.id).await.expect("get failed").expect("missing");
        assert_eq!(fetched.id, job.id);
        assert_eq!(fetched.state, JobState::Pending);
    }

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn test_redis_cas_conflict() {
        let store = test_store();
        let job = pending_job();
        store.put(&job).await.expect("put failed");

        let completed = job.clone().complete(JobResult::single("video", "https://x/v.mp4"));

        let first = store
            .compare_and_swap(JobState::Pending, &completed)
            .await
            .expect("cas failed");
        assert!(first.is_applied());

        let second = store
            .compare_and_swap(JobState::Pending, &completed)
            .await
            .expect("cas failed");
        assert!(matches!(second, CasOutcome::Conflict(_)));
    }
}
