//! Health probe and power-down snapshot for [`RedisStore`]
//!
//! The dump runs when the store is already suspected down, so every key is
//! captured as its own independently failable read: one unreadable key
//! lands in `failed_keys` and the scan keeps going.

use async_trait::async_trait;
use tracing::debug;

use sb_core::domain::entities::PowerDownRecord;
use sb_core::errors::DomainResult;
use sb_core::stores::{SnapshotStore, StateDump, StoreHealth};

use super::verification_cache::{CHALLENGE_MOBILE_PREFIX, CHALLENGE_PREFIX, VERIFIED_PREFIX};
use super::RedisStore;

#[async_trait]
impl StoreHealth for RedisStore {
    async fn ping(&self) -> DomainResult<()> {
        Ok(self.client().ping().await?)
    }
}

#[async_trait]
impl SnapshotStore for RedisStore {
    async fn dump_state(&self) -> DomainResult<StateDump> {
        let mut dump = StateDump::default();

        for prefix in [CHALLENGE_PREFIX, CHALLENGE_MOBILE_PREFIX, VERIFIED_PREFIX] {
            let keys = self.client().scan_keys(&format!("{}*", prefix)).await?;
            for key in keys {
                match self.capture_key(&key).await {
                    Ok(Some(record)) => dump.records.push(record),
                    // Key expired between SCAN and GET
                    Ok(None) => {}
                    Err(e) => dump.failed_keys.push((key, e.to_string())),
                }
            }
        }

        debug!(
            captured = dump.records.len(),
            failed = dump.failed_keys.len(),
            "Captured fast-store state"
        );
        Ok(dump)
    }

    async fn restore_state(&self, records: &[PowerDownRecord]) -> DomainResult<()> {
        let mut pipe = redis::pipe();
        pipe.atomic();
        let mut queued = 0;

        for record in records {
            match record.original_ttl {
                Some(ttl) if ttl > 0 => {
                    pipe.set_ex(&record.key_name, &record.value, ttl as u64);
                    queued += 1;
                }
                // TTL ran out while the record sat in the durable store
                Some(_) => {}
                None => {
                    pipe.set(&record.key_name, &record.value);
                    queued += 1;
                }
            }
        }

        if queued > 0 {
            self.client().execute_pipeline(&pipe).await?;
        }

        debug!(
            restored = queued,
            skipped = records.len() - queued,
            "Restored fast-store keys from power-down records"
        );
        Ok(())
    }
}

impl RedisStore {
    async fn capture_key(
        &self,
        key: &str,
    ) -> Result<Option<PowerDownRecord>, crate::InfrastructureError> {
        let value = match self.client().get(key).await? {
            Some(value) => value,
            None => return Ok(None),
        };
        let ttl = self.client().ttl(key).await?;
        Ok(Some(PowerDownRecord::string_key(key, value, ttl)))
    }
}
