//! Redis-backed verification state
//!
//! [`RedisStore`] implements the fast-store traits over the key schema:
//!
//! - `challenge:{token}` - challenge record, TTL = challenge window
//! - `challenge_mobile:{mobile}` - reverse index to the live token, same
//!   TTL, enforcing one live challenge per mobile
//! - `verified:{mobile}` - verification flag, short TTL
//! - `rate:{mobile}` - rolling attempt counter, window TTL
//! - `blacklist` - set of blocked mobiles, no TTL
//!
//! The cross-key transitions (challenge consume, flag consume, blacklist
//! replace) run as atomic MULTI/EXEC pipelines; nothing in this process
//! holds a lock across them.

use async_trait::async_trait;
use tracing::debug;

use sb_core::domain::entities::{Challenge, SyncItem, VerificationFlag};
use sb_core::errors::DomainResult;
use sb_core::stores::{BlacklistStore, ChallengeStore, RateLimitStore, VerificationStore};
use sb_shared::utils::phone;

use super::queue_cache::SYNC_QUEUE_KEY;
use super::RedisClient;

pub(crate) const CHALLENGE_PREFIX: &str = "challenge:";
pub(crate) const CHALLENGE_MOBILE_PREFIX: &str = "challenge_mobile:";
pub(crate) const VERIFIED_PREFIX: &str = "verified:";
pub(crate) const RATE_PREFIX: &str = "rate:";
pub(crate) const BLACKLIST_KEY: &str = "blacklist";

/// Redis implementation of every fast-store trait
#[derive(Clone)]
pub struct RedisStore {
    client: RedisClient,
}

impl RedisStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// The underlying client, for callers composing their own pipelines
    pub fn client(&self) -> &RedisClient {
        &self.client
    }

    pub(crate) fn challenge_key(token: &str) -> String {
        format!("{}{}", CHALLENGE_PREFIX, token)
    }

    pub(crate) fn mobile_key(mobile: &str) -> String {
        format!("{}{}", CHALLENGE_MOBILE_PREFIX, mobile)
    }

    pub(crate) fn verified_key(mobile: &str) -> String {
        format!("{}{}", VERIFIED_PREFIX, mobile)
    }

    fn rate_key(mobile: &str) -> String {
        format!("{}{}", RATE_PREFIX, mobile)
    }
}

#[async_trait]
impl ChallengeStore for RedisStore {
    async fn put_challenge(&self, challenge: &Challenge, ttl_seconds: u64) -> DomainResult<()> {
        let record = serde_json::to_string(challenge)
            .map_err(crate::InfrastructureError::Serialization)?;

        // Both keys written in one transaction so the reverse index can
        // never point at a missing challenge.
        let mut pipe = redis::pipe();
        pipe.atomic()
            .set_ex(Self::challenge_key(&challenge.token), record, ttl_seconds)
            .set_ex(
                Self::mobile_key(&challenge.mobile),
                &challenge.token,
                ttl_seconds,
            );
        self.client.execute_pipeline(&pipe).await?;

        debug!(
            mobile = %phone::mask_mobile(&challenge.mobile),
            ttl = ttl_seconds,
            "Stored challenge pair"
        );
        Ok(())
    }

    async fn find_challenge(&self, token: &str) -> DomainResult<Option<Challenge>> {
        match self.client.get(&Self::challenge_key(token)).await? {
            Some(raw) => {
                let challenge: Challenge = serde_json::from_str(&raw)
                    .map_err(crate::InfrastructureError::Serialization)?;
                Ok(Some(challenge))
            }
            None => Ok(None),
        }
    }

    async fn active_token_for(&self, mobile: &str) -> DomainResult<Option<String>> {
        Ok(self.client.get(&Self::mobile_key(mobile)).await?)
    }

    async fn consume_challenge(
        &self,
        token: &str,
        challenge_mobile: &str,
        flag: &VerificationFlag,
        flag_ttl_seconds: u64,
    ) -> DomainResult<()> {
        let record =
            serde_json::to_string(flag).map_err(crate::InfrastructureError::Serialization)?;

        let mut pipe = redis::pipe();
        pipe.atomic()
            .del(Self::challenge_key(token))
            .del(Self::mobile_key(challenge_mobile))
            .set_ex(Self::verified_key(&flag.mobile), record, flag_ttl_seconds);
        self.client.execute_pipeline(&pipe).await?;

        debug!(
            mobile = %phone::mask_mobile(&flag.mobile),
            "Consumed challenge and created verification flag"
        );
        Ok(())
    }
}

#[async_trait]
impl VerificationStore for RedisStore {
    async fn find_flag(&self, mobile: &str) -> DomainResult<Option<VerificationFlag>> {
        match self.client.get(&Self::verified_key(mobile)).await? {
            Some(raw) => {
                let flag: VerificationFlag = serde_json::from_str(&raw)
                    .map_err(crate::InfrastructureError::Serialization)?;
                Ok(Some(flag))
            }
            None => Ok(None),
        }
    }

    async fn consume_flag(&self, mobile: &str, item: &SyncItem) -> DomainResult<()> {
        let payload =
            serde_json::to_string(item).map_err(crate::InfrastructureError::Serialization)?;

        let mut pipe = redis::pipe();
        pipe.atomic()
            .rpush(SYNC_QUEUE_KEY, payload)
            .del(Self::verified_key(mobile));
        self.client.execute_pipeline(&pipe).await?;

        debug!(
            mobile = %phone::mask_mobile(mobile),
            "Enqueued sync item and deleted verification flag"
        );
        Ok(())
    }
}

#[async_trait]
impl RateLimitStore for RedisStore {
    async fn increment_rate(&self, mobile: &str, window_seconds: u64) -> DomainResult<i64> {
        Ok(self
            .client
            .increment(&Self::rate_key(mobile), window_seconds)
            .await?)
    }
}

#[async_trait]
impl BlacklistStore for RedisStore {
    async fn is_blacklisted(&self, mobile: &str) -> DomainResult<bool> {
        Ok(self.client.sismember(BLACKLIST_KEY, mobile).await?)
    }

    async fn replace_blacklist(&self, mobiles: &[String]) -> DomainResult<()> {
        let mut pipe = redis::pipe();
        pipe.atomic().del(BLACKLIST_KEY);
        if !mobiles.is_empty() {
            pipe.sadd(BLACKLIST_KEY, mobiles);
        }
        self.client.execute_pipeline(&pipe).await?;

        debug!(count = mobiles.len(), "Replaced blacklist set");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_formats() {
        assert_eq!(RedisStore::challenge_key("A3B7K2M9"), "challenge:A3B7K2M9");
        assert_eq!(
            RedisStore::mobile_key("+919876543210"),
            "challenge_mobile:+919876543210"
        );
        assert_eq!(
            RedisStore::verified_key("+919876543210"),
            "verified:+919876543210"
        );
        assert_eq!(RedisStore::rate_key("+919876543210"), "rate:+919876543210");
    }
}
