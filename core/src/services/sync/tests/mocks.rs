//! Mock backend for sync worker tests

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::entities::SyncItem;
use crate::services::sync::SyncBackend;

/// Mock backend recording deliveries
pub struct MockSyncBackend {
    pub delivered: Mutex<Vec<SyncItem>>,
    pub batches: Mutex<Vec<Vec<SyncItem>>>,
    pub should_fail: Mutex<bool>,
}

impl MockSyncBackend {
    pub fn new(should_fail: bool) -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            batches: Mutex::new(Vec::new()),
            should_fail: Mutex::new(should_fail),
        }
    }

    pub fn delivered_items(&self) -> Vec<SyncItem> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn batch_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }
}

#[async_trait]
impl SyncBackend for MockSyncBackend {
    async fn deliver(&self, item: &SyncItem) -> Result<(), String> {
        if *self.should_fail.lock().unwrap() {
            return Err("connection refused".to_string());
        }
        self.delivered.lock().unwrap().push(item.clone());
        Ok(())
    }

    async fn deliver_recovery_batch(&self, items: &[SyncItem]) -> Result<(), String> {
        if *self.should_fail.lock().unwrap() {
            return Err("connection refused".to_string());
        }
        self.batches.lock().unwrap().push(items.to_vec());
        Ok(())
    }
}
