//! Main audit archival service implementation

use std::sync::Arc;

use crate::domain::entities::BackupCredential;
use crate::errors::DomainResult;
use crate::repositories::AuditLogRepository;
use crate::stores::AuditQueueStore;

/// Cold-path archival of buffered audit events into the durable store.
///
/// The buffer is read non-destructively and trimmed only after the
/// archive transaction commits, giving at-least-once delivery into the
/// durable log. The log is append-only and the credential backups are
/// upsert-keyed, so a re-archived batch is harmless.
pub struct AuditService<Q, R>
where
    Q: AuditQueueStore,
    R: AuditLogRepository,
{
    queue: Arc<Q>,
    repository: Arc<R>,
}

impl<Q, R> AuditService<Q, R>
where
    Q: AuditQueueStore,
    R: AuditLogRepository,
{
    pub fn new(queue: Arc<Q>, repository: Arc<R>) -> Self {
        Self { queue, repository }
    }

    /// Archive up to `batch_size` of the oldest buffered events.
    ///
    /// Returns the number of events archived.
    pub async fn flush(&self, batch_size: usize) -> DomainResult<usize> {
        let events = self.queue.oldest_events(batch_size).await?;
        if events.is_empty() {
            return Ok(0);
        }

        // Credential-collected events feed the last-resort backup table
        let backups: Vec<BackupCredential> = events
            .iter()
            .filter_map(BackupCredential::from_event)
            .collect();

        self.repository.archive_batch(&events, &backups).await?;
        self.queue.remove_oldest(events.len()).await?;

        tracing::info!(
            count = events.len(),
            backups = backups.len(),
            event = "audit_flushed",
            "Archived audit events to durable store"
        );

        Ok(events.len())
    }
}
