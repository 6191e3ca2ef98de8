pub mod sheet;
pub mod slack;

use std::sync::Arc;
use std::time::Duration;

use crate::submission::SubmissionRecord;

use sheet::{SheetError, SheetStore};
use slack::{NotifyError, Notifier};

/// Upper bound on the notification step. Must stay below the relay timeout.
pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(2);

/// System of record for accepted delights: appends the row, then tells the
/// team channel about it.
#[derive(Clone)]
pub struct Recorder {
    store: Arc<dyn SheetStore>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl Recorder {
    pub fn new(store: Arc<dyn SheetStore>, notifier: Option<Arc<dyn Notifier>>) -> Self {
        Self { store, notifier }
    }

    /// Append `record` and return its row number.
    ///
    /// Only the append can fail the call. Notification runs after the row is
    /// written, is cut off after [`NOTIFY_TIMEOUT`], and its outcome is
    /// discarded.
    pub async fn record(&self, record: &SubmissionRecord) -> Result<u64, SheetError> {
        let row = self.store.append_row(record.sheet_row()).await?;
        tracing::info!("Recorded delight from {} on row {row}", record.agent_name);

        // Failures are logged inside and never reach the caller.
        if tokio::time::timeout(NOTIFY_TIMEOUT, self.notify(record)).await.is_err() {
            tracing::warn!(
                "Team channel notification for row {row} abandoned after {}s",
                NOTIFY_TIMEOUT.as_secs()
            );
        }

        Ok(row)
    }

    async fn notify(&self, record: &SubmissionRecord) -> Result<(), NotifyError> {
        let Some(notifier) = &self.notifier else {
            return Ok(());
        };

        let Err(err) = notifier.notify_submission(record).await else {
            return Ok(());
        };
        tracing::warn!("Failed to notify team channel: {err}");

        if let Err(e) = notifier.notify_error(&err.message).await {
            tracing::warn!("Failed to send error notification: {e}");
        }
        Err(err)
    }
}
