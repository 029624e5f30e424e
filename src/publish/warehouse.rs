//! Warehouse client seam

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use super::error::WarehouseError;
use super::metadata::TableMetadata;
use super::table_id::TableId;
use crate::types::TableSchema;

/// The cloud warehouse operations the publish workflow needs.
///
/// Every future completes when the underlying job has finished; callers bound
/// them with [`with_deadline`].
#[async_trait::async_trait]
pub trait Warehouse: Send + Sync {
    async fn table_exists(&self, table: &TableId) -> Result<bool, WarehouseError>;

    async fn dataset_exists(&self, project: &str, dataset: &str) -> Result<bool, WarehouseError>;

    /// Table names (not full ids) in a dataset
    async fn list_tables(&self, project: &str, dataset: &str) -> Result<Vec<String>, WarehouseError>;

    async fn table_schema(&self, table: &TableId) -> Result<TableSchema, WarehouseError>;

    /// Run a query job and return the number of result rows
    async fn run_query(&self, sql: &str) -> Result<u64, WarehouseError>;

    /// Copy `source` over `destination`, replacing it atomically
    async fn copy_table(&self, source: &TableId, destination: &TableId) -> Result<(), WarehouseError>;

    /// Apply a metadata patch; labels are merged into existing labels
    async fn update_table_metadata(
        &self,
        table: &TableId,
        metadata: &TableMetadata,
    ) -> Result<(), WarehouseError>;
}

/// Await a warehouse call, giving up on timeout or cancellation
pub async fn with_deadline<T, F>(
    operation: &str,
    timeout: Duration,
    cancel: &CancellationToken,
    call: F,
) -> Result<T, WarehouseError>
where
    F: Future<Output = Result<T, WarehouseError>>,
{
    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(WarehouseError::Cancelled(operation.to_string())),
        finished = tokio::time::timeout(timeout, call) => match finished {
            Ok(result) => result,
            Err(_) => Err(WarehouseError::Timeout {
                operation: operation.to_string(),
                timeout,
            }),
        },
    };

    if let Err(err) = &result {
        tracing::error!(operation, error = %err, "Warehouse call failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_call_completes() {
        let token = CancellationToken::new();
        let value = with_deadline("list_tables", Duration::from_secs(5), &token, async { Ok(3) }).await;
        assert_eq!(value, Ok(3));
    }

    #[tokio::test]
    async fn test_call_times_out() {
        let token = CancellationToken::new();
        let result: Result<(), _> = with_deadline(
            "run_query",
            Duration::from_millis(10),
            &token,
            std::future::pending(),
        )
        .await;
        assert!(matches!(result, Err(WarehouseError::Timeout { operation, .. }) if operation == "run_query"));
    }

    #[tokio::test]
    async fn test_call_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        let result: Result<(), _> =
            with_deadline("copy_table", Duration::from_secs(5), &token, std::future::pending()).await;
        assert_eq!(result, Err(WarehouseError::Cancelled("copy_table".into())));
    }

    #[tokio::test]
    async fn test_job_errors_pass_through() {
        let token = CancellationToken::new();
        let result: Result<(), _> = with_deadline("copy_table", Duration::from_secs(5), &token, async {
            Err(WarehouseError::Job("quota exceeded".into()))
        })
        .await;
        assert_eq!(result, Err(WarehouseError::Job("quota exceeded".into())));
    }
}
