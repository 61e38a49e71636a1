/*!
 * Transaction Helper Utilities
 *
 * Runs a unit of work inside a single database transaction: commit on `Ok`,
 * rollback on `Err`, with the caller's error type preserved.
 */

use crate::errors::ServiceError;
use metrics::{counter, histogram};
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionError, TransactionTrait};
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, warn};

/// Type alias for boxed future used in transactions
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Execute a function within a database transaction
///
/// # Example
///
/// ```rust,ignore
/// let report = with_transaction(&db, "report.create", move |txn| {
///     Box::pin(async move {
///         let report = active_report.insert(txn).await?;
///         DetailCuttingRepository::replace_for_report(txn, report.id, details).await?;
///         Ok(report)
///     })
/// })
/// .await?;
/// ```
pub async fn with_transaction<F, T>(
    db: &DatabaseConnection,
    operation: &'static str,
    f: F,
) -> Result<T, ServiceError>
where
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> BoxFuture<'c, Result<T, ServiceError>> + Send,
    T: Send,
{
    let start = std::time::Instant::now();
    counter!("cutting_reports_db.transaction.started", 1, "operation" => operation);

    let result = db.transaction::<_, T, ServiceError>(f).await;

    histogram!(
        "cutting_reports_db.transaction.duration",
        start.elapsed(),
        "operation" => operation
    );

    match result {
        Ok(value) => {
            counter!("cutting_reports_db.transaction.committed", 1, "operation" => operation);
            debug!(operation, "Transaction committed");
            Ok(value)
        }
        Err(TransactionError::Connection(db_err)) => {
            counter!("cutting_reports_db.transaction.rolled_back", 1, "operation" => operation);
            warn!(operation, error = %db_err, "Transaction failed to start or commit");
            Err(ServiceError::DatabaseError(db_err))
        }
        Err(TransactionError::Transaction(err)) => {
            counter!("cutting_reports_db.transaction.rolled_back", 1, "operation" => operation);
            warn!(operation, error = %err, "Transaction rolled back");
            Err(err)
        }
    }
}
