//! Waiting on asynchronous service operations.
use std::time::Duration;

use snafu::prelude::*;

use crate::{
    provider::{OperationStatus, Provider},
    EmptyOperationIdSnafu, OperationFailedSnafu, OperationNotFoundSnafu, Result,
};

/// Delay between two looks at a running operation.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Blocks until operation `operation_id` on `service_arn` succeeds.
///
/// Fails as soon as the operation reaches any status other than
/// `PENDING`, `IN_PROGRESS` or `SUCCEEDED`, or as soon as a listing does not
/// contain the operation at all. There is no deadline here; the hosting
/// invocation's timeout bounds the wait.
pub async fn wait_for_operation<P: Provider>(
    provider: &P,
    operation_id: &str,
    service_arn: &str,
    interval: Duration,
) -> Result<()> {
    ensure!(
        !operation_id.is_empty(),
        EmptyOperationIdSnafu { service_arn }
    );

    loop {
        let operations = provider.list_operations(service_arn).await?;
        let operation = operations
            .into_iter()
            .find(|op| op.id == operation_id)
            .context(OperationNotFoundSnafu {
                operation_id,
                service_arn,
            })?;
        match operation.status {
            OperationStatus::Succeeded => {
                log::info!("  operation {operation_id} on {service_arn} succeeded");
                return Ok(());
            }
            status if status.is_running() => {
                log::debug!("  operation {operation_id} is {status}, waiting {interval:?}");
                tokio::time::sleep(interval).await;
            }
            status => {
                return OperationFailedSnafu {
                    operation_id,
                    service_arn,
                    status: status.to_string(),
                }
                .fail();
            }
        }
    }
}
