//! Command execution helpers

use std::time::Instant;

use leadflow_domain::Result as DomainResult;

use crate::utils::logging::{error_label, log_command_execution};

/// Run a command, timing it and logging the outcome.
///
/// ```rust,ignore
/// execute_logged("maintenance::backfill", || async {
///     ctx.pipeline.backfill_service_numbers().await
/// })
/// .await
/// ```
pub async fn execute_logged<F, Fut, T>(command_name: &str, command_fn: F) -> DomainResult<T>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = DomainResult<T>>,
{
    let start = Instant::now();
    let result = command_fn().await;
    let error_type = result.as_ref().err().map(error_label);
    log_command_execution(command_name, start.elapsed(), error_type);
    result
}

#[cfg(test)]
mod tests {
    use leadflow_domain::LeadflowError;

    use super::*;

    #[tokio::test]
    async fn passes_through_result() {
        let ok = execute_logged("test::ok", || async { Ok::<_, LeadflowError>(3) }).await;
        assert_eq!(ok.unwrap(), 3);

        let err = execute_logged("test::err", || async {
            Err::<(), _>(LeadflowError::NotFound("Lead 1".into()))
        })
        .await;
        assert!(matches!(err, Err(LeadflowError::NotFound(_))));
    }
}
