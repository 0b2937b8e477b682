//! Timeout wrapper for agent calls
//!
//! Each stage gets one bounded attempt. An expired stage surfaces as a
//! timeout error and the pipeline stops there; nothing is retried.

use std::future::Future;
use std::time::Duration;

use crate::types::{PlanError, Result};

/// Execute an async operation with a timeout
///
/// Returns `PlanError::Timeout` if the operation doesn't complete within
/// `timeout`. `operation_name` is used in the error message.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(PlanError::timeout(operation_name, timeout)),
    }
}
