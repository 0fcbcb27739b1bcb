use reqwest::{Client, Response};
use std::time::Duration;

use super::error::{BackendError, BackendResult};

const ERROR_BODY_PREVIEW: usize = 200;

pub(crate) fn build_client(backend: &str, timeout: Duration) -> BackendResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| BackendError::Client {
            backend: backend.to_string(),
            reason: e.to_string(),
        })
}

/// Returns the body of a 2xx response, or a `Status` error with a body preview.
pub(crate) async fn read_body(
    backend: &str,
    timeout: Duration,
    response: Response,
) -> BackendResult<String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| BackendError::from_reqwest(backend, timeout, e))?;

    if !status.is_success() {
        return Err(BackendError::Status {
            backend: backend.to_string(),
            status: status.as_u16(),
            body: body.chars().take(ERROR_BODY_PREVIEW).collect(),
        });
    }

    Ok(body)
}
