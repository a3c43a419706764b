// Module: Executors
// The HTTP transport seam and the per-test-case executor built on top of it.

pub mod http;
pub mod test_case;

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::ExecutionError;
use crate::request::PreparedRequest;

pub use http::ReqwestTransport;
pub use test_case::TestExecutor;

/// What came back from the server.
#[derive(Debug)]
pub struct TransportResponse {
    pub status: u16,
    /// Time until the response headers arrived.
    pub elapsed: Duration,
    /// Full body, or the error raised while reading it.
    pub body: Result<Vec<u8>, ExecutionError>,
}

/// Contract for anything able to send a prepared request.
///
/// The executor only depends on this trait, so tests can script responses
/// without a network. `Err` means no response at all (connection, DNS,
/// timeout); it should be an `ExecutionError::Transport`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &PreparedRequest) -> Result<TransportResponse, ExecutionError>;
}
