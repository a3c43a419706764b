use async_trait::async_trait;
use reqwest::{Client, Method};
use std::time::Instant;

use super::{HttpTransport, TransportResponse};
use crate::errors::ExecutionError;
use crate::protocol::HttpMethod;
use crate::request::PreparedRequest;

/// Production transport backed by `reqwest`.
///
/// One client is shared across the whole run so connections are reused;
/// the timeout is applied per request.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    fn method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Patch => Method::PATCH,
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[tracing::instrument(name = "http_send", skip_all, fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: &PreparedRequest) -> Result<TransportResponse, ExecutionError> {
        let mut builder = self
            .client
            .request(Self::method(request.method), &request.url)
            .timeout(request.timeout);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let start = Instant::now();
        let response = builder.send().await.map_err(|e| {
            tracing::error!(error = %e, "HTTP request failed");
            ExecutionError::Transport(e.to_string())
        })?;
        let elapsed = start.elapsed();

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|e| ExecutionError::ResponseRead(e.to_string()));

        Ok(TransportResponse {
            status,
            elapsed,
            body,
        })
    }
}
