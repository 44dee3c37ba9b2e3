use std::time::Duration;

use anyhow::{Context, Result};
use ureq::{Agent, AgentBuilder};

const USER_AGENT: &str = concat!("address-verify/", env!("CARGO_PKG_VERSION"));

/// Any HTTP status the server answered with, 2xx or not.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One GET round trip. `Err` means no usable response: connection, timeout or
/// body read failures. Non-2xx statuses are returned as `Ok`.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpResponse>;
}

pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpResponse> {
        let mut request = self.agent.get(url);
        for (key, value) in query {
            request = request.query(key, value);
        }

        let response = match request.call() {
            Ok(x) => x,
            Err(ureq::Error::Status(_, x)) => x,
            Err(x) => return Err(x).with_context(|| format!("request to {url} failed")),
        };

        let status = response.status();
        let body = response
            .into_string()
            .with_context(|| format!("failed to read response body from {url}"))?;

        Ok(HttpResponse { status, body })
    }
}
