//! HTTP client for a resolved daemon instance.
//!
//! One explicitly constructed client per `DaemonApi`; callers pass it where
//! it is needed instead of reaching for an ambient singleton. Only the two
//! control endpoints exist: `verify` answers whether generated artifacts
//! are current, `generate` streams a regeneration.

use std::collections::HashMap;
use std::time::Duration;

use futures::StreamExt;
use reqwest::StatusCode;
use tracing::{debug, info};

use intrig_types::GenerateEvent;

use crate::config::ClientConfig;
use crate::error::{IntrigError, Result};
use crate::sync::sse::SseParser;

const VERIFY_ENDPOINT: &str = "api/operations/verify";
const GENERATE_ENDPOINT: &str = "api/operations/generate";

/// Per-request deadline for the verify round-trip. The generate stream is
/// bounded separately by the configured stream timeout.
const VERIFY_TIMEOUT: Duration = Duration::from_secs(30);

pub struct DaemonApi {
    client: reqwest::Client,
    verify_retries: u32,
    retry_delay: Duration,
    stream_timeout: Duration,
}

impl DaemonApi {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        // No global timeout on the client: the generate stream legitimately
        // stays open for minutes. Each call sets its own bound.
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| IntrigError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            verify_retries: config.verify_retries,
            retry_delay: config.retry_delay(),
            stream_timeout: config.stream_timeout(),
        })
    }

    /// Ask the daemon whether the cached hashes still match its sources.
    ///
    /// HTTP 200 means "current, skip regeneration". Any other response and
    /// any transport failure means "regenerate". Transient 5xx responses are
    /// retried up to the configured budget with a fixed delay before the
    /// last status decides.
    pub async fn verify(
        &self,
        base_url: &str,
        hashes: &HashMap<String, String>,
    ) -> Result<bool> {
        let url = endpoint(base_url, VERIFY_ENDPOINT);

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let response = self
                .client
                .post(&url)
                .json(hashes)
                .timeout(VERIFY_TIMEOUT)
                .send()
                .await;

            match response {
                Ok(res) if res.status() == StatusCode::OK => {
                    debug!("verify confirmed hashes after {} attempt(s)", attempt);
                    return Ok(true);
                }
                Ok(res) if res.status().is_server_error() && attempt <= self.verify_retries => {
                    debug!(
                        "verify attempt {} returned {}, retrying in {:?}",
                        attempt,
                        res.status(),
                        self.retry_delay
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Ok(res) => {
                    debug!("verify returned {}, regeneration needed", res.status());
                    return Ok(false);
                }
                Err(e) => {
                    // A daemon that cannot answer cannot confirm the hashes.
                    debug!("verify transport failure, regeneration needed: {}", e);
                    return Ok(false);
                }
            }
        }
    }

    /// Stream the generate endpoint, relaying each progress event to
    /// `on_event` as it arrives.
    ///
    /// Completes on a `done` frame or on end of stream; the whole operation
    /// is bounded by the configured stream timeout, after which the request
    /// is aborted and a `RequestTimeout` is returned.
    pub async fn generate<F>(&self, base_url: &str, on_event: F) -> Result<()>
    where
        F: FnMut(&GenerateEvent),
    {
        let url = endpoint(base_url, GENERATE_ENDPOINT);

        match tokio::time::timeout(self.stream_timeout, self.consume_stream(&url, on_event)).await
        {
            Ok(result) => result,
            // Dropping the future aborts the in-flight request.
            Err(_) => Err(IntrigError::RequestTimeout(format!(
                "{}s",
                self.stream_timeout.as_secs()
            ))),
        }
    }

    async fn consume_stream<F>(&self, url: &str, mut on_event: F) -> Result<()>
    where
        F: FnMut(&GenerateEvent),
    {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| IntrigError::DaemonUnavailable(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => {
                return Err(IntrigError::ResourceNotFound(url.to_string()));
            }
            status => {
                return Err(IntrigError::InvalidResponse(format!(
                    "generate returned {}",
                    status
                )));
            }
        }

        let mut parser = SseParser::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                IntrigError::InvalidResponse(format!("stream read failed: {}", e))
            })?;

            for event in parser.push_bytes(&chunk) {
                match &event {
                    GenerateEvent::Status { step, source_id } => {
                        match source_id {
                            Some(source) => info!("generate: {} ({})", step, source),
                            None => info!("generate: {}", step),
                        }
                        on_event(&event);
                    }
                    GenerateEvent::Done => {
                        on_event(&event);
                        return Ok(());
                    }
                    GenerateEvent::Unknown => {}
                }
            }
        }

        // The stream ended without a done frame. Known daemons close the
        // connection instead of sending one, so this counts as success;
        // whether that is the intended contract is an open question upstream.
        Ok(())
    }
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}
