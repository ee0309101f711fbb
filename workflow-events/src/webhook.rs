//! HTTP webhook delivery, grounded on the `http` transport in
//! `atomic-remote`: a thin `reqwest::Client` wrapper with a bounded retry
//! loop. Retries here are transport-level only (the POST itself failed to
//! land) — they never re-evaluate or replay engine state.

use std::time::Duration;

use async_trait::async_trait;

use crate::event::EventEnvelope;
use crate::sink::EventSink;

pub struct WebhookEventSink {
    client: reqwest::Client,
    url: String,
    retries: u32,
}

impl WebhookEventSink {
    pub fn new(url: String, timeout_ms: u64, retries: u32) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self {
            client,
            url,
            retries,
        })
    }

    async fn deliver_once(&self, event: &EventEnvelope) -> anyhow::Result<()> {
        let response = self.client.post(&self.url).json(event).send().await?;
        response.error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl EventSink for WebhookEventSink {
    async fn publish(&self, event: EventEnvelope) {
        let mut attempt = 0;
        loop {
            match self.deliver_once(&event).await {
                Ok(()) => return,
                Err(err) if attempt < self.retries => {
                    attempt += 1;
                    tracing::warn!(
                        attempt,
                        retries = self.retries,
                        %err,
                        "webhook delivery failed, retrying"
                    );
                }
                Err(err) => {
                    tracing::error!(%err, url = %self.url, "webhook delivery abandoned");
                    return;
                }
            }
        }
    }
}
