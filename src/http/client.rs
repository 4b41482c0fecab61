//! Outbound event delivery over `reqwest`.

use std::sync::Arc;

use bytes::Bytes;
use reqwest::{StatusCode, Url};
use thiserror::Error;

use crate::error::BindingError;
use crate::event::Envelope;
use crate::http::binding::{header_map, to_wire, HttpBinding, Mode};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error("receiver answered {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// Sends events to one endpoint and decodes event replies.
#[derive(Debug, Clone)]
pub struct EventClient {
    http: reqwest::Client,
    binding: Arc<HttpBinding>,
    endpoint: Url,
}

impl EventClient {
    pub fn new(binding: Arc<HttpBinding>, endpoint: Url) -> Self {
        Self::with_client(reqwest::Client::new(), binding, endpoint)
    }

    pub fn with_client(http: reqwest::Client, binding: Arc<HttpBinding>, endpoint: Url) -> Self {
        Self {
            http,
            binding,
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// POST the event. The message is fully encoded before anything is sent.
    pub async fn send(&self, envelope: &Envelope, mode: Mode) -> Result<reqwest::Response, ClientError> {
        let wire = self.binding.encode(envelope, mode)?;
        let headers = header_map(&wire.headers)?;

        tracing::debug!(
            endpoint = %self.endpoint,
            id = %envelope.id(),
            mode = %mode,
            "Sending event"
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .headers(headers)
            .body(wire.body_bytes())
            .send()
            .await?;
        Ok(response)
    }

    /// POST the event and decode the reply, if the receiver sent one back.
    pub async fn send_and_receive(
        &self,
        envelope: &Envelope,
        mode: Mode,
    ) -> Result<Option<Envelope>, ClientError> {
        let response = self.send(envelope, mode).await?;
        self.read_response(response).await
    }

    /// Decode an event reply. Success without a body is `None`; any
    /// non-2xx status is an error carrying the body text.
    pub async fn read_response(
        &self,
        response: reqwest::Response,
    ) -> Result<Option<Envelope>, ClientError> {
        let status = response.status();
        let headers = response.headers().clone();
        let body: Bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(ClientError::Status {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        if body.is_empty() && self.binding.detect(&to_wire(&headers, Bytes::new()).headers).is_err() {
            return Ok(None);
        }

        let (envelope, _) = self.binding.decode_http(&headers, body)?;
        Ok(Some(envelope))
    }
}
