//! Axum extractor for inbound events.
//!
//! The body is buffered in full (honoring the router's body limit) before
//! the binding sees it.

use std::sync::Arc;

use axum::extract::rejection::BytesRejection;
use axum::extract::{FromRef, FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::error::BindingError;
use crate::event::Envelope;
use crate::http::binding::{HttpBinding, Mode};

/// A decoded event and the mode it arrived in.
#[derive(Debug, Clone)]
pub struct Event {
    pub envelope: Envelope,
    pub mode: Mode,
}

/// Why an [`Event`] could not be extracted.
#[derive(Debug)]
pub enum EventRejection {
    /// The body could not be buffered (too large, or the stream failed).
    Body(BytesRejection),
    /// The buffered message is not a valid event.
    Decode(BindingError),
}

impl EventRejection {
    pub fn status(&self) -> StatusCode {
        match self {
            EventRejection::Body(rejection) => rejection.status(),
            EventRejection::Decode(BindingError::UnsupportedContentType(_)) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            EventRejection::Decode(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for EventRejection {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            EventRejection::Body(rejection) => rejection.body_text(),
            EventRejection::Decode(e) => e.to_string(),
        };
        (status, message).into_response()
    }
}

impl<S> FromRequest<S> for Event
where
    S: Send + Sync,
    Arc<HttpBinding>: FromRef<S>,
{
    type Rejection = EventRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let binding = Arc::<HttpBinding>::from_ref(state);
        let headers = req.headers().clone();
        let body = Bytes::from_request(req, state)
            .await
            .map_err(EventRejection::Body)?;

        let (envelope, mode) = binding
            .decode_http(&headers, body)
            .map_err(EventRejection::Decode)?;
        Ok(Event { envelope, mode })
    }
}
