//! Response envelope construction and the write-at-most-once discipline.
//!
//! All handled responses are HTTP 200 with a JSON envelope
//! `{"code": string, "data"?: any}`. The [`ResponseWriter`] records at most
//! one response per request: the first write wins and later writes are
//! ignored, which is what lets raw handlers write directly while the
//! dispatch pipeline stays oblivious.

use std::sync::Arc;

use bytes::Bytes;
use http::{header, Response, StatusCode};
use http_body_util::Full;
use parking_lot::Mutex;
use serde_json::Value;

/// The response type the gateway produces.
pub type HttpResponse = Response<Full<Bytes>>;

/// Builds the standard `{"code", "data"?}` envelope response.
///
/// Status is always 200 for handled responses; the fault code is the
/// application-level outcome. `Content-Length` is set explicitly and the
/// CORS header is added when the route enables it.
#[must_use]
pub fn envelope(code: &str, data: Option<Value>, cors: bool) -> HttpResponse {
    let mut body = serde_json::Map::new();
    body.insert("code".to_string(), Value::String(code.to_string()));
    if let Some(data) = data {
        body.insert("data".to_string(), data);
    }

    let payload = Bytes::from(Value::Object(body).to_string());

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json; charset=utf-8")
        .header(header::CONTENT_LENGTH, payload.len());

    if cors {
        builder = builder.header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*");
    }

    builder
        .body(Full::new(payload))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

/// Builds the preflight response for auto-registered OPTIONS routes.
#[must_use]
pub fn preflight() -> HttpResponse {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header(header::ACCESS_CONTROL_ALLOW_METHODS, "OPTIONS, POST")
        .header(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            "Authorization, Content-Type",
        )
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

/// Records at most one response per request.
///
/// Cloneable so raw handlers can hold it across the dispatch pipeline; all
/// clones share the slot. Once a response is recorded every later write is
/// a no-op, logged at debug level.
#[derive(Clone)]
pub struct ResponseWriter {
    inner: Arc<WriterInner>,
}

struct WriterInner {
    cors: bool,
    slot: Mutex<Option<HttpResponse>>,
}

impl ResponseWriter {
    /// Creates a writer for one request.
    #[must_use]
    pub fn new(cors: bool) -> Self {
        Self {
            inner: Arc::new(WriterInner {
                cors,
                slot: Mutex::new(None),
            }),
        }
    }

    /// Returns `true` once a response has been recorded.
    #[must_use]
    pub fn is_sent(&self) -> bool {
        self.inner.slot.lock().is_some()
    }

    /// Records an `ok` envelope.
    pub fn send_ok(&self, data: Option<Value>) {
        self.send_envelope("ok", data);
    }

    /// Records a fault envelope.
    pub fn send_fault(&self, code: &str, data: Option<Value>) {
        self.send_envelope(code, data);
    }

    /// Records an arbitrary response (raw handlers writing directly).
    pub fn send_response(&self, response: HttpResponse) {
        let mut slot = self.inner.slot.lock();
        if slot.is_some() {
            tracing::debug!("response already sent, ignoring write");
            return;
        }
        *slot = Some(response);
    }

    fn send_envelope(&self, code: &str, data: Option<Value>) {
        let mut slot = self.inner.slot.lock();
        if slot.is_some() {
            tracing::debug!(code, "response already sent, ignoring write");
            return;
        }
        *slot = Some(envelope(code, data, self.inner.cors));
    }

    /// Takes the recorded response, if any.
    #[must_use]
    pub fn take(&self) -> Option<HttpResponse> {
        self.inner.slot.lock().take()
    }
}

impl std::fmt::Debug for ResponseWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseWriter")
            .field("cors", &self.inner.cors)
            .field("sent", &self.is_sent())
            .finish()
    }
}
