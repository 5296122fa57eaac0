//! Scripted transport used by the unit tests.

use crate::api::transport::{RawResponse, Transport};
use crate::error::BoxError;
use async_trait::async_trait;
use reqwest::Request;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// One request as seen by the transport
#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub path: String,
    pub subject_type: u8,
    pub collection_type: u8,
    pub offset: u32,
    pub limit: u32,
    pub user_agent: Option<String>,
    pub authorization: Option<String>,
    /// Zero-based count of earlier calls for the same (type, offset, limit)
    pub attempt: u32,
    pub at: Instant,
}

type Responder = dyn Fn(&RecordedCall) -> Result<RawResponse, BoxError> + Send + Sync;

/// Transport answering from a closure and recording every call
pub(crate) struct ScriptedTransport {
    responder: Box<Responder>,
    latency: Duration,
    calls: Mutex<Vec<RecordedCall>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedTransport {
    pub(crate) fn new(
        responder: impl Fn(&RecordedCall) -> Result<RawResponse, BoxError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            latency: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Serve `totals[collection_type]` items per collection type, 50 per page
    pub(crate) fn with_totals(totals: HashMap<u8, u32>) -> Self {
        Self::new(move |call| {
            let total = totals.get(&call.collection_type).copied().unwrap_or(0);
            Ok(page_response(call, total))
        })
    }

    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub(crate) fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, request: &Request) -> RecordedCall {
        let query: HashMap<String, String> = request.url().query_pairs().into_owned().collect();
        let param = |name: &str| -> u32 {
            query.get(name).and_then(|v| v.parse().ok()).unwrap_or(0)
        };
        let header = |name: reqwest::header::HeaderName| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        let mut calls = self.calls.lock().unwrap();
        let mut call = RecordedCall {
            path: request.url().path().to_string(),
            subject_type: param("subject_type") as u8,
            collection_type: param("type") as u8,
            offset: param("offset"),
            limit: param("limit"),
            user_agent: header(reqwest::header::USER_AGENT),
            authorization: header(reqwest::header::AUTHORIZATION),
            attempt: 0,
            at: Instant::now(),
        };
        call.attempt = calls
            .iter()
            .filter(|c| {
                c.collection_type == call.collection_type
                    && c.offset == call.offset
                    && c.limit == call.limit
            })
            .count() as u32;
        calls.push(call.clone());
        call
    }
}

/// Leaves the in-flight count even when the call is dropped mid-flight
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: Request) -> Result<RawResponse, BoxError> {
        let call = self.record(&request);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let _in_flight = InFlightGuard(&self.in_flight);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        (self.responder)(&call)
    }
}

/// Build a 200 response for `call` out of a collection holding `total` items
///
/// Item ids are `collection_type * 100_000 + position`, so ids are unique
/// across collection types.
pub(crate) fn page_response(call: &RecordedCall, total: u32) -> RawResponse {
    let end = total.min(call.offset.saturating_add(call.limit));
    let data: Vec<_> = (call.offset..end)
        .map(|position| {
            json!({
                "subject": {
                    "id": call.collection_type as u64 * 100_000 + position as u64,
                    "name": format!("subject {position}"),
                    "name_cn": ""
                },
                "tags": ["tag"],
                "rate": 7,
                "type": call.collection_type,
                "subject_type": call.subject_type,
                "private": false
            })
        })
        .collect();

    let body = json!({
        "data": data,
        "total": total,
        "limit": call.limit,
        "offset": call.offset
    });

    RawResponse::new(200, body.to_string())
}

pub(crate) fn status(status: u16) -> Result<RawResponse, BoxError> {
    Ok(RawResponse::new(status, format!("status {status}")))
}

pub(crate) fn connection_refused() -> Result<RawResponse, BoxError> {
    Err(Box::new(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "connection refused",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::{Method, Url};

    fn request(offset: u32) -> Request {
        let url = format!("http://localhost/v0/users/sai/collections?type=2&offset={offset}&limit=50");
        Request::new(Method::GET, Url::parse(&url).unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_call_leaves_in_flight() {
        let transport = ScriptedTransport::with_totals(HashMap::from([(2, 100)]))
            .with_latency(Duration::from_secs(1))
            .into_arc();

        let timed_out =
            tokio::time::timeout(Duration::from_millis(10), transport.execute(request(0))).await;
        assert!(timed_out.is_err());
        assert_eq!(transport.in_flight(), 0);

        let response = transport.execute(request(50)).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(transport.in_flight(), 0);
        assert_eq!(transport.peak_in_flight(), 1);
        assert_eq!(transport.call_count(), 2);
    }
}
