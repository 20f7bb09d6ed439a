// Blocking HTTP transport shared by every API call.
//
// One attempt per call, fixed timeout, no retries. Every exchange is logged
// with its URL and status; failures come back as tagged [`ApiError`]s.

use crate::error::{ApiError, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info};

/// Decoded response body: JSON when it parses, raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
}

impl Payload {
    pub fn decode(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(value) => Payload::Json(value),
            Err(_) => Payload::Text(text),
        }
    }

    /// Body rendered back to a string, for error reporting.
    pub fn to_body_string(&self) -> String {
        match self {
            Payload::Json(value) => value.to_string(),
            Payload::Text(text) => text.clone(),
        }
    }
}

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub payload: Payload,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Thin wrapper over a reqwest blocking client with a fixed timeout.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::from_reqwest("<client builder>", e))?;
        Ok(Self { client })
    }

    /// POST `payload` as JSON.
    ///
    /// Any status is returned to the caller; a non-200 status is logged as
    /// an error first so callers only decide what it means for them.
    pub fn post<T: Serialize + ?Sized>(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        payload: &T,
    ) -> Result<ApiResponse> {
        let headers = build_headers(headers)?;
        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(payload)
            .send()
            .map_err(|e| log_failure("POST", url, e))?;

        let status = response.status().as_u16();
        info!(%url, status, "POST request completed");
        let text = response.text().map_err(|e| log_failure("POST", url, e))?;
        debug!(%url, body = %text, "POST response body");
        if status != 200 {
            error!(%url, status, body = %text, "POST request failed");
        }

        Ok(ApiResponse {
            status,
            payload: Payload::decode(text),
        })
    }

    /// GET a JSON document. Anything other than a 200 is an error.
    pub fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<Value> {
        let headers = build_headers(headers)?;
        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .map_err(|e| log_failure("GET", url, e))?;

        let status = response.status().as_u16();
        info!(%url, status, "GET request completed");
        let text = response.text().map_err(|e| log_failure("GET", url, e))?;
        info!(%url, body = %text, "GET response body");
        if status != 200 {
            error!(%url, status, body = %text, "GET request failed");
            return Err(ApiError::Server { status, body: text });
        }

        serde_json::from_str(&text).map_err(|e| {
            error!(%url, error = %e, "GET response is not valid JSON");
            ApiError::Decode {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

fn log_failure(method: &str, url: &str, err: reqwest::Error) -> ApiError {
    let err = ApiError::from_reqwest(url, err);
    error!(method, %url, error = %err, "HTTP request failed");
    err
}

fn build_headers(pairs: &[(&str, &str)]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(pairs.len());
    for (name, value) in pairs {
        let header = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ApiError::InvalidHeader((*name).to_string()))?;
        let value =
            HeaderValue::from_str(value).map_err(|_| ApiError::InvalidHeader((*name).to_string()))?;
        headers.insert(header, value);
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_decodes_json_then_text() {
        assert_eq!(
            Payload::decode(r#"{"ok":true}"#.into()),
            Payload::Json(json!({"ok": true}))
        );
        assert_eq!(
            Payload::decode("#!/bin/sh\necho hi".into()),
            Payload::Text("#!/bin/sh\necho hi".into())
        );
    }

    #[test]
    fn test_build_headers_rejects_bad_value() {
        let err = build_headers(&[("apikey", "bad\nvalue")]).unwrap_err();
        assert!(matches!(err, ApiError::InvalidHeader(name) if name == "apikey"));
    }

    #[test]
    fn test_build_headers_keeps_all_pairs() {
        let headers = build_headers(&[("Authorization", "tok"), ("apikey", "key")]).unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers["apikey"], "key");
    }

    #[test]
    fn test_connection_refused_is_tagged() {
        let transport = HttpTransport::new(Duration::from_secs(2)).unwrap();
        // Port 9 (discard) is closed on test machines.
        let err = transport.get("http://127.0.0.1:9/users", &[]).unwrap_err();
        assert!(err.is_transport_error(), "unexpected error: {err:?}");
    }
}
