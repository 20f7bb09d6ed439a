//! Shared helpers for the integration tests.
//!
//! HTTP is served by a local `mockito` server; `ApiSettings::with_server`
//! points all three Pileus endpoints at it.

#![allow(dead_code)]

use mockito::{Matcher, Server};
use pileus_cli::{AccountScope, ApiClient, ApiSettings, Credentials};
use serde_json::json;
use std::io;
use std::sync::{Arc, Mutex};

pub const TOKEN: &str = "tok";
pub const API_KEY: &str = "key-1";
pub const ACCOUNT_KEY: &str = "key18745:0";

pub fn credentials() -> Credentials {
    Credentials::new("user@example.com", "hunter2")
}

/// Client pointed at `server` with the default account scope.
pub fn client(server: &Server) -> ApiClient {
    ApiClient::new(ApiSettings::with_server(&server.url()), AccountScope::default())
        .expect("client builds")
}

/// Client that has already logged in against a mocked auth endpoint.
pub fn authenticated_client(server: &mut Server) -> ApiClient {
    let auth = server
        .mock("POST", "/prod/credentials")
        .match_body(Matcher::Json(json!({
            "username": "user@example.com",
            "password": "hunter2"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"Authorization": TOKEN, "apikey": API_KEY}).to_string())
        .create();

    let mut api = client(server);
    api.authenticate(&credentials()).expect("login succeeds");
    auth.assert();
    api
}

/// In-memory log sink for asserting on `tracing` output.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a subscriber that writes into the returned buffer.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, buffer.contents())
}
