use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use delights::config::Config;
use delights::recorder::Recorder;
use delights::recorder::sheet::CsvSheet;
use delights::recorder::slack::{Notifier, SlackNotifier};

/// A running test server instance.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Submit a delight as JSON, return (body, status).
    pub async fn submit_json(&self, data: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/submit"))
            .json(data)
            .send()
            .await
            .expect("submit json failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Submit a delight as a plain HTML form post, return (body, status).
    pub async fn submit_form(&self, data: &[(&str, &str)]) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/submit"))
            .form(data)
            .send()
            .await
            .expect("submit form failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// POST a raw body with the given content type to `path`.
    pub async fn post_raw(&self, path: &str, content_type: &str, body: Vec<u8>) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .header("content-type", content_type)
            .body(body)
            .send()
            .await
            .expect("raw post failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Record a delight directly with the recorder, return (body, status).
    pub async fn record_json(&self, data: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/record"))
            .json(data)
            .send()
            .await
            .expect("record json failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

pub fn test_config(relay_url: Option<String>) -> Config {
    Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        max_body_size: 4096,
        log_level: "warn".to_string(),
        relay_url: relay_url.map(|u| u.parse().expect("invalid relay url in test")),
        cors_origins: vec![],
        recorder: None,
    }
}

/// Spawn an intake-only app relaying to `relay_url`.
pub async fn spawn_app(relay_url: Option<String>) -> TestApp {
    spawn_with(test_config(relay_url), None).await
}

/// Spawn an app that also hosts a recorder writing to `sheet_path`.
pub async fn spawn_recorder(sheet_path: &Path, slack_url: Option<String>) -> TestApp {
    let sheet = CsvSheet::open(sheet_path)
        .await
        .expect("Failed to open test sheet");
    let notifier: Option<Arc<dyn Notifier>> = slack_url.map(|u| {
        let notifier = SlackNotifier::new(u.parse().unwrap()).expect("Failed to build notifier");
        Arc::new(notifier) as Arc<dyn Notifier>
    });
    let recorder = Recorder::new(Arc::new(sheet), notifier);
    spawn_with(test_config(None), Some(recorder)).await
}

pub async fn spawn_with(config: Config, recorder: Option<Recorder>) -> TestApp {
    let app = delights::build_app(config, recorder).expect("Failed to build app");

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    // Spawn server in background
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        client: Client::new(),
    }
}

/// A URL on a port nothing is listening on.
pub async fn refused_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/record")
}

pub fn valid_submission() -> Value {
    json!({
        "ticketLink": "https://a.co/x",
        "productLink": "https://a.co/y",
        "occasion": "Birthday",
        "agentName": "Jane Doe",
    })
}
