//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use cloudevents_http::config::{BindingConfig, ServerConfig};
use cloudevents_http::http::{EventServer, HttpBinding};
use cloudevents_http::{DistributedTracing, Envelope, Sampling};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// A receiver running on an ephemeral port.
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub binding: Arc<HttpBinding>,
    shutdown: Option<oneshot::Sender<()>>,
}

#[allow(dead_code)]
impl TestServer {
    pub fn url(&self, path: &str) -> reqwest::Url {
        reqwest::Url::parse(&format!("http://{}{}", self.addr, path)).unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Start an event server with the default binding settings.
#[allow(dead_code)]
pub async fn start_server(echo: bool) -> TestServer {
    start_server_with(BindingConfig::default(), echo).await
}

#[allow(dead_code)]
pub async fn start_server_with(binding: BindingConfig, echo: bool) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let binding = Arc::new(HttpBinding::from_config(&binding).unwrap());
    let config = ServerConfig {
        bind_address: addr.to_string(),
        echo,
        ..ServerConfig::default()
    };

    let (tx, rx) = oneshot::channel();
    let server = EventServer::new(config, binding.clone());
    tokio::spawn(async move {
        let _ = server
            .run(listener, async {
                let _ = rx.await;
            })
            .await;
    });

    TestServer {
        addr,
        binding,
        shutdown: Some(tx),
    }
}

/// An event carrying every attribute and both built-in extensions.
#[allow(dead_code)]
pub fn full_event() -> Envelope {
    Envelope::builder()
        .id("evt-0001")
        .source("https://example.com/orders")
        .event_type("com.example.order.created")
        .time("2018-04-05T17:31:00Z".parse().unwrap())
        .schema_url("https://example.com/schemas/order.json")
        .content_type("application/json")
        .data(json!({"order": 17, "items": ["a", "b"]}))
        .extension(
            DistributedTracing::new("00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01")
                .unwrap()
                .with_tracestate("rojo=00f067aa0ba902b7"),
        )
        .extension(Sampling::new(10).unwrap())
        .build()
        .unwrap()
}
