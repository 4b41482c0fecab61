//! Receiver server over a real socket.

use cloudevents_http::http::{ClientError, EventClient, Mode};
use cloudevents_http::{DistributedTracing, Envelope};
use reqwest::StatusCode;

mod common;

#[tokio::test]
async fn test_echo_binary() {
    let server = common::start_server(true).await;
    let client = EventClient::new(server.binding.clone(), server.url("/events"));

    let sent = common::full_event();
    let reply = client.send_and_receive(&sent, Mode::Binary).await.unwrap();
    assert_eq!(reply, Some(sent));
}

#[tokio::test]
async fn test_echo_structured() {
    let server = common::start_server(true).await;
    let client = EventClient::new(server.binding.clone(), server.url("/"));

    let sent = common::full_event();
    let response = client.send(&sent, Mode::Structured).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "application/cloudevents+json"
    );
    assert!(response.headers().contains_key("x-request-id"));

    let reply = client.read_response(response).await.unwrap();
    assert_eq!(reply, Some(sent));
}

#[tokio::test]
async fn test_accepted_without_echo() {
    let server = common::start_server(false).await;
    let client = EventClient::new(server.binding.clone(), server.url("/events"));

    let event = Envelope::builder()
        .random_id()
        .source("/integration")
        .event_type("com.example.ping")
        .extension(DistributedTracing::new("00-1-2-01").unwrap())
        .build()
        .unwrap();

    let reply = client.send_and_receive(&event, Mode::Binary).await.unwrap();
    assert!(reply.is_none());
}

#[tokio::test]
async fn test_unsupported_content_type() {
    let server = common::start_server(true).await;

    let response = reqwest::Client::new()
        .post(server.url("/events"))
        .header("content-type", "text/plain")
        .body("not an event")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body = response.text().await.unwrap();
    assert!(body.contains("no cloudevent type identified"));
}

#[tokio::test]
async fn test_empty_structured_body() {
    let server = common::start_server(true).await;

    let response = reqwest::Client::new()
        .post(server.url("/"))
        .header("content-type", "application/cloudevents+json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text().await.unwrap(), "no cloudevent body");
}

#[tokio::test]
async fn test_client_reports_rejection() {
    let server = common::start_server(true).await;
    let client = EventClient::new(server.binding.clone(), server.url("/events"));

    // Content type that is neither marker: the binary body goes out as text/plain.
    let event = Envelope::builder()
        .id("txt")
        .source("/s")
        .event_type("t")
        .content_type("text/plain")
        .data("hello")
        .build()
        .unwrap();

    let err = client.send_and_receive(&event, Mode::Binary).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Status { status, .. } if status == StatusCode::UNSUPPORTED_MEDIA_TYPE
    ));
}
