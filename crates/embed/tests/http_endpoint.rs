use std::sync::Arc;
use std::time::Duration;

use embed::{EmbedError, Embedder, EmbeddingClient, HttpEndpoint};
use mockito::Matcher;
use resilience::RecordingSleeper;
use serde_json::json;

fn client_for(url: String, sleeper: &RecordingSleeper) -> EmbeddingClient {
    let endpoint = HttpEndpoint::new(url, Duration::from_secs(5))
        .unwrap()
        .with_auth_header("Bearer test-token");
    EmbeddingClient::new(Arc::new(endpoint)).with_sleeper(Arc::new(sleeper.clone()))
}

#[tokio::test]
async fn posts_inputs_envelope_and_unwraps_response() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/embed")
        .match_header("content-type", "application/json")
        .match_header("authorization", "Bearer test-token")
        .match_body(Matcher::Json(json!({ "inputs": "Gru is a supervillain" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[[[0.5, -0.25, 0.125]]]")
        .create_async()
        .await;

    let sleeper = RecordingSleeper::default();
    let embedding = client_for(format!("{}/embed", server.url()), &sleeper)
        .embed("Gru is a supervillain")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(embedding.as_slice(), &[0.5, -0.25, 0.125]);
    assert!(sleeper.delays().is_empty());
}

#[tokio::test]
async fn service_unavailable_is_retried_until_budget_is_spent() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/embed")
        .with_status(503)
        .with_body("model loading")
        .expect(3)
        .create_async()
        .await;

    let sleeper = RecordingSleeper::default();
    let err = client_for(format!("{}/embed", server.url()), &sleeper)
        .embed("hello")
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, EmbedError::Service { .. }));
    assert!(err.to_string().contains("503"));
    assert_eq!(
        sleeper.delays(),
        vec![Duration::from_secs(1), Duration::from_secs(2)]
    );
}

#[tokio::test]
async fn bad_request_is_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/embed")
        .with_status(400)
        .with_body(r#"{"error":"inputs must be a string"}"#)
        .expect(1)
        .create_async()
        .await;

    let sleeper = RecordingSleeper::default();
    let err = client_for(format!("{}/embed", server.url()), &sleeper)
        .embed("hello")
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, EmbedError::Rejected { .. }));
    assert!(sleeper.delays().is_empty());
}

#[tokio::test]
async fn non_json_body_is_protocol_error() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/embed")
        .with_status(200)
        .with_body("not json at all")
        .expect(1)
        .create_async()
        .await;

    let sleeper = RecordingSleeper::default();
    let err = client_for(format!("{}/embed", server.url()), &sleeper)
        .embed("hello")
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, EmbedError::Protocol(_)));
}

#[tokio::test]
async fn empty_list_is_invalid_embedding() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/embed")
        .with_status(200)
        .with_body("[[]]")
        .create_async()
        .await;

    let sleeper = RecordingSleeper::default();
    let err = client_for(format!("{}/embed", server.url()), &sleeper)
        .embed("hello")
        .await
        .unwrap_err();

    assert!(matches!(err, EmbedError::InvalidEmbedding(_)));
}
