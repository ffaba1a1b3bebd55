//! Integration tests for the burnout prediction contract.
//!
//! A mockito server stands in for the prediction service.

use std::time::Duration;

use calmpulse_core::{AdvisoryError, BurnoutClient, BurnoutRequest, BurnoutRisk};
use mockito::Matcher;
use serde_json::json;

fn request() -> BurnoutRequest {
    BurnoutRequest {
        screen_time: 150.0,
        breaks: 1,
        last_break: 90.0,
        mood: 3,
        sleep: 6.0,
    }
}

async fn client_for(server: &mockito::ServerGuard) -> BurnoutClient {
    BurnoutClient::new(&format!("{}/predict", server.url()), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_string_risk_level() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/predict")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "screen_time": 150.0,
            "breaks": 1,
            "last_break": 90.0,
            "mood": 3,
            "sleep": 6.0
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"burnout_risk": 2, "risk_level": "high",
                "recommendations": ["Take a longer break immediately", "Go for a short walk"]}"#,
        )
        .create_async()
        .await;

    let prediction = client_for(&server).await.predict(&request()).await.unwrap();
    mock.assert_async().await;
    assert_eq!(prediction.risk, BurnoutRisk::High);
    assert_eq!(
        prediction.recommendations,
        vec!["Take a longer break immediately", "Go for a short walk"]
    );
}

#[tokio::test]
async fn test_numeric_risk_level() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/predict")
        .with_status(200)
        .with_body(r#"{"risk_level": 1}"#)
        .create_async()
        .await;

    let prediction = client_for(&server).await.predict(&request()).await.unwrap();
    assert_eq!(prediction.risk, BurnoutRisk::Medium);
    assert!(prediction.recommendations.is_empty());
}

#[tokio::test]
async fn test_unrecognized_risk_level_is_unknown() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/predict")
        .with_status(200)
        .with_body(r#"{"risk_level": "catastrophic"}"#)
        .create_async()
        .await;

    let prediction = client_for(&server).await.predict(&request()).await.unwrap();
    assert_eq!(prediction.risk, BurnoutRisk::Unknown);
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/predict")
        .with_status(400)
        .with_body(r#"{"error": "No data provided"}"#)
        .create_async()
        .await;

    let err = client_for(&server).await.predict(&request()).await.unwrap_err();
    assert!(matches!(err, AdvisoryError::Status { status: 400 }));
    assert!(err.to_string().starts_with("Could not get burnout prediction"));
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/predict")
        .with_status(200)
        .with_body("<html>oops</html>")
        .create_async()
        .await;

    let err = client_for(&server).await.predict(&request()).await.unwrap_err();
    assert!(matches!(err, AdvisoryError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_invalid_input_never_hits_the_network() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/predict")
        .expect(0)
        .create_async()
        .await;

    let mut bad = request();
    bad.mood = 0;
    let err = client_for(&server).await.predict(&bad).await.unwrap_err();
    assert!(matches!(err, AdvisoryError::InvalidInput { .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_service() {
    // Nothing listens on port 9 on a test machine.
    let client = BurnoutClient::new("http://127.0.0.1:9/predict", Duration::from_secs(2)).unwrap();
    let err = client.predict(&request()).await.unwrap_err();
    assert!(matches!(err, AdvisoryError::Request(_)));
    assert!(err.to_string().contains("Is the prediction service running?"));
}
