mod common;

use common::{spawn_app_without_db, ALICE_TOKEN};

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app_without_db().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/health_check", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    assert_eq!(Some(0), response.content_length());
}

#[tokio::test]
async fn missing_token_is_rejected_with_401() {
    let app = spawn_app_without_db().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/chat/conversations", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 401);

    let body: serde_json::Value = response.json().await.expect("Body is not JSON");
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Authentication required.");
}

#[tokio::test]
async fn unknown_token_is_rejected_with_401() {
    let app = spawn_app_without_db().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/notifications/summary", &app.address))
        .bearer_auth("forged-token")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn malformed_query_parameters_get_a_json_error_body() {
    let app = spawn_app_without_db().await;
    let client = reqwest::Client::new();

    // rejected by the query extractor, before any storage access
    let response = client
        .get(&format!("{}/notifications?type=bogus", &app.address))
        .bearer_auth(ALICE_TOKEN)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.expect("Body is not JSON");
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn non_numeric_path_ids_get_a_json_error_body() {
    let app = spawn_app_without_db().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/notifications/abc/read", &app.address))
        .bearer_auth(ALICE_TOKEN)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.expect("Body is not JSON");
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn malformed_authorization_scheme_is_rejected() {
    let app = spawn_app_without_db().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/chat/users", &app.address))
        .header("Authorization", format!("Basic {}", ALICE_TOKEN))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 401);
}
