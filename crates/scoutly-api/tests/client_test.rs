#![allow(clippy::unwrap_used)]
// Integration tests for `ScoutClient` using wiremock.

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scoutly_api::{Credentials, Error, ScoutClient};

// ── Helpers ─────────────────────────────────────────────────────────

fn credentials() -> Credentials {
    Credentials::new("user@example.com", SecretString::from("hunter2".to_string()))
}

async fn setup() -> (MockServer, ScoutClient) {
    let server = MockServer::start().await;
    let client =
        ScoutClient::with_client(reqwest::Client::new(), &server.uri(), credentials()).unwrap();
    (server, client)
}

/// Mount a successful `/auth` mock and authenticate the client.
async fn authenticate(server: &MockServer, client: &ScoutClient) {
    Mock::given(method("POST"))
        .and(path("/auth"))
        .and(body_partial_json(json!({ "email": "user@example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "jwt": "test-token" })))
        .mount(server)
        .await;

    client.authenticate().await.unwrap();
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_authenticate_success() {
    let (server, client) = setup().await;

    assert!(!client.is_authenticated());
    authenticate(&server, &client).await;
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn test_authenticate_failure() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "invalid credentials" })),
        )
        .mount(&server)
        .await;

    let result = client.authenticate().await;

    match result {
        Err(Error::Authentication { message }) => {
            assert_eq!(message, "invalid credentials");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_unauthenticated_request_fails_locally() {
    let (_server, client) = setup().await;

    let result = client.list_locations().await;
    assert!(matches!(result, Err(Error::NotAuthenticated)));
}

// ── Location tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_list_locations() {
    let (server, client) = setup().await;
    authenticate(&server, &client).await;

    Mock::given(method("GET"))
        .and(path("/locations"))
        .and(header("Authorization", "test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "loc-1", "name": "Home" },
            { "id": "loc-2" }
        ])))
        .mount(&server)
        .await;

    let locations = client.list_locations().await.unwrap();

    assert_eq!(locations.len(), 2);
    assert_eq!(locations[0].id, "loc-1");
    assert_eq!(locations[0].name.as_deref(), Some("Home"));
    assert!(locations[1].name.is_none());
}

// ── Device tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_devices() {
    let (server, client) = setup().await;
    authenticate(&server, &client).await;

    Mock::given(method("GET"))
        .and(path("/locations/loc-1/devices"))
        .and(header("Authorization", "test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "d1",
                "name": "Front Door",
                "type": "door_panel",
                "reported": {
                    "trigger": { "state": "open" },
                    "battery": { "low": true },
                    "timedout": false
                }
            },
            {
                "id": "d2",
                "name": "Hub Keypad",
                "type": "keypad"
            }
        ])))
        .mount(&server)
        .await;

    let devices = client.list_devices("loc-1").await.unwrap();

    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].id, "d1");
    assert_eq!(devices[0].device_type, "door_panel");
    assert!(devices[0].reported.as_ref().unwrap().battery.as_ref().unwrap().low);
    assert!(devices[1].reported.is_none());
}

#[tokio::test]
async fn test_get_device() {
    let (server, client) = setup().await;
    authenticate(&server, &client).await;

    Mock::given(method("GET"))
        .and(path("/devices/d2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "d2",
            "name": "Basement Smoke",
            "type": "smoke_alarm",
            "reported": {
                "trigger": { "state": { "smoke": "ok", "co": "alarm" } }
            }
        })))
        .mount(&server)
        .await;

    let device = client.get_device("d2").await.unwrap();

    assert_eq!(device.id, "d2");
    assert_eq!(device.device_type, "smoke_alarm");
    assert!(device.reported.unwrap().trigger.is_some());
}

#[tokio::test]
async fn test_get_device_not_found() {
    let (server, client) = setup().await;
    authenticate(&server, &client).await;

    Mock::given(method("GET"))
        .and(path("/devices/nope"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "device not found" })),
        )
        .mount(&server)
        .await;

    let result = client.get_device("nope").await;

    let err = result.unwrap_err();
    assert!(err.is_not_found());
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "device not found");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_expired_session_maps_to_session_expired() {
    let (server, client) = setup().await;
    authenticate(&server, &client).await;

    Mock::given(method("GET"))
        .and(path("/devices/d1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.get_device("d1").await;

    let err = result.unwrap_err();
    assert!(err.is_auth_expired());
    assert!(matches!(err, Error::SessionExpired));
}

#[tokio::test]
async fn test_malformed_body_is_a_deserialization_error() {
    let (server, client) = setup().await;
    authenticate(&server, &client).await;

    Mock::given(method("GET"))
        .and(path("/devices/d1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
        .mount(&server)
        .await;

    let result = client.get_device("d1").await;

    assert!(matches!(result, Err(Error::Deserialization { .. })));
}
