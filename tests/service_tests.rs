//! Integration tests for the Nextcloud and Telegram clients.
//!
//! Both run against local mockito servers.

use mockito::{Matcher, Server};
use std::fs;
use tempfile::TempDir;
use timeframe_archivist::error::{NotificationError, UploadError};
use timeframe_archivist::models::config::{NetworkConfig, NextcloudConfig, TelegramConfig};
use timeframe_archivist::services::nextcloud::NextcloudClient;
use timeframe_archivist::services::telegram::TelegramNotifier;

fn network() -> NetworkConfig {
    NetworkConfig {
        retries: 0,
        retry_delay_ms: 0,
        ..NetworkConfig::default()
    }
}

fn nextcloud(url: String) -> NextcloudClient {
    let config = NextcloudConfig {
        url: Some(url),
        username: Some("archivist".to_string()),
        password: Some("secret".to_string()),
    };
    NextcloudClient::new(&config, &network()).unwrap()
}

fn telegram(url: String) -> TelegramNotifier {
    let config = TelegramConfig {
        bot_token: Some("123:abc".to_string()),
        chat_id: Some("-100200".to_string()),
        api_url: url,
    };
    TelegramNotifier::new(&config, &network()).unwrap()
}

// ========== NEXTCLOUD TESTS ==========

#[tokio::test]
async fn test_ensure_folder_creates_each_level() {
    let mut server = Server::new_async().await;
    let created = server
        .mock("MKCOL", "/remote.php/dav/files/archivist/Videos")
        .with_status(405)
        .create_async()
        .await;
    let nested = server
        .mock("MKCOL", "/remote.php/dav/files/archivist/Videos/Football")
        .with_status(201)
        .create_async()
        .await;

    nextcloud(server.url()).ensure_folder("Videos/Football").await.unwrap();
    created.assert_async().await;
    nested.assert_async().await;
}

#[tokio::test]
async fn test_ensure_folder_failure() {
    let mut server = Server::new_async().await;
    server
        .mock("MKCOL", "/remote.php/dav/files/archivist/Videos")
        .with_status(507)
        .with_body("Insufficient Storage")
        .create_async()
        .await;

    let err = nextcloud(server.url()).ensure_folder("Videos").await.unwrap_err();
    assert!(matches!(err, UploadError::UnexpectedStatus { status: 507, .. }));
}

#[tokio::test]
async fn test_upload_file_streams_content() {
    let temp_dir = TempDir::new().unwrap();
    let local = temp_dir.path().join("clip.mov");
    fs::write(&local, "video bytes").unwrap();

    let mut server = Server::new_async().await;
    let put = server
        .mock("PUT", "/remote.php/dav/files/archivist/Videos/clip.mov")
        .match_header("authorization", Matcher::Regex("^Basic ".to_string()))
        .match_body("video bytes")
        .with_status(201)
        .create_async()
        .await;

    nextcloud(server.url())
        .upload_file(&local, "Videos/clip.mov")
        .await
        .unwrap();
    put.assert_async().await;
}

#[tokio::test]
async fn test_upload_file_errors() {
    let temp_dir = TempDir::new().unwrap();
    let local = temp_dir.path().join("clip.mov");
    fs::write(&local, "video bytes").unwrap();

    let mut server = Server::new_async().await;
    server
        .mock("PUT", "/remote.php/dav/files/archivist/denied.mov")
        .with_status(401)
        .create_async()
        .await;
    server
        .mock("PUT", "/remote.php/dav/files/archivist/broken.mov")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;
    let client = nextcloud(server.url());

    let err = client.upload_file(&local, "denied.mov").await.unwrap_err();
    assert!(matches!(err, UploadError::AuthRejected(_)));

    let err = client.upload_file(&local, "broken.mov").await.unwrap_err();
    assert!(matches!(err, UploadError::UnexpectedStatus { status: 500, ref body, .. } if body == "boom"));

    let err = client
        .upload_file(&temp_dir.path().join("missing.mov"), "missing.mov")
        .await
        .unwrap_err();
    assert!(matches!(err, UploadError::FileNotFound(_)));
}

#[tokio::test]
async fn test_public_share_link() {
    let mut server = Server::new_async().await;
    let share = server
        .mock("POST", "/ocs/v1.php/apps/files_sharing/api/v1/shares")
        .match_header("OCS-APIRequest", "true")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("path".to_string(), "/Videos/clip.mov".to_string()),
            Matcher::UrlEncoded("shareType".to_string(), "3".to_string()),
        ]))
        .with_status(200)
        .with_body(
            "<?xml version=\"1.0\"?><ocs><meta><status>ok</status><statuscode>100</statuscode>\
             <message>OK</message></meta><data><token>TkN1</token></data></ocs>",
        )
        .create_async()
        .await;

    let url = server.url();
    let link = nextcloud(url.clone())
        .create_public_share("Videos/clip.mov")
        .await
        .unwrap();
    assert_eq!(link, format!("{}/s/TkN1", url));
    share.assert_async().await;
}

#[tokio::test]
async fn test_public_share_refused_in_body() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/ocs/v1.php/apps/files_sharing/api/v1/shares")
        .with_status(200)
        .with_body(
            "<?xml version=\"1.0\"?><ocs><meta><status>failure</status><statuscode>403</statuscode>\
             <message>Public upload disabled</message></meta><data/></ocs>",
        )
        .create_async()
        .await;

    let err = nextcloud(server.url())
        .create_public_share("Videos/clip.mov")
        .await
        .unwrap_err();
    assert!(matches!(err, UploadError::ShareFailed { statuscode: 403, .. }));
}

// ========== TELEGRAM TESTS ==========

#[tokio::test]
async fn test_send_message() {
    let mut server = Server::new_async().await;
    let sent = server
        .mock("POST", "/bot123:abc/sendMessage")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "chat_id": "-100200",
            "text": "Wednesday football 03_04_2024\nhttps://c/s/a"
        })))
        .with_status(200)
        .with_body(r#"{"ok": true, "result": {"message_id": 7}}"#)
        .create_async()
        .await;

    telegram(server.url())
        .send_message("Wednesday football 03_04_2024\nhttps://c/s/a")
        .await
        .unwrap();
    sent.assert_async().await;
}

#[tokio::test]
async fn test_send_message_errors() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/bot123:abc/sendMessage")
        .with_status(401)
        .with_body(r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#)
        .create_async()
        .await;

    let err = telegram(server.url()).send_message("hi").await.unwrap_err();
    assert!(matches!(err, NotificationError::InvalidToken));

    let mut server = Server::new_async().await;
    server
        .mock("POST", "/bot123:abc/sendMessage")
        .with_status(400)
        .with_body(r#"{"ok": false, "error_code": 400, "description": "Bad Request: chat not found"}"#)
        .create_async()
        .await;

    let err = telegram(server.url()).send_message("hi").await.unwrap_err();
    assert!(matches!(err, NotificationError::ChatNotFound));
}
