//! Integration tests for SecuritySpyClient against a local mock HTTP server.
//!
//! Each test binds a TcpListener on an ephemeral port and answers requests
//! with canned SecuritySpy responses, then drives the real client at it.

use securityspy_api::{ApiError, ArmState, RecordingMode, SecuritySpyClient, ServerConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

const SYSTEM_INFO_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<system>
  <server>
    <name>Test Server</name>
    <version>5.3.4</version>
  </server>
  <cameralist>
    <camera>
      <number>1</number>
      <connected>yes</connected>
      <name>Porch</name>
      <width>1920</width>
      <height>1080</height>
      <mdsensitivity>50</mdsensitivity>
      <devicename>Cam</devicename>
      <devicetype>Network</devicetype>
      <mode-c>disarmed</mode-c>
      <mode-m>armed</mode-m>
      <mode-a>disarmed</mode-a>
    </camera>
  </cameralist>
</system>"#;

fn http_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    )
}

/// Serve one canned response per incoming connection, in order.
///
/// Returns the server config pointing at the listener and a channel
/// yielding the request line of each connection.
async fn spawn_mock_server(responses: Vec<String>) -> (ServerConfig, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (request_tx, request_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        for response in responses {
            let (mut socket, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => return,
            };

            // Read until the end of the request headers.
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                match socket.read(&mut buf).await {
                    Ok(0) => break,
                    Ok(n) => {
                        request.extend_from_slice(&buf[..n]);
                        if request.windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }
                    Err(_) => return,
                }
            }

            let request = String::from_utf8_lossy(&request);
            let request_line = request.lines().next().unwrap_or_default().to_string();
            let _ = request_tx.send(request_line);

            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    let config = ServerConfig::new("127.0.0.1", addr.port(), "user", "pass");
    (config, request_rx)
}

#[tokio::test]
async fn test_list_cameras_end_to_end() {
    let (config, mut requests) =
        spawn_mock_server(vec![http_response("200 OK", SYSTEM_INFO_XML)]).await;
    let client = SecuritySpyClient::new(config).unwrap();

    let cameras = client.list_cameras().await.unwrap();
    assert_eq!(cameras.len(), 1);
    assert_eq!(cameras[0].number, 1);
    assert_eq!(cameras[0].name, "Porch");
    assert_eq!(cameras[0].recording_mode, RecordingMode::Motion);

    let request_line = requests.recv().await.unwrap();
    assert!(request_line.contains("/++systemInfo&auth=dXNlcjpwYXNz"));
}

#[tokio::test]
async fn test_server_info() {
    let (config, _requests) =
        spawn_mock_server(vec![http_response("200 OK", SYSTEM_INFO_XML)]).await;
    let client = SecuritySpyClient::new(config).unwrap();

    let info = client.server_info().await.unwrap();
    assert_eq!(info.name.as_deref(), Some("Test Server"));
    assert_eq!(info.version.as_deref(), Some("5.3.4"));
}

#[tokio::test]
async fn test_snapshot_image_returns_raw_bytes() {
    // Not a real JPEG; the client must pass the body through untouched.
    let body = "jpeg\x00payload\x7f";
    let (config, mut requests) = spawn_mock_server(vec![http_response("200 OK", body)]).await;
    let client = SecuritySpyClient::new(config).unwrap();

    let image = client.snapshot_image(2).await.unwrap();
    assert_eq!(&image[..], body.as_bytes());

    let request_line = requests.recv().await.unwrap();
    assert!(request_line.contains("/++image?cameraNum=2"));
    assert!(request_line.contains("auth=dXNlcjpwYXNz"));
}

#[tokio::test]
async fn test_set_recording_mode_acknowledged() {
    let (config, mut requests) = spawn_mock_server(vec![http_response("200 OK", "OK")]).await;
    let client = SecuritySpyClient::new(config).unwrap();

    let mode = client
        .set_recording_mode(2, RecordingMode::Always)
        .await
        .unwrap();
    assert_eq!(mode, RecordingMode::Always);

    let request_line = requests.recv().await.unwrap();
    assert!(request_line.contains("/++setSchedule?cameraNum=2&schedule=1&mode=C&override=0"));
}

#[tokio::test]
async fn test_set_recording_mode_rejected() {
    let (config, _requests) = spawn_mock_server(vec![http_response("200 OK", "NO")]).await;
    let client = SecuritySpyClient::new(config).unwrap();

    let err = client
        .set_recording_mode(2, RecordingMode::Never)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::UnexpectedResponse(_)));
}

#[tokio::test]
async fn test_recording_mode_query() {
    let (config, mut requests) =
        spawn_mock_server(vec![http_response("200 OK", "C:armed\nM:disarmed\nA:armed\n")]).await;
    let client = SecuritySpyClient::new(config).unwrap();

    let modes = client.recording_mode(0).await.unwrap();
    assert_eq!(modes.continuous, ArmState::Armed);
    assert_eq!(modes.motion, ArmState::Disarmed);
    assert_eq!(modes.actions, ArmState::Armed);

    let request_line = requests.recv().await.unwrap();
    assert!(request_line.contains("/++cameramodes?cameraNum=0"));
}

#[tokio::test]
async fn test_unauthorized_maps_to_invalid_credentials() {
    let (config, _requests) =
        spawn_mock_server(vec![http_response("401 Unauthorized", "")]).await;
    let client = SecuritySpyClient::new(config).unwrap();

    let err = client.list_cameras().await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidCredentials));
}
