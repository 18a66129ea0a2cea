//! The SecuritySpy HTTP client for one-shot operations.

use std::time::Duration;

use bytes::Bytes;

use crate::camera::{ArmState, Camera, CameraModes, RecordingMode, ServerInfo, SystemInfo};
use crate::config::ServerConfig;
use crate::error::{ApiError, Result};

/// Default timeout for one-shot requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the SecuritySpy web server's request/response endpoints.
///
/// Each method maps to one server endpoint. These calls are stateless; the
/// event stream with its session lifecycle lives in `securityspy-stream`.
#[derive(Debug, Clone)]
pub struct SecuritySpyClient {
    config: ServerConfig,
    http: reqwest::Client,
}

impl SecuritySpyClient {
    /// Create a client with the default request timeout.
    pub fn new(config: ServerConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Request(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    /// Create a client reusing an existing `reqwest::Client`.
    pub fn with_http_client(config: ServerConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    /// The server configuration this client talks to.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// List every configured camera.
    ///
    /// Fetches `/++systemInfo` and returns the parsed camera list. This is
    /// the seed call the stream session issues before connecting.
    pub async fn list_cameras(&self) -> Result<Vec<Camera>> {
        Ok(self.system_info().await?.cameras)
    }

    /// Server identification from the `<server>` block of `/++systemInfo`.
    pub async fn server_info(&self) -> Result<ServerInfo> {
        Ok(self.system_info().await?.server)
    }

    /// Fetch and parse the full `/++systemInfo` document.
    pub async fn system_info(&self) -> Result<SystemInfo> {
        // The systemInfo path takes its auth parameter after a literal `&`.
        let endpoint = format!(
            "{}/++systemInfo&auth={}",
            self.config.base_url(),
            self.config.auth_token()
        );
        let body = self.get_text(&endpoint).await?;
        SystemInfo::from_xml(&body, &self.config)
    }

    /// Fetch one still image from a camera as raw JPEG bytes.
    pub async fn snapshot_image(&self, camera_num: u32) -> Result<Bytes> {
        let endpoint = format!(
            "{}/++image?cameraNum={}&width=1920&height=1080&quality=1&auth={}",
            self.config.base_url(),
            camera_num,
            self.config.auth_token()
        );
        self.get_bytes(&endpoint).await
    }

    /// Read the three arm switches for one camera from `/++cameramodes`.
    pub async fn recording_mode(&self, camera_num: u32) -> Result<CameraModes> {
        let endpoint = format!(
            "{}/++cameramodes?cameraNum={}",
            self.config.base_url(),
            camera_num
        );
        let body = self.get_text(&endpoint).await?;
        parse_camera_modes(&body)
    }

    /// Change the recording schedule for one camera.
    ///
    /// The server acknowledges a schedule change with a bare `OK` body;
    /// anything else is reported as an unexpected response.
    pub async fn set_recording_mode(
        &self,
        camera_num: u32,
        mode: RecordingMode,
    ) -> Result<RecordingMode> {
        let (schedule, capture_mode) = mode.schedule_params();
        let endpoint = format!(
            "{}/++setSchedule?cameraNum={}&schedule={}&mode={}&override=0&auth={}",
            self.config.base_url(),
            camera_num,
            schedule,
            capture_mode,
            self.config.auth_token()
        );
        let body = self.get_text(&endpoint).await?;

        if body.trim() == "OK" {
            Ok(mode)
        } else {
            Err(ApiError::UnexpectedResponse(format!(
                "recording mode not set for camera {}: {:?}",
                camera_num,
                body.trim()
            )))
        }
    }

    async fn get_checked(&self, endpoint: &str) -> Result<reqwest::Response> {
        tracing::debug!(%endpoint, "sending request");

        let response = self
            .http
            .get(endpoint)
            .send()
            .await
            .map_err(|e| ApiError::Request(format!("error requesting {}: {}", endpoint, e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(ApiError::InvalidCredentials);
        }
        if !status.is_success() {
            return Err(ApiError::UnexpectedResponse(format!(
                "server returned {} for {}",
                status, endpoint
            )));
        }

        Ok(response)
    }

    async fn get_text(&self, endpoint: &str) -> Result<String> {
        self.get_checked(endpoint)
            .await?
            .text()
            .await
            .map_err(|e| ApiError::Request(format!("failed to read response body: {}", e)))
    }

    async fn get_bytes(&self, endpoint: &str) -> Result<Bytes> {
        self.get_checked(endpoint)
            .await?
            .bytes()
            .await
            .map_err(|e| ApiError::Request(format!("failed to read response body: {}", e)))
    }
}

/// Parse the line-oriented `/++cameramodes` body.
///
/// The server answers with one `C:`, `M:` and `A:` line, e.g.
/// `C:armed`. All three must be present.
fn parse_camera_modes(body: &str) -> Result<CameraModes> {
    let mut continuous = None;
    let mut motion = None;
    let mut actions = None;

    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.split_once(':') {
            Some(("C", value)) => continuous = Some(ArmState::parse(Some(value))),
            Some(("M", value)) => motion = Some(ArmState::parse(Some(value))),
            Some(("A", value)) => actions = Some(ArmState::parse(Some(value))),
            _ => {
                tracing::debug!(line, "ignoring unrecognized cameramodes line");
            }
        }
    }

    match (continuous, motion, actions) {
        (Some(continuous), Some(motion), Some(actions)) => Ok(CameraModes {
            continuous,
            motion,
            actions,
        }),
        _ => Err(ApiError::UnexpectedResponse(
            "cameramodes response missing C/M/A lines".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_camera_modes() {
        let modes = parse_camera_modes("C:armed\nM:disarmed\nA:armed\n").unwrap();
        assert_eq!(modes.continuous, ArmState::Armed);
        assert_eq!(modes.motion, ArmState::Disarmed);
        assert_eq!(modes.actions, ArmState::Armed);
    }

    #[test]
    fn test_parse_camera_modes_ignores_noise() {
        let modes = parse_camera_modes("\nC:armed\nX:whatever\nM:armed\nA:disarmed\n").unwrap();
        assert_eq!(modes.continuous, ArmState::Armed);
        assert_eq!(modes.motion, ArmState::Armed);
        assert_eq!(modes.actions, ArmState::Disarmed);
    }

    #[test]
    fn test_parse_camera_modes_missing_line() {
        let err = parse_camera_modes("C:armed\nM:armed\n").unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedResponse(_)));
    }

    #[test]
    fn test_client_creation() {
        let config = ServerConfig::new("10.0.1.10", 8000, "user", "pass");
        let _client = SecuritySpyClient::new(config).unwrap();
    }
}
