//! Server connection configuration.

use base64::{engine::general_purpose::STANDARD, Engine};

/// Connection settings for one SecuritySpy server.
///
/// SecuritySpy authenticates every request with a base64 `user:password`
/// token carried in the query string; [`ServerConfig::auth_token`] computes
/// it from the stored credentials. No further negotiation takes place.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Hostname or IP address of the server
    pub host: String,
    /// Web server port (SecuritySpy defaults to 8000)
    pub port: u16,
    /// Account username
    pub username: String,
    /// Account password
    pub password: String,
    /// Use `https` instead of `http`
    pub use_ssl: bool,
}

impl ServerConfig {
    /// Create a configuration for a plain-HTTP server.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: password.into(),
            use_ssl: false,
        }
    }

    /// Toggle HTTPS for this server.
    pub fn with_ssl(mut self, use_ssl: bool) -> Self {
        self.use_ssl = use_ssl;
        self
    }

    /// URL scheme implied by the SSL setting.
    pub fn scheme(&self) -> &'static str {
        if self.use_ssl {
            "https"
        } else {
            "http"
        }
    }

    /// Base URL without a trailing slash, e.g. `http://10.0.1.10:8000`.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme(), self.host, self.port)
    }

    /// Base64 `user:password` token expected by the `auth` query parameter.
    pub fn auth_token(&self) -> String {
        STANDARD.encode(format!("{}:{}", self.username, self.password))
    }

    /// URL of the long-lived event stream endpoint.
    ///
    /// The `++eventStream` path takes its parameters after a literal `?`;
    /// version 3 with multipart format is the line-oriented protocol the
    /// stream crate decodes.
    pub fn event_stream_url(&self) -> String {
        format!(
            "{}/++eventStream?version=3&format=multipart&auth={}",
            self.base_url(),
            self.auth_token()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_follows_ssl_flag() {
        let config = ServerConfig::new("10.0.1.10", 8000, "user", "pass");
        assert_eq!(config.scheme(), "http");
        assert_eq!(config.base_url(), "http://10.0.1.10:8000");

        let config = config.with_ssl(true);
        assert_eq!(config.scheme(), "https");
        assert_eq!(config.base_url(), "https://10.0.1.10:8000");
    }

    #[test]
    fn test_auth_token_encoding() {
        let config = ServerConfig::new("host", 8000, "user", "pass");
        // base64("user:pass")
        assert_eq!(config.auth_token(), "dXNlcjpwYXNz");
    }

    #[test]
    fn test_event_stream_url() {
        let config = ServerConfig::new("10.0.1.10", 8000, "user", "pass");
        assert_eq!(
            config.event_stream_url(),
            "http://10.0.1.10:8000/++eventStream?version=3&format=multipart&auth=dXNlcjpwYXNz"
        );
    }
}
