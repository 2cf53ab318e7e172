//! reqwest-backed REST client for the TM1 REST API.
//!
//! Every call is a single request/response exchange:
//! - default TM1 headers (`Content-Type`, `Accept`, `TM1-SessionContext`)
//! - credentials attached per request (Basic, CAMNamespace or Bearer)
//! - per-call timeout and header overrides from [`RequestOptions`]
//! - non-2xx statuses surfaced as [`TransportError::Status`]

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use reqwest::{Client as HttpClient, Method, header};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use tm1_transport_traits::{
    BoxFuture, HttpMethod, LimitsConfig, RequestOptions, RestResponse, RestTransport,
    TimeoutConfig, TlsConfig, TransportError, TransportResult, validate_request_size,
    validate_response_size,
};

/// Opt-in switch required before certificate validation may be disabled.
const INSECURE_TLS_ENV_VAR: &str = "TM1_ALLOW_INSECURE_TLS";

const CONTENT_TYPE: &str = "application/json; odata.streaming=true; charset=utf-8";
const ACCEPT: &str = "application/json;odata.metadata=none,text/plain";

/// Credentials presented to the TM1 server.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Auth {
    /// No `Authorization` header (e.g. a reverse proxy authenticates).
    #[default]
    None,
    /// TM1 native security (mode 1/2).
    Basic {
        /// User name
        user: String,
        /// Password
        password: String,
    },
    /// CAM security (mode 4/5).
    Cam {
        /// User name
        user: String,
        /// Password
        password: String,
        /// CAM namespace id
        namespace: String,
    },
    /// Pre-issued access token.
    Bearer(String),
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Basic { user, .. } => f
                .debug_struct("Basic")
                .field("user", user)
                .field("password", &"<redacted>")
                .finish(),
            Self::Cam {
                user, namespace, ..
            } => f
                .debug_struct("Cam")
                .field("user", user)
                .field("password", &"<redacted>")
                .field("namespace", namespace)
                .finish(),
            Self::Bearer(_) => write!(f, "Bearer(<redacted>)"),
        }
    }
}

impl Auth {
    /// Reads credentials from `TM1_TOKEN`, or `TM1_USER`/`TM1_PASSWORD`
    /// (plus `TM1_NAMESPACE` for CAM).
    pub fn from_env() -> Self {
        if let Ok(token) = std::env::var("TM1_TOKEN") {
            return Self::Bearer(token);
        }
        let Ok(user) = std::env::var("TM1_USER") else {
            return Self::None;
        };
        let password = std::env::var("TM1_PASSWORD").unwrap_or_default();
        match std::env::var("TM1_NAMESPACE") {
            Ok(namespace) if !namespace.is_empty() => Self::Cam {
                user,
                password,
                namespace,
            },
            _ => Self::Basic { user, password },
        }
    }

    /// Value of the `Authorization` header, if any.
    pub fn header_value(&self) -> Option<String> {
        match self {
            Self::None => None,
            Self::Basic { user, password } => {
                Some(format!("Basic {}", B64.encode(format!("{user}:{password}"))))
            }
            Self::Cam {
                user,
                password,
                namespace,
            } => Some(format!(
                "CAMNamespace {}",
                B64.encode(format!("{user}:{password}:{namespace}"))
            )),
            Self::Bearer(token) => Some(format!("Bearer {token}")),
        }
    }
}

/// REST client configuration
#[derive(Clone, Debug)]
pub struct RestClientConfig {
    /// Server base URL without the API root (e.g., <https://tm1.example.com:8010>)
    pub base_url: String,

    /// Connect and request timeouts
    pub timeout: TimeoutConfig,

    /// Credentials
    pub auth: Auth,

    /// Custom headers sent with every request
    pub headers: HashMap<String, String>,

    /// User agent string (set to None to disable User-Agent header)
    pub user_agent: Option<String>,

    /// Value of the `TM1-SessionContext` header, shown in TM1 monitoring tools
    pub session_context: Option<String>,

    /// Size limits for requests and responses
    pub limits: LimitsConfig,

    /// TLS/HTTPS configuration
    pub tls: TlsConfig,
}

impl Default for RestClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8010".to_string(),
            timeout: TimeoutConfig::default(),
            auth: Auth::None,
            headers: HashMap::new(),
            user_agent: Some(format!("tm1-rs/{}", env!("CARGO_PKG_VERSION"))),
            session_context: Some("tm1-rs".to_string()),
            limits: LimitsConfig::default(),
            tls: TlsConfig::default(),
        }
    }
}

impl RestClientConfig {
    /// Builds a configuration from `TM1_BASE_URL`, `TM1_TIMEOUT_SECS` and the
    /// credential variables read by [`Auth::from_env`].
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(base_url) = std::env::var("TM1_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(timeout) = std::env::var("TM1_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_secs)
        {
            config.timeout.request = Some(timeout);
        }
        config.auth = Auth::from_env();
        config
    }

    /// Builder method: set credentials
    #[must_use]
    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = auth;
        self
    }

    /// Builder method: set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// REST client transport for the TM1 REST API
pub struct RestClientTransport {
    config: RestClientConfig,
    http_client: HttpClient,
}

impl std::fmt::Debug for RestClientTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClientTransport")
            .field("base_url", &self.config.base_url)
            .field("auth", &self.config.auth)
            .finish()
    }
}

impl RestClientTransport {
    /// Create a new REST client transport
    pub fn new(config: RestClientConfig) -> TransportResult<Self> {
        url::Url::parse(&config.base_url).map_err(|e| {
            TransportError::ConfigurationError(format!(
                "invalid base URL '{}': {}",
                config.base_url, e
            ))
        })?;

        let mut client_builder = HttpClient::builder().connect_timeout(config.timeout.connect);

        if let Some(request_timeout) = config.timeout.request {
            client_builder = client_builder.timeout(request_timeout);
        }

        if let Some(ref user_agent) = config.user_agent {
            client_builder = client_builder.user_agent(user_agent);
        }

        if !config.tls.validate_certificates {
            if std::env::var(INSECURE_TLS_ENV_VAR).is_err() {
                error!(
                    "Certificate validation disabled but {} not set. \
                     Keeping validate_certificates=true. Set {}=1 to allow insecure TLS.",
                    INSECURE_TLS_ENV_VAR, INSECURE_TLS_ENV_VAR
                );
            } else {
                warn!(
                    "TLS certificate validation is DISABLED. Only use this against \
                     development servers with self-signed certificates."
                );
                client_builder = client_builder.danger_accept_invalid_certs(true);
            }
        }

        if let Some(ca_certs) = &config.tls.custom_ca_certs {
            let mut loaded = 0usize;
            let total = ca_certs.len();
            for cert_bytes in ca_certs {
                if let Ok(cert) = reqwest::Certificate::from_pem(cert_bytes) {
                    client_builder = client_builder.add_root_certificate(cert);
                    loaded += 1;
                } else if let Ok(cert) = reqwest::Certificate::from_der(cert_bytes) {
                    client_builder = client_builder.add_root_certificate(cert);
                    loaded += 1;
                } else {
                    warn!(
                        "Failed to parse custom CA certificate ({}/{}), skipping",
                        loaded + 1,
                        total
                    );
                }
            }
            if loaded == 0 && total > 0 {
                error!("All {} custom CA certificates failed to parse", total);
            }
            if loaded > 0 {
                info!("Loaded {}/{} custom CA certificates", loaded, total);
            }
        }

        let http_client = client_builder.build().map_err(|e| {
            TransportError::ConfigurationError(format!("failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &RestClientConfig {
        &self.config
    }

    /// Join the base URL and a root-relative API URL
    fn full_url(&self, url: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        if url.starts_with('/') {
            format!("{base}{url}")
        } else {
            format!("{base}/{url}")
        }
    }

    /// Build request headers: TM1 defaults, configured headers, then per-call headers
    fn build_headers(&self, options: &RequestOptions) -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();

        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static(CONTENT_TYPE),
        );
        headers.insert(header::ACCEPT, header::HeaderValue::from_static(ACCEPT));

        if let Some(context) = &self.config.session_context
            && let Ok(value) = header::HeaderValue::from_str(context)
        {
            headers.insert("TM1-SessionContext", value);
        }

        if let Some(auth) = self.config.auth.header_value()
            && let Ok(mut value) = header::HeaderValue::from_str(&auth)
        {
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let extra = self
            .config
            .headers
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(options.headers.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        for (key, value) in extra {
            if let (Ok(k), Ok(v)) = (
                header::HeaderName::from_bytes(key.as_bytes()),
                header::HeaderValue::from_str(value),
            ) {
                headers.insert(k, v);
            } else {
                warn!("Skipping invalid header '{}'", key);
            }
        }

        headers
    }

    fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    fn map_send_error(
        &self,
        err: &reqwest::Error,
        method: HttpMethod,
        url: &str,
        options: &RequestOptions,
    ) -> TransportError {
        if err.is_timeout() {
            let timeout = options
                .timeout
                .or(self.config.timeout.request)
                .unwrap_or_default();
            TransportError::RequestTimeout {
                operation: format!("{method} {url}"),
                timeout,
            }
        } else if err.is_connect() {
            TransportError::ConnectionFailed(format!("{}: {}", self.config.base_url, err))
        } else if err.is_builder() {
            TransportError::ConfigurationError(err.to_string())
        } else {
            TransportError::Io(err.to_string())
        }
    }

    /// Execute one request and collect the full response body
    async fn execute(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<String>,
        options: &RequestOptions,
    ) -> TransportResult<RestResponse> {
        if let Some(ref body) = body {
            validate_request_size(body.len(), &self.config.limits)?;
        }

        let mut request = self
            .http_client
            .request(Self::to_reqwest_method(method), self.full_url(url))
            .headers(self.build_headers(options));

        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.map_send_error(&e, method, url, options))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.map_send_error(&e, method, url, options))?;

        validate_response_size(bytes.len(), &self.config.limits)?;

        debug!(
            method = %method,
            url = %url,
            status = status.as_u16(),
            bytes = bytes.len(),
            "TM1 request completed"
        );

        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            warn!(method = %method, url = %url, status = status.as_u16(), "TM1 request failed");
            return Err(TransportError::status(status.as_u16(), url, body));
        }

        Ok(RestResponse::new(status.as_u16(), bytes))
    }
}

impl RestTransport for RestClientTransport {
    fn get<'a>(
        &'a self,
        url: &'a str,
        options: &'a RequestOptions,
    ) -> BoxFuture<'a, TransportResult<RestResponse>> {
        Box::pin(self.execute(HttpMethod::Get, url, None, options))
    }

    fn post<'a>(
        &'a self,
        url: &'a str,
        body: String,
        options: &'a RequestOptions,
    ) -> BoxFuture<'a, TransportResult<RestResponse>> {
        Box::pin(self.execute(HttpMethod::Post, url, Some(body), options))
    }

    fn patch<'a>(
        &'a self,
        url: &'a str,
        body: String,
        options: &'a RequestOptions,
    ) -> BoxFuture<'a, TransportResult<RestResponse>> {
        Box::pin(self.execute(HttpMethod::Patch, url, Some(body), options))
    }

    fn delete<'a>(
        &'a self,
        url: &'a str,
        options: &'a RequestOptions,
    ) -> BoxFuture<'a, TransportResult<RestResponse>> {
        Box::pin(self.execute(HttpMethod::Delete, url, None, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = RestClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8010");
        assert_eq!(config.auth, Auth::None);
        assert!(config.tls.validate_certificates);
    }

    #[test]
    fn test_auth_header_values() {
        assert_eq!(Auth::None.header_value(), None);

        let basic = Auth::Basic {
            user: "admin".to_string(),
            password: "apple".to_string(),
        };
        assert_eq!(
            basic.header_value().as_deref(),
            Some("Basic YWRtaW46YXBwbGU=")
        );

        let cam = Auth::Cam {
            user: "admin".to_string(),
            password: "apple".to_string(),
            namespace: "LDAP".to_string(),
        };
        let expected = format!("CAMNamespace {}", B64.encode("admin:apple:LDAP"));
        assert_eq!(cam.header_value(), Some(expected));

        assert_eq!(
            Auth::Bearer("t0k".to_string()).header_value().as_deref(),
            Some("Bearer t0k")
        );
    }

    #[test]
    fn test_auth_debug_redacts_secrets() {
        let basic = Auth::Basic {
            user: "admin".to_string(),
            password: "apple".to_string(),
        };
        let rendered = format!("{basic:?}");
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("apple"));
        assert!(!format!("{:?}", Auth::Bearer("secret".to_string())).contains("secret"));
    }

    #[test]
    fn test_full_url_joining() {
        let transport = RestClientTransport::new(
            RestClientConfig::default().with_base_url("https://tm1.example.com:8010/"),
        )
        .unwrap();
        assert_eq!(
            transport.full_url("/api/v1/Dimensions"),
            "https://tm1.example.com:8010/api/v1/Dimensions"
        );
        assert_eq!(
            transport.full_url("api/v1/Cubes"),
            "https://tm1.example.com:8010/api/v1/Cubes"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = RestClientTransport::new(RestClientConfig::default().with_base_url("not a url"));
        assert!(matches!(
            result,
            Err(TransportError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_per_call_headers_override_defaults() {
        let transport = RestClientTransport::new(RestClientConfig::default()).unwrap();
        let options = RequestOptions::new().with_header("TM1-SessionContext", "nightly-load");
        let headers = transport.build_headers(&options);
        assert_eq!(headers.get("TM1-SessionContext").unwrap(), "nightly-load");
        assert_eq!(headers.get(header::ACCEPT).unwrap(), ACCEPT);
        assert!(headers.get(header::AUTHORIZATION).is_none());
    }
}
