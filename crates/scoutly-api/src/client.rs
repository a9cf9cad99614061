// Hand-crafted async HTTP client for the Scout REST API.
//
// Auth: POST /auth with email/password, JWT in the response, sent back
// verbatim as the Authorization header on every subsequent request.

use std::sync::RwLock;

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::auth::{AuthSession, Credentials};
use crate::error::Error;
use crate::models::{ApiDevice, ApiLocation};
use crate::transport::TransportConfig;

// ── Response shapes ──────────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct AuthResponse {
    jwt: String,
}

/// Error body the API sends on non-2xx responses. Either field may be
/// present depending on the endpoint.
#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Scout REST API.
///
/// Construct with [`new`](Self::new), call
/// [`authenticate`](Self::authenticate) once, then use the device
/// directory endpoints. The session lives behind a lock so the client
/// can re-authenticate through `&self` when a token expires.
pub struct ScoutClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
    session: RwLock<Option<AuthSession>>,
}

impl ScoutClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL, credentials, and transport config.
    pub fn new(
        base_url: &str,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let base_url = Self::normalize_base_url(base_url)?;

        Ok(Self {
            http,
            base_url,
            credentials,
            session: RwLock::new(None),
        })
    }

    /// Wrap an existing `reqwest::Client` (used by tests).
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        credentials: Credentials,
    ) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            credentials,
            session: RwLock::new(None),
        })
    }

    /// Ensure the base URL ends with a single trailing slash so that
    /// relative joins behave.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    // ── Authentication ───────────────────────────────────────────────

    /// Authenticate with the credentials given at construction.
    ///
    /// `POST /auth` with email + password. On success the returned JWT
    /// replaces any prior session.
    pub async fn authenticate(&self) -> Result<(), Error> {
        let url = self.url("auth");
        debug!("POST {url}");

        let body = json!({
            "email": self.credentials.email,
            "password": self.credentials.password.expose_secret(),
        });

        let resp = self.http.post(url).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let raw = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: Self::error_message(&raw, status),
            });
        }

        let auth: AuthResponse = Self::parse_body(resp).await?;
        let token = SecretString::from(auth.jwt);
        *self.session.write().unwrap_or_else(std::sync::PoisonError::into_inner) =
            Some(AuthSession::new(token));
        Ok(())
    }

    /// Whether an authenticated session is held.
    pub fn is_authenticated(&self) -> bool {
        self.session
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .is_some()
    }

    /// The current bearer token, for the push channel's upgrade request.
    pub fn bearer_token(&self) -> Option<SecretString> {
        self.session
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_ref()
            .map(|s| s.token().clone())
    }

    // ── Device directory endpoints ───────────────────────────────────

    /// List locations visible to the authenticated account.
    ///
    /// `GET /locations`
    pub async fn list_locations(&self) -> Result<Vec<ApiLocation>, Error> {
        debug!("listing locations");
        self.get("locations").await
    }

    /// List all devices at a location.
    ///
    /// `GET /locations/{id}/devices`
    pub async fn list_devices(&self, location_id: &str) -> Result<Vec<ApiDevice>, Error> {
        debug!(location_id, "listing devices");
        self.get(&format!("locations/{location_id}/devices")).await
    }

    /// Fetch a single device's current record.
    ///
    /// `GET /devices/{id}`
    pub async fn get_device(&self, device_id: &str) -> Result<ApiDevice, Error> {
        debug!(device_id, "fetching device");
        self.get(&format!("devices/{device_id}")).await
    }

    // ── HTTP plumbing ────────────────────────────────────────────────

    /// Join a relative path onto the base URL.
    fn url(&self, path: &str) -> Url {
        // base_url always ends with `/`, so joining relative paths works.
        self.base_url
            .join(path)
            .expect("path should be valid relative URL")
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path);
        debug!("GET {url}");

        let request = self.authorized(self.http.get(url))?;
        let resp = request.send().await?;
        Self::handle_response(resp).await
    }

    /// Attach the Authorization header, or fail if not authenticated.
    fn authorized(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, Error> {
        let guard = self
            .session
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let session = guard.as_ref().ok_or(Error::NotAuthenticated)?;
        Ok(builder.header("Authorization", session.token().expose_secret()))
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            Self::parse_body(resp).await
        } else if status == reqwest::StatusCode::UNAUTHORIZED {
            Err(Error::SessionExpired)
        } else {
            let raw = resp.text().await.unwrap_or_default();
            Err(Error::Api {
                status: status.as_u16(),
                message: Self::error_message(&raw, status),
            })
        }
    }

    async fn parse_body<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview = &body[..body.len().min(200)];
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    fn error_message(raw: &str, status: reqwest::StatusCode) -> String {
        match serde_json::from_str::<ErrorResponse>(raw) {
            Ok(err) => err
                .error
                .or(err.message)
                .unwrap_or_else(|| status.to_string()),
            Err(_) => {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    raw.chars().take(200).collect()
                }
            }
        }
    }
}
