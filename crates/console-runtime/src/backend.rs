//! Backend API client.
//!
//! [`Backend`] is the seam between the console and the proxy's HTTP API. The
//! poller and dispatcher are generic over it; [`HttpBackend`] is the real
//! `reqwest` implementation and tests substitute in-memory fakes.

use std::future::Future;

use reqwest::Url;
use serde::de::DeserializeOwned;

use console_core::error::{ConsoleError, Result};
use console_core::models::{Credential, Session};
use console_core::settings::BackendConfig;

/// A reply that made it back from the backend.
///
/// Transport faults are not represented here; they are the `Err` side of the
/// surrounding `Result`.
#[derive(Debug, Clone, PartialEq)]
pub enum Response<T> {
    /// 2xx with a decoded body.
    Ok(T),
    /// Any non-2xx status.
    Rejected(u16),
}

/// Operations the console performs against the proxy backend.
pub trait Backend: Send + Sync + 'static {
    /// `GET /api/sessions`
    fn list_sessions(&self) -> impl Future<Output = Result<Response<Vec<Session>>>> + Send;

    /// `GET /api/credentials`
    fn list_credentials(&self) -> impl Future<Output = Result<Response<Vec<Credential>>>> + Send;

    /// `POST /api/sessions/{id}/terminate`
    fn terminate_session(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<Response<()>>> + Send;
}

// ── HttpBackend ───────────────────────────────────────────────────────────────

/// `reqwest`-based client for the proxy's REST API.
pub struct HttpBackend {
    base_url: Url,
    http_client: reqwest::Client,
}

impl HttpBackend {
    /// Build a client for `config.base_url`.
    ///
    /// Fails with [`ConsoleError::Config`] when the URL does not parse or the
    /// TLS backend cannot be initialised.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ConsoleError::Config(format!("invalid api url: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ConsoleError::Config(format!(
                "api url cannot carry a path: {}",
                config.base_url
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| ConsoleError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            http_client,
        })
    }

    /// Append path segments to the base URL, percent-encoding each one.
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<Response<T>> {
        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ConsoleError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%url, status = status.as_u16(), "backend rejected GET");
            return Ok(Response::Rejected(status.as_u16()));
        }

        response
            .json::<T>()
            .await
            .map(Response::Ok)
            .map_err(|e| ConsoleError::Decode {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }
}

impl Backend for HttpBackend {
    fn list_sessions(&self) -> impl Future<Output = Result<Response<Vec<Session>>>> + Send {
        self.get_json(self.url(&["api", "sessions"]))
    }

    fn list_credentials(&self) -> impl Future<Output = Result<Response<Vec<Credential>>>> + Send {
        self.get_json(self.url(&["api", "credentials"]))
    }

    fn terminate_session(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<Response<()>>> + Send {
        let url = self.url(&["api", "sessions", session_id, "terminate"]);
        async move {
            let response = self
                .http_client
                .post(url.clone())
                .send()
                .await
                .map_err(|e| ConsoleError::Transport {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;

            let status = response.status();
            if status.is_success() {
                Ok(Response::Ok(()))
            } else {
                Ok(Response::Rejected(status.as_u16()))
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
