//! UniFi controller REST client.
//!
//! Logs in lazily on the first API call and caches the session. Two controller
//! flavours are handled:
//! - UniFi OS consoles answer `GET /` with 200; login is `/api/auth/login` and
//!   the network API lives under `/proxy/network`.
//! - Classic controllers redirect `/`; login is `/api/login` with no prefix.
//!
//! The session cookie lives in reqwest's cookie store. UniFi OS also hands out
//! an `X-CSRF-Token` at login that must accompany every later request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use crate::config::{BmcConfig, resolve_secret};
use crate::error::BmcError;
use crate::unifi::DeviceApi;
use crate::unifi::device::{ApiEnvelope, Device};

const CSRF_HEADER: &str = "x-csrf-token";
const UNKNOWN_DEVICE: &str = "api.err.UnknownDevice";

/// Per-login state: where the API lives and the CSRF token to send.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Session {
    api_prefix: &'static str,
    csrf_token: Option<String>,
}

/// Authenticated client for one controller site.
pub struct UnifiClient {
    http: reqwest::Client,
    base_url: String,
    site: String,
    username: String,
    password: String,
    session: RwLock<Option<Session>>,
}

impl UnifiClient {
    /// Build a client from config. No network traffic happens until the first call.
    pub fn from_config(config: &BmcConfig) -> crate::Result<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            // Redirects are how classic controllers are told apart from UniFi OS.
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(config.insecure)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_endpoint.trim().trim_end_matches('/').to_string(),
            site: config.site.clone(),
            username: config.username.clone(),
            password: resolve_secret(&config.password),
            session: RwLock::new(None),
        })
    }

    /// Return the cached session, logging in if there is none.
    async fn session(&self) -> crate::Result<Session> {
        if let Some(session) = self.session.read().await.as_ref() {
            return Ok(session.clone());
        }

        let mut guard = self.session.write().await;
        // Another request may have logged in while we waited for the lock.
        if let Some(session) = guard.as_ref() {
            return Ok(session.clone());
        }

        let session = self.login().await?;
        *guard = Some(session.clone());
        Ok(session)
    }

    async fn login(&self) -> crate::Result<Session> {
        let probe = self.http.get(&self.base_url).send().await?;
        let unifi_os = probe.status() == StatusCode::OK;
        let (login_path, api_prefix) = if unifi_os {
            ("/api/auth/login", "/proxy/network")
        } else {
            ("/api/login", "")
        };

        tracing::debug!(
            endpoint = %self.base_url,
            unifi_os,
            "logging in to controller"
        );

        let response = self
            .http
            .post(format!("{}{}", self.base_url, login_path))
            .json(&serde_json::json!({
                "username": self.username,
                "password": self.password,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BmcError::Login(format!("{}: {}", status, body.trim())));
        }

        let csrf_token = response
            .headers()
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        tracing::info!(endpoint = %self.base_url, site = %self.site, "controller session established");

        Ok(Session {
            api_prefix,
            csrf_token,
        })
    }

    /// Issue a site-scoped API call and decode the `{meta, data}` envelope.
    async fn send<T: DeserializeOwned>(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Device>,
    ) -> crate::Result<Reply<T>> {
        let session = self.session().await?;
        let url = format!(
            "{}{}/api/s/{}/{}",
            self.base_url, session.api_prefix, self.site, path
        );

        let mut request = self.http.request(method.clone(), &url);
        if let Some(token) = &session.csrf_token {
            request = request.header(CSRF_HEADER, token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            // Session expired; the next call logs in again unless another
            // request already has.
            let mut guard = self.session.write().await;
            if guard.as_ref() == Some(&session) {
                *guard = None;
            }
            tracing::warn!(url = %url, "controller session rejected, will re-authenticate");
            return Err(BmcError::Api(format!("{} {}: {}", method, url, status)));
        }

        let text = response.text().await?;
        let envelope: ApiEnvelope<T> = serde_json::from_str(&text).map_err(|e| {
            BmcError::Api(format!(
                "{} {}: {} (undecodable body: {})",
                method, url, status, e
            ))
        })?;

        Ok(Reply {
            url,
            status,
            envelope,
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Device>,
    ) -> crate::Result<Vec<T>> {
        self.send(&method, path, body).await?.into_data(&method)
    }
}

/// A decoded controller answer, not yet checked for `rc`.
struct Reply<T> {
    url: String,
    status: StatusCode,
    envelope: ApiEnvelope<T>,
}

impl<T> Reply<T> {
    fn error_msg(&self) -> Option<&str> {
        if self.envelope.meta.rc == "ok" {
            None
        } else {
            Some(
                self.envelope
                    .meta
                    .msg
                    .as_deref()
                    .unwrap_or(self.envelope.meta.rc.as_str()),
            )
        }
    }

    fn into_data(self, method: &Method) -> crate::Result<Vec<T>> {
        if let Some(msg) = self.error_msg() {
            return Err(BmcError::Api(format!("{} {}: {}", method, self.url, msg)));
        }
        if !self.status.is_success() {
            return Err(BmcError::Api(format!(
                "{} {}: {}",
                method, self.url, self.status
            )));
        }
        Ok(self.envelope.data)
    }
}

#[async_trait]
impl DeviceApi for UnifiClient {
    async fn get_device_by_mac(&self, mac: &str) -> crate::Result<Device> {
        let reply: Reply<Device> = self
            .send(&Method::GET, &format!("stat/device/{}", mac), None)
            .await?;
        if reply.error_msg() == Some(UNKNOWN_DEVICE) {
            return Err(BmcError::DeviceNotFound(mac.to_string()));
        }
        let devices = reply.into_data(&Method::GET)?;

        devices
            .into_iter()
            .next()
            .ok_or_else(|| BmcError::DeviceNotFound(mac.to_string()))
    }

    async fn update_device(&self, device: &Device) -> crate::Result<Device> {
        let updated: Vec<Device> = self
            .call(
                Method::PUT,
                &format!("rest/device/{}", device.id),
                Some(device),
            )
            .await?;

        updated
            .into_iter()
            .next()
            .ok_or_else(|| BmcError::Api(format!("update of device {} returned no data", device.id)))
    }
}
