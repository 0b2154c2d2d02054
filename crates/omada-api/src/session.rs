// Authenticated controller session
//
// Wraps `reqwest::Client` with the Omada login handshake: controller-id
// discovery, CSRF token, cookie capture, and site-id substitution in
// request paths. A redirect to the login page marks the session expired;
// `request` recovers from that exactly once and retries the original
// call. The retry bound is structural -- there is no retry loop to get
// wrong.

use std::collections::BTreeMap;

use reqwest::header::{ACCEPT, COOKIE, LOCATION, SET_COOKIE};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info};
use url::Url;

use crate::error::Error;
use crate::models::{ControllerInfo, CurrentUser, Envelope, LoginResult};
use crate::transport::TransportConfig;

/// Placeholder in request paths replaced with the resolved site id.
const SITE_ID_PLACEHOLDER: &str = "{SITEID}";

/// Substituted for the controller id and site id before either is known.
/// The resulting request draws the login redirect that bootstraps the
/// first recovery pass.
const UNSET: &str = "null";

/// Immutable connection parameters, supplied at construction.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Controller root, e.g. `https://192.168.0.2:443`.
    pub base_url: Url,
    /// Site name as shown in the controller UI.
    pub site: String,
    pub username: String,
    pub password: SecretString,
}

/// Mutable session state, reset piecemeal on expiry.
#[derive(Debug, Default)]
struct SessionState {
    controller_id: Option<String>,
    csrf_token: Option<String>,
    cookies: BTreeMap<String, String>,
    site_id: Option<String>,
    /// Incremented once per completed recovery. A caller that observed an
    /// older epoch knows another caller already re-logged in for it.
    epoch: u64,
}

/// Outcome of a single request attempt.
///
/// Session expiry is a tagged result rather than an error so that the
/// caller's recovery step is explicit and bounded.
#[derive(Debug)]
pub enum Attempt {
    /// The call completed; the envelope's `result` payload.
    Completed(Value),
    /// The controller redirected to its login page. `epoch` identifies
    /// the session generation the failed attempt ran under.
    SessionExpired { epoch: u64 },
}

/// Authenticated HTTP session with an Omada controller.
///
/// State (cookies, CSRF token, controller/site ids) is shared across all
/// callers of one session and mutated only under the internal lock, so
/// concurrent requests cannot corrupt each other's credentials and at
/// most one of them runs the re-login pass.
pub struct ApiSession {
    http: reqwest::Client,
    config: SessionConfig,
    state: tokio::sync::Mutex<SessionState>,
}

impl ApiSession {
    /// Create a session from connection parameters. No network traffic
    /// happens here; login is lazy, triggered by the first expiry signal.
    pub fn new(config: SessionConfig, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            config,
            state: tokio::sync::Mutex::new(SessionState::default()),
        })
    }

    /// Issue one controller-scoped API call (`/{id}/api/v2/{path}`),
    /// reporting session expiry as a tagged outcome instead of retrying.
    pub async fn try_request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Attempt, Error> {
        let mut state = self.state.lock().await;
        let epoch = state.epoch;
        let path = id_path(&state, path);

        match self.exchange::<Value>(&mut state, method, &path, body).await {
            Ok(result) => Ok(Attempt::Completed(result)),
            Err(Error::LoginRequired) => Ok(Attempt::SessionExpired { epoch }),
            Err(e) => Err(e),
        }
    }

    /// Issue one controller-scoped API call, recovering from session
    /// expiry at most once.
    ///
    /// On `SessionExpired` this runs a single recovery pass (clear
    /// credentials, rediscover the controller id if unknown, login,
    /// resolve the site id if unknown) and retries the original call. A
    /// second expiry, or any other recovery failure such as rejected
    /// credentials, propagates as this call's error.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T, Error> {
        let result = match self.try_request(method.clone(), path, body).await? {
            Attempt::Completed(result) => result,
            Attempt::SessionExpired { epoch } => {
                self.recover(epoch).await?;
                match self.try_request(method, path, body).await? {
                    Attempt::Completed(result) => result,
                    Attempt::SessionExpired { .. } => return Err(Error::LoginRequired),
                }
            }
        };

        serde_json::from_value(result.clone()).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: result.to_string(),
        })
    }

    /// One recovery pass, serialized across callers.
    ///
    /// If the session epoch advanced past `observed` while waiting for
    /// the lock, another caller already recovered and this one reuses the
    /// fresh session as-is.
    async fn recover(&self, observed: u64) -> Result<(), Error> {
        let mut state = self.state.lock().await;
        if state.epoch != observed {
            debug!("session already recovered by a concurrent caller");
            return Ok(());
        }

        info!("logging in to controller");
        state.csrf_token = None;
        state.cookies.clear();

        if state.controller_id.is_none() {
            let info: ControllerInfo = self
                .exchange(&mut state, Method::GET, "/api/info", None)
                .await?;
            state.controller_id = Some(info.omadac_id);
        }

        let login_body = json!({
            "username": self.config.username,
            "password": self.config.password.expose_secret(),
        });
        let path = id_path(&state, "login");
        let login: LoginResult = self
            .exchange(&mut state, Method::POST, &path, Some(&login_body))
            .await?;
        state.csrf_token = Some(login.token);

        if state.site_id.is_none() {
            let path = id_path(&state, "users/current");
            let user: CurrentUser = self.exchange(&mut state, Method::GET, &path, None).await?;
            let site = user
                .privilege
                .sites
                .into_iter()
                .find(|s| s.name == self.config.site)
                .ok_or_else(|| Error::SiteNotFound {
                    name: self.config.site.clone(),
                })?;
            state.site_id = Some(site.key);
        }

        state.epoch += 1;
        debug!("login successful");
        Ok(())
    }

    /// One HTTP exchange: header assembly, cookie capture, redirect
    /// detection, envelope unwrapping. Mutates `state` with any cookies
    /// the controller sets.
    async fn exchange<T: DeserializeOwned>(
        &self,
        state: &mut SessionState,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T, Error> {
        let path = path.replace(SITE_ID_PLACEHOLDER, state.site_id.as_deref().unwrap_or(UNSET));
        let url = self.config.base_url.join(&path)?;
        debug!("{} {}", method, url);

        let mut req = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json");

        if let Some(token) = state.csrf_token.as_deref() {
            req = req.header("Csrf-Token", token);
        }
        if !state.cookies.is_empty() {
            let cookie_text: String = state
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value};"))
                .collect();
            req = req.header(COOKIE, cookie_text);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await?;

        for value in resp.headers().get_all(SET_COOKIE) {
            if let Ok(raw) = value.to_str() {
                let pair = raw.split(';').next().unwrap_or_default();
                if let Some((name, value)) = pair.split_once('=') {
                    state.cookies.insert(name.to_owned(), value.to_owned());
                }
            }
        }

        if resp.status().is_redirection() {
            let to_login = resp
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|loc| loc.contains("/login"));
            if to_login {
                return Err(Error::LoginRequired);
            }
        }

        let text = resp.text().await?;
        let envelope: Envelope =
            serde_json::from_str(&text).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: text.clone(),
            })?;

        if envelope.error_code != 0 {
            return Err(Error::Api {
                code: envelope.error_code,
                message: envelope
                    .msg
                    .unwrap_or_else(|| format!("errorCode={}", envelope.error_code)),
            });
        }

        serde_json::from_value(envelope.result.unwrap_or(Value::Null)).map_err(|e| {
            Error::Deserialization {
                message: e.to_string(),
                body: text,
            }
        })
    }
}

/// Controller-scoped path: `/{controller-id}/api/v2/{path}`.
fn id_path(state: &SessionState, path: &str) -> String {
    let id = state.controller_id.as_deref().unwrap_or(UNSET);
    format!("/{id}/api/v2/{path}")
}
