use anyhow::{Context, Result};
use reqwest::Url;
use reqwest::blocking::{Client as HttpClient, Response};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::ApiError;
use crate::util::{host_url, resolve};

/// An HTTP session that attaches the access token to every request it sends.
#[derive(Debug, Clone)]
pub struct Session {
    token: String,
    http: HttpClient,
}

impl Session {
    /// Query parameters added to every request, in order.
    pub fn params(&self) -> [(&str, &str); 1] {
        [("token", self.token.as_str())]
    }

    /// Builds the final request URL: `token` first, then any query the URL
    /// already carries (minus a stale `token`), then `params` in order.
    pub fn request_url(&self, target: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url =
            Url::parse(target).with_context(|| format!("invalid request URL {}", target))?;

        let existing: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != "token")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        url.set_query(None);
        {
            let mut query = url.query_pairs_mut();
            for (k, v) in self.params() {
                query.append_pair(k, v);
            }
            for (k, v) in &existing {
                query.append_pair(k, v);
            }
            for (k, v) in params {
                query.append_pair(k, v);
            }
        }
        Ok(url)
    }

    pub fn get(&self, target: &str, params: &[(&str, &str)]) -> Result<Response> {
        let url = self.request_url(target, params)?;
        log::debug!("GET {}{} {:?}", origin(&url), url.path(), params);
        self.http
            .get(url)
            .send()
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("request to {} failed", target_without_query(target)))
    }
}

/// Authenticated GET access to one versioned Lever Open API host.
///
/// ```compile_fail
/// let transport = leveropen::Transport::new("token", "https://api.leveropen.com/", "v1").unwrap();
/// let _ = transport.session();
/// ```
#[derive(Debug, Clone)]
pub struct Transport {
    host_url: String,
    session: Session,
    progress: bool,
}

impl Transport {
    pub fn new(access_token: &str, base_url: &str, version: &str) -> Result<Self> {
        Ok(Self {
            host_url: host_url(base_url, version),
            session: Self::get_session(access_token)?,
            progress: false,
        })
    }

    pub(crate) fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// `{base_url}{version}/`, the prefix of every relative request path.
    pub fn host_url(&self) -> &str {
        &self.host_url
    }

    pub(crate) fn progress(&self) -> bool {
        self.progress
    }

    /// Creates a persistent session that sends `token` on every request.
    pub fn get_session(token: &str) -> Result<Session> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("leveropen-rs/{}", env!("CARGO_PKG_VERSION")))
                .unwrap_or(HeaderValue::from_static("leveropen-rs")),
        );

        let http = HttpClient::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(60))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Session {
            token: token.to_string(),
            http,
        })
    }

    /// Issues `GET host_url + path` (or `GET path` for an absolute link) and
    /// fails with [`ApiError`] on a non-success status.
    pub fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Response> {
        let target = resolve(&self.host_url, path);
        let response = self.session.get(&target, params)?;
        Ok(Self::validate_response(response)?)
    }

    pub fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> Result<T> {
        let response = self.get(path, params)?;
        let status = response.status();
        let text = response.text().context("failed to read response body")?;
        serde_json::from_str::<T>(&text).with_context(|| {
            format!(
                "failed to parse API JSON (path={}, status={})",
                target_without_query(path),
                status
            )
        })
    }

    /// Passes a 2xx response through unchanged; anything else becomes an [`ApiError`].
    pub fn validate_response(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = error_body(response.text().map_err(reqwest::Error::without_url));
        log::debug!("API responded {}: {}", status, text);
        Err(ApiError::from_body(status, &text))
    }
}

// An unreadable error body is reported as such rather than as an empty one.
fn error_body<E: std::fmt::Display>(read: Result<String, E>) -> String {
    read.unwrap_or_else(|e| format!("<unreadable response body: {}>", e))
}

fn origin(url: &Url) -> String {
    url.origin().ascii_serialization()
}

// Links returned by the API embed the token; keep it out of error messages.
fn target_without_query(target: &str) -> &str {
    target.split('?').next().unwrap_or(target)
}
