//! Request builder and dispatcher.
//!
//! # Design
//! `HttpApi` holds an agent and a config and nothing else. Every `build_*`
//! method starts from a fixed list of shape headers (JSON or plain text),
//! appends the identity headers from config, then appends whatever extra
//! headers the caller passes. Nothing is deduplicated; what the server sees
//! for a repeated name is up to the agent.
//!
//! Dispatch comes in two flavours. `try_send_*` report every failure as an
//! `HttpApiError`. `send_*` log the failure with the target URI and return
//! `None`, so callers must check for absence before using the result.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use ureq::http::{self as wire, HeaderName, HeaderValue, Uri};
use ureq::{Agent, AsSendBody, Body};

use crate::config::HttpApiConfig;
use crate::error::{HttpApiError, TargetError};
use crate::http::{BodyDecoder, HttpMethod, HttpRequest, HttpResponse};

const JSON_HEADERS: &[(&str, &str)] = &[
    ("Content-Type", "application/json"),
    ("Accept", "application/json"),
];

const PLAIN_TEXT_HEADERS: &[(&str, &str)] = &[("Accept", "text/plain")];

/// Anything a request can be aimed at: a URL string or a parsed `Uri`.
///
/// Only absolute `http`/`https` URIs with a host are accepted.
pub trait Target {
    fn into_uri(self) -> Result<Uri, HttpApiError>;
}

impl Target for &str {
    fn into_uri(self) -> Result<Uri, HttpApiError> {
        let uri = self.parse::<Uri>().map_err(|source| HttpApiError::InvalidTarget {
            target: self.to_string(),
            source: source.into(),
        })?;
        checked(uri)
    }
}

impl Target for &String {
    fn into_uri(self) -> Result<Uri, HttpApiError> {
        self.as_str().into_uri()
    }
}

impl Target for String {
    fn into_uri(self) -> Result<Uri, HttpApiError> {
        self.as_str().into_uri()
    }
}

impl Target for Uri {
    fn into_uri(self) -> Result<Uri, HttpApiError> {
        checked(self)
    }
}

impl Target for &Uri {
    fn into_uri(self) -> Result<Uri, HttpApiError> {
        checked(self.clone())
    }
}

fn checked(uri: Uri) -> Result<Uri, HttpApiError> {
    let http_scheme = uri
        .scheme_str()
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https"));
    let has_host = uri.authority().is_some_and(|authority| !authority.host().is_empty());

    let problem = match (http_scheme, has_host) {
        (true, true) => return Ok(uri),
        (false, _) => TargetError::UnsupportedScheme,
        (true, false) => TargetError::MissingAuthority,
    };
    Err(HttpApiError::InvalidTarget {
        target: uri.to_string(),
        source: problem,
    })
}

/// Builds pre-configured requests and sends them through a shared agent.
///
/// Cloning is cheap; clones share the agent's connection pool.
#[derive(Clone)]
pub struct HttpApi {
    agent: Agent,
    config: HttpApiConfig,
}

impl fmt::Debug for HttpApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpApi")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for HttpApi {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpApi {
    /// An `HttpApi` with default config and its own agent.
    pub fn new() -> Self {
        Self::with_config(HttpApiConfig::default())
    }

    pub fn with_config(config: HttpApiConfig) -> Self {
        let agent = config.agent();
        Self { agent, config }
    }

    /// Use an agent built elsewhere. Its redirect and status settings are
    /// left as they are; `config.max_redirects` is ignored.
    pub fn with_agent(agent: Agent, config: HttpApiConfig) -> Self {
        Self { agent, config }
    }

    pub fn config(&self) -> &HttpApiConfig {
        &self.config
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    // -----------------------------------------------------------------------
    // Builders
    // -----------------------------------------------------------------------

    /// GET expecting JSON back.
    pub fn build_json_get(&self, target: impl Target) -> Result<HttpRequest, HttpApiError> {
        self.build_json_get_with(target, &[])
    }

    pub fn build_json_get_with(
        &self,
        target: impl Target,
        extra_headers: &[(&str, &str)],
    ) -> Result<HttpRequest, HttpApiError> {
        self.build(HttpMethod::Get, target, JSON_HEADERS, None, extra_headers)
    }

    /// GET expecting plain text back.
    pub fn build_plain_get(&self, target: impl Target) -> Result<HttpRequest, HttpApiError> {
        self.build_plain_get_with(target, &[])
    }

    pub fn build_plain_get_with(
        &self,
        target: impl Target,
        extra_headers: &[(&str, &str)],
    ) -> Result<HttpRequest, HttpApiError> {
        self.build(HttpMethod::Get, target, PLAIN_TEXT_HEADERS, None, extra_headers)
    }

    /// POST with no body and the plain-text defaults.
    pub fn build_plain_post(&self, target: impl Target) -> Result<HttpRequest, HttpApiError> {
        self.build_plain_post_with(target, &[])
    }

    pub fn build_plain_post_with(
        &self,
        target: impl Target,
        extra_headers: &[(&str, &str)],
    ) -> Result<HttpRequest, HttpApiError> {
        self.build(HttpMethod::Post, target, PLAIN_TEXT_HEADERS, None, extra_headers)
    }

    /// POST carrying `body` byte for byte, with the plain-text defaults.
    ///
    /// No `Content-Type` is attached for the body unless
    /// `HttpApiConfig::binary_content_type` is set.
    pub fn build_binary_post(
        &self,
        target: impl Target,
        body: impl Into<Vec<u8>>,
    ) -> Result<HttpRequest, HttpApiError> {
        self.build_binary_post_with(target, body, &[])
    }

    pub fn build_binary_post_with(
        &self,
        target: impl Target,
        body: impl Into<Vec<u8>>,
        extra_headers: &[(&str, &str)],
    ) -> Result<HttpRequest, HttpApiError> {
        self.build(
            HttpMethod::Post,
            target,
            PLAIN_TEXT_HEADERS,
            Some(body.into()),
            extra_headers,
        )
    }

    fn build(
        &self,
        method: HttpMethod,
        target: impl Target,
        shape_headers: &[(&str, &str)],
        body: Option<Vec<u8>>,
        extra_headers: &[(&str, &str)],
    ) -> Result<HttpRequest, HttpApiError> {
        let uri = target.into_uri()?;

        let identity = [
            ("User-Agent", self.config.user_agent.as_str()),
            ("Accept-Language", self.config.accept_language.as_str()),
        ];
        let body_type = body
            .as_ref()
            .and(self.config.binary_content_type.as_deref())
            .map(|content_type| ("Content-Type", content_type));

        let headers = shape_headers
            .iter()
            .copied()
            .chain(identity)
            .chain(body_type)
            .chain(extra_headers.iter().copied())
            .map(|(name, value)| header_pair(name, value))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(HttpRequest::new(method, uri, headers, self.config.timeout(), body))
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Send on the calling thread, blocking until the body is decoded.
    ///
    /// Transport failures are logged and come back as `None`.
    pub fn send_blocking<D: BodyDecoder>(
        &self,
        request: &HttpRequest,
        decoder: D,
    ) -> Option<HttpResponse<D::Output>> {
        match self.try_send_blocking(request, decoder) {
            Ok(response) => Some(response),
            Err(err) => {
                tracing::error!(
                    method = request.method().as_str(),
                    uri = %request.uri(),
                    error = %err,
                    "request failed"
                );
                None
            }
        }
    }

    pub fn try_send_blocking<D: BodyDecoder>(
        &self,
        request: &HttpRequest,
        decoder: D,
    ) -> Result<HttpResponse<D::Output>, HttpApiError> {
        dispatch(&self.agent, request, &decoder)
    }

    /// Schedule the request on the current tokio runtime's blocking pool and
    /// return a handle to its eventual response.
    ///
    /// Returns `None` (and logs) only when the request cannot be scheduled.
    /// Failures during execution are reported by the `PendingResponse`.
    pub fn send_async<D: BodyDecoder>(
        &self,
        request: &HttpRequest,
        decoder: D,
    ) -> Option<PendingResponse<D::Output>> {
        match self.try_send_async(request, decoder) {
            Ok(pending) => Some(pending),
            Err(err) => {
                tracing::error!(uri = %request.uri(), error = %err, "could not schedule request");
                None
            }
        }
    }

    pub fn try_send_async<D: BodyDecoder>(
        &self,
        request: &HttpRequest,
        decoder: D,
    ) -> Result<PendingResponse<D::Output>, HttpApiError> {
        let uri = request.uri().to_string();
        let runtime = Handle::try_current()
            .map_err(|_| HttpApiError::AsyncSubmission { uri: uri.clone() })?;

        let agent = self.agent.clone();
        let request = request.clone();
        let task = runtime.spawn_blocking(move || dispatch(&agent, &request, &decoder));

        Ok(PendingResponse { uri, task })
    }
}

/// A request running in the background. Resolves exactly once.
///
/// Dropping it detaches the request; it is not cancelled.
#[derive(Debug)]
pub struct PendingResponse<T> {
    uri: String,
    task: JoinHandle<Result<HttpResponse<T>, HttpApiError>>,
}

impl<T> PendingResponse<T> {
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl<T> Future for PendingResponse<T> {
    type Output = Result<HttpResponse<T>, HttpApiError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.task).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(HttpApiError::Aborted {
                uri: self.uri.clone(),
            })),
        }
    }
}

fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), HttpApiError> {
    let invalid = || HttpApiError::InvalidHeader {
        name: name.to_string(),
    };
    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
    let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
    Ok((header_name, header_value))
}

fn dispatch<D: BodyDecoder>(
    agent: &Agent,
    request: &HttpRequest,
    decoder: &D,
) -> Result<HttpResponse<D::Output>, HttpApiError> {
    let transport = |source: ureq::Error| HttpApiError::Transport {
        uri: request.uri().to_string(),
        source,
    };

    let response = match request.body() {
        Some(body) => run(agent, request, body),
        None => run(agent, request, ()),
    }
    .map_err(transport)?;

    let (parts, body) = response.into_parts();
    let body = decoder.decode(body).map_err(transport)?;
    let headers = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    tracing::debug!(
        method = request.method().as_str(),
        uri = %request.uri(),
        status = parts.status.as_u16(),
        "request completed"
    );

    Ok(HttpResponse {
        status: parts.status.as_u16(),
        headers,
        body,
    })
}

fn run<S: AsSendBody>(
    agent: &Agent,
    request: &HttpRequest,
    body: S,
) -> Result<wire::Response<Body>, ureq::Error> {
    let mut outgoing = wire::Request::new(body);
    *outgoing.method_mut() = request.method().into();
    *outgoing.uri_mut() = request.uri().clone();
    let headers = outgoing.headers_mut();
    for (name, value) in request.headers() {
        headers.append(name.clone(), value.clone());
    }

    let outgoing = agent
        .configure_request(outgoing)
        .timeout_global(Some(request.timeout()))
        .build();
    agent.run(outgoing)
}
