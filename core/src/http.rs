//! Request descriptors, responses and body decoders.
//!
//! # Design
//! `HttpRequest` is built only by `HttpApi` and exposes read-only accessors,
//! so a descriptor never changes between construction and dispatch. Headers
//! are kept as an ordered list rather than a map so repeated names survive
//! exactly as they were supplied.
//!
//! `HttpResponse` keeps plain owned fields; the body type is whatever the
//! chosen `BodyDecoder` produces.

use std::io;
use std::time::Duration;

use ureq::http::{HeaderName, HeaderValue, Method, Uri};
use ureq::Body;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        }
    }
}

/// An immutable, fully-formed request ready for dispatch.
///
/// Built by the `HttpApi::build_*` methods.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: HttpMethod,
    uri: Uri,
    headers: Vec<(HeaderName, HeaderValue)>,
    timeout: Duration,
    body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub(crate) fn new(
        method: HttpMethod,
        uri: Uri,
        headers: Vec<(HeaderName, HeaderValue)>,
        timeout: Duration,
        body: Option<Vec<u8>>,
    ) -> Self {
        Self {
            method,
            uri,
            headers,
            timeout,
            body,
        }
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Headers in attachment order: shape defaults, identity defaults, then
    /// caller-supplied extras. Names may repeat.
    pub fn headers(&self) -> &[(HeaderName, HeaderValue)] {
        &self.headers
    }

    /// All values attached under `name` (case-insensitive), in order.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(n, _)| n.as_str().eq_ignore_ascii_case(name))
            .filter_map(|(_, v)| v.to_str().ok())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

/// A response with its body decoded by a `BodyDecoder`.
#[derive(Debug, Clone)]
pub struct HttpResponse<T> {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: T,
}

impl<T> HttpResponse<T> {
    /// First value of the header `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// How a raw response body is turned into a value.
///
/// Decoders run on whichever thread executes the request, which for
/// `send_async` is a runtime worker, hence the `Send + 'static` bounds.
pub trait BodyDecoder: Send + 'static {
    type Output: Send + 'static;

    fn decode(&self, body: Body) -> Result<Self::Output, ureq::Error>;
}

/// Decode the body as UTF-8 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsText;

impl BodyDecoder for AsText {
    type Output = String;

    fn decode(&self, mut body: Body) -> Result<String, ureq::Error> {
        body.read_to_string()
    }
}

/// Keep the body as raw bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsBytes;

impl BodyDecoder for AsBytes {
    type Output = Vec<u8>;

    fn decode(&self, mut body: Body) -> Result<Vec<u8>, ureq::Error> {
        body.read_to_vec()
    }
}

/// Read and drop the body.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discarding;

impl BodyDecoder for Discarding {
    type Output = ();

    fn decode(&self, mut body: Body) -> Result<(), ureq::Error> {
        io::copy(&mut body.as_reader(), &mut io::sink())?;
        Ok(())
    }
}
