//! Ordered method + path router with `{name}` placeholders.
//!
//! Routes are tried in registration order and the first full match wins, so
//! literal routes must be registered before parametrized routes that would
//! also match them (`/about-us/type/{type}` before `/about-us/{id}`).

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::Method;
use axum::response::Response;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

/// A path capture coerced by shape: all ASCII digits become an integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathParam {
    Integer(i64),
    Text(String),
}

impl PathParam {
    /// Digit strings that overflow `i64` stay text.
    pub fn from_capture(raw: &str) -> Self {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = raw.parse::<i64>() {
                return PathParam::Integer(n);
            }
        }
        PathParam::Text(raw.to_string())
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PathParam::Integer(n) => Some(*n),
            PathParam::Text(_) => None,
        }
    }
}

impl fmt::Display for PathParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathParam::Integer(n) => write!(f, "{}", n),
            PathParam::Text(s) => f.write_str(s),
        }
    }
}

/// Captures of a matched route, in template order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    values: Vec<(String, PathParam)>,
}

impl RouteParams {
    pub fn get(&self, name: &str) -> Option<&PathParam> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("route template must start with '/': {0}")]
    MissingLeadingSlash(String),
    #[error("unbalanced or nested braces in route template: {0}")]
    UnbalancedBraces(String),
    #[error("invalid placeholder '{name}' in route template: {template}")]
    InvalidPlaceholder { template: String, name: String },
    #[error("route template does not compile: {0}")]
    Pattern(String),
}

pub type HandlerFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Route handler: typed captures plus raw request body in, response out.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, params: RouteParams, body: Bytes) -> HandlerFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(RouteParams, Bytes) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, params: RouteParams, body: Bytes) -> HandlerFuture {
        Box::pin(self(params, body))
    }
}

pub enum Dispatch {
    Matched(Response),
    Unmatched,
}

struct Route {
    method: Method,
    template: String,
    pattern: Regex,
    names: Vec<String>,
    handler: Arc<dyn Handler>,
}

#[derive(Default)]
pub struct PathRouter {
    routes: Vec<Route>,
    prefix: String,
}

impl PathRouter {
    pub fn new() -> Self { Self::default() }

    pub fn get(&mut self, template: &str, handler: impl Handler) -> Result<&mut Self, RouteError> {
        self.add(Method::GET, template, handler)
    }

    pub fn post(&mut self, template: &str, handler: impl Handler) -> Result<&mut Self, RouteError> {
        self.add(Method::POST, template, handler)
    }

    pub fn put(&mut self, template: &str, handler: impl Handler) -> Result<&mut Self, RouteError> {
        self.add(Method::PUT, template, handler)
    }

    pub fn delete(&mut self, template: &str, handler: impl Handler) -> Result<&mut Self, RouteError> {
        self.add(Method::DELETE, template, handler)
    }

    /// Register under the current group prefix. Re-registering the same method
    /// and template is allowed, but the earlier route keeps matching.
    pub fn add(&mut self, method: Method, template: &str, handler: impl Handler) -> Result<&mut Self, RouteError> {
        let template = format!("{}{}", self.prefix, template);
        let (pattern, names) = compile(&template)?;
        if self.routes.iter().any(|r| r.method == method && r.template == template) {
            warn!(%method, %template, "duplicate route registered; the first registration wins");
        }
        self.routes.push(Route { method, template, pattern, names, handler: Arc::new(handler) });
        Ok(self)
    }

    /// Run `block` with `prefix` appended to the current prefix. The previous
    /// prefix is restored afterwards, also when `block` fails.
    pub fn group<F>(&mut self, prefix: &str, block: F) -> Result<&mut Self, RouteError>
    where
        F: FnOnce(&mut Self) -> Result<(), RouteError>,
    {
        let saved = self.prefix.len();
        self.prefix.push_str(prefix);
        let result = block(self);
        self.prefix.truncate(saved);
        result?;
        Ok(self)
    }

    /// Registered `(method, template)` pairs in match order.
    pub fn routes(&self) -> impl Iterator<Item = (&Method, &str)> {
        self.routes.iter().map(|r| (&r.method, r.template.as_str()))
    }

    pub fn len(&self) -> usize { self.routes.len() }

    pub fn is_empty(&self) -> bool { self.routes.is_empty() }

    pub async fn dispatch(&self, method: &Method, path: &str, body: Bytes) -> Dispatch {
        match self.matching(method, path) {
            Some((route, params)) => {
                debug!(%method, path, template = %route.template, "route matched");
                Dispatch::Matched(route.handler.call(params, body).await)
            }
            None => Dispatch::Unmatched,
        }
    }

    fn matching(&self, method: &Method, path: &str) -> Option<(&Route, RouteParams)> {
        self.routes.iter().filter(|r| r.method == *method).find_map(|route| {
            let caps = route.pattern.captures(path)?;
            let values = route
                .names
                .iter()
                .zip(caps.iter().skip(1))
                .map(|(name, m)| (name.clone(), PathParam::from_capture(m.map(|m| m.as_str()).unwrap_or_default())))
                .collect();
            Some((route, RouteParams { values }))
        })
    }
}

/// Turn a template into an anchored regex plus its placeholder names.
fn compile(template: &str) -> Result<(Regex, Vec<String>), RouteError> {
    if !template.starts_with('/') {
        return Err(RouteError::MissingLeadingSlash(template.to_string()));
    }
    let unbalanced = || RouteError::UnbalancedBraces(template.to_string());

    let mut pattern = String::from("^");
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(pos) = rest.find(|c: char| c == '{' || c == '}') {
        let (literal, tail) = rest.split_at(pos);
        if tail.starts_with('}') {
            return Err(unbalanced());
        }
        pattern.push_str(&regex::escape(literal));
        let inner = &tail[1..];
        let close = inner.find('}').ok_or_else(unbalanced)?;
        let name = &inner[..close];
        if name.contains('{') {
            return Err(unbalanced());
        }
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(RouteError::InvalidPlaceholder { template: template.to_string(), name: name.to_string() });
        }
        pattern.push_str("([^/]+)");
        names.push(name.to_string());
        rest = &inner[close + 1..];
    }
    pattern.push_str(&regex::escape(rest));
    pattern.push('$');

    let re = Regex::new(&pattern).map_err(|e| RouteError::Pattern(e.to_string()))?;
    Ok((re, names))
}
