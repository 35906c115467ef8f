//! The per request [`Context`] shared by middleware, handler and transport.
//!
//! A fresh context is created by [`Router::match_route`](crate::Router::match_route) for every request. It
//! collects the captured path variables while the trie is walked, and afterwards the response that the
//! middleware chain and the handler build up: status code, headers and body. The transport renders it and
//! drops it, nothing survives across requests.
//!
//! The body builders (`json`, `text`, `html`, `xml`, `file`) always set `Content-Type` and a
//! `Content-Length` computed from the final body bytes.

use crate::{ResponseBody, RouteError};
use http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE, IntoHeaderName};
use http::{HeaderMap, HeaderValue, StatusCode};
use mime::Mime;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Default)]
pub struct Context {
    path_variables: HashMap<String, String>,
    status: StatusCode,
    headers: HeaderMap,
    body: ResponseBody,
    aborted: bool,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_path_variable(&mut self, name: &str, value: &str) {
        self.path_variables.insert(name.to_owned(), value.to_owned());
    }

    /// Returns the value captured for the `:name` segment of the matched route.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::VariableNotBound`] if no segment was captured under `name` during this match.
    pub fn path_variable(&self, name: &str) -> Result<&str, RouteError> {
        self.path_variables.get(name).map(String::as_str).ok_or_else(|| RouteError::variable_not_bound(name))
    }

    pub fn path_variables(&self) -> &HashMap<String, String> {
        &self.path_variables
    }

    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Response headers, in the order they were first set.
    ///
    /// The order holds only because headers are never removed from the map.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Sets a response header, replacing the value in place if the name is already present.
    pub fn set_header<K: IntoHeaderName>(&mut self, name: K, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    #[inline]
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Stops the middleware chain after the current middleware and answers with `status`.
    ///
    /// Only middleware calls are checked: once the handler runs the flag is no longer consulted.
    pub fn abort(&mut self, status: StatusCode) {
        self.status = status;
        self.aborted = true;
    }

    /// Sets the body with the given content type.
    pub fn body_with(&mut self, mime: &Mime, body: impl Into<ResponseBody>) {
        self.headers.insert(CONTENT_TYPE, content_type(mime));
        self.set_body(body.into());
    }

    /// Serializes `value` with serde_json and sends it as `application/json`.
    ///
    /// Use [`Context::raw_json`] for text that is already serialized.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::Json`] if `value` can't be serialized; the context is left unchanged.
    pub fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), RouteError> {
        let json = serde_json::to_string(value)?;
        self.body_with(&mime::APPLICATION_JSON, json);
        Ok(())
    }

    /// Sends pre-serialized json text verbatim.
    pub fn raw_json(&mut self, json: impl Into<String>) {
        self.body_with(&mime::APPLICATION_JSON, json.into());
    }

    pub fn text(&mut self, text: impl Into<String>) {
        self.body_with(&mime::TEXT_PLAIN, text.into());
    }

    pub fn xml(&mut self, xml: impl Into<String>) {
        self.body_with(&mime::TEXT_XML, xml.into());
    }

    /// Reads the html file at `path` and sends it as `text/html`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::ResourceNotFound`] if the file can't be opened or isn't valid UTF-8.
    pub fn html(&mut self, path: impl AsRef<Path>) -> Result<(), RouteError> {
        let html = read_text(path.as_ref())?;
        self.body_with(&mime::TEXT_HTML, html);
        Ok(())
    }

    /// Sends the file at `path` as an `application/octet-stream` attachment.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::ResourceNotFound`] if the file can't be read, or
    /// [`RouteError::InvalidHeader`] if the path can't be used as a `Content-Disposition` filename.
    pub fn file(&mut self, path: impl AsRef<Path>) -> Result<(), RouteError> {
        let path = path.as_ref();
        let bytes = read_bytes(path)?;
        let disposition = HeaderValue::from_str(&format!("attachment; filename={}", quoted_filename(path)))
            .map_err(|e| RouteError::invalid_header(CONTENT_DISPOSITION, e))?;

        self.headers.insert(CONTENT_TYPE, content_type(&mime::APPLICATION_OCTET_STREAM));
        self.headers.insert(CONTENT_DISPOSITION, disposition);
        self.set_body(ResponseBody::from(bytes));
        Ok(())
    }

    /// Splits the context into the parts a transport needs to write the response.
    pub fn into_response_parts(self) -> (StatusCode, HeaderMap, ResponseBody) {
        (self.status, self.headers, self.body)
    }

    fn set_body(&mut self, body: ResponseBody) {
        self.headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        self.body = body;
    }
}

/// `path` as a quoted-string, with `"` and `\` escaped.
fn quoted_filename(path: &Path) -> String {
    let name = path.display().to_string();
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for c in name.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

fn content_type(mime: &Mime) -> HeaderValue {
    // a parsed mime only contains token chars, all of them are valid header bytes
    HeaderValue::from_str(mime.as_ref()).unwrap_or(HeaderValue::from_static("application/octet-stream"))
}

fn read_text(path: &Path) -> Result<String, RouteError> {
    let mut file = File::open(path).map_err(|e| RouteError::resource_not_found(path.display(), e))?;
    let mut text = String::new();
    file.read_to_string(&mut text).map_err(|e| RouteError::resource_not_found(path.display(), e))?;
    Ok(text)
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, RouteError> {
    let mut file = File::open(path).map_err(|e| RouteError::resource_not_found(path.display(), e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| RouteError::resource_not_found(path.display(), e))?;
    Ok(bytes)
}
