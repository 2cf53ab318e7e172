//! Common test utilities for integration tests
//!
//! Provides in-memory stand-ins for the REST transport and the MDX engine so
//! `ElementService` can be driven without a TM1 server.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use serde_json::{Value, json};
use tm1_elements::{ElementResult, MdxExecutor, RowsAndValues};
use tm1_transport_traits::{
    BoxFuture, HttpMethod, RequestOptions, RestResponse, RestTransport, TransportError,
    TransportResult,
};

/// A request seen by a fake transport
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<String>,
    pub options: RequestOptions,
}

impl RecordedRequest {
    /// The body parsed as JSON
    pub fn json_body(&self) -> Value {
        serde_json::from_str(self.body.as_deref().unwrap_or("null")).unwrap()
    }
}

/// Transport answering with canned responses in FIFO order and recording
/// every request
#[derive(Debug, Default)]
pub struct RecordingTransport {
    responses: Mutex<VecDeque<TransportResult<RestResponse>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a 200 response with a JSON body
    pub fn respond_json(&self, body: Value) -> &Self {
        self.respond(Ok(RestResponse::new(200, body.to_string())))
    }

    /// Queue a 200 response with a plain-text body
    pub fn respond_text(&self, body: &str) -> &Self {
        self.respond(Ok(RestResponse::new(200, body.to_string())))
    }

    /// Queue an empty response with the given status
    pub fn respond_empty(&self, status: u16) -> &Self {
        self.respond(Ok(RestResponse::new(status, "")))
    }

    /// Queue a non-success HTTP status
    pub fn respond_status(&self, status: u16) -> &Self {
        self.respond(Err(TransportError::status(status, "", "")))
    }

    /// Queue an arbitrary outcome
    pub fn respond(&self, outcome: TransportResult<RestResponse>) -> &Self {
        self.responses.lock().unwrap().push_back(outcome);
        self
    }

    /// Every request seen so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The single request seen so far
    pub fn only_request(&self) -> RecordedRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request: {requests:#?}");
        requests.into_iter().next().unwrap()
    }

    /// Canned responses not consumed yet
    pub fn pending(&self) -> usize {
        self.responses.lock().unwrap().len()
    }

    fn record(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<String>,
        options: &RequestOptions,
    ) -> TransportResult<RestResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            url: url.to_string(),
            body,
            options: options.clone(),
        });
        match self.responses.lock().unwrap().pop_front() {
            Some(Err(TransportError::Status { status, body, .. })) => {
                Err(TransportError::status(status, url, body))
            }
            Some(outcome) => outcome,
            None => Err(TransportError::Internal(format!("no canned response for {method} {url}"))),
        }
    }
}

impl RestTransport for RecordingTransport {
    fn get<'a>(
        &'a self,
        url: &'a str,
        options: &'a RequestOptions,
    ) -> BoxFuture<'a, TransportResult<RestResponse>> {
        Box::pin(async move { self.record(HttpMethod::Get, url, None, options) })
    }

    fn post<'a>(
        &'a self,
        url: &'a str,
        body: String,
        options: &'a RequestOptions,
    ) -> BoxFuture<'a, TransportResult<RestResponse>> {
        Box::pin(async move { self.record(HttpMethod::Post, url, Some(body), options) })
    }

    fn patch<'a>(
        &'a self,
        url: &'a str,
        body: String,
        options: &'a RequestOptions,
    ) -> BoxFuture<'a, TransportResult<RestResponse>> {
        Box::pin(async move { self.record(HttpMethod::Patch, url, Some(body), options) })
    }

    fn delete<'a>(
        &'a self,
        url: &'a str,
        options: &'a RequestOptions,
    ) -> BoxFuture<'a, TransportResult<RestResponse>> {
        Box::pin(async move { self.record(HttpMethod::Delete, url, None, options) })
    }
}

/// A single hierarchy held in memory, addressed through the element URLs
#[derive(Debug, Default)]
pub struct InMemoryHierarchy {
    elements: Mutex<HashMap<String, Value>>,
}

impl InMemoryHierarchy {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Extracts the element name from `.../Elements('<name>')...`
    fn element_name(url: &str) -> Option<String> {
        let start = url.find("/Elements('")? + "/Elements('".len();
        let end = start + url[start..].find("')")?;
        let decoded = percent_decode_str(&url[start..end]).decode_utf8().ok()?;
        Some(decoded.replace("''", "'"))
    }

    fn lookup(&self, url: &str) -> TransportResult<RestResponse> {
        let name = Self::element_name(url)
            .ok_or_else(|| TransportError::status(400, url, "no element in URL"))?;
        let elements = self.elements.lock().unwrap();
        match elements.get(&name.to_lowercase()) {
            Some(element) => Ok(RestResponse::new(200, element.to_string())),
            None => Err(TransportError::status(404, url, "element not found")),
        }
    }

    fn insert(&self, url: &str, body: &str) -> TransportResult<RestResponse> {
        let mut element: Value = serde_json::from_str(body)?;
        let name = element["Name"]
            .as_str()
            .ok_or_else(|| TransportError::status(400, url, "missing Name"))?
            .to_string();
        element["UniqueName"] = json!(format!("[Fake].[Fake].[{name}]"));
        element["Attributes"] = json!({});
        let mut elements = self.elements.lock().unwrap();
        if elements.contains_key(&name.to_lowercase()) {
            return Err(TransportError::status(400, url, "element already exists"));
        }
        elements.insert(name.to_lowercase(), element.clone());
        Ok(RestResponse::new(201, element.to_string()))
    }

    fn remove(&self, url: &str) -> TransportResult<RestResponse> {
        let name = Self::element_name(url)
            .ok_or_else(|| TransportError::status(400, url, "no element in URL"))?;
        match self.elements.lock().unwrap().remove(&name.to_lowercase()) {
            Some(_) => Ok(RestResponse::new(204, "")),
            None => Err(TransportError::status(404, url, "element not found")),
        }
    }
}

impl RestTransport for InMemoryHierarchy {
    fn get<'a>(
        &'a self,
        url: &'a str,
        _options: &'a RequestOptions,
    ) -> BoxFuture<'a, TransportResult<RestResponse>> {
        Box::pin(async move { self.lookup(url) })
    }

    fn post<'a>(
        &'a self,
        url: &'a str,
        body: String,
        _options: &'a RequestOptions,
    ) -> BoxFuture<'a, TransportResult<RestResponse>> {
        Box::pin(async move { self.insert(url, &body) })
    }

    fn patch<'a>(
        &'a self,
        url: &'a str,
        _body: String,
        _options: &'a RequestOptions,
    ) -> BoxFuture<'a, TransportResult<RestResponse>> {
        Box::pin(async move { self.lookup(url).map(|_| RestResponse::new(204, "")) })
    }

    fn delete<'a>(
        &'a self,
        url: &'a str,
        _options: &'a RequestOptions,
    ) -> BoxFuture<'a, TransportResult<RestResponse>> {
        Box::pin(async move { self.remove(url) })
    }
}

/// MDX executor returning canned rows and recording each query
#[derive(Debug, Default)]
pub struct StubMdxExecutor {
    rows: Mutex<RowsAndValues>,
    queries: Mutex<Vec<(String, bool)>>,
}

impl StubMdxExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Add a row keyed by a single member
    pub fn with_row(self: Arc<Self>, member: &str, values: Vec<Value>) -> Arc<Self> {
        self.rows
            .lock()
            .unwrap()
            .insert(vec![member.to_string()], values);
        self
    }

    /// Queries executed so far, with their `element_unique_names` flag
    pub fn queries(&self) -> Vec<(String, bool)> {
        self.queries.lock().unwrap().clone()
    }

    /// The single query executed so far
    pub fn only_query(&self) -> String {
        let queries = self.queries();
        assert_eq!(queries.len(), 1, "expected exactly one query: {queries:#?}");
        queries[0].0.clone()
    }
}

#[async_trait]
impl MdxExecutor for StubMdxExecutor {
    async fn execute_mdx_rows_and_values(
        &self,
        mdx: &str,
        element_unique_names: bool,
        _options: &RequestOptions,
    ) -> ElementResult<RowsAndValues> {
        self.queries
            .lock()
            .unwrap()
            .push((mdx.to_string(), element_unique_names));
        Ok(self.rows.lock().unwrap().clone())
    }
}

/// `{"value": [{"Name": ...}, ...]}`
pub fn names_body(names: &[&str]) -> Value {
    json!({ "value": names.iter().map(|n| json!({ "Name": n })).collect::<Vec<_>>() })
}
