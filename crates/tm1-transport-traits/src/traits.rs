//! Core transport traits.

use std::future::Future;
use std::pin::Pin;

use crate::error::{TransportError, TransportResult};
use crate::types::{RequestOptions, RestResponse};

/// A boxed, sendable future borrowed from the transport.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The REST transport consumed by the TM1 clients.
///
/// URLs are relative to the server root, e.g. `/api/v1/Dimensions`.
/// Implementations must resolve to `Err(TransportError::Status { .. })` for
/// every non-2xx outcome, so callers only ever see successful responses.
pub trait RestTransport: Send + Sync + std::fmt::Debug {
    /// Issues a `GET` request.
    fn get<'a>(
        &'a self,
        url: &'a str,
        options: &'a RequestOptions,
    ) -> BoxFuture<'a, TransportResult<RestResponse>>;

    /// Issues a `POST` request with a JSON body.
    fn post<'a>(
        &'a self,
        url: &'a str,
        body: String,
        options: &'a RequestOptions,
    ) -> BoxFuture<'a, TransportResult<RestResponse>>;

    /// Issues a `PATCH` request with a JSON body.
    fn patch<'a>(
        &'a self,
        url: &'a str,
        body: String,
        options: &'a RequestOptions,
    ) -> BoxFuture<'a, TransportResult<RestResponse>>;

    /// Issues a `DELETE` request.
    fn delete<'a>(
        &'a self,
        url: &'a str,
        options: &'a RequestOptions,
    ) -> BoxFuture<'a, TransportResult<RestResponse>>;

    /// Probes whether `url` addresses an existing object.
    ///
    /// Every HTTP status failure (404 and any other non-success status) maps
    /// to `Ok(false)`. Failures that never produced a status, such as a
    /// refused connection, are still returned as errors.
    fn exists<'a>(
        &'a self,
        url: &'a str,
        options: &'a RequestOptions,
    ) -> BoxFuture<'a, TransportResult<bool>> {
        Box::pin(async move {
            match self.get(url, options).await {
                Ok(_) => Ok(true),
                Err(TransportError::Status { .. }) => Ok(false),
                Err(e) => Err(e),
            }
        })
    }
}
