//! Pooled hyper client and its builder.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use callrx_core::CallError;
use http_body_util::Full;
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::{TokioExecutor, TokioTimer};
use tokio::runtime::Handle;

use super::call::HyperCall;
use super::converter::Converter;

pub(crate) type HyperClient = Client<HttpConnector, Full<Bytes>>;

/// Errors that can occur when building a [`HyperTransport`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportBuildError {
    /// No runtime was configured and none is running on this thread.
    #[error("no tokio runtime: call from within a runtime or set one with `runtime`")]
    NoRuntime,
}

/// HTTP transport using hyper_util's legacy client.
///
/// Supports HTTP/1.1 and HTTP/2 over plain TCP with connection pooling.
/// Calls created by the transport run on the runtime captured at build time.
///
/// # Example
///
/// ```ignore
/// use callrx::transport::{HyperTransport, StringConverter};
///
/// let transport = HyperTransport::builder()
///     .pool_max_idle_per_host(8)
///     .build()?;
/// let call = transport.get("http://localhost:8080/", StringConverter)?;
/// ```
#[derive(Clone)]
pub struct HyperTransport {
    client: HyperClient,
    handle: Handle,
    http2_only: bool,
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport")
            .field("http2_only", &self.http2_only)
            .finish_non_exhaustive()
    }
}

impl HyperTransport {
    /// Create a new transport builder.
    pub fn builder() -> HyperTransportBuilder {
        HyperTransportBuilder::new()
    }

    /// Create a new transport with default settings on the current runtime.
    pub fn new() -> Result<Self, TransportBuildError> {
        Self::builder().build()
    }

    /// Create a single-use call for `request`.
    ///
    /// Nothing is sent until the call is enqueued.
    pub fn new_call<T, C>(&self, request: http::Request<Bytes>, converter: C) -> HyperCall<T>
    where
        T: Send + 'static,
        C: Converter<T>,
    {
        HyperCall::new(
            self.client.clone(),
            self.handle.clone(),
            request,
            Arc::new(converter),
        )
    }

    /// Create a single-use `GET` call for `uri`.
    pub fn get<T, C>(&self, uri: &str, converter: C) -> Result<HyperCall<T>, CallError>
    where
        T: Send + 'static,
        C: Converter<T>,
    {
        let request = http::Request::get(uri)
            .body(Bytes::new())
            .map_err(|e| CallError::illegal_argument(format!("invalid request: {e}")))?;
        Ok(self.new_call(request, converter))
    }

    /// Check if this transport is configured for HTTP/2 only.
    pub fn is_http2_only(&self) -> bool {
        self.http2_only
    }

    /// The runtime calls are spawned on.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

/// Builder for [`HyperTransport`].
///
/// # Example
///
/// ```ignore
/// use callrx::transport::HyperTransportBuilder;
/// use std::time::Duration;
///
/// let transport = HyperTransportBuilder::new()
///     .http2_only(true)
///     .pool_idle_timeout(Duration::from_secs(90))
///     .build()?;
/// ```
pub struct HyperTransportBuilder {
    /// Force HTTP/2 without the upgrade handshake (h2c).
    http2_only: bool,
    /// Connection pool idle timeout.
    pool_idle_timeout: Option<Duration>,
    /// Maximum idle connections per host.
    pool_max_idle_per_host: usize,
    /// Runtime for calls and connection tasks.
    runtime: Option<Handle>,
}

impl Default for HyperTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HyperTransportBuilder {
    /// Create a new transport builder with default settings.
    pub fn new() -> Self {
        Self {
            http2_only: false,
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 32,
            runtime: None,
        }
    }

    /// Enable HTTP/2 only mode.
    pub fn http2_only(mut self, enabled: bool) -> Self {
        self.http2_only = enabled;
        self
    }

    /// Set the connection pool idle timeout.
    ///
    /// Default: 90 seconds.
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    /// Disable connection pool idle timeout.
    pub fn pool_idle_timeout_none(mut self) -> Self {
        self.pool_idle_timeout = None;
        self
    }

    /// Set the maximum number of idle connections per host.
    ///
    /// Default: 32.
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Run calls on `handle` instead of the runtime current at build time.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Build the transport.
    pub fn build(self) -> Result<HyperTransport, TransportBuildError> {
        let handle = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| TransportBuildError::NoRuntime)?,
        };

        let mut builder = Client::builder(TokioExecutor::new());

        // Required for pool_idle_timeout to take effect
        builder.pool_timer(TokioTimer::new());

        if let Some(timeout) = self.pool_idle_timeout {
            builder.pool_idle_timeout(timeout);
        }
        builder.pool_max_idle_per_host(self.pool_max_idle_per_host);

        if self.http2_only {
            builder.http2_only(true);
        }

        let client = builder.build(HttpConnector::new());

        Ok(HyperTransport {
            client,
            handle,
            http2_only: self.http2_only,
        })
    }
}

impl std::fmt::Debug for HyperTransportBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransportBuilder")
            .field("http2_only", &self.http2_only)
            .field("pool_idle_timeout", &self.pool_idle_timeout)
            .field("pool_max_idle_per_host", &self.pool_max_idle_per_host)
            .field("runtime", &self.runtime.is_some())
            .finish()
    }
}
