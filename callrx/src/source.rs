//! Pipeline stages.
//!
//! An adaptation is a chain of [`Source`] stages built once and subscribed
//! any number of times. Each subscription creates a fresh [`EventStream`]
//! from every stage in order: the bridge first, then the projection, then
//! the optional scheduler hand-off.

use std::sync::Arc;

use callrx_core::{Call, CallError, CallResult, Response};
use futures::StreamExt;
use futures::stream::BoxStream;

use crate::bridge::CallStream;
use crate::disposable::Disposable;
use crate::projection::{BodyStream, ResultStream};

/// The stream produced by one subscription to a stage.
///
/// An `Err` item is terminal. The stream ending without a preceding `Err`
/// is normal completion.
pub type EventStream<T> = BoxStream<'static, Result<T, CallError>>;

/// A cold stage of an adaptation pipeline.
pub trait Source: Send + Sync + 'static {
    /// The item type emitted by this stage.
    type Item;

    /// Subscribe to this stage, tying the new stream to `disposable`.
    fn subscribe(&self, disposable: &Disposable) -> EventStream<Self::Item>;
}

impl<S: Source + ?Sized> Source for Arc<S> {
    type Item = S::Item;

    fn subscribe(&self, disposable: &Disposable) -> EventStream<Self::Item> {
        (**self).subscribe(disposable)
    }
}

/// Bridge stage: runs the call once per subscription.
pub struct CallSource<C> {
    call: Arc<C>,
}

impl<C> CallSource<C> {
    pub fn new(call: C) -> Self {
        Self {
            call: Arc::new(call),
        }
    }
}

impl<C: Call> Source for CallSource<C> {
    type Item = Response<C::Body>;

    fn subscribe(&self, disposable: &Disposable) -> EventStream<Self::Item> {
        CallStream::subscribe(self.call.clone(), disposable).boxed()
    }
}

/// Unwrap-body projection stage.
pub struct BodySource<S> {
    upstream: S,
}

impl<S> BodySource<S> {
    pub fn new(upstream: S) -> Self {
        Self { upstream }
    }
}

impl<S, R> Source for BodySource<S>
where
    S: Source<Item = Response<R>>,
    R: Send + 'static,
{
    type Item = R;

    fn subscribe(&self, disposable: &Disposable) -> EventStream<R> {
        BodyStream::new(self.upstream.subscribe(disposable)).boxed()
    }
}

/// Wrap-result projection stage.
pub struct ResultSource<S> {
    upstream: S,
}

impl<S> ResultSource<S> {
    pub fn new(upstream: S) -> Self {
        Self { upstream }
    }
}

impl<S, R> Source for ResultSource<S>
where
    S: Source<Item = Response<R>>,
    R: Send + 'static,
{
    type Item = CallResult<R>;

    fn subscribe(&self, disposable: &Disposable) -> EventStream<CallResult<R>> {
        ResultStream::new(self.upstream.subscribe(disposable)).boxed()
    }
}

/// Drops every value, keeping only the terminal event.
pub(crate) struct Discard<S> {
    upstream: S,
}

impl<S> Discard<S> {
    pub(crate) fn new(upstream: S) -> Self {
        Self { upstream }
    }
}

impl<S> Source for Discard<S>
where
    S: Source,
    S::Item: Send + 'static,
{
    type Item = ();

    fn subscribe(&self, disposable: &Disposable) -> EventStream<()> {
        self.upstream
            .subscribe(disposable)
            .filter_map(|item| futures::future::ready(item.err().map(Err)))
            .boxed()
    }
}
