//! The adapter factory.
//!
//! [`RxCallAdapterFactory`] is the entry point: it turns a [`Call`] into an
//! [`Adaptation`] with one of three projections, and the adaptation is then
//! narrowed to the shape the caller declares.
//!
//! | Projection | Item | Unsuccessful HTTP response | Transport failure |
//! |------------|------|----------------------------|-------------------|
//! | [`response`](RxCallAdapterFactory::response) | `Response<R>` | value | error |
//! | [`body`](RxCallAdapterFactory::body) | `R` | [`CallError::Http`] error | error |
//! | [`result`](RxCallAdapterFactory::result) | `CallResult<R>` | value | value |
//!
//! [`CallError::Http`]: callrx_core::CallError::Http

use std::sync::Arc;

use callrx_core::{Call, CallResult, Response};
use tokio::runtime::Handle;

use crate::scheduler::SubscribeOn;
use crate::shape::{
    Adapted, Completable, Flowable, Maybe, Observable, ReturnShape, Single,
};
use crate::source::{BodySource, CallSource, Discard, ResultSource, Source};

/// Creates adaptations of calls.
///
/// # Example
///
/// ```ignore
/// use callrx::RxCallAdapterFactory;
///
/// let factory = RxCallAdapterFactory::create();
///
/// // Unwrap the body; a 404 fails the single with CallError::Http.
/// let body: String = factory.body(call).into_single().await?;
///
/// // Never fail; inspect the outcome instead.
/// let result = factory.result(other_call).into_single().await?;
/// if result.is_error() {
///     eprintln!("no response: {}", result.error()?);
/// }
/// ```
#[derive(Clone, Debug, Default)]
pub struct RxCallAdapterFactory {
    scheduler: Option<Handle>,
}

impl RxCallAdapterFactory {
    /// Create a factory that subscribes on the caller's task.
    pub fn create() -> Self {
        Self::default()
    }

    /// Create a factory whose subscriptions are handed off to `scheduler`.
    pub fn create_with_scheduler(scheduler: Handle) -> Self {
        Self {
            scheduler: Some(scheduler),
        }
    }

    /// Create a factory builder.
    pub fn builder() -> FactoryBuilder {
        FactoryBuilder::new()
    }

    /// The configured scheduler, if any.
    pub fn scheduler(&self) -> Option<&Handle> {
        self.scheduler.as_ref()
    }

    /// Adapt `call`, emitting the raw [`Response`], successful or not.
    pub fn response<C: Call>(&self, call: C) -> Adaptation<Response<C::Body>> {
        self.finish(CallSource::new(call))
    }

    /// Adapt `call`, emitting the body and failing on unsuccessful responses.
    pub fn body<C: Call>(&self, call: C) -> Adaptation<C::Body> {
        self.finish(BodySource::new(CallSource::new(call)))
    }

    /// Adapt `call`, emitting every outcome as a [`CallResult`] value.
    ///
    /// Only outcomes of the call are wrapped. Misuse is still a stream
    /// error: subscribing again after the call executed fails with
    /// [`CallError::IllegalState`](callrx_core::CallError::IllegalState).
    pub fn result<C: Call>(&self, call: C) -> Adaptation<CallResult<C::Body>> {
        self.finish(ResultSource::new(CallSource::new(call)))
    }

    fn finish<S>(&self, source: S) -> Adaptation<S::Item>
    where
        S: Source,
        S::Item: Send + 'static,
    {
        let source: Arc<dyn Source<Item = S::Item>> = Arc::new(source);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            scheduled = self.scheduler.is_some(),
            "adaptation created"
        );

        match &self.scheduler {
            Some(handle) => Adaptation::new(Arc::new(SubscribeOn::new(source, handle.clone()))),
            None => Adaptation::new(source),
        }
    }
}

/// Builder for [`RxCallAdapterFactory`].
#[derive(Debug, Default)]
pub struct FactoryBuilder {
    scheduler: Option<Handle>,
}

impl FactoryBuilder {
    /// Create a builder with no scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand subscriptions off to `handle`.
    pub fn scheduler(mut self, handle: Handle) -> Self {
        self.scheduler = Some(handle);
        self
    }

    /// Hand subscriptions off to the runtime this is called from, if any.
    pub fn current_runtime(mut self) -> Self {
        self.scheduler = Handle::try_current().ok();
        self
    }

    /// Build the factory.
    pub fn build(self) -> RxCallAdapterFactory {
        RxCallAdapterFactory {
            scheduler: self.scheduler,
        }
    }
}

/// A projected call, ready to be narrowed to a shape.
///
/// An adaptation is cold: nothing runs until a shape built from it is
/// subscribed, and every subscription runs the pipeline again.
pub struct Adaptation<T> {
    source: Arc<dyn Source<Item = T>>,
}

impl<T: Send + 'static> Adaptation<T> {
    fn new(source: Arc<dyn Source<Item = T>>) -> Self {
        Self { source }
    }

    /// A plain value stream.
    pub fn into_observable(self) -> Observable<T> {
        Observable::new(self.source)
    }

    /// A stream that keeps only the latest value the consumer has not
    /// polled for yet.
    pub fn into_flowable(self) -> Flowable<T> {
        Flowable::new(self.source)
    }

    /// Exactly one value; an empty stream is an error.
    pub fn into_single(self) -> Single<T> {
        Single::new(self.source)
    }

    /// Zero or one value.
    pub fn into_maybe(self) -> Maybe<T> {
        Maybe::new(self.source)
    }

    /// Completion only.
    pub fn into_completable(self) -> Completable {
        Completable::new(Arc::new(Discard::new(self.source)))
    }

    /// Narrow to a shape chosen at runtime.
    pub fn into_shape(self, shape: ReturnShape) -> Adapted<T> {
        match shape {
            ReturnShape::Observable => Adapted::Observable(self.into_observable()),
            ReturnShape::Flowable => Adapted::Flowable(self.into_flowable()),
            ReturnShape::Single => Adapted::Single(self.into_single()),
            ReturnShape::Maybe => Adapted::Maybe(self.into_maybe()),
            ReturnShape::Completable => Adapted::Completable(self.into_completable()),
        }
    }
}

impl<T: Send + 'static> From<Adaptation<T>> for Observable<T> {
    fn from(adaptation: Adaptation<T>) -> Self {
        adaptation.into_observable()
    }
}

impl<T: Send + 'static> From<Adaptation<T>> for Flowable<T> {
    fn from(adaptation: Adaptation<T>) -> Self {
        adaptation.into_flowable()
    }
}

impl<T: Send + 'static> From<Adaptation<T>> for Single<T> {
    fn from(adaptation: Adaptation<T>) -> Self {
        adaptation.into_single()
    }
}

impl<T: Send + 'static> From<Adaptation<T>> for Maybe<T> {
    fn from(adaptation: Adaptation<T>) -> Self {
        adaptation.into_maybe()
    }
}

impl<T: Send + 'static> From<Adaptation<T>> for Completable {
    fn from(adaptation: Adaptation<T>) -> Self {
        adaptation.into_completable()
    }
}
