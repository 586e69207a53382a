//! Cardinality adapters.
//!
//! Each shape is a cold handle: it holds the adaptation pipeline and runs it
//! again for every subscription. With a single-use call, the second
//! subscription fails with [`CallError::IllegalState`].
//!
//! | Shape | Subscribing yields | Empty stream |
//! |-------|--------------------|--------------|
//! | [`Observable`] | [`Subscription`] stream | completes |
//! | [`Flowable`] | [`Latest`] stream (latest wins) | completes |
//! | [`Single`] | [`SingleFuture`] | [`CallError::NoElement`] |
//! | [`Maybe`] | [`MaybeFuture`] | `Ok(None)` |
//! | [`Completable`] | [`CompletableFuture`] | `Ok(())` |
//!
//! [`CallError::IllegalState`]: callrx_core::CallError::IllegalState
//! [`CallError::NoElement`]: callrx_core::CallError::NoElement

mod future;
mod latest;

use std::future::IntoFuture;
use std::sync::Arc;

pub use future::{CompletableFuture, MaybeFuture, SingleFuture};
pub use latest::Latest;

use crate::disposable::Disposable;
use crate::source::Source;
use crate::subscription::Subscription;

type DynSource<T> = Arc<dyn Source<Item = T>>;

fn subscribe<T: Send + 'static>(source: &DynSource<T>) -> Subscription<T> {
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!("subscribe").entered();

    let disposable = Disposable::new();
    let events = source.subscribe(&disposable);
    Subscription::new(events, disposable)
}

/// The shape requested by the caller's declared return type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReturnShape {
    /// A plain value stream.
    Observable,
    /// A backpressure-aware stream with latest-wins overflow.
    Flowable,
    /// Exactly one value.
    Single,
    /// Zero or one value.
    Maybe,
    /// Completion only.
    Completable,
}

/// An adaptation narrowed to a [`ReturnShape`] chosen at runtime.
pub enum Adapted<T> {
    Observable(Observable<T>),
    Flowable(Flowable<T>),
    Single(Single<T>),
    Maybe(Maybe<T>),
    Completable(Completable),
}

impl<T> Adapted<T> {
    /// The shape of this adaptation.
    pub fn shape(&self) -> ReturnShape {
        match self {
            Adapted::Observable(_) => ReturnShape::Observable,
            Adapted::Flowable(_) => ReturnShape::Flowable,
            Adapted::Single(_) => ReturnShape::Single,
            Adapted::Maybe(_) => ReturnShape::Maybe,
            Adapted::Completable(_) => ReturnShape::Completable,
        }
    }
}

/// A plain value stream.
pub struct Observable<T> {
    source: DynSource<T>,
}

impl<T: Send + 'static> Observable<T> {
    pub(crate) fn new(source: DynSource<T>) -> Self {
        Self { source }
    }

    /// Subscribe, starting the call.
    pub fn subscribe(&self) -> Subscription<T> {
        subscribe(&self.source)
    }
}

/// A backpressure-aware stream: values the consumer has not asked for yet
/// are replaced by newer ones instead of being queued.
pub struct Flowable<T> {
    source: DynSource<T>,
}

impl<T: Send + 'static> Flowable<T> {
    pub(crate) fn new(source: DynSource<T>) -> Self {
        Self { source }
    }

    /// Subscribe, starting the call.
    ///
    /// The call runs immediately; its outcome waits in the returned stream
    /// until the consumer polls.
    pub fn subscribe(&self) -> Latest<Subscription<T>, T> {
        Latest::new(subscribe(&self.source))
    }
}

/// Exactly one value.
pub struct Single<T> {
    source: DynSource<T>,
}

impl<T: Send + 'static> Single<T> {
    pub(crate) fn new(source: DynSource<T>) -> Self {
        Self { source }
    }

    /// Subscribe, starting the call.
    pub fn subscribe(&self) -> SingleFuture<T> {
        SingleFuture::new(subscribe(&self.source))
    }
}

impl<T: Send + 'static> IntoFuture for Single<T> {
    type Output = <SingleFuture<T> as std::future::Future>::Output;
    type IntoFuture = SingleFuture<T>;

    fn into_future(self) -> Self::IntoFuture {
        self.subscribe()
    }
}

/// Zero or one value.
pub struct Maybe<T> {
    source: DynSource<T>,
}

impl<T: Send + 'static> Maybe<T> {
    pub(crate) fn new(source: DynSource<T>) -> Self {
        Self { source }
    }

    /// Subscribe, starting the call.
    pub fn subscribe(&self) -> MaybeFuture<T> {
        MaybeFuture::new(subscribe(&self.source))
    }
}

impl<T: Send + 'static> IntoFuture for Maybe<T> {
    type Output = <MaybeFuture<T> as std::future::Future>::Output;
    type IntoFuture = MaybeFuture<T>;

    fn into_future(self) -> Self::IntoFuture {
        self.subscribe()
    }
}

/// Completion only; values are discarded.
pub struct Completable {
    source: DynSource<()>,
}

impl Completable {
    pub(crate) fn new(source: DynSource<()>) -> Self {
        Self { source }
    }

    /// Subscribe, starting the call.
    pub fn subscribe(&self) -> CompletableFuture {
        CompletableFuture::new(subscribe(&self.source))
    }
}

impl IntoFuture for Completable {
    type Output = <CompletableFuture as std::future::Future>::Output;
    type IntoFuture = CompletableFuture;

    fn into_future(self) -> Self::IntoFuture {
        self.subscribe()
    }
}

macro_rules! impl_clone {
    ($($shape:ident<$t:ident>),*) => {
        $(
            impl<$t> Clone for $shape<$t> {
                fn clone(&self) -> Self {
                    Self { source: self.source.clone() }
                }
            }
        )*
    };
}

impl_clone!(Observable<T>, Flowable<T>, Single<T>, Maybe<T>);

impl Clone for Completable {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
        }
    }
}
