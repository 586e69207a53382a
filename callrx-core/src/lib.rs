//! Core types for callrx.
//!
//! This crate provides the types shared by call implementations and the
//! stream adapters in the `callrx` crate.
//!
//! ## Modules
//!
//! - [`call`]: The single-use asynchronous [`Call`] abstraction
//! - [`response`]: [`Response`], the outcome of a call that reached the server
//! - [`result`]: [`CallResult`], the non-escalating outcome wrapper
//! - [`error`]: Transport, HTTP and adapter error types

mod call;
mod error;
mod response;
mod result;

pub use call::*;
pub use error::*;
pub use response::*;
pub use result::*;
