use std::fmt;
use std::marker::PhantomData;

use bytes::Bytes;
use callrx_core::TransportError;
use serde::de::DeserializeOwned;

/// Turns a successful response body into a value.
///
/// A conversion failure is reported as a [`TransportError::Decode`], the same
/// way a body that could not be read would be.
pub trait Converter<T>: Send + Sync + 'static {
    fn convert(&self, body: Bytes) -> Result<T, TransportError>;
}

/// UTF-8 text bodies.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringConverter;

impl Converter<String> for StringConverter {
    fn convert(&self, body: Bytes) -> Result<String, TransportError> {
        String::from_utf8(body.to_vec())
            .map_err(|e| TransportError::Decode(format!("body is not UTF-8: {e}")))
    }
}

/// Raw bodies.
#[derive(Clone, Copy, Debug, Default)]
pub struct BytesConverter;

impl Converter<Bytes> for BytesConverter {
    fn convert(&self, body: Bytes) -> Result<Bytes, TransportError> {
        Ok(body)
    }
}

/// Ignores the body.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnitConverter;

impl Converter<()> for UnitConverter {
    fn convert(&self, _body: Bytes) -> Result<(), TransportError> {
        Ok(())
    }
}

/// JSON bodies, deserialized with serde_json.
pub struct JsonConverter<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonConverter<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonConverter<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for JsonConverter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonConverter")
            .field("target", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: DeserializeOwned + 'static> Converter<T> for JsonConverter<T> {
    fn convert(&self, body: Bytes) -> Result<T, TransportError> {
        serde_json::from_slice(&body).map_err(|e| TransportError::Decode(e.to_string()))
    }
}
