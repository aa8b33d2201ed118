//! Append-only JSON array stores.
//!
//! A store is an ordered array of JSON objects behind an `ArrayBackend`. Backends own the
//! concurrency discipline: every `update` is an exclusive read-modify-write, and `inspect`
//! reads under the same exclusion so callers can derive artifacts from a consistent snapshot.
//!
//! `JsonStore<T>` layers typed access on top of a backend. Items are kept as raw JSON values
//! on the backend side, so records written by older code (or by hand) are never rewritten
//! into a different shape.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::CommonError;

pub trait ArrayBackend: Send + Sync {
    /// Create the backing array as `[]` if it does not exist yet.
    fn ensure(&self) -> Result<(), CommonError> {
        Ok(())
    }

    /// Current contents. Missing, empty, or undecodable data reads as an empty sequence.
    fn load(&self) -> Result<Vec<Value>, CommonError>;

    /// Exclusive read-modify-write. `apply` sees the full current sequence and the result
    /// is persisted in full before the exclusion is released.
    fn update(&self, apply: &mut dyn FnMut(&mut Vec<Value>)) -> Result<(), CommonError>;

    /// Run `read` over the current contents while holding the same exclusion as `update`.
    fn inspect(
        &self,
        read: &mut dyn FnMut(&[Value]) -> Result<(), CommonError>,
    ) -> Result<(), CommonError>;

    /// Short human-readable name used in log fields.
    fn describe(&self) -> String;
}

pub struct JsonStore<T> {
    backend: Arc<dyn ArrayBackend>,
    _item: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonStore<T> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            _item: PhantomData,
        }
    }
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(backend: Arc<dyn ArrayBackend>) -> Self {
        Self {
            backend,
            _item: PhantomData,
        }
    }

    pub fn ensure(&self) -> Result<(), CommonError> {
        self.backend.ensure()
    }

    /// Append one item and return the store length after the append.
    pub fn append(&self, item: &T) -> Result<usize, CommonError> {
        let value = serde_json::to_value(item)?;
        let mut pending = Some(value);
        let mut len = 0;
        self.backend.update(&mut |items| {
            if let Some(value) = pending.take() {
                items.push(value);
            }
            len = items.len();
        })?;
        Ok(len)
    }

    /// All items that decode as `T`, in store order.
    pub fn load(&self) -> Result<Vec<T>, CommonError> {
        let raw = self.backend.load()?;
        Ok(decode_items(&raw, &self.backend.describe()))
    }

    /// Number of raw entries in the store, including ones that would not decode as `T`.
    pub fn len(&self) -> Result<usize, CommonError> {
        Ok(self.backend.load()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, CommonError> {
        Ok(self.len()? == 0)
    }

    /// Run `f` over a typed snapshot while the backend holds its exclusion, so no append
    /// can land between reading the snapshot and acting on it.
    pub fn with_snapshot<R>(
        &self,
        f: impl FnOnce(Vec<T>) -> Result<R, CommonError>,
    ) -> Result<R, CommonError> {
        let name = self.backend.describe();
        let store = name.clone();
        let mut f = Some(f);
        let mut out = None;
        self.backend.inspect(&mut |raw| {
            if let Some(f) = f.take() {
                out = Some(f(decode_items(raw, &store))?);
            }
            Ok(())
        })?;
        out.ok_or(CommonError::NoSnapshot(name))
    }
}

fn decode_items<T: DeserializeOwned>(raw: &[Value], store: &str) -> Vec<T> {
    raw.iter()
        .enumerate()
        .filter_map(|(index, value)| {
            serde_json::from_value(value.clone())
                .inspect_err(|e| {
                    warn!(error = %e, store, index, "skipping undecodable store entry")
                })
                .ok()
        })
        .collect()
}
