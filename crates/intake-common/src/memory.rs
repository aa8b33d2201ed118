//! In-memory backends with the same contract as the file-backed ones.
//!
//! Exclusion comes from a `std::sync::Mutex`; a poisoned lock is recovered rather than
//! propagated, since the guarded data is a plain `Vec` that cannot be left half-updated by
//! the closures the stores pass in.

use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use crate::document::DocumentSink;
use crate::error::CommonError;
use crate::store::ArrayBackend;

#[derive(Debug, Default)]
pub struct MemoryArrayBackend {
    items: Mutex<Vec<Value>>,
}

impl MemoryArrayBackend {
    pub fn with_items(items: Vec<Value>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Value>> {
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ArrayBackend for MemoryArrayBackend {
    fn load(&self) -> Result<Vec<Value>, CommonError> {
        Ok(self.lock().clone())
    }

    fn update(&self, apply: &mut dyn FnMut(&mut Vec<Value>)) -> Result<(), CommonError> {
        let mut items = self.lock();
        apply(&mut items);
        Ok(())
    }

    fn inspect(
        &self,
        read: &mut dyn FnMut(&[Value]) -> Result<(), CommonError>,
    ) -> Result<(), CommonError> {
        let items = self.lock();
        read(&items)
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[derive(Debug, Default)]
pub struct MemoryDocument {
    body: Mutex<Option<String>>,
}

impl MemoryDocument {
    /// The most recently published body, if any.
    pub fn contents(&self) -> Option<String> {
        self.body
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl DocumentSink for MemoryDocument {
    fn publish(&self, body: &str) -> Result<(), CommonError> {
        *self.body.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(body.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
