//! The attribute namespace a host exposes.
//!
//! An `AttributeStore` is the shared, host-wide key/value namespace in
//! which system contexts are published. A slot is either absent, holds a
//! value of any type, or holds a failure recorded while a context was being
//! started. Setting a slot to `None` removes it; there is no other state.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Error;

/// A failure recorded in place of a context whose startup did not complete.
#[derive(Debug, Clone)]
pub enum StartupFailure {
    /// Startup returned an error.
    Error(Arc<Error>),

    /// Startup panicked; holds the panic message.
    Panic(String),
}

/// The content of an occupied slot.
#[derive(Clone)]
pub enum Attribute {
    /// A published value.
    Value(Arc<dyn Any + Send + Sync>),

    /// A recorded startup failure.
    Failure(StartupFailure),
}

impl Attribute {
    /// Wrap a shared value.
    pub fn value<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self::Value(value)
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(_) => f.write_str("Value(..)"),
            Self::Failure(failure) => f.debug_tuple("Failure").field(failure).finish(),
        }
    }
}

/// A host-wide attribute namespace.
///
/// The store adds no ordering guarantees of its own: concurrent `set`
/// calls on one name resolve last-writer-wins, and reads never block
/// each other.
#[derive(Default)]
pub struct AttributeStore {
    attributes: RwLock<HashMap<String, Attribute>>,
}

impl AttributeStore {
    /// Create an empty namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a slot, or remove it when `attribute` is `None`.
    pub fn set(&self, name: impl Into<String>, attribute: Option<Attribute>) {
        let name = name.into();
        let mut attributes = self.attributes.write();
        match attribute {
            Some(attribute) => {
                attributes.insert(name, attribute);
            }
            None => {
                attributes.remove(&name);
            }
        }
    }

    /// Read a slot.
    pub fn get(&self, name: &str) -> Option<Attribute> {
        self.attributes.read().get(name).cloned()
    }

    /// A sorted snapshot of the occupied slot names.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.attributes.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.attributes.read().len()
    }

    /// Check whether no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.attributes.read().is_empty()
    }

    /// Remove every slot.
    pub fn clear(&self) {
        self.attributes.write().clear();
    }
}

impl fmt::Debug for AttributeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeStore")
            .field("names", &self.names())
            .finish()
    }
}
