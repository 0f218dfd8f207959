//! Context Registry
//!
//! Publishes system contexts into a host's attribute namespace and looks
//! them up again. One reserved slot, [`root_attribute`], is the default
//! publish/lookup location; any other name is a custom slot.
//!
//! Lookups distinguish three outcomes: nothing registered (`Ok(None)`), a
//! published context, and a context whose startup failed. A failure
//! recorded with [`record_failure`] is raised again on every lookup of that
//! slot, so a failed startup is reported the same way each time instead of
//! looking like a context that was never started.
//!
//! The registry adds no locking of its own beyond what the
//! `AttributeStore` provides.

use std::any::{type_name, Any};
use std::sync::Arc;

use once_cell::sync::Lazy;
use sysctx_core::error::{Error, RegistryError, Result};
use sysctx_core::types::{Attribute, AttributeStore, StartupFailure};
use tracing::warn;

use crate::system::SystemContext;

static ROOT_ATTRIBUTE: Lazy<String> =
    Lazy::new(|| format!("{}.ROOT", type_name::<SystemContext>()));

/// Name of the reserved root slot.
pub fn root_attribute() -> &'static str {
    ROOT_ATTRIBUTE.as_str()
}

/// Publish `context` in the root slot, or clear it with `None`.
pub fn set_context(scope: &AttributeStore, context: Option<Arc<SystemContext>>) {
    set_context_as(scope, root_attribute(), context);
}

/// Publish `context` under a custom name, or clear it with `None`.
pub fn set_context_as(scope: &AttributeStore, name: &str, context: Option<Arc<SystemContext>>) {
    scope.set(name, context.map(Attribute::value));
}

/// Record a startup failure under `name`, replacing whatever was there.
pub fn record_failure(scope: &AttributeStore, name: &str, failure: StartupFailure) {
    warn!(attribute = %name, "Recording system context startup failure");
    scope.set(name, Some(Attribute::Failure(failure)));
}

/// Look up the root context.
pub fn get_context(scope: &AttributeStore) -> Result<Option<Arc<SystemContext>>> {
    get_typed(scope, root_attribute())
}

/// Look up the context published under `name`.
pub fn get_context_as(scope: &AttributeStore, name: &str) -> Result<Option<Arc<SystemContext>>> {
    get_typed(scope, name)
}

/// Look up the root context, failing with `RegistryError::NotFound` when
/// the slot is empty.
pub fn get_required_context(scope: &AttributeStore) -> Result<Arc<SystemContext>> {
    get_required_typed(scope, root_attribute())
}

/// Find the root context, or else the only context published anywhere in
/// the namespace.
///
/// When the root slot is occupied it wins without looking at other slots.
/// Otherwise every slot is scanned and two or more contexts fail with
/// `RegistryError::NonUnique`.
pub fn find_context(scope: &AttributeStore) -> Result<Option<Arc<SystemContext>>> {
    find_typed(scope, root_attribute())
}

/// Read slot `name` expecting a `T`.
///
/// - empty slot: `Ok(None)`;
/// - recorded error: `Err(Error::Replayed)` carrying the original error;
/// - recorded panic: `Err(RegistryError::Panicked)`;
/// - value of another type: `Err(RegistryError::TypeMismatch)`.
pub fn get_typed<T>(scope: &AttributeStore, name: &str) -> Result<Option<Arc<T>>>
where
    T: Any + Send + Sync,
{
    match scope.get(name) {
        None => Ok(None),
        Some(Attribute::Failure(StartupFailure::Error(error))) => Err(Error::Replayed(error)),
        Some(Attribute::Failure(StartupFailure::Panic(message))) => Err(RegistryError::Panicked {
            attribute: name.to_string(),
            message,
        }
        .into()),
        Some(Attribute::Value(value)) => value.downcast::<T>().map(Some).map_err(|_| {
            RegistryError::TypeMismatch {
                attribute: name.to_string(),
                expected: short_type_name::<T>(),
            }
            .into()
        }),
    }
}

/// Read slot `name`, failing when it is empty.
pub fn get_required_typed<T>(scope: &AttributeStore, name: &str) -> Result<Arc<T>>
where
    T: Any + Send + Sync,
{
    get_typed(scope, name)?.ok_or_else(|| RegistryError::NotFound(short_type_name::<T>()).into())
}

/// Prefer slot `preferred`; otherwise scan all slots for a unique `T`.
///
/// Failures and values of other types in the scanned slots are skipped.
pub fn find_typed<T>(scope: &AttributeStore, preferred: &str) -> Result<Option<Arc<T>>>
where
    T: Any + Send + Sync,
{
    if let Some(found) = get_typed::<T>(scope, preferred)? {
        return Ok(Some(found));
    }

    let mut found: Option<(String, Arc<T>)> = None;
    for name in scope.names() {
        let Some(Attribute::Value(value)) = scope.get(&name) else {
            continue;
        };
        let Ok(candidate) = value.downcast::<T>() else {
            continue;
        };
        if let Some((first, _)) = found {
            return Err(RegistryError::NonUnique {
                kind: short_type_name::<T>(),
                attributes: vec![first, name],
            }
            .into());
        }
        found = Some((name, candidate));
    }

    Ok(found.map(|(_, candidate)| candidate))
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
