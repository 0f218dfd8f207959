//! Error types for the sysctx system context.
//!
//! This module defines the error hierarchy used while bootstrapping a
//! system context. Errors are organized by concern (configuration,
//! controllers, lifecycle, registry, host), each with its own type.
//!
//! The root error type, `Error`, can wrap any of the concern-specific
//! errors, allowing for uniform error handling at the top level. It also
//! carries the `Replayed` variant used when a recorded startup failure is
//! raised again by a later registry lookup.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::types::ControllerState;

/// A boxed error, used as the cause of errors raised by third-party code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Root error type for the sysctx system.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration loading and lookup errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Controller resolution and binding errors
    #[error("Controller error: {0}")]
    Controller(#[from] ControllerError),

    /// Controller lifecycle and startup sequencing errors
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// Context registry errors
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Host descriptor errors
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    /// A lazily initialized field was installed after it had been computed
    #[error("{0} is already initialized")]
    AlreadyInitialized(&'static str),

    /// A failure recorded at startup, raised again by a later lookup.
    ///
    /// The wrapped error is the same instance every time, so repeated
    /// lookups after a failed startup all report the original failure.
    #[error(transparent)]
    Replayed(Arc<Error>),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// General runtime errors
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl Error {
    /// Returns the originally recorded error if this is a replayed failure,
    /// or `self` otherwise.
    pub fn origin(&self) -> &Error {
        match self {
            Error::Replayed(inner) => inner.origin(),
            other => other,
        }
    }
}

/// Errors related to configuration sources.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A property source is not syntactically valid
    #[error("Syntax error on line {line}: {message}")]
    Syntax {
        /// 1-based line number of the offending line
        line: usize,
        /// Description of the problem
        message: String,
    },

    /// A property source could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A resolved configuration file failed to load; no partial
    /// configuration is produced
    #[error("System configuration file {} could not be loaded", path.display())]
    Load {
        /// The file that failed
        path: PathBuf,
        /// The underlying read or syntax failure
        #[source]
        source: Box<ConfigError>,
    },

    /// A value exists but cannot be converted to the requested type
    #[error("Invalid value {value:?} for key {key}: {message}")]
    InvalidValue {
        /// The configuration key
        key: String,
        /// The raw value
        value: String,
        /// Why the conversion failed
        message: String,
    },
}

/// Errors related to lifecycle controllers.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// No constructor is registered under the requested identifier
    #[error("Unknown controller identifier: {0}")]
    Unknown(String),

    /// The controller constructor panicked
    #[error("Controller constructor panicked: {0}")]
    ConstructorPanicked(String),

    /// The controller could not be produced; wraps the lookup or constructor failure
    #[error("Failed to instantiate controller {name}")]
    Instantiation {
        /// The requested controller identifier
        name: String,
        /// Why instantiation failed
        #[source]
        source: BoxError,
    },

    /// The controller already has an owning context
    #[error("Controller is already bound to a system context")]
    AlreadyBound,

    /// The controller has no owning context, or the context was dropped
    #[error("Controller is not bound to a system context")]
    NotBound,
}

/// Errors related to the controller lifecycle and startup orchestration.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The requested transition is not allowed from the current state
    #[error("Cannot {action} a controller in state {state}")]
    InvalidTransition {
        /// The attempted operation (`init`, `start`, `stop`)
        action: &'static str,
        /// The state the controller was in
        state: ControllerState,
    },

    /// The system initializer already owns a running context
    #[error("System context is already initialized")]
    AlreadyStarted,

    /// The system initializer has no running context to shut down
    #[error("System context was never initialized")]
    NotStarted,
}

/// Errors raised by context registry lookups.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// `get_required` found nothing in the root slot
    #[error("No {0} found")]
    NotFound(&'static str),

    /// A scan of the namespace found more than one candidate
    #[error("Nonunique {kind} found (attributes {attributes:?})")]
    NonUnique {
        /// Short name of the expected type
        kind: &'static str,
        /// The first two attributes found holding the type
        attributes: Vec<String>,
    },

    /// A slot holds a value of a different type
    #[error("Context attribute {attribute} is not of type {expected}")]
    TypeMismatch {
        /// The offending attribute name
        attribute: String,
        /// Short name of the expected type
        expected: &'static str,
    },

    /// A slot holds a panic recorded during startup
    #[error("Startup of context attribute {attribute} panicked: {message}")]
    Panicked {
        /// The attribute holding the failure
        attribute: String,
        /// The panic payload, if it was a string
        message: String,
    },
}

/// Errors related to host descriptors.
#[derive(Debug, Error)]
pub enum HostError {
    /// The descriptor file could not be read
    #[error("Failed to read host descriptor {}: {source}", path.display())]
    Unreadable {
        /// The descriptor path
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// The descriptor is not valid TOML or has the wrong shape
    #[error("Failed to parse host descriptor: {0}")]
    Parse(String),

    /// The descriptor parsed but is semantically invalid
    #[error("Invalid host descriptor: {0}")]
    Invalid(String),
}

/// Result type used throughout sysctx.
pub type Result<T> = std::result::Result<T, Error>;
