//! System configuration loading.
//!
//! # Data Flow
//! ```text
//! "systemConfigLocation" startup parameter (or the default list)
//!     → locations.rs (split, resolve, skip missing)
//!     → loader.rs (parse each source, merge with override precedence)
//!     → Configuration (immutable, cached on the SystemContext)
//! ```

pub mod loader;
pub mod locations;

pub use loader::{load_configuration, load_from_parameter};
pub use locations::{
    resolve_sources, split_locations, CONFIG_LOCATION_PARAM, DEFAULT_CONFIG_LOCATIONS,
};
