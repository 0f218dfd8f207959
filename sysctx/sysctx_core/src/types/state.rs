//! Lifecycle controller states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Controller state in the lifecycle.
///
/// A controller moves `Created → Initialized → Running → Stopped`;
/// `init` must happen strictly before `start`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControllerState {
    /// Controller is constructed but not yet initialized.
    #[default]
    Created,

    /// Controller is initialized and ready to start.
    Initialized,

    /// Controller is running.
    Running,

    /// Controller has been stopped.
    Stopped,
}

impl ControllerState {
    /// Get the name of this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Initialized => "Initialized",
            Self::Running => "Running",
            Self::Stopped => "Stopped",
        }
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
