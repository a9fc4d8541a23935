//! Crate-level error type
//!
//! Most operations surface their module-local error (registry lookups,
//! placement); this type exists for the entry points that can fail in more
//! than one way.

use crate::placement::PlacementError;
use crate::registry::RegistryError;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Debug)]
pub enum Error {
    /// A registry lookup or mutation failed
    Registry(RegistryError),
    /// Placement found no usable node
    Placement(PlacementError),
    /// Filesystem error from the archive sync
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Registry(e) => write!(f, "Registry error: {}", e),
            Error::Placement(e) => write!(f, "Placement error: {}", e),
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Registry(e) => Some(e),
            Error::Placement(e) => Some(e),
            Error::Io(e) => Some(e),
        }
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Error::Registry(e)
    }
}

impl From<PlacementError> for Error {
    fn from(e: PlacementError) -> Self {
        Error::Placement(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
