// Errors surfaced by one wake cycle.
//
// The SD and asset layers report &'static str reasons (matching the
// embedded-sdmmc glue), JSON failures keep serde_json's own error.

use core::fmt;

#[derive(Debug)]
pub enum Error {
    /// SD card / filesystem failure.
    Storage(&'static str),
    /// Status file could not be encoded or decoded.
    Status(serde_json::Error),
    /// Tomato image missing or not a valid bitmap.
    Asset(&'static str),
    /// Panel communication failed.
    Display(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Storage(e) => write!(f, "storage: {}", e),
            Error::Status(e) => write!(f, "status: {}", e),
            Error::Asset(e) => write!(f, "asset: {}", e),
            Error::Display(e) => write!(f, "display: {}", e),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Status(e)
    }
}

impl core::error::Error for Error {}
