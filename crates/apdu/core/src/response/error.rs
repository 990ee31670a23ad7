//! Error types specific to APDU responses

use thiserror::Error;

/// Error for APDU response processing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseError {
    /// Fewer than two bytes were received, so there is no status word
    #[error("Incomplete response: {0} bytes")]
    Incomplete(usize),
}
