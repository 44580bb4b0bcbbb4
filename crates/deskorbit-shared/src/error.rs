//! Error taxonomy shared by every layer
//!
//! OS failures are converted into an [`OrbitError`] right after the failing
//! call and carry the platform error code. Nothing is retried.

use thiserror::Error;

/// Errors raised while talking to the icon container or its process
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrbitError {
    /// The icon container (or its owning process) could not be resolved
    #[error("Desktop icon container not found")]
    NotFound,

    /// Opening the container's owning process was denied
    #[error("Failed to open the icon container's process (error {code:#x})")]
    Access {
        /// Platform error code
        code: u32,
    },

    /// Reserving memory inside the foreign process failed
    #[error("Failed to allocate {size} bytes in the foreign process (error {code:#x})")]
    Allocation {
        /// Requested size in bytes
        size: usize,
        /// Platform error code
        code: u32,
    },

    /// Copying bytes to or from the foreign process failed or came up short
    #[error("Remote {op} failed (error {code:#x})")]
    Transfer {
        /// Which transfer failed ("write" or "read")
        op: &'static str,
        /// Platform error code
        code: u32,
    },

    /// The cursor position could not be queried or converted
    #[error("Failed to query the cursor position (error {code:#x})")]
    Cursor {
        /// Platform error code
        code: u32,
    },

    /// A coordinate would not survive packing into 16 bits
    #[error("{what} coordinate {value} is outside the 16-bit range")]
    OutOfRange {
        /// Which coordinate overflowed
        what: &'static str,
        /// The offending value
        value: i64,
    },
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, OrbitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_code() {
        let err = OrbitError::Access { code: 5 };
        assert_eq!(
            err.to_string(),
            "Failed to open the icon container's process (error 0x5)"
        );

        let err = OrbitError::Transfer {
            op: "read",
            code: 0x12b,
        };
        assert_eq!(err.to_string(), "Remote read failed (error 0x12b)");
    }

    #[test]
    fn test_out_of_range_message() {
        let err = OrbitError::OutOfRange {
            what: "orbit right edge",
            value: 40000,
        };
        assert_eq!(
            err.to_string(),
            "orbit right edge coordinate 40000 is outside the 16-bit range"
        );
    }
}
