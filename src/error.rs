//! Error type shared by every storage strategy and container facade.

/// Failure reported by a container or storage operation.
///
/// Every operation that fails leaves the container exactly as it was before
/// the call, so callers can keep using it after handling the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The raw-memory primitive could not provide a buffer.
    #[error("failed to allocate {size} bytes (align {align})")]
    AllocFailed { size: usize, align: usize },

    /// The requested capacity does not fit in the address space.
    #[error("capacity overflow")]
    CapacityOverflow,

    /// Fixed-capacity storage was asked to hold more than it can.
    #[error("attempt to use more inline slots than available: requested {requested}, max {max}")]
    CapacityExceeded { requested: usize, max: usize },

    /// Checked element access past the end.
    #[error("attempt to access index {index} of a container of length {len}")]
    OutOfRange { index: usize, len: usize },

    /// `front`, `back` or `pop_back` on an empty container.
    #[error("attempt to call `{operation}` on an empty container")]
    Empty { operation: &'static str },

    /// Cursor moved or dereferenced outside the valid range.
    #[error("cursor position {position} is out of range for length {len}")]
    CursorOutOfRange { position: isize, len: usize },

    /// Two cursors bound to different containers were compared or subtracted.
    #[error("cursors of different containers")]
    ForeignCursor,
}

impl Error {
    /// Returns `true` for failures of the raw-memory primitive, including
    /// layout arithmetic that overflowed before reaching it.
    pub fn is_alloc_failure(&self) -> bool {
        matches!(self, Error::AllocFailed { .. } | Error::CapacityOverflow)
    }

    /// Returns `true` for index, cursor and fixed-capacity range violations.
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            Error::OutOfRange { .. } | Error::CursorOutOfRange { .. } | Error::CapacityExceeded { .. }
        )
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;
