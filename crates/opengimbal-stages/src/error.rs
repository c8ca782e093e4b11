//! Error types for stage configuration.

use thiserror::Error;

/// Errors raised when configuring a transform stage.
///
/// Stage computation itself is infallible; only parameter changes can be
/// rejected. The errors are `Copy` so they can cross an interrupt boundary
/// without allocation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StageError {
    /// The linear-map input range has zero width, which would divide by zero
    /// during remapping.
    #[error("degenerate linear map input range: in_min == in_max ({0})")]
    DegenerateRange(i16),
}

/// A specialized `Result` for stage configuration.
pub type StageResult<T = ()> = Result<T, StageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_range_display() {
        let err = StageError::DegenerateRange(512);
        assert_eq!(
            err.to_string(),
            "degenerate linear map input range: in_min == in_max (512)"
        );
    }
}
