//! Convenience result type alias for stationlock.

use crate::error::AppError;

/// A specialized `Result` type for stationlock operations.
pub type AppResult<T> = Result<T, AppError>;
