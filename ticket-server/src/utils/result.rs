//! Unified Result Types

use crate::AppError;

/// Application-level Result type
///
/// Used in HTTP handlers and the printer service facade
pub type AppResult<T> = Result<T, AppError>;
