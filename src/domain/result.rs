//! Result type alias for formcast
//!
//! This module provides a convenient Result type alias that uses FormcastError
//! as the error type.

use super::errors::FormcastError;

/// Result type alias for formcast operations
///
/// # Examples
///
/// ```
/// use formcast::domain::result::Result;
/// use formcast::domain::errors::FormcastError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(FormcastError::Export("nothing to write".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, FormcastError>;
