//! Chat platform API error types.

/// A call to the chat platform API failed.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Platform Error: {} at line {} in {}", message, line, file)]
pub struct PlatformError {
    /// Error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl PlatformError {
    /// Create a new PlatformError with the given message at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use shuffler_error::PlatformError;
    ///
    /// let err = PlatformError::new("Missing Access");
    /// assert_eq!(err.message, "Missing Access");
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
