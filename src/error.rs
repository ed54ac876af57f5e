//! Process-level error type.
//!
//! Exit-code conventions used across the pipeline:
//!
//! - `2` — I/O and schema errors (unreadable input, missing required column,
//!   unwritable output)
//! - `3` — structural violations in the input data (duplicate keys where
//!   uniqueness is a precondition)
//!
//! Parse failures on individual values are *not* errors; they become missing
//! values and are reported per-row by the ingest layer.

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// I/O or schema error (exit code 2).
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    /// Structural precondition violation in the input data (exit code 3).
    pub fn structural(message: impl Into<String>) -> Self {
        Self::new(3, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
