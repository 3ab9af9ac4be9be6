//! # Error Types
//!
//! This module defines error types used throughout the laurel library.

use thiserror::Error;

/// Main error type for laurel operations
#[derive(Debug, Error)]
pub enum LaurelError {
    /// Template image errors (read, decode)
    #[error("Template error: {0}")]
    Template(String),

    /// Font loading or registration error
    #[error("Font error: {0}")]
    Font(String),

    /// Certificate render/encode error
    #[error("Render error: {0}")]
    Render(String),

    /// Archive packaging error
    #[error("Archive error: {0}")]
    Archive(String),

    /// Invalid field mapping (position or size out of range)
    #[error("Invalid field mapping: {0}")]
    InvalidField(String),

    /// Problem with the parsed data rows
    #[error("Data error: {0}")]
    Data(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
