//! Error types for caustic texture generation

use std::fmt;

/// Errors that can occur while building diagrams, masks or textures
#[derive(Debug, Clone, PartialEq)]
pub enum CausticError {
    /// Configuration validation failed
    InvalidConfig(String),
    /// Input geometry was rejected before the sweep started
    InvalidInput(String),
    /// Diagram construction hit a numerical dead end
    GenerationFailed(String),
    /// The mask could not be turned into a bitmap
    RasterizationFailed(String),
    /// Requested cell ID does not exist
    CellNotFound(usize),
    /// Writing a bitmap to disk failed
    Io(String),
}

impl fmt::Display for CausticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CausticError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            CausticError::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
            CausticError::GenerationFailed(msg) => write!(f, "generation failed: {}", msg),
            CausticError::RasterizationFailed(msg) => write!(f, "rasterization failed: {}", msg),
            CausticError::CellNotFound(id) => write!(f, "cell not found: {}", id),
            CausticError::Io(msg) => write!(f, "i/o error: {}", msg),
        }
    }
}

impl std::error::Error for CausticError {}

/// Result type alias for caustic operations
pub type Result<T> = std::result::Result<T, CausticError>;
