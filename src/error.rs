use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the Sprite-Animator library
#[derive(Error, Debug)]
pub enum AnimatorError {
    #[error("Sprite asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Sprite asset and frame element errors
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Unknown event '{event}' on frame element '{element}'")]
    UnknownEvent { element: String, event: String },

    #[error("Unknown frame element: {name}")]
    UnknownElement { name: String },

    #[error("Event '{event}' on frame element '{element}' has no sprites")]
    EmptySequence { element: String, event: String },

    #[error("Invalid sprite: {reason}")]
    InvalidSprite { reason: String },

    #[error("Failed to load sprites from: {path}")]
    LoadFailed { path: String },

    #[error("Failed to decode sprite image {path}: {reason}")]
    DecodeFailed { path: String, reason: String },
}

/// Transform errors
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Scale must be positive, got {value}")]
    InvalidScale { value: f64 },

    #[error("Parameter '{field}' evaluated to a non-finite value at frame {frame}")]
    NonFinite { field: &'static str, frame: u64 },

    #[error("Transform field '{field}' has invalid value {value}")]
    InvalidValue { field: &'static str, value: f64 },

    #[error("Loop period must be at least 1")]
    InvalidLoopPeriod,

    #[error("Invalid keyframes: {reason}")]
    InvalidKeyframes { reason: String },
}

/// Frame buffer and output errors
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Failed to encode frame {frame_index} to {}: {reason}", path.display())]
    EncodeFailed {
        frame_index: u64,
        path: PathBuf,
        reason: String,
    },

    #[error("Frame {frame_index} has nothing composited")]
    EmptyFrame { frame_index: u64 },

    #[error("Repeat count must be at least 1, got {count}")]
    InvalidRepeat { count: u32 },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Non-fatal conditions reported alongside a successful save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameWarning {
    /// The saved frame had nothing composited onto the background
    EmptyFrame { frame_index: u64 },
}

impl std::fmt::Display for FrameWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyFrame { frame_index } => {
                write!(f, "frame {} was saved with nothing composited", frame_index)
            }
        }
    }
}

/// Convenience type alias for Results using AnimatorError
pub type Result<T> = std::result::Result<T, AnimatorError>;

impl AnimatorError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Check if this error is recoverable (can be retried)
    pub fn is_recoverable(&self) -> bool {
        match self {
            // IO errors might be temporary
            Self::Io(_) => true,
            // A failed save leaves the canvas and counter untouched
            Self::Frame(FrameError::EncodeFailed { .. }) => true,
            Self::Asset(AssetError::LoadFailed { .. }) => true,
            // Scripting mistakes are permanent
            _ => false,
        }
    }

    /// Frame index a failed save was targeting, if any
    pub fn frame_index(&self) -> Option<u64> {
        match self {
            Self::Frame(FrameError::EncodeFailed { frame_index, .. })
            | Self::Frame(FrameError::EmptyFrame { frame_index }) => Some(*frame_index),
            _ => None,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Asset(AssetError::UnknownEvent { element, event }) => {
                format!(
                    "'{}' has no event called '{}'. Register it with register_event before drawing it.",
                    element, event
                )
            }
            Self::Asset(AssetError::LoadFailed { path }) => {
                format!("Could not load sprites from '{}'. Please check the directory exists and contains images.", path)
            }
            Self::Frame(FrameError::EncodeFailed { frame_index, path, .. }) => {
                format!(
                    "Could not write frame {} to '{}'. The frame was kept and can be saved again.",
                    frame_index,
                    path.display()
                )
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}
