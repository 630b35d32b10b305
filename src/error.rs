//! Error types
//!
//! Only `InitError` is fatal. Everything else is caught where it happens,
//! logged, and the feature it belongs to is disabled or substituted.

use thiserror::Error;

/// Fatal start-up failure. The game refuses to run degraded.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InitError {
    /// Required render/UI targets are absent
    #[error("missing required UI elements: {}", .0.join(", "))]
    MissingTargets(Vec<String>),

    /// Tuning failed validation
    #[error("invalid tuning: {0}")]
    Config(#[from] ConfigError),
}

/// Invalid tuning data
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// JSON could not be parsed
    #[error("malformed tuning JSON: {0}")]
    Parse(String),

    /// A value is out of its allowed range
    #[error("{field} must be {requirement}, got {value}")]
    OutOfRange {
        field: &'static str,
        requirement: &'static str,
        value: f32,
    },
}

/// Key-value store failure (never fatal)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// No backing store on this platform/context
    #[error("storage unavailable")]
    Unavailable,

    /// The store rejected a write (quota, private mode)
    #[error("write rejected for key {key}")]
    WriteRejected { key: String },
}

/// Presentation-side failure (never fatal)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PresentError {
    /// An optional UI element is missing
    #[error("UI element not found: {0}")]
    MissingElement(String),

    /// An external asset (e.g. a video) could not be loaded
    #[error("asset unavailable: {0}")]
    AssetUnavailable(String),
}

/// Audio backend failure (never fatal)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// No audio backend on this platform
    #[error("audio not supported")]
    Unsupported,

    /// The backend failed while scheduling a tone
    #[error("audio backend error: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_targets_message_lists_ids() {
        let err = InitError::MissingTargets(vec!["score".into(), "hearts".into()]);
        assert_eq!(err.to_string(), "missing required UI elements: score, hearts");
    }

    #[test]
    fn test_config_error_converts_into_init_error() {
        let err: InitError = ConfigError::OutOfRange {
            field: "spawn.min_interval_frames",
            requirement: "positive",
            value: 0.0,
        }
        .into();
        assert!(matches!(err, InitError::Config(_)));
        assert!(err.to_string().contains("spawn.min_interval_frames"));
    }
}
