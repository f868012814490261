/// Convenience result type used across shotreel.
pub type ShotreelResult<T> = Result<T, ShotreelError>;

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum ShotreelError {
    /// An asset could not be fetched or decoded. Carries the original reference.
    #[error("media unavailable: '{reference}': {source:#}")]
    MediaUnavailable {
        /// Reference (URL, relative path or inline key) that failed to load.
        reference: String,
        /// Underlying fetch/decode failure.
        source: anyhow::Error,
    },

    /// No scenes or shots were left to build a timeline from.
    #[error("empty timeline: no scenes or shots to render")]
    EmptyTimeline,

    /// Zoom or fade envelope out of range (only surfaced in strict mode; otherwise clamped).
    #[error("invalid zoom envelope: {0}")]
    InvalidZoomEnvelope(String),

    /// The current environment lacks a capability the operation needs.
    #[error("environment capability missing for '{method}': {reason}")]
    EnvironmentCapabilityMissing {
        /// Operation that was refused.
        method: String,
        /// Human-readable reason.
        reason: String,
    },

    /// The session has no resolved timeline yet.
    #[error("not ready: {0}")]
    NotReady(String),

    /// The session was cancelled before completing.
    #[error("cancelled")]
    Cancelled,

    /// Invalid user-provided or scene data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors raised while handing frames/audio to an encoder.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShotreelError {
    /// Build a [`ShotreelError::MediaUnavailable`] value.
    pub fn media_unavailable(reference: impl Into<String>, source: anyhow::Error) -> Self {
        Self::MediaUnavailable {
            reference: reference.into(),
            source,
        }
    }

    /// Build a [`ShotreelError::InvalidZoomEnvelope`] value.
    pub fn invalid_zoom_envelope(msg: impl Into<String>) -> Self {
        Self::InvalidZoomEnvelope(msg.into())
    }

    /// Build a [`ShotreelError::EnvironmentCapabilityMissing`] value.
    pub fn capability_missing(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvironmentCapabilityMissing {
            method: method.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`ShotreelError::NotReady`] value.
    pub fn not_ready(msg: impl Into<String>) -> Self {
        Self::NotReady(msg.into())
    }

    /// Build a [`ShotreelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ShotreelError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`ShotreelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
