use thiserror::Error;

/// A JSON value did not match the shape of the variant its `_type` claims.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot decode `{tag}` block: field `{field}` {reason}")]
pub struct DecodeError {
    /// `_type` of the offending value (`?` when the tag itself was unreadable).
    pub tag: String,
    /// Name of the violated field.
    pub field: String,
    /// What was wrong with it.
    pub reason: String,
}

impl DecodeError {
    /// Create a decode error for `field` of a value tagged `tag`.
    pub fn new(
        tag: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            tag: tag.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(tag: &str, field: &str) -> Self {
        Self::new(tag, field, "is missing")
    }

    pub(crate) fn expected(tag: &str, field: &str, shape: &str) -> Self {
        Self::new(tag, field, format!("must be {shape}"))
    }
}

/// A block variant has no field mapping for the tag it claims.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no field mapping for content tagged `{tag}`")]
pub struct UnsupportedContentError {
    /// The tag that cannot be encoded.
    pub tag: String,
}

/// Errors raised while encoding or decoding block sequences.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A value did not match its claimed variant.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// A block could not be encoded.
    #[error(transparent)]
    Unsupported(#[from] UnsupportedContentError),
    /// The input was not valid JSON, or serialization itself failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
