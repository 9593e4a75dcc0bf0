//! Error type shared by every sticker operation.

/// Everything that can go wrong while editing, processing or storing a sticker.
#[derive(Debug, thiserror::Error)]
pub enum StickerError {
    /// User input was rejected; nothing was changed.
    #[error("{0}")]
    Validation(String),
    #[error("sticker collection is full (max {max})")]
    Capacity { max: usize },
    #[error("failed to decode image: {0}")]
    Decode(String),
    #[error("failed to encode image: {0}")]
    Encode(String),
    #[error("image has zero width or height")]
    EmptyImage,
    #[error("no image loaded")]
    NoImage,
    #[error("sticker not found: {0}")]
    NotFound(u64),
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StickerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Whether this error leaves every piece of state untouched and can be
    /// shown to the user as a plain message.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Capacity { .. } | Self::NoImage | Self::NotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, StickerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_message() {
        let err = StickerError::Capacity { max: 40 };
        assert_eq!(err.to_string(), "sticker collection is full (max 40)");
        assert!(err.is_user_facing());
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err: StickerError = io.into();
        assert!(matches!(err, StickerError::Storage(_)));
        assert!(!err.is_user_facing());
    }
}
