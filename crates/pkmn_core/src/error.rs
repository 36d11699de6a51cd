use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoreErrorCode {
    BufferTooShort,
    MalformedSectionTable,
    ChecksumMismatch,
    IndeterminateSaveBlock,
    UnsupportedOperation,
    InvalidArgument,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("buffer too short: {len} bytes at {offset:#x} exceed buffer of {buffer_len:#x} bytes")]
    BufferTooShort {
        offset: usize,
        len: usize,
        buffer_len: usize,
    },

    #[error("malformed section table in block at {block_base:#07x}: {reason}")]
    MalformedSectionTable { block_base: usize, reason: String },

    #[error("checksum mismatch at {location:#x}: stored {stored:#06x}, computed {computed:#06x}")]
    ChecksumMismatch {
        location: usize,
        stored: u16,
        computed: u16,
    },

    #[error("neither save block is valid")]
    IndeterminateSaveBlock,

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl CoreError {
    pub fn code(&self) -> CoreErrorCode {
        match self {
            Self::BufferTooShort { .. } => CoreErrorCode::BufferTooShort,
            Self::MalformedSectionTable { .. } => CoreErrorCode::MalformedSectionTable,
            Self::ChecksumMismatch { .. } => CoreErrorCode::ChecksumMismatch,
            Self::IndeterminateSaveBlock => CoreErrorCode::IndeterminateSaveBlock,
            Self::UnsupportedOperation(_) => CoreErrorCode::UnsupportedOperation,
            Self::InvalidArgument(_) => CoreErrorCode::InvalidArgument,
        }
    }

    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedOperation(message.into())
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}
