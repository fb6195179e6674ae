use std::fmt;

/// Convenience result type used across tessera.
pub type TesseraResult<T> = Result<T, TesseraError>;

/// Why a surface request could not be satisfied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageCause {
    /// One of the requested dimensions is larger than the device texture limit.
    ExceedsMaxDimension,
    /// The allocation did not fit the memory budget (or the allocator refused it).
    OutOfMemory,
}

impl fmt::Display for StorageCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExceedsMaxDimension => f.write_str("exceeds max texture dimension"),
            Self::OutOfMemory => f.write_str("out of memory"),
        }
    }
}

/// Storage layout of a bitmap, used in mode-mismatch errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageMode {
    /// One pooled surface.
    Single,
    /// CPU-only pixel buffer larger than any device surface.
    Mega,
    /// Ordered list of equally sized pooled surfaces.
    Animated,
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => f.write_str("single-surface"),
            Self::Mega => f.write_str("mega-surface"),
            Self::Animated => f.write_str("animated"),
        }
    }
}

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum TesseraError {
    /// The bitmap was disposed (or its handle is stale).
    #[error("disposed error: {op} on a disposed bitmap")]
    Disposed { op: &'static str },

    /// The operation is not available for the bitmap's storage layout.
    #[error("unsupported error: {op} is not supported for {mode} bitmaps")]
    UnsupportedForMode { op: &'static str, mode: StorageMode },

    /// Pixel data had the wrong size, or an image could not be decoded or encoded.
    #[error("format error: {0}")]
    Format(String),

    /// A surface could not be allocated.
    #[error("storage error: {width}x{height} surface {cause}")]
    StorageExhausted {
        width: u32,
        height: u32,
        cause: StorageCause,
    },

    /// Invalid caller-provided arguments or bitmap geometry.
    #[error("precondition error: {0}")]
    Precondition(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TesseraError {
    pub fn disposed(op: &'static str) -> Self {
        Self::Disposed { op }
    }

    pub fn unsupported(op: &'static str, mode: StorageMode) -> Self {
        Self::UnsupportedForMode { op, mode }
    }

    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    pub fn storage(width: u32, height: u32, cause: StorageCause) -> Self {
        Self::StorageExhausted {
            width,
            height,
            cause,
        }
    }

    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// True when a surface request failed only because a dimension is over the device limit.
    pub fn is_oversized(&self) -> bool {
        matches!(
            self,
            Self::StorageExhausted {
                cause: StorageCause::ExceedsMaxDimension,
                ..
            }
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
