//! Standalone error types for nebula-pmr
//!
//! Uses thiserror for clean, idiomatic Rust error definitions.

use core::alloc::Layout;
use thiserror::Error;

#[cfg(feature = "logging")]
use tracing::{error, warn};

// ============================================================================
// Main Error Types
// ============================================================================

/// Memory resource errors
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Memory allocation failed: {size} bytes with {align} byte alignment")]
    AllocationFailed { size: usize, align: usize },

    #[error("Invalid memory layout: {reason}")]
    InvalidLayout { reason: String },

    #[error("Invalid alignment: {alignment}")]
    InvalidAlignment { alignment: usize },

    #[error("Ledger exhausted: cannot record block {size} bytes ({tracked} blocks tracked)")]
    LedgerExhausted { size: usize, tracked: usize },
}

impl MemoryError {
    /// Get error code for categorization
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::AllocationFailed { .. } => "MEM:ALLOC:FAILED",
            Self::InvalidLayout { .. } => "MEM:ALLOC:LAYOUT",
            Self::InvalidAlignment { .. } => "MEM:ALLOC:ALIGN",
            Self::LedgerExhausted { .. } => "MEM:LEDGER:EXHAUSTED",
        }
    }

    /// Whether the failure came from running out of memory, as opposed to a
    /// malformed request.
    #[must_use]
    pub fn is_out_of_memory(&self) -> bool {
        matches!(
            self,
            Self::AllocationFailed { .. } | Self::LedgerExhausted { .. }
        )
    }

    // ============================================================================
    // Convenience Constructors
    // ============================================================================

    /// Create allocation failed error
    pub fn allocation_failed(size: usize, align: usize) -> Self {
        #[cfg(feature = "logging")]
        error!(size, align, "memory allocation failed");

        Self::AllocationFailed { size, align }
    }

    /// Create allocation failed error from layout
    pub fn allocation_failed_with_layout(layout: Layout) -> Self {
        Self::allocation_failed(layout.size(), layout.align())
    }

    /// Create invalid layout error
    pub fn invalid_layout(reason: &str) -> Self {
        Self::InvalidLayout {
            reason: reason.to_string(),
        }
    }

    /// Create invalid alignment error
    pub fn invalid_alignment(alignment: usize) -> Self {
        Self::InvalidAlignment { alignment }
    }

    /// Create ledger exhausted error
    pub fn ledger_exhausted(size: usize, tracked: usize) -> Self {
        #[cfg(feature = "logging")]
        warn!(size, tracked, "ledger cannot record another block");

        Self::LedgerExhausted { size, tracked }
    }

    /// Check if this is an invalid alignment error
    #[must_use]
    pub fn is_invalid_alignment(&self) -> bool {
        matches!(self, Self::InvalidAlignment { .. })
    }
}

/// Failure of an in-place push
///
/// Either the node storage could not be obtained, or the element constructor
/// reported an error. In both cases the queue is left exactly as it was.
#[must_use = "errors should be handled"]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PushError<E> {
    #[error(transparent)]
    Alloc(#[from] MemoryError),

    #[error("element construction failed: {0}")]
    Construct(E),
}

impl<E> PushError<E> {
    /// The construction error, if that is what failed
    pub fn into_construct(self) -> Option<E> {
        match self {
            Self::Construct(err) => Some(err),
            Self::Alloc(_) => None,
        }
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Result type for memory operations
pub type MemoryResult<T> = core::result::Result<T, MemoryError>;

/// Generic result type alias
pub type Result<T> = MemoryResult<T>;

/// Allocator-facing aliases
pub type AllocError = MemoryError;
pub type AllocResult<T> = MemoryResult<T>;
