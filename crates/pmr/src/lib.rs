//! # nebula-pmr
//!
//! Tracking memory resource and an allocator-aware FIFO queue.
//!
//! This crate provides:
//! - [`allocator::Allocator`], an object-safe memory resource interface
//! - [`allocator::TrackingAllocator`], a resource that keeps a ledger of every
//!   live block and returns all of them upstream when it is dropped
//! - [`queue::Queue`], a singly linked FIFO whose nodes are allocated from
//!   any `Allocator`
//!
//! ## Quick Start
//!
//! ```rust
//! use nebula_pmr::prelude::*;
//!
//! let tracker = TrackingAllocator::new();
//! let mut queue = Queue::new_in(&tracker);
//!
//! for i in 1..=5 {
//!     queue.push(i)?;
//! }
//! assert_eq!(tracker.live_blocks(), 5);
//!
//! while queue.pop().is_some() {}
//! assert!(queue.is_empty());
//! assert_eq!(tracker.live_blocks(), 0);
//! # Ok::<(), MemoryError>(())
//! ```
//!
//! ## Features
//!
//! - `logging` (default): ledger events via `tracing`

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(unsafe_code)]
#![warn(rust_2018_idioms)]
// Error docs live on the error enum itself
#![allow(clippy::missing_errors_doc)]

// Error types
pub mod error;

// Core modules
pub mod allocator;
pub mod queue;

// Re-export core types for convenience
pub use crate::error::{MemoryError, MemoryResult, PushError, Result};

// Public API exports
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::allocator::{
        AllocError, AllocResult, Allocator, AllocatorExt, SystemAllocator, TrackingAllocator,
        TrackingConfig,
    };
    pub use crate::error::{MemoryError, MemoryResult, PushError};
    pub use crate::queue::Queue;
}
