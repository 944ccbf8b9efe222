//! Tracking allocator configuration

/// Configuration for [`TrackingAllocator`](super::TrackingAllocator)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingConfig {
    /// Ledger slots reserved up front
    pub initial_capacity: usize,

    /// Upper bound on simultaneously tracked blocks; `None` grows until
    /// bookkeeping storage runs out
    pub max_blocks: Option<usize>,

    /// Fill pattern byte for newly allocated memory (for debugging)
    pub alloc_pattern: Option<u8>,
    /// Fill pattern byte for memory returned upstream (for debugging)
    pub dealloc_pattern: Option<u8>,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 0,
            max_blocks: None,
            alloc_pattern: if cfg!(debug_assertions) {
                Some(0xBB)
            } else {
                None
            },
            dealloc_pattern: if cfg!(debug_assertions) {
                Some(0xDD)
            } else {
                None
            },
        }
    }
}

impl TrackingConfig {
    /// Production configuration - no fill patterns
    #[must_use]
    pub fn production() -> Self {
        Self {
            initial_capacity: 64,
            max_blocks: None,
            alloc_pattern: None,
            dealloc_pattern: None,
        }
    }

    /// Debug configuration - poisons memory on both edges of a block's life
    #[must_use]
    pub fn debug() -> Self {
        Self {
            initial_capacity: 0,
            max_blocks: None,
            alloc_pattern: Some(0xBB),
            dealloc_pattern: Some(0xDD),
        }
    }

    /// Ledger that refuses to track more than `max_blocks` blocks at once
    #[must_use]
    pub fn bounded(max_blocks: usize) -> Self {
        Self {
            initial_capacity: max_blocks,
            max_blocks: Some(max_blocks),
            ..Self::production()
        }
    }

    /// Whether another block can be recorded while `tracked` are live
    #[inline]
    pub(crate) fn admits(&self, tracked: usize) -> bool {
        self.max_blocks.is_none_or(|max| tracked < max)
    }
}
