//! Memory resources for allocator-aware containers
//!
//! This module provides the allocator interface, the system allocator that
//! backs it by default, and the ledger-keeping tracking resource.

mod config;
mod system;
mod tracking;
mod traits;

pub use crate::error::{AllocError, AllocResult};
pub use config::TrackingConfig;
pub use system::SystemAllocator;
pub use tracking::{Block, LedgerStats, TrackingAllocator};
pub use traits::{Allocator, AllocatorExt, layout_for};
