//! Tracking allocator implementation
//!
//! Provides a memory resource that records every block it hands out in a
//! ledger and returns whatever is still outstanding to its upstream when it
//! is dropped.
//!
//! # Safety
//!
//! This module wraps an upstream allocator and tracks all allocation operations:
//! - All unsafe operations are forwarded to the upstream with proper contracts
//! - The ledger is the single source of truth for what upstream still owes
//! - Blocks are released upstream with the layout recorded at allocation time
//!
//! ## Invariants
//!
//! - A block is in the ledger iff it was returned by `allocate` and has not
//!   yet been matched by a `deallocate` or by teardown
//! - Every block the tracker obtained from upstream is released upstream
//!   exactly once
//! - Failed allocations leave the ledger untouched
//! - Deallocating an address the ledger does not know is a silent no-op.
//!   This tolerates foreign pointers but also masks double frees; the event
//!   is counted in [`LedgerStats::untracked_deallocations`].

use core::alloc::Layout;
use core::cell::RefCell;
use core::fmt;
use core::ptr::NonNull;

#[cfg(feature = "logging")]
use tracing::{debug, trace, warn};

use super::{AllocError, AllocResult, Allocator, SystemAllocator, TrackingConfig};

/// One live block handed out by a [`TrackingAllocator`]
///
/// Records are matched by address. Zero-size blocks are dangling pointers
/// and the upstream may hand out the same address for each of them, so
/// several records can share one address. Such records are interchangeable:
/// a deallocation removes the oldest one, and every record is still released
/// upstream exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    address: NonNull<u8>,
    layout: Layout,
}

impl Block {
    /// Start of the block; identity of the record
    #[inline]
    pub fn address(&self) -> NonNull<u8> {
        self.address
    }

    /// Size in bytes, as requested at allocation time
    #[inline]
    pub fn size(&self) -> usize {
        self.layout.size()
    }

    /// Alignment requested at allocation time
    #[inline]
    pub fn align(&self) -> usize {
        self.layout.align()
    }
}

/// Ledger counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerStats {
    /// Successful `allocate` calls
    pub allocations: usize,
    /// `deallocate` calls that matched a ledger record
    pub deallocations: usize,
    /// `deallocate` calls for addresses the ledger did not know
    pub untracked_deallocations: usize,
    /// `allocate` calls that failed upstream or in the ledger
    pub failed_allocations: usize,
    /// Blocks currently recorded
    pub live_blocks: usize,
    /// Bytes currently recorded
    pub live_bytes: usize,
    /// Highest value `live_bytes` has reached
    pub peak_bytes: usize,
}

impl LedgerStats {
    fn record_allocation(&mut self, size: usize) {
        self.allocations += 1;
        self.live_blocks += 1;
        self.live_bytes += size;
        self.peak_bytes = self.peak_bytes.max(self.live_bytes);
    }

    fn record_deallocation(&mut self, size: usize) {
        self.deallocations += 1;
        self.live_blocks -= 1;
        self.live_bytes -= size;
    }
}

#[derive(Debug)]
struct Ledger {
    blocks: Vec<Block>,
    stats: LedgerStats,
}

impl Ledger {
    fn position(&self, address: NonNull<u8>) -> Option<usize> {
        self.blocks.iter().position(|block| block.address == address)
    }
}

/// A memory resource that keeps a ledger of live blocks
///
/// Every block obtained from the upstream allocator is recorded until it is
/// deallocated. Dropping the tracker releases whatever is still recorded, so
/// nothing it handed out can leak at the upstream level.
///
/// Equality is identity: a tracker equals only itself.
///
/// # Thread Safety
/// Not thread-safe. The ledger lives in a `RefCell`, which makes the tracker
/// `!Sync`; share it between threads only behind external synchronisation.
pub struct TrackingAllocator<'up> {
    upstream: &'up dyn Allocator,
    ledger: RefCell<Ledger>,
    config: TrackingConfig,
}

impl TrackingAllocator<'static> {
    /// Creates a tracker over the system allocator
    pub fn new() -> Self {
        Self::with_upstream(&SystemAllocator)
    }
}

impl Default for TrackingAllocator<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'up> TrackingAllocator<'up> {
    /// Creates a tracker over `upstream` with the default configuration
    pub fn with_upstream(upstream: &'up dyn Allocator) -> Self {
        Self::with_config(upstream, TrackingConfig::default())
    }

    /// Creates a tracker over `upstream` with a custom configuration
    pub fn with_config(upstream: &'up dyn Allocator, config: TrackingConfig) -> Self {
        Self {
            upstream,
            ledger: RefCell::new(Ledger {
                blocks: Vec::with_capacity(config.initial_capacity),
                stats: LedgerStats::default(),
            }),
            config,
        }
    }

    /// The allocator blocks are ultimately obtained from
    pub fn upstream(&self) -> &'up dyn Allocator {
        self.upstream
    }

    /// Active configuration
    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    /// Number of blocks currently recorded
    pub fn live_blocks(&self) -> usize {
        self.ledger.borrow().blocks.len()
    }

    /// Total bytes currently recorded
    pub fn live_bytes(&self) -> usize {
        self.ledger.borrow().stats.live_bytes
    }

    /// Whether `ptr` is the address of a recorded block
    ///
    /// For zero-size blocks this answers for the address, not for one
    /// particular allocation: it stays `true` while any record with that
    /// address remains.
    pub fn is_tracking(&self, ptr: NonNull<u8>) -> bool {
        self.ledger.borrow().position(ptr).is_some()
    }

    /// Snapshot of the ledger in allocation order
    pub fn blocks(&self) -> Vec<Block> {
        self.ledger.borrow().blocks.clone()
    }

    /// Snapshot of the ledger counters
    pub fn stats(&self) -> LedgerStats {
        self.ledger.borrow().stats
    }

    /// Whether any block is still outstanding
    pub fn has_leaks(&self) -> bool {
        self.live_blocks() > 0
    }

    fn record(&self, address: NonNull<u8>, layout: Layout) -> AllocResult<()> {
        let mut ledger = self.ledger.borrow_mut();
        let tracked = ledger.blocks.len();

        if !self.config.admits(tracked) || ledger.blocks.try_reserve(1).is_err() {
            ledger.stats.failed_allocations += 1;
            return Err(AllocError::ledger_exhausted(layout.size(), tracked));
        }

        ledger.blocks.push(Block { address, layout });
        ledger.stats.record_allocation(layout.size());
        Ok(())
    }

    /// Hands a block back upstream.
    ///
    /// # Safety
    /// `block` must have been obtained from `self.upstream` and already be
    /// removed from the ledger.
    unsafe fn release(&self, block: Block) {
        if let Some(pattern) = self.config.dealloc_pattern {
            // SAFETY: the block is live and `size` bytes long
            unsafe { block.address.as_ptr().write_bytes(pattern, block.size()) };
        }

        // SAFETY: recorded layout is the one used for the upstream allocation
        unsafe { self.upstream.deallocate(block.address, block.layout) };
    }
}

// SAFETY: blocks come from the upstream allocator and go back to it with the
// layout recorded when they were obtained.
unsafe impl Allocator for TrackingAllocator<'_> {
    unsafe fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        // SAFETY: caller's contract is forwarded to the upstream allocator
        let block = match unsafe { self.upstream.allocate(layout) } {
            Ok(block) => block,
            Err(err) => {
                self.ledger.borrow_mut().stats.failed_allocations += 1;
                return Err(err);
            }
        };
        let address = block.cast::<u8>();

        if let Err(err) = self.record(address, layout) {
            // SAFETY: obtained from upstream with `layout` just above and
            // never handed out
            unsafe { self.upstream.deallocate(address, layout) };
            return Err(err);
        }

        if let Some(pattern) = self.config.alloc_pattern {
            // SAFETY: fresh block, valid for `layout.size()` bytes
            unsafe { address.as_ptr().write_bytes(pattern, layout.size()) };
        }

        #[cfg(feature = "logging")]
        trace!(
            address = ?address,
            size = layout.size(),
            align = layout.align(),
            "block allocated"
        );

        Ok(block)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        let removed = {
            let mut ledger = self.ledger.borrow_mut();
            if let Some(index) = ledger.position(ptr) {
                let block = ledger.blocks.remove(index);
                ledger.stats.record_deallocation(block.size());
                Some(block)
            } else {
                ledger.stats.untracked_deallocations += 1;
                None
            }
        };

        let Some(block) = removed else {
            #[cfg(feature = "logging")]
            debug!(
                address = ?ptr,
                size = layout.size(),
                "ignoring deallocation of untracked block"
            );
            return;
        };

        #[cfg(feature = "logging")]
        {
            if block.size() != layout.size() {
                warn!(
                    address = ?ptr,
                    recorded = block.size(),
                    given = layout.size(),
                    "deallocation size differs from recorded size"
                );
            }
            trace!(address = ?ptr, size = block.size(), "block deallocated");
        }
        #[cfg(not(feature = "logging"))]
        let _ = layout;

        // SAFETY: removed from the ledger above, so released exactly once
        unsafe { self.release(block) };
    }
}

impl PartialEq for TrackingAllocator<'_> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self, other)
    }
}

impl Eq for TrackingAllocator<'_> {}

impl fmt::Debug for TrackingAllocator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackingAllocator")
            .field("stats", &self.stats())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Drop for TrackingAllocator<'_> {
    fn drop(&mut self) {
        let blocks = core::mem::take(&mut self.ledger.get_mut().blocks);

        #[cfg(feature = "logging")]
        {
            if blocks.is_empty() {
                debug!("tracking allocator dropped with an empty ledger");
            } else {
                warn!(
                    blocks = blocks.len(),
                    bytes = blocks.iter().map(Block::size).sum::<usize>(),
                    "reclaiming blocks that were never deallocated"
                );
            }
        }

        for block in blocks {
            // SAFETY: each record is released once and the ledger is gone
            unsafe { self.release(block) };
        }
    }
}
