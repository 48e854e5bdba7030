//! Fixed-size block heap used for clip-rect nodes.
//!
//! The heap owns a contiguous arena of `block_count` slots plus a usage
//! bitmap. When the arena is exhausted, blocks come from the general
//! allocator instead and are released individually, so the arena acts as a
//! cache rather than a hard capacity limit.

use std::cell::UnsafeCell;
use std::fmt;
use std::mem::{MaybeUninit, size_of};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use log::{debug, warn};
use parking_lot::Mutex;

use crate::error::{RegionError, Result};

/// Shared handle to a fixed-block arena. Cloning the handle shares the arena.
pub struct BlockHeap<T: Copy> {
    inner: Arc<HeapInner<T>>,
}

struct HeapInner<T> {
    slots: Box<[UnsafeCell<MaybeUninit<T>>]>,
    state: Mutex<HeapState>,
    overflow_limit: Option<usize>,
}

// Slots are only reachable through the `Block` that claimed them in the
// usage bitmap, and the bitmap is only mutated under `state`.
unsafe impl<T: Copy + Send + Sync> Sync for HeapInner<T> {}

struct HeapState {
    usage: Vec<u8>,
    used: usize,
    hint: usize,
    extra_alloc_count: usize,
    overflow_live: usize,
}

impl HeapState {
    /// Find and mark the first free slot, starting at the scan hint.
    fn claim(&mut self) -> Option<usize> {
        let bytes = self.usage.len();
        for step in 0..bytes {
            let byte_idx = (self.hint + step) % bytes;
            let byte = self.usage[byte_idx];
            if byte == u8::MAX {
                continue;
            }
            let bit = (!byte).trailing_zeros() as usize;
            self.usage[byte_idx] |= 1 << bit;
            self.used += 1;
            self.hint = byte_idx;
            return Some(byte_idx * 8 + bit);
        }
        None
    }

    fn release(&mut self, index: usize) {
        let (byte_idx, bit) = (index / 8, index % 8);
        debug_assert!(self.usage[byte_idx] & (1 << bit) != 0, "double free of arena block {index}");
        self.usage[byte_idx] &= !(1 << bit);
        self.used -= 1;
        if byte_idx < self.hint {
            self.hint = byte_idx;
        }
    }
}

impl<T: Copy> BlockHeap<T> {
    /// Create a heap with `block_count` pre-allocated blocks and no overflow cap.
    pub fn new(block_count: usize) -> Result<Self> {
        Self::with_overflow_limit(block_count, None)
    }

    /// Create a heap whose overflow allocations are capped at `overflow_limit`
    /// live blocks. `None` leaves overflow bounded only by the general allocator.
    pub fn with_overflow_limit(block_count: usize, overflow_limit: Option<usize>) -> Result<Self> {
        let mut slots: Vec<UnsafeCell<MaybeUninit<T>>> = Vec::new();
        slots.try_reserve_exact(block_count)?;
        slots.resize_with(block_count, || UnsafeCell::new(MaybeUninit::uninit()));

        let bitmap_size = block_count.div_ceil(8);
        let mut usage: Vec<u8> = Vec::new();
        usage.try_reserve_exact(bitmap_size)?;
        usage.resize(bitmap_size, 0);
        // Padding bits past the last block are permanently marked used.
        for index in block_count..bitmap_size * 8 {
            usage[index / 8] |= 1 << (index % 8);
        }

        debug!(
            "block heap created: {} blocks of {} bytes, bitmap {} bytes, overflow limit {:?}",
            block_count,
            size_of::<T>(),
            bitmap_size,
            overflow_limit
        );

        Ok(Self {
            inner: Arc::new(HeapInner {
                slots: slots.into_boxed_slice(),
                state: Mutex::new(HeapState {
                    usage,
                    used: 0,
                    hint: 0,
                    extra_alloc_count: 0,
                    overflow_live: 0,
                }),
                overflow_limit,
            }),
        })
    }

    /// Allocate a block holding `value`.
    ///
    /// Takes an arena slot when one is free, otherwise falls back to the
    /// general allocator. Fails only if that fallback fails or the overflow
    /// limit is reached.
    pub fn alloc(&self, value: T) -> Result<Block<T>> {
        let claimed = {
            let mut state = self.inner.state.lock();
            match state.claim() {
                Some(index) => Some(index),
                None => {
                    if let Some(limit) = self.inner.overflow_limit {
                        if state.overflow_live >= limit {
                            warn!("block heap overflow limit of {} blocks reached", limit);
                            return Err(RegionError::OverflowLimit { limit });
                        }
                    }
                    state.overflow_live += 1;
                    state.extra_alloc_count += 1;
                    None
                }
            }
        };

        let slot = match claimed {
            Some(index) => {
                // SAFETY: the bit for `index` was claimed under the lock above,
                // so no other block can observe this slot until it is released.
                unsafe { (*self.inner.slots[index].get()).write(value) };
                Slot::Arena(index)
            }
            None => {
                let mut storage: Vec<T> = Vec::new();
                if storage.try_reserve_exact(1).is_err() {
                    let mut state = self.inner.state.lock();
                    state.overflow_live -= 1;
                    state.extra_alloc_count -= 1;
                    warn!("general allocator failed for overflow block");
                    return Err(RegionError::OutOfMemory);
                }
                storage.push(value);
                debug!(
                    "block heap of {} blocks exhausted, using overflow block",
                    self.inner.slots.len()
                );
                Slot::Overflow(storage.into_boxed_slice())
            }
        };

        Ok(Block { heap: self.inner.clone(), slot })
    }

    /// Return a block to its heap. Equivalent to dropping it.
    pub fn free(&self, block: Block<T>) {
        if !Arc::ptr_eq(&self.inner, &block.heap) {
            warn!("block freed through a heap that did not allocate it");
        }
        drop(block);
    }

    /// Address-range test: true when `block` lives inside this heap's arena.
    pub fn contains(&self, block: &Block<T>) -> bool {
        let base = self.inner.slots.as_ptr() as usize;
        let end = base + self.inner.slots.len() * size_of::<T>();
        let addr = block.as_ptr() as usize;
        addr >= base && addr < end
    }

    /// Size in bytes of one block.
    pub fn block_size(&self) -> usize {
        size_of::<T>()
    }

    /// Number of pre-allocated arena blocks.
    pub fn block_count(&self) -> usize {
        self.inner.slots.len()
    }

    /// Size in bytes of the usage bitmap.
    pub fn usage_bitmap_size(&self) -> usize {
        self.inner.state.lock().usage.len()
    }

    /// Arena blocks currently handed out.
    pub fn used_blocks(&self) -> usize {
        self.inner.state.lock().used
    }

    /// Total fallback allocations made since the heap was created.
    pub fn extra_alloc_count(&self) -> usize {
        self.inner.state.lock().extra_alloc_count
    }

    /// Fallback blocks currently alive.
    pub fn overflow_blocks(&self) -> usize {
        self.inner.state.lock().overflow_live
    }

    pub fn overflow_limit(&self) -> Option<usize> {
        self.inner.overflow_limit
    }
}

impl<T: Copy> Clone for BlockHeap<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T: Copy> fmt::Debug for BlockHeap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("BlockHeap")
            .field("block_size", &size_of::<T>())
            .field("block_count", &self.inner.slots.len())
            .field("used", &state.used)
            .field("extra_alloc_count", &state.extra_alloc_count)
            .field("overflow_live", &state.overflow_live)
            .finish()
    }
}

enum Slot<T> {
    Arena(usize),
    Overflow(Box<[T]>),
}

/// A single allocated block. Dereferences to the stored value and returns
/// itself to the heap when dropped.
pub struct Block<T: Copy> {
    heap: Arc<HeapInner<T>>,
    slot: Slot<T>,
}

impl<T: Copy> Block<T> {
    /// True when the block came from the general allocator.
    pub fn is_overflow(&self) -> bool {
        matches!(self.slot, Slot::Overflow(_))
    }

    pub fn as_ptr(&self) -> *const T {
        &**self as *const T
    }
}

impl<T: Copy> Deref for Block<T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.slot {
            // SAFETY: the slot was initialized in `alloc` and is owned by this block.
            Slot::Arena(index) => unsafe { (*self.heap.slots[*index].get()).assume_init_ref() },
            Slot::Overflow(storage) => &storage[0],
        }
    }
}

impl<T: Copy> DerefMut for Block<T> {
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.slot {
            // SAFETY: as in `deref`; `&mut self` makes the access exclusive.
            Slot::Arena(index) => unsafe { (*self.heap.slots[*index].get()).assume_init_mut() },
            Slot::Overflow(storage) => &mut storage[0],
        }
    }
}

impl<T: Copy> AsRef<T> for Block<T> {
    fn as_ref(&self) -> &T {
        self
    }
}

impl<T: Copy> Drop for Block<T> {
    fn drop(&mut self) {
        let mut state = self.heap.state.lock();
        match self.slot {
            Slot::Arena(index) => state.release(index),
            Slot::Overflow(_) => state.overflow_live -= 1,
        }
    }
}

impl<T: Copy + fmt::Debug> fmt::Debug for Block<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(if self.is_overflow() { "Block::Overflow" } else { "Block::Arena" })
            .field(&**self)
            .finish()
    }
}
