//! Bump allocator backing the syntax tree
//!
//! The parser backtracks freely and never gives memory back while it does so.
//! An [`Arena`] makes that cheap: every allocation is a pointer bump inside the
//! active block, nothing is ever freed on its own, and the whole chain of
//! blocks is released in one pass when the arena is dropped.
//!
//! # Block chaining
//!
//! When a request (after alignment padding) does not fit in the active block,
//! the exhausted block is pushed onto the overflow chain and a fresh block of
//! `max(size, MIN_BLOCK_SIZE)` bytes takes its place. Allocations never
//! straddle two blocks.
//!
//! # Destructors
//!
//! Values placed in the arena are never dropped. The typed helpers are meant
//! for plain data (references, integers, `Copy` types); they debug-assert that
//! the type has no drop glue.

use std::alloc::{self, Layout};
use std::cell::{Cell, RefCell};
use std::mem;
use std::ptr::{self, NonNull};
use std::slice;
use std::str;

/// Smallest block chained when the active block runs out.
pub const MIN_BLOCK_SIZE: usize = 1 << 20;

/// Upper bound of the default alignment policy; also the alignment of every block.
pub const MAX_DEFAULT_ALIGN: usize = 16;

/// Alignment used when the caller does not ask for one: the object's size
/// capped at 16 bytes, rounded down to a power of two.
pub fn default_align(size: usize) -> usize {
    let capped = size.min(MAX_DEFAULT_ALIGN);
    if capped == 0 {
        1
    } else {
        1 << (usize::BITS - 1 - capped.leading_zeros())
    }
}

/// Allocation counters of an arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArenaStats {
    /// Bytes handed out so far, alignment padding included. Never decreases.
    pub allocated_bytes: usize,
    /// Total capacity of every block owned by the arena.
    pub reserved_bytes: usize,
    /// Number of blocks in the chain, the active one included.
    pub blocks: usize,
}

struct Block {
    base: NonNull<u8>,
    layout: Layout,
    overflow: Option<Box<Block>>,
}

impl Block {
    fn new(capacity: usize, align: usize) -> Block {
        let layout = match Layout::from_size_align(capacity, align) {
            Ok(layout) => layout,
            Err(_) => capacity_overflow(),
        };
        // SAFETY: every caller passes a non-zero capacity.
        let raw = unsafe { alloc::alloc(layout) };
        let Some(base) = NonNull::new(raw) else {
            alloc::handle_alloc_error(layout)
        };
        Block {
            base,
            layout,
            overflow: None,
        }
    }

    fn capacity(&self) -> usize {
        self.layout.size()
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        // SAFETY: `base` came from `alloc::alloc` with exactly this layout.
        unsafe { alloc::dealloc(self.base.as_ptr(), self.layout) };

        // Unlink the chain iteratively so long chains don't recurse.
        let mut next = self.overflow.take();
        while let Some(mut block) = next {
            next = block.overflow.take();
        }
    }
}

fn capacity_overflow() -> ! {
    panic!("arena allocation size overflows isize")
}

/// Bump allocator with an overflow chain of exhausted blocks
pub struct Arena {
    active: RefCell<Block>,
    /// Offset of the next free byte in the active block.
    cursor: Cell<usize>,
    stats: Cell<ArenaStats>,
}

impl Arena {
    /// Creates an arena whose first block holds [`MIN_BLOCK_SIZE`] bytes.
    pub fn new() -> Self {
        Arena::with_capacity(MIN_BLOCK_SIZE)
    }

    /// Creates an arena whose first block holds `capacity` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "arena capacity must be non-zero");
        Arena {
            active: RefCell::new(Block::new(capacity, MAX_DEFAULT_ALIGN)),
            cursor: Cell::new(0),
            stats: Cell::new(ArenaStats {
                allocated_bytes: 0,
                reserved_bytes: capacity,
                blocks: 1,
            }),
        }
    }

    /// Returns `size` bytes aligned to `align`. The contents are unspecified.
    ///
    /// Never fails: exhaustion of the underlying allocator aborts the process.
    ///
    /// # Panics
    ///
    /// Panics if `align` is not a power of two.
    pub fn allocate(&self, size: usize, align: usize) -> NonNull<u8> {
        assert!(align.is_power_of_two(), "alignment must be a power of two");
        if let Some(ptr) = self.bump(size, align) {
            return ptr;
        }
        self.chain_block(size, align);
        match self.bump(size, align) {
            Some(ptr) => ptr,
            None => unreachable!("fresh arena block cannot hold {size} bytes"),
        }
    }

    /// [`Arena::allocate`] with the [`default_align`] policy.
    pub fn allocate_default(&self, size: usize) -> NonNull<u8> {
        self.allocate(size, default_align(size))
    }

    /// Allocates `new_size` fresh bytes and copies the old contents forward.
    ///
    /// The old memory is not reclaimed; it simply becomes unreachable.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads of `old_size` bytes, and the caller must
    /// not use `ptr` afterward.
    pub unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_size: usize,
        new_size: usize,
        align: usize,
    ) -> NonNull<u8> {
        let fresh = self.allocate(new_size, align);
        // SAFETY: the fresh allocation cannot overlap memory handed out before.
        unsafe {
            ptr::copy_nonoverlapping(ptr.as_ptr(), fresh.as_ptr(), old_size.min(new_size));
        }
        fresh
    }

    /// Moves `value` into the arena.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc<T>(&self, value: T) -> &mut T {
        debug_assert!(!mem::needs_drop::<T>(), "arena values are never dropped");
        let ptr = self
            .allocate(mem::size_of::<T>(), mem::align_of::<T>())
            .cast::<T>();
        // SAFETY: `ptr` is aligned, sized for `T` and owned by nobody else.
        unsafe {
            ptr.as_ptr().write(value);
            &mut *ptr.as_ptr()
        }
    }

    /// Allocates a slice of `len` copies of `value`.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_slice_fill_copy<T: Copy>(&self, len: usize, value: T) -> &mut [T] {
        let layout = Layout::array::<T>(len).unwrap_or_else(|_| capacity_overflow());
        let ptr = self.allocate(layout.size(), layout.align()).cast::<T>();
        // SAFETY: the allocation holds `len` properly aligned elements.
        unsafe {
            for i in 0..len {
                ptr.as_ptr().add(i).write(value);
            }
            slice::from_raw_parts_mut(ptr.as_ptr(), len)
        }
    }

    /// Copies `old` into a fresh slice of `new_len` elements, padding the tail
    /// with `fill`. `old` stays where it is as arena garbage.
    ///
    /// # Panics
    ///
    /// Panics if `new_len` is shorter than `old`.
    #[allow(clippy::mut_from_ref)]
    pub fn grow_slice_copy<T: Copy>(&self, old: &[T], new_len: usize, fill: T) -> &mut [T] {
        assert!(new_len >= old.len(), "arena slices only grow");
        let layout = Layout::array::<T>(new_len).unwrap_or_else(|_| capacity_overflow());
        // SAFETY: `old` is a live slice of exactly `size_of_val(old)` bytes.
        let ptr = unsafe {
            self.reallocate(
                NonNull::from(old).cast::<u8>(),
                mem::size_of_val(old),
                layout.size(),
                layout.align(),
            )
        }
        .cast::<T>();
        // SAFETY: the first `old.len()` elements were copied, the rest are written here.
        unsafe {
            for i in old.len()..new_len {
                ptr.as_ptr().add(i).write(fill);
            }
            slice::from_raw_parts_mut(ptr.as_ptr(), new_len)
        }
    }

    /// Copies `s` into the arena.
    pub fn alloc_str(&self, s: &str) -> &str {
        let ptr = self.allocate(s.len(), 1);
        // SAFETY: the destination holds `s.len()` bytes and the bytes are valid UTF-8.
        unsafe {
            ptr::copy_nonoverlapping(s.as_ptr(), ptr.as_ptr(), s.len());
            str::from_utf8_unchecked(slice::from_raw_parts(ptr.as_ptr(), s.len()))
        }
    }

    pub fn stats(&self) -> ArenaStats {
        self.stats.get()
    }

    /// Bytes still free in the active block.
    pub fn remaining(&self) -> usize {
        self.active.borrow().capacity() - self.cursor.get()
    }

    /// Frees every block of the chain and returns how many were freed.
    pub fn release(self) -> usize {
        let freed = self.chain_len();
        let stats = self.stats.get();
        tracing::debug!(
            blocks = freed,
            allocated = stats.allocated_bytes,
            reserved = stats.reserved_bytes,
            "arena released"
        );
        freed
    }

    fn chain_len(&self) -> usize {
        let active = self.active.borrow();
        let mut count = 1;
        let mut next = active.overflow.as_deref();
        while let Some(block) = next {
            count += 1;
            next = block.overflow.as_deref();
        }
        count
    }

    fn bump(&self, size: usize, align: usize) -> Option<NonNull<u8>> {
        let block = self.active.borrow();
        let base = block.base.as_ptr() as usize;
        let cursor = base + self.cursor.get();
        let padding = cursor.wrapping_neg() & (align - 1);
        let start = cursor.checked_add(padding)?;
        let end = start.checked_add(size)?;
        if end > base + block.capacity() {
            return None;
        }

        self.cursor.set(end - base);
        let mut stats = self.stats.get();
        stats.allocated_bytes += padding + size;
        self.stats.set(stats);

        // SAFETY: `start - base` lies within the active block.
        Some(unsafe { NonNull::new_unchecked(block.base.as_ptr().add(start - base)) })
    }

    fn chain_block(&self, size: usize, align: usize) {
        let capacity = size.max(MIN_BLOCK_SIZE);
        let fresh = Block::new(capacity, align.max(MAX_DEFAULT_ALIGN));

        let mut active = self.active.borrow_mut();
        let exhausted = mem::replace(&mut *active, fresh);
        active.overflow = Some(Box::new(exhausted));
        self.cursor.set(0);

        let mut stats = self.stats.get();
        stats.reserved_bytes += capacity;
        stats.blocks += 1;
        self.stats.set(stats);
        tracing::trace!(capacity, blocks = stats.blocks, "arena block chained");
    }
}

impl Default for Arena {
    fn default() -> Self {
        Arena::new()
    }
}
