//! Per-evaluation bump arena.
//!
//! Every string, array, or message produced while evaluating an expression
//! is carved out of an [`Arena`] owned by the caller. Resetting the arena
//! releases everything at once; the borrow checker keeps stale [`Value`]s
//! from outliving it.
//!
//! Allocation is fallible by design: each `try_*` method reports exhaustion
//! as [`Error::OutOfMemory`] instead of aborting, and a deterministic
//! fault-injection hook lets tests exercise every out-of-memory path.
//!
//! [`Value`]: crate::values::Value
//! [`Error::OutOfMemory`]: crate::errors::Error::OutOfMemory

use core::alloc::Layout;
use core::cell::Cell;
use core::marker::PhantomData;
use core::ptr;

use bumpalo::Bump;

use crate::errors::Error;

/// Default size of the small-allocation slab, in bytes.
pub const DEFAULT_SLAB_SIZE: usize = 1024;

/// Snapshot of the arena's allocation counters.
///
/// Requests that fit the configured slab budget are counted as slab
/// allocations; larger requests spill to the overflow (heap) counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemStats {
    /// Configured slab size in bytes.
    pub slab_size: usize,
    /// Used slab bytes (8-byte-aligned accounting).
    pub slab_used: usize,
    /// Number of slab allocations.
    pub slab_allocs: usize,
    /// Number of overflow allocations.
    pub heap_allocs: usize,
    /// Overflow bytes.
    pub heap_bytes: usize,
}

/// Bump arena for per-evaluation data.
///
/// Wraps a [`bumpalo::Bump`] with slab/overflow accounting and a fallible
/// allocation surface. One arena serves one evaluation (or a run of
/// evaluations whose results are consumed together); [`Arena::reset`]
/// releases everything.
pub struct Arena {
    bump: Bump,
    slab_size: usize,
    slab_used: Cell<usize>,
    slab_allocs: Cell<usize>,
    heap_allocs: Cell<usize>,
    heap_bytes: Cell<usize>,
    // Fault injection: when nonzero, every k-th request fails.
    fail_every: Cell<usize>,
    alloc_seq: Cell<usize>,
}

impl Arena {
    /// Create an arena with the default slab size.
    pub fn new() -> Self {
        Self::with_slab_size(DEFAULT_SLAB_SIZE)
    }

    /// Create an arena with a custom slab size.
    pub fn with_slab_size(slab_size: usize) -> Self {
        Self {
            bump: Bump::with_capacity(slab_size),
            slab_size,
            slab_used: Cell::new(0),
            slab_allocs: Cell::new(0),
            heap_allocs: Cell::new(0),
            heap_bytes: Cell::new(0),
            fail_every: Cell::new(0),
            alloc_seq: Cell::new(0),
        }
    }

    /// Snapshot the allocation counters.
    pub fn stats(&self) -> MemStats {
        MemStats {
            slab_size: self.slab_size,
            slab_used: self.slab_used.get(),
            slab_allocs: self.slab_allocs.get(),
            heap_allocs: self.heap_allocs.get(),
            heap_bytes: self.heap_bytes.get(),
        }
    }

    /// Release every allocation and zero the counters.
    ///
    /// Taking `&mut self` means no value borrowed from this arena can still
    /// be alive. Idempotent.
    pub fn reset(&mut self) {
        self.bump.reset();
        self.slab_used.set(0);
        self.slab_allocs.set(0);
        self.heap_allocs.set(0);
        self.heap_bytes.set(0);
        self.alloc_seq.set(0);
    }

    /// Fault-injection hook: make every `k`-th allocation request fail.
    ///
    /// `0` disables injection. Intended for exercising out-of-memory paths
    /// in tests; a failing request surfaces as [`Error::OutOfMemory`]
    /// exactly as real exhaustion would.
    pub fn fail_every_nth(&self, k: usize) {
        self.fail_every.set(k);
        self.alloc_seq.set(0);
    }

    fn admit(&self, size: usize) -> bool {
        let seq = self.alloc_seq.get() + 1;
        self.alloc_seq.set(seq);
        let k = self.fail_every.get();
        if k != 0 && seq % k == 0 {
            return false;
        }
        let aligned = (size + 7) & !7;
        if self.slab_size - self.slab_used.get().min(self.slab_size) >= size {
            self.slab_used.set(self.slab_used.get() + aligned);
            self.slab_allocs.set(self.slab_allocs.get() + 1);
        } else {
            self.heap_allocs.set(self.heap_allocs.get() + 1);
            self.heap_bytes.set(self.heap_bytes.get() + size);
        }
        true
    }

    /// Allocate a zeroed byte region.
    pub fn try_alloc_bytes(&self, len: usize) -> Result<&mut [u8], Error<'_>> {
        if !self.admit(len) {
            return Err(Error::OutOfMemory);
        }
        let layout = Layout::from_size_align(len.max(1), 8).map_err(|_| Error::OutOfMemory)?;
        let p = self
            .bump
            .try_alloc_layout(layout)
            .map_err(|_| Error::OutOfMemory)?;
        unsafe {
            ptr::write_bytes(p.as_ptr(), 0, len);
            Ok(core::slice::from_raw_parts_mut(p.as_ptr(), len))
        }
    }

    /// Copy a string into the arena.
    pub fn try_copy_str<'a>(&'a self, s: &str) -> Result<&'a str, Error<'a>> {
        let dst = self.try_alloc_bytes(s.len())?;
        dst.copy_from_slice(s.as_bytes());
        // Byte-for-byte copy of valid UTF-8.
        unsafe { Ok(core::str::from_utf8_unchecked(dst)) }
    }

    fn try_alloc_raw<T: Copy>(&self, n: usize) -> Result<*mut T, Error<'_>> {
        let size = n * core::mem::size_of::<T>();
        if !self.admit(size) {
            return Err(Error::OutOfMemory);
        }
        let layout =
            Layout::from_size_align(size.max(1), core::mem::align_of::<T>().max(8))
                .map_err(|_| Error::OutOfMemory)?;
        let p = self
            .bump
            .try_alloc_layout(layout)
            .map_err(|_| Error::OutOfMemory)?;
        Ok(p.as_ptr() as *mut T)
    }

    /// Start an empty growable vector backed by this arena.
    pub fn vec<T: Copy>(&self) -> ArenaVec<'_, T> {
        ArenaVec {
            arena: self,
            ptr: ptr::null_mut(),
            len: 0,
            cap: 0,
            _marker: PhantomData,
        }
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

/// Growable vector of `Copy` elements backed by an [`Arena`].
///
/// Grows by doubling; superseded backing buffers stay in the arena until
/// reset, the same discipline the evaluator uses for every intermediate.
pub struct ArenaVec<'a, T: Copy> {
    arena: &'a Arena,
    ptr: *mut T,
    len: usize,
    cap: usize,
    _marker: PhantomData<&'a T>,
}

impl<'a, T: Copy> ArenaVec<'a, T> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append an element, growing the backing buffer if needed.
    pub fn push(&mut self, value: T) -> Result<(), Error<'a>> {
        if self.len == self.cap {
            let cap = if self.cap == 0 { 1 } else { self.cap * 2 };
            let next = self.arena.try_alloc_raw::<T>(cap)?;
            unsafe {
                ptr::copy_nonoverlapping(self.ptr, next, self.len);
            }
            self.ptr = next;
            self.cap = cap;
        }
        unsafe {
            ptr::write(self.ptr.add(self.len), value);
        }
        self.len += 1;
        Ok(())
    }

    /// Finish, returning the arena-backed slice.
    pub fn into_slice(self) -> &'a [T] {
        if self.len == 0 {
            return &[];
        }
        unsafe { core::slice::from_raw_parts(self.ptr, self.len) }
    }
}
