use std::{
  marker::PhantomData,
  ptr::{self, NonNull},
};

use tracing::{debug, trace, warn};

use crate::{
  MIN_SIZE, align::checked_align, align_down,
  block::{BlockHeader, HEADER_SIZE},
  error::AllocError,
};

/// Free-list allocator managing a single fixed byte region.
///
/// Blocks form a circular singly-linked ring of headers in address order,
/// closed by a zero-sized end header that is always in use. Allocation is
/// next-fit: the search resumes at the cursor left by the previous call.
///
/// The allocator is not thread safe; it holds raw pointers into the arena and
/// is therefore neither `Send` nor `Sync`. Callers embedding it in a
/// concurrent program must serialize every call themselves.
pub struct FreeListAllocator<'a> {
  start: *mut u8,
  end: *mut u8,
  first: *mut BlockHeader,
  current: *mut BlockHeader,
  _region: PhantomData<&'a mut [u8]>,
}

impl<'a> FreeListAllocator<'a> {
  /// Creates an allocator managing `region`.
  ///
  /// Nothing is written to the region until the first allocation (or an
  /// explicit [`init`](Self::init)).
  pub fn new(region: &'a mut [u8]) -> Self {
    let range = region.as_mut_ptr_range();
    // SAFETY: the range comes from a live exclusive borrow held for 'a.
    unsafe { Self::from_raw_parts(range.start, range.end) }
  }

  /// Creates an allocator managing the bytes in `[start, end)`.
  ///
  /// # Safety
  ///
  /// The range must be valid for reads and writes for as long as the
  /// allocator or any pointer it hands out is in use, and nothing else may
  /// access it in the meantime.
  pub const unsafe fn from_raw_parts(
    start: *mut u8,
    end: *mut u8,
  ) -> Self {
    Self {
      start,
      end,
      first: ptr::null_mut(),
      current: ptr::null_mut(),
      _region: PhantomData,
    }
  }

  /// Lays out the arena as one free block followed by the end header.
  ///
  /// Does nothing if the arena is already initialized. Fails if the aligned
  /// region cannot hold two headers plus [`MIN_SIZE`] payload bytes, in
  /// which case the allocator stays uninitialized.
  pub fn init(&mut self) -> Result<(), AllocError> {
    if !self.first.is_null() {
      return Ok(());
    }

    let required = 2 * HEADER_SIZE + MIN_SIZE;
    let Some(start) = checked_align(self.start.addr()) else {
      warn!(required, "arena start cannot be aligned");
      return Err(AllocError::ArenaTooSmall {
        available: 0,
        required,
      });
    };
    let end = align_down!(self.end.addr());
    let available = end.saturating_sub(start);

    if available < required {
      warn!(available, required, "arena too small to initialize");
      return Err(AllocError::ArenaTooSmall {
        available,
        required,
      });
    }

    let first = self.start.with_addr(start).cast::<BlockHeader>();
    let last = self.start.with_addr(end - HEADER_SIZE).cast::<BlockHeader>();

    unsafe {
      BlockHeader::store(first, last, true);
      BlockHeader::store(last, first, false);
    }

    self.first = first;
    self.current = first;

    debug!(start, end, size = available, "arena initialized");
    Ok(())
  }

  /// Allocates at least `size` bytes and returns a pointer to the payload.
  ///
  /// The size is rounded up to a multiple of 8 and the returned pointer is
  /// 8-byte aligned. A `size` of 0 yields a valid pointer to an empty
  /// payload. Free blocks passed over during the search are merged with
  /// their free successors.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    if self.first.is_null() {
      self.init()?;
    }

    let aligned_size = checked_align(size).ok_or(AllocError::OutOfSpace { requested: size })?;

    // `self.current` marks where the scan started; coalescing moves it back
    // if the starting header gets absorbed.
    let mut block = self.current;

    loop {
      unsafe {
        if BlockHeader::is_free(block) {
          self.coalesce(block);

          if BlockHeader::size(block) >= aligned_size {
            return Ok(self.carve(block, aligned_size));
          }
        }

        block = BlockHeader::next(block);
      }

      if block == self.current {
        break;
      }
    }

    debug!(requested = size, aligned_size, "no free block large enough");
    Err(AllocError::OutOfSpace { requested: size })
  }

  /// Returns a block to the free list and merges it with the free blocks
  /// directly after it.
  ///
  /// A null pointer, or a pointer to a block that is already free, is
  /// ignored. The block before `ptr` is never merged here; that happens when
  /// a later allocation passes over it.
  ///
  /// # Safety
  ///
  /// `ptr` must be null or a pointer returned by [`allocate`](Self::allocate)
  /// on this allocator.
  pub unsafe fn deallocate(
    &mut self,
    ptr: *mut u8,
  ) {
    if ptr.is_null() {
      return;
    }

    let block = BlockHeader::from_payload(ptr);

    unsafe {
      if BlockHeader::is_free(block) {
        trace!(address = ptr.addr(), "ignoring free of a block not in use");
        return;
      }

      BlockHeader::set_free(block, true);
      self.coalesce(block);
    }
  }

  pub fn is_initialized(&self) -> bool {
    !self.first.is_null()
  }

  /// Size of the aligned arena in bytes, or 0 before initialization.
  pub fn arena_size(&self) -> usize {
    if self.first.is_null() {
      return 0;
    }
    align_down!(self.end.addr()) - self.first.addr()
  }

  /// Offset of the header the next search starts from.
  pub fn cursor(&self) -> Option<usize> {
    if self.first.is_null() {
      return None;
    }
    Some(self.current.addr() - self.first.addr())
  }

  /// Walks the header ring once, starting at the first header.
  pub fn blocks(&self) -> Blocks<'_> {
    Blocks {
      first: self.first,
      next: self.first,
      _allocator: PhantomData,
    }
  }

  /// Splices every free successor of `block` out of the ring.
  ///
  /// Stops at the first used header and never wraps past the first header.
  unsafe fn coalesce(
    &mut self,
    block: *mut BlockHeader,
  ) {
    unsafe {
      let mut next = BlockHeader::next(block);

      while BlockHeader::is_free(next) && next != self.first {
        if next == self.current {
          self.current = block;
        }
        BlockHeader::set_next(block, BlockHeader::next(next));
        next = BlockHeader::next(block);
      }
    }
  }

  /// Marks `block` used, splitting off the tail as a new free block when it
  /// is big enough to stand on its own.
  unsafe fn carve(
    &mut self,
    block: *mut BlockHeader,
    aligned_size: usize,
  ) -> NonNull<u8> {
    unsafe {
      let remainder = BlockHeader::size(block) - aligned_size;

      if remainder < HEADER_SIZE + MIN_SIZE {
        BlockHeader::set_free(block, false);
        self.current = BlockHeader::next(block);
      } else {
        let rest = BlockHeader::payload(block)
          .wrapping_add(aligned_size)
          .cast::<BlockHeader>();

        BlockHeader::store(rest, BlockHeader::next(block), true);
        BlockHeader::store(block, rest, false);
        self.current = rest;
      }

      // SAFETY: the payload lies inside the arena, which is never at address 0.
      NonNull::new_unchecked(BlockHeader::payload(block))
    }
  }
}

/// Snapshot of one header in the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
  /// Offset of the header from the first header of the arena.
  pub offset: usize,
  /// Payload size in bytes; 0 for the end header.
  pub size: usize,
  pub free: bool,
}

/// Iterator over the header ring, see [`FreeListAllocator::blocks`].
pub struct Blocks<'b> {
  first: *mut BlockHeader,
  next: *mut BlockHeader,
  _allocator: PhantomData<&'b ()>,
}

impl Iterator for Blocks<'_> {
  type Item = BlockInfo;

  fn next(&mut self) -> Option<BlockInfo> {
    if self.next.is_null() {
      return None;
    }

    let block = self.next;
    unsafe {
      let info = BlockInfo {
        offset: block.addr() - self.first.addr(),
        size: BlockHeader::size(block),
        free: BlockHeader::is_free(block),
      };

      let next = BlockHeader::next(block);
      self.next = if next == self.first {
        ptr::null_mut()
      } else {
        next
      };

      Some(info)
    }
  }
}
