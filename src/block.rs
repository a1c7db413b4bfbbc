use std::{mem, ptr};

use static_assertions::{const_assert, const_assert_eq};

use crate::ALIGNMENT;

/// Bit 0 of `next` marks a block as free.
const FREE_BIT: usize = 0x1;

/// Size in bytes of every block header.
pub const HEADER_SIZE: usize = mem::size_of::<BlockHeader>();

const_assert_eq!(HEADER_SIZE % ALIGNMENT, 0);
const_assert!(FREE_BIT < ALIGNMENT);

/// Header preceding every block in the arena.
///
/// The header only stores the address of the next header; the free flag lives
/// in the low bit of that address, which is always zero because headers are
/// 8-byte aligned. The payload size is implied by the distance to the next
/// header.
///
/// All accessors take a raw `*mut BlockHeader` because headers are written in
/// place inside the arena and never borrowed.
#[repr(C, align(8))]
pub(crate) struct BlockHeader {
  next: *mut BlockHeader,
}

impl BlockHeader {
  pub(crate) const EMPTY: Self = Self {
    next: ptr::null_mut(),
  };

  /// Writes a complete header at `this`, overwriting whatever was there.
  pub(crate) unsafe fn store(
    this: *mut Self,
    next: *mut Self,
    free: bool,
  ) {
    unsafe {
      ptr::write(
        this,
        Self {
          next: Self::tag(next, free),
        },
      );
    }
  }

  /// Address of the next header with the free flag masked out.
  pub(crate) unsafe fn next(this: *mut Self) -> *mut Self {
    unsafe { (*this).next.map_addr(|addr| addr & !FREE_BIT) }
  }

  /// Relinks `this` to `next`, keeping its current free flag.
  pub(crate) unsafe fn set_next(
    this: *mut Self,
    next: *mut Self,
  ) {
    unsafe {
      let free = Self::is_free(this);
      (*this).next = Self::tag(next, free);
    }
  }

  pub(crate) unsafe fn is_free(this: *mut Self) -> bool {
    unsafe { (*this).next.addr() & FREE_BIT != 0 }
  }

  /// Sets the free flag of `this`, keeping its link.
  pub(crate) unsafe fn set_free(
    this: *mut Self,
    free: bool,
  ) {
    unsafe {
      let next = Self::next(this);
      (*this).next = Self::tag(next, free);
    }
  }

  /// Payload bytes between the end of this header and the next header.
  ///
  /// The end header links back to the start of the arena, so its size is 0.
  pub(crate) unsafe fn size(this: *mut Self) -> usize {
    unsafe {
      Self::next(this)
        .addr()
        .saturating_sub(Self::payload(this).addr())
    }
  }

  pub(crate) fn payload(this: *mut Self) -> *mut u8 {
    this.cast::<u8>().wrapping_add(HEADER_SIZE)
  }

  pub(crate) fn from_payload(payload: *mut u8) -> *mut Self {
    payload.wrapping_sub(HEADER_SIZE).cast()
  }

  fn tag(
    next: *mut Self,
    free: bool,
  ) -> *mut Self {
    next.map_addr(|addr| (addr & !FREE_BIT) | usize::from(free))
  }
}
