//! # ringalloc - A Free-List Allocator for a Fixed Arena
//!
//! This crate provides a **next-fit free-list allocator** that manages a
//! single, pre-existing byte region (the *arena*) without ever asking the
//! system for more memory.
//!
//! ## Overview
//!
//! The arena is split into blocks. Every block starts with an 8-byte header
//! holding the address of the next header; the headers form a circular ring
//! in address order, closed by an end header that is always in use:
//!
//! ```text
//!   Arena after a few allocations:
//!
//!   ┌────┬──────────┬────┬──────┬────┬──────────────────────┬────┐
//!   │ H0 │  used    │ H1 │ used │ H2 │        free          │ HE │
//!   └────┴──────────┴────┴──────┴────┴──────────────────────┴────┘
//!     │               ▲ │         ▲ │                         ▲ │
//!     └───────────────┘ └─────────┘ └─────────────────────────┘ │
//!     ▲                                                         │
//!     └─────────────────── end header links back ───────────────┘
//! ```
//!
//! The payload size of a block is never stored: it is the distance between
//! the end of its header and the next header.
//!
//! ## Header Layout
//!
//! ```text
//!   63                                                    1   0
//!   ┌────────────────────────────────────────────────────────┬───┐
//!   │              address of the next header                │ F │
//!   └────────────────────────────────────────────────────────┴───┘
//!                                                              ▲
//!                              free flag (1 = free, 0 = used) ─┘
//! ```
//!
//! Headers are 8-byte aligned, so bit 0 of the link is always zero and can
//! carry the free flag.
//!
//! ## Crate Structure
//!
//! ```text
//!   ringalloc
//!   ├── align      - Alignment macros (align!, align_down!)
//!   ├── block      - Block header encoding (internal)
//!   ├── freelist   - FreeListAllocator: init, allocate, deallocate
//!   ├── diag       - Header self-test and block dump
//!   ├── io         - Console used by the diagnostics
//!   └── error      - AllocError, EndOfFile
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use ringalloc::FreeListAllocator;
//!
//! let mut region = vec![0u8; 1024];
//! let mut allocator = FreeListAllocator::new(&mut region);
//!
//! let ptr = allocator.allocate(24).unwrap();
//! assert_eq!(ptr.as_ptr().addr() % 8, 0);
//!
//! unsafe {
//!   ptr.as_ptr().write_bytes(0xAB, 24);
//!   allocator.deallocate(ptr.as_ptr());
//! }
//! ```
//!
//! ## How It Works
//!
//! - **Allocation** scans the ring starting at a roaming cursor (next fit).
//!   Each free block visited first absorbs the free blocks directly after it.
//!   The first block that is large enough is split: the requested bytes are
//!   handed out and the rest becomes a new free block, unless the rest could
//!   not hold a header plus [`MIN_SIZE`] bytes, in which case the whole block
//!   is handed out.
//! - **Deallocation** flags the block free and absorbs the free blocks after
//!   it. A free block *before* it stays separate until the next allocation
//!   scan passes over it.
//!
//! ```text
//!   free(B) with A already free:
//!
//!   ┌────┬────────┬────┬────────┬────┬────────┬────┐
//!   │ A  │  free  │ B  │  free  │ C  │  free  │ D  │ ...
//!   └────┴────────┴────┴────────┴────┴────────┴────┘
//!                        B absorbs C ──────────►
//!   A and B stay apart until an allocation visits A.
//! ```
//!
//! ## Limitations
//!
//! - **Single-threaded only**: no synchronization; the allocator is neither
//!   `Send` nor `Sync`
//! - **Forward coalescing only**: no predecessor links
//! - **Fixed alignment**: every payload is 8-byte aligned, nothing more
//! - **No growth**: the arena is never extended and blocks are never resized
//! - **Lenient frees**: freeing null or an already free block is ignored
//!
//! ## Safety
//!
//! Allocation is safe once the allocator owns its region; deallocation is
//! `unsafe` because the pointer must come from this allocator.

pub mod align;
mod block;
pub mod diag;
pub mod error;
mod freelist;
pub mod io;

/// Alignment of every header and payload.
pub const ALIGNMENT: usize = 8;

/// Smallest payload a free block split off during allocation may have.
pub const MIN_SIZE: usize = 8;

pub use block::HEADER_SIZE;
pub use error::{AllocError, EndOfFile};
pub use freelist::{BlockInfo, Blocks, FreeListAllocator};
