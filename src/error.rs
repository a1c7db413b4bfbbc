use thiserror::Error;

/// Reasons an allocation can fail. Both mean the arena is out of space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
  /// The aligned arena cannot hold a free block and the end header.
  #[error("arena too small: {available} bytes available, at least {required} required")]
  ArenaTooSmall { available: usize, required: usize },

  /// A full scan of the ring found no free block large enough.
  #[error("out of space: no free block can hold {requested} bytes")]
  OutOfSpace { requested: usize },
}

/// Returned by a [`Console`](crate::io::Console) when input is exhausted or
/// output cannot be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("end of file")]
pub struct EndOfFile;
