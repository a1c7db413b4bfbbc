//! Diagnostics: a self-test for the header encoding and a dump of the ring.

use crate::{
  block::BlockHeader,
  error::EndOfFile,
  freelist::FreeListAllocator,
  io::Console,
};

/// Checks that links and free flags can be set independently in a header.
///
/// Links a pair of adjacent headers to each other and walks through all four
/// combinations of their free flags. Returns 0 when every check passes,
/// otherwise `10 * (combination + 1) + check` of the first failing check.
pub fn codec_self_test() -> i32 {
  let mut headers = [BlockHeader::EMPTY, BlockHeader::EMPTY];
  let a = headers.as_mut_ptr();
  let b = a.wrapping_add(1);

  let combinations = [(false, false), (true, false), (false, true), (true, true)];

  unsafe {
    BlockHeader::store(a, b, false);
    BlockHeader::store(b, a, false);

    for (index, (free_a, free_b)) in combinations.into_iter().enumerate() {
      let code = 10 * (index as i32 + 1);

      BlockHeader::set_free(a, free_a);
      BlockHeader::set_free(b, free_b);

      if BlockHeader::next(a) != b || BlockHeader::next(b) != a {
        return code + 1;
      }
      if BlockHeader::is_free(a) != free_a || BlockHeader::is_free(b) != free_b {
        return code + 2;
      }

      // Relinking must keep the flags.
      BlockHeader::set_next(a, b);
      BlockHeader::set_next(b, a);
      if BlockHeader::is_free(a) != free_a || BlockHeader::is_free(b) != free_b {
        return code + 3;
      }
      if BlockHeader::next(a) != b || BlockHeader::next(b) != a {
        return code + 4;
      }

      // Adjacent headers leave no payload; the back link is the end header.
      if BlockHeader::size(a) != 0 || BlockHeader::size(b) != 0 {
        return code + 5;
      }
      if BlockHeader::payload(a) != b.cast::<u8>() || BlockHeader::from_payload(BlockHeader::payload(a)) != a {
        return code + 6;
      }
    }
  }

  0
}

/// Writes one line per header in the ring to `console`.
///
/// ```text
/// Block dump: 3 blocks, arena 256 bytes
///   [0] offset 0 size 64 USED
///   [1] offset 72 size 168 FREE <- cursor
///   [2] offset 248 size 0 USED
/// ```
pub fn block_dump<C: Console>(
  allocator: &FreeListAllocator,
  console: &mut C,
) -> Result<(), EndOfFile> {
  if !allocator.is_initialized() {
    return console.write_string("Block dump: arena not initialized\n");
  }

  let cursor = allocator.cursor();

  console.write_string("Block dump: ")?;
  console.write_int(allocator.blocks().count() as i64)?;
  console.write_string(" blocks, arena ")?;
  console.write_int(allocator.arena_size() as i64)?;
  console.write_string(" bytes\n")?;

  for (index, block) in allocator.blocks().enumerate() {
    console.write_string("  [")?;
    console.write_int(index as i64)?;
    console.write_string("] offset ")?;
    console.write_int(block.offset as i64)?;
    console.write_string(" size ")?;
    console.write_int(block.size as i64)?;
    console.write_string(if block.free { " FREE" } else { " USED" })?;
    if cursor == Some(block.offset) {
      console.write_string(" <- cursor")?;
    }
    console.write_char(b'\n')?;
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::io::MemoryConsole;

  #[repr(align(8))]
  struct MemPool<const N: usize>([u8; N]);

  #[test]
  fn test_codec_self_test() {
    assert_eq!(codec_self_test(), 0);
  }

  #[test]
  fn test_dump_uninitialized() {
    let mut pool = MemPool([0u8; 64]);
    let allocator = FreeListAllocator::new(&mut pool.0);
    let mut console = MemoryConsole::default();

    block_dump(&allocator, &mut console).unwrap();

    assert_eq!(console.output_string(), "Block dump: arena not initialized\n");
  }

  #[test]
  fn test_dump() {
    let mut pool = MemPool([0u8; 256]);
    let mut allocator = FreeListAllocator::new(&mut pool.0);
    let mut console = MemoryConsole::default();

    allocator.allocate(60).unwrap();
    block_dump(&allocator, &mut console).unwrap();

    assert_eq!(
      console.output_string(),
      "Block dump: 3 blocks, arena 256 bytes\n\
       \x20 [0] offset 0 size 64 USED\n\
       \x20 [1] offset 72 size 168 FREE <- cursor\n\
       \x20 [2] offset 248 size 0 USED\n"
    );
  }

  #[test]
  fn test_dump_is_read_only() {
    let mut pool = MemPool([0u8; 512]);
    let mut allocator = FreeListAllocator::new(&mut pool.0);

    let a = allocator.allocate(32).unwrap();
    allocator.allocate(32).unwrap();
    unsafe { allocator.deallocate(a.as_ptr()) };

    let before: Vec<_> = allocator.blocks().collect();
    let cursor = allocator.cursor();

    block_dump(&allocator, &mut MemoryConsole::default()).unwrap();

    assert_eq!(allocator.blocks().collect::<Vec<_>>(), before);
    assert_eq!(allocator.cursor(), cursor);
  }
}
